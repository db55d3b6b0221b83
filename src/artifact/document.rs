//! Typed deliverable documents.
//!
//! These mirror the three shape contracts but decode leniently, so a
//! document with a bad shape can still be rule-checked for extra
//! diagnostics. Scalars of the wrong type fall back to their default,
//! numbers keep their JSON value whether written as `2` or `2.0`, and
//! list items that are not objects decode as empty items. Only a list
//! field that is not a list at all makes the document undecodable.

use serde::{Deserialize, Serialize};

use super::DocumentKind;

/// One of the three closed deliverable formats, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Artifact {
    SlideDeck(SlideDeck),
    OnePager(OnePager),
    Flashcards(Flashcards),
}

impl Artifact {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Artifact::SlideDeck(_) => DocumentKind::SlideDeck,
            Artifact::OnePager(_) => DocumentKind::OnePager,
            Artifact::Flashcards(_) => DocumentKind::Flashcards,
        }
    }

    pub fn sources(&self) -> &[Source] {
        match self {
            Artifact::SlideDeck(d) => &d.sources,
            Artifact::OnePager(p) => &p.sources,
            Artifact::Flashcards(f) => &f.sources,
        }
    }
}

// ============================================================================
// Lenient field decoders
// ============================================================================

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value as Json;

    /// Decode `T`, or `T::default()` when the value has another shape.
    pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let raw = Json::deserialize(d)?;
        Ok(serde_json::from_value(raw).unwrap_or_default())
    }

    /// Any JSON number as `f64`, integral or not.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(Json::deserialize(d)?.as_f64())
    }

    /// A list whose items decode through [`or_default`]. A non-list fails.
    pub fn items<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let raw = Vec::<Json>::deserialize(d)?;
        Ok(raw.into_iter().map(|item| serde_json::from_value(item).unwrap_or_default()).collect())
    }
}

// ============================================================================
// Sources
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Url,
    Doi,
    Paper,
    Book,
    Other,
}

impl SourceKind {
    pub const NAMES: [&'static str; 5] = ["url", "doi", "paper", "book", "other"];
}

/// A reference that citations point at by `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub id: String,
    /// `None` when the document names a kind outside [`SourceKind::NAMES`].
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SourceKind>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub value: String,
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Calendar date, `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub accessed: Option<String>,
}

impl Source {
    pub fn new(id: impl Into<String>, kind: SourceKind, value: impl Into<String>) -> Self {
        Self { id: id.into(), kind: Some(kind), value: value.into(), title: None, accessed: None }
    }
}

// ============================================================================
// SlideDeck
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideDeck {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub meta: DeckMeta,
    #[serde(default, deserialize_with = "lenient::items")]
    pub slides: Vec<Slide>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckMeta {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub title: String,
    /// Declared slide count. `None` when missing or not a number.
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub slide_count: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::items", skip_serializing_if = "Vec::is_empty")]
    pub bullets: Vec<String>,
    #[serde(default, deserialize_with = "lenient::items", skip_serializing_if = "Vec::is_empty")]
    pub figure_stubs: Vec<FigureStub>,
    #[serde(default, deserialize_with = "lenient::items", skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<String>,
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FigureStub {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub stub: String,
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

// ============================================================================
// OnePager
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnePager {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub meta: PageMeta,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub problem: String,
    #[serde(default, deserialize_with = "lenient::items")]
    pub key_facts: Vec<String>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub implications: Vec<String>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub actions: Vec<String>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub citations: Vec<String>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub title: String,
    /// Word ceiling for the whole page. No budget check when `None`.
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub word_budget: Option<f64>,
}

// ============================================================================
// Flashcards
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcards {
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub meta: Option<CardsMeta>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub cards: Vec<Card>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardsMeta {
    #[serde(default, deserialize_with = "lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub q: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub a: String,
    #[serde(default, deserialize_with = "lenient::items", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::items", skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<String>,
}
