//! The three deliverable shape contracts.

use std::sync::LazyLock;

use regex::Regex;

use super::document::SourceKind;
use super::schema::{Field, Format, ObjectSchema, Schema, StringSchema};
use super::DocumentKind;

/// Source and citation ids: letters, digits, `.`, `_`, `:`, `-`.
pub const SOURCE_ID_PATTERN: &str = "^[A-Za-z0-9._:-]+$";

pub const MAX_SOURCES: usize = 50;
pub const MAX_TITLE_CHARS: usize = 160;

pub const MAX_SLIDES: usize = 30;
pub const MAX_BULLETS_PER_SLIDE: usize = 5;
pub const MAX_BULLET_CHARS: usize = 400;
pub const MAX_FIGURES_PER_SLIDE: usize = 3;
pub const MAX_CITATIONS_PER_SLIDE: usize = 10;
pub const MAX_NOTES_CHARS: usize = 1000;

pub const MIN_WORD_BUDGET: i64 = 200;
pub const MAX_WORD_BUDGET: i64 = 1000;
pub const MAX_PROBLEM_CHARS: usize = 4000;
pub const MAX_PAGE_ITEMS: usize = 10;
pub const MAX_PAGE_CITATIONS: usize = 50;

pub const MIN_CARDS: usize = 3;
pub const MAX_CARDS: usize = 50;
pub const MAX_QUESTION_CHARS: usize = 400;
pub const MAX_ANSWER_CHARS: usize = 1200;
pub const MAX_TAGS_PER_CARD: usize = 5;
pub const MAX_CITATIONS_PER_CARD: usize = 10;

static SOURCE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SOURCE_ID_PATTERN).expect("valid regex"));

static SLIDE_DECK: LazyLock<Schema> = LazyLock::new(slide_deck);
static ONE_PAGER: LazyLock<Schema> = LazyLock::new(one_pager);
static FLASHCARDS: LazyLock<Schema> = LazyLock::new(flashcards);

/// The contract for a document kind.
pub fn contract(kind: DocumentKind) -> &'static Schema {
    match kind {
        DocumentKind::SlideDeck => &SLIDE_DECK,
        DocumentKind::OnePager => &ONE_PAGER,
        DocumentKind::Flashcards => &FLASHCARDS,
    }
}

fn citation_id() -> StringSchema {
    StringSchema::any().pattern(SOURCE_ID_RE.clone())
}

fn sources() -> Schema {
    let source = Schema::object(vec![
        Field::required("id", citation_id()),
        Field::required("kind", StringSchema::any().one_of(&SourceKind::NAMES)),
        Field::required("value", StringSchema::non_empty()),
        Field::optional("title", StringSchema::any()),
        Field::optional("accessed", StringSchema::any().format(Format::Date)),
    ]);
    Schema::array(1, MAX_SOURCES, source)
}

fn slide_deck() -> Schema {
    let meta = Schema::object(vec![
        Field::required("title", StringSchema::bounded(1, MAX_TITLE_CHARS)),
        Field::required("slideCount", Schema::integer(1, MAX_SLIDES as i64)),
    ]);

    let figure = Schema::object(vec![
        Field::required("stub", StringSchema::bounded(1, 200)),
        Field::optional("caption", StringSchema::bounded(0, 200)),
    ]);

    let slide = ObjectSchema {
        fields: vec![
            Field::required("title", StringSchema::bounded(1, 120)),
            Field::optional("bullets", Schema::array(0, MAX_BULLETS_PER_SLIDE, StringSchema::bounded(1, MAX_BULLET_CHARS))),
            Field::optional("figureStubs", Schema::array(0, MAX_FIGURES_PER_SLIDE, figure)),
            Field::optional("citations", Schema::array(0, MAX_CITATIONS_PER_SLIDE, citation_id())),
            Field::optional("notes", StringSchema::bounded(0, MAX_NOTES_CHARS)),
        ],
        any_non_empty: &[],
    }
    .require_any_non_empty(&["bullets", "figureStubs"]);

    Schema::object(vec![
        Field::required("kind", Schema::Const(DocumentKind::SlideDeck.as_str())),
        Field::required("meta", meta),
        Field::required("slides", Schema::array(1, MAX_SLIDES, slide)),
        Field::required("sources", sources()),
    ])
}

fn one_pager() -> Schema {
    let meta = Schema::object(vec![
        Field::required("title", StringSchema::bounded(1, MAX_TITLE_CHARS)),
        Field::required("wordBudget", Schema::integer(MIN_WORD_BUDGET, MAX_WORD_BUDGET)),
    ]);

    Schema::object(vec![
        Field::required("kind", Schema::Const(DocumentKind::OnePager.as_str())),
        Field::required("meta", meta),
        Field::required("problem", StringSchema::bounded(1, MAX_PROBLEM_CHARS)),
        Field::required("keyFacts", Schema::array(1, MAX_PAGE_ITEMS, StringSchema::bounded(1, 400))),
        Field::required("implications", Schema::array(1, MAX_PAGE_ITEMS, StringSchema::bounded(1, 400))),
        Field::required("actions", Schema::array(0, MAX_PAGE_ITEMS, StringSchema::bounded(1, 200))),
        Field::required("citations", Schema::array(1, MAX_PAGE_CITATIONS, citation_id())),
        Field::required("sources", sources()),
    ])
}

fn flashcards() -> Schema {
    let meta = Schema::object(vec![
        Field::optional("title", StringSchema::bounded(1, MAX_TITLE_CHARS)),
    ]);

    let card = Schema::object(vec![
        Field::required("q", StringSchema::bounded(1, MAX_QUESTION_CHARS)),
        Field::required("a", StringSchema::bounded(1, MAX_ANSWER_CHARS)),
        Field::optional("tags", Schema::array(0, MAX_TAGS_PER_CARD, StringSchema::bounded(1, 40))),
        Field::optional("citations", Schema::array(0, MAX_CITATIONS_PER_CARD, citation_id())),
    ]);

    Schema::object(vec![
        Field::required("kind", Schema::Const(DocumentKind::Flashcards.as_str())),
        Field::optional("meta", meta),
        Field::required("cards", Schema::array(MIN_CARDS, MAX_CARDS, card)),
        Field::required("sources", sources()),
    ])
}
