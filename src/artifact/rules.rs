//! Business-rule calculator, the second validation pass.
//!
//! Cross-field invariants a structural contract cannot express: word
//! budgets, citation integrity, declared-vs-actual counts. Pure: reads the
//! document, returns every violation as a human-readable line, in a stable
//! order.

use hashbrown::HashSet;
use serde::Deserialize;
use serde_json::Value as Json;

use super::document::{Artifact, Flashcards, OnePager, Slide, SlideDeck, Source};
use crate::{Error, Result};

pub const SLIDE_TITLE_MAX_WORDS: usize = 12;
pub const BULLET_MAX_WORDS: usize = 24;
pub const SLIDE_BULLETS_MAX_WORDS: usize = 60;
pub const DECK_MAX_WORDS: usize = 1500;

pub const PROBLEM_MAX_WORDS: usize = 120;
pub const FACT_MAX_WORDS: usize = 30;
pub const ACTION_MAX_WORDS: usize = 20;

pub const QUESTION_MAX_WORDS: usize = 20;
pub const ANSWER_MAX_WORDS: usize = 60;

/// Words are runs of non-whitespace, with Unicode whitespace as separator.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn word_count_opt(text: Option<&str>) -> usize {
    text.map_or(0, word_count)
}

/// Decode a raw document and run the rules for its kind.
///
/// Fails with [`Error::Evaluation`] when the document is not an object with a
/// known `kind`, or when one of its list fields is not a list. Every other
/// shape problem decodes leniently and is left to the shape pass.
pub fn evaluate_rules(doc: &Json) -> Result<Vec<String>> {
    let artifact = Artifact::deserialize(doc).map_err(|e| Error::Evaluation(e.to_string()))?;
    Ok(validate_rules(&artifact))
}

/// Run the rules for a typed document.
pub fn validate_rules(doc: &Artifact) -> Vec<String> {
    match doc {
        Artifact::SlideDeck(deck) => slide_deck_rules(deck),
        Artifact::OnePager(page) => one_pager_rules(page),
        Artifact::Flashcards(cards) => flashcards_rules(cards),
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

fn source_ids(sources: &[Source]) -> HashSet<&str> {
    sources.iter().map(|s| s.id.as_str()).collect()
}

/// Ids that occur more than once, in order of their second occurrence.
fn duplicate_source_ids(sources: &[Source]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut dups: Vec<&str> = Vec::new();
    for source in sources {
        let id = source.id.as_str();
        if !seen.insert(id) && !dups.contains(&id) {
            dups.push(id);
        }
    }
    dups
}

fn check_duplicate_sources(sources: &[Source], errors: &mut Vec<String>) {
    let dups = duplicate_source_ids(sources);
    if !dups.is_empty() {
        errors.push(format!("duplicate source ids: {}", dups.join(", ")));
    }
}

/// `2.0` renders as `2`; a missing number as `missing`.
fn number_text(n: Option<f64>) -> String {
    n.map_or_else(|| "missing".to_owned(), |v| v.to_string())
}

fn check_has_source(sources: &[Source], errors: &mut Vec<String>) {
    if sources.is_empty() {
        errors.push("must include at least one source".to_owned());
    }
}

// ============================================================================
// SlideDeck
// ============================================================================

fn slide_deck_rules(deck: &SlideDeck) -> Vec<String> {
    let mut errors = Vec::new();

    let actual = deck.slides.len();
    if deck.meta.slide_count != Some(actual as f64) {
        errors.push(format!(
            "slideCount mismatch: meta.slideCount={} but slides.length={actual}",
            number_text(deck.meta.slide_count)
        ));
    }

    let known = source_ids(&deck.sources);
    check_duplicate_sources(&deck.sources, &mut errors);

    let mut total_words = word_count(&deck.meta.title);
    let mut used_citations: HashSet<&str> = HashSet::new();

    for (i, slide) in deck.slides.iter().enumerate() {
        total_words += slide_rules(i, slide, &known, &mut used_citations, &mut errors);
    }

    check_has_source(&deck.sources, &mut errors);
    if used_citations.is_empty() {
        errors.push("no citations used in slides".to_owned());
    }
    if total_words > DECK_MAX_WORDS {
        errors.push(format!("total word budget exceeded (<={DECK_MAX_WORDS}, got {total_words})"));
    }

    errors
}

/// Check one slide; returns the words it contributes to the deck total.
fn slide_rules<'d>(
    i: usize,
    slide: &'d Slide,
    known: &HashSet<&str>,
    used_citations: &mut HashSet<&'d str>,
    errors: &mut Vec<String>,
) -> usize {
    let title_words = word_count(&slide.title);
    if title_words > SLIDE_TITLE_MAX_WORDS {
        errors.push(format!("slide[{i}].title exceeds {SLIDE_TITLE_MAX_WORDS} words ({title_words})"));
    }
    let mut words = title_words;

    if slide.bullets.is_empty() && slide.figure_stubs.is_empty() {
        errors.push(format!("slide[{i}] must have bullets or figureStubs"));
    }

    let mut bullet_words = 0;
    for (j, bullet) in slide.bullets.iter().enumerate() {
        let w = word_count(bullet);
        bullet_words += w;
        if w > BULLET_MAX_WORDS {
            errors.push(format!("slide[{i}].bullets[{j}] exceeds {BULLET_MAX_WORDS} words ({w})"));
        }
    }
    words += bullet_words;
    if bullet_words > SLIDE_BULLETS_MAX_WORDS {
        errors.push(format!(
            "slide[{i}] bullets budget exceeded (<={SLIDE_BULLETS_MAX_WORDS} words, got {bullet_words})"
        ));
    }

    for citation in &slide.citations {
        if !known.contains(citation.as_str()) {
            errors.push(format!("slide[{i}] unknown citation id: {citation}"));
        }
        used_citations.insert(citation.as_str());
    }

    for (j, figure) in slide.figure_stubs.iter().enumerate() {
        if figure.stub.trim().is_empty() {
            errors.push(format!("slide[{i}].figureStubs[{j}].stub must be non-empty"));
        }
        words += word_count_opt(figure.caption.as_deref());
    }

    words + word_count_opt(slide.notes.as_deref())
}

// ============================================================================
// OnePager
// ============================================================================

fn one_pager_rules(page: &OnePager) -> Vec<String> {
    let mut errors = Vec::new();
    let known = source_ids(&page.sources);
    check_duplicate_sources(&page.sources, &mut errors);

    let problem_words = word_count(&page.problem);
    let mut total = word_count(&page.meta.title) + problem_words;
    if problem_words > PROBLEM_MAX_WORDS {
        errors.push(format!("problem exceeds {PROBLEM_MAX_WORDS} words ({problem_words})"));
    }

    let sections: [(&str, &[String], usize); 3] = [
        ("keyFacts", page.key_facts.as_slice(), FACT_MAX_WORDS),
        ("implications", page.implications.as_slice(), FACT_MAX_WORDS),
        ("actions", page.actions.as_slice(), ACTION_MAX_WORDS),
    ];
    for (name, items, limit) in sections {
        for (i, item) in items.iter().enumerate() {
            let w = word_count(item);
            total += w;
            if w > limit {
                errors.push(format!("{name}[{i}] exceeds {limit} words ({w})"));
            }
        }
    }

    if page.citations.is_empty() {
        errors.push("must include at least one citation".to_owned());
    }
    let mut unknown: Vec<&str> = Vec::new();
    for citation in &page.citations {
        if !known.contains(citation.as_str()) && !unknown.contains(&citation.as_str()) {
            unknown.push(citation);
        }
    }
    if !unknown.is_empty() {
        errors.push(format!("unknown citation ids: {}", unknown.join(", ")));
    }

    if let Some(budget) = page.meta.word_budget {
        if total as f64 > budget {
            errors.push(format!("wordBudget exceeded (<={budget}, got {total})"));
        }
    }
    check_has_source(&page.sources, &mut errors);

    errors
}

// ============================================================================
// Flashcards
// ============================================================================

fn flashcards_rules(set: &Flashcards) -> Vec<String> {
    let mut errors = Vec::new();
    let known = source_ids(&set.sources);
    check_duplicate_sources(&set.sources, &mut errors);

    let mut any_cited = false;
    for (i, card) in set.cards.iter().enumerate() {
        let qw = word_count(&card.q);
        let aw = word_count(&card.a);
        if qw > QUESTION_MAX_WORDS {
            errors.push(format!("cards[{i}].q exceeds {QUESTION_MAX_WORDS} words ({qw})"));
        }
        if aw > ANSWER_MAX_WORDS {
            errors.push(format!("cards[{i}].a exceeds {ANSWER_MAX_WORDS} words ({aw})"));
        }
        any_cited |= !card.citations.is_empty();
        for id in &card.citations {
            if !known.contains(id.as_str()) {
                errors.push(format!("cards[{i}] unknown citation id: {id}"));
            }
        }
    }

    if !any_cited {
        errors.push("at least one card must include a citation".to_owned());
    }
    check_has_source(&set.sources, &mut errors);

    errors
}
