//! Decides whether two scraped records describe the same bout.
//!
//! The listing and the detail pages spell names differently: "Erika Cruz" on
//! one, "Cruz" on another, and the corner order is not stable either. Matching
//! is deliberately loose; a shared surname is enough, which means two
//! different fighters named "Smith" are treated as the same person.

use tracing::debug;

use crate::parser::Fight;
use crate::utils::collapse_whitespace;

/// Normalize a name for comparison: lowercase, collapse whitespace.
pub fn normalize_name(name: &str) -> String {
    collapse_whitespace(&name.to_lowercase())
}

/// Loose name equality: exact, either contained in the other, or same surname.
pub fn names_match(a: &str, b: &str) -> bool {
    let a = normalize_name(a);
    let b = normalize_name(b);

    if a.is_empty() || b.is_empty() {
        return a == b;
    }

    if a == b || a.contains(&b) || b.contains(&a) {
        return true;
    }

    surname(&a) == surname(&b)
}

fn surname(normalized: &str) -> &str {
    normalized.rsplit(' ').next().unwrap_or(normalized)
}

/// Order-independent comparison of the two corners of each fight.
pub fn fighters_match(a: &Fight, b: &Fight) -> bool {
    (names_match(&a.fighter1, &b.fighter1) && names_match(&a.fighter2, &b.fighter2))
        || (names_match(&a.fighter1, &b.fighter2) && names_match(&a.fighter2, &b.fighter1))
}

/// Folds `extra` fights into `known`. A fight already present (by fighter
/// match) only back-fills missing details on the existing record; anything
/// new is appended in order.
pub fn merge_fights(mut known: Vec<Fight>, extra: impl IntoIterator<Item = Fight>) -> Vec<Fight> {
    for fight in extra {
        match known.iter_mut().find(|k| fighters_match(k, &fight)) {
            Some(existing) => {
                debug!("Merging duplicate record for {}", existing.title);
                existing.backfill_from(&fight);
            }
            None => known.push(fight),
        }
    }
    known
}
