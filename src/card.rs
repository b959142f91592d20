use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::matcher::fighters_match;
use crate::parser::{Fight, TBD};

// Trailing ", SA" style country code on a location
static RE_COUNTRY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",\s*[a-z]{2}$").unwrap()
});

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One event night: a headline bout plus the undercard on the same date and venue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub main_event: Fight,
    pub undercards: Vec<Fight>,
    pub date_raw: String,
    pub location: String,
    pub time: String,
    pub broadcast: String,
}

impl Card {
    /// All bouts on the card, headline first.
    pub fn fights(&self) -> Vec<Fight> {
        std::iter::once(self.main_event.clone())
            .chain(self.undercards.iter().cloned())
            .collect()
    }
}

/// A card while fights are still being collected
#[derive(Debug, Default)]
struct PendingCard {
    main_event: Option<Fight>,
    undercards: Vec<Fight>,
}

impl PendingCard {
    fn is_duplicate(&self, fight: &Fight) -> bool {
        self.main_event.iter().chain(self.undercards.iter()).any(|f| fighters_match(f, fight))
    }

    fn add(&mut self, fight: &Fight) {
        if fight.is_main_event {
            if let Some(previous) = &self.main_event {
                debug!("Headline {} replaced by {}", previous.title, fight.title);
            }
            self.main_event = Some(fight.clone());
        } else if !self.is_duplicate(fight) {
            self.undercards.push(fight.clone());
        }
    }

    /// Promotes the first undercard when no headline was flagged, then drops
    /// undercards that duplicate the headline. Cards with no fights vanish.
    ///
    /// Card details are read from the surviving bouts, headline first, so a
    /// card rebuilt from its own fights comes out the same.
    fn finalize(mut self) -> Option<Card> {
        if self.main_event.is_none() && !self.undercards.is_empty() {
            self.main_event = Some(self.undercards.remove(0));
        }
        let main_event = self.main_event?;
        self.undercards.retain(|f| !fighters_match(f, &main_event));

        let members: Vec<&Fight> = std::iter::once(&main_event).chain(self.undercards.iter()).collect();
        let location = first_filled(members.iter().copied().map(|f| f.location.as_str()));
        let time = first_filled(members.iter().copied().map(|f| f.time.as_str()));
        let broadcast = first_filled(members.iter().copied().map(|f| f.broadcast.as_str()));

        Some(Card {
            date_raw: main_event.date_raw.clone(),
            main_event,
            undercards: self.undercards,
            location,
            time,
            broadcast,
        })
    }
}

fn first_filled<'a>(mut values: impl Iterator<Item = &'a str>) -> String {
    values.find(|v| !v.is_empty()).unwrap_or_default().to_string()
}

// ============================================================================
// GROUPING
// ============================================================================

/// Grouping key: the raw date (or "TBD") and the lower-cased location with
/// any trailing two-letter country code removed.
pub fn card_key(date_raw: &str, location: &str) -> (String, String) {
    let date = if date_raw.trim().is_empty() { TBD } else { date_raw.trim() };
    let location = location.trim().to_lowercase();
    let location = RE_COUNTRY_SUFFIX.replace(&location, "").trim().to_string();
    (date.to_string(), location)
}

/// Buckets fights into cards in discovery order and finalizes them.
pub fn group_cards(fights: &[Fight]) -> Vec<Card> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut pending: HashMap<(String, String), PendingCard> = HashMap::new();

    for fight in fights {
        let key = card_key(&fight.date_raw, &fight.location);
        let card = pending.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            PendingCard::default()
        });
        card.add(fight);
    }

    let cards: Vec<Card> = order
        .iter()
        .filter_map(|key| pending.remove(key))
        .filter_map(PendingCard::finalize)
        .collect();

    debug!("Grouped {} fights into {} cards", fights.len(), cards.len());
    cards
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fight(a: &str, b: &str, date: &str, location: &str, main: bool) -> Fight {
        let mut f = Fight::new(a, b);
        f.date_raw = date.to_string();
        f.location = location.to_string();
        f.is_main_event = main;
        f
    }

    const DATE: &str = "Sat, Nov 22 2025";

    #[test]
    fn test_card_key_strips_country_code() {
        assert_eq!(
            card_key(DATE, "Kingdom Arena, Riyadh, SA"),
            (DATE.to_string(), "kingdom arena, riyadh".to_string())
        );
        assert_eq!(card_key("", ""), (TBD.to_string(), String::new()));
        assert_eq!(
            card_key(DATE, " Leeds, England "),
            (DATE.to_string(), "leeds, england".to_string())
        );
    }

    #[test]
    fn test_groups_by_date_and_venue() {
        let fights = vec![
            fight("TYSON FURY", "OLEKSANDR USYK", DATE, "Kingdom Arena, Riyadh, SA", true),
            fight("Moses Itauma", "Dillian Whyte", DATE, "Kingdom Arena, Riyadh", false),
            fight("Josh Taylor", "Jack Catterall", "Sat, Nov 29 2025", "Leeds, England", false),
        ];
        let cards = group_cards(&fights);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].main_event.fighter1, "TYSON FURY");
        assert_eq!(cards[0].undercards.len(), 1);
        assert_eq!(cards[0].location, "Kingdom Arena, Riyadh, SA");
        assert_eq!(cards[1].main_event.fighter1, "Josh Taylor");
        assert!(cards[1].undercards.is_empty());
    }

    #[test]
    fn test_promotes_first_undercard() {
        let fights = vec![
            fight("Alpha One", "Bravo Two", DATE, "Venue, City", false),
            fight("Charlie Three", "Delta Four", DATE, "Venue, City", false),
        ];
        let cards = group_cards(&fights);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].main_event.fighter1, "Alpha One");
        assert_eq!(cards[0].undercards.len(), 1);
        assert_eq!(cards[0].undercards[0].fighter1, "Charlie Three");
    }

    #[test]
    fn test_undercard_duplicating_later_headline_is_purged() {
        let fights = vec![
            fight("Erika Cruz", "Amanda Serrano", DATE, "Venue, City", false),
            fight("Jaime Munguia", "Bruno Surace", DATE, "Venue, City", false),
            fight("ERIKA CRUZ", "AMANDA SERRANO", DATE, "Venue, City", true),
        ];
        let cards = group_cards(&fights);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].main_event.fighter1, "ERIKA CRUZ");
        assert_eq!(cards[0].undercards.len(), 1);
        assert_eq!(cards[0].undercards[0].fighter1, "Jaime Munguia");
    }

    #[test]
    fn test_duplicate_undercards_are_skipped() {
        let fights = vec![
            fight("Jaime Munguia", "Bruno Surace", DATE, "", false),
            fight("Munguia", "Surace", DATE, "", false),
            fight("Surace", "Jaime Munguia", DATE, "", false),
        ];
        let cards = group_cards(&fights);
        assert_eq!(cards.len(), 1);
        assert!(cards[0].undercards.is_empty());
    }

    #[test]
    fn test_card_backfills_details() {
        let mut first = fight("Alpha One", "Bravo Two", DATE, "Venue, City", false);
        first.broadcast = String::new();
        let mut second = fight("Charlie Three", "Delta Four", DATE, "Venue, City", false);
        second.broadcast = "LIVE ON DAZN".to_string();
        second.time = "7:00 PM".to_string();

        let cards = group_cards(&[first, second]);
        assert_eq!(cards[0].broadcast, "LIVE ON DAZN");
        assert_eq!(cards[0].time, "7:00 PM");
    }

    #[test]
    fn test_regrouping_own_output_is_stable() {
        let fights = vec![
            fight("Alpha One", "Bravo Two", DATE, "Venue, City", false),
            fight("CHARLIE THREE", "DELTA FOUR", DATE, "Venue, City", true),
            fight("Echo Five", "Foxtrot Six", DATE, "Venue, City", false),
        ];
        let cards = group_cards(&fights);
        assert_eq!(cards.len(), 1);

        let again = group_cards(&cards[0].fights());
        assert_eq!(again, cards);
    }

    #[test]
    fn test_card_details_follow_headline_not_arrival_order() {
        let mut undercard = fight("Moses Itauma", "Dillian Whyte", DATE, "Kingdom Arena, Riyadh", false);
        undercard.time = "6:00 PM".to_string();
        let mut headline = fight("TYSON FURY", "OLEKSANDR USYK", DATE, "Kingdom Arena, Riyadh, SA", true);
        headline.time = "8:00 PM".to_string();

        let cards = group_cards(&[undercard, headline]);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].location, "Kingdom Arena, Riyadh, SA");
        assert_eq!(cards[0].time, "8:00 PM");

        let again = group_cards(&cards[0].fights());
        assert_eq!(again, cards);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_cards(&[]).is_empty());
    }
}
