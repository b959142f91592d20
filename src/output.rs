use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::card::Card;
use crate::datetime::event_window;
use crate::error::ScheduleError;
use crate::parser::Fight;

pub const CALENDAR_OUTPUT_FILE: &str = "boxing_schedule.ics";

const PRODID: &str = "-//Boxing Schedule//ringscraper//";
const CALENDAR_NAME: &str = "The Ring Boxing Schedule";
const UID_SUFFIX: &str = "@boxingcal";
const SOURCE_LINE: &str = "Source: The Ring Magazine";

/// Content lines longer than this many octets are folded
const MAX_LINE_OCTETS: usize = 75;

const ICS_TIMESTAMP: &str = "%Y%m%dT%H%M%SZ";

// ============================================================================
// CALENDAR FIELDS
// ============================================================================

/// Headline in upper case, followed by the undercard titles when present
pub fn card_summary(card: &Card) -> String {
    let headline = card.main_event.title.to_uppercase();
    if card.undercards.is_empty() {
        return headline;
    }
    let undercards: Vec<&str> = card.undercards.iter().map(|f| f.title.as_str()).collect();
    format!("{}: {}", headline, undercards.join(", "))
}

pub fn card_description(card: &Card) -> String {
    let mut lines = vec![format!("Main Event: {}", card.main_event.title)];

    if !card.undercards.is_empty() {
        lines.push("Undercard:".to_string());
        lines.extend(card.undercards.iter().map(|f| format!("- {}", f.title)));
    }

    lines.push(format!("Location: {}", or_tba(&card.location)));
    lines.push(format!("Broadcast: {}", or_tba(&card.broadcast)));
    lines.push(format!("Time: {}", or_tba(&card.time)));
    lines.push(SOURCE_LINE.to_string());
    lines.join("\n")
}

fn or_tba(value: &str) -> &str {
    if value.is_empty() {
        "TBA"
    } else {
        value
    }
}

/// Alphanumeric headline + start date + fixed tag. Two cards with the same
/// headline on the same day collide.
pub fn card_uid(card: &Card, start: DateTime<Utc>) -> String {
    let title: String = card
        .main_event
        .title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    format!("{}{}{}", title, start.format("%Y%m%d"), UID_SUFFIX)
}

// ============================================================================
// ICALENDAR SERIALIZATION
// ============================================================================

/// Escapes a TEXT property value.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}

/// Splits a content line into 75-octet pieces, continuation lines starting
/// with a single space. Never splits inside a UTF-8 sequence.
fn fold_line(line: &str) -> String {
    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut octets = 0;

    for ch in line.chars() {
        let width = ch.len_utf8();
        if octets + width > MAX_LINE_OCTETS {
            folded.push_str("\r\n ");
            octets = 1;
        }
        folded.push(ch);
        octets += width;
    }

    folded.push_str("\r\n");
    folded
}

fn push_property(out: &mut String, name: &str, value: &str) {
    out.push_str(&fold_line(&format!("{}:{}", name, value)));
}

fn push_text_property(out: &mut String, name: &str, value: &str) {
    push_property(out, name, &escape_text(value));
}

/// Renders the cards as an iCalendar document, one VEVENT per card.
pub fn render_calendar(cards: &[Card], generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    push_property(&mut out, "BEGIN", "VCALENDAR");
    push_property(&mut out, "VERSION", "2.0");
    push_property(&mut out, "PRODID", PRODID);
    push_text_property(&mut out, "X-WR-CALNAME", CALENDAR_NAME);

    let stamp = generated_at.format(ICS_TIMESTAMP).to_string();

    for card in cards {
        let (start, end) = event_window(&card.date_raw, &card.time, generated_at);

        push_property(&mut out, "BEGIN", "VEVENT");
        push_property(&mut out, "UID", &card_uid(card, start));
        push_property(&mut out, "DTSTAMP", &stamp);
        push_property(&mut out, "DTSTART", &start.format(ICS_TIMESTAMP).to_string());
        push_property(&mut out, "DTEND", &end.format(ICS_TIMESTAMP).to_string());
        push_text_property(&mut out, "SUMMARY", &card_summary(card));
        push_text_property(&mut out, "DESCRIPTION", &card_description(card));
        if !card.location.is_empty() {
            push_text_property(&mut out, "LOCATION", &card.location);
        }
        push_property(&mut out, "END", "VEVENT");
    }

    push_property(&mut out, "END", "VCALENDAR");
    out
}

/// Writes the calendar file for the given cards.
pub fn write_calendar(path: &Path, cards: &[Card], generated_at: DateTime<Utc>) -> Result<(), ScheduleError> {
    let mut file = File::create(path)?;
    file.write_all(render_calendar(cards, generated_at).as_bytes())?;
    info!("Calendar with {} events written to {}", cards.len(), path.display());
    Ok(())
}

// ============================================================================
// CSV OUTPUT
// ============================================================================

/// Writes one row per fight to a CSV file
pub fn write_fights_csv(path: &Path, fights: &[Fight]) -> Result<(), ScheduleError> {
    let mut writer = csv::Writer::from_path(path)?;
    for fight in fights {
        writer.serialize(fight)?;
    }
    writer.flush()?;
    info!("{} fights written to {}", fights.len(), path.display());
    Ok(())
}

// ============================================================================
// CONSOLE OUTPUT
// ============================================================================

/// Prints a readable summary of every card to stdout
pub fn print_cards(cards: &[Card]) {
    for card in cards {
        println!("\n{}", card.main_event.title.to_uppercase());
        println!("{:-<80}", "");
        println!("Date:      {}", card.date_raw);
        println!("Time:      {}", or_tba(&card.time));
        println!("Location:  {}", or_tba(&card.location));
        println!("Broadcast: {}", or_tba(&card.broadcast));

        if !card.undercards.is_empty() {
            println!("Undercard:");
            for fight in &card.undercards {
                println!("  - {}", fight.title);
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_card() -> Card {
        let mut main = Fight::new("TYSON FURY", "OLEKSANDR USYK");
        main.is_main_event = true;
        Card {
            main_event: main,
            undercards: vec![
                Fight::new("Moses Itauma", "Dillian Whyte"),
                Fight::new("Johnny Fisher", "Dave Allen"),
            ],
            date_raw: "Sat, Nov 22 2025".to_string(),
            location: "Kingdom Arena, Riyadh, SA".to_string(),
            time: "8:00 PM".to_string(),
            broadcast: "LIVE ON DAZN".to_string(),
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_summary_lists_undercards() {
        assert_eq!(
            card_summary(&sample_card()),
            "TYSON FURY VS OLEKSANDR USYK: Moses Itauma vs Dillian Whyte, Johnny Fisher vs Dave Allen"
        );

        let mut card = sample_card();
        card.undercards.clear();
        assert_eq!(card_summary(&card), "TYSON FURY VS OLEKSANDR USYK");
    }

    #[test]
    fn test_description_layout() {
        let description = card_description(&sample_card());
        let lines: Vec<&str> = description.lines().collect();
        assert_eq!(lines[0], "Main Event: TYSON FURY vs OLEKSANDR USYK");
        assert_eq!(lines[1], "Undercard:");
        assert_eq!(lines[2], "- Moses Itauma vs Dillian Whyte");
        assert!(lines.contains(&"Location: Kingdom Arena, Riyadh, SA"));
        assert!(lines.contains(&"Broadcast: LIVE ON DAZN"));
        assert!(lines.contains(&"Time: 8:00 PM"));
        assert_eq!(lines.last(), Some(&SOURCE_LINE));
    }

    #[test]
    fn test_uid_is_deterministic() {
        let start = Utc.with_ymd_and_hms(2025, 11, 22, 20, 0, 0).unwrap();
        assert_eq!(
            card_uid(&sample_card(), start),
            "TYSONFURYvsOLEKSANDRUSYK20251122@boxingcal"
        );
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
    }

    #[test]
    fn test_fold_line() {
        let short = fold_line("SUMMARY:short");
        assert_eq!(short, "SUMMARY:short\r\n");

        let long = format!("SUMMARY:{}", "x".repeat(100));
        let folded = fold_line(&long);
        let pieces: Vec<&str> = folded.trim_end_matches("\r\n").split("\r\n").collect();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].len(), 75);
        assert!(pieces[1].starts_with(' '));
        assert_eq!(pieces.concat().replacen(' ', "", 1), long);
    }

    #[test]
    fn test_fold_respects_utf8() {
        let long = format!("SUMMARY:{}", "é".repeat(60));
        for piece in fold_line(&long).split("\r\n") {
            assert!(piece.len() <= MAX_LINE_OCTETS);
        }
    }

    #[test]
    fn test_render_calendar() {
        let ics = render_calendar(&[sample_card()], generated_at());
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("PRODID:-//Boxing Schedule//ringscraper//\r\n"));
        assert!(ics.contains("DTSTART:20251122T200000Z\r\n"));
        assert!(ics.contains("DTEND:20251123T000000Z\r\n"));
        assert!(ics.contains("DTSTAMP:20251101T120000Z\r\n"));
        assert!(ics.contains("UID:TYSONFURYvsOLEKSANDRUSYK20251122@boxingcal\r\n"));
        assert!(ics.contains("LOCATION:Kingdom Arena\\, Riyadh\\, SA\r\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    }

    #[test]
    fn test_write_fights_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fights.csv");
        write_fights_csv(&path, &sample_card().fights()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("fighter1,fighter2,title,date_raw,location,time,broadcast,is_main_event")
        );
        assert_eq!(
            lines.next(),
            Some("TYSON FURY,OLEKSANDR USYK,TYSON FURY vs OLEKSANDR USYK,TBD,,,,true")
        );
        assert_eq!(contents.lines().count(), 4);
    }
}
