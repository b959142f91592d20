use serde::Serialize;
use tracing::debug;

use crate::classifier::{classify_line, looks_like_location, LineTag, ScanMode};
use crate::utils::is_numeric;

/// Placeholder date for fights whose date could not be located
pub const TBD: &str = "TBD";

/// How many lines past the second contestant are searched for fight details
pub const LOOKAHEAD_LINES: usize = 12;

/// Contestant names shorter than this are page noise
const MIN_NAME_LEN: usize = 3;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A single bout as scraped from the schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fight {
    pub fighter1: String,
    pub fighter2: String,
    pub title: String,
    pub date_raw: String,
    pub location: String,
    pub time: String,
    pub broadcast: String,
    /// Both names were rendered in upper case, which the listing uses for headliners
    pub is_main_event: bool,
}

impl Fight {
    /// Creates a fight with an unknown date and no details.
    pub fn new(fighter1: &str, fighter2: &str) -> Fight {
        Fight {
            fighter1: fighter1.to_string(),
            fighter2: fighter2.to_string(),
            title: format!("{} vs {}", fighter1, fighter2),
            date_raw: TBD.to_string(),
            location: String::new(),
            time: String::new(),
            broadcast: String::new(),
            is_main_event: false,
        }
    }

    /// Fills empty location/time/broadcast from another record of the same bout.
    /// Names and date are never touched.
    pub fn backfill_from(&mut self, other: &Fight) {
        fill_if_empty(&mut self.location, &other.location);
        fill_if_empty(&mut self.time, &other.time);
        fill_if_empty(&mut self.broadcast, &other.broadcast);
    }
}

fn fill_if_empty(slot: &mut String, value: &str) {
    if slot.is_empty() && !value.is_empty() {
        *slot = value.to_string();
    }
}

/// Running page context carried forward to fights that lack their own details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    pub date: Option<String>,
    pub location: Option<String>,
    pub time: Option<String>,
    pub broadcast: Option<String>,
}

impl ParseContext {
    /// Folds one classified line into the context.
    pub fn observe(mut self, tag: &LineTag) -> ParseContext {
        match tag {
            LineTag::Date(date) => self.date = Some(date.clone()),
            LineTag::Time(time) => self.time = Some(time.clone()),
            LineTag::GmtTime(time) if self.time.is_none() => self.time = Some(time.clone()),
            LineTag::Broadcast(broadcast) => self.broadcast = Some(broadcast.clone()),
            _ => {}
        }
        self
    }

    /// Whether a meridiem time (as opposed to a GMT fallback) is known
    fn has_local_time(&self) -> bool {
        self.time.as_deref().is_some_and(|t| !t.ends_with("GMT"))
    }

    /// Fight-specific findings become the context for the fights that follow.
    fn absorb(mut self, details: &FightDetails) -> ParseContext {
        if details.date.is_some() {
            self.date = details.date.clone();
        }
        if details.location.is_some() {
            self.location = details.location.clone();
        }
        if details.time.is_some() {
            self.time = details.time.clone();
        }
        if details.broadcast.is_some() {
            self.broadcast = details.broadcast.clone();
        }
        self
    }
}

/// Values found in the lookahead window of one fight
#[derive(Debug, Default)]
struct FightDetails {
    date: Option<String>,
    location: Option<String>,
    time: Option<String>,
    broadcast: Option<String>,
}

// ============================================================================
// SCHEDULE PARSING
// ============================================================================

/// Walks the page lines once and returns every fight found.
pub fn parse_fights<S: AsRef<str>>(lines: &[S], mode: ScanMode) -> Vec<Fight> {
    let lines: Vec<&str> = lines.iter().map(|l| l.as_ref().trim()).collect();
    let mut context = ParseContext::default();
    let mut fights = Vec::new();

    for i in 0..lines.len() {
        let (next, fight) = parse_step(context, &lines, i, mode);
        context = next;
        fights.extend(fight);
    }

    debug!("Parsed {} fights from {} lines ({:?})", fights.len(), lines.len(), mode);
    fights
}

/// Processes the line at `i`: updates the context from it and, when it is a
/// separator, extracts the fight around it.
pub fn parse_step(
    context: ParseContext,
    lines: &[&str],
    i: usize,
    mode: ScanMode,
) -> (ParseContext, Option<Fight>) {
    let tag = classify_line(lines[i], mode);

    if !tag.is_separator() {
        return (context.observe(&tag), None);
    }

    // A separator needs a name on either side
    if i == 0 || i + 1 >= lines.len() {
        return (context, None);
    }

    let (name1, name2) = (lines[i - 1], lines[i + 1]);
    if !is_valid_name(name1) || !is_valid_name(name2) {
        debug!("Rejected fight candidate {:?} vs {:?}", name1, name2);
        return (context, None);
    }

    let details = scan_details(lines, i, mode, &context);
    let fight = build_fight(name1, name2, mode, &details, &context);
    (context.absorb(&details), Some(fight))
}

/// Contestant names must be at least three characters, not numeric, and not a
/// title banner such as "WBC CHAMPION".
fn is_valid_name(name: &str) -> bool {
    name.chars().count() >= MIN_NAME_LEN
        && !name.to_uppercase().contains("CHAMPION")
        && !is_numeric(name)
}

fn is_all_caps(name: &str) -> bool {
    name.chars().any(|c| c.is_alphabetic()) && name == name.to_uppercase()
}

/// Scans up to `LOOKAHEAD_LINES` lines after the second contestant, stopping at
/// the next separator. The first match of each kind wins.
fn scan_details(lines: &[&str], sep_idx: usize, mode: ScanMode, context: &ParseContext) -> FightDetails {
    let mut details = FightDetails::default();
    let mut gmt_time: Option<String> = None;

    let start = sep_idx + 2;
    let end = (start + LOOKAHEAD_LINES).min(lines.len());

    for &line in lines.get(start..end).unwrap_or_default() {
        match classify_line(line, mode) {
            LineTag::Separator => break,
            LineTag::Date(date) => {
                details.date.get_or_insert(date);
            }
            LineTag::Time(time) => {
                details.time.get_or_insert(time);
            }
            LineTag::GmtTime(time) => {
                gmt_time.get_or_insert(time);
            }
            LineTag::Broadcast(broadcast) => {
                details.broadcast.get_or_insert(broadcast);
            }
            LineTag::Other => {
                if details.location.is_none() && looks_like_location(line, mode) {
                    details.location = Some(line.to_string());
                }
            }
        }
    }

    // GMT only stands in when no local time is known at all
    if details.time.is_none() && !context.has_local_time() {
        details.time = gmt_time;
    }

    details
}

fn build_fight(
    name1: &str,
    name2: &str,
    mode: ScanMode,
    details: &FightDetails,
    context: &ParseContext,
) -> Fight {
    let pick = |specific: &Option<String>, fallback: &Option<String>| {
        specific.clone().or_else(|| fallback.clone())
    };

    let mut fight = Fight::new(name1, name2);
    fight.is_main_event = mode == ScanMode::Listing && is_all_caps(name1) && is_all_caps(name2);
    if let Some(date) = pick(&details.date, &context.date) {
        fight.date_raw = date;
    }
    fight.location = pick(&details.location, &context.location).unwrap_or_default();
    fight.time = pick(&details.time, &context.time).unwrap_or_default();
    fight.broadcast = pick(&details.broadcast, &context.broadcast).unwrap_or_default();
    fight
}

// ============================================================================
// TESTS
// ============================================================================
