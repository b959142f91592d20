use regex::Regex;
use std::sync::LazyLock;

use crate::utils::is_numeric;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Which kind of page a line sequence came from.
///
/// The listing page is terse and reliably formatted; detail pages carry far
/// more prose, so a few rules are stricter there and a few are looser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Listing,
    Detail,
}

/// Classification of a single line of visible page text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineTag {
    /// Short-form date, e.g. "Sat, Nov 22 2025"
    Date(String),
    /// Local start time with meridiem, e.g. "8:00 PM"
    Time(String),
    /// Start time given only in GMT, e.g. "19:00 GMT"
    GmtTime(String),
    /// Broadcast line, kept verbatim, e.g. "LIVE ON DAZN"
    Broadcast(String),
    /// The "VS" line between two contestant names
    Separator,
    Other,
}

impl LineTag {
    pub fn is_separator(&self) -> bool {
        matches!(self, LineTag::Separator)
    }
}

// ============================================================================
// KNOWN VALUES FOR LINE CLASSIFICATION
// ============================================================================

const BROADCAST_PREFIXES: &[&str] = &["LIVE ON ", "LIVE AND "];
const COUNTRY_CODES: &[&str] = &["US", "UK", "GB", "AU", "JP", "PR", "MX", "DE"];
const VENUE_KEYWORDS: &[&str] = &[
    "ARENA", "CENTER", "CENTRE", "STADIUM", "HALL",
    "THEATER", "THEATRE", "CASINO", "GARDEN", "LIVE",
];

/// Shortest line that can pass as a venue/location
const MIN_LOCATION_LEN: usize = 6;

// "Sat, Nov 22 2025"
static RE_SHORT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:Mon|Tue|Wed|Thu|Fri|Sat|Sun),\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2}\s+\d{4}$"
    ).unwrap()
});

// "Saturday, November 22, 2025" (detail pages only)
static RE_LONG_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<day>Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday),\s+(?P<month>January|February|March|April|May|June|July|August|September|October|November|December)\s+(?P<dom>\d{1,2}),?\s+(?P<year>\d{4})$"
    ).unwrap()
});

// "8:00 PM ET", "8:00PM", "10:30 am Pacific"
static RE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<clock>\d{1,2}:\d{2})\s*(?P<meridiem>AM|PM)(?:\s+\S.*)?$").unwrap()
});

// "19:00 GMT"
static RE_GMT_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<clock>\d{1,2}:\d{2})\s*GMT\b").unwrap()
});

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Classifies one trimmed line of page text.
///
/// Pattern misses are never errors; anything unrecognised is `Other` and may
/// still be picked up as a location by the fight extractor.
pub fn classify_line(line: &str, mode: ScanMode) -> LineTag {
    let line = line.trim();

    if is_separator(line, mode) {
        return LineTag::Separator;
    }

    if let Some(date) = match_date(line, mode) {
        return LineTag::Date(date);
    }

    if let Some(caps) = RE_TIME.captures(line) {
        return LineTag::Time(format!(
            "{} {}",
            &caps["clock"],
            caps["meridiem"].to_uppercase()
        ));
    }

    if let Some(caps) = RE_GMT_TIME.captures(line) {
        return LineTag::GmtTime(format!("{} GMT", &caps["clock"]));
    }

    if BROADCAST_PREFIXES.iter().any(|p| line.starts_with(p)) {
        return LineTag::Broadcast(line.to_string());
    }

    LineTag::Other
}

/// Listing pages always render the separator as an upper-case "VS";
/// detail pages are matched case-insensitively.
fn is_separator(line: &str, mode: ScanMode) -> bool {
    match mode {
        ScanMode::Listing => line == "VS",
        ScanMode::Detail => line.eq_ignore_ascii_case("vs"),
    }
}

/// Returns the short-form date for a date line. Long-form dates are only
/// recognised on detail pages and are rewritten into the short form.
fn match_date(line: &str, mode: ScanMode) -> Option<String> {
    if RE_SHORT_DATE.is_match(line) {
        return Some(line.to_string());
    }
    match mode {
        ScanMode::Detail => shorten_long_date(line),
        ScanMode::Listing => None,
    }
}

/// Rewrites "Saturday, November 22, 2025" as "Sat, Nov 22 2025".
pub fn shorten_long_date(line: &str) -> Option<String> {
    let caps = RE_LONG_DATE.captures(line.trim())?;
    Some(format!(
        "{}, {} {} {}",
        &caps["day"][..3],
        &caps["month"][..3],
        &caps["dom"],
        &caps["year"]
    ))
}

pub fn is_short_date(line: &str) -> bool {
    RE_SHORT_DATE.is_match(line.trim())
}

// ============================================================================
// LOCATION HEURISTICS
// ============================================================================

/// Decides whether an otherwise unclassified line reads like a venue.
///
/// Listing lines only need to look like "Place, City"; detail pages must
/// also end in a known country code or name a venue type.
pub fn looks_like_location(line: &str, mode: ScanMode) -> bool {
    let line = line.trim();

    let plausible = line.contains(',')
        && !line.starts_with('|')
        && !is_numeric(line)
        && !is_short_date(line)
        && !RE_LONG_DATE.is_match(line)
        && line.chars().count() >= MIN_LOCATION_LEN;

    if !plausible {
        return false;
    }

    match mode {
        ScanMode::Listing => true,
        ScanMode::Detail => has_country_suffix(line) || has_venue_keyword(line),
    }
}

fn has_country_suffix(line: &str) -> bool {
    COUNTRY_CODES
        .iter()
        .any(|code| line.ends_with(&format!(", {}", code)))
}

fn has_venue_keyword(line: &str) -> bool {
    let upper = line.to_uppercase();
    VENUE_KEYWORDS.iter().any(|kw| upper.contains(kw))
}

// ============================================================================
// TESTS
// ============================================================================
