use thiserror::Error;

/// Errors surfaced by the scraper.
///
/// Most parse problems never reach this type: unmatched lines, rejected
/// fight candidates and unparseable dates degrade to fewer records instead.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No fights found on the schedule page; the page layout may have changed")]
    NoFightsFound,
}
