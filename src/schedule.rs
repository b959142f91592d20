use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::card::{group_cards, Card};
use crate::classifier::ScanMode;
use crate::error::ScheduleError;
use crate::matcher::merge_fights;
use crate::parser::{parse_fights, Fight};
use crate::utils::{build_client, fetch_html, visible_text_lines};

pub const DEFAULT_SCHEDULE_URL: &str = "https://ringmagazine.com/en/schedule/fights";

/// Path prefix shared by the listing and every fight detail page
pub const FIGHTS_PATH: &str = "/en/schedule/fights/";

/// Pause before each detail request to be nice to the server
const REQUEST_DELAY: Duration = Duration::from_millis(100);

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Settings for one scraping run
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub url: String,
    /// Fetch and scan each fight's detail page
    pub details: bool,
    /// Detail pages in flight at once; 1 keeps requests strictly sequential
    pub concurrency: usize,
    pub timeout: Duration,
    /// Read the listing from a saved page instead of fetching it
    pub html_file: Option<PathBuf>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        ScrapeOptions {
            url: DEFAULT_SCHEDULE_URL.to_string(),
            details: true,
            concurrency: 1,
            timeout: Duration::from_secs(60),
            html_file: None,
        }
    }
}

/// Everything a run produced: the merged fight list and the cards built from it
#[derive(Debug)]
pub struct Schedule {
    pub fights: Vec<Fight>,
    pub cards: Vec<Card>,
}

// ============================================================================
// SLUGS AND URLS
// ============================================================================

/// Pulls the fight slug out of a link, e.g. "/en/schedule/fights/fury-usyk-3"
/// or its absolute form.
fn slug_from_href(href: &str) -> Option<String> {
    let (_, rest) = href.split_once(FIGHTS_PATH)?;
    let slug = rest
        .split(|c: char| c == '/' || c == '?' || c == '#')
        .next()?
        .trim();

    if slug.is_empty() {
        return None;
    }
    Some(slug.to_string())
}

/// Collects every distinct fight slug linked from the page, sorted ascending.
pub fn extract_slugs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();

    let mut slugs: Vec<String> = document
        .select(&selector)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(slug_from_href)
        .collect();

    slugs.sort();
    slugs.dedup();
    slugs
}

/// Scheme and host of the listing URL, e.g. "https://ringmagazine.com"
pub fn base_url(url: &str) -> Result<String, ScheduleError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| ScheduleError::InvalidUrl(format!("{}: {}", url, e)))?;
    if !parsed.has_host() {
        return Err(ScheduleError::InvalidUrl(format!("{}: missing host", url)));
    }
    Ok(parsed.origin().ascii_serialization())
}

pub fn detail_url(base: &str, slug: &str) -> String {
    format!("{}{}{}", base.trim_end_matches('/'), FIGHTS_PATH, slug)
}

// ============================================================================
// PARSING PIPELINE
// ============================================================================

/// Turns already-fetched page lines into merged fights and finalized cards.
/// Listing fights come first, then detail pages in the order given.
pub fn build_schedule<S: AsRef<str>>(listing_lines: &[S], detail_pages: &[Vec<String>]) -> Schedule {
    let listing = parse_fights(listing_lines, ScanMode::Listing);
    info!("Found {} fights on the listing page", listing.len());

    let detail = detail_pages
        .iter()
        .flat_map(|lines| parse_fights(lines, ScanMode::Detail));
    let fights = merge_fights(listing, detail);

    let cards = group_cards(&fights);
    info!("Grouped {} fights into {} cards", fights.len(), cards.len());

    Schedule { fights, cards }
}

// ============================================================================
// SCRAPING
// ============================================================================

/// Loads the listing, optionally scans detail pages, and builds the cards.
/// An empty result is an error so scheduled runs notice layout changes.
pub async fn scrape_schedule(options: &ScrapeOptions) -> Result<Schedule, ScheduleError> {
    let client = build_client(options.timeout)?;

    let (html, fetch_details) = match &options.html_file {
        Some(path) => {
            info!("Reading saved listing from {}", path.display());
            (std::fs::read_to_string(path)?, false)
        }
        None => {
            info!("Loading schedule from {}", options.url);
            let html = fetch_html(&client, &options.url).await.unwrap_or_else(|e| {
                warn!("Schedule page failed to load: {}", e);
                String::new()
            });
            (html, options.details)
        }
    };

    let listing_lines = visible_text_lines(&html);
    debug!("Listing page has {} visible lines", listing_lines.len());

    let detail_pages = if fetch_details {
        let base = base_url(&options.url)?;
        let slugs = extract_slugs(&html);
        info!("Scanning {} fight detail pages", slugs.len());
        fetch_detail_pages(&client, &base, &slugs, options.concurrency).await
    } else {
        Vec::new()
    };

    let schedule = build_schedule(&listing_lines, &detail_pages);
    if schedule.cards.is_empty() {
        return Err(ScheduleError::NoFightsFound);
    }
    Ok(schedule)
}

/// Fetches detail pages in slug order. Failed pages are logged and skipped.
async fn fetch_detail_pages(
    client: &reqwest::Client,
    base: &str,
    slugs: &[String],
    concurrency: usize,
) -> Vec<Vec<String>> {
    stream::iter(slugs)
        .map(|slug| {
            let url = detail_url(base, slug);
            async move {
                tokio::time::sleep(REQUEST_DELAY).await;
                let result = fetch_html(client, &url).await;
                (url, result)
            }
        })
        .buffered(concurrency.max(1))
        .filter_map(|(url, result)| async move {
            match result {
                Ok(html) => Some(visible_text_lines(&html)),
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    None
                }
            }
        })
        .collect()
        .await
}

// ============================================================================
// TESTS
// ============================================================================
