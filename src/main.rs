use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boxing_schedule_scraper::{
    print_cards, scrape_schedule, write_calendar, write_fights_csv, ScrapeOptions,
    CALENDAR_OUTPUT_FILE, DEFAULT_SCHEDULE_URL,
};

// ============================================================================
// COMMAND LINE
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "boxing_schedule_scraper",
    about = "Scrape The Ring's boxing schedule into an iCalendar file"
)]
struct ScrapeArgs {
    /// Schedule listing page
    #[arg(long, env = "BOXING_SCHEDULE_URL", default_value = DEFAULT_SCHEDULE_URL)]
    url: String,

    /// Calendar file to write
    #[arg(short, long, env = "BOXING_SCHEDULE_OUTPUT", default_value = CALENDAR_OUTPUT_FILE)]
    output: PathBuf,

    /// Also write the merged fight list as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Only read the listing page, skip fight detail pages
    #[arg(long)]
    no_details: bool,

    /// Detail pages fetched at once
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Parse a saved copy of the listing page instead of fetching it
    #[arg(long)]
    html_file: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl From<&ScrapeArgs> for ScrapeOptions {
    fn from(args: &ScrapeArgs) -> Self {
        ScrapeOptions {
            url: args.url.clone(),
            details: !args.no_details,
            concurrency: args.concurrency.max(1),
            timeout: Duration::from_secs(args.timeout_secs),
            html_file: args.html_file.clone(),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "boxing_schedule_scraper=debug"
    } else {
        "boxing_schedule_scraper=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// ============================================================================
// MAIN
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = ScrapeArgs::parse();
    init_logging(args.verbose);

    let schedule = scrape_schedule(&ScrapeOptions::from(&args)).await?;

    write_calendar(&args.output, &schedule.cards, Utc::now())?;
    if let Some(ref csv_path) = args.csv {
        write_fights_csv(csv_path, &schedule.fights)?;
    }

    print_cards(&schedule.cards);
    println!(
        "\n{} cards ({} fights) written to {}",
        schedule.cards.len(),
        schedule.fights.len(),
        args.output.display()
    );
    Ok(())
}
