pub mod card;
pub mod classifier;
pub mod datetime;
pub mod error;
pub mod matcher;
pub mod output;
pub mod parser;
pub mod schedule;
pub mod utils;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================
pub use card::{card_key, group_cards, Card};
pub use classifier::{classify_line, looks_like_location, LineTag, ScanMode};
pub use datetime::{event_window, normalize_start, parse_event_date, parse_start_time};
pub use error::ScheduleError;
pub use matcher::{fighters_match, merge_fights, names_match, normalize_name};
pub use output::{print_cards, render_calendar, write_calendar, write_fights_csv, CALENDAR_OUTPUT_FILE};
pub use parser::{parse_fights, parse_step, Fight, ParseContext, TBD};
pub use schedule::{
    base_url, build_schedule, detail_url, extract_slugs, scrape_schedule, Schedule, ScrapeOptions,
    DEFAULT_SCHEDULE_URL,
};
pub use utils::visible_text_lines;
