use scraper::{ElementRef, Html};
use std::time::Duration;

use crate::error::ScheduleError;

/// The schedule site serves a stripped page to unknown agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Elements whose text never shows up on screen
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head", "svg"];

/// Builds the HTTP client shared by every request in a run.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ScheduleError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Fetches HTML content from a URL
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, ScheduleError> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

/// Elements that start a new line, the way a browser lays out `innerText`.
/// Text inside anything else (`<b>`, `<span>`, `<a>`) joins the current line.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "option", "p", "pre", "section", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Flattens a page into the lines a reader would see. Inline text is joined
/// within its block, block boundaries and newlines break lines, whitespace is
/// collapsed and blank lines are removed.
pub fn visible_text_lines(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();
    let mut current = String::new();

    collect_lines(document.root_element(), &mut current, &mut lines);
    flush_line(&mut current, &mut lines);
    lines
}

fn collect_lines(element: ElementRef, current: &mut String, lines: &mut Vec<String>) {
    let name = element.value().name();
    if HIDDEN_ELEMENTS.contains(&name) {
        return;
    }

    let is_block = BLOCK_ELEMENTS.contains(&name);
    if is_block {
        flush_line(current, lines);
    }

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let mut segments = text.split('\n');
            if let Some(first) = segments.next() {
                current.push_str(first);
            }
            for segment in segments {
                flush_line(current, lines);
                current.push_str(segment);
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            collect_lines(child_element, current, lines);
        }
    }

    if is_block {
        flush_line(current, lines);
    }
}

fn flush_line(current: &mut String, lines: &mut Vec<String>) {
    let line = collapse_whitespace(current);
    if !line.is_empty() {
        lines.push(line);
    }
    current.clear();
}

/// True for non-empty strings made only of ASCII digits
pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Collapses runs of whitespace to a single space and trims the ends
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
