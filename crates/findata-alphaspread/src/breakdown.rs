//! Revenue breakdown extraction.
//!
//! The breakdown page renders segment and geography splits as free text. Rows
//! beyond the first few are lazy-rendered behind "Show More" controls, so the
//! controls are clicked before the page text is parsed.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use findata_core::{
    BreakdownItem, BreakdownSection, Locator, ResolvedListing, RevenueBreakdown, ScrapeConfig,
    Surface,
};

/// Section markers and the section names they start.
const SECTION_MARKERS: &[(&str, &str)] = &[
    ("Breakdown by Geography", "Geography"),
    ("Breakdown by Segments", "Segments"),
];

/// Lines that end the breakdown part of the page.
const TERMINATORS: &[&str] = &["SEE ALSO", "Summary"];

const TOTAL_MARKER: &str = "Total Revenue:";

static ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?):\s*([\d.]+)([BMK]?)\s*USD").expect("Failed to compile item regex")
});

static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([\d.]+)([BMK]?)\s*USD").expect("Failed to compile amount regex")
});

/// Converts an amount with an optional magnitude suffix to millions.
///
/// Item amounts without a suffix are taken to be in millions already.
fn to_millions(number: &str, suffix: &str) -> Option<f64> {
    let value: f64 = number.parse().ok()?;
    Some(match suffix.to_ascii_uppercase().as_str() {
        "B" => value * 1000.0,
        "K" => value / 1000.0,
        _ => value,
    })
}

/// Like [`to_millions`], but a stated total without a suffix is in billions.
fn total_to_millions(number: &str, suffix: &str) -> Option<f64> {
    if suffix.is_empty() {
        return number.parse::<f64>().ok().map(|value| value * 1000.0);
    }
    to_millions(number, suffix)
}

#[derive(Default)]
struct SectionBuilder {
    name: Option<&'static str>,
    total: f64,
    items: Vec<BreakdownItem>,
}

impl SectionBuilder {
    /// Moves the current section into `out` if it has items, and starts `next`.
    fn flush(&mut self, out: &mut Vec<BreakdownSection>, next: Option<&'static str>) {
        let name = std::mem::replace(&mut self.name, next);
        let total = std::mem::take(&mut self.total);
        let items = std::mem::take(&mut self.items);

        let Some(name) = name else { return };
        if items.is_empty() {
            return;
        }
        let total = if total > 0.0 {
            total
        } else {
            items.iter().map(|i| i.value).sum()
        };
        out.push(BreakdownSection {
            name: name.to_string(),
            total,
            items,
        });
    }
}

/// Parses the text of a revenue breakdown page.
///
/// Sections start at "Breakdown by Geography" / "Breakdown by Segments";
/// `Total Revenue: <amount> USD` sets the section total and other
/// `<name>: <amount> USD` lines become items. Parsing stops at the first
/// terminator line inside a section. A missing or zero total is replaced by
/// the sum of the items; sections without items are dropped.
///
/// # Example
///
/// ```
/// use findata_alphaspread::breakdown::parse_breakdown;
///
/// let text = "Breakdown by Segments\nTotal Revenue: 10B USD\nHardware: 6B USD\nServices: 4B USD\nSEE ALSO";
/// let breakdown = parse_breakdown(text);
/// let segments = breakdown.section("Segments").unwrap();
/// assert_eq!(segments.total, 10_000.0);
/// assert_eq!(segments.items.len(), 2);
/// ```
#[must_use]
pub fn parse_breakdown(text: &str) -> RevenueBreakdown {
    let mut sections = Vec::new();
    let mut current = SectionBuilder::default();

    for line in text.lines().map(str::trim) {
        if let Some((_, name)) = SECTION_MARKERS.iter().find(|(m, _)| line.contains(m)) {
            current.flush(&mut sections, Some(name));
        }

        if current.name.is_none() {
            continue;
        }
        if TERMINATORS.iter().any(|t| line.contains(t)) {
            break;
        }

        if line.contains(TOTAL_MARKER) {
            if let Some(total) = AMOUNT_RE
                .captures(line)
                .and_then(|caps| total_to_millions(&caps[1], &caps[2]))
            {
                current.total = total;
            }
            continue;
        }

        if let Some(caps) = ITEM_RE.captures(line) {
            if let Some(value) = to_millions(&caps[2], &caps[3]) {
                current.items.push(BreakdownItem {
                    name: caps[1].trim().to_string(),
                    value,
                });
            }
        }
    }
    current.flush(&mut sections, None);

    RevenueBreakdown { sections }
}

/// Clicks every collapsed "Show More" control, in up to `config.expand_waves` waves.
///
/// Stops early once a wave finds nothing left to expand.
pub fn expand_all<S: Surface>(surface: &S, config: &ScrapeConfig) {
    let show_more = Locator::text("Show More");
    for wave in 0..config.expand_waves {
        let controls = match surface.texts(&show_more) {
            Ok(controls) => controls,
            Err(e) => {
                debug!(wave, error = %e, "Could not list expand controls");
                break;
            }
        };

        let collapsed: Vec<usize> = controls
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.contains("Show Less"))
            .map(|(idx, _)| idx)
            .collect();
        if collapsed.is_empty() {
            break;
        }

        for idx in &collapsed {
            if let Err(e) = surface.click(&show_more, *idx) {
                debug!(wave, index = idx, error = %e, "Expand click failed");
            }
        }
        debug!(wave, clicked = collapsed.len(), "Expanded breakdown rows");
        surface.pause(config.expand_pause);
    }
}

/// Loads the listing's breakdown page on `surface` and parses it.
///
/// Failures are logged and yield an empty breakdown.
pub fn fetch_breakdown<S: Surface>(
    surface: &mut S,
    listing: &ResolvedListing,
    config: &ScrapeConfig,
) -> RevenueBreakdown {
    let url = listing.breakdown_url(&config.base_url);
    if let Err(e) = surface.navigate(&url) {
        warn!(url = %url, error = %e, "Could not load revenue breakdown");
        return RevenueBreakdown::default();
    }

    if !surface.wait_for(&Locator::text("Breakdown by"), config.breakdown_timeout) {
        debug!(url = %url, "Breakdown marker not found, pausing");
        surface.pause(config.breakdown_fallback_pause);
    }

    expand_all(surface, config);

    match surface.body_text() {
        Ok(text) => {
            let breakdown = parse_breakdown(&text);
            debug!(sections = breakdown.sections.len(), "Parsed revenue breakdown");
            breakdown
        }
        Err(e) => {
            warn!(url = %url, error = %e, "Could not read revenue breakdown");
            RevenueBreakdown::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_block() {
        let text = "Breakdown by Segments\nSegment\tRevenue\t% of Total\nTotal Revenue: 10B USD\nHardware: 6B USD\nServices: 4B USD\nSEE ALSO";
        let breakdown = parse_breakdown(text);
        assert_eq!(breakdown.sections.len(), 1);

        let segments = breakdown.section("Segments").unwrap();
        assert_eq!(segments.total, 10_000.0);
        assert_eq!(
            segments.items,
            vec![
                BreakdownItem {
                    name: "Hardware".to_string(),
                    value: 6_000.0
                },
                BreakdownItem {
                    name: "Services".to_string(),
                    value: 4_000.0
                },
            ]
        );
    }

    #[test]
    fn test_multiple_sections_and_suffixes() {
        let text = "\
            Apple Revenue Breakdown\n\
            Breakdown by Geography\n\
            Americas: 167.05B USD\n\
            Greater China: 66.7B usd\n\
            Small Region: 250K USD\n\
            Breakdown by Segments\n\
            Total Revenue: 383.29B USD\n\
            iPhone: 200.58B USD\n\
            Wearables: 39845M USD\n\
            Summary\n\
            Ignored: 1B USD";
        let breakdown = parse_breakdown(text);
        let names: Vec<&str> = breakdown.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Geography", "Segments"]);

        let geography = breakdown.section("Geography").unwrap();
        assert_eq!(geography.items.len(), 3);
        assert!((geography.items[2].value - 0.25).abs() < 1e-9);
        let expected_total = 167_050.0 + 66_700.0 + 0.25;
        assert!((geography.total - expected_total).abs() < 1e-6);

        let segments = breakdown.section("Segments").unwrap();
        assert!((segments.total - 383_290.0).abs() < 1e-6);
        assert_eq!(segments.items[1].value, 39_845.0);
    }

    #[test]
    fn test_text_before_first_section_is_ignored() {
        let text = "Summary\nRevenue: 5B USD\nBreakdown by Segments\nCloud: 2B USD";
        let breakdown = parse_breakdown(text);
        assert_eq!(breakdown.sections.len(), 1);
        assert_eq!(breakdown.sections[0].total, 2_000.0);
    }

    #[test]
    fn test_empty_sections_are_dropped() {
        let text = "Breakdown by Geography\nNo data\nBreakdown by Segments\nCloud: 2B USD";
        let breakdown = parse_breakdown(text);
        let names: Vec<&str> = breakdown.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Segments"]);

        assert!(parse_breakdown("").is_empty());
    }

    #[test]
    fn test_to_millions() {
        assert_eq!(to_millions("1.5", "B"), Some(1500.0));
        assert_eq!(to_millions("12", "m"), Some(12.0));
        assert_eq!(to_millions("500", "K"), Some(0.5));
        assert_eq!(to_millions("42", ""), Some(42.0));
        assert_eq!(to_millions("1.2.3", "B"), None);

        assert_eq!(total_to_millions("42", ""), Some(42_000.0));
        assert_eq!(total_to_millions("42", "M"), Some(42.0));
    }

    #[test]
    fn test_bare_total_is_in_billions() {
        let text = "Breakdown by Segments\nTotal Revenue: 12 USD\nCloud: 8000 USD\nAds: 4B USD";
        let segments = parse_breakdown(text).section("Segments").cloned().unwrap();
        assert_eq!(segments.total, 12_000.0);
        assert_eq!(segments.items[0].value, 8_000.0);
        assert_eq!(segments.items[1].value, 4_000.0);
    }
}
