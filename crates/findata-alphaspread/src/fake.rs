//! Scripted in-memory browser used by the unit tests.

use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use findata_core::{
    BrowserSession, FinDataError, Locator, PeriodKind, ResolvedListing, Result, ScrapeConfig,
    StatementKind, Surface,
};

use crate::extract::{period_control, period_options};

pub(crate) const COMPANY_HEADER: &str = ".security-header h1, .company-name, h1.title";

/// Everything the fake browser was asked to do.
#[derive(Debug, Default)]
pub(crate) struct FakeLog {
    pub(crate) opened: usize,
    pub(crate) closed: usize,
    pub(crate) navigations: Vec<String>,
    pub(crate) clicks: Vec<String>,
    pub(crate) pauses: Vec<Duration>,
}

/// One page of the fake site.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakePage {
    pub(crate) css: HashSet<String>,
    pub(crate) texts: HashMap<String, Vec<String>>,
    pub(crate) attributes: HashMap<(String, String), String>,
    pub(crate) live: HashMap<PeriodKind, Value>,
    pub(crate) default_period: Option<PeriodKind>,
    pub(crate) body: String,
    pub(crate) expanded_body: Option<String>,
}

impl FakePage {
    /// A statement page serving `payloads`, showing `default_period` on load.
    pub(crate) fn statement(
        statement: StatementKind,
        payloads: Vec<(PeriodKind, Value)>,
        default_period: PeriodKind,
    ) -> Self {
        let marker = statement.marker_selector();
        let mut page = Self {
            default_period: Some(default_period),
            body: "Financials\nCurrency: USD".to_string(),
            ..Self::default()
        };

        page.css.insert(marker.clone());
        if let Locator::Css(control) = period_control(statement) {
            page.css.insert(format!("{control} .menu"));
            page.css.insert(control);
        }
        if let Locator::Css(options) = period_options(statement) {
            let labels = statement
                .supported_periods()
                .iter()
                .map(|p| p.label().to_string())
                .collect();
            page.texts.insert(options, labels);
        }

        page.attributes.insert(
            (marker.clone(), "wire:id".to_string()),
            format!("wire{}", statement.slug().len()),
        );
        if let Some((_, initial)) = payloads.iter().find(|(p, _)| *p == default_period) {
            page.attributes.insert(
                (marker, "wire:initial-data".to_string()),
                json!({"serverMemo": {"data": initial}}).to_string(),
            );
        }
        page.live = payloads.into_iter().collect();
        page
    }

    /// A statement page whose marker renders but that carries no data at all.
    pub(crate) fn broken_statement(statement: StatementKind) -> Self {
        let mut page = Self::default();
        page.css.insert(statement.marker_selector());
        page
    }

    /// Sets the company header text.
    pub(crate) fn with_company(mut self, name: &str, currency: &str) -> Self {
        self.texts
            .insert(COMPANY_HEADER.to_string(), vec![name.to_string()]);
        self.body = format!("{name}\nCurrency: {currency}");
        self
    }
}

/// A statement payload with one `Revenue` row.
pub(crate) fn revenue_payload(period: PeriodKind, dates: &[&str], revenue: &[f64]) -> Value {
    json!({
        "dates": dates,
        "fieldsData": {
            "Revenue": [{
                "name": "Revenue",
                "ingroupType": "important",
                "unit": "usd",
                "values": revenue.iter().map(|v| json!({"value": v})).collect::<Vec<_>>(),
            }]
        },
        "selectedPeriod": period.label(),
    })
}

/// Pages for a listing that serves every supported statement × period.
pub(crate) fn full_listing(
    config: &ScrapeConfig,
    listing: &ResolvedListing,
) -> HashMap<String, FakePage> {
    let mut pages = HashMap::new();
    for statement in StatementKind::ALL {
        let payloads = statement
            .supported_periods()
            .iter()
            .map(|&p| {
                let dates: &[&str] = match p {
                    PeriodKind::Annual => &["2023-09-30", "2022-09-30"],
                    PeriodKind::Quarterly | PeriodKind::Ttm => &["2024-03-31", "2024-06-30"],
                };
                (p, revenue_payload(p, dates, &[2_000_000.0, 1_000_000.0]))
            })
            .collect();
        let mut page = FakePage::statement(statement, payloads, PeriodKind::Annual);
        if statement == StatementKind::IncomeStatement {
            page = page.with_company("Apple Inc.", "USD");
        }
        pages.insert(listing.statement_url(&config.base_url, statement), page);
    }

    let breakdown = FakePage {
        body: "Breakdown by Segments\nTotal Revenue: 10B USD\nHardware: 6B USD\nShow More\nSEE ALSO"
            .to_string(),
        expanded_body: Some(
            "Breakdown by Segments\nTotal Revenue: 10B USD\nHardware: 6B USD\nServices: 4B USD\nShow Less\nSEE ALSO"
                .to_string(),
        ),
        ..FakePage::default()
    };
    pages.insert(listing.breakdown_url(&config.base_url), breakdown);
    pages
}

/// A fake browser serving a fixed set of pages.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSession {
    pages: Arc<HashMap<String, FakePage>>,
    pub(crate) log: Arc<Mutex<FakeLog>>,
}

impl FakeSession {
    pub(crate) fn new(pages: HashMap<String, FakePage>) -> Self {
        Self {
            pages: Arc::new(pages),
            log: Arc::default(),
        }
    }
}

impl BrowserSession for FakeSession {
    type Surface = FakeSurface;

    fn open_surface(&self) -> Result<FakeSurface> {
        self.log.lock().unwrap().opened += 1;
        Ok(FakeSurface {
            pages: Arc::clone(&self.pages),
            log: Arc::clone(&self.log),
            state: Mutex::default(),
            url: None,
            closed: false,
        })
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    selected: Option<PeriodKind>,
    menu_open: bool,
    expanded: bool,
}

/// One tab of the fake browser.
#[derive(Debug)]
pub(crate) struct FakeSurface {
    pages: Arc<HashMap<String, FakePage>>,
    log: Arc<Mutex<FakeLog>>,
    state: Mutex<SurfaceState>,
    url: Option<String>,
    closed: bool,
}

impl FakeSurface {
    fn page(&self) -> Option<&FakePage> {
        self.url.as_ref().and_then(|url| self.pages.get(url))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(FinDataError::Browser("surface is closed".to_string()));
        }
        Ok(())
    }

    fn body(&self) -> String {
        let expanded = self.state.lock().unwrap().expanded;
        self.page()
            .map(|page| match (&page.expanded_body, expanded) {
                (Some(body), true) => body.clone(),
                _ => page.body.clone(),
            })
            .unwrap_or_default()
    }
}

impl Surface for FakeSurface {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.ensure_open()?;
        self.log.lock().unwrap().navigations.push(url.to_string());
        self.url = Some(url.to_string());
        let selected = self.page().and_then(|p| p.default_period);
        *self.state.lock().unwrap() = SurfaceState {
            selected,
            ..SurfaceState::default()
        };
        Ok(())
    }

    fn wait_for(&self, locator: &Locator, _timeout: Duration) -> bool {
        match locator {
            Locator::Css(selector) if selector.ends_with(" .menu") => {
                self.state.lock().unwrap().menu_open
            }
            Locator::Css(selector) => self.page().is_some_and(|p| p.css.contains(selector)),
            Locator::Text(text) => self.body().contains(text.as_str()),
        }
    }

    fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        self.ensure_open()?;
        let Locator::Css(selector) = locator else {
            return Ok(None);
        };
        Ok(self
            .page()
            .and_then(|p| p.attributes.get(&(selector.clone(), name.to_string())))
            .cloned())
    }

    fn evaluate(&self, script: &str) -> Result<Option<Value>> {
        self.ensure_open()?;
        if !script.contains("Livewire.find") {
            return Ok(None);
        }
        let selected = self.state.lock().unwrap().selected;
        Ok(Some(
            self.page()
                .zip(selected)
                .and_then(|(page, period)| page.live.get(&period))
                .map_or(Value::Null, |payload| Value::String(payload.to_string())),
        ))
    }

    fn texts(&self, locator: &Locator) -> Result<Vec<String>> {
        self.ensure_open()?;
        Ok(match locator {
            Locator::Css(selector) => self
                .page()
                .and_then(|p| p.texts.get(selector))
                .cloned()
                .unwrap_or_default(),
            Locator::Text(text) => self
                .body()
                .lines()
                .filter(|line| line.contains(text.as_str()))
                .map(str::to_string)
                .collect(),
        })
    }

    fn click(&self, locator: &Locator, index: usize) -> Result<()> {
        self.ensure_open()?;
        let url = self.url.clone().unwrap_or_default();
        let page = self
            .page()
            .ok_or_else(|| FinDataError::Browser("no page loaded".to_string()))?;
        let mut state = self.state.lock().unwrap();

        match locator {
            Locator::Css(selector) if selector.ends_with(".vperiod.dropdown") => {
                if !page.css.contains(selector) {
                    return Err(FinDataError::Browser(format!("no element {selector}")));
                }
                state.menu_open = true;
            }
            Locator::Css(selector) if selector.ends_with(".menu .item") => {
                let option = page
                    .texts
                    .get(selector)
                    .and_then(|options| options.get(index))
                    .ok_or_else(|| FinDataError::Browser(format!("no option {index}")))?;
                self.log
                    .lock()
                    .unwrap()
                    .clicks
                    .push(format!("{url} -> {option}"));
                if let Ok(period) = option.parse::<PeriodKind>() {
                    if page.live.contains_key(&period) {
                        state.selected = Some(period);
                    }
                }
                state.menu_open = false;
            }
            Locator::Text(text) if text == "Show More" => {
                state.expanded = true;
                self.log.lock().unwrap().clicks.push(format!("{url} -> {text}"));
            }
            other => return Err(FinDataError::Browser(format!("cannot click {other}"))),
        }
        Ok(())
    }

    fn body_text(&self) -> Result<String> {
        self.ensure_open()?;
        Ok(self.body())
    }

    fn pause(&self, duration: Duration) {
        self.log.lock().unwrap().pauses.push(duration);
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.closed = true;
        self.log.lock().unwrap().closed += 1;
        Ok(())
    }
}
