//! Reading statement data and page details from a loaded surface.
//!
//! Statement elements are reactive components. Their current state can be read
//! live through the component handle named by the element's `wire:id`, or,
//! for the state the page was rendered with, from the `wire:initial-data`
//! attribute.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use findata_core::{
    Attempt, CompanyInfo, Locator, PeriodKind, RawPeriodPayload, ScrapeConfig, StatementKind,
    Surface,
};

/// Elements that carry the company name in the page header.
const COMPANY_HEADER: &str = ".security-header h1, .company-name, h1.title";

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Currency:\s*([A-Z]{3})").expect("Failed to compile currency regex")
});

#[derive(Deserialize)]
struct InitialData {
    #[serde(rename = "serverMemo")]
    server_memo: ServerMemo,
}

#[derive(Deserialize)]
struct ServerMemo {
    data: RawPeriodPayload,
}

fn statement_element(statement: StatementKind) -> Locator {
    Locator::css(statement.marker_selector())
}

/// The period dropdown of a statement.
#[must_use]
pub fn period_control(statement: StatementKind) -> Locator {
    Locator::css(format!("{} .vperiod.dropdown", statement.marker_selector()))
}

fn period_menu(statement: StatementKind) -> Locator {
    Locator::css(format!("{} .vperiod.dropdown .menu", statement.marker_selector()))
}

/// The options of a statement's period dropdown.
#[must_use]
pub fn period_options(statement: StatementKind) -> Locator {
    Locator::css(format!(
        "{} .vperiod.dropdown .menu .item",
        statement.marker_selector()
    ))
}

fn usable(payload: RawPeriodPayload) -> Attempt<RawPeriodPayload> {
    if payload.is_empty() {
        Attempt::Empty
    } else {
        Attempt::Success(payload)
    }
}

/// Builds the script that serializes a live component's statement state.
///
/// Returns `None` for handles that cannot be embedded in a string literal.
fn live_state_script(wire_id: &str) -> Option<String> {
    if wire_id.is_empty()
        || !wire_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return None;
    }

    Some(format!(
        "(function() {{ \
            var component = window.Livewire && window.Livewire.find('{wire_id}'); \
            if (!component) {{ return null; }} \
            return JSON.stringify({{ \
                dates: component.get('dates'), \
                fieldsData: component.get('fieldsData'), \
                selectedPeriod: component.get('selectedPeriod') \
            }}); \
        }})()"
    ))
}

/// Reads the statement's current state from its live component.
pub fn read_live_state<S: Surface>(
    surface: &S,
    statement: StatementKind,
) -> Attempt<RawPeriodPayload> {
    let wire_id = match surface.attribute(&statement_element(statement), "wire:id") {
        Ok(Some(id)) => id,
        Ok(None) => return Attempt::Empty,
        Err(e) => {
            debug!(statement = %statement, error = %e, "Could not read component handle");
            return Attempt::Empty;
        }
    };
    let Some(script) = live_state_script(&wire_id) else {
        debug!(statement = %statement, wire_id = %wire_id, "Unusable component handle");
        return Attempt::Empty;
    };

    let parsed = match surface.evaluate(&script) {
        Ok(Some(Value::String(json))) => serde_json::from_str::<RawPeriodPayload>(&json),
        Ok(Some(Value::Null) | None) => return Attempt::Empty,
        Ok(Some(value)) => serde_json::from_value::<RawPeriodPayload>(value),
        Err(e) => {
            debug!(statement = %statement, error = %e, "Live state read failed");
            return Attempt::Empty;
        }
    };

    match parsed {
        Ok(payload) => usable(payload),
        Err(e) => {
            debug!(statement = %statement, error = %e, "Live state is not a statement payload");
            Attempt::Empty
        }
    }
}

/// Parses a `wire:initial-data` attribute value.
pub fn parse_initial_data(raw: &str) -> Option<RawPeriodPayload> {
    serde_json::from_str::<InitialData>(raw)
        .map(|data| data.server_memo.data)
        .map_err(|e| debug!(error = %e, "Initial data is not a statement payload"))
        .ok()
}

/// Reads the state the statement was rendered with.
pub fn read_initial_data<S: Surface>(
    surface: &S,
    statement: StatementKind,
) -> Attempt<RawPeriodPayload> {
    match surface.attribute(&statement_element(statement), "wire:initial-data") {
        Ok(Some(raw)) => parse_initial_data(&raw).map_or(Attempt::Empty, usable),
        Ok(None) => Attempt::Empty,
        Err(e) => {
            debug!(statement = %statement, error = %e, "Could not read initial data");
            Attempt::Empty
        }
    }
}

/// Reads the statement payload, preferring live state over initial data.
pub fn read_payload<S: Surface>(
    surface: &S,
    statement: StatementKind,
) -> Attempt<RawPeriodPayload> {
    read_live_state(surface, statement).or_else(|| {
        debug!(statement = %statement, "Falling back to initial data");
        read_initial_data(surface, statement)
    })
}

/// Reads the company's display name and reporting currency.
///
/// Falls back to the upper-cased ticker and `USD` when the page does not show them.
pub fn read_company_info<S: Surface>(surface: &S, ticker: &str) -> CompanyInfo {
    let display_name = surface
        .texts(&Locator::css(COMPANY_HEADER))
        .ok()
        .and_then(|texts| {
            texts
                .into_iter()
                .map(|t| t.trim().to_string())
                .find(|t| !t.is_empty())
        })
        .unwrap_or_else(|| ticker.to_uppercase());

    let currency_code = surface
        .texts(&Locator::text("Currency:"))
        .ok()
        .and_then(|texts| {
            texts.iter().find_map(|t| {
                CURRENCY_RE
                    .captures(t)
                    .map(|caps| caps[1].to_string())
            })
        })
        .unwrap_or_else(|| "USD".to_string());

    debug!(name = %display_name, currency = %currency_code, "Read company info");
    CompanyInfo::new(display_name, currency_code)
}

/// Outcome of switching a statement's period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeriodSwitch {
    /// The option was clicked.
    Switched,
    /// The period dropdown could not be opened.
    ControlMissing,
    /// No option matched; carries the options that were offered.
    OptionMissing {
        /// Option texts found in the menu.
        available: Vec<String>,
    },
}

/// Index of the menu option for `period`.
///
/// An exact case-insensitive match wins over an option that merely contains the label.
#[must_use]
pub fn match_period_option(options: &[String], period: PeriodKind) -> Option<usize> {
    let wanted = period.label().to_lowercase();
    let options: Vec<String> = options.iter().map(|o| o.trim().to_lowercase()).collect();

    options
        .iter()
        .position(|o| *o == wanted)
        .or_else(|| options.iter().position(|o| o.contains(&wanted)))
}

/// Opens the statement's period dropdown and clicks the option for `period`.
pub fn select_period<S: Surface>(
    surface: &S,
    statement: StatementKind,
    period: PeriodKind,
    config: &ScrapeConfig,
) -> PeriodSwitch {
    if let Err(e) = surface.click(&period_control(statement), 0) {
        warn!(statement = %statement, period = %period, error = %e, "Period control not found");
        return PeriodSwitch::ControlMissing;
    }

    if !surface.wait_for(&period_menu(statement), config.menu_timeout) {
        surface.pause(config.menu_fallback_pause);
    }

    let options_locator = period_options(statement);
    let available = surface.texts(&options_locator).unwrap_or_default();
    let Some(idx) = match_period_option(&available, period) else {
        warn!(
            statement = %statement,
            period = %period,
            available = ?available,
            "No matching period option"
        );
        return PeriodSwitch::OptionMissing { available };
    };

    if let Err(e) = surface.click(&options_locator, idx) {
        warn!(statement = %statement, period = %period, error = %e, "Period option click failed");
        return PeriodSwitch::OptionMissing { available };
    }
    surface.pause(config.post_click_pause);

    debug!(statement = %statement, period = %period, "Switched period");
    PeriodSwitch::Switched
}
