//! Browser surface traits.
//!
//! A [`BrowserSession`] is one running browser; a [`Surface`] is an
//! independent navigable tab inside it. The scraper holds several surfaces
//! open at once and interleaves operations across them, so all methods are
//! synchronous and every wait takes an explicit bound.
//!
//! - [`Locator`] - How an element is found (CSS selector or visible text)
//! - [`Surface`] - Operations the scraper needs from one tab
//! - [`BrowserSession`] - Factory for surfaces
//! - [`Attempt`] - Outcome of one bounded extraction attempt

use serde_json::Value;
use std::fmt::{self, Debug};
use std::time::Duration;

use crate::error::Result;

/// How to find elements on a page.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Locator {
    /// A CSS selector.
    Css(String),
    /// Any element whose own text contains the given string.
    Text(String),
}

impl Locator {
    /// Creates a CSS locator.
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Creates a text locator.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(selector) => write!(f, "css `{selector}`"),
            Self::Text(text) => write!(f, "text `{text}`"),
        }
    }
}

/// One navigable browser tab.
///
/// Lookups that find nothing return `Ok(None)` / empty vectors; `Err` is
/// reserved for the browser itself failing.
pub trait Surface: Send + Debug {
    /// Loads `url` in this surface.
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Waits up to `timeout` for an element matching `locator`.
    ///
    /// Returns false on timeout.
    fn wait_for(&self, locator: &Locator, timeout: Duration) -> bool;

    /// Reads attribute `name` of the first element matching `locator`.
    fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>>;

    /// Evaluates a JavaScript expression and returns its value.
    fn evaluate(&self, script: &str) -> Result<Option<Value>>;

    /// Visible text of every element matching `locator`, in document order.
    fn texts(&self, locator: &Locator) -> Result<Vec<String>>;

    /// Clicks the `index`-th element matching `locator` through a script click.
    fn click(&self, locator: &Locator, index: usize) -> Result<()>;

    /// Full visible text of the page body.
    fn body_text(&self) -> Result<String>;

    /// Pauses the surface's driver for `duration`.
    ///
    /// Implementations backed by a real browser sleep; test doubles may return immediately.
    fn pause(&self, duration: Duration);

    /// Closes the surface. Further calls on a closed surface fail.
    fn close(&mut self) -> Result<()>;
}

/// A running browser that can open surfaces.
pub trait BrowserSession: Send + Sync + Debug {
    /// The surface type this session produces.
    type Surface: Surface;

    /// Opens a new, blank surface.
    fn open_surface(&self) -> Result<Self::Surface>;
}

/// Outcome of one bounded attempt to read data from a surface.
#[derive(Clone, Debug, PartialEq)]
pub enum Attempt<T> {
    /// Data was read.
    Success(T),
    /// The expected marker never appeared within its bound.
    Timeout,
    /// The read completed but yielded nothing usable.
    Empty,
}

impl<T> Attempt<T> {
    /// Converts into an `Option`, discarding the failure reason.
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Timeout | Self::Empty => None,
        }
    }

    /// Returns true if data was read.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Tries `fallback` unless this attempt already succeeded.
    pub fn or_else(self, fallback: impl FnOnce() -> Self) -> Self {
        match self {
            Self::Success(_) => self,
            Self::Timeout | Self::Empty => fallback(),
        }
    }
}
