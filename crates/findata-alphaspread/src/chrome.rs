//! Headless Chrome backend.
//!
//! DOM work is done with small scripts evaluated in the page. Selectors and
//! search texts are embedded as JSON string literals, and anything non-scalar
//! comes back `JSON.stringify`-ed.

use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use findata_core::{BrowserSession, FinDataError, Locator, Result, Surface};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Interval between checks while waiting for text or a parsed document.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Ready state of the document being loaded; `loading` until it is parsed.
const READY_STATE: &str = "document.URL === 'about:blank' ? 'loading' : document.readyState";

fn browser_error(e: impl fmt::Display) -> FinDataError {
    FinDataError::Browser(e.to_string())
}

/// When a navigation counts as finished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageLoad {
    /// Once the DOM is parsed; images, fonts and late scripts may still load.
    #[default]
    Eager,
    /// Once the page's load event fired.
    Complete,
}

/// Launch settings for [`ChromeSession`].
#[derive(Clone, Debug)]
pub struct ChromeOptions {
    /// Run without a visible window.
    pub headless: bool,
    /// Keep Chrome's sandbox enabled. Containers usually need it off.
    pub sandbox: bool,
    /// Window size in pixels.
    pub window_size: (u32, u32),
    /// User agent sent with every request.
    pub user_agent: String,
    /// Browser is shut down after this long without any activity.
    pub idle_timeout: Duration,
    /// Default timeout for element lookups, also the bound of an eager page load.
    pub element_timeout: Duration,
    /// When a navigation counts as finished.
    pub page_load: PageLoad,
    /// Skip downloading images.
    pub block_images: bool,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            window_size: (1920, 1080),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            idle_timeout: Duration::from_secs(300),
            element_timeout: Duration::from_secs(10),
            page_load: PageLoad::Eager,
            block_images: true,
        }
    }
}

impl ChromeOptions {
    /// Shows the browser window when `headful` is true.
    #[must_use]
    pub const fn with_headful(mut self, headful: bool) -> Self {
        self.headless = !headful;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets when a navigation counts as finished.
    #[must_use]
    pub const fn with_page_load(mut self, page_load: PageLoad) -> Self {
        self.page_load = page_load;
        self
    }

    /// Downloads images too when `load_images` is true.
    #[must_use]
    pub const fn with_images(mut self, load_images: bool) -> Self {
        self.block_images = !load_images;
        self
    }

    fn extra_args(&self) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("--disable-dev-shm-usage"),
            OsString::from("--disable-gpu"),
            OsString::from("--disable-extensions"),
            OsString::from("--disable-infobars"),
            OsString::from("--disable-notifications"),
            OsString::from("--disk-cache-size=4096"),
            OsString::from(format!("--user-agent={}", self.user_agent)),
        ];
        if self.block_images {
            args.push(OsString::from("--blink-settings=imagesEnabled=false"));
        }
        args
    }
}

/// A running Chrome instance.
pub struct ChromeSession {
    browser: Browser,
    element_timeout: Duration,
    page_load: PageLoad,
}

impl fmt::Debug for ChromeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromeSession")
            .field("element_timeout", &self.element_timeout)
            .field("page_load", &self.page_load)
            .finish_non_exhaustive()
    }
}

impl ChromeSession {
    /// Launches Chrome.
    ///
    /// # Errors
    ///
    /// Returns [`FinDataError::Browser`] if no Chrome/Chromium binary can be started.
    pub fn launch(options: &ChromeOptions) -> Result<Self> {
        info!(
            headless = options.headless,
            page_load = ?options.page_load,
            block_images = options.block_images,
            "Launching Chrome"
        );

        let args = options.extra_args();
        let launch = LaunchOptions {
            headless: options.headless,
            sandbox: options.sandbox,
            window_size: Some(options.window_size),
            idle_browser_timeout: options.idle_timeout,
            args: args.iter().map(OsString::as_os_str).collect::<Vec<&OsStr>>(),
            ..Default::default()
        };

        let browser = Browser::new(launch).map_err(|e| {
            FinDataError::Browser(format!(
                "Failed to launch Chrome. Is Chrome/Chromium installed? {e}"
            ))
        })?;

        Ok(Self {
            browser,
            element_timeout: options.element_timeout,
            page_load: options.page_load,
        })
    }
}

impl BrowserSession for ChromeSession {
    type Surface = ChromeSurface;

    fn open_surface(&self) -> Result<ChromeSurface> {
        let tab = self.browser.new_tab().map_err(browser_error)?;
        tab.set_default_timeout(self.element_timeout);
        debug!("Opened tab");
        Ok(ChromeSurface {
            tab,
            page_load: self.page_load,
            load_timeout: self.element_timeout,
        })
    }
}

/// One Chrome tab.
pub struct ChromeSurface {
    tab: Arc<Tab>,
    page_load: PageLoad,
    load_timeout: Duration,
}

impl fmt::Debug for ChromeSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromeSurface")
            .field("url", &self.tab.get_url())
            .field("page_load", &self.page_load)
            .finish()
    }
}

/// JS string literal for `text`.
fn js_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

/// JS expression evaluating to the array of elements matched by `locator`.
///
/// A text locator matches elements with a direct text node containing the text.
fn elements_expr(locator: &Locator) -> String {
    match locator {
        Locator::Css(selector) => {
            format!("Array.from(document.querySelectorAll({}))", js_string(selector))
        }
        Locator::Text(text) => format!(
            "Array.from(document.querySelectorAll('body *')).filter(function(el) {{ \
                return Array.from(el.childNodes).some(function(n) {{ \
                    return n.nodeType === 3 && n.textContent.indexOf({}) !== -1; \
                }}); \
            }})",
            js_string(text)
        ),
    }
}

impl ChromeSurface {
    fn eval(&self, script: &str) -> Result<Option<Value>> {
        self.tab
            .evaluate(script, false)
            .map(|object| object.value)
            .map_err(browser_error)
    }

    /// Polls until the current document is parsed.
    fn wait_until_interactive(&self) -> Result<()> {
        let deadline = Instant::now() + self.load_timeout;
        loop {
            let state = self.eval(READY_STATE)?;
            if matches!(state.as_ref().and_then(Value::as_str), Some("interactive" | "complete")) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(FinDataError::Browser(format!(
                    "Page did not load within {:?}",
                    self.load_timeout
                )));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn count(&self, locator: &Locator) -> Result<usize> {
        let script = format!("({}).length", elements_expr(locator));
        Ok(self
            .eval(&script)?
            .and_then(|v| v.as_u64())
            .map_or(0, |n| n as usize))
    }
}

impl Surface for ChromeSurface {
    fn navigate(&mut self, url: &str) -> Result<()> {
        debug!(url = %url, page_load = ?self.page_load, "Navigating");
        self.tab.navigate_to(url).map_err(browser_error)?;
        match self.page_load {
            PageLoad::Complete => self
                .tab
                .wait_until_navigated()
                .map(|_| ())
                .map_err(browser_error),
            PageLoad::Eager => self.wait_until_interactive(),
        }
    }

    fn wait_for(&self, locator: &Locator, timeout: Duration) -> bool {
        if let Locator::Css(selector) = locator {
            return self
                .tab
                .wait_for_element_with_custom_timeout(selector, timeout)
                .is_ok();
        }

        let deadline = Instant::now() + timeout;
        loop {
            if self.count(locator).is_ok_and(|n| n > 0) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        let script = format!(
            "(function() {{ var el = ({})[0]; return el ? el.getAttribute({}) : null; }})()",
            elements_expr(locator),
            js_string(name)
        );
        Ok(match self.eval(&script)? {
            Some(Value::String(value)) => Some(value),
            _ => None,
        })
    }

    fn evaluate(&self, script: &str) -> Result<Option<Value>> {
        self.eval(script)
    }

    fn texts(&self, locator: &Locator) -> Result<Vec<String>> {
        let script = format!(
            "JSON.stringify(({}).map(function(el) {{ return el.innerText || el.textContent || ''; }}))",
            elements_expr(locator)
        );
        match self.eval(&script)? {
            Some(Value::String(json)) => {
                serde_json::from_str(&json).map_err(|e| FinDataError::Parse(e.to_string()))
            }
            _ => Ok(Vec::new()),
        }
    }

    fn click(&self, locator: &Locator, index: usize) -> Result<()> {
        let script = format!(
            "(function() {{ \
                var el = ({})[{index}]; \
                if (!el) {{ return false; }} \
                el.scrollIntoView({{block: 'center'}}); \
                el.click(); \
                return true; \
            }})()",
            elements_expr(locator)
        );
        match self.eval(&script)? {
            Some(Value::Bool(true)) => Ok(()),
            _ => Err(FinDataError::Browser(format!(
                "No element {locator} at index {index}"
            ))),
        }
    }

    fn body_text(&self) -> Result<String> {
        match self.eval("document.body ? document.body.innerText : ''")? {
            Some(Value::String(text)) => Ok(text),
            _ => Ok(String::new()),
        }
    }

    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn close(&mut self) -> Result<()> {
        self.tab.close(true).map(|_| ()).map_err(browser_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors_are_escaped() {
        let expr = elements_expr(&Locator::css(r#"a[title="x"]"#));
        assert_eq!(
            expr,
            r#"Array.from(document.querySelectorAll("a[title=\"x\"]"))"#
        );
        assert!(elements_expr(&Locator::text("Show More")).contains(r#"indexOf("Show More")"#));
    }

    #[test]
    fn test_default_args() {
        let args = ChromeOptions::default().extra_args();
        assert!(args.contains(&OsString::from("--blink-settings=imagesEnabled=false")));
        assert!(args.iter().any(|a| a.to_string_lossy().starts_with("--user-agent=")));
        assert!(!ChromeOptions::default().with_headful(true).headless);
    }

    #[test]
    fn test_page_load_and_image_options() {
        let defaults = ChromeOptions::default();
        assert_eq!(defaults.page_load, PageLoad::Eager);
        assert!(defaults.block_images);

        let options = defaults.with_page_load(PageLoad::Complete).with_images(true);
        assert_eq!(options.page_load, PageLoad::Complete);
        assert!(
            !options
                .extra_args()
                .contains(&OsString::from("--blink-settings=imagesEnabled=false"))
        );
    }
}
