//! Company directory sources.
//!
//! A [`DirectoryLoader`] tries its sources in order and builds the directory
//! from the first one that yields rows.

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use findata_core::{FinDataError, Result};

use crate::index::{CompanyDirectory, DirectoryEntry};

/// Published listing of stocks across exchanges.
pub const DEFAULT_DIRECTORY_URL: &str = "https://raw.githubusercontent.com/gosho-st/exchanges/refs/heads/main/all_exchanges_stocks_20251204_201504.csv";

/// User agent for directory downloads.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

const SYMBOL_HEADERS: &[&str] = &["symbol", "act symbol", "ticker"];
const NAME_HEADERS: &[&str] = &["name", "security name", "company name"];
const EXCHANGE_HEADERS: &[&str] = &["exchange", "exchangecode", "exchange code"];

/// A place company listings can be loaded from.
#[async_trait]
pub trait DirectorySource: Send + Sync + Debug {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Loads all listings.
    async fn load(&self) -> Result<Vec<DirectoryEntry>>;
}

/// Downloads a directory CSV over HTTP.
#[derive(Debug)]
pub struct RemoteCsvSource {
    client: reqwest::Client,
    url: String,
}

impl RemoteCsvSource {
    /// Creates a source for the default directory URL.
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_DIRECTORY_URL)
    }

    /// Creates a source for `url`.
    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FinDataError::Network(e.to_string()))?;

        Ok(Self::with_client(client, url))
    }

    /// Creates a source using an existing HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl DirectorySource for RemoteCsvSource {
    fn name(&self) -> &'static str {
        "remote-csv"
    }

    async fn load(&self) -> Result<Vec<DirectoryEntry>> {
        debug!(url = %self.url, "Downloading company directory");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FinDataError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FinDataError::Network(format!(
                "Directory download failed with status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FinDataError::Network(e.to_string()))?;

        parse_directory_csv(body.as_bytes(), None)
    }
}

/// Reads a directory CSV from disk.
#[derive(Debug, Clone)]
pub struct LocalCsvSource {
    path: PathBuf,
    exchange: Option<String>,
}

impl LocalCsvSource {
    /// Creates a source for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            exchange: None,
        }
    }

    /// Exchange code to use for rows when the file has no exchange column.
    #[must_use]
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DirectorySource for LocalCsvSource {
    fn name(&self) -> &'static str {
        "local-csv"
    }

    async fn load(&self) -> Result<Vec<DirectoryEntry>> {
        debug!(path = %self.path.display(), "Reading company directory");
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            FinDataError::Directory(format!("{}: {e}", self.path.display()))
        })?;
        parse_directory_csv(bytes.as_slice(), self.exchange.as_deref())
    }
}

/// Parses directory rows from CSV.
///
/// Columns are located by header name, case-insensitively: a symbol column
/// (`symbol`, `ACT Symbol`, `ticker`), a name column (`name`, `Security Name`,
/// `Company Name`) and an optional exchange column (`Exchange`,
/// `ExchangeCode`). Rows without a symbol are skipped. `default_exchange`
/// fills in rows when there is no exchange column or the cell is empty.
pub fn parse_directory_csv(
    reader: impl std::io::Read,
    default_exchange: Option<&str>,
) -> Result<Vec<DirectoryEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| FinDataError::Parse(e.to_string()))?
        .clone();
    let column = |candidates: &[&str]| {
        headers
            .iter()
            .position(|h| candidates.contains(&h.to_lowercase().as_str()))
    };

    let symbol_col = column(SYMBOL_HEADERS)
        .ok_or_else(|| FinDataError::Parse("Directory CSV has no symbol column".to_string()))?;
    let name_col = column(NAME_HEADERS)
        .ok_or_else(|| FinDataError::Parse("Directory CSV has no name column".to_string()))?;
    let exchange_col = column(EXCHANGE_HEADERS);

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| FinDataError::Parse(e.to_string()))?;
        let symbol = record.get(symbol_col).unwrap_or_default();
        if symbol.is_empty() {
            continue;
        }
        let name = record.get(name_col).unwrap_or_default();
        let exchange = exchange_col
            .and_then(|col| record.get(col))
            .filter(|code| !code.is_empty())
            .or(default_exchange)
            .unwrap_or_default();

        entries.push(DirectoryEntry::new(symbol, name, exchange));
    }

    Ok(entries)
}

/// Loads the company directory from the first source that works.
///
/// # Example
///
/// ```rust,ignore
/// use findata_directory::DirectoryLoader;
///
/// let directory = DirectoryLoader::new()
///     .with_remote()?
///     .with_local("listings.csv")
///     .load()
///     .await?;
/// println!("{} listings", directory.len());
/// ```
#[derive(Debug, Default)]
pub struct DirectoryLoader {
    sources: Vec<Arc<dyn DirectorySource>>,
}

impl DirectoryLoader {
    /// Creates a loader without sources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source; sources are tried in the order they were added.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn DirectorySource>) -> Self {
        debug!(source = source.name(), "Registering directory source");
        self.sources.push(source);
        self
    }

    /// Adds the default remote directory.
    pub fn with_remote(self) -> Result<Self> {
        Ok(self.with_source(Arc::new(RemoteCsvSource::new()?)))
    }

    /// Adds a local CSV file.
    #[must_use]
    pub fn with_local(self, path: impl Into<PathBuf>) -> Self {
        self.with_source(Arc::new(LocalCsvSource::new(path)))
    }

    /// Loads listings, falling back to the next source on failure or when a source is empty.
    pub async fn load(&self) -> Result<CompanyDirectory> {
        if self.sources.is_empty() {
            return Err(FinDataError::Directory(
                "No directory sources registered".to_string(),
            ));
        }

        let mut last_error = None;
        for source in &self.sources {
            match source.load().await {
                Ok(entries) if !entries.is_empty() => {
                    let directory = CompanyDirectory::from_entries(entries);
                    info!(
                        source = source.name(),
                        listings = directory.len(),
                        company_groups = directory.alternates().len(),
                        "Loaded company directory"
                    );
                    return Ok(directory);
                }
                Ok(_) => {
                    warn!(source = source.name(), "Directory source is empty, trying next");
                    last_error = Some(FinDataError::Directory(format!(
                        "{} returned no listings",
                        source.name()
                    )));
                }
                Err(e) => {
                    warn!(
                        source = source.name(),
                        error = %e,
                        "Directory source failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            FinDataError::Directory("All directory sources failed".to_string())
        }))
    }
}
