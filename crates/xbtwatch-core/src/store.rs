//! Flat-file persistence for the last notified price and the one-shot rules.
//!
//! Both stores sit behind small traits so the evaluator can run against the
//! in-memory variants in tests. File writes go through a temporary file in the
//! target directory followed by a rename, so readers never observe a
//! half-written file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::{Price, Rule, ValidationError};

/// Storage failure with the offending path attached.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{}' does not hold a valid price: '{value}'", path.display())]
    InvalidPrice { path: PathBuf, value: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Last-notified price persistence.
pub trait PriceStore: Send + Sync {
    /// `None` when no price has been recorded yet.
    fn load_last_price(&self) -> Result<Option<Price>, StoreError>;
    fn save_last_price(&self, price: Price) -> Result<(), StoreError>;
}

/// One-shot rule persistence.
pub trait RuleStore: Send + Sync {
    fn load_rules(&self) -> Result<Vec<Rule>, StoreError>;
    fn save_rules(&self, rules: &[Rule]) -> Result<(), StoreError>;
}

/// Plain-text file holding a single decimal number.
#[derive(Debug, Clone)]
pub struct FilePriceStore {
    path: PathBuf,
}

impl FilePriceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PriceStore for FilePriceStore {
    fn load_last_price(&self) -> Result<Option<Price>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(StoreError::io(&self.path, error)),
        };

        // Last non-empty line wins.
        let Some(raw) = contents.lines().map(str::trim).filter(|l| !l.is_empty()).last() else {
            return Ok(None);
        };

        let value = raw.parse::<f64>().map_err(|_| StoreError::InvalidPrice {
            path: self.path.clone(),
            value: raw.to_owned(),
        })?;
        Ok(Some(Price::new(value)?))
    }

    fn save_last_price(&self, price: Price) -> Result<(), StoreError> {
        debug!(path = %self.path.display(), price = price.value(), "persisting last price");
        write_atomically(&self.path, &price.to_string())
    }
}

/// Rules file with one `<op><number>` line per rule.
#[derive(Debug, Clone)]
pub struct FileRuleStore {
    path: PathBuf,
}

impl FileRuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parse rules text, skipping blank lines and `#` comments.
pub fn parse_rules(contents: &str) -> Result<Vec<Rule>, ValidationError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            Rule::parse(line).map_err(|source| ValidationError::RuleLine {
                line: index + 1,
                source: Box::new(source),
            })
        })
        .collect()
}

impl RuleStore for FileRuleStore {
    fn load_rules(&self) -> Result<Vec<Rule>, StoreError> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|error| StoreError::io(&self.path, error))?;
        Ok(parse_rules(&contents)?)
    }

    fn save_rules(&self, rules: &[Rule]) -> Result<(), StoreError> {
        let mut contents = String::new();
        for rule in rules {
            contents.push_str(&rule.line);
            contents.push('\n');
        }
        debug!(path = %self.path.display(), remaining = rules.len(), "rewriting rules file");
        write_atomically(&self.path, &contents)
    }
}

fn write_atomically(path: &Path, contents: &str) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|error| StoreError::io(path, error))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|error| StoreError::io(path, error))?;
    file.persist(path)
        .map_err(|error| StoreError::io(path, error.error))?;
    Ok(())
}

/// In-memory price store.
#[derive(Debug, Default)]
pub struct MemoryPriceStore {
    price: Mutex<Option<Price>>,
}

impl MemoryPriceStore {
    pub fn new(price: Option<Price>) -> Self {
        Self {
            price: Mutex::new(price),
        }
    }

    pub fn current(&self) -> Option<Price> {
        self.price.lock().ok().and_then(|guard| *guard)
    }
}

impl PriceStore for MemoryPriceStore {
    fn load_last_price(&self) -> Result<Option<Price>, StoreError> {
        self.price
            .lock()
            .map(|guard| *guard)
            .map_err(|_| StoreError::Poisoned)
    }

    fn save_last_price(&self, price: Price) -> Result<(), StoreError> {
        let mut guard = self.price.lock().map_err(|_| StoreError::Poisoned)?;
        *guard = Some(price);
        Ok(())
    }
}

/// In-memory rule store.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: Mutex<Vec<Rule>>,
}

impl MemoryRuleStore {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules: Mutex::new(rules),
        }
    }

    pub fn snapshot(&self) -> Vec<Rule> {
        self.rules
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl RuleStore for MemoryRuleStore {
    fn load_rules(&self) -> Result<Vec<Rule>, StoreError> {
        self.rules
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn save_rules(&self, rules: &[Rule]) -> Result<(), StoreError> {
        let mut guard = self.rules.lock().map_err(|_| StoreError::Poisoned)?;
        *guard = rules.to_vec();
        Ok(())
    }
}
