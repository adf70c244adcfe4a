use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::trading::trade_record::{TradeRecord, TradeUpdate};

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("trade {0} not found")]
    NotFound(String),

    #[error("history file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history file is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Where trade records live. The decision engines never touch this; the desk
/// calls it explicitly after each computation.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Insert as the newest record.
    async fn add(&mut self, record: TradeRecord) -> Result<(), HistoryError>;
    async fn update(&mut self, id: &str, update: &TradeUpdate) -> Result<TradeRecord, HistoryError>;
    async fn delete(&mut self, id: &str) -> Result<(), HistoryError>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<TradeRecord>, HistoryError>;

    async fn get(&self, id: &str) -> Result<TradeRecord, HistoryError> {
        self.list()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))
    }

    async fn latest(&self) -> Result<Option<TradeRecord>, HistoryError> {
        Ok(self.list().await?.into_iter().next())
    }
}

/// Newest-first record list shared by the store implementations.
#[derive(Debug, Clone, Default)]
struct TradeLog {
    records: Vec<TradeRecord>,
}

impl TradeLog {
    fn add(&mut self, record: TradeRecord) {
        self.records.insert(0, record);
    }

    fn update(&mut self, id: &str, update: &TradeUpdate) -> Result<TradeRecord, HistoryError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
        record.apply(update);
        Ok(record.clone())
    }

    fn delete(&mut self, id: &str) -> Result<(), HistoryError> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return Err(HistoryError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    log: TradeLog,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn add(&mut self, record: TradeRecord) -> Result<(), HistoryError> {
        self.log.add(record);
        Ok(())
    }

    async fn update(&mut self, id: &str, update: &TradeUpdate) -> Result<TradeRecord, HistoryError> {
        self.log.update(id, update)
    }

    async fn delete(&mut self, id: &str) -> Result<(), HistoryError> {
        self.log.delete(id)
    }

    async fn list(&self) -> Result<Vec<TradeRecord>, HistoryError> {
        Ok(self.log.records.clone())
    }
}

/// Whole history in one pretty-printed JSON array, rewritten after every
/// mutation.
#[derive(Debug)]
pub struct JsonHistoryStore {
    path: PathBuf,
    log: TradeLog,
}

impl JsonHistoryStore {
    /// Load `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref().to_path_buf();
        let records = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str::<Vec<TradeRecord>>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        info!("Loaded {} trade record(s) from {}", records.len(), path.display());
        Ok(Self {
            path,
            log: TradeLog { records },
        })
    }

    /// Persist `log` and adopt it only once it is on disk, so a failed
    /// write leaves memory matching the file.
    async fn commit(&mut self, log: TradeLog) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(&log.records)?;

        // Write a sibling temp file, then rename over the target.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Saved {} trade record(s)", log.records.len());
        self.log = log;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn add(&mut self, record: TradeRecord) -> Result<(), HistoryError> {
        let mut next = self.log.clone();
        next.add(record);
        self.commit(next).await
    }

    async fn update(&mut self, id: &str, update: &TradeUpdate) -> Result<TradeRecord, HistoryError> {
        let mut next = self.log.clone();
        let updated = next.update(id, update)?;
        self.commit(next).await?;
        Ok(updated)
    }

    async fn delete(&mut self, id: &str) -> Result<(), HistoryError> {
        let mut next = self.log.clone();
        next.delete(id)?;
        self.commit(next).await
    }

    async fn list(&self) -> Result<Vec<TradeRecord>, HistoryError> {
        Ok(self.log.records.clone())
    }
}
