//! Round record persistence.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{BoxFuture, Persister};
use crate::error::{Result, SeasonError};
use crate::round::RoundRecord;
use crate::season::SeasonReport;

/// Writes one pretty-printed JSON file per round into a directory.
///
/// Files are opened with create-new semantics, so a record that already
/// exists on disk is never overwritten.
#[derive(Debug, Clone)]
pub struct JsonFilePersister {
    dir: PathBuf,
}

impl JsonFilePersister {
    /// Persister writing into `dir` (created on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name used for a round
    pub fn round_file_name(round: u32) -> String {
        format!("round_{round:02}.json")
    }

    async fn write_new(&self, name: &str, body: Vec<u8>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| SeasonError::Persistence(format!("{}: {e}", path.display())))?;
        file.write_all(&body).await?;
        file.flush().await?;
        debug!(path = %path.display(), "Record written");
        Ok(())
    }
}

impl Persister for JsonFilePersister {
    fn persist_round<'a>(&'a self, record: &'a RoundRecord) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let body = serde_json::to_vec_pretty(record)?;
            self.write_new(&Self::round_file_name(record.round), body)
                .await
        })
    }

    fn persist_report<'a>(&'a self, report: &'a SeasonReport) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let body = serde_json::to_vec_pretty(report)?;
            self.write_new("season_report.json", body).await
        })
    }
}

/// Keeps records in memory; can be switched to fail for tests
#[derive(Debug, Default)]
pub struct MemoryPersister {
    rounds: Mutex<Vec<RoundRecord>>,
    report: Mutex<Option<SeasonReport>>,
    failing: AtomicBool,
}

impl MemoryPersister {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Stored round records
    pub fn rounds(&self) -> Vec<RoundRecord> {
        self.rounds.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Stored season report
    pub fn report(&self) -> Option<SeasonReport> {
        self.report.lock().ok().and_then(|r| r.clone())
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(SeasonError::Persistence("store unavailable".into()));
        }
        Ok(())
    }
}

impl Persister for MemoryPersister {
    fn persist_round<'a>(&'a self, record: &'a RoundRecord) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check()?;
            let mut rounds = self
                .rounds
                .lock()
                .map_err(|_| SeasonError::Persistence("store poisoned".into()))?;
            if rounds.iter().any(|r| r.round == record.round) {
                return Err(SeasonError::Persistence(format!(
                    "round {} already persisted",
                    record.round
                )));
            }
            rounds.push(record.clone());
            Ok(())
        })
    }

    fn persist_report<'a>(&'a self, report: &'a SeasonReport) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.check()?;
            let mut stored = self
                .report
                .lock()
                .map_err(|_| SeasonError::Persistence("store poisoned".into()))?;
            *stored = Some(report.clone());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::{RoundKind, RoundRecord};

    fn record(round: u32) -> RoundRecord {
        RoundRecord::empty(round, RoundKind::Challenge)
    }

    #[tokio::test]
    async fn test_file_persister_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let persister = JsonFilePersister::new(dir.path().join("out"));

        persister.persist_round(&record(3)).await.unwrap();
        let path = dir.path().join("out").join("round_03.json");
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"round\": 3"));

        let again = persister.persist_round(&record(3)).await;
        assert!(matches!(again, Err(SeasonError::Persistence(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
    }

    #[tokio::test]
    async fn test_memory_persister_failure_switch() {
        let persister = MemoryPersister::new();
        persister.persist_round(&record(1)).await.unwrap();
        persister.set_failing(true);
        assert!(persister.persist_round(&record(2)).await.is_err());
        assert_eq!(persister.rounds().len(), 1);
    }
}
