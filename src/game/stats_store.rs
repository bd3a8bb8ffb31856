use std::fs;
use std::path::PathBuf;

use log::{debug, info, warn};
use thiserror::Error;

use crate::model::{GateRecord, SessionStats};

const STATS_FILE: &str = "session_stats.json";
const RECORDS_FILE: &str = "gate_records.json";

/// Kept gate records, sorted by score.
const MAX_RECORDS: usize = 50;

/// Remote pushes wait out this many ticks of quiet after the last save.
pub const SYNC_DEBOUNCE_TICKS: u32 = 40;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stats i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stats serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("remote sync failed: {0}")]
    Remote(String),
}

/// Optional backing service for cross-device stats. Pull at load, debounced
/// push after mutations. Failures never block local play.
pub trait RemoteStore {
    fn pull(&mut self, session_id: &str) -> Result<Option<SessionStats>, StoreError>;
    fn push(&mut self, session_id: &str, stats: &SessionStats) -> Result<(), StoreError>;
}

/// Local JSON persistence plus the debounced remote sync. Local files are
/// the source of truth; the remote only ever raises local progress.
pub struct StatsStore {
    data_dir: PathBuf,
    records: Vec<GateRecord>,
    remote: Option<Box<dyn RemoteStore>>,
    session_id: Option<String>,
    debounce_remaining: Option<u32>,
    pending_push: Option<SessionStats>,
}

impl StatsStore {
    pub fn new() -> Self {
        let data_dir = match std::env::var("WORDGATE_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("wordgate"),
        };
        if !data_dir.exists() {
            let _ = fs::create_dir_all(&data_dir);
        }

        let mut store = Self {
            data_dir,
            records: Vec::new(),
            remote: None,
            session_id: None,
            debounce_remaining: None,
            pending_push: None,
        };
        store.load_records();
        store
    }

    pub fn with_remote(mut self, remote: Box<dyn RemoteStore>, session_id: String) -> Self {
        self.remote = Some(remote);
        self.session_id = Some(session_id);
        self
    }

    fn stats_path(&self) -> PathBuf {
        self.data_dir.join(STATS_FILE)
    }

    fn records_path(&self) -> PathBuf {
        self.data_dir.join(RECORDS_FILE)
    }

    fn load_records(&mut self) {
        if let Ok(contents) = fs::read_to_string(self.records_path()) {
            if let Ok(records) = serde_json::from_str(&contents) {
                self.records = records;
            }
        }
    }

    /// Load the profile: local file, reconciled against the remote when one
    /// is attached. A missing or unreadable file means a fresh profile.
    pub fn load(&mut self) -> SessionStats {
        let local = fs::read_to_string(self.stats_path())
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default();

        let (Some(remote), Some(session_id)) = (self.remote.as_mut(), self.session_id.as_ref())
        else {
            return local;
        };
        match remote.pull(session_id) {
            Ok(Some(pulled)) => {
                let merged = reconcile(&local, &pulled);
                info!(
                    target: "stats_store",
                    "Reconciled remote stats: level {} / {} -> {}",
                    local.level, pulled.level, merged.level
                );
                merged
            }
            Ok(None) => local,
            Err(e) => {
                warn!(target: "stats_store", "Remote pull failed, using local stats: {}", e);
                local
            }
        }
    }

    /// Persist locally and arm the debounced remote push. Local write
    /// failures are logged and swallowed; play continues from memory.
    pub fn save(&mut self, stats: &SessionStats) {
        if let Err(e) = self.save_now(stats) {
            warn!(target: "stats_store", "Failed to save stats: {}", e);
        }
        if self.remote.is_some() {
            self.debounce_remaining = Some(SYNC_DEBOUNCE_TICKS);
            self.pending_push = Some(stats.clone());
        }
    }

    pub fn save_now(&self, stats: &SessionStats) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(stats)?;
        fs::write(self.stats_path(), contents)?;
        Ok(())
    }

    /// Advance the debounce by one tick. Returns the push result when one
    /// fired this tick, None otherwise.
    pub fn tick(&mut self) -> Option<bool> {
        let remaining = self.debounce_remaining.as_mut()?;
        *remaining -= 1;
        if *remaining > 0 {
            return None;
        }
        self.debounce_remaining = None;
        Some(self.push_pending())
    }

    /// Push whatever is pending right now, skipping the rest of the
    /// debounce. For shutdown and gate boundaries.
    pub fn flush(&mut self) -> Option<bool> {
        self.debounce_remaining = None;
        if self.pending_push.is_none() {
            return None;
        }
        Some(self.push_pending())
    }

    fn push_pending(&mut self) -> bool {
        let Some(stats) = self.pending_push.take() else {
            return true;
        };
        let (Some(remote), Some(session_id)) = (self.remote.as_mut(), self.session_id.as_ref())
        else {
            return true;
        };
        match remote.push(session_id, &stats) {
            Ok(()) => {
                debug!(target: "stats_store", "Pushed stats to remote");
                true
            }
            Err(e) => {
                warn!(target: "stats_store", "Remote push failed: {}", e);
                false
            }
        }
    }

    /// Append a finished gate to the history file, keeping the top scores.
    pub fn record_gate(&mut self, record: &GateRecord) -> Result<(), StoreError> {
        self.records.push(record.clone());
        self.records.sort_by(|a, b| b.score.cmp(&a.score));
        self.records.truncate(MAX_RECORDS);
        let contents = serde_json::to_string_pretty(&self.records)?;
        fs::write(self.records_path(), contents)?;
        Ok(())
    }

    pub fn high_scores(&self, limit: usize) -> Vec<GateRecord> {
        self.records.iter().take(limit).cloned().collect()
    }
}

/// Merge local and remote profiles. A higher level wins wholesale; at equal
/// level the counters take the field-wise max. Hearts and the refill
/// timestamp are always the local device's.
pub fn reconcile(local: &SessionStats, remote: &SessionStats) -> SessionStats {
    if remote.level > local.level {
        let mut merged = remote.clone();
        merged.hearts = local.hearts;
        merged.last_life_refill = local.last_life_refill;
        return merged;
    }
    if remote.level < local.level {
        return local.clone();
    }
    let mut merged = local.clone();
    merged.coins = local.coins.max(remote.coins);
    merged.stars = local.stars.max(remote.stars);
    merged.hints_freeze = local.hints_freeze.max(remote.hints_freeze);
    merged.hints_reveal = local.hints_reveal.max(remote.hints_reveal);
    merged.max_streak = local.max_streak.max(remote.max_streak);
    merged
}
