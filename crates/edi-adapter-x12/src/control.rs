//! Control number management
//!
//! Interchange (ISA13/IEA02), group (GS06/GE02) and transaction (ST02/SE02)
//! control numbers are three independent counters. Each allocation returns
//! the current value as nine zero-padded digits and advances the counter.
//! Allocators are shared between threads, so all state sits behind a mutex.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Largest value that fits in nine digits
pub const MAX_CONTROL_NUMBER: u64 = 999_999_999;

/// Which counter to draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlNumberKind {
    Interchange,
    Group,
    Transaction,
}

/// Next value of each counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlNumbers {
    pub interchange: u64,
    pub group: u64,
    pub transaction: u64,
}

impl Default for ControlNumbers {
    fn default() -> Self {
        Self {
            interchange: 1,
            group: 1,
            transaction: 1,
        }
    }
}

/// Partial counter update for resuming a sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterOverrides {
    #[serde(default)]
    pub interchange: Option<u64>,
    #[serde(default)]
    pub group: Option<u64>,
    #[serde(default)]
    pub transaction: Option<u64>,
}

impl ControlNumbers {
    fn slot(&mut self, kind: ControlNumberKind) -> &mut u64 {
        match kind {
            ControlNumberKind::Interchange => &mut self.interchange,
            ControlNumberKind::Group => &mut self.group,
            ControlNumberKind::Transaction => &mut self.transaction,
        }
    }

    /// Take the current value of a counter and advance it
    fn take(&mut self, kind: ControlNumberKind) -> String {
        let slot = self.slot(kind);
        let value = (*slot).clamp(1, MAX_CONTROL_NUMBER);
        *slot = if value == MAX_CONTROL_NUMBER {
            warn!(?kind, "Control number sequence exhausted, rolling over to 1");
            1
        } else {
            value + 1
        };
        format_control_number(value)
    }

    fn merge(&mut self, overrides: &CounterOverrides) -> Result<()> {
        for (kind, value) in [
            (ControlNumberKind::Interchange, overrides.interchange),
            (ControlNumberKind::Group, overrides.group),
            (ControlNumberKind::Transaction, overrides.transaction),
        ] {
            if let Some(value) = value {
                if !(1..=MAX_CONTROL_NUMBER).contains(&value) {
                    return Err(Error::ControlNumber(format!(
                        "{:?} counter must be between 1 and {}, got {}",
                        kind, MAX_CONTROL_NUMBER, value
                    )));
                }
            }
        }

        if let Some(v) = overrides.interchange {
            self.interchange = v;
        }
        if let Some(v) = overrides.group {
            self.group = v;
        }
        if let Some(v) = overrides.transaction {
            self.transaction = v;
        }
        Ok(())
    }
}

/// Render a control number as exactly nine digits
pub fn format_control_number(value: u64) -> String {
    format!("{:09}", value)
}

/// Source of unique control numbers
pub trait ControlNumberAllocator: Send + Sync {
    /// Allocate the next number of the given kind
    fn allocate(&self, kind: ControlNumberKind) -> Result<String>;
    /// Merge caller-supplied counter values (e.g. after a restart)
    fn set_counters(&self, overrides: CounterOverrides) -> Result<()>;
    /// Inspect the next values without consuming them
    fn current(&self) -> Result<ControlNumbers>;
    /// Reset every counter to 1
    fn reset(&self) -> Result<()>;
}

fn lock_state(state: &Mutex<ControlNumbers>) -> Result<MutexGuard<'_, ControlNumbers>> {
    state
        .lock()
        .map_err(|_| Error::ControlNumber("Failed to lock state".to_string()))
}

/// Memory-based allocator; sequences restart with the process
#[derive(Debug, Default, Clone)]
pub struct MemoryControlNumberAllocator {
    state: Arc<Mutex<ControlNumbers>>,
}

impl MemoryControlNumberAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from explicit counter values
    pub fn starting_at(numbers: ControlNumbers) -> Self {
        Self {
            state: Arc::new(Mutex::new(numbers)),
        }
    }
}

impl ControlNumberAllocator for MemoryControlNumberAllocator {
    fn allocate(&self, kind: ControlNumberKind) -> Result<String> {
        let mut state = lock_state(&self.state)?;
        Ok(state.take(kind))
    }

    fn set_counters(&self, overrides: CounterOverrides) -> Result<()> {
        lock_state(&self.state)?.merge(&overrides)
    }

    fn current(&self) -> Result<ControlNumbers> {
        Ok(*lock_state(&self.state)?)
    }

    fn reset(&self) -> Result<()> {
        *lock_state(&self.state)? = ControlNumbers::default();
        Ok(())
    }
}

/// File-based allocator that persists counters to disk as JSON
#[derive(Debug)]
pub struct FileControlNumberAllocator {
    file_path: PathBuf,
    state: Mutex<ControlNumbers>,
}

impl FileControlNumberAllocator {
    /// Open (or start) the counter file at `file_path`
    pub fn new(file_path: impl Into<PathBuf>) -> Result<Self> {
        let file_path = file_path.into();
        let state = if file_path.exists() {
            let contents = fs::read_to_string(&file_path)?;
            serde_json::from_str(&contents)?
        } else {
            ControlNumbers::default()
        };
        debug!(path = %file_path.display(), ?state, "Loaded control numbers");

        Ok(Self {
            file_path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn save(&self, state: &ControlNumbers) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // write-then-rename keeps the previous file intact if the write fails
        let tmp = self.file_path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.file_path)?;
        Ok(())
    }
}

impl ControlNumberAllocator for FileControlNumberAllocator {
    fn allocate(&self, kind: ControlNumberKind) -> Result<String> {
        // the lock is held across the save so two callers cannot persist out of order
        let mut state = lock_state(&self.state)?;
        let mut next = *state;
        let number = next.take(kind);
        self.save(&next)?;
        *state = next;
        Ok(number)
    }

    fn set_counters(&self, overrides: CounterOverrides) -> Result<()> {
        let mut state = lock_state(&self.state)?;
        let mut next = *state;
        next.merge(&overrides)?;
        self.save(&next)?;
        *state = next;
        Ok(())
    }

    fn current(&self) -> Result<ControlNumbers> {
        Ok(*lock_state(&self.state)?)
    }

    fn reset(&self) -> Result<()> {
        let mut state = lock_state(&self.state)?;
        let next = ControlNumbers::default();
        self.save(&next)?;
        *state = next;
        Ok(())
    }
}
