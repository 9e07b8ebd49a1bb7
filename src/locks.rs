//! Locking subsystem for slotline.
//!
//! This module implements the lock model required for race-safe schedule
//! mutations:
//! - Global store lock (`store.lock`), held while the slot store is rewritten
//! - Per-task lock (`TASK-ID.lock`), held while a task's countdown chain
//!   is recalculated
//!
//! # Lock Files
//!
//! Lock files are stored in `.slotline/locks/`. They are created using
//! **create_new** semantics (exclusive create) to ensure that only one
//! process can acquire a given lock at a time.
//!
//! # Lock Metadata
//!
//! Each lock file contains JSON metadata:
//! - `owner`: The owner of the lock (e.g., `user@HOST`)
//! - `pid`: The process ID (optional)
//! - `created_at`: RFC3339 timestamp
//! - `action`: The action being performed (add/update/remove/refresh)
//!
//! # RAII Guards
//!
//! Locks are managed through RAII guard objects that automatically release
//! the lock when dropped. If deletion fails during drop, a warning is printed
//! but the program does not crash.

use crate::config::Config;
use crate::context::ScheduleContext;
use crate::error::{Result, SlotlineError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File stem of the global store lock.
const STORE_LOCK: &str = "store";

/// Lock metadata stored in lock files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockMetadata {
    /// Owner of the lock (e.g., `user@HOST`).
    pub owner: String,

    /// Process ID of the lock holder (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// Timestamp when the lock was created (RFC3339).
    pub created_at: DateTime<Utc>,

    /// The action being performed (add/update/remove/refresh).
    pub action: String,
}

impl LockMetadata {
    /// Create new lock metadata with the current timestamp.
    pub fn new(action: &str) -> Self {
        Self {
            owner: get_owner_string(),
            pid: Some(std::process::id()),
            created_at: Utc::now(),
            action: action.to_string(),
        }
    }

    /// Parse lock metadata from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            SlotlineError::UserError(format!(
                "failed to read lock file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            SlotlineError::UserError(format!(
                "failed to parse lock file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Serialize lock metadata to JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            SlotlineError::UserError(format!("failed to serialize lock metadata: {}", e))
        })
    }

    /// Calculate the age of the lock.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }

    /// Check if the lock is stale based on the given threshold in minutes.
    pub fn is_stale(&self, stale_minutes: u32) -> bool {
        self.age().num_minutes() > stale_minutes as i64
    }
}

/// Get the owner string for lock metadata.
fn get_owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Type of lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockType {
    /// Global store lock for serializing slot store rewrites.
    Store,
    /// Per-task lock for serializing countdown recalculation.
    Task,
}

/// Information about an active lock.
#[derive(Debug, Clone)]
pub struct LockInfo {
    /// The lock file path.
    pub path: PathBuf,

    /// The lock name (e.g., "store", "TASK-001").
    pub name: String,

    /// The lock type.
    pub lock_type: LockType,

    /// The lock metadata.
    pub metadata: LockMetadata,

    /// Whether the lock is stale.
    pub is_stale: bool,
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (owner: {}, age: {}, action: {}{})",
            self.name,
            self.metadata.owner,
            self.metadata.age_string(),
            self.metadata.action,
            if self.is_stale { ", STALE" } else { "" }
        )
    }
}

/// RAII guard for a lock file.
///
/// When dropped, the lock file is automatically deleted.
/// If deletion fails, a warning is printed but no panic occurs.
#[derive(Debug)]
pub struct LockGuard {
    /// Path to the lock file.
    path: PathBuf,

    /// Whether the lock has been released manually.
    released: bool,
}

impl LockGuard {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Manually release the lock.
    ///
    /// This is useful when you want to release the lock before the guard
    /// goes out of scope, and want to handle errors explicitly.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::remove_file(&self.path).map_err(|e| {
            SlotlineError::UserError(format!(
                "failed to release lock '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = fs::remove_file(&self.path)
        {
            eprintln!(
                "Warning: failed to release lock '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}

fn store_lock_path(ctx: &ScheduleContext) -> PathBuf {
    ctx.locks_dir().join(format!("{}.lock", STORE_LOCK))
}

fn task_lock_path(ctx: &ScheduleContext, task_id: &str) -> PathBuf {
    ctx.locks_dir().join(format!("{}.lock", task_id))
}

/// Acquire a lock file using create_new semantics.
///
/// The lock file is created exclusively - if it already exists, the
/// operation fails with a `LockError` naming the current holder.
fn acquire_lock(lock_path: &Path, metadata: &LockMetadata) -> Result<LockGuard> {
    if let Some(parent) = lock_path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            SlotlineError::UserError(format!(
                "failed to create locks directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                // Try to read the existing lock metadata for a helpful error message
                let existing_info = match LockMetadata::from_file(lock_path) {
                    Ok(meta) => format!(
                        "\nLock: {} (created {} ago by {})\nAction: {}",
                        lock_path.display(),
                        meta.age_string(),
                        meta.owner,
                        meta.action
                    ),
                    Err(_) => format!("\nLock: {}", lock_path.display()),
                };
                SlotlineError::LockError(format!(
                    "lock is held by another process{}",
                    existing_info
                ))
            } else {
                SlotlineError::LockError(format!(
                    "failed to acquire lock '{}': {}",
                    lock_path.display(),
                    e
                ))
            }
        })?;

    let json = metadata.to_json()?;
    file.write_all(json.as_bytes()).map_err(|e| {
        // Clean up the lock file on write failure
        let _ = fs::remove_file(lock_path);
        SlotlineError::LockError(format!("failed to write lock metadata: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(lock_path);
        SlotlineError::LockError(format!("failed to sync lock file: {}", e))
    })?;

    Ok(LockGuard::new(lock_path.to_path_buf()))
}

/// Acquire the global store lock.
///
/// This lock must be held during the critical section that mutates the
/// slot store and rewrites its file.
pub fn acquire_store_lock(ctx: &ScheduleContext, action: &str) -> Result<LockGuard> {
    let metadata = LockMetadata::new(action);
    acquire_lock(&store_lock_path(ctx), &metadata)
}

/// Acquire a per-task lock.
///
/// This lock must be held while a task's countdown chain is recalculated,
/// so overlapping mutations against the same task serialize even before
/// they reach the store lock.
pub fn acquire_task_lock(ctx: &ScheduleContext, task_id: &str, action: &str) -> Result<LockGuard> {
    let metadata = LockMetadata::new(action);
    acquire_lock(&task_lock_path(ctx, task_id), &metadata)
}

/// List all active locks in the workspace, sorted by name.
pub fn list_locks(ctx: &ScheduleContext, config: &Config) -> Result<Vec<LockInfo>> {
    let mut locks = Vec::new();

    let locks_dir = ctx.locks_dir();
    if !locks_dir.exists() {
        return Ok(locks);
    }

    let entries = fs::read_dir(&locks_dir).map_err(|e| {
        SlotlineError::UserError(format!(
            "failed to read locks directory '{}': {}",
            locks_dir.display(),
            e
        ))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            SlotlineError::UserError(format!("failed to read locks directory entry: {}", e))
        })?;

        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) != Some("lock") {
            continue;
        }

        let metadata = match LockMetadata::from_file(&path) {
            Ok(meta) => meta,
            Err(_) => continue, // Skip invalid lock files
        };

        let filename = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let (lock_type, name) = if filename == STORE_LOCK {
            (LockType::Store, STORE_LOCK.to_string())
        } else {
            (LockType::Task, filename.to_string())
        };

        let is_stale = metadata.is_stale(config.lock_stale_minutes);

        locks.push(LockInfo {
            path,
            name,
            lock_type,
            metadata,
            is_stale,
        });
    }

    locks.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(locks)
}

/// Clear a lock file.
///
/// This removes the lock file from the filesystem. The caller is responsible
/// for verifying that clearing the lock is appropriate (e.g., checking --force).
///
/// Returns information about the cleared lock for audit purposes.
pub fn clear_lock(ctx: &ScheduleContext, lock_id: &str, config: &Config) -> Result<LockInfo> {
    let lock_path = match lock_id {
        STORE_LOCK => store_lock_path(ctx),
        task_id => task_lock_path(ctx, task_id),
    };

    if !lock_path.exists() {
        return Err(SlotlineError::UserError(format!(
            "lock '{}' does not exist at: {}",
            lock_id,
            lock_path.display()
        )));
    }

    // Read the lock metadata before removing
    let metadata = LockMetadata::from_file(&lock_path)?;

    let lock_type = if lock_id == STORE_LOCK {
        LockType::Store
    } else {
        LockType::Task
    };

    let is_stale = metadata.is_stale(config.lock_stale_minutes);

    let lock_info = LockInfo {
        path: lock_path.clone(),
        name: lock_id.to_string(),
        lock_type,
        metadata,
        is_stale,
    };

    fs::remove_file(&lock_path).map_err(|e| {
        SlotlineError::UserError(format!(
            "failed to clear lock '{}': {}",
            lock_path.display(),
            e
        ))
    })?;

    Ok(lock_info)
}
