//! Workspace context resolution for slotline.
//!
//! This module provides the "environment resolution" layer that finds the
//! schedule workspace root from any working directory by walking up the
//! directory tree looking for a `.slotline/` state directory.
//!
//! All slotline commands go through this module to locate schedule state,
//! so operations always target the same workspace regardless of where the
//! command is invoked from.

use crate::error::{Result, SlotlineError};
use std::env;
use std::path::{Path, PathBuf};

/// State directory name at the workspace root.
pub const STATE_DIR: &str = ".slotline";

/// Config file name within the state directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Slot store file name within the state directory.
pub const SLOTS_FILE: &str = "slots.json";

/// Task table file name within the state directory.
pub const TASKS_FILE: &str = "tasks.yaml";

/// Resolved paths for a slotline workspace.
///
/// All paths are absolute.
#[derive(Debug, Clone)]
pub struct ScheduleContext {
    /// Absolute path to the workspace root (the directory holding `.slotline/`).
    pub workspace_root: PathBuf,

    /// Absolute path to the state directory (`{workspace_root}/.slotline/`).
    pub state_dir: PathBuf,
}

impl ScheduleContext {
    /// Resolve the workspace context from the current working directory.
    ///
    /// # Returns
    ///
    /// * `Ok(ScheduleContext)` - Successfully resolved context
    /// * `Err(SlotlineError::UserError)` - If no workspace is found (exit code 1)
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            SlotlineError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd)
    }

    /// Resolve the workspace context starting from a specific directory.
    ///
    /// Walks up from `cwd` until a directory containing `.slotline/` is
    /// found. This is also the entry point used by tests.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Result<Self> {
        let cwd = cwd.as_ref();

        let mut dir = Some(cwd);
        while let Some(candidate) = dir {
            let state_dir = candidate.join(STATE_DIR);
            if state_dir.is_dir() {
                return Ok(Self {
                    workspace_root: candidate.to_path_buf(),
                    state_dir,
                });
            }
            dir = candidate.parent();
        }

        Err(SlotlineError::UserError(format!(
            "not inside a slotline workspace (no {} directory found from {}); run 'slotline init' first",
            STATE_DIR,
            cwd.display()
        )))
    }

    /// Build the context for a known workspace root without searching.
    ///
    /// Used by `init`, which creates the state directory rather than
    /// requiring it to exist.
    pub fn at_root<P: AsRef<Path>>(root: P) -> Self {
        let workspace_root = root.as_ref().to_path_buf();
        let state_dir = workspace_root.join(STATE_DIR);
        Self {
            workspace_root,
            state_dir,
        }
    }

    /// Path to the workspace config file.
    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join(CONFIG_FILE)
    }

    /// Path to the slot store file.
    pub fn slots_path(&self) -> PathBuf {
        self.state_dir.join(SLOTS_FILE)
    }

    /// Path to the task table file.
    pub fn tasks_path(&self) -> PathBuf {
        self.state_dir.join(TASKS_FILE)
    }

    /// Path to the locks directory.
    pub fn locks_dir(&self) -> PathBuf {
        self.state_dir.join("locks")
    }

    /// Path to the events directory.
    pub fn events_dir(&self) -> PathBuf {
        self.state_dir.join("events")
    }

    /// Verify the workspace has been initialized.
    ///
    /// `resolve_from` already proves the state directory exists; this also
    /// checks the slot store file, which `init` creates.
    pub fn require_initialized(&self) -> Result<()> {
        if !self.slots_path().is_file() {
            return Err(SlotlineError::UserError(format!(
                "workspace at {} is not initialized (missing {}); run 'slotline init'",
                self.workspace_root.display(),
                self.slots_path().display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn resolve_from_finds_workspace_in_parent() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("project");
        let nested = root.join("reports").join("q3");
        fs::create_dir_all(root.join(STATE_DIR)).unwrap();
        fs::create_dir_all(&nested).unwrap();

        let ctx = ScheduleContext::resolve_from(&nested).unwrap();
        assert_eq!(ctx.workspace_root, root);
        assert_eq!(ctx.state_dir, root.join(STATE_DIR));
    }

    #[test]
    fn resolve_from_fails_outside_a_workspace() {
        let tmp = TempDir::new().unwrap();
        let err = ScheduleContext::resolve_from(tmp.path()).unwrap_err();
        assert!(matches!(err, SlotlineError::UserError(_)));
        assert!(err.to_string().contains("slotline init"));
    }

    #[test]
    fn resolve_prefers_the_nearest_state_dir() {
        let tmp = TempDir::new().unwrap();
        let outer = tmp.path().join("outer");
        let inner = outer.join("inner");
        fs::create_dir_all(outer.join(STATE_DIR)).unwrap();
        fs::create_dir_all(inner.join(STATE_DIR)).unwrap();

        let ctx = ScheduleContext::resolve_from(&inner).unwrap();
        assert_eq!(ctx.workspace_root, inner);
    }

    #[test]
    fn paths_hang_off_the_state_dir() {
        let ctx = ScheduleContext::at_root("/work/project");
        assert_eq!(
            ctx.config_path(),
            PathBuf::from("/work/project/.slotline/config.yaml")
        );
        assert_eq!(
            ctx.slots_path(),
            PathBuf::from("/work/project/.slotline/slots.json")
        );
        assert_eq!(
            ctx.tasks_path(),
            PathBuf::from("/work/project/.slotline/tasks.yaml")
        );
        assert_eq!(ctx.locks_dir(), PathBuf::from("/work/project/.slotline/locks"));
        assert_eq!(
            ctx.events_dir(),
            PathBuf::from("/work/project/.slotline/events")
        );
    }

    #[test]
    fn require_initialized_checks_the_slot_store() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(STATE_DIR)).unwrap();
        let ctx = ScheduleContext::resolve_from(tmp.path()).unwrap();

        assert!(ctx.require_initialized().is_err());
        fs::write(ctx.slots_path(), "{}").unwrap();
        assert!(ctx.require_initialized().is_ok());
    }
}
