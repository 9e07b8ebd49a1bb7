use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Scaffold an initialized workspace with the given tasks.yaml content.
pub(crate) fn create_test_workspace(tasks_yaml: &str) -> TempDir {
    use crate::context::ScheduleContext;
    use crate::store::FileStore;

    let temp_dir = TempDir::new().unwrap();
    let ctx = ScheduleContext::at_root(temp_dir.path());

    std::fs::create_dir_all(ctx.locks_dir()).unwrap();
    std::fs::create_dir_all(ctx.events_dir()).unwrap();
    FileStore::create(ctx.slots_path()).unwrap();
    std::fs::write(ctx.tasks_path(), tasks_yaml).unwrap();

    temp_dir
}

/// A tasks.yaml with the single task most tests schedule against.
pub(crate) const ONE_TASK_YAML: &str = "\
tasks:
  - id: TASK-001
    name: engine rebuild
    expected_effort: 400.0
    actual_effort: 100.0
    last_update: 2023-01-01
";
