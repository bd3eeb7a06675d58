//! # buildfs-hook
//!
//! Pre-build action for firmware packaging: before the filesystem image is
//! built, make sure the project's `data/` directory exists so the image tool
//! always has a source directory to pack.
//!
//! ## How it works
//!
//! 1. A build driver creates a [`BuildHooks`] registry and calls [`register`],
//!    which attaches the `create_data_dir` pre-action to the
//!    [`BUILDFS_TARGET`] target.
//! 2. When the driver is about to build that target it calls
//!    [`BuildHooks::run_pre_actions`] with a [`BuildContext`].
//! 3. The action resolves `<project>/data` and creates it if absent.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use buildfs_hook::{register, resolve_project_dir, BuildContext, BuildHooks, BUILDFS_TARGET};
//!
//! let mut hooks = BuildHooks::new();
//! register(&mut hooks);
//!
//! let ctx = BuildContext::new(resolve_project_dir(None).expect("no project dir"));
//! hooks.run_pre_actions(BUILDFS_TARGET, &ctx).expect("pre-build failed");
//! ```
//!
//! ## Environment variable overrides
//!
//! - `PROJECT_DIR`: project root used when no directory is passed explicitly.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Build target the data-directory action is attached to.
pub const BUILDFS_TARGET: &str = "buildfs";

/// Name of the directory (relative to the project root) packed into the image.
pub const DATA_DIR_NAME: &str = "data";

/// Environment variable consulted by [`resolve_project_dir`].
pub const PROJECT_DIR_ENV: &str = "PROJECT_DIR";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by buildfs-hook operations.
#[derive(Error, Debug)]
pub enum BuildFsError {
    /// Neither an explicit directory nor `PROJECT_DIR` was given and the
    /// current directory could not be read.
    #[error("Cannot determine project directory: {0}")]
    ProjectDir(#[source] std::io::Error),

    /// Creating the data directory failed.
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Something other than a directory already occupies the data path.
    #[error("'{path}' exists but is not a directory")]
    NotADirectory { path: PathBuf },
}

// ── Data directory ───────────────────────────────────────────────────────────

/// Outcome of [`ensure_data_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataDirStatus {
    /// The directory was missing and has been created.
    Created(PathBuf),
    /// The directory was already present.
    Existing(PathBuf),
}

impl DataDirStatus {
    /// Path of the data directory regardless of whether it was just created.
    pub fn path(&self) -> &Path {
        match self {
            DataDirStatus::Created(p) | DataDirStatus::Existing(p) => p,
        }
    }
}

impl fmt::Display for DataDirStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataDirStatus::Created(p) => {
                write!(f, "Data directory {} doesn't exist, created it", p.display())
            }
            DataDirStatus::Existing(p) => write!(f, "Data directory {} exists", p.display()),
        }
    }
}

/// Resolve the project root: explicit argument, then `PROJECT_DIR`, then the
/// current working directory.
pub fn resolve_project_dir(explicit: Option<&Path>) -> Result<PathBuf, BuildFsError> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Ok(dir) = std::env::var(PROJECT_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    std::env::current_dir().map_err(BuildFsError::ProjectDir)
}

/// Ensure `<project_dir>/data` exists, creating it (and any missing parents)
/// when absent.
pub fn ensure_data_dir(project_dir: &Path) -> Result<DataDirStatus, BuildFsError> {
    let data_dir = project_dir.join(DATA_DIR_NAME);

    if data_dir.is_dir() {
        return Ok(DataDirStatus::Existing(data_dir));
    }
    if data_dir.exists() {
        return Err(BuildFsError::NotADirectory { path: data_dir });
    }

    std::fs::create_dir_all(&data_dir).map_err(|source| BuildFsError::CreateDir {
        path: data_dir.clone(),
        source,
    })?;
    Ok(DataDirStatus::Created(data_dir))
}

// ── Hook registry ────────────────────────────────────────────────────────────

/// State handed to every pre-action.
#[derive(Debug, Clone)]
pub struct BuildContext {
    project_dir: PathBuf,
}

impl BuildContext {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }
}

/// A pre-build action. Returns a human-readable status line on success.
pub type PreAction = Box<dyn Fn(&BuildContext) -> Result<String, BuildFsError> + Send + Sync>;

/// Ordered list of pre-actions keyed by build target.
#[derive(Default)]
pub struct BuildHooks {
    pre_actions: Vec<(String, PreAction)>,
}

impl fmt::Debug for BuildHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildHooks")
            .field(
                "pre_actions",
                &self.pre_actions.iter().map(|(t, _)| t).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl BuildHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `action` to run before `target` is built.
    pub fn add_pre_action<F>(&mut self, target: impl Into<String>, action: F)
    where
        F: Fn(&BuildContext) -> Result<String, BuildFsError> + Send + Sync + 'static,
    {
        self.pre_actions.push((target.into(), Box::new(action)));
    }

    /// Number of actions registered for `target`.
    pub fn pre_action_count(&self, target: &str) -> usize {
        self.pre_actions.iter().filter(|(t, _)| t == target).count()
    }

    /// Run every action registered for `target` in registration order.
    ///
    /// Stops at the first failing action. Returns the status lines of the
    /// actions that ran.
    pub fn run_pre_actions(
        &self,
        target: &str,
        ctx: &BuildContext,
    ) -> Result<Vec<String>, BuildFsError> {
        self.pre_actions
            .iter()
            .filter(|(t, _)| t == target)
            .map(|(_, action)| action(ctx))
            .collect()
    }
}

/// Register the data-directory pre-action on the [`BUILDFS_TARGET`] target.
pub fn register(hooks: &mut BuildHooks) {
    hooks.add_pre_action(BUILDFS_TARGET, create_data_dir);
}

fn create_data_dir(ctx: &BuildContext) -> Result<String, BuildFsError> {
    let status = ensure_data_dir(ctx.project_dir())?;
    Ok(format!(
        "Preparing filesystem image from data directory\n{status}"
    ))
}

// ── Tests ────────────────────────────────────────────────────────────────────
