//! Project discovery.
//!
//! Walks a source tree for symbol manifests. Every directory below the root
//! holding a manifest is one project, named after the directory. Generated
//! output directories and hidden directories are never entered.
//!
//! ```text
//! repo/                        ← root, home of the common pseudo-project
//! ├── App/
//! │   ├── kiln.symbols.json    ← project "App"
//! │   └── Generated/           ← skipped
//! └── libs/
//!     └── Lib/
//!         └── kiln.symbols.json ← project "Lib"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use kiln_core::{
    application::ApplicationError,
    domain::{DEFAULT_GENERATED_SUFFIX, MasterEnvironmentBuilder},
    error::KilnResult,
};

use crate::graph::ManifestGraph;

pub const DEFAULT_MANIFEST_NAME: &str = "kiln.symbols.json";
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// A project found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredProject {
    pub name: String,
    pub directory: PathBuf,
    pub manifest: PathBuf,
}

/// Finds projects under a root directory.
#[derive(Debug, Clone)]
pub struct ProjectDiscovery {
    root: PathBuf,
    manifest_name: String,
    generated_suffix: String,
    max_depth: usize,
}

impl ProjectDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest_name: DEFAULT_MANIFEST_NAME.into(),
            generated_suffix: DEFAULT_GENERATED_SUFFIX.into(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    /// Name of the generated output directories to skip.
    pub fn generated_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.generated_suffix = suffix.into();
        self
    }

    /// Deepest directory level searched, the root being level 0.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every project below the root, sorted by path.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn discover(&self) -> KilnResult<Vec<DiscoveredProject>> {
        if !self.root.is_dir() {
            return Err(ApplicationError::FilesystemError {
                path: self.root.clone(),
                reason: "Root directory does not exist".into(),
            }
            .into());
        }

        let walker = WalkDir::new(&self.root)
            // the manifest sits one level below its project directory
            .max_depth(self.max_depth.saturating_add(1))
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_skipped(entry));

        let mut projects = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable path");
                    continue;
                }
            };

            // A manifest directly in the root would share the common output scope.
            if entry.depth() < 2 || !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_str() != Some(self.manifest_name.as_str()) {
                continue;
            }

            if let Some(project) = Self::project_for(entry.path()) {
                debug!(project = %project.name, dir = %project.directory.display(), "Found project");
                projects.push(project);
            }
        }

        info!(count = projects.len(), "Project discovery finished");
        Ok(projects)
    }

    /// Register every discovered project, backed by its manifest.
    pub fn register(
        &self,
        builder: MasterEnvironmentBuilder,
    ) -> KilnResult<MasterEnvironmentBuilder> {
        let builder = self
            .discover()?
            .into_iter()
            .fold(builder, |builder, project| {
                builder.project(
                    project.name,
                    project.directory,
                    Arc::new(ManifestGraph::new(project.manifest)),
                )
            });
        Ok(builder)
    }

    fn is_skipped(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        name == self.generated_suffix.as_str() || name.starts_with('.')
    }

    fn project_for(manifest: &Path) -> Option<DiscoveredProject> {
        let directory = manifest.parent()?;
        let name = directory.file_name()?.to_str()?.to_string();
        Some(DiscoveredProject {
            name,
            directory: directory.to_path_buf(),
            manifest: manifest.to_path_buf(),
        })
    }
}
