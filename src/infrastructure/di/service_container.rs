//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{ComparisonService, ProposalService};
use crate::config::Settings;
use crate::infrastructure::snapshot::JsonSnapshotStore;
use crate::infrastructure::traits::{FileSystem, ItemStore, RealFileSystem, SnapshotSource};
use crate::infrastructure::InfraResult;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    pub source: Arc<dyn SnapshotSource>,

    pub store: Arc<dyn ItemStore>,
}

impl ServiceContainer {
    /// Create a container reading the configured snapshot file.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        Self::open_with_fs(settings, Arc::new(RealFileSystem))
    }

    /// Same as [`ServiceContainer::new`] over a custom filesystem.
    pub fn open_with_fs(settings: Settings, fs: Arc<dyn FileSystem>) -> InfraResult<Self> {
        let snapshot = Arc::new(JsonSnapshotStore::open(fs, &settings.snapshot)?);
        Ok(Self::with_deps(settings, snapshot.clone(), snapshot))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        source: Arc<dyn SnapshotSource>,
        store: Arc<dyn ItemStore>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            source,
            store,
        }
    }

    pub fn comparison(&self) -> ComparisonService {
        ComparisonService::new(Arc::clone(&self.source))
    }

    pub fn proposals(&self) -> ProposalService {
        ProposalService::new(Arc::clone(&self.source), Arc::clone(&self.store))
    }
}
