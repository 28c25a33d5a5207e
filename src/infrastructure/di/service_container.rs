//! Service container for dependency injection
//!
//! Wires the store up with its persistence dependencies.

use std::sync::Arc;

use crate::application::services::PunchStore;
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, TreeBackend};
use crate::infrastructure::xml::XmlBackend;

/// Container holding settings and the I/O implementations behind the store.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Tree persistence on top of `fs`
    pub backend: Arc<dyn TreeBackend>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with a custom filesystem (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let backend: Arc<dyn TreeBackend> = Arc::new(XmlBackend::new(Arc::clone(&fs)));

        Self {
            settings,
            fs,
            backend,
        }
    }

    /// Open the store configured in `settings`.
    pub fn open_store(&self) -> ApplicationResult<PunchStore> {
        PunchStore::open(
            &self.settings.store_path,
            self.settings.competition_name.as_deref(),
            self.settings.pretty_print,
            Arc::clone(&self.backend),
        )
    }
}
