//! Punch store service
//!
//! Owns the competition tree, merges punches into it and persists the whole
//! tree through a [`TreeBackend`] after every change.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::punch::{
    competition_root, punch_path, CARD_TAG, COMPETITION_TAG, NAME_ATTR, PUNCH_TAG, STATION_TAG,
};
use crate::domain::text::ensure_xml_text;
use crate::domain::{merge, RecordPath, RecordSpec, TreeNode};
use crate::infrastructure::traits::{RealFileSystem, TreeBackend};
use crate::infrastructure::XmlBackend;

/// Entity counts of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub name: String,
    pub stations: usize,
    pub cards: usize,
    pub punches: usize,
}

/// Competition store backed by a single tree file.
///
/// Access is not synchronised: use one writer per location.
pub struct PunchStore {
    backend: Arc<dyn TreeBackend>,
    location: PathBuf,
    name: String,
    pretty_print: bool,
    root: TreeNode,
}

impl PunchStore {
    /// Open the store at `location`, creating it if missing.
    ///
    /// An existing store must have a `competition` root with a `name`
    /// attribute. If `expected_name` is given it must equal the stored name;
    /// otherwise the stored name is adopted. A new store is written
    /// immediately, so the location exists once this returns.
    #[instrument(level = "debug", skip(backend))]
    pub fn open(
        location: &Path,
        expected_name: Option<&str>,
        pretty_print: bool,
        backend: Arc<dyn TreeBackend>,
    ) -> ApplicationResult<Self> {
        if let Some(name) = expected_name {
            ensure_xml_text("competition name", name)?;
        }

        if backend.exists(location) {
            let root = backend
                .load(location)
                .with_path_context("load store", location)?;
            let name = validate_root(&root, location, expected_name)?;
            info!("opened store {} ({:?})", location.display(), name);
            return Ok(Self {
                backend,
                location: location.to_path_buf(),
                name,
                pretty_print,
                root,
            });
        }

        let name = expected_name.unwrap_or_default().to_string();
        let store = Self {
            root: competition_root(&name)?,
            backend,
            location: location.to_path_buf(),
            name,
            pretty_print,
        };
        store.save()?;
        info!("created store {} ({:?})", location.display(), store.name);
        Ok(store)
    }

    /// Open a store file with the XML backend on the real filesystem.
    pub fn open_file(
        location: impl AsRef<Path>,
        expected_name: Option<&str>,
        pretty_print: bool,
    ) -> ApplicationResult<Self> {
        let backend = Arc::new(XmlBackend::new(Arc::new(RealFileSystem)));
        Self::open(location.as_ref(), expected_name, pretty_print, backend)
    }

    /// Record a punch and persist the store.
    ///
    /// Identical punches are merged; a new time at the same station and card
    /// becomes a new `Punch` sibling. `other_info` is placed below the punch.
    pub fn add_punch(
        &mut self,
        station: impl ToString,
        card: impl ToString,
        time: impl ToString,
        other_info: Vec<RecordSpec>,
    ) -> ApplicationResult<()> {
        let (station, card, time) = (station.to_string(), card.to_string(), time.to_string());
        debug!(%station, %card, %time, extra = other_info.len(), "add_punch");
        self.insert(&punch_path(station, card, time, other_info))
    }

    /// Merge an arbitrary record path below the root and persist the store.
    ///
    /// All values are checked before the tree is touched. A failure during
    /// the merge itself can leave partial levels in memory; reopen the store
    /// in that case.
    pub fn insert(&mut self, path: &RecordPath) -> ApplicationResult<()> {
        path.validate()?;
        merge::insert(&mut self.root, path)?;
        self.save()
    }

    /// Write the tree in readable form. Does not modify the store.
    pub fn dump<W: Write>(&self, out: &mut W) -> ApplicationResult<()> {
        let rendered = self.backend.render(&self.root, self.pretty_print);
        out.write_all(rendered.as_bytes())
            .and_then(|_| out.flush())
            .with_path_context("dump store", &self.location)
    }

    pub fn summary(&self) -> StoreSummary {
        let stations: Vec<_> = self.root.children_named(STATION_TAG).collect();
        let cards: Vec<_> = stations
            .iter()
            .flat_map(|s| s.children_named(CARD_TAG))
            .collect();
        let punches = cards
            .iter()
            .map(|c| c.children_named(PUNCH_TAG).count())
            .sum();
        StoreSummary {
            name: self.name.clone(),
            stations: stations.len(),
            cards: cards.len(),
            punches,
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn pretty_print(&self) -> bool {
        self.pretty_print
    }

    fn save(&self) -> ApplicationResult<()> {
        self.backend
            .save(&self.location, &self.root, self.pretty_print)
            .with_path_context("save store", &self.location)
    }
}

/// Check the root shape and resolve the competition name.
fn validate_root(
    root: &TreeNode,
    location: &Path,
    expected_name: Option<&str>,
) -> ApplicationResult<String> {
    if root.tag() != COMPETITION_TAG {
        return Err(ApplicationError::Schema {
            path: location.to_path_buf(),
            message: format!(
                "wrong root tag {:?}, expected {:?}",
                root.tag(),
                COMPETITION_TAG
            ),
        });
    }
    let stored = root
        .attribute(NAME_ATTR)
        .ok_or_else(|| ApplicationError::Schema {
            path: location.to_path_buf(),
            message: format!("root has no {:?} attribute", NAME_ATTR),
        })?;

    match expected_name {
        Some(expected) if expected != stored => Err(ApplicationError::NameMismatch {
            path: location.to_path_buf(),
            expected: expected.to_string(),
            found: stored.to_string(),
        }),
        _ => Ok(stored.to_string()),
    }
}
