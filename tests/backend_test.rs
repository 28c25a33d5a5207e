//! Tests for the persistence seam: XmlBackend over FileSystem doubles

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use sixml::application::services::PunchStore;
use sixml::application::ApplicationError;
use sixml::domain::TreeNode;
use sixml::infrastructure::traits::{FileSystem, RealFileSystem, TreeBackend};
use sixml::infrastructure::XmlBackend;

/// In-memory filesystem recording every write.
#[derive(Default)]
struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
    writes: Mutex<usize>,
}

impl MemoryFileSystem {
    fn get(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        *self.writes.lock().unwrap() += 1;
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

/// Filesystem whose writes always fail.
struct ReadOnlyFileSystem;

impl FileSystem for ReadOnlyFileSystem {
    fn read_to_string(&self, _path: &Path) -> io::Result<String> {
        Err(io::Error::new(io::ErrorKind::NotFound, "nothing stored"))
    }

    fn write(&self, _path: &Path, _content: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }

    fn is_file(&self, _path: &Path) -> bool {
        false
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn given_memory_fs_when_adding_punches_then_every_change_is_one_write() {
    // Arrange
    let fs = Arc::new(MemoryFileSystem::default());
    let backend = Arc::new(XmlBackend::new(fs.clone()));
    let location = Path::new("/virtual/race.xml");

    // Act
    let mut store = PunchStore::open(location, Some("Race"), false, backend).unwrap();
    store.add_punch("97", "920407", "t1", vec![]).unwrap();
    store.add_punch("97", "920407", "t2", vec![]).unwrap();

    // Assert
    assert_eq!(fs.writes(), 3, "open plus one write per add_punch");
    let content = fs.get(location).unwrap();
    assert!(content.starts_with("<?xml version='1.0' encoding='utf-8'?>\n"));
    assert!(content.contains("<Punch Time=\"t1\" /><Punch Time=\"t2\" />"));
}

#[test]
fn given_stored_tree_when_loading_through_backend_then_matches_saved_tree() {
    let fs = Arc::new(MemoryFileSystem::default());
    let backend = XmlBackend::new(fs);
    let location = Path::new("race.xml");
    let mut root = TreeNode::new("competition", [("name", "Tävling")]).unwrap();
    root.append_child(TreeNode::new("SIstation", [("Nr", "31")]).unwrap());

    backend.save(location, &root, true).unwrap();

    assert!(backend.exists(location));
    assert_eq!(backend.load(location).unwrap(), root);
}

#[test]
fn given_failing_write_when_opening_new_store_then_error_is_propagated() {
    let backend = Arc::new(XmlBackend::new(Arc::new(ReadOnlyFileSystem)));

    let err = PunchStore::open(Path::new("race.xml"), Some("Race"), true, backend)
        .err()
        .expect("open must fail");

    match err {
        ApplicationError::OperationFailed { context, source } => {
            assert!(context.starts_with("save store"));
            let io = source.downcast_ref::<io::Error>().expect("io error");
            assert_eq!(io.kind(), io::ErrorKind::PermissionDenied);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn given_existing_file_when_writing_atomically_then_content_is_replaced() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("race.xml");
    std::fs::write(&path, "old content that is longer than the new one").unwrap();
    let fs = RealFileSystem;

    fs.write(&path, "new").unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    let leftovers = std::fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(leftovers, 1, "no temp files left behind");
}

#[test]
fn given_nested_path_when_ensuring_parent_then_directories_exist() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a").join("b").join("race.xml");

    RealFileSystem.ensure_parent(&path).unwrap();

    assert!(temp.path().join("a").join("b").is_dir());
}
