//! Locates the page images of a hymn on disk.
//!
//! Layout: `<root>/<collection id>/<number><_ or .><anything>`. Hymns with
//! several pages rely on the file names sorting in page order (`12_1.jpg`,
//! `12_2.jpg`), which the asset store has to guarantee.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::AssetError;
use crate::models::{AssetSet, Collection, HymnRecord};

/// Characters allowed right after the hymn number in a page file name.
const SEPARATORS: [char; 2] = ['_', '.'];

#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.id())
    }

    /// List the pages belonging to `record`. An empty set means the hymn has no
    /// scans yet; a missing collection folder is a storage error.
    pub fn locate(&self, record: &HymnRecord) -> Result<AssetSet, AssetError> {
        let dir = self.collection_dir(record.collection);
        let entries = fs::read_dir(&dir).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => AssetError::MissingCollection {
                collection: record.collection,
                path: dir.clone(),
            },
            _ => AssetError::Io {
                path: dir.clone(),
                source,
            },
        })?;

        let mut pages = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| AssetError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                debug!("skipping non UTF-8 asset name in {}", dir.display());
                continue;
            };
            if is_page_of(&name, &record.number) && path.is_file() {
                pages.push(path);
            }
        }

        Ok(AssetSet::new(pages))
    }
}

/// True when `file_name` is `number` followed by `_` or `.`. A bare prefix
/// test would hand hymn 2 the pages of hymn 23.
pub fn is_page_of(file_name: &str, number: &str) -> bool {
    if number.is_empty() {
        return false;
    }
    file_name
        .strip_prefix(number)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|next| SEPARATORS.contains(&next))
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use tempfile::TempDir;

    use super::*;

    fn store_with(files: &[&str]) -> (TempDir, AssetStore) {
        let dir = tempfile::tempdir().unwrap();
        let red = dir.path().join("red");
        fs::create_dir(&red).unwrap();
        for file in files {
            File::create(red.join(file)).unwrap();
        }
        let store = AssetStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn separator_is_required_after_number() {
        assert!(is_page_of("2_1.jpg", "2"));
        assert!(is_page_of("2.jpg", "2"));
        assert!(!is_page_of("23_1.jpg", "2"));
        assert!(!is_page_of("2", "2"));
        assert!(!is_page_of("12_1.jpg", "2"));
        assert!(!is_page_of(".DS_Store", ""));
        assert!(!is_page_of("_thumbs.db", ""));
    }

    #[test]
    fn pages_are_filtered_and_sorted() {
        let (_dir, store) = store_with(&["12_2.jpg", "123_1.jpg", "12_1.jpg", "1_1.jpg"]);
        let record = HymnRecord::new(Collection::Red, "12", "Amazing Grace");

        let pages = store.locate(&record).unwrap();
        assert_eq!(pages.file_names(), ["12_1.jpg", "12_2.jpg"]);
    }

    #[test]
    fn short_number_never_picks_up_longer_ones() {
        let (_dir, store) = store_with(&["23_1.jpg", "2.png"]);
        let record = HymnRecord::new(Collection::Red, "2", "Two");

        assert_eq!(store.locate(&record).unwrap().file_names(), ["2.png"]);
    }

    #[test]
    fn directories_are_not_pages() {
        let (dir, store) = store_with(&["5_1.jpg"]);
        fs::create_dir(dir.path().join("red").join("5_extra")).unwrap();
        let record = HymnRecord::new(Collection::Red, "5", "Five");

        assert_eq!(store.locate(&record).unwrap().file_names(), ["5_1.jpg"]);
    }

    #[test]
    fn no_pages_is_an_empty_set() {
        let (_dir, store) = store_with(&["1_1.jpg"]);
        let record = HymnRecord::new(Collection::Red, "99", "Missing");

        assert!(store.locate(&record).unwrap().is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (dir, store) = store_with(&["7_1.jpg"]);
        let name = OsStr::from_bytes(b"7_\xff.jpg");
        File::create(dir.path().join("red").join(name)).unwrap();
        let record = HymnRecord::new(Collection::Red, "7", "Seven");

        assert_eq!(store.locate(&record).unwrap().file_names(), ["7_1.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_collection_folder_is_an_io_error() {
        let (dir, store) = store_with(&[]);
        File::create(dir.path().join("youth")).unwrap();
        let record = HymnRecord::new(Collection::Youth, "1", "One");

        let err = store.locate(&record).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }), "{err:?}");
    }

    #[test]
    fn missing_collection_folder_is_an_error() {
        let (_dir, store) = store_with(&[]);
        let record = HymnRecord::new(Collection::Youth, "1", "One");

        let err = store.locate(&record).unwrap_err();
        assert!(matches!(
            err,
            AssetError::MissingCollection {
                collection: Collection::Youth,
                ..
            }
        ));
    }
}
