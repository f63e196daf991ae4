//! Domain models shared by the catalog, the resolver, the asset locator and the
//! bot. They stay light-weight data holders so the other layers can focus on
//! lookup and delivery logic.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::UnknownCollection;

/// Identifies the person on the other end of a conversation. Chat networks
/// hand out numeric ids, so we keep it as an integer.
pub type UserId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The printed hymnals we can look hymns up in. Each one is a separate
/// namespace: hymn numbers repeat across collections.
pub enum Collection {
    Red,
    Youth,
}

impl Collection {
    /// Every collection in the order the chooser keyboard shows them.
    pub const ALL: [Collection; 2] = [Collection::Red, Collection::Youth];

    /// Stable identifier used in the catalog file and as the asset folder name.
    pub fn id(self) -> &'static str {
        match self {
            Collection::Red => "red",
            Collection::Youth => "youth",
        }
    }

    /// Button caption on the chooser keyboard.
    pub fn label(self) -> &'static str {
        match self {
            Collection::Red => "Red hymnal",
            Collection::Youth => "Youth hymnal",
        }
    }

    /// Map a keyboard caption back to its collection.
    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|collection| collection.label() == text.trim())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|collection| collection.id() == value.trim())
            .ok_or_else(|| UnknownCollection(value.trim().to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row of the catalog.
pub struct HymnRecord {
    pub collection: Collection,
    /// Hymn number exactly as printed, trimmed. Kept as text so "007" and "7"
    /// stay distinct and compare exactly.
    pub number: String,
    /// Display title; matching against it is case-insensitive.
    pub title: String,
}

impl HymnRecord {
    pub fn new(collection: Collection, number: &str, title: &str) -> Self {
        Self {
            collection,
            number: number.trim().to_string(),
            title: title.trim().to_string(),
        }
    }
}

impl fmt::Display for HymnRecord {
    /// `number — title`, the line format used in disambiguation lists.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {}", self.number, self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What a lookup produced. A numeric query that finds nothing yields an empty
/// `TitleMatches`, so callers only have one not-found shape to check.
pub enum MatchOutcome<'a> {
    ExactNumber(&'a HymnRecord),
    TitleMatches(Vec<&'a HymnRecord>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Page images for one hymn, ordered by file name.
pub struct AssetSet {
    pages: Vec<PathBuf>,
}

impl AssetSet {
    pub fn new(mut pages: Vec<PathBuf>) -> Self {
        pages.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Self { pages }
    }

    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Bare file names, handy for logging and assertions.
    pub fn file_names(&self) -> Vec<&str> {
        self.pages
            .iter()
            .filter_map(|page| page.file_name().and_then(|name| name.to_str()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.pages.iter().map(PathBuf::as_path)
    }
}
