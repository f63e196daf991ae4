//! Query classification and matching against the catalog.
//!
//! A query that contains any digit is a number lookup: the leftmost run of
//! digits is compared exactly against hymn numbers, so "hymn 42" and "42"
//! behave the same. Everything else is a case-insensitive substring search
//! over titles. Titles that contain digits therefore cannot be found by title.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::Catalog;
use crate::models::{Collection, HymnRecord, MatchOutcome};

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// First contiguous digit run found in the text.
    Number(String),
    /// Trimmed free text, matched as a whole.
    Title(String),
}

impl Query {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match DIGIT_RUN.find(text) {
            Some(digits) => Query::Number(digits.as_str().to_string()),
            None => Query::Title(text.to_string()),
        }
    }
}

impl Catalog {
    /// Look a query up inside one collection.
    pub fn resolve(&self, query: &str, collection: Collection) -> MatchOutcome<'_> {
        self.resolve_query(&Query::parse(query), collection)
    }

    pub fn resolve_query(&self, query: &Query, collection: Collection) -> MatchOutcome<'_> {
        match query {
            Query::Number(number) => match self.find_number(number, collection) {
                Some(record) => MatchOutcome::ExactNumber(record),
                None => MatchOutcome::TitleMatches(Vec::new()),
            },
            Query::Title(title) => MatchOutcome::TitleMatches(self.search_titles(title, collection)),
        }
    }

    /// First record in catalog order wins when a number is duplicated.
    pub fn find_number(&self, number: &str, collection: Collection) -> Option<&HymnRecord> {
        self.in_collection(collection)
            .find(|record| record.number == number)
    }

    pub fn search_titles(&self, title: &str, collection: Collection) -> Vec<&HymnRecord> {
        let needle = title.to_lowercase();
        self.in_collection(collection)
            .filter(|record| record.title.to_lowercase().contains(&needle))
            .collect()
    }
}
