//! Builds catalog rows from the OCR'd text of a hymnal's index pages.
//!
//! Index lines look like `  42  Title of the hymn`. Anything else (page
//! headers, OCR noise) is dropped. The output is ready to append to the
//! catalog file.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::Collection;

static INDEX_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mR)^\s*(\d{1,4})\s+([А-ЯЁA-Z][^\n\r]{2,100})$")
        .expect("index line pattern is valid")
});

/// Extract `collection;number;title` rows, ordered by hymn number. When the
/// same number shows up with different titles, every distinct row is kept.
pub fn extract_titles(text: &str, collection: Collection) -> Vec<String> {
    let mut rows = BTreeSet::new();
    for captures in INDEX_LINE.captures_iter(text) {
        let number = &captures[1];
        let title = captures[2].trim();
        let Ok(sort_key) = number.parse::<u32>() else {
            continue;
        };
        rows.insert((sort_key, format!("{};{};{}", collection.id(), number, title)));
    }
    rows.into_iter().map(|(_, row)| row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_index_lines_sorted_numerically() {
        let text = "СОДЕРЖАНИЕ\n\
                    10  Радость вечная\n\
                    2   Благодать\n\
                    page 3\n\
                    10  Радость вечная\n\
                    ab  Not a number\n";

        assert_eq!(
            extract_titles(text, Collection::Youth),
            ["youth;2;Благодать", "youth;10;Радость вечная"]
        );
    }

    #[test]
    fn rejects_lowercase_and_too_short_titles() {
        let text = "5 lowercase start\n6 Ab\n7 Amazing Grace\n";
        assert_eq!(extract_titles(text, Collection::Red), ["red;7;Amazing Grace"]);
    }
}
