//! User-facing copy.

use crate::models::{Collection, HymnRecord};

pub const CHOOSE_COLLECTION: &str = "Choose a hymnal:";
pub const SELECT_FIRST: &str = "Please choose a hymnal first.";
pub const NUMBER_NOT_FOUND: &str = "No hymn with that number was found.";
pub const TITLE_NOT_FOUND: &str = "Hymn not found 😢";
pub const NO_PAGES: &str = "⚠️ No pages were found for this hymn.";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong. Please try again later.";

pub fn collection_selected(collection: Collection) -> String {
    format!(
        "📖 {} selected. Send a hymn number or part of its title.",
        collection.label()
    )
}

pub fn disambiguation(matches: &[&HymnRecord]) -> String {
    let mut text = String::from("🔍 Several hymns match. Send the number you want:\n\n");
    for record in matches {
        text.push_str(&record.to_string());
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disambiguation_lists_number_and_title_per_line() {
        let first = HymnRecord::new(Collection::Red, "12", "Amazing Grace");
        let second = HymnRecord::new(Collection::Red, "2", "Grace Greater");

        let text = disambiguation(&[&first, &second]);
        let lines: Vec<_> = text.lines().skip(2).collect();
        assert_eq!(lines, ["12 — Amazing Grace", "2 — Grace Greater"]);
    }
}
