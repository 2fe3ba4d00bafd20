//! Selection of the text blocks worth simplifying.

use super::tree::{NodeId, PageTree};

/// Block categories, visited in this order.
pub const CATEGORIES: [&str; 15] = [
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "td",
    "th",
    "figcaption",
    "dd",
    "dt",
    "ul",
    "ol",
];

/// Page chrome that is never touched.
const CHROME: [&str; 3] = ["header", "footer", "nav"];

/// Lists are taken whole even though their items may contain blocks.
const WHOLE_BLOCKS: [&str; 2] = ["ul", "ol"];

fn is_category(tag: &str) -> bool {
    CATEGORIES.contains(&tag)
}

/// Text blocks of `tree`, grouped by category in [`CATEGORIES`] order and in
/// document order within a category.
///
/// Skipped: anything inside `header`/`footer`/`nav` or a link, blocks nested
/// in a block of another category, blocks that contain other blocks (lists
/// excepted), and blocks whose trimmed text is shorter than `min_text_length`
/// characters.
pub fn discover(tree: &PageTree, min_text_length: usize) -> Vec<NodeId> {
    let elements = tree.elements();
    let mut found = Vec::new();

    for category in CATEGORIES {
        for &id in &elements {
            if tree.tag(id) != Some(category) {
                continue;
            }
            if tree.closest(id, |tag| CHROME.contains(&tag)).is_some() {
                continue;
            }
            if tree.closest(id, |tag| tag == "a").is_some() {
                continue;
            }
            let nested = tree
                .ancestors(id)
                .filter_map(|a| tree.tag(a))
                .any(|tag| tag != category && is_category(tag));
            if nested {
                continue;
            }
            if !WHOLE_BLOCKS.contains(&category) {
                let contains_block = tree
                    .descendants(id)
                    .into_iter()
                    .filter_map(|d| tree.tag(d))
                    .any(is_category);
                if contains_block {
                    continue;
                }
            }
            if tree.text_content(id).trim().chars().count() < min_text_length {
                continue;
            }
            found.push(id);
        }
    }

    found
}
