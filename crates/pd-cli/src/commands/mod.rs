pub mod archive;
pub mod catalog;
pub mod collaborators;
pub mod play;
pub mod suggest;

/// Placeholder shown for empty cells.
const EMPTY: &str = "-";

fn or_empty(text: &str) -> &str {
    if text.is_empty() { EMPTY } else { text }
}
