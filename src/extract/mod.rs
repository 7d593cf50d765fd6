//! Pure markup → record extractors.
//!
//! Every extractor takes rendered HTML and returns records; nothing here
//! touches the browser. Selectors target the platform's current class names
//! and `data-e2e` markers, kept in ordered tables so markup drift is a table
//! edit rather than a control-flow change.

pub mod comment;
pub mod user;
pub mod video;

use scraper::ElementRef;

/// Collapse embedded newlines/carriage returns and runs of whitespace to
/// single spaces, trimming the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Space-joined, cleaned text content of an element.
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_collapses_line_breaks_and_trims() {
        assert_eq!(clean_text("  a\nb\r\nc  "), "a b c");
        assert_eq!(clean_text("one   two"), "one two");
        assert_eq!(clean_text("\r\n"), "");
    }
}
