//! Naive `href` extraction from a single-anchor HTML fragment.

const HREF_OPEN: &str = "href=\"";

/// Return the text between the first `href="` and the next `"` in `fragment`.
///
/// Precondition: `fragment` is the markup of one table cell holding a single
/// `<a href="...">` element. This is plain substring search, not attribute
/// parsing: a second anchor, single-quoted or unquoted attributes, and an
/// `href="` inside another attribute's value all produce the wrong answer.
///
/// Never fails. With no `href="` the result is empty; with no closing quote it
/// is everything after `href="`. Callers must not assume a non-empty result.
pub fn extract_link(fragment: &str) -> &str {
    let Some(open) = fragment.find(HREF_OPEN) else {
        return "";
    };
    let rest = &fragment[open + HREF_OPEN.len()..];
    match rest.find('"') {
        Some(close) => &rest[..close],
        None => rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_relative_link() {
        let cell = r#"<a href="/forms/gd1.pdf">Graphic Designer</a>"#;
        assert_eq!(extract_link(cell), "/forms/gd1.pdf");
    }

    #[test]
    fn ignores_surrounding_markup_and_whitespace() {
        let cell = "\n  <a href=\"https://example.edu/a b.pdf\" target=\"_blank\">Post</a>\n";
        assert_eq!(extract_link(cell), "https://example.edu/a b.pdf");
    }

    #[test]
    fn takes_first_anchor_only() {
        let cell = r#"<a href="/one.pdf">1</a> <a href="/two.pdf">2</a>"#;
        assert_eq!(extract_link(cell), "/one.pdf");
    }

    #[test]
    fn missing_href_yields_empty() {
        assert_eq!(extract_link("Graphic Designer"), "");
        assert_eq!(extract_link(""), "");
        assert_eq!(extract_link("<a href='/single.pdf'>x</a>"), "");
    }

    #[test]
    fn unterminated_href_yields_remainder() {
        assert_eq!(extract_link(r#"<a href="/broken.pdf"#), "/broken.pdf");
    }

    #[test]
    fn empty_href() {
        assert_eq!(extract_link(r#"<a href="">x</a>"#), "");
    }

    #[test]
    fn keeps_entity_escapes_verbatim() {
        let cell = r#"<a href="/get.php?id=7&amp;type=pdf">x</a>"#;
        assert_eq!(extract_link(cell), "/get.php?id=7&amp;type=pdf");
    }
}
