//! Visible text from HTML documents.

use scraper::{Html, Node};

const HIDDEN_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

/// Text nodes of the document in reading order, one per line.
///
/// Text inside script, style, noscript, template and head elements is
/// skipped. Whitespace-only nodes are dropped.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_in_order() {
        let html = r#"<html><head><title>Ignored</title><style>p { color: red; }</style></head>
            <body><h1>Cats</h1><p>Cats are <b>mammals</b>.</p>
            <script>var x = "hidden";</script><noscript>enable js</noscript>
            <p>Dogs too.</p></body></html>"#;
        assert_eq!(visible_text(html), "Cats\nCats are\nmammals\n.\nDogs too.");
    }

    #[test]
    fn test_fragment_without_body() {
        assert_eq!(visible_text("just text"), "just text");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(visible_text(""), "");
        assert_eq!(visible_text("<html><body>   </body></html>"), "");
    }
}
