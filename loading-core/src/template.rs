//! Markup of the spinner.
//!
//! The markup is treated as an opaque string by the widget. The only structure relied upon is a
//! single element carrying the [`selector_init`](Classes::selector_init) attribute, which is the
//! root the widget binds to.

use crate::Classes;

/// Spinner markup for the default class names
pub const LOADING_HTML: &str = r#"<div data-loading class="bx--loading">
  <svg class="bx--loading__svg" viewBox="-75 -75 150 150">
    <title>Loading</title>
    <circle cx="0" cy="0" r="37.5" />
  </svg>
</div>
"#;

/// Renders the spinner markup for `classes`
pub fn markup(classes: &Classes) -> String {
    format!(
        r#"<div {attr} class="{root}">
  <svg class="{svg}" viewBox="-75 -75 150 150">
    <title>Loading</title>
    <circle cx="0" cy="0" r="37.5" />
  </svg>
</div>
"#,
        attr = classes.selector_init,
        root = classes.root,
        svg = classes.svg,
    )
}

/// Renders the spinner wrapped in a full page overlay
pub fn overlay_markup(classes: &Classes) -> String {
    format!(
        "<div class=\"{overlay}\">\n{spinner}</div>\n",
        overlay = classes.overlay,
        spinner = markup(classes),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::{self, markup::parse, Document, Node};

    #[test]
    fn default_markup() {
        assert_eq!(markup(&Classes::default()), LOADING_HTML);
    }

    #[test]
    fn single_marker_element() {
        let classes = Classes::with_prefix("cds");
        let document = Document::new();
        let body = document.body();

        body.set_inner_html(&overlay_markup(&classes)).unwrap();

        let found = dom::query_all(&body, &classes.selector_init);
        assert_eq!(found.len(), 1);
        assert!(found[0].contains_class("cds--loading"));

        let overlay = found[0].parent().unwrap();
        assert!(overlay.contains_class("cds--loading-overlay"));
        assert!(parse(LOADING_HTML).is_ok());
    }
}
