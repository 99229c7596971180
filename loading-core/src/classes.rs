use serde::{Deserialize, Serialize};

/// Class names and attributes the widget reads from and writes to the DOM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Classes {
    pub prefix: String,
    /// Class of the spinner root element
    pub root: String,
    pub svg: String,
    /// Marks a stopped spinner
    pub stop: String,
    pub overlay: String,
    /// Marks the overlay of a stopped spinner
    pub overlay_stop: String,
    /// Attribute identifying spinner elements for [`Registry::init`](crate::Registry::init)
    pub selector_init: String,
    /// Name of the animation which runs after the spinner has been stopped
    pub end_animation: String,
}

impl Classes {
    /// Derives all class names from `prefix`
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            root: format!("{prefix}--loading"),
            svg: format!("{prefix}--loading__svg"),
            stop: format!("{prefix}--loading--stop"),
            overlay: format!("{prefix}--loading-overlay"),
            overlay_stop: format!("{prefix}--loading-overlay--stop"),
            selector_init: "data-loading".into(),
            end_animation: "rotate-end-p2".into(),
        }
    }
}

impl Default for Classes {
    fn default() -> Self {
        Self::with_prefix("bx")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn prefix() {
        let classes = Classes::with_prefix("cds");

        assert_eq!(classes.stop, "cds--loading--stop");
        assert_eq!(classes.overlay_stop, "cds--loading-overlay--stop");
        assert_eq!(Classes::default().root, "bx--loading");
    }

    #[test]
    fn deserialize_partial() {
        let classes: Classes =
            serde_json::from_str(r#"{ "stop": "is-stopped", "selectorInit": "data-spinner" }"#)
                .unwrap();

        assert_eq!(classes.stop, "is-stopped");
        assert_eq!(classes.selector_init, "data-spinner");
        assert_eq!(classes.root, "bx--loading");
    }
}
