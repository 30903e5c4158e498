//! Visual marker definition and one-time style injection

use super::Dom;
use serde::{Deserialize, Serialize};

/// The marker class and the style sheet that renders it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Id of the injected style sheet
    pub style_id: String,
    /// Class attached to matching elements
    pub class: String,
    /// Background colour
    pub background: String,
}

impl MarkerStyle {
    /// CSS text for the marker class
    #[must_use]
    pub fn css(&self) -> String {
        format!(
            concat!(
                ".{} {{\n",
                "  background-color: {} !important;\n",
                "  font-weight: bold !important;\n",
                "  border-radius: 2px;\n",
                "  padding: 0 3px;\n",
                "}}\n",
            ),
            self.class, self.background
        )
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            style_id: "gmail-address-highlighter-style".to_string(),
            class: "gmail-address-highlight".to_string(),
            background: "#fff3b0".to_string(),
        }
    }
}

/// Install the marker style sheet once per document
///
/// Returns `false` when a sheet with the same id is already present.
pub fn inject_style<D: Dom + ?Sized>(dom: &mut D, style: &MarkerStyle) -> bool {
    if dom.has_style(&style.style_id) {
        return false;
    }
    dom.insert_style(&style.style_id, &style.css());
    true
}
