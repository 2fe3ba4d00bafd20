//! The flat settings object owned by the external settings store.

use serde::{Deserialize, Serialize};

use crate::grade::Grade;

/// Extension settings, as persisted by the settings store.
///
/// The pipeline only reads the text simplifier fields and `backend_url`; the
/// rest belong to the visual features and are carried so a round trip through
/// this type does not lose them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub visual_shift_enabled: bool,
    pub visual_shift_amount: u32,
    pub highlighter_ruler_enabled: bool,
    pub highlight_color: String,
    pub dim_opacity: u32,
    pub flashing_anchor_bar_enabled: bool,
    pub flash_interval: u64,
    pub bar_width: u32,
    pub text_simplifier_enabled: bool,
    pub text_simplifier_grade: Grade,
    /// Root of the remote rewriting service. `None` keeps the configured one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            visual_shift_enabled: false,
            visual_shift_amount: 15,
            highlighter_ruler_enabled: false,
            highlight_color: "#ffc800".to_string(),
            dim_opacity: 70,
            flashing_anchor_bar_enabled: false,
            flash_interval: 1000,
            bar_width: 8,
            text_simplifier_enabled: false,
            text_simplifier_grade: Grade::DEFAULT,
            backend_url: None,
        }
    }
}

impl Settings {
    pub fn with_simplifier(mut self, enabled: bool, grade: Grade) -> Self {
        self.text_simplifier_enabled = enabled;
        self.text_simplifier_grade = grade;
        self
    }

    pub fn with_backend_url(mut self, backend_url: impl Into<String>) -> Self {
        self.backend_url = Some(backend_url.into());
        self
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
