//! Editor and page configuration.

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};

/// Page dimensions and band layout, in document units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSettings {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub header: bool,
    pub header_height: f32,
    pub footer: bool,
    pub footer_height: f32,
}

impl Default for PageSettings {
    /// A4 portrait in points.
    fn default() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
            margin_left: 20.0,
            margin_top: 20.0,
            margin_right: 20.0,
            margin_bottom: 20.0,
            header: true,
            header_height: 80.0,
            footer: true,
            footer_height: 80.0,
        }
    }
}

impl PageSettings {
    pub fn content_width(&self) -> f32 {
        (self.width - self.margin_left - self.margin_right).max(0.0)
    }

    /// Height left for the content band between header and footer.
    pub fn content_height(&self) -> f32 {
        let mut height = self.height - self.margin_top - self.margin_bottom;
        if self.header {
            height -= self.header_height;
        }
        if self.footer {
            height -= self.footer_height;
        }
        height.max(0.0)
    }
}

/// Configuration for editing sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Snap quantum for drag and resize. Default: **10**.
    pub grid_size: f32,

    /// Whether gestures snap to the grid. Default: **true**.
    pub snap_to_grid: bool,

    /// Maximum number of undo steps kept by the history. Default: **100**.
    pub max_undo_depth: usize,

    pub page: PageSettings,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid_size: 10.0,
            snap_to_grid: true,
            max_undo_depth: 100,
            page: PageSettings::default(),
        }
    }
}

impl LayoutConfig {
    /// Parse a JSON config; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Active snap quantum, 0 when snapping is off.
    pub fn grid(&self) -> f32 {
        if self.snap_to_grid && self.grid_size > 0.0 {
            self.grid_size
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let config = LayoutConfig::from_json(r#"{ "gridSize": 5, "page": { "header": false } }"#)
            .unwrap();
        assert_eq!(config.grid_size, 5.0);
        assert!(config.snap_to_grid);
        assert_eq!(config.max_undo_depth, 100);
        assert!(!config.page.header);
        assert_eq!(config.page.width, 595.0);
    }

    #[test]
    fn grid_is_zero_when_snapping_is_off() {
        let config = LayoutConfig {
            snap_to_grid: false,
            ..LayoutConfig::default()
        };
        assert_eq!(config.grid(), 0.0);
        assert_eq!(LayoutConfig::default().grid(), 10.0);
    }

    #[test]
    fn content_band_takes_remaining_height() {
        let page = PageSettings::default();
        assert_eq!(page.content_width(), 555.0);
        assert_eq!(page.content_height(), 842.0 - 40.0 - 160.0);
    }
}
