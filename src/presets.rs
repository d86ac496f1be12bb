// todo-pdf: built-in presets and themes

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::Configuration;
use crate::error::AppError;

/// A named partial configuration, overlaid on the defaults when applied.
#[derive(Debug, Clone, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub tags: Vec<&'static str>,
    pub config: Value,
}

impl Preset {
    pub fn configuration(&self) -> Result<Configuration, AppError> {
        Configuration::from_value(self.config.clone())
    }
}

/// Device and paper presets.
pub fn presets() -> Vec<Preset> {
    vec![
        Preset {
            name: "A4 Standard",
            description: "Two columns of twenty on A4 paper",
            tags: vec!["paper", "a4"],
            config: json!({
                "page_format": "A4",
                "items_per_col": 20,
                "columns": 2,
                "pages_of_todos": 30,
                "detail_pages_per_todo": 2,
                "margin_left": 8,
                "margin_right": 8,
                "margin_top": 18,
                "margin_bottom": 8,
                "auto_dot_spacing": false,
                "dot_spacing": 5.0,
                "dot_radius": 0.3
            }),
        },
        Preset {
            name: "Boox Note Max",
            description: "13.3\" e-ink tablet at 300 PPI",
            tags: vec!["ereader", "boox"],
            config: json!({
                "page_format": "Custom",
                "custom_method": "pixels",
                "pixels_width": 3200,
                "pixels_height": 2400,
                "ppi": 300,
                "items_per_col": 15,
                "columns": 2,
                "pages_of_todos": 25,
                "detail_pages_per_todo": 3,
                "margin_left": 10,
                "margin_right": 10,
                "margin_top": 20,
                "margin_bottom": 10,
                "auto_dot_spacing": false,
                "dot_spacing": 5.5,
                "dot_radius": 0.35,
                "pdf_quality": "print"
            }),
        },
        Preset {
            name: "Letter Size",
            description: "US Letter paper",
            tags: vec!["paper", "letter"],
            config: json!({
                "page_format": "Letter",
                "items_per_col": 18,
                "columns": 2,
                "pages_of_todos": 25,
                "detail_pages_per_todo": 2,
                "margin_left": 10,
                "margin_right": 10,
                "margin_top": 20,
                "margin_bottom": 10,
                "auto_dot_spacing": false,
                "dot_spacing": 5.0,
                "dot_radius": 0.3
            }),
        },
    ]
}

/// Featured looks shown in the gallery.
pub fn themes() -> Vec<Preset> {
    vec![
        Preset {
            name: "Academic",
            description: "Classic academic note-taking layout",
            tags: vec!["academic", "notes", "study"],
            config: json!({
                "page_format": "A4",
                "items_per_col": 25,
                "columns": 2,
                "margin_left": 10,
                "margin_right": 10,
                "margin_top": 15,
                "margin_bottom": 10,
                "auto_dot_spacing": false,
                "dot_spacing": 5.0,
                "guide_lines_enabled": true,
                "guide_h_color": "#E0E0E0",
                "guide_v_color": "#E0E0E0"
            }),
        },
        Preset {
            name: "Business",
            description: "Professional meeting notes and tasks",
            tags: vec!["business", "professional", "meetings"],
            config: json!({
                "page_format": "Letter",
                "items_per_col": 20,
                "columns": 2,
                "margin_left": 12,
                "margin_right": 12,
                "margin_top": 20,
                "margin_bottom": 15,
                "auto_dot_spacing": false,
                "dot_spacing": 5.5,
                "num_placement": "inside_left"
            }),
        },
        Preset {
            name: "E-Reader",
            description: "Optimized for e-ink displays",
            tags: vec!["ereader", "digital", "boox", "remarkable"],
            config: json!({
                "page_format": "Custom",
                "custom_method": "pixels",
                "pixels_width": 1872,
                "pixels_height": 1404,
                "ppi": 227,
                "items_per_col": 15,
                "columns": 2,
                "margin_left": 8,
                "margin_right": 8,
                "margin_top": 15,
                "margin_bottom": 8,
                "auto_dot_spacing": false,
                "dot_spacing": 6.0,
                "guide_lines_enabled": true
            }),
        },
        Preset {
            name: "Creative",
            description: "Mixed layout for sketches and notes",
            tags: vec!["creative", "art", "sketch"],
            config: json!({
                "page_format": "A4",
                "landscape": true,
                "items_per_col": 10,
                "columns": 3,
                "detail_pages_per_todo": 4,
                "margin_left": 15,
                "margin_right": 15,
                "margin_top": 20,
                "margin_bottom": 15,
                "auto_dot_spacing": false,
                "dot_spacing": 7.0,
                "dot_radius": 0.4
            }),
        },
        Preset {
            name: "Minimal",
            description: "Clean, distraction-free layout",
            tags: vec!["minimal", "clean", "simple"],
            config: json!({
                "page_format": "A5",
                "items_per_col": 15,
                "columns": 1,
                "margin_left": 10,
                "margin_right": 10,
                "margin_top": 15,
                "margin_bottom": 10,
                "auto_dot_spacing": false,
                "dot_spacing": 5.0,
                "dot_radius": 0.2,
                "num_placement": "hidden"
            }),
        },
    ]
}

/// Looks up a preset or theme by name, ignoring case.
pub fn find(name: &str) -> Result<Preset, AppError> {
    presets()
        .into_iter()
        .chain(themes())
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| AppError::PresetNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NumberPlacement, PageFormat};
    use crate::scaling::resolve;

    #[test]
    fn every_preset_parses_and_resolves_cleanly() {
        for preset in presets().iter().chain(themes().iter()) {
            let config = preset.configuration().unwrap_or_else(|e| panic!("{}: {}", preset.name, e));
            let resolved = resolve(&config);
            assert!(resolved.warnings.is_empty(), "{}: {:?}", preset.name, resolved.warnings);
        }
    }

    #[test]
    fn find_is_case_insensitive() {
        let preset = find("minimal").unwrap();
        let config = preset.configuration().unwrap();
        assert_eq!(config.page_format, PageFormat::A5);
        assert_eq!(config.num_placement, NumberPlacement::Hidden);
        assert_eq!(config.columns, 1);
    }

    #[test]
    fn unknown_preset() {
        assert!(matches!(find("Nope"), Err(AppError::PresetNotFound(_))));
    }
}
