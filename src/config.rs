// todo-pdf: the flat configuration record and its JSON form

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ============================================================================
// Enumerations
// ============================================================================

/// Named page formats. Custom sizes come from `custom_*` or `pixels_*` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageFormat {
    #[serde(alias = "A3 (297×420 mm)")]
    A3,
    #[serde(alias = "A4 (210×297 mm)")]
    A4,
    #[serde(alias = "A5 (148×210 mm)")]
    A5,
    #[serde(alias = "B4 (250×353 mm)")]
    B4,
    #[serde(alias = "B5 (176×250 mm)")]
    B5,
    #[serde(alias = "Letter (216×279 mm)")]
    Letter,
    #[serde(alias = "Legal (216×356 mm)")]
    Legal,
    #[serde(alias = "Tabloid (279×432 mm)")]
    Tabloid,
    Custom,
}

impl PageFormat {
    pub const ALL: [PageFormat; 9] = [
        PageFormat::A3,
        PageFormat::A4,
        PageFormat::A5,
        PageFormat::B4,
        PageFormat::B5,
        PageFormat::Letter,
        PageFormat::Legal,
        PageFormat::Tabloid,
        PageFormat::Custom,
    ];

    /// Portrait dimensions in mm, `None` for custom.
    pub fn dimensions_mm(self) -> Option<(f32, f32)> {
        match self {
            PageFormat::A3 => Some((297.0, 420.0)),
            PageFormat::A4 => Some((210.0, 297.0)),
            PageFormat::A5 => Some((148.0, 210.0)),
            PageFormat::B4 => Some((250.0, 353.0)),
            PageFormat::B5 => Some((176.0, 250.0)),
            PageFormat::Letter => Some((215.9, 279.4)),
            PageFormat::Legal => Some((215.9, 355.6)),
            PageFormat::Tabloid => Some((279.4, 431.8)),
            PageFormat::Custom => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PageFormat::A3 => "A3",
            PageFormat::A4 => "A4",
            PageFormat::A5 => "A5",
            PageFormat::B4 => "B4",
            PageFormat::B5 => "B5",
            PageFormat::Letter => "Letter",
            PageFormat::Legal => "Legal",
            PageFormat::Tabloid => "Tabloid",
            PageFormat::Custom => "Custom",
        }
    }
}

/// How a custom page size is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomMethod {
    #[serde(alias = "Millimeters", alias = "Direct measurements (mm)")]
    Millimeters,
    #[serde(alias = "Pixels + PPI (for e-readers)")]
    Pixels,
}

/// Where todo numbers are drawn relative to their row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberPlacement {
    #[serde(alias = "Outside (left/right)", alias = "Outside")]
    Outside,
    #[serde(alias = "Inside (left)")]
    InsideLeft,
    #[serde(alias = "Inside (right)")]
    InsideRight,
    #[serde(alias = "Hidden")]
    Hidden,
}

/// Output quality. Dot positions are snapped to this DPI's pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfQuality {
    #[serde(alias = "Standard (72 DPI)")]
    Standard,
    #[serde(alias = "High (150 DPI)")]
    High,
    #[serde(alias = "Print (300 DPI)")]
    Print,
    #[serde(alias = "Maximum (600 DPI)")]
    Maximum,
}

impl PdfQuality {
    pub const ALL: [PdfQuality; 4] = [
        PdfQuality::Standard,
        PdfQuality::High,
        PdfQuality::Print,
        PdfQuality::Maximum,
    ];

    /// Position in the quality dropdown of older saved files. Past the end means maximum.
    pub fn from_index(index: u32) -> Self {
        Self::ALL[(index as usize).min(Self::ALL.len() - 1)]
    }

    pub fn dpi(self) -> f32 {
        match self {
            PdfQuality::Standard => 72.0,
            PdfQuality::High => 150.0,
            PdfQuality::Print => 300.0,
            PdfQuality::Maximum => 600.0,
        }
    }
}

/// Built-in fonts available to the title page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleFont {
    Helvetica,
    #[serde(rename = "Helvetica-Bold")]
    HelveticaBold,
    Courier,
    #[serde(rename = "Courier-Bold")]
    CourierBold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleAlignment {
    #[serde(alias = "Left")]
    Left,
    #[serde(alias = "Center")]
    Center,
    #[serde(alias = "Right")]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitlePosition {
    #[serde(alias = "Top")]
    Top,
    #[serde(alias = "Center")]
    Center,
    #[serde(alias = "Golden Ratio")]
    GoldenRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleDecoration {
    #[serde(alias = "None")]
    None,
    #[serde(alias = "Simple Line")]
    SimpleLine,
    #[serde(alias = "Double Line")]
    DoubleLine,
    #[serde(alias = "Box")]
    Box,
}

// ============================================================================
// Configuration
// ============================================================================

/// Every tunable parameter of the planner. Missing JSON keys take defaults,
/// unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    // Page
    pub page_format: PageFormat,
    pub landscape: bool,
    pub custom_method: CustomMethod,
    pub custom_width: f32,
    pub custom_height: f32,
    #[serde(deserialize_with = "lenient_count")]
    pub pixels_width: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub pixels_height: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub ppi: u32,

    // Auto-scaling switches
    pub auto_margins: bool,
    pub auto_dot_spacing: bool,
    pub auto_items: bool,

    // Margins (mm)
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,

    // Dot grid
    pub dot_spacing: f32,
    pub dot_radius: f32,
    pub dot_color_intensity: f32,

    // Content structure
    #[serde(deserialize_with = "lenient_count")]
    pub items_per_col: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub columns: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub pages_of_todos: u32,
    #[serde(deserialize_with = "lenient_count")]
    pub detail_pages_per_todo: u32,

    // Font sizes (pt)
    pub font_size_header: f32,
    pub font_size_icon: f32,
    pub font_size_detail: f32,
    pub num_size: f32,

    // Colors
    pub color_line: String,
    pub color_text: String,
    pub num_color: f32,

    // Todo numbers
    pub num_placement: NumberPlacement,
    pub num_offset_x_left: f32,
    pub num_offset_x_right: f32,
    pub num_offset_y: f32,

    // Guide lines
    pub guide_lines_enabled: bool,
    pub guide_h_color: String,
    pub guide_v_color: String,
    pub guide_h_width: f32,
    pub guide_v_width: f32,

    // Title page
    pub title_page_enabled: bool,
    pub title_text: String,
    pub title_font: TitleFont,
    pub title_size: f32,
    pub title_color: String,
    pub title_description: String,
    pub desc_font: TitleFont,
    pub desc_size: f32,
    pub desc_color: String,
    pub title_alignment: TitleAlignment,
    pub title_position: TitlePosition,
    pub title_add_date: bool,
    pub title_decoration: TitleDecoration,

    // Output
    pub output_filename: String,
    pub pdf_quality: PdfQuality,
    /// Dropdown position written by older versions instead of `pdf_quality`.
    #[serde(skip_serializing)]
    pub pdf_quality_index: Option<u32>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            page_format: PageFormat::A4,
            landscape: false,
            custom_method: CustomMethod::Millimeters,
            custom_width: 210.0,
            custom_height: 297.0,
            pixels_width: 1404,
            pixels_height: 1872,
            ppi: 300,

            auto_margins: false,
            auto_dot_spacing: true,
            auto_items: false,

            margin_left: 8.0,
            margin_right: 8.0,
            margin_top: 18.0,
            margin_bottom: 8.0,

            dot_spacing: 7.0,
            dot_radius: 0.3,
            dot_color_intensity: 0.7,

            items_per_col: 20,
            columns: 2,
            pages_of_todos: 30,
            detail_pages_per_todo: 2,

            font_size_header: 14.0,
            font_size_icon: 13.0,
            font_size_detail: 12.0,
            num_size: 7.0,

            color_line: "#696969".to_string(),
            color_text: "#454545".to_string(),
            num_color: 0.85,

            num_placement: NumberPlacement::Outside,
            num_offset_x_left: 0.0,
            num_offset_x_right: 0.0,
            num_offset_y: -1.0,

            guide_lines_enabled: false,
            guide_h_color: "#E0E0E0".to_string(),
            guide_v_color: "#E0E0E0".to_string(),
            guide_h_width: 0.5,
            guide_v_width: 0.5,

            title_page_enabled: false,
            title_text: "My Todo List".to_string(),
            title_font: TitleFont::HelveticaBold,
            title_size: 48.0,
            title_color: "#000000".to_string(),
            title_description: String::new(),
            desc_font: TitleFont::Helvetica,
            desc_size: 18.0,
            desc_color: "#666666".to_string(),
            title_alignment: TitleAlignment::Center,
            title_position: TitlePosition::GoldenRatio,
            title_add_date: false,
            title_decoration: TitleDecoration::SimpleLine,

            output_filename: "todo-a4-custom.pdf".to_string(),
            pdf_quality: PdfQuality::High,
            pdf_quality_index: None,
        }
    }
}

impl Configuration {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::ConfigError(format!("Invalid JSON: {}", e)))
    }

    /// Builds a configuration from a JSON value, overlaying it on defaults.
    pub fn from_value(value: serde_json::Value) -> Result<Self, AppError> {
        serde_json::from_value(value).map_err(|e| AppError::ConfigError(format!("Invalid JSON: {}", e)))
    }

    pub fn to_json_pretty(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_col.saturating_mul(self.columns)
    }

    pub fn total_items(&self) -> u32 {
        self.pages_of_todos.saturating_mul(self.items_per_page())
    }

    pub fn detail_page_count(&self) -> u32 {
        self.total_items().saturating_mul(self.detail_pages_per_todo)
    }

    /// Title page (if any) + index + todo pages + detail pages.
    pub fn total_pages(&self) -> u32 {
        let title = u32::from(self.title_page_enabled);
        (title + 1)
            .saturating_add(self.pages_of_todos)
            .saturating_add(self.detail_page_count())
    }
}

/// Accepts any JSON number for a count. Fractions round, negatives become 0;
/// range checks happen when the configuration is resolved.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.round().clamp(0.0, u32::MAX as f64) as u32)
}

/// Parses `#RRGGBB` (or `RRGGBB`) into 0..1 RGB components.
pub fn parse_hex_color(hex: &str) -> Option<(f32, f32, f32)> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok().map(|v| v as f32 / 255.0);
    Some((channel(0)?, channel(2)?, channel(4)?))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_keys_take_defaults() {
        let config = Configuration::from_json(r#"{"columns": 1, "items_per_col": 15}"#).unwrap();
        assert_eq!(config.columns, 1);
        assert_eq!(config.items_per_col, 15);
        assert_eq!(config.margin_top, 18.0);
        assert_eq!(config.page_format, PageFormat::A4);
    }

    #[test]
    fn accepts_form_labels() {
        let json = r#"{
            "page_format": "Letter (216×279 mm)",
            "custom_method": "Pixels + PPI (for e-readers)",
            "num_placement": "Inside (left)",
            "title_position": "Golden Ratio",
            "title_decoration": "Double Line",
            "some_unknown_key": 42
        }"#;
        let config = Configuration::from_json(json).unwrap();
        assert_eq!(config.page_format, PageFormat::Letter);
        assert_eq!(config.custom_method, CustomMethod::Pixels);
        assert_eq!(config.num_placement, NumberPlacement::InsideLeft);
        assert_eq!(config.title_position, TitlePosition::GoldenRatio);
        assert_eq!(config.title_decoration, TitleDecoration::DoubleLine);
    }

    #[test]
    fn counts_accept_negative_and_fractional_numbers() {
        let config = Configuration::from_json(r#"{"columns": -1, "items_per_col": 12.5, "ppi": 226.4}"#).unwrap();
        assert_eq!(config.columns, 0);
        assert_eq!(config.items_per_col, 13);
        assert_eq!(config.ppi, 226);
        assert!(Configuration::from_json(r#"{"columns": "two"}"#).is_err());
    }

    #[test]
    fn quality_accepts_labels_and_legacy_index() {
        let config = Configuration::from_json(r#"{"pdf_quality": "Print (300 DPI)"}"#).unwrap();
        assert_eq!(config.pdf_quality, PdfQuality::Print);
        let config = Configuration::from_json(r#"{"pdf_quality": "Maximum (600 DPI)"}"#).unwrap();
        assert_eq!(config.pdf_quality, PdfQuality::Maximum);

        let legacy = Configuration::from_json(r#"{"pdf_quality_index": 0}"#).unwrap();
        assert_eq!(legacy.pdf_quality_index, Some(0));
        assert!(!legacy.to_json_pretty().unwrap().contains("pdf_quality_index"));
        assert_eq!(PdfQuality::from_index(0), PdfQuality::Standard);
        assert_eq!(PdfQuality::from_index(2), PdfQuality::Print);
        assert_eq!(PdfQuality::from_index(9), PdfQuality::Maximum);
    }

    #[test]
    fn json_round_trip_is_identical() {
        let config = Configuration {
            page_format: PageFormat::Custom,
            custom_method: CustomMethod::Pixels,
            pixels_width: 1872,
            pixels_height: 1404,
            ppi: 227,
            dot_spacing: 5.5,
            dot_radius: 0.35,
            num_offset_y: -2.5,
            title_text: "Week 42".to_string(),
            num_placement: NumberPlacement::InsideRight,
            pdf_quality: PdfQuality::Print,
            ..Configuration::default()
        };
        let json = config.to_json_pretty().unwrap();
        assert_eq!(Configuration::from_json(&json).unwrap(), config);
    }

    #[test]
    fn page_totals() {
        let config = Configuration {
            items_per_col: 20,
            columns: 2,
            pages_of_todos: 30,
            detail_pages_per_todo: 2,
            ..Configuration::default()
        };
        assert_eq!(config.total_items(), 1200);
        assert_eq!(config.detail_page_count(), 2400);
        assert_eq!(config.total_pages(), 2431);

        let with_title = Configuration { title_page_enabled: true, ..config };
        assert_eq!(with_title.total_pages(), 2432);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#000000"), Some((0.0, 0.0, 0.0)));
        assert_eq!(parse_hex_color("FFFFFF"), Some((1.0, 1.0, 1.0)));
        assert!(parse_hex_color("#12345").is_none());
        assert!(parse_hex_color("#GG0000").is_none());
    }
}
