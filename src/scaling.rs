// todo-pdf: page size resolution, auto-scaling and form-level validation

use serde::Serialize;

use crate::config::{parse_hex_color, Configuration, CustomMethod, PdfQuality};
use crate::metrics::pt_to_mm;

// ============================================================================
// Constants
// ============================================================================

/// Reference page for auto-scaling (A4 portrait, mm).
const REFERENCE_WIDTH_MM: f32 = 210.0;
const REFERENCE_HEIGHT_MM: f32 = 297.0;

/// A4 margins the auto-scaled margins derive from.
const BASE_MARGIN_SIDE_MM: f32 = 8.0;
const BASE_MARGIN_TOP_MM: f32 = 18.0;
const BASE_MARGIN_BOTTOM_MM: f32 = 8.0;

/// A4 dot spacing the auto-scaled spacing derives from.
const BASE_DOT_SPACING_MM: f32 = 7.0;

/// Header allowance and per-item height used by auto items-per-column.
const AUTO_ITEMS_HEADER_MM: f32 = 30.0;
const AUTO_ITEMS_ROW_MM: f32 = 12.0;

/// Smallest page side, whatever the format or pixel density.
const MIN_PAGE_MM: f32 = 50.0;

/// Smallest usable area left between margins.
const MIN_USABLE_MM: f32 = 40.0;

/// Vertical space reserved above the first todo row.
pub const TODO_HEADER_RESERVE_MM: f32 = 12.0;

// ============================================================================
// Data Structures
// ============================================================================

/// A parameter that was adjusted during validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub field: &'static str,
    pub message: String,
}

/// A configuration with auto-scaling applied and every value inside its
/// supported range, plus the effective page size.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub settings: Configuration,
    pub warnings: Vec<Warning>,
}

// ============================================================================
// Page Size
// ============================================================================

/// Effective page size in mm, orientation applied.
pub fn page_size_mm(config: &Configuration) -> (f32, f32) {
    let (w, h) = match config.page_format.dimensions_mm() {
        Some(dims) => dims,
        None => match config.custom_method {
            CustomMethod::Millimeters => (config.custom_width, config.custom_height),
            CustomMethod::Pixels => (
                pixels_to_mm(config.pixels_width, config.ppi),
                pixels_to_mm(config.pixels_height, config.ppi),
            ),
        },
    };
    if config.landscape {
        (h, w)
    } else {
        (w, h)
    }
}

pub fn pixels_to_mm(pixels: u32, ppi: u32) -> f32 {
    if ppi == 0 {
        return 0.0;
    }
    pixels as f32 / ppi as f32 * 25.4
}

// ============================================================================
// Auto-Scaling
// ============================================================================

/// Scale factor of a page relative to A4.
pub fn scale_factor(page_width: f32, page_height: f32) -> f32 {
    (page_width / REFERENCE_WIDTH_MM).min(page_height / REFERENCE_HEIGHT_MM)
}

/// Suggested (left/right, top, bottom) margins for a page size.
pub fn auto_margins(page_width: f32, page_height: f32) -> (f32, f32, f32) {
    let s = scale_factor(page_width, page_height);
    (
        (BASE_MARGIN_SIDE_MM * s).round().max(3.0),
        (BASE_MARGIN_TOP_MM * s).round().max(5.0),
        (BASE_MARGIN_BOTTOM_MM * s).round().max(3.0),
    )
}

/// Suggested dot spacing, rounded to 0.1 mm and kept within 3..=15 mm.
pub fn auto_dot_spacing(page_width: f32, page_height: f32) -> f32 {
    let s = scale_factor(page_width, page_height);
    let spacing = (BASE_DOT_SPACING_MM * s * 10.0).round() / 10.0;
    spacing.clamp(3.0, 15.0)
}

/// Suggested items per column for the height left between the margins.
pub fn auto_items_per_col(page_height: f32, margin_top: f32, margin_bottom: f32) -> u32 {
    let available = page_height - margin_top - margin_bottom - AUTO_ITEMS_HEADER_MM;
    let items = (available / AUTO_ITEMS_ROW_MM).floor();
    items.clamp(10.0, 30.0) as u32
}

// ============================================================================
// Validation
// ============================================================================

fn clamp_f32(value: &mut f32, lo: f32, hi: f32, field: &'static str, warnings: &mut Vec<Warning>) {
    if !value.is_finite() {
        warnings.push(Warning { field, message: format!("{} is not a number, using {}", field, lo) });
        *value = lo;
    } else if *value < lo || *value > hi {
        let clamped = value.clamp(lo, hi);
        warnings.push(Warning {
            field,
            message: format!("{} {} is outside {}..{}, using {}", field, value, lo, hi, clamped),
        });
        *value = clamped;
    }
}

fn clamp_u32(value: &mut u32, lo: u32, hi: u32, field: &'static str, warnings: &mut Vec<Warning>) {
    if *value < lo || *value > hi {
        let clamped = (*value).clamp(lo, hi);
        warnings.push(Warning {
            field,
            message: format!("{} {} is outside {}..{}, using {}", field, value, lo, hi, clamped),
        });
        *value = clamped;
    }
}

/// Pixel sizes at high densities can describe pages too small to lay out.
fn floor_page_side(value: &mut f32, field: &'static str, warnings: &mut Vec<Warning>) {
    if !(*value >= MIN_PAGE_MM) {
        warnings.push(Warning {
            field,
            message: format!("{} {:.1} mm is below {} mm, using {} mm", field, value, MIN_PAGE_MM, MIN_PAGE_MM),
        });
        *value = MIN_PAGE_MM;
    }
}

fn check_color(value: &mut String, fallback: &str, field: &'static str, warnings: &mut Vec<Warning>) {
    if parse_hex_color(value).is_none() {
        warnings.push(Warning {
            field,
            message: format!("{} '{}' is not a #RRGGBB color, using {}", field, value, fallback),
        });
        *value = fallback.to_string();
    }
}

/// Shrinks a margin pair proportionally so at least `MIN_USABLE_MM` remains.
fn fit_margins(
    extent: f32,
    first: &mut f32,
    second: &mut f32,
    field: &'static str,
    warnings: &mut Vec<Warning>,
) {
    let total = *first + *second;
    if extent - total >= MIN_USABLE_MM || total <= 0.0 {
        return;
    }
    let factor = ((extent - MIN_USABLE_MM) / total).max(0.0);
    *first *= factor;
    *second *= factor;
    warnings.push(Warning {
        field,
        message: format!("margins leave less than {} mm of usable space, reduced", MIN_USABLE_MM),
    });
}

/// Applies auto-scaling and clamps every parameter into its supported range.
pub fn resolve(config: &Configuration) -> ResolvedLayout {
    let mut s = config.clone();
    let mut warnings = Vec::new();

    if s.page_format.dimensions_mm().is_none() {
        match s.custom_method {
            CustomMethod::Millimeters => {
                clamp_f32(&mut s.custom_width, 50.0, 500.0, "custom_width", &mut warnings);
                clamp_f32(&mut s.custom_height, 50.0, 700.0, "custom_height", &mut warnings);
            }
            CustomMethod::Pixels => {
                clamp_u32(&mut s.pixels_width, 100, 5000, "pixels_width", &mut warnings);
                clamp_u32(&mut s.pixels_height, 100, 5000, "pixels_height", &mut warnings);
                clamp_u32(&mut s.ppi, 50, 600, "ppi", &mut warnings);
            }
        }
    }
    let (mut page_width, mut page_height) = page_size_mm(&s);
    floor_page_side(&mut page_width, "page_width", &mut warnings);
    floor_page_side(&mut page_height, "page_height", &mut warnings);

    if s.auto_margins {
        let (side, top, bottom) = auto_margins(page_width, page_height);
        s.margin_left = side;
        s.margin_right = side;
        s.margin_top = top;
        s.margin_bottom = bottom;
    } else {
        clamp_f32(&mut s.margin_left, 2.0, 30.0, "margin_left", &mut warnings);
        clamp_f32(&mut s.margin_right, 2.0, 30.0, "margin_right", &mut warnings);
        clamp_f32(&mut s.margin_top, 5.0, 40.0, "margin_top", &mut warnings);
        clamp_f32(&mut s.margin_bottom, 2.0, 30.0, "margin_bottom", &mut warnings);
    }
    fit_margins(page_width, &mut s.margin_left, &mut s.margin_right, "margin_left", &mut warnings);
    fit_margins(page_height, &mut s.margin_top, &mut s.margin_bottom, "margin_top", &mut warnings);

    if s.auto_dot_spacing {
        s.dot_spacing = auto_dot_spacing(page_width, page_height);
    } else {
        clamp_f32(&mut s.dot_spacing, 3.0, 15.0, "dot_spacing", &mut warnings);
    }
    clamp_f32(&mut s.dot_radius, 0.1, 1.0, "dot_radius", &mut warnings);
    clamp_f32(&mut s.dot_color_intensity, 0.3, 0.9, "dot_color_intensity", &mut warnings);

    if s.auto_items {
        s.items_per_col = auto_items_per_col(page_height, s.margin_top, s.margin_bottom);
    } else {
        clamp_u32(&mut s.items_per_col, 5, 40, "items_per_col", &mut warnings);
    }
    clamp_u32(&mut s.columns, 1, 3, "columns", &mut warnings);
    clamp_u32(&mut s.pages_of_todos, 1, 100, "pages_of_todos", &mut warnings);
    clamp_u32(&mut s.detail_pages_per_todo, 1, 5, "detail_pages_per_todo", &mut warnings);

    clamp_f32(&mut s.font_size_header, 10.0, 20.0, "font_size_header", &mut warnings);
    clamp_f32(&mut s.font_size_icon, 10.0, 18.0, "font_size_icon", &mut warnings);
    clamp_f32(&mut s.font_size_detail, 10.0, 16.0, "font_size_detail", &mut warnings);
    clamp_f32(&mut s.num_size, 5.0, 12.0, "num_size", &mut warnings);

    // Rows must stay taller than the chevron so link boxes do not collide.
    let inner_height = page_height - s.margin_top - s.margin_bottom - TODO_HEADER_RESERVE_MM;
    let min_row_gap = pt_to_mm(s.font_size_icon).max(4.0);
    let max_rows = ((inner_height / min_row_gap).floor() as u32).max(1);
    if s.items_per_col > max_rows {
        warnings.push(Warning {
            field: "items_per_col",
            message: format!(
                "{} items do not fit in {:.0} mm, reduced to {}",
                s.items_per_col, inner_height, max_rows
            ),
        });
        s.items_per_col = max_rows;
    }

    check_color(&mut s.color_line, "#696969", "color_line", &mut warnings);
    check_color(&mut s.color_text, "#454545", "color_text", &mut warnings);
    clamp_f32(&mut s.num_color, 0.3, 1.0, "num_color", &mut warnings);
    clamp_f32(&mut s.num_offset_x_left, -10.0, 10.0, "num_offset_x_left", &mut warnings);
    clamp_f32(&mut s.num_offset_x_right, -10.0, 10.0, "num_offset_x_right", &mut warnings);
    clamp_f32(&mut s.num_offset_y, -5.0, 5.0, "num_offset_y", &mut warnings);

    check_color(&mut s.guide_h_color, "#E0E0E0", "guide_h_color", &mut warnings);
    check_color(&mut s.guide_v_color, "#E0E0E0", "guide_v_color", &mut warnings);
    clamp_f32(&mut s.guide_h_width, 0.1, 3.0, "guide_h_width", &mut warnings);
    clamp_f32(&mut s.guide_v_width, 0.1, 3.0, "guide_v_width", &mut warnings);

    clamp_f32(&mut s.title_size, 12.0, 96.0, "title_size", &mut warnings);
    clamp_f32(&mut s.desc_size, 8.0, 48.0, "desc_size", &mut warnings);
    check_color(&mut s.title_color, "#000000", "title_color", &mut warnings);
    check_color(&mut s.desc_color, "#666666", "desc_color", &mut warnings);

    if let Some(index) = s.pdf_quality_index.take() {
        s.pdf_quality = PdfQuality::from_index(index);
        if index as usize >= PdfQuality::ALL.len() {
            warnings.push(Warning {
                field: "pdf_quality_index",
                message: format!("pdf_quality_index {} is outside 0..3, using {:?}", index, s.pdf_quality),
            });
        }
    }

    for warning in &warnings {
        log::warn!("{}", warning.message);
    }

    ResolvedLayout {
        page_width,
        page_height,
        settings: s,
        warnings,
    }
}

// ============================================================================
// Tests
// ============================================================================
