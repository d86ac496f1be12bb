// todo-pdf: advance widths of the built-in PDF fonts

use serde::Serialize;

use crate::config::TitleFont;

/// Helvetica widths (1/1000 em) for ASCII 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold widths (1/1000 em) for ASCII 32..=126.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Courier and Courier-Bold are monospaced.
const COURIER_WIDTH: u16 = 600;

/// Width used for characters outside the tables.
const FALLBACK_WIDTH: u16 = 556;

/// Font faces the layout measures text in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Face {
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
}

impl From<TitleFont> for Face {
    fn from(font: TitleFont) -> Self {
        match font {
            TitleFont::Helvetica => Face::Helvetica,
            TitleFont::HelveticaBold => Face::HelveticaBold,
            TitleFont::Courier => Face::Courier,
            TitleFont::CourierBold => Face::CourierBold,
        }
    }
}

fn char_width(face: Face, c: char) -> u16 {
    let code = c as u32;
    if !(32..=126).contains(&code) {
        return match face {
            Face::Courier | Face::CourierBold => COURIER_WIDTH,
            _ => FALLBACK_WIDTH,
        };
    }
    let idx = (code - 32) as usize;
    match face {
        Face::Helvetica => HELVETICA[idx],
        Face::HelveticaBold => HELVETICA_BOLD[idx],
        Face::Courier | Face::CourierBold => COURIER_WIDTH,
    }
}

/// Width of `text` in points at `size_pt`.
pub fn text_width_pt(text: &str, face: Face, size_pt: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(face, c))).sum();
    units as f32 * size_pt / 1000.0
}

/// Width of `text` in millimeters at `size_pt`.
pub fn text_width_mm(text: &str, face: Face, size_pt: f32) -> f32 {
    pt_to_mm(text_width_pt(text, face, size_pt))
}

/// Height above the baseline reached by capitals, in mm.
pub fn ascent_mm(size_pt: f32) -> f32 {
    pt_to_mm(size_pt * 0.75)
}

/// Depth below the baseline reached by descenders, in mm.
pub fn descent_mm(size_pt: f32) -> f32 {
    pt_to_mm(size_pt * 0.22)
}

pub fn pt_to_mm(pt: f32) -> f32 {
    pt * 25.4 / 72.0
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_share_one_width() {
        let one = text_width_pt("1", Face::Helvetica, 10.0);
        let eight = text_width_pt("8", Face::Helvetica, 10.0);
        assert_eq!(one, eight);
        assert!((one - 5.56).abs() < 1e-4);
    }

    #[test]
    fn bold_is_wider_for_lowercase() {
        let regular = text_width_pt("Index", Face::Helvetica, 12.0);
        let bold = text_width_pt("Index", Face::HelveticaBold, 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn courier_is_monospaced() {
        assert_eq!(
            text_width_pt("iiii", Face::Courier, 10.0),
            text_width_pt("WWWW", Face::Courier, 10.0)
        );
    }

    #[test]
    fn unit_conversion() {
        assert!((pt_to_mm(72.0) - 25.4).abs() < 1e-4);
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-4);
    }
}
