// todo-pdf: page plan and absolute coordinates for every drawn primitive
//
// Coordinates are millimeters from the bottom-left corner of the page, the
// same convention printpdf uses. Every primitive is kept inside the page.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::config::{
    parse_hex_color, Configuration, NumberPlacement, TitleAlignment, TitleDecoration, TitlePosition,
};
use crate::metrics::{ascent_mm, descent_mm, pt_to_mm, text_width_mm, Face};
use crate::scaling::{ResolvedLayout, TODO_HEADER_RESERVE_MM};

// ============================================================================
// Constants
// ============================================================================

/// Gap kept between any primitive and the page edge.
const EDGE_MM: f32 = 0.5;

/// Header baselines sit this far above the top margin (15 pt).
const HEADER_RAISE_MM: f32 = 5.292;

/// First todo row sits this far below the top margin (30 pt).
const FIRST_ROW_DROP_MM: f32 = 10.583;

/// Index entries start this far below the top margin (40 pt).
const INDEX_TOP_DROP_MM: f32 = 14.111;

/// Index layout: two columns, spacing tuned for eight entries in half the height.
const INDEX_COLUMNS: u32 = 2;
const INDEX_BASE_ROWS: u32 = 16;
const INDEX_FONT_SIZE: f32 = 12.0;

const RULE_WIDTH_PT: f32 = 0.5;
const FOOTER_FONT_SIZE: f32 = 10.0;
const PREVIEW_NOTE_FONT_SIZE: f32 = 8.0;
const DATE_FONT_SIZE: f32 = 12.0;

/// Title baseline for the golden-ratio position, as a fraction from the top.
const GOLDEN_SECTION: f32 = 0.382;

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub fn gray(level: f32) -> Self {
        Self { r: level, g: level, b: level }
    }

    pub fn from_hex(hex: &str) -> Self {
        let (r, g, b) = parse_hex_color(hex).unwrap_or((0.0, 0.0, 0.0));
        Self { r, g, b }
    }
}

/// Axis-aligned box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl Bounds {
    pub fn within(&self, width: f32, height: f32) -> bool {
        const EPS: f32 = 1e-3;
        self.x_min >= -EPS && self.y_min >= -EPS && self.x_max <= width + EPS && self.y_max <= height + EPS
    }
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        face: Face,
        color: Color,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width_pt: f32,
        color: Color,
        dashed: bool,
    },
    /// Clickable area jumping to the page with the given 0-based index.
    Link { rect: Bounds, target: usize },
}

impl Element {
    pub fn bounds(&self) -> Bounds {
        match self {
            Element::Text { text, x, y, size, face, .. } => Bounds {
                x_min: *x,
                y_min: *y - descent_mm(*size),
                x_max: *x + text_width_mm(text, *face, *size),
                y_max: *y + ascent_mm(*size),
            },
            Element::Line { x1, y1, x2, y2, .. } => Bounds {
                x_min: x1.min(*x2),
                y_min: y1.min(*y2),
                x_max: x1.max(*x2),
                y_max: y1.max(*y2),
            },
            Element::Link { rect, .. } => *rect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageKind {
    Title,
    Index,
    Todo { page: u32 },
    Detail { item: u32, part: u32 },
    Preview,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub kind: PageKind,
    pub elements: Vec<Element>,
    /// Whether the shared dot grid is drawn under this page's content.
    pub dot_grid: bool,
    pub bookmark: Option<String>,
}

/// The dot pattern shared by every detail page.
#[derive(Debug, Clone, Serialize)]
pub struct DotGrid {
    pub dots: Vec<(f32, f32)>,
    pub radius: f32,
    pub color: Color,
}

impl DotGrid {
    pub fn bounds(&self) -> impl Iterator<Item = Bounds> + '_ {
        self.dots.iter().map(move |&(x, y)| Bounds {
            x_min: x - self.radius,
            y_min: y - self.radius,
            x_max: x + self.radius,
            y_max: y + self.radius,
        })
    }
}

/// Everything the renderer needs, fully positioned.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentPlan {
    pub title: String,
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<Page>,
    pub dot_grid: DotGrid,
}

impl DocumentPlan {
    /// Bounds of every primitive on a page, dots included.
    pub fn page_bounds<'a>(&'a self, page: &'a Page) -> Box<dyn Iterator<Item = Bounds> + 'a> {
        let elements = page.elements.iter().map(Element::bounds);
        if page.dot_grid {
            Box::new(elements.chain(self.dot_grid.bounds()))
        } else {
            Box::new(elements)
        }
    }
}

// ============================================================================
// Page Numbering
// ============================================================================

/// 0-based page indices of every page in the document.
#[derive(Debug, Clone, Copy)]
pub struct PageNumbering {
    has_title: bool,
    pages_of_todos: u32,
    items_per_page: u32,
    detail_per_todo: u32,
}

impl PageNumbering {
    pub fn new(settings: &Configuration) -> Self {
        Self {
            has_title: settings.title_page_enabled,
            pages_of_todos: settings.pages_of_todos,
            items_per_page: settings.items_per_page(),
            detail_per_todo: settings.detail_pages_per_todo,
        }
    }

    pub fn title(&self) -> Option<usize> {
        self.has_title.then_some(0)
    }

    pub fn index(&self) -> usize {
        usize::from(self.has_title)
    }

    /// Todo page `page` (1-based).
    pub fn todo(&self, page: u32) -> usize {
        self.index() + page as usize
    }

    /// Detail page `part` (1-based) of global item `item` (1-based).
    pub fn detail(&self, item: u32, part: u32) -> usize {
        self.index()
            + 1
            + self.pages_of_todos as usize
            + (item as usize - 1) * self.detail_per_todo as usize
            + (part as usize - 1)
    }

    pub fn total(&self) -> usize {
        self.index()
            + 1
            + self.pages_of_todos as usize
            + (self.pages_of_todos * self.items_per_page * self.detail_per_todo) as usize
    }
}

// ============================================================================
// Page Frame
// ============================================================================

/// Places primitives on a page, pulling anything that would cross the edge
/// back inside.
struct Frame {
    width: f32,
    height: f32,
    elements: Vec<Element>,
}

impl Frame {
    fn new(width: f32, height: f32) -> Self {
        Self { width, height, elements: Vec::new() }
    }

    fn text(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32, face: Face, color: Color) -> Bounds {
        let text = text.into();
        let room = self.width - 2.0 * EDGE_MM;
        let mut size = size;
        let mut width = text_width_mm(&text, face, size);
        if width > room && width > 0.0 {
            size *= room / width;
            width = text_width_mm(&text, face, size);
        }
        let x = x.min(self.width - width - EDGE_MM).max(EDGE_MM);
        let y = y
            .min(self.height - ascent_mm(size) - EDGE_MM)
            .max(descent_mm(size) + EDGE_MM);
        let element = Element::Text { text, x, y, size, face, color };
        let bounds = element.bounds();
        self.elements.push(element);
        bounds
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width_pt: f32, color: Color) {
        self.push_line(x1, y1, x2, y2, width_pt, color, false);
    }

    fn dashed(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width_pt: f32, color: Color) {
        self.push_line(x1, y1, x2, y2, width_pt, color, true);
    }

    #[allow(clippy::too_many_arguments)]
    fn push_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width_pt: f32, color: Color, dashed: bool) {
        let (w, h) = (self.width, self.height);
        let cx = |x: f32| x.clamp(0.0, w);
        let cy = |y: f32| y.clamp(0.0, h);
        self.elements.push(Element::Line {
            x1: cx(x1),
            y1: cy(y1),
            x2: cx(x2),
            y2: cy(y2),
            width_pt,
            color,
            dashed,
        });
    }

    fn link(&mut self, x_min: f32, y_min: f32, x_max: f32, y_max: f32, target: usize) {
        let rect = Bounds {
            x_min: x_min.clamp(0.0, self.width),
            y_min: y_min.clamp(0.0, self.height),
            x_max: x_max.clamp(0.0, self.width),
            y_max: y_max.clamp(0.0, self.height),
        };
        if rect.x_max > rect.x_min && rect.y_max > rect.y_min {
            self.elements.push(Element::Link { rect, target });
        }
    }

    fn into_page(self, kind: PageKind, dot_grid: bool, bookmark: Option<String>) -> Page {
        Page { kind, elements: self.elements, dot_grid, bookmark }
    }
}

// ============================================================================
// Plan Construction
// ============================================================================

/// Lays out the full document, dating the title page today.
pub fn build_plan(resolved: &ResolvedLayout) -> DocumentPlan {
    build_plan_on(resolved, Local::now().date_naive())
}

/// Lays out the full document, dating the title page `today`.
pub fn build_plan_on(resolved: &ResolvedLayout, today: NaiveDate) -> DocumentPlan {
    let s = &resolved.settings;
    let numbering = PageNumbering::new(s);
    let mut pages = Vec::with_capacity(numbering.total());

    if s.title_page_enabled {
        pages.push(title_page(resolved, today));
    }
    pages.push(index_page(resolved, &numbering));
    for page in 1..=s.pages_of_todos {
        pages.push(todo_page(resolved, &numbering, page, true));
    }
    for item in 1..=s.total_items() {
        for part in 1..=s.detail_pages_per_todo {
            pages.push(detail_page(resolved, &numbering, item, part));
        }
    }
    debug_assert_eq!(pages.len(), numbering.total());
    log::debug!("planned {} pages", pages.len());

    DocumentPlan {
        title: document_title(s),
        page_width: resolved.page_width,
        page_height: resolved.page_height,
        pages,
        dot_grid: dot_grid(resolved),
    }
}

/// A single todo page with margin guides and a summary line.
pub fn build_preview(resolved: &ResolvedLayout) -> DocumentPlan {
    let s = &resolved.settings;
    let numbering = PageNumbering::new(s);
    let (w, h) = (resolved.page_width, resolved.page_height);

    let mut page = todo_page(resolved, &numbering, 1, false);
    page.kind = PageKind::Preview;

    let mut frame = Frame::new(w, h);
    let guide = Color::gray(0.9);
    frame.dashed(s.margin_left, 0.0, s.margin_left, h, RULE_WIDTH_PT, guide);
    frame.dashed(w - s.margin_right, 0.0, w - s.margin_right, h, RULE_WIDTH_PT, guide);
    frame.dashed(0.0, h - s.margin_top, w, h - s.margin_top, RULE_WIDTH_PT, guide);
    frame.dashed(0.0, s.margin_bottom, w, s.margin_bottom, RULE_WIDTH_PT, guide);
    frame.text(
        format!(
            "Preview: Todo page 1/{} | {} items x {} cols | Total: {} pages",
            s.pages_of_todos,
            s.items_per_col,
            s.columns,
            s.total_pages()
        ),
        s.margin_left,
        s.margin_bottom + pt_to_mm(10.0),
        PREVIEW_NOTE_FONT_SIZE,
        Face::Helvetica,
        Color::gray(0.6),
    );

    // Guides go underneath the page content.
    frame.elements.append(&mut page.elements);
    page.elements = frame.elements;

    DocumentPlan {
        title: document_title(s),
        page_width: w,
        page_height: h,
        pages: vec![page],
        dot_grid: DotGrid { dots: Vec::new(), radius: s.dot_radius, color: Color::gray(s.dot_color_intensity) },
    }
}

fn document_title(s: &Configuration) -> String {
    if s.title_page_enabled && !s.title_text.trim().is_empty() {
        s.title_text.clone()
    } else {
        format!("Todo Planner - {} pages", s.pages_of_todos)
    }
}

/// Baseline for a header line raised `raise` above the top margin.
fn header_baseline(page_height: f32, margin_top: f32, raise: f32) -> f32 {
    page_height - margin_top + raise
}

// ============================================================================
// Dot Grid
// ============================================================================

fn dot_grid(resolved: &ResolvedLayout) -> DotGrid {
    let s = &resolved.settings;
    let (w, h) = (resolved.page_width, resolved.page_height);
    let pixel = 25.4 / s.pdf_quality.dpi();
    let snap = |v: f32| (v / pixel).round() * pixel;
    let r = s.dot_radius;

    let x_start = s.margin_left;
    let x_end = w - s.margin_right;
    let y_start = s.margin_bottom;
    let y_end = h - s.margin_top;
    let steps = |from: f32, to: f32| {
        if to < from {
            0
        } else {
            ((to - from) / s.dot_spacing + 1e-4).floor() as u32 + 1
        }
    };
    let nx = steps(x_start, x_end);
    let ny = steps(y_start, y_end);

    let mut dots = Vec::with_capacity((nx * ny) as usize);
    for i in 0..nx {
        let x = snap(x_start + i as f32 * s.dot_spacing);
        if x - r < 0.0 || x + r > w {
            continue;
        }
        for j in 0..ny {
            let y = snap(y_start + j as f32 * s.dot_spacing);
            if y - r < 0.0 || y + r > h {
                continue;
            }
            dots.push((x, y));
        }
    }
    log::debug!("dot grid: {} dots ({}x{})", dots.len(), nx, ny);

    DotGrid { dots, radius: r, color: Color::gray(s.dot_color_intensity) }
}

// ============================================================================
// Index Page
// ============================================================================

fn index_page(resolved: &ResolvedLayout, numbering: &PageNumbering) -> Page {
    let s = &resolved.settings;
    let (w, h) = (resolved.page_width, resolved.page_height);
    let mut frame = Frame::new(w, h);
    let text_color = Color::from_hex(&s.color_text);
    let line_color = Color::from_hex(&s.color_line);

    frame.text(
        "Index",
        s.margin_left,
        header_baseline(h, s.margin_top, HEADER_RAISE_MM),
        s.font_size_header + 2.0,
        Face::HelveticaBold,
        text_color,
    );

    let usable_width = w - s.margin_left - s.margin_right;
    let col_width = usable_width / INDEX_COLUMNS as f32;
    let y_top = h - s.margin_top - INDEX_TOP_DROP_MM;
    let full_height = y_top - s.margin_bottom;
    let rows = s.pages_of_todos.div_ceil(INDEX_COLUMNS);
    let line_height = full_height / rows.max(INDEX_BASE_ROWS) as f32;

    for col in 0..INDEX_COLUMNS {
        let x = s.margin_left + col as f32 * col_width;
        let mut y = y_top;
        for i in 0..rows {
            let page_num = col * rows + i + 1;
            if page_num > s.pages_of_todos {
                break;
            }
            let label = format!("P{}", page_num);
            let text = frame.text(label, x, y, INDEX_FONT_SIZE, Face::Helvetica, line_color);

            let rule_start = text.x_max + 3.0;
            let rule_end = x + col_width - 10.0;
            if rule_end > rule_start {
                frame.line(rule_start, y, rule_end, y, RULE_WIDTH_PT, line_color);
            }
            frame.link(
                x,
                y - pt_to_mm(3.0),
                rule_end.max(text.x_max),
                y + pt_to_mm(12.0),
                numbering.todo(page_num),
            );
            y -= line_height;
        }
    }

    frame.into_page(PageKind::Index, false, Some("Index".to_string()))
}

// ============================================================================
// Todo Pages
// ============================================================================

fn todo_page(resolved: &ResolvedLayout, numbering: &PageNumbering, page: u32, with_links: bool) -> Page {
    let s = &resolved.settings;
    let (w, h) = (resolved.page_width, resolved.page_height);
    let mut frame = Frame::new(w, h);
    let text_color = Color::from_hex(&s.color_text);
    let line_color = Color::from_hex(&s.color_line);
    let icon_color = Color::from_hex("#555555");
    let num_color = Color::gray(s.num_color);

    // Right-aligned "Page N" header, a link back to the index.
    let header = format!("Page {}", page);
    let header_width = text_width_mm(&header, Face::HelveticaBold, s.font_size_header);
    let header_y = header_baseline(h, s.margin_top, HEADER_RAISE_MM);
    let header_box = frame.text(
        header,
        w - s.margin_right - header_width,
        header_y,
        s.font_size_header,
        Face::HelveticaBold,
        text_color,
    );
    if with_links {
        frame.link(
            header_box.x_min,
            header_box.y_min - pt_to_mm(3.0),
            header_box.x_max,
            header_box.y_max + pt_to_mm(3.0),
            numbering.index(),
        );
    }

    let usable_width = w - s.margin_left - s.margin_right;
    let col_width = usable_width / s.columns as f32;
    let inner_height = h - s.margin_top - s.margin_bottom - TODO_HEADER_RESERVE_MM;
    let line_gap = inner_height / s.items_per_col as f32;
    let top_y = h - s.margin_top - FIRST_ROW_DROP_MM;
    let items_per_page = s.items_per_page();

    if s.guide_lines_enabled {
        draw_guides(&mut frame, s, col_width, top_y, line_gap);
    }

    for col in 0..s.columns {
        let x0 = s.margin_left + col as f32 * col_width;
        let mut y = top_y;
        for i in 0..s.items_per_col {
            let number = col * s.items_per_col + i + 1;
            let item = (page - 1) * items_per_page + number;

            if let Some(num_x) = number_x(s, w, col, x0, col_width, number) {
                frame.text(
                    number.to_string(),
                    num_x,
                    y + s.num_offset_y,
                    s.num_size,
                    Face::Helvetica,
                    num_color,
                );
            }

            frame.line(x0, y, x0 + col_width - 16.0, y, RULE_WIDTH_PT, line_color);

            let box_x1 = x0 + col_width - 14.0;
            let box_x2 = box_x1 + 10.0;
            let icon_x = (box_x1 + box_x2) / 2.0 - 1.6 - pt_to_mm(2.0);
            let icon_y = y - 2.0 + pt_to_mm(6.0);
            frame.text(">", icon_x, icon_y, s.font_size_icon, Face::HelveticaBold, icon_color);

            if with_links {
                frame.link(box_x1, y - 2.8, box_x2, y + 2.8, numbering.detail(item, 1));
            }
            y -= line_gap;
        }
    }

    let bookmark = with_links.then(|| format!("Page {}", page));
    frame.into_page(PageKind::Todo { page }, false, bookmark)
}

/// Left edge of a todo number, `None` when numbers are hidden.
fn number_x(s: &Configuration, page_width: f32, col: u32, x0: f32, col_width: f32, number: u32) -> Option<f32> {
    let width = text_width_mm(&number.to_string(), Face::Helvetica, s.num_size);
    let offset = if col == 0 { s.num_offset_x_left } else { s.num_offset_x_right };
    let inside_left = x0 + 2.0 + offset;
    match s.num_placement {
        NumberPlacement::Hidden => None,
        NumberPlacement::Outside if col == 0 => Some(s.margin_left - 3.0 - width + s.num_offset_x_left),
        NumberPlacement::Outside if col + 1 == s.columns => {
            Some(page_width - s.margin_right + 1.0 + s.num_offset_x_right)
        }
        // Middle columns have no margin of their own.
        NumberPlacement::Outside => Some(inside_left),
        NumberPlacement::InsideLeft => Some(inside_left),
        NumberPlacement::InsideRight => Some(x0 + col_width - 20.0 - width + offset),
    }
}

fn draw_guides(frame: &mut Frame, s: &Configuration, col_width: f32, top_y: f32, line_gap: f32) {
    let h_color = Color::from_hex(&s.guide_h_color);
    let v_color = Color::from_hex(&s.guide_v_color);
    let left = s.margin_left;
    let right = left + col_width * s.columns as f32;
    let top = top_y + line_gap / 2.0;
    let bottom = top_y - (s.items_per_col as f32 - 0.5) * line_gap;

    for i in 0..s.items_per_col {
        let y = top_y - (i as f32 + 0.5) * line_gap;
        frame.line(left, y, right, y, s.guide_h_width, h_color);
    }
    for c in 0..=s.columns {
        let x = left + c as f32 * col_width;
        frame.line(x, top, x, bottom, s.guide_v_width, v_color);
    }
}

// ============================================================================
// Detail Pages
// ============================================================================

fn detail_page(resolved: &ResolvedLayout, numbering: &PageNumbering, item: u32, part: u32) -> Page {
    let s = &resolved.settings;
    let (w, h) = (resolved.page_width, resolved.page_height);
    let mut frame = Frame::new(w, h);
    let per_page = s.items_per_page();
    let page = (item - 1) / per_page + 1;
    let position = (item - 1) % per_page + 1;
    let parts = s.detail_pages_per_todo;

    let header_color = Color::gray(0.6);
    let size = s.font_size_detail;
    let raise = (h * 0.034).clamp(5.0, 15.0);
    let y = header_baseline(h, s.margin_top, raise);

    let arrow = frame.text("<", s.margin_left - 4.0, y, size, Face::HelveticaBold, header_color);
    let header = frame.text(
        format!("Details - Page {} - #{} - {}/{}", page, position, part, parts),
        s.margin_left,
        y,
        size,
        Face::HelveticaBold,
        header_color,
    );
    frame.link(
        arrow.x_min,
        header.y_min - pt_to_mm(3.0),
        header.x_max,
        header.y_max + pt_to_mm(3.0),
        numbering.todo(page),
    );

    let index_width = text_width_mm("Index", Face::HelveticaBold, size);
    let index = frame.text(
        "Index",
        w - s.margin_right - index_width,
        y,
        size,
        Face::HelveticaBold,
        header_color,
    );
    frame.link(
        index.x_min,
        index.y_min - pt_to_mm(3.0),
        index.x_max,
        index.y_max + pt_to_mm(3.0),
        numbering.index(),
    );

    let footer_color = Color::gray(0.5);
    let footer_y = s.margin_bottom - pt_to_mm(12.0);
    if part < parts {
        let label = "Next >";
        let width = text_width_mm(label, Face::Helvetica, FOOTER_FONT_SIZE);
        let next = frame.text(
            label,
            w - s.margin_right - width,
            footer_y,
            FOOTER_FONT_SIZE,
            Face::Helvetica,
            footer_color,
        );
        frame.link(
            next.x_min,
            next.y_min - pt_to_mm(1.0),
            next.x_max,
            next.y_max + pt_to_mm(2.0),
            numbering.detail(item, part + 1),
        );
    }
    if part > 1 {
        let prev = frame.text(
            "< Prev",
            s.margin_left,
            footer_y,
            FOOTER_FONT_SIZE,
            Face::Helvetica,
            footer_color,
        );
        frame.link(
            prev.x_min,
            prev.y_min - pt_to_mm(1.0),
            prev.x_max,
            prev.y_max + pt_to_mm(2.0),
            numbering.detail(item, part - 1),
        );
    }

    frame.into_page(PageKind::Detail { item, part }, true, None)
}

// ============================================================================
// Title Page
// ============================================================================

fn title_page(resolved: &ResolvedLayout, today: NaiveDate) -> Page {
    let s = &resolved.settings;
    let (w, h) = (resolved.page_width, resolved.page_height);
    let mut frame = Frame::new(w, h);
    let usable_width = w - s.margin_left - s.margin_right;

    let title_face = Face::from(s.title_font);
    let desc_face = Face::from(s.desc_font);
    let title_color = Color::from_hex(&s.title_color);
    let desc_color = Color::from_hex(&s.desc_color);

    // Shrink long titles until they fit between the margins.
    let title_size = fit_size(&s.title_text, title_face, s.title_size, usable_width);
    let desc_size = fit_size(&s.title_description, desc_face, s.desc_size, usable_width);

    let title_baseline = match s.title_position {
        TitlePosition::Top => h - s.margin_top - ascent_mm(title_size) - 10.0,
        TitlePosition::Center => h / 2.0,
        TitlePosition::GoldenRatio => h - h * GOLDEN_SECTION,
    };
    let align_x = |text_width: f32| match s.title_alignment {
        TitleAlignment::Left => s.margin_left,
        TitleAlignment::Center => (w - text_width) / 2.0,
        TitleAlignment::Right => w - s.margin_right - text_width,
    };

    let title_width = text_width_mm(&s.title_text, title_face, title_size);
    let title = frame.text(
        s.title_text.clone(),
        align_x(title_width),
        title_baseline,
        title_size,
        title_face,
        title_color,
    );

    let mut block = title;
    let mut cursor = title.y_min;
    let rule_y = cursor - 3.0;
    match s.title_decoration {
        TitleDecoration::SimpleLine => {
            frame.line(title.x_min, rule_y, title.x_max, rule_y, 1.0, title_color);
            cursor = rule_y;
        }
        TitleDecoration::DoubleLine => {
            frame.line(title.x_min, rule_y, title.x_max, rule_y, 1.0, title_color);
            frame.line(title.x_min, rule_y - 1.5, title.x_max, rule_y - 1.5, 1.0, title_color);
            cursor = rule_y - 1.5;
        }
        TitleDecoration::None | TitleDecoration::Box => {}
    }

    if !s.title_description.trim().is_empty() {
        let width = text_width_mm(&s.title_description, desc_face, desc_size);
        let desc = frame.text(
            s.title_description.clone(),
            align_x(width),
            cursor - 6.0 - ascent_mm(desc_size),
            desc_size,
            desc_face,
            desc_color,
        );
        block = union(block, desc);
        cursor = desc.y_min;
    }

    if s.title_add_date {
        let date = today.format("%B %-d, %Y").to_string();
        let width = text_width_mm(&date, Face::Helvetica, DATE_FONT_SIZE);
        let date_box = frame.text(
            date,
            align_x(width),
            cursor - 5.0 - ascent_mm(DATE_FONT_SIZE),
            DATE_FONT_SIZE,
            Face::Helvetica,
            desc_color,
        );
        block = union(block, date_box);
    }

    if s.title_decoration == TitleDecoration::Box {
        let pad = 5.0;
        let (x1, y1, x2, y2) = (block.x_min - pad, block.y_min - pad, block.x_max + pad, block.y_max + pad);
        frame.line(x1, y1, x2, y1, 1.0, title_color);
        frame.line(x2, y1, x2, y2, 1.0, title_color);
        frame.line(x2, y2, x1, y2, 1.0, title_color);
        frame.line(x1, y2, x1, y1, 1.0, title_color);
    }

    frame.into_page(PageKind::Title, false, Some("Title".to_string()))
}

fn fit_size(text: &str, face: Face, size: f32, max_width: f32) -> f32 {
    let width = text_width_mm(text, face, size);
    if width > max_width && width > 0.0 {
        size * max_width / width
    } else {
        size
    }
}

fn union(a: Bounds, b: Bounds) -> Bounds {
    Bounds {
        x_min: a.x_min.min(b.x_min),
        y_min: a.y_min.min(b.y_min),
        x_max: a.x_max.max(b.x_max),
        y_max: a.y_max.max(b.y_max),
    }
}

// ============================================================================
// Tests
// ============================================================================
