// todo-pdf: draws a document plan with printpdf
//
// printpdf lays down text, rules and bookmarks. A second pass over the saved
// document with lopdf adds what printpdf 0.7 cannot express: one shared dot
// grid Form XObject referenced by every detail page, and internal link
// annotations with explicit page destinations.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, LineDashPattern, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use serde::Serialize;

use crate::config::Configuration;
use crate::error::AppError;
use crate::layout::{self, Color as PlanColor, DocumentPlan, DotGrid, Element};
use crate::metrics::{mm_to_pt, Face};
use crate::scaling::{self, Warning};

/// Resource name under which detail pages see the dot grid.
const DOT_GRID_NAME: &str = "DotGrid";

/// Control point distance for a quarter circle drawn as a cubic Bézier.
const KAPPA: f32 = 0.552_284_8;

// ============================================================================
// Data Structures
// ============================================================================

/// A rendered document and what went into it.
#[derive(Debug, Serialize)]
pub struct GeneratedPdf {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub warnings: Vec<Warning>,
}

impl GeneratedPdf {
    pub fn write_to(&self, output_path: &Path) -> Result<(), AppError> {
        let file = File::create(output_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&self.bytes)?;
        writer.flush()?;
        Ok(())
    }
}

/// The built-in fonts a plan can reference.
struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    courier: IndirectFontRef,
    courier_bold: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, AppError> {
        let add = |font: BuiltinFont| doc.add_builtin_font(font).map_err(|e| AppError::PdfError(e.to_string()));
        Ok(Self {
            regular: add(BuiltinFont::Helvetica)?,
            bold: add(BuiltinFont::HelveticaBold)?,
            courier: add(BuiltinFont::Courier)?,
            courier_bold: add(BuiltinFont::CourierBold)?,
        })
    }

    fn get(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Helvetica => &self.regular,
            Face::HelveticaBold => &self.bold,
            Face::Courier => &self.courier,
            Face::CourierBold => &self.courier_bold,
        }
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Resolves, lays out and renders the full planner.
pub fn generate_pdf(config: &Configuration) -> Result<GeneratedPdf, AppError> {
    let resolved = scaling::resolve(config);
    let plan = layout::build_plan(&resolved);
    log::info!(
        "rendering {} pages ({:.1} x {:.1} mm, {} dots per detail page)",
        plan.pages.len(),
        plan.page_width,
        plan.page_height,
        plan.dot_grid.dots.len()
    );
    let bytes = render_plan(&plan)?;
    Ok(GeneratedPdf {
        bytes,
        pages: plan.pages.len(),
        warnings: resolved.warnings,
    })
}

/// Renders the one-page preview of the first todo page.
pub fn generate_preview(config: &Configuration) -> Result<GeneratedPdf, AppError> {
    let resolved = scaling::resolve(config);
    let plan = layout::build_preview(&resolved);
    let bytes = render_plan(&plan)?;
    Ok(GeneratedPdf {
        bytes,
        pages: plan.pages.len(),
        warnings: resolved.warnings,
    })
}

/// Serializes every primitive of `plan` into a PDF.
pub fn render_plan(plan: &DocumentPlan) -> Result<Vec<u8>, AppError> {
    let drawn = draw_pages(plan)?;
    let mut doc = Document::load_mem(&drawn)?;

    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    if page_ids.len() != plan.pages.len() {
        return Err(AppError::PdfError(format!(
            "expected {} pages, printpdf wrote {}",
            plan.pages.len(),
            page_ids.len()
        )));
    }

    if plan.pages.iter().any(|page| page.dot_grid) {
        attach_dot_grid(&mut doc, plan, &page_ids)?;
    }
    attach_links(&mut doc, plan, &page_ids)?;

    doc.compress();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

// ============================================================================
// printpdf Pass
// ============================================================================

/// Text, rules and bookmarks for every page.
fn draw_pages(plan: &DocumentPlan) -> Result<Vec<u8>, AppError> {
    let width = Mm(plan.page_width);
    let height = Mm(plan.page_height);
    let (doc, first_page, first_layer) = PdfDocument::new(plan.title.as_str(), width, height, "Layer 1");
    let fonts = Fonts::load(&doc)?;

    let mut page_refs = Vec::with_capacity(plan.pages.len());
    page_refs.push((first_page, first_layer));
    for _ in 1..plan.pages.len() {
        page_refs.push(doc.add_page(width, height, "Layer 1"));
    }

    for (page, &(page_idx, layer_idx)) in plan.pages.iter().zip(&page_refs) {
        let layer = doc.get_page(page_idx).get_layer(layer_idx);

        for element in &page.elements {
            match element {
                Element::Text { text, x, y, size, face, color } => {
                    layer.set_fill_color(pdf_color(*color));
                    layer.use_text(text.as_str(), *size, Mm(*x), Mm(*y), fonts.get(*face));
                }
                Element::Line { x1, y1, x2, y2, width_pt, color, dashed } => {
                    layer.set_outline_color(pdf_color(*color));
                    layer.set_outline_thickness(*width_pt);
                    if *dashed {
                        layer.set_line_dash_pattern(LineDashPattern {
                            dash_1: Some(2),
                            gap_1: Some(2),
                            ..Default::default()
                        });
                    }
                    draw_line(&layer, *x1, *y1, *x2, *y2);
                    if *dashed {
                        layer.set_line_dash_pattern(LineDashPattern::default());
                    }
                }
                // Added in the lopdf pass, once page object ids exist.
                Element::Link { .. } => {}
            }
        }
        if let Some(name) = &page.bookmark {
            doc.add_bookmark(name.as_str(), page_idx);
        }
    }

    doc.save_to_bytes().map_err(|e| AppError::PdfError(e.to_string()))
}

fn pdf_color(color: PlanColor) -> printpdf::Color {
    printpdf::Color::Rgb(Rgb::new(color.r, color.g, color.b, None))
}

fn draw_line(layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32) {
    let points = vec![
        (Point::new(Mm(x1), Mm(y1)), false),
        (Point::new(Mm(x2), Mm(y2)), false),
    ];
    let line = Line {
        points,
        is_closed: false,
    };
    layer.add_line(line);
}

// ============================================================================
// lopdf Pass
// ============================================================================

/// Stores the grid once and paints it under every page that asks for it.
fn attach_dot_grid(doc: &mut Document, plan: &DocumentPlan, page_ids: &[ObjectId]) -> Result<(), AppError> {
    let form = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "FormType" => 1,
            "BBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::from(mm_to_pt(plan.page_width)),
                Object::from(mm_to_pt(plan.page_height)),
            ],
            "Resources" => dictionary! {},
        },
        dot_grid_content(&plan.dot_grid)?,
    );
    let form_id = doc.add_object(form);

    let invoke = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("Do", vec![Object::Name(DOT_GRID_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let invoke_id = doc.add_object(Stream::new(dictionary! {}, invoke.encode()?));

    for (page, &page_id) in plan.pages.iter().zip(page_ids) {
        if !page.dot_grid {
            continue;
        }
        add_xobject_resource(doc, page_id, form_id)?;

        let page_dict = doc.get_dictionary_mut(page_id)?;
        let mut contents = vec![Object::Reference(invoke_id)];
        match page_dict.get(b"Contents") {
            Ok(Object::Array(existing)) => contents.extend(existing.iter().cloned()),
            Ok(existing) => contents.push(existing.clone()),
            Err(_) => {}
        }
        page_dict.set("Contents", contents);
    }
    log::debug!("dot grid stored once as object {:?}", form_id);
    Ok(())
}

/// Filled circles, one path per dot, in points.
fn dot_grid_content(grid: &DotGrid) -> Result<Vec<u8>, AppError> {
    let r = mm_to_pt(grid.radius);
    let k = r * KAPPA;
    let mut operations = Vec::with_capacity(grid.dots.len() * 6 + 1);
    operations.push(Operation::new(
        "rg",
        vec![grid.color.r.into(), grid.color.g.into(), grid.color.b.into()],
    ));
    for &(x, y) in &grid.dots {
        let (cx, cy) = (mm_to_pt(x), mm_to_pt(y));
        operations.push(Operation::new("m", vec![(cx + r).into(), cy.into()]));
        for [x1, y1, x2, y2, x3, y3] in [
            [cx + r, cy + k, cx + k, cy + r, cx, cy + r],
            [cx - k, cy + r, cx - r, cy + k, cx - r, cy],
            [cx - r, cy - k, cx - k, cy - r, cx, cy - r],
            [cx + k, cy - r, cx + r, cy - k, cx + r, cy],
        ] {
            operations.push(Operation::new(
                "c",
                vec![x1.into(), y1.into(), x2.into(), y2.into(), x3.into(), y3.into()],
            ));
        }
        operations.push(Operation::new("f", vec![]));
    }
    Ok(Content { operations }.encode()?)
}

fn add_xobject_resource(doc: &mut Document, page_id: ObjectId, form_id: ObjectId) -> Result<(), AppError> {
    let resources = doc.get_dictionary(page_id)?.get(b"Resources").ok().cloned();
    match resources {
        Some(Object::Reference(resources_id)) => {
            doc.get_dictionary_mut(resources_id)?
                .set("XObject", dictionary! { DOT_GRID_NAME => form_id });
        }
        Some(Object::Dictionary(mut resources)) => {
            resources.set("XObject", dictionary! { DOT_GRID_NAME => form_id });
            doc.get_dictionary_mut(page_id)?.set("Resources", resources);
        }
        _ => {
            doc.get_dictionary_mut(page_id)?.set(
                "Resources",
                dictionary! { "XObject" => dictionary! { DOT_GRID_NAME => form_id } },
            );
        }
    }
    Ok(())
}

/// Link annotations jumping to the top of their target page.
fn attach_links(doc: &mut Document, plan: &DocumentPlan, page_ids: &[ObjectId]) -> Result<(), AppError> {
    let mut total = 0;
    for (page, &page_id) in plan.pages.iter().zip(page_ids) {
        let mut annots = Vec::new();
        for element in &page.elements {
            let Element::Link { rect, target } = element else {
                continue;
            };
            let Some(&target_id) = page_ids.get(*target) else {
                log::warn!("dropping link to missing page {}", target);
                continue;
            };
            let annot = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![
                    Object::from(mm_to_pt(rect.x_min)),
                    Object::from(mm_to_pt(rect.y_min)),
                    Object::from(mm_to_pt(rect.x_max)),
                    Object::from(mm_to_pt(rect.y_max)),
                ],
                "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
                "Dest" => vec![Object::Reference(target_id), "XYZ".into(), Object::Null, Object::Null, Object::Null],
            });
            annots.push(Object::Reference(annot));
        }
        total += annots.len();
        doc.get_dictionary_mut(page_id)?.set("Annots", annots);
    }
    log::debug!("attached {} link annotations", total);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
