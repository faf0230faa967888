//! Serializes an [`InvoiceDocument`] into PDF bytes with `printpdf`.
//!
//! Text is set in the base-14 Helvetica family, which every PDF viewer ships,
//! so no font files are needed at runtime.  Coordinates are converted from the
//! layout's top-left origin to PDF's bottom-left origin here and nowhere else.

use std::io::BufWriter;

use log::debug;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};
use thiserror::Error;

use crate::metrics::{text_width_mm, unsupported_char, MM_PER_PT};
use crate::model::{
    FontWeight, HorizontalAlignment, InvoiceDocument, Page, PageSize, Primitive, Rect, Rgb, Rule,
    TextRun,
};

const LAYER_NAME: &str = "Invoice";

/// Errors raised while serializing a document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document has no pages to render.
    #[error("document `{0}` has no pages")]
    Empty(String),
    /// A builtin font could not be registered with the PDF document.
    #[error("failed to register builtin font {font}: {message}")]
    Font { font: &'static str, message: String },
    /// A text run holds a character the builtin fonts cannot encode.
    #[error("`{text}` contains {character:?}, which the built-in Helvetica fonts cannot display")]
    Unencodable { text: String, character: char },
    /// The PDF writer failed.
    #[error("failed to write PDF: {0}")]
    Write(String),
}

/// PDF bytes together with the number of pages they contain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn install(document: &PdfDocumentReference) -> Result<Self, RenderError> {
        let load = |font: BuiltinFont, name: &'static str| {
            document
                .add_builtin_font(font)
                .map_err(|err| RenderError::Font {
                    font: name,
                    message: err.to_string(),
                })
        };
        Ok(Self {
            regular: load(BuiltinFont::Helvetica, "Helvetica")?,
            bold: load(BuiltinFont::HelveticaBold, "Helvetica-Bold")?,
        })
    }

    fn for_weight(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

/// Renders laid out documents to PDF.
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Serializes `document`, one PDF page per layout page.
    pub fn render(&self, document: &InvoiceDocument) -> Result<RenderedPdf, RenderError> {
        let pages = document.pages();
        if pages.is_empty() {
            return Err(RenderError::Empty(document.title().to_owned()));
        }
        check_encodable(pages)?;

        let size = document.page_size();
        let (pdf, first_page, first_layer) =
            PdfDocument::new(document.title(), Mm(size.width), Mm(size.height), LAYER_NAME);
        let fonts = Fonts::install(&pdf)?;

        for (index, page) in pages.iter().enumerate() {
            let layer = if index == 0 {
                pdf.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_index, layer_index) =
                    pdf.add_page(Mm(size.width), Mm(size.height), LAYER_NAME);
                pdf.get_page(page_index).get_layer(layer_index)
            };
            paint_page(&layer, page, size, &fonts);
        }

        let mut writer = BufWriter::new(Vec::new());
        pdf.save(&mut writer)
            .map_err(|err| RenderError::Write(err.to_string()))?;
        let bytes = writer
            .into_inner()
            .map_err(|err| RenderError::Write(err.error().to_string()))?;

        debug!(
            "rendered `{}`: {} page(s), {} bytes",
            document.title(),
            pages.len(),
            bytes.len()
        );
        Ok(RenderedPdf {
            bytes,
            page_count: pages.len(),
        })
    }
}

/// Rejects documents with text the WinAnsi encoded builtin fonts would drop.
fn check_encodable(pages: &[Page]) -> Result<(), RenderError> {
    for run in pages.iter().flat_map(Page::text_runs) {
        if let Some(character) = unsupported_char(run.text()) {
            return Err(RenderError::Unencodable {
                text: run.text().to_owned(),
                character,
            });
        }
    }
    Ok(())
}

fn pdf_color(color: Rgb) -> Color {
    let Rgb(r, g, b) = color;
    Color::Rgb(printpdf::Rgb::new(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        None,
    ))
}

fn point(x: f64, y: f64, size: PageSize) -> (Point, bool) {
    (Point::new(Mm(x), Mm(size.height - y)), false)
}

fn thickness_pt(thickness_mm: f64) -> f64 {
    thickness_mm / MM_PER_PT
}

fn paint_page(layer: &PdfLayerReference, page: &Page, size: PageSize, fonts: &Fonts) {
    for primitive in page.primitives() {
        match primitive {
            Primitive::Rect(rect) => paint_rect(layer, rect, size),
            Primitive::Rule(rule) => paint_rule(layer, rule, size),
            Primitive::Text(run) => paint_text(layer, run, size, fonts),
        }
    }
}

fn paint_rect(layer: &PdfLayerReference, rect: &Rect, size: PageSize) {
    let points = vec![
        point(rect.x, rect.y, size),
        point(rect.x + rect.width, rect.y, size),
        point(rect.x + rect.width, rect.bottom(), size),
        point(rect.x, rect.bottom(), size),
    ];

    if let Some(fill) = rect.fill {
        layer.set_fill_color(pdf_color(fill));
        layer.add_shape(Line {
            points: points.clone(),
            is_closed: true,
            has_fill: true,
            has_stroke: false,
            is_clipping_path: false,
        });
    }

    if let Some(stroke) = rect.stroke {
        layer.set_outline_color(pdf_color(stroke));
        layer.set_outline_thickness(thickness_pt(rect.stroke_thickness));
        layer.add_shape(Line {
            points,
            is_closed: true,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        });
    }
}

fn paint_rule(layer: &PdfLayerReference, rule: &Rule, size: PageSize) {
    layer.set_outline_color(pdf_color(rule.color));
    layer.set_outline_thickness(thickness_pt(rule.thickness));
    layer.add_shape(Line {
        points: vec![
            point(rule.from.0, rule.from.1, size),
            point(rule.to.0, rule.to.1, size),
        ],
        is_closed: false,
        has_fill: false,
        has_stroke: true,
        is_clipping_path: false,
    });
}

/// Left edge of `run` once its alignment is resolved.
pub fn resolved_x(run: &TextRun) -> f64 {
    let width = || text_width_mm(run.text(), run.font_size_pt(), run.weight());
    match run.alignment() {
        HorizontalAlignment::Left => run.x(),
        HorizontalAlignment::Center => run.x() - width() / 2.0,
        HorizontalAlignment::Right => run.x() - width(),
    }
}

fn paint_text(layer: &PdfLayerReference, run: &TextRun, size: PageSize, fonts: &Fonts) {
    layer.set_fill_color(pdf_color(run.color()));
    layer.use_text(
        run.text(),
        run.font_size_pt(),
        Mm(resolved_x(run)),
        Mm(size.height - run.baseline()),
        fonts.for_weight(run.weight()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_text_is_shifted_by_half_its_width() {
        let run = TextRun::new("Thank you", 105.0, 100.0, 11.0)
            .with_alignment(HorizontalAlignment::Center);
        let width = text_width_mm("Thank you", 11.0, FontWeight::Regular);
        assert!((resolved_x(&run) - (105.0 - width / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn right_aligned_text_ends_at_anchor() {
        let run = TextRun::new("INR 10.00", 196.0, 100.0, 12.0)
            .bold()
            .with_alignment(HorizontalAlignment::Right);
        let width = text_width_mm("INR 10.00", 12.0, FontWeight::Bold);
        assert!((resolved_x(&run) + width - 196.0).abs() < 1e-9);
    }

    #[test]
    fn text_outside_win_ansi_is_rejected() {
        let mut page = Page::new();
        page.push_text(TextRun::new("Żarówka", 14.0, 80.0, 11.0));
        assert!(matches!(
            check_encodable(&[page]),
            Err(RenderError::Unencodable { character: 'Ż', .. })
        ));
    }

    #[test]
    fn thickness_converts_to_points() {
        assert!((thickness_pt(25.4) - 72.0).abs() < 1e-9);
    }
}
