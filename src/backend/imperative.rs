use chrono::{DateTime, Local};
use printpdf::lopdf::{self, Object, StringFormat};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use sha2::{Digest, Sha256};

use crate::backend::DocumentBackend;
use crate::error::{ReportError, Result};
use crate::layout::kpi::KpiGrid;
use crate::layout::table::TableSlice;
use crate::layout::PT_TO_MM;
use crate::paint::{self, Mark};
use crate::stamp::PageStamp;
use crate::theme::{Color, Theme};

fn rgb(c: Color) -> printpdf::Color {
    let (r, g, b) = c.unit();
    printpdf::Color::Rgb(Rgb::new(r, g, b, None))
}

/// Stateful printpdf drawing context. Every call draws immediately at
/// absolute coordinates on the page it targets.
pub struct ImperativeBackend {
    theme: Theme,
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    issued_at: OffsetDateTime,
    /// The page printpdf creates together with the document, until used.
    first_page: Option<(PdfPageIndex, PdfLayerIndex)>,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
}

impl ImperativeBackend {
    pub fn new(theme: &Theme, title: &str, issued_at: &DateTime<Local>) -> Result<Self> {
        let issued_at = OffsetDateTime::from_unix_timestamp(issued_at.timestamp())
            .map_err(|e| ReportError::Pdf(format!("document date: {e}")))?;
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(theme.page_width),
            Mm(theme.page_height),
            "Content",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            theme: theme.clone(),
            doc,
            font,
            font_bold,
            issued_at,
            first_page: Some((page, layer)),
            pages: Vec::new(),
        })
    }

    fn layer(&self, index: usize) -> Result<PdfLayerReference> {
        let (page, layer) = self
            .pages
            .get(index)
            .cloned()
            .ok_or_else(|| ReportError::Pdf(format!("no page {}", index + 1)))?;
        Ok(self.doc.get_page(page).get_layer(layer))
    }

    fn current_layer(&self) -> Result<PdfLayerReference> {
        match self.pages.len() {
            0 => Err(ReportError::Pdf("drawing before the first page".into())),
            n => self.layer(n - 1),
        }
    }

    /// PDF user space grows upwards from the bottom edge.
    fn pdf_y(&self, y: f32) -> f32 {
        self.theme.page_height - y
    }

    fn draw(&self, layer: &PdfLayerReference, marks: &[Mark]) {
        for mark in marks {
            match mark {
                Mark::Text {
                    x,
                    baseline,
                    size,
                    bold,
                    color,
                    text,
                } => {
                    let font = if *bold { &self.font_bold } else { &self.font };
                    layer.set_fill_color(rgb(*color));
                    layer.use_text(text.as_str(), *size, Mm(*x), Mm(self.pdf_y(*baseline)), font);
                }
                Mark::Fill { x, y, w, h, color } => {
                    let top = self.pdf_y(*y);
                    let bottom = self.pdf_y(y + h);
                    let ring = vec![
                        (Point::new(Mm(*x), Mm(bottom)), false),
                        (Point::new(Mm(x + w), Mm(bottom)), false),
                        (Point::new(Mm(x + w), Mm(top)), false),
                        (Point::new(Mm(*x), Mm(top)), false),
                    ];
                    layer.set_fill_color(rgb(*color));
                    layer.add_polygon(Polygon {
                        rings: vec![ring],
                        mode: PaintMode::Fill,
                        winding_order: WindingOrder::NonZero,
                    });
                }
                Mark::Rule {
                    x1,
                    x2,
                    y,
                    width,
                    color,
                } => {
                    let py = self.pdf_y(*y);
                    layer.set_outline_color(rgb(*color));
                    layer.set_outline_thickness(width / PT_TO_MM);
                    layer.add_line(Line {
                        points: vec![
                            (Point::new(Mm(*x1), Mm(py)), false),
                            (Point::new(Mm(*x2), Mm(py)), false),
                        ],
                        is_closed: false,
                    });
                }
            }
        }
    }

    fn draw_on_current(&self, marks: Vec<Mark>) -> Result<()> {
        let layer = self.current_layer()?;
        self.draw(&layer, &marks);
        Ok(())
    }
}

impl DocumentBackend for ImperativeBackend {
    fn new_page(&mut self) -> Result<()> {
        let page = match self.first_page.take() {
            Some(first) => first,
            None => self.doc.add_page(
                Mm(self.theme.page_width),
                Mm(self.theme.page_height),
                "Content",
            ),
        };
        self.pages.push(page);
        Ok(())
    }

    fn draw_section_title(&mut self, y: f32, title: &str, accent: Color) -> Result<()> {
        self.draw_on_current(paint::section_title(&self.theme, y, title, accent))
    }

    fn draw_table(&mut self, y: f32, table: &TableSlice) -> Result<()> {
        self.draw_on_current(paint::table(&self.theme, y, table))
    }

    fn draw_kpi_grid(&mut self, y: f32, grid: &KpiGrid) -> Result<()> {
        self.draw_on_current(paint::kpi_grid(&self.theme, y, grid))
    }

    fn draw_paragraph(&mut self, y: f32, text: &str) -> Result<()> {
        self.draw_on_current(paint::paragraph(&self.theme, y, text))
    }

    fn stamp_page(&mut self, index: usize, stamp: &PageStamp) -> Result<()> {
        let layer = self.layer(index)?;
        self.draw(&layer, &paint::header_footer(&self.theme, stamp));
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<Vec<u8>> {
        let this = *self;
        if this.pages.is_empty() {
            return Err(ReportError::Pdf("document has no pages".into()));
        }
        let bytes = this
            .doc
            .with_creation_date(this.issued_at)
            .with_mod_date(this.issued_at)
            .with_metadata_date(this.issued_at)
            .save_to_bytes()
            .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;
        with_content_id(&bytes)
    }
}

fn lopdf_err(e: lopdf::Error) -> ReportError {
    ReportError::Pdf(format!("{e:?}"))
}

/// printpdf writes a random trailer `/ID`. Replace it with a digest of the
/// document so identical inputs serialize to identical bytes.
fn with_content_id(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut doc = lopdf::Document::load_mem(bytes).map_err(lopdf_err)?;
    doc.trailer.remove(b"ID");

    let mut unstamped = Vec::new();
    doc.save_to(&mut unstamped)?;
    let id = hex::encode(&Sha256::digest(&unstamped)[..16]);

    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(id.clone().into_bytes(), StringFormat::Literal),
            Object::String(id.into_bytes(), StringFormat::Literal),
        ]),
    );
    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}
