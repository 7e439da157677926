pub mod declarative;
#[cfg(feature = "pdf")]
pub mod imperative;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::layout::kpi::KpiGrid;
use crate::layout::table::TableSlice;
use crate::layout::{Block, PageSequence};
use crate::stamp::{PageStamp, StampContext};
use crate::theme::{Color, Theme};

/// Drawing surface the content pass is replayed onto. `y` is the block's top
/// edge in mm from the top of the page.
pub trait DocumentBackend {
    fn new_page(&mut self) -> Result<()>;
    fn draw_section_title(&mut self, y: f32, title: &str, accent: Color) -> Result<()>;
    fn draw_table(&mut self, y: f32, table: &TableSlice) -> Result<()>;
    fn draw_kpi_grid(&mut self, y: f32, grid: &KpiGrid) -> Result<()>;
    fn draw_paragraph(&mut self, y: f32, text: &str) -> Result<()>;
    /// Header and footer for page `index` (0-based), once every page exists.
    fn stamp_page(&mut self, index: usize, stamp: &PageStamp) -> Result<()>;
    fn finalize(self: Box<Self>) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Imperative,
    Declarative,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Imperative => "imperative",
            BackendKind::Declarative => "declarative",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imperative" => Ok(BackendKind::Imperative),
            "declarative" => Ok(BackendKind::Declarative),
            _ => Err(ReportError::UnknownBackend(s.to_string())),
        }
    }
}

/// Build a fresh backend. Fails before anything is drawn when the backend
/// is not compiled in. `issued_at` becomes the document's metadata dates.
pub fn create(
    kind: BackendKind,
    theme: &Theme,
    doc_title: &str,
    issued_at: &DateTime<Local>,
) -> Result<Box<dyn DocumentBackend>> {
    match kind {
        #[cfg(feature = "pdf")]
        BackendKind::Imperative => Ok(Box::new(imperative::ImperativeBackend::new(
            theme, doc_title, issued_at,
        )?)),
        #[cfg(not(feature = "pdf"))]
        BackendKind::Imperative => {
            let _ = (theme, doc_title, issued_at);
            Err(ReportError::BackendUnavailable(
                "imperative (build with the 'pdf' feature)".into(),
            ))
        }
        BackendKind::Declarative => Ok(Box::new(declarative::DeclarativeBackend::new(theme, doc_title))),
    }
}

/// Content pass followed by the stamping pass. Stamps are computed only
/// after every page has been replayed, so the total is final.
pub fn replay(pages: &PageSequence, ctx: &StampContext<'_>, backend: &mut dyn DocumentBackend) -> Result<()> {
    for page in pages.pages() {
        backend.new_page()?;
        for placed in &page.blocks {
            match &placed.block {
                Block::SectionTitle { title, accent } => {
                    backend.draw_section_title(placed.y, title, *accent)?
                }
                Block::Table(slice) => backend.draw_table(placed.y, slice)?,
                Block::KpiGrid(grid) => backend.draw_kpi_grid(placed.y, grid)?,
                Block::Paragraph(text) => backend.draw_paragraph(placed.y, text)?,
            }
        }
    }

    for (index, stamp) in crate::stamp::stamps(ctx, pages.len()).iter().enumerate() {
        backend.stamp_page(index, stamp)?;
    }
    Ok(())
}

pub fn stamp_and_serialize(
    pages: &PageSequence,
    ctx: &StampContext<'_>,
    mut backend: Box<dyn DocumentBackend>,
) -> Result<Vec<u8>> {
    replay(pages, ctx, backend.as_mut())?;
    backend.finalize()
}
