pub mod kpi;
pub mod section;
pub mod table;

use crate::theme::{Color, Theme};

use kpi::KpiGrid;
use table::TableSlice;

/// Slack for float comparisons against the content bottom.
const EPS: f32 = 1e-3;

pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// True when a block of height `h` starting at `y` stays above `bottom`.
pub fn fits(y: f32, h: f32, bottom: f32) -> bool {
    y + h <= bottom + EPS
}

/// Baseline that vertically centers text of `size` pt in a band.
pub fn baseline(top: f32, height: f32, size: f32) -> f32 {
    top + height / 2.0 + size * PT_TO_MM * 0.35
}

/// Vertical position on the current page and the usable content band.
#[derive(Debug, Clone)]
pub struct LayoutCursor {
    page_index: usize,
    y: f32,
    content_top: f32,
    content_bottom: f32,
}

impl LayoutCursor {
    pub fn new(theme: &Theme) -> Self {
        Self {
            page_index: 0,
            y: theme.content_top,
            content_top: theme.content_top,
            content_bottom: theme.content_bottom(),
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn content_bottom(&self) -> f32 {
        self.content_bottom
    }

    pub fn at_page_top(&self) -> bool {
        self.y <= self.content_top + EPS
    }

    /// Start a new page unless `required` fits below the current position.
    /// A block that cannot fit even on an empty page is left where it is.
    pub fn ensure_space(&mut self, required: f32) -> f32 {
        if !fits(self.y, required, self.content_bottom) && !self.at_page_top() {
            self.new_page();
        }
        self.y
    }

    pub fn advance(&mut self, block_height: f32) -> f32 {
        self.y += block_height;
        self.y
    }

    fn new_page(&mut self) {
        self.page_index += 1;
        self.y = self.content_top;
        tracing::debug!(page = self.page_index + 1, "page break");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    SectionTitle { title: String, accent: Color },
    Table(TableSlice),
    KpiGrid(KpiGrid),
    Paragraph(String),
}

impl Block {
    pub fn height(&self, theme: &Theme) -> f32 {
        match self {
            Block::SectionTitle { .. } => theme.section_title_height,
            Block::Table(slice) => slice.height(theme),
            Block::KpiGrid(grid) => grid.height(theme),
            Block::Paragraph(_) => theme.paragraph_height,
        }
    }

    /// One-line description for the layout plan view.
    pub fn describe(&self) -> String {
        match self {
            Block::SectionTitle { title, .. } => format!("section  {title}"),
            Block::Table(slice) => {
                let end = slice.first_row + slice.rows.len();
                let cont = if slice.continued { " (cont.)" } else { "" };
                if slice.rows.is_empty() {
                    format!("table    header only{cont}")
                } else {
                    format!("table    rows {}-{end}{cont}", slice.first_row + 1)
                }
            }
            Block::KpiGrid(grid) => format!(
                "kpi grid {} cards in {} rows",
                grid.cards.len(),
                grid.rows()
            ),
            Block::Paragraph(text) => format!("text     {text}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub y: f32,
    pub block: Block,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub blocks: Vec<Placed>,
}

/// Immutable result of the content pass, one entry per page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSequence {
    pages: Vec<Page>,
}

impl PageSequence {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn blocks(&self) -> impl Iterator<Item = (usize, &Placed)> {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(i, p)| p.blocks.iter().map(move |b| (i, b)))
    }
}

/// Places blocks onto pages through a [`LayoutCursor`].
pub struct Composer<'t> {
    theme: &'t Theme,
    cursor: LayoutCursor,
    pages: Vec<Page>,
}

impl<'t> Composer<'t> {
    pub fn new(theme: &'t Theme) -> Self {
        Self {
            theme,
            cursor: LayoutCursor::new(theme),
            pages: vec![Page::default()],
        }
    }

    pub fn theme(&self) -> &'t Theme {
        self.theme
    }

    pub fn cursor(&self) -> &LayoutCursor {
        &self.cursor
    }

    pub fn ensure_space(&mut self, required: f32) -> f32 {
        let y = self.cursor.ensure_space(required);
        while self.pages.len() <= self.cursor.page_index() {
            self.pages.push(Page::default());
        }
        y
    }

    /// Put `block` at the cursor and move past it. Callers reserve space first.
    pub fn place(&mut self, block: Block) -> f32 {
        let height = block.height(self.theme);
        let y = self.cursor.y();
        if let Some(page) = self.pages.last_mut() {
            page.blocks.push(Placed { y, block });
        }
        self.cursor.advance(height);
        height
    }

    pub fn gap(&mut self) {
        self.cursor.advance(self.theme.block_gap);
    }

    /// Atomic paragraph, used for the "no data" fallback.
    pub fn paragraph(&mut self, text: &str) -> f32 {
        self.ensure_space(self.theme.paragraph_height);
        let h = self.place(Block::Paragraph(text.to_string()));
        self.gap();
        h
    }

    pub fn finish(self) -> PageSequence {
        PageSequence { pages: self.pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_starts_below_header_band() {
        let theme = Theme::default();
        let cursor = LayoutCursor::new(&theme);
        assert_eq!(cursor.page_index(), 0);
        assert_eq!(cursor.y(), theme.content_top);
        assert!(cursor.y() > theme.margin);
        assert!(cursor.at_page_top());
    }

    #[test]
    fn test_ensure_space_keeps_page_when_block_fits() {
        let theme = Theme::default();
        let mut cursor = LayoutCursor::new(&theme);
        cursor.advance(100.0);
        let y = cursor.ensure_space(50.0);
        assert_eq!(cursor.page_index(), 0);
        assert_eq!(y, theme.content_top + 100.0);
    }

    #[test]
    fn test_ensure_space_breaks_before_overflow() {
        let theme = Theme::default();
        let mut cursor = LayoutCursor::new(&theme);
        cursor.advance(200.0);
        let y = cursor.ensure_space(60.0);
        assert_eq!(cursor.page_index(), 1);
        assert_eq!(y, theme.content_top);
    }

    #[test]
    fn test_exact_fit_does_not_break() {
        let theme = Theme::default();
        let mut cursor = LayoutCursor::new(&theme);
        let band = theme.content_bottom() - theme.content_top;
        cursor.advance(band - 10.0);
        cursor.ensure_space(10.0);
        assert_eq!(cursor.page_index(), 0);
    }

    #[test]
    fn test_oversized_block_on_fresh_page_stays() {
        let theme = Theme::default();
        let mut cursor = LayoutCursor::new(&theme);
        cursor.ensure_space(1000.0);
        assert_eq!(cursor.page_index(), 0);
    }

    #[test]
    fn test_composer_appends_pages_on_break() {
        let theme = Theme::default();
        let mut c = Composer::new(&theme);
        for _ in 0..40 {
            c.paragraph("filler");
        }
        let pages = c.finish();
        assert!(pages.len() > 1);
        for page in pages.pages() {
            assert!(!page.blocks.is_empty());
            for placed in &page.blocks {
                assert!(placed.y >= theme.content_top);
                assert!(placed.y + theme.paragraph_height <= theme.content_bottom() + EPS);
            }
        }
    }

    #[test]
    fn test_paragraph_never_splits() {
        let theme = Theme::default();
        let mut c = Composer::new(&theme);
        let band = theme.content_bottom() - theme.content_top;
        c.cursor.advance(band - theme.paragraph_height / 2.0);
        c.paragraph("moved whole");
        let pages = c.finish();
        assert_eq!(pages.len(), 2);
        assert!(pages.pages()[0].blocks.is_empty());
        assert_eq!(pages.pages()[1].blocks[0].y, theme.content_top);
    }
}
