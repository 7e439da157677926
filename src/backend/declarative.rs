//! Tree-composition backend. Draw calls only record nodes; nothing is laid
//! out until [`DeclarativeBackend::flow`], which stacks the nodes of each page
//! top-down and paginates on its own, then `pdf-writer` serializes the result.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::backend::DocumentBackend;
use crate::error::{ReportError, Result};
use crate::layout::kpi::KpiGrid;
use crate::layout::section::keep_with_next;
use crate::layout::table::{rows_that_fit, TableSlice};
use crate::layout::{fits, PT_TO_MM};
use crate::paint::{self, Mark};
use crate::stamp::{page_label, PageStamp};
use crate::theme::{Color, Theme};

const FONT: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Heading kept together with the start of its table.
    Section {
        title: String,
        accent: Color,
        table: Option<TableSlice>,
    },
    Table(TableSlice),
    KpiGrid(KpiGrid),
    Paragraph(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageNode {
    pub children: Vec<Node>,
    pub stamp: Option<PageStamp>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocTree {
    pub pages: Vec<PageNode>,
}

/// A physical page after flow: its marks plus the header/footer marks.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPage {
    /// Index of the page node this physical page came from.
    pub source: usize,
    pub marks: Vec<Mark>,
}

impl FlowPage {
    #[cfg(test)]
    pub fn texts(&self) -> Vec<&str> {
        self.marks.iter().filter_map(Mark::text).collect()
    }
}

pub struct DeclarativeBackend {
    theme: Theme,
    title: String,
    tree: DocTree,
}

impl DeclarativeBackend {
    pub fn new(theme: &Theme, title: &str) -> Self {
        Self {
            theme: theme.clone(),
            title: title.to_string(),
            tree: DocTree::default(),
        }
    }

    #[cfg(test)]
    pub fn tree(&self) -> &DocTree {
        &self.tree
    }

    fn current(&mut self) -> Result<&mut PageNode> {
        self.tree
            .pages
            .last_mut()
            .ok_or_else(|| ReportError::Pdf("drawing before the first page".into()))
    }

    /// Lay the tree out onto physical pages and stamp them. Page labels are
    /// computed here from the physical count.
    pub fn flow(&self) -> Vec<FlowPage> {
        let mut flow = Flow::new(&self.theme);
        for (source, page) in self.tree.pages.iter().enumerate() {
            flow.begin(source);
            for node in &page.children {
                flow.node(node);
            }
        }
        let mut pages = flow.finish();

        if pages.len() != self.tree.pages.len() {
            tracing::warn!(
                given = self.tree.pages.len(),
                produced = pages.len(),
                "declarative flow paginated differently from the page plan"
            );
        }

        let total = pages.len();
        for (i, page) in pages.iter_mut().enumerate() {
            if let Some(stamp) = self.tree.pages[page.source].stamp.as_ref() {
                let stamp = PageStamp {
                    page_label: page_label(i + 1, total),
                    ..stamp.clone()
                };
                page.marks.extend(paint::header_footer(&self.theme, &stamp));
            }
        }
        pages
    }
}

impl DocumentBackend for DeclarativeBackend {
    fn new_page(&mut self) -> Result<()> {
        self.tree.pages.push(PageNode::default());
        Ok(())
    }

    fn draw_section_title(&mut self, _y: f32, title: &str, accent: Color) -> Result<()> {
        self.current()?.children.push(Node::Section {
            title: title.to_string(),
            accent,
            table: None,
        });
        Ok(())
    }

    fn draw_table(&mut self, _y: f32, table: &TableSlice) -> Result<()> {
        let page = self.current()?;
        if let Some(Node::Section { table: slot @ None, .. }) = page.children.last_mut() {
            *slot = Some(table.clone());
        } else {
            page.children.push(Node::Table(table.clone()));
        }
        Ok(())
    }

    fn draw_kpi_grid(&mut self, _y: f32, grid: &KpiGrid) -> Result<()> {
        self.current()?.children.push(Node::KpiGrid(grid.clone()));
        Ok(())
    }

    fn draw_paragraph(&mut self, _y: f32, text: &str) -> Result<()> {
        self.current()?.children.push(Node::Paragraph(text.to_string()));
        Ok(())
    }

    fn stamp_page(&mut self, index: usize, stamp: &PageStamp) -> Result<()> {
        let page = self
            .tree
            .pages
            .get_mut(index)
            .ok_or_else(|| ReportError::Pdf(format!("no page {}", index + 1)))?;
        page.stamp = Some(stamp.clone());
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<Vec<u8>> {
        if self.tree.pages.is_empty() {
            return Err(ReportError::Pdf("document has no pages".into()));
        }
        let pages = self.flow();
        Ok(serialize(&self.theme, &self.title, &pages))
    }
}

/// Top-down stacking with its own page breaks. Uses the same spacing and
/// keep-together rules as the page plan.
struct Flow<'t> {
    theme: &'t Theme,
    pages: Vec<FlowPage>,
    y: f32,
}

impl<'t> Flow<'t> {
    fn new(theme: &'t Theme) -> Self {
        Self {
            theme,
            pages: Vec::new(),
            y: theme.content_top,
        }
    }

    fn begin(&mut self, source: usize) {
        self.pages.push(FlowPage {
            source,
            marks: Vec::new(),
        });
        self.y = self.theme.content_top;
    }

    fn at_top(&self) -> bool {
        self.y <= self.theme.content_top + 1e-3
    }

    fn reserve(&mut self, h: f32) {
        if !fits(self.y, h, self.theme.content_bottom()) && !self.at_top() {
            let source = self.pages.last().map(|p| p.source).unwrap_or(0);
            tracing::debug!(source, "declarative flow spilled onto a new page");
            self.begin(source);
        }
    }

    fn emit(&mut self, marks: Vec<Mark>) {
        if let Some(page) = self.pages.last_mut() {
            page.marks.extend(marks);
        }
    }

    fn node(&mut self, node: &Node) {
        let theme = self.theme;
        match node {
            Node::Section { title, accent, table } => {
                self.reserve(keep_with_next(theme));
                self.emit(paint::section_title(theme, self.y, title, *accent));
                self.y += theme.section_title_height;
                if let Some(table) = table {
                    self.table(table);
                    if table.complete {
                        self.y += theme.block_gap;
                    }
                }
            }
            Node::Table(table) => {
                self.table(table);
                if table.complete {
                    self.y += theme.block_gap;
                }
            }
            Node::KpiGrid(grid) => {
                self.reserve(grid.height(theme));
                self.emit(paint::kpi_grid(theme, self.y, grid));
                self.y += grid.height(theme);
                self.y += theme.block_gap;
            }
            Node::Paragraph(text) => {
                self.reserve(theme.paragraph_height);
                self.emit(paint::paragraph(theme, self.y, text));
                self.y += theme.paragraph_height;
                self.y += theme.block_gap;
            }
        }
    }

    fn table(&mut self, table: &TableSlice) {
        let theme = self.theme;
        let total = table.rows.len();
        let mut start = 0;
        loop {
            self.reserve(theme.table_header_height + theme.row_height);
            let n = rows_that_fit(self.y, total - start, theme, theme.content_bottom())
                .max(1)
                .min(total - start);
            let part = table.split(start, start + n, table.continued || start > 0);
            self.emit(paint::table(theme, self.y, &part));
            self.y += part.height(theme);
            start += n;
            if start >= total {
                break;
            }
        }
    }

    fn finish(self) -> Vec<FlowPage> {
        self.pages
    }
}

/// Encode for the WinAnsi encoding of the standard Type 1 fonts.
fn winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

fn pt(mm: f32) -> f32 {
    mm / PT_TO_MM
}

fn content_stream(theme: &Theme, marks: &[Mark]) -> Vec<u8> {
    let page_h = pt(theme.page_height);
    let mut content = Content::new();
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
                let (r, g, b) = color.unit();
                let bytes = winansi(text);
                content.set_fill_rgb(r, g, b);
                content.begin_text();
                content.set_font(if *bold { FONT_BOLD } else { FONT }, *size);
                content.next_line(pt(*x), page_h - pt(*baseline));
                content.show(Str(&bytes));
                content.end_text();
            }
            Mark::Fill { x, y, w, h, color } => {
                let (r, g, b) = color.unit();
                content.set_fill_rgb(r, g, b);
                content.rect(pt(*x), page_h - pt(y + h), pt(*w), pt(*h));
                content.fill_nonzero();
            }
            Mark::Rule {
                x1,
                x2,
                y,
                width,
                color,
            } => {
                let (r, g, b) = color.unit();
                content.set_stroke_rgb(r, g, b);
                content.set_line_width(pt(*width));
                content.move_to(pt(*x1), page_h - pt(*y));
                content.line_to(pt(*x2), page_h - pt(*y));
                content.stroke();
            }
        }
    }
    content.finish()
}

fn serialize(theme: &Theme, title: &str, pages: &[FlowPage]) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let mut next = 1;
    let mut alloc = || {
        let r = Ref::new(next);
        next += 1;
        r
    };

    let catalog_id = alloc();
    let tree_id = alloc();
    let font_id = alloc();
    let font_bold_id = alloc();
    let info_id = alloc();
    let ids: Vec<(Ref, Ref)> = pages.iter().map(|_| (alloc(), alloc())).collect();

    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(ids.iter().map(|(page, _)| *page))
        .count(ids.len() as i32);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr("mda-reports"));
    pdf.type1_font(font_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(font_bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let media = Rect::new(0.0, 0.0, pt(theme.page_width), pt(theme.page_height));
    for (page, (page_id, content_id)) in pages.iter().zip(&ids) {
        {
            let mut writer = pdf.page(*page_id);
            writer.media_box(media);
            writer.parent(tree_id);
            writer.contents(*content_id);
            writer
                .resources()
                .fonts()
                .pair(FONT, font_id)
                .pair(FONT_BOLD, font_bold_id);
        }
        pdf.stream(*content_id, &content_stream(theme, &page.marks));
    }

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::table::{resolve_columns, ColumnSpec};

    fn stamp() -> PageStamp {
        PageStamp {
            title: "MDA Management Portal".into(),
            subtitle: "Generated on 19 Oct 2026, 14:05".into(),
            notice: "Confidential".into(),
            page_label: "Page 1 of 1".into(),
        }
    }

    fn slice(rows: usize) -> TableSlice {
        let theme = Theme::default();
        TableSlice {
            columns: resolve_columns(&[ColumnSpec::text("MDA"), ColumnSpec::numeric("Projects", 30.0)], &theme),
            rows: (0..rows).map(|i| vec![format!("MDA {i}"), i.to_string()]).collect(),
            first_row: 0,
            continued: false,
            complete: true,
        }
    }

    #[test]
    fn test_table_after_title_joins_section_node() {
        let theme = Theme::default();
        let mut backend = DeclarativeBackend::new(&theme, "Projects Report");
        backend.new_page().unwrap();
        backend.draw_section_title(40.0, "Projects by MDA", theme.accent).unwrap();
        backend.draw_table(50.0, &slice(2)).unwrap();
        backend.draw_table(80.0, &slice(1)).unwrap();

        let children = &backend.tree().pages[0].children;
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[0], Node::Section { table: Some(t), .. } if t.rows.len() == 2));
        assert!(matches!(&children[1], Node::Table(_)));
    }

    #[test]
    fn test_flow_paginates_oversized_page_on_its_own() {
        let theme = Theme::default();
        let mut backend = DeclarativeBackend::new(&theme, "Projects Report");
        backend.new_page().unwrap();
        backend.draw_section_title(0.0, "Projects by MDA", theme.accent).unwrap();
        backend.draw_table(0.0, &slice(80)).unwrap();
        backend.stamp_page(0, &stamp()).unwrap();

        let pages = backend.flow();
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.source == 0));
        let labels: Vec<String> = pages
            .iter()
            .map(|p| p.texts().last().unwrap().to_string())
            .collect();
        assert_eq!(labels, vec!["Page 1 of 3", "Page 2 of 3", "Page 3 of 3"]);
        // header row repeats on continuation pages
        assert!(pages[1].texts().contains(&"MDA"));
    }

    #[test]
    fn test_serialized_pdf_carries_stamps() {
        let theme = Theme::default();
        let mut backend = Box::new(DeclarativeBackend::new(&theme, "Users Report"));
        backend.new_page().unwrap();
        backend
            .draw_paragraph(theme.content_top, "No user data available for the selected period.")
            .unwrap();
        backend.stamp_page(0, &stamp()).unwrap();
        let bytes = backend.finalize().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(bytes.starts_with(b"%PDF"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("(Page 1 of 1)"));
        assert!(text.contains("(MDA Management Portal)"));
    }

    #[test]
    fn test_stamp_for_missing_page_fails() {
        let theme = Theme::default();
        let mut backend = DeclarativeBackend::new(&theme, "Users Report");
        assert!(backend.stamp_page(0, &stamp()).is_err());
        assert!(backend.draw_paragraph(40.0, "too early").is_err());
    }

    #[test]
    fn test_winansi() {
        assert_eq!(winansi("Page 1"), b"Page 1".to_vec());
        assert_eq!(winansi("a \u{b7} b"), vec![b'a', b' ', 0xb7, b' ', b'b']);
        assert_eq!(winansi("\u{20a6}5"), b"?5".to_vec());
    }
}
