use crate::layout::{fits, Block, Composer};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Width {
    /// Share of whatever the fixed columns leave over.
    Auto,
    /// Fixed width in mm.
    Fixed(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub header: String,
    pub width: Width,
    pub align: Align,
}

impl ColumnSpec {
    pub fn text(header: &str) -> Self {
        Self {
            header: header.to_string(),
            width: Width::Auto,
            align: Align::Start,
        }
    }

    /// Numbers are always right-aligned in a fixed-width column.
    pub fn numeric(header: &str, width_mm: f32) -> Self {
        Self {
            header: header.to_string(),
            width: Width::Fixed(width_mm),
            align: Align::End,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Vec<String>>,
}

/// Column after width resolution: absolute x offset and width in mm.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: String,
    pub x: f32,
    pub width: f32,
    pub align: Align,
}

/// The part of a table that landed on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSlice {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    /// Index of `rows[0]` within the whole table.
    pub first_row: usize,
    /// Continues a table started on an earlier page.
    pub continued: bool,
    /// Holds the table's last row.
    pub complete: bool,
}

impl TableSlice {
    pub fn height(&self, theme: &Theme) -> f32 {
        theme.table_header_height + self.rows.len() as f32 * theme.row_height
    }

    /// Banding follows the row's position in the whole table.
    pub fn is_banded(&self, local_index: usize) -> bool {
        (self.first_row + local_index) % 2 == 1
    }

    /// Sub-slice of rows `start..end`, keeping banding parity.
    pub fn split(&self, start: usize, end: usize, continued: bool) -> TableSlice {
        TableSlice {
            columns: self.columns.clone(),
            rows: self.rows[start..end].to_vec(),
            first_row: self.first_row + start,
            continued,
            complete: self.complete && end == self.rows.len(),
        }
    }
}

pub fn resolve_columns(columns: &[ColumnSpec], theme: &Theme) -> Vec<Column> {
    let available = theme.content_width();
    let fixed: f32 = columns
        .iter()
        .map(|c| match c.width {
            Width::Fixed(w) => w,
            Width::Auto => 0.0,
        })
        .sum();
    let autos = columns.iter().filter(|c| c.width == Width::Auto).count();
    let auto_width = if autos > 0 {
        ((available - fixed) / autos as f32).max(0.0)
    } else {
        0.0
    };

    let mut x = theme.margin;
    columns
        .iter()
        .map(|c| {
            let width = match c.width {
                Width::Fixed(w) => w,
                Width::Auto => auto_width,
            };
            let col = Column {
                header: c.header.clone(),
                x,
                width,
                align: c.align,
            };
            x += width;
            col
        })
        .collect()
}

/// How many of `remaining` rows fit below `y`, header included. Rows are
/// the atomic unit; the result may be zero.
pub fn rows_that_fit(y: f32, remaining: usize, theme: &Theme, bottom: f32) -> usize {
    let mut n = 0;
    while n < remaining {
        let h = theme.table_header_height + (n + 1) as f32 * theme.row_height;
        if !fits(y, h, bottom) {
            break;
        }
        n += 1;
    }
    n
}

/// Cut `text` so it fits `width` mm at `size` pt, ending with "...".
pub fn clip_to_width(text: &str, width: f32, size: f32, theme: &Theme) -> String {
    if theme.text_width(text, size) <= width {
        return text.to_string();
    }
    let mut out: String = text.to_string();
    while !out.is_empty() && theme.text_width(&format!("{out}..."), size) > width {
        out.pop();
    }
    format!("{}...", out.trim_end())
}

/// Lay out a table, breaking between rows when the page fills up. The header
/// row repeats on every page. Returns the total height placed.
pub fn render_table(c: &mut Composer<'_>, spec: &TableSpec) -> f32 {
    let theme = c.theme();
    let columns = resolve_columns(&spec.columns, theme);
    let total = spec.rows.len();
    let mut consumed = 0.0;
    let mut start = 0;

    loop {
        let y = c.ensure_space(theme.table_header_height + theme.row_height);
        let bottom = c.cursor().content_bottom();
        let n = rows_that_fit(y, total - start, theme, bottom)
            .max(1)
            .min(total - start);
        let end = start + n;
        consumed += c.place(Block::Table(TableSlice {
            columns: columns.clone(),
            rows: spec.rows[start..end].to_vec(),
            first_row: start,
            continued: start > 0,
            complete: end == total,
        }));
        start = end;
        if start >= total {
            break;
        }
    }
    consumed
}
