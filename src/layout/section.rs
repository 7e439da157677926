use crate::layout::table::{render_table, TableSpec};
use crate::layout::{Block, Composer};
use crate::theme::{Color, Theme};

/// Space a section needs before its title may be drawn: the title, the
/// table header and one body row, so a title never ends a page alone.
pub fn keep_with_next(theme: &Theme) -> f32 {
    theme.section_title_height + theme.table_header_height + theme.row_height
}

/// Titled table with an accent tick. Returns the height consumed.
pub fn render_section(c: &mut Composer<'_>, title: &str, accent: Color, table: &TableSpec) -> f32 {
    c.ensure_space(keep_with_next(c.theme()));
    let mut consumed = c.place(Block::SectionTitle {
        title: title.to_string(),
        accent,
    });
    consumed += render_table(c, table);
    c.gap();
    tracing::debug!(section = title, rows = table.rows.len(), consumed, "section placed");
    consumed
}
