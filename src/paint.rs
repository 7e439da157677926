//! Visual vocabulary shared by both backends. Every block turns into a flat
//! list of marks in top-down page coordinates (mm from the top-left corner);
//! a backend only has to know how to draw text, filled boxes and rules.

use crate::layout::kpi::KpiGrid;
use crate::layout::table::{clip_to_width, Align, Column, TableSlice};
use crate::layout::{baseline, PT_TO_MM};
use crate::stamp::PageStamp;
use crate::theme::{Color, Theme};

#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Text {
        x: f32,
        baseline: f32,
        size: f32,
        bold: bool,
        color: Color,
        text: String,
    },
    Fill {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        width: f32,
        color: Color,
    },
}

impl Mark {
    #[cfg(test)]
    pub fn text(&self) -> Option<&str> {
        match self {
            Mark::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

fn text(x: f32, baseline: f32, size: f32, bold: bool, color: Color, s: &str) -> Mark {
    Mark::Text {
        x,
        baseline,
        size,
        bold,
        color,
        text: s.to_string(),
    }
}

pub fn section_title(theme: &Theme, y: f32, title: &str, accent: Color) -> Vec<Mark> {
    let tick_h = theme.section_title_size * PT_TO_MM * 1.1;
    let line_h = theme.section_title_height * 0.7;
    vec![
        Mark::Fill {
            x: theme.margin,
            y: y + (line_h - tick_h) / 2.0,
            w: 2.5,
            h: tick_h,
            color: accent,
        },
        text(
            theme.margin + 5.0,
            baseline(y, line_h, theme.section_title_size),
            theme.section_title_size,
            true,
            theme.text,
            title,
        ),
    ]
}

/// Vertical band and ink shared by every cell of one table row.
struct RowBand {
    top: f32,
    height: f32,
    bold: bool,
    color: Color,
}

fn cell(theme: &Theme, col: &Column, row: &RowBand, s: &str) -> Mark {
    let size = theme.body_size;
    let inner = (col.width - 2.0 * theme.cell_padding).max(0.0);
    let shown = clip_to_width(s, inner, size, theme);
    let tx = match col.align {
        Align::Start => col.x + theme.cell_padding,
        Align::End => col.x + col.width - theme.cell_padding - theme.text_width(&shown, size),
    };
    text(tx, baseline(row.top, row.height, size), size, row.bold, row.color, &shown)
}

pub fn table(theme: &Theme, y: f32, slice: &TableSlice) -> Vec<Mark> {
    let mut marks = Vec::new();
    let left = theme.margin;
    let width = theme.content_width();

    marks.push(Mark::Fill {
        x: left,
        y,
        w: width,
        h: theme.table_header_height,
        color: theme.header_fill,
    });
    let header = RowBand {
        top: y,
        height: theme.table_header_height,
        bold: true,
        color: Color::WHITE,
    };
    for col in &slice.columns {
        marks.push(cell(theme, col, &header, &col.header));
    }

    let mut top = y + theme.table_header_height;
    for (i, row) in slice.rows.iter().enumerate() {
        if slice.is_banded(i) {
            marks.push(Mark::Fill {
                x: left,
                y: top,
                w: width,
                h: theme.row_height,
                color: theme.band_fill,
            });
        }
        let band = RowBand {
            top,
            height: theme.row_height,
            bold: false,
            color: theme.text,
        };
        for (col, value) in slice.columns.iter().zip(row) {
            marks.push(cell(theme, col, &band, value));
        }
        top += theme.row_height;
    }

    marks.push(Mark::Rule {
        x1: left,
        x2: left + width,
        y: top,
        width: 0.3,
        color: theme.rule,
    });
    marks
}

pub fn kpi_grid(theme: &Theme, y: f32, grid: &KpiGrid) -> Vec<Mark> {
    let mut marks = Vec::new();
    let card_w = theme.kpi_card_width();
    let card_h = theme.kpi_row_height - theme.kpi_gutter;

    for (i, card) in grid.cards.iter().enumerate() {
        let (x, dy) = grid.cell_origin(i, theme);
        let top = y + dy;
        let tint = theme.role(card.role);
        marks.push(Mark::Fill {
            x,
            y: top,
            w: card_w,
            h: card_h,
            color: theme.card_fill,
        });
        marks.push(Mark::Fill {
            x,
            y: top,
            w: 1.2,
            h: card_h,
            color: tint,
        });
        let inner_x = x + 4.0;
        let inner_w = card_w - 6.0;
        marks.push(text(
            inner_x,
            top + 6.0,
            theme.small_size,
            false,
            theme.muted,
            &clip_to_width(&card.label.to_uppercase(), inner_w, theme.small_size, theme),
        ));
        marks.push(text(
            inner_x,
            top + 14.0,
            theme.kpi_value_size,
            true,
            tint,
            &clip_to_width(&card.value, inner_w, theme.kpi_value_size, theme),
        ));
        if let Some(sub) = &card.sub_label {
            marks.push(text(
                inner_x,
                top + 19.0,
                theme.small_size,
                false,
                theme.muted,
                &clip_to_width(sub, inner_w, theme.small_size, theme),
            ));
        }
    }
    marks
}

pub fn paragraph(theme: &Theme, y: f32, body: &str) -> Vec<Mark> {
    vec![text(
        theme.margin,
        baseline(y, theme.paragraph_height, theme.body_size),
        theme.body_size,
        false,
        theme.muted,
        body,
    )]
}

/// Running header and footer for one page.
pub fn header_footer(theme: &Theme, stamp: &PageStamp) -> Vec<Mark> {
    let left = theme.margin;
    let right = theme.page_width - theme.margin;
    let title_base = theme.margin + theme.title_size * PT_TO_MM;
    let subtitle_base = title_base + 7.0;
    let header_rule = subtitle_base + 4.0;
    let footer_rule = theme.page_height - theme.footer_height + 6.0;
    let footer_base = footer_rule + 5.0;

    vec![
        text(left, title_base, theme.title_size, true, theme.primary, &stamp.title),
        text(
            left,
            subtitle_base,
            theme.subtitle_size,
            false,
            theme.muted,
            &stamp.subtitle,
        ),
        Mark::Rule {
            x1: left,
            x2: right,
            y: header_rule,
            width: 0.5,
            color: theme.rule,
        },
        Mark::Rule {
            x1: left,
            x2: right,
            y: footer_rule,
            width: 0.3,
            color: theme.rule,
        },
        text(
            left,
            footer_base,
            theme.small_size,
            false,
            theme.muted,
            &stamp.notice,
        ),
        text(
            right - theme.text_width(&stamp.page_label, theme.small_size),
            footer_base,
            theme.small_size,
            false,
            theme.muted,
            &stamp.page_label,
        ),
    ]
}
