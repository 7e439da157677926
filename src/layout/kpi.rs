use crate::layout::{Block, Composer};
use crate::theme::{ColorRole, Theme};

#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub label: String,
    pub value: String,
    pub sub_label: Option<String>,
    pub role: ColorRole,
}

impl KpiCard {
    pub fn new(label: &str, value: String, role: ColorRole) -> Self {
        Self {
            label: label.to_string(),
            value,
            sub_label: None,
            role,
        }
    }

    pub fn with_sub_label(mut self, sub: String) -> Self {
        self.sub_label = Some(sub);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpiGrid {
    pub cards: Vec<KpiCard>,
    pub columns: usize,
}

impl KpiGrid {
    pub fn new(cards: Vec<KpiCard>, theme: &Theme) -> Self {
        Self {
            cards,
            columns: theme.kpi_columns(),
        }
    }

    pub fn rows(&self) -> usize {
        self.cards.len().div_ceil(self.columns.max(1))
    }

    pub fn height(&self, theme: &Theme) -> f32 {
        self.rows() as f32 * theme.kpi_row_height
    }

    /// Top-left corner of card `index` relative to the grid origin.
    pub fn cell_origin(&self, index: usize, theme: &Theme) -> (f32, f32) {
        let cols = self.columns.max(1);
        let col = index % cols;
        let row = index / cols;
        (
            theme.margin + col as f32 * (theme.kpi_card_width() + theme.kpi_gutter),
            row as f32 * theme.kpi_row_height,
        )
    }
}

/// Place a KPI grid as one atomic block. Returns the height placed.
pub fn render_kpi_grid(c: &mut Composer<'_>, cards: Vec<KpiCard>) -> f32 {
    let grid = KpiGrid::new(cards, c.theme());
    c.ensure_space(grid.height(c.theme()));
    let h = c.place(Block::KpiGrid(grid));
    c.gap();
    h
}
