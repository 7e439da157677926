use serde::{Deserialize, Serialize};

/// 8-bit RGB color as stored in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const WHITE: Color = Color(255, 255, 255);

    pub fn unit(self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

/// Color role of a KPI card or section accent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRole {
    Primary,
    Secondary,
    Accent,
}

/// Immutable page geometry, typography and palette. All lengths are mm,
/// font sizes are pt. Both backends measure through this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// Top of the content band; the header is stamped above it.
    pub content_top: f32,
    /// Distance from the page bottom reserved for the footer.
    pub footer_height: f32,

    pub title_size: f32,
    pub subtitle_size: f32,
    pub section_title_size: f32,
    pub body_size: f32,
    pub small_size: f32,
    pub kpi_value_size: f32,

    pub section_title_height: f32,
    pub table_header_height: f32,
    pub row_height: f32,
    pub cell_padding: f32,
    pub block_gap: f32,
    pub paragraph_height: f32,
    pub kpi_columns: usize,
    pub kpi_row_height: f32,
    pub kpi_gutter: f32,

    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub header_fill: Color,
    pub band_fill: Color,
    pub card_fill: Color,
    pub rule: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 14.0,
            content_top: 38.0,
            footer_height: 20.0,

            title_size: 16.0,
            subtitle_size: 9.0,
            section_title_size: 12.0,
            body_size: 9.0,
            small_size: 7.0,
            kpi_value_size: 16.0,

            section_title_height: 10.0,
            table_header_height: 8.0,
            row_height: 7.0,
            cell_padding: 2.0,
            block_gap: 8.0,
            paragraph_height: 10.0,
            kpi_columns: 3,
            kpi_row_height: 26.0,
            kpi_gutter: 4.0,

            primary: Color(22, 101, 52),
            secondary: Color(37, 99, 235),
            accent: Color(217, 119, 6),
            text: Color(31, 41, 55),
            muted: Color(107, 114, 128),
            header_fill: Color(22, 101, 52),
            band_fill: Color(243, 244, 246),
            card_fill: Color(249, 250, 251),
            rule: Color(209, 213, 219),
        }
    }
}

impl Theme {
    pub fn role(&self, role: ColorRole) -> Color {
        match role {
            ColorRole::Primary => self.primary,
            ColorRole::Secondary => self.secondary,
            ColorRole::Accent => self.accent,
        }
    }

    pub fn content_bottom(&self) -> f32 {
        self.page_height - self.footer_height
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn kpi_columns(&self) -> usize {
        self.kpi_columns.max(1)
    }

    pub fn kpi_card_width(&self) -> f32 {
        let cols = self.kpi_columns() as f32;
        (self.content_width() - self.kpi_gutter * (cols - 1.0)) / cols
    }

    /// Approximate Helvetica advance width, in mm, of `text` at `size` pt.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.18
    }
}
