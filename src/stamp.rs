use crate::models::DateRange;

const SEPARATOR: &str = " \u{b7} ";

/// Everything the header/footer needs apart from the page number.
#[derive(Debug, Clone)]
pub struct StampContext<'a> {
    pub title: &'a str,
    pub generated_at: String,
    pub report_label: Option<&'a str>,
    pub range: Option<&'a DateRange>,
    pub notice: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStamp {
    pub title: String,
    pub subtitle: String,
    pub notice: String,
    pub page_label: String,
}

/// "Generated on {ts}" joined with the report label and range when present.
pub fn subtitle(generated_at: &str, report_label: Option<&str>, range: Option<&DateRange>) -> String {
    let mut parts = vec![format!("Generated on {generated_at}")];
    if let Some(label) = report_label.filter(|l| !l.trim().is_empty()) {
        parts.push(label.to_string());
    }
    if let Some(range) = range {
        parts.push(range.to_string());
    }
    parts.join(SEPARATOR)
}

pub fn page_label(page: usize, total: usize) -> String {
    format!("Page {page} of {total}")
}

impl StampContext<'_> {
    pub fn stamp(&self, page: usize, total: usize) -> PageStamp {
        PageStamp {
            title: self.title.to_string(),
            subtitle: subtitle(&self.generated_at, self.report_label, self.range),
            notice: self.notice.to_string(),
            page_label: page_label(page, total),
        }
    }
}

/// Stamps for a finished document of `total` pages, 1-based labels.
pub fn stamps(ctx: &StampContext<'_>, total: usize) -> Vec<PageStamp> {
    (1..=total).map(|page| ctx.stamp(page, total)).collect()
}
