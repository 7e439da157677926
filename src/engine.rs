use chrono::{DateTime, Local};

use crate::backend::{self, BackendKind};
use crate::error::Result;
use crate::fmt::{iso_date, timestamp, NumberFormat};
use crate::models::{DateRange, RenderedDocument, ReportPayload, ReportType};
use crate::reports::build_pages;
use crate::settings::Settings;
use crate::stamp::StampContext;
use crate::theme::Theme;

/// Everything a generation needs besides the payload. Built per call.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub backend: BackendKind,
    pub generated_at: DateTime<Local>,
    pub title: String,
    pub notice: String,
    pub theme: Theme,
    pub number: NumberFormat,
}

impl GenerateOptions {
    pub fn from_settings(settings: &Settings, report_type: ReportType) -> Self {
        Self {
            backend: settings.backends.for_report(report_type),
            generated_at: Local::now(),
            title: settings.document_title.clone(),
            notice: settings.confidentiality_notice.clone(),
            theme: settings.theme.clone(),
            number: settings.number.clone(),
        }
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            generated_at: Local::now(),
            title: "MDA Management Portal".to_string(),
            notice: "Confidential - for internal use only".to_string(),
            theme: Theme::default(),
            number: NumberFormat::default(),
        }
    }
}

/// `report-{type}-{YYYY-MM-DD}.pdf`
pub fn filename(report_type: ReportType, at: &DateTime<Local>) -> String {
    format!("report-{}-{}.pdf", report_type.slug(), iso_date(at))
}

/// Lay out `payload`, stamp every page and serialize with the configured
/// backend. Nothing is drawn when the backend cannot be created.
pub fn generate_report_document(
    payload: &ReportPayload,
    range: Option<&DateRange>,
    opts: &GenerateOptions,
) -> Result<RenderedDocument> {
    let report_type = payload.report_type();
    let backend = backend::create(opts.backend, &opts.theme, &opts.title, &opts.generated_at)?;

    let pages = build_pages(payload, &opts.theme, &opts.number);
    let ctx = StampContext {
        title: &opts.title,
        generated_at: timestamp(&opts.generated_at),
        report_label: Some(report_type.title()),
        range,
        notice: &opts.notice,
    };
    let bytes = backend::stamp_and_serialize(&pages, &ctx, backend)?;

    tracing::info!(
        report = %report_type,
        backend = %opts.backend,
        pages = pages.len(),
        bytes = bytes.len(),
        "report generated"
    );
    Ok(RenderedDocument {
        bytes,
        filename: filename(report_type, &opts.generated_at),
        page_count: pages.len(),
    })
}
