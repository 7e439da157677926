use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::backend::BackendKind;
use crate::engine::{generate_report_document, GenerateOptions};
use crate::models::DateRange;
use crate::settings::{get_output_dir, load_settings};

fn default_path(filename: &str) -> PathBuf {
    get_output_dir().join(filename)
}

/// Write to a sibling `.part` file and rename, so a failed write never
/// leaves a truncated PDF behind.
fn write_pdf(bytes: &[u8], path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);
    let written = std::fs::write(&part, bytes).and_then(|_| std::fs::rename(&part, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&part);
        return Err(e).with_context(|| format!("writing {}", path.display()));
    }
    Ok(())
}

pub fn run(
    report_type: &str,
    data: &str,
    from_date: Option<String>,
    to_date: Option<String>,
    backend: Option<String>,
    output: Option<String>,
) -> anyhow::Result<()> {
    let payload = super::load_payload(report_type, data)?;
    let settings = load_settings();

    let mut opts = GenerateOptions::from_settings(&settings, payload.report_type());
    if let Some(name) = backend {
        opts.backend = name.parse::<BackendKind>()?;
    }
    let range = match (from_date, to_date) {
        (Some(start_date), Some(end_date)) => Some(DateRange {
            start_date,
            end_date,
        }),
        _ => None,
    };

    let doc = generate_report_document(&payload, range.as_ref(), &opts)?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&doc.filename));
    write_pdf(&doc.bytes, &path)?;

    let pages = if doc.page_count == 1 { "page" } else { "pages" };
    println!("Wrote {} ({} {pages})", path.display(), doc.page_count);
    Ok(())
}
