use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::layout::PageSequence;
use crate::reports::build_pages;
use crate::settings::load_settings;

pub fn run(report_type: &str, data: &str) -> anyhow::Result<()> {
    let payload = super::load_payload(report_type, data)?;
    let settings = load_settings();
    let pages = build_pages(&payload, &settings.theme, &settings.number);

    println!(
        "{} {}",
        payload.report_type().title().bold(),
        format!("({} pages)", pages.len()).dimmed()
    );
    println!("{}", plan_table(&pages));
    Ok(())
}

fn plan_table(pages: &PageSequence) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Page", "Y (mm)", "Block"]);
    for (index, placed) in pages.blocks() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(format!("{:.1}", placed.y)),
            Cell::new(placed.block.describe()),
        ]);
    }
    table
}
