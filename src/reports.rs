use crate::fmt::{compact_money, money, number, percent, share_of, NumberFormat};
use crate::layout::kpi::{render_kpi_grid, KpiCard};
use crate::layout::section::render_section;
use crate::layout::table::{ColumnSpec, TableSpec};
use crate::layout::{Composer, PageSequence};
use crate::models::{
    FinancialData, NameCount, OverviewData, ProjectsData, ReportPayload, UsersData,
};
use crate::theme::{ColorRole, Theme};

pub const NO_OVERVIEW_DATA: &str = "No overview data available for the selected period.";
pub const NO_FINANCIAL_DATA: &str = "No financial data available for the selected period.";
pub const NO_PROJECT_DATA: &str = "No project data available for the selected period.";
pub const NO_USER_DATA: &str = "No user data available for the selected period.";

const COUNT_W: f32 = 28.0;
const SHARE_W: f32 = 24.0;
const MONEY_W: f32 = 40.0;

/// Content pass: lay out every block for `payload` onto pages.
pub fn build_pages(payload: &ReportPayload, theme: &Theme, nf: &NumberFormat) -> PageSequence {
    let mut c = Composer::new(theme);
    match payload {
        ReportPayload::Overview(data) => overview(&mut c, data, nf),
        ReportPayload::Financial(data) => financial(&mut c, data, nf),
        ReportPayload::Projects(data) => projects(&mut c, data, nf),
        ReportPayload::Users(data) => users(&mut c, data, nf),
    }
    let pages = c.finish();
    tracing::debug!(
        report = %payload.report_type(),
        pages = pages.len(),
        "page plan built"
    );
    pages
}

/// Name / count / share table over a breakdown.
fn breakdown_table<'a>(
    label: &str,
    count_label: &str,
    items: impl Iterator<Item = (&'a str, f64)> + Clone,
    nf: &NumberFormat,
) -> TableSpec {
    let total: f64 = items.clone().map(|(_, v)| v).sum();
    TableSpec {
        columns: vec![
            ColumnSpec::text(label),
            ColumnSpec::numeric(count_label, COUNT_W),
            ColumnSpec::numeric("Share", SHARE_W),
        ],
        rows: items
            .map(|(name, v)| vec![name.to_string(), number(v, nf), share_of(v, total)])
            .collect(),
    }
}

fn counts(items: &[NameCount]) -> impl Iterator<Item = (&str, f64)> + Clone {
    items.iter().map(|i| (i.name.as_str(), i.count as f64))
}

fn overview(c: &mut Composer<'_>, d: &OverviewData, nf: &NumberFormat) {
    if d.users_by_role.is_empty() && d.projects_by_status.is_empty() && d.mda_counts.is_empty() {
        c.paragraph(NO_OVERVIEW_DATA);
        return;
    }
    let theme = c.theme();

    render_kpi_grid(
        c,
        vec![
            KpiCard::new("Total Users", number(d.total_users as f64, nf), ColorRole::Primary)
                .with_sub_label(format!("{} active", number(d.active_users as f64, nf))),
            KpiCard::new("Active Users", number(d.active_users as f64, nf), ColorRole::Secondary)
                .with_sub_label(percent(d.active_users as f64, d.total_users as f64)),
            KpiCard::new("Total Projects", number(d.total_projects as f64, nf), ColorRole::Accent),
            KpiCard::new("Total MDAs", number(d.total_mdas as f64, nf), ColorRole::Primary)
                .with_sub_label(format!("{} active", number(d.active_mdas as f64, nf))),
            KpiCard::new("Total Budget", compact_money(d.total_budget, nf), ColorRole::Secondary)
                .with_sub_label(format!("Expenditure {}", compact_money(d.total_expenditure, nf))),
            KpiCard::new("Total Revenue", compact_money(d.total_revenue, nf), ColorRole::Accent)
                .with_sub_label(format!(
                    "Net {}",
                    compact_money(d.total_revenue - d.total_expenditure, nf)
                )),
        ],
    );

    if !d.users_by_role.is_empty() {
        let rows = d.users_by_role.iter().map(|(k, v)| (k.as_str(), *v as f64));
        render_section(c, "Users by Role", theme.primary, &breakdown_table("Role", "Users", rows, nf));
    }
    if !d.projects_by_status.is_empty() {
        let rows = d.projects_by_status.iter().map(|(k, v)| (k.as_str(), *v as f64));
        render_section(
            c,
            "Projects by Status",
            theme.secondary,
            &breakdown_table("Status", "Projects", rows, nf),
        );
    }
    if !d.mda_counts.is_empty() {
        render_section(
            c,
            "Projects by MDA",
            theme.accent,
            &breakdown_table("MDA", "Projects", counts(&d.mda_counts), nf),
        );
    }
}

fn financial(c: &mut Composer<'_>, d: &FinancialData, nf: &NumberFormat) {
    if d.budget_by_mda.is_empty() && d.revenue_trend.is_empty() && d.expenditure_by_recipient.is_empty() {
        c.paragraph(NO_FINANCIAL_DATA);
        return;
    }
    let theme = c.theme();

    if !d.budget_by_mda.is_empty() {
        let table = TableSpec {
            columns: vec![
                ColumnSpec::text("MDA"),
                ColumnSpec::numeric("Budget", MONEY_W),
                ColumnSpec::numeric("Expenditure", MONEY_W),
                ColumnSpec::numeric("Utilization", SHARE_W),
            ],
            rows: d
                .budget_by_mda
                .iter()
                .map(|r| {
                    vec![
                        r.name.clone(),
                        money(r.budget, nf),
                        money(r.expenditure, nf),
                        percent(r.expenditure, r.budget),
                    ]
                })
                .collect(),
        };
        render_section(c, "Budget vs Expenditure by MDA", theme.primary, &table);
    }

    if !d.revenue_trend.is_empty() {
        let table = TableSpec {
            columns: vec![
                ColumnSpec::text("Period"),
                ColumnSpec::numeric("Revenue", MONEY_W),
                ColumnSpec::numeric("Expenditure", MONEY_W),
                ColumnSpec::numeric("Net", MONEY_W),
            ],
            rows: d
                .revenue_trend
                .iter()
                .map(|p| {
                    vec![
                        p.period.clone(),
                        money(p.revenue, nf),
                        money(p.expenditure, nf),
                        money(p.revenue - p.expenditure, nf),
                    ]
                })
                .collect(),
        };
        render_section(c, "Revenue Trend", theme.secondary, &table);
    }

    if !d.expenditure_by_recipient.is_empty() {
        let total: f64 = d.expenditure_by_recipient.iter().map(|r| r.value).sum();
        let table = TableSpec {
            columns: vec![
                ColumnSpec::text("Recipient"),
                ColumnSpec::numeric("Amount", MONEY_W),
                ColumnSpec::numeric("Share", SHARE_W),
            ],
            rows: d
                .expenditure_by_recipient
                .iter()
                .map(|r| vec![r.name.clone(), money(r.value, nf), share_of(r.value, total)])
                .collect(),
        };
        render_section(c, "Expenditure by Recipient", theme.accent, &table);
    }
}

fn projects(c: &mut Composer<'_>, d: &ProjectsData, nf: &NumberFormat) {
    if d.by_status.is_empty() && d.by_category.is_empty() && d.by_mda.is_empty() {
        c.paragraph(NO_PROJECT_DATA);
        return;
    }
    let theme = c.theme();

    let sections = [
        ("Projects by Status", "Status", theme.primary, &d.by_status),
        ("Projects by Category", "Category", theme.secondary, &d.by_category),
        ("Projects by MDA", "MDA", theme.accent, &d.by_mda),
    ];
    for (title, label, accent, items) in sections {
        if !items.is_empty() {
            render_section(c, title, accent, &breakdown_table(label, "Projects", counts(items), nf));
        }
    }
}

fn users(c: &mut Composer<'_>, d: &UsersData, nf: &NumberFormat) {
    if d.by_role.is_empty() {
        c.paragraph(NO_USER_DATA);
        return;
    }
    let theme = c.theme();
    let inactive = d.total_users.saturating_sub(d.active_users);

    render_kpi_grid(
        c,
        vec![
            KpiCard::new("Total Users", number(d.total_users as f64, nf), ColorRole::Primary)
                .with_sub_label(format!("{} inactive", number(inactive as f64, nf))),
            KpiCard::new("Active Users", number(d.active_users as f64, nf), ColorRole::Secondary)
                .with_sub_label(percent(d.active_users as f64, d.total_users as f64)),
        ],
    );

    let rows = d.by_role.iter().map(|r| (r.name.as_str(), r.value));
    render_section(c, "Users by Role", theme.primary, &breakdown_table("Role", "Users", rows, nf));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::kpi::KpiGrid;
    use crate::layout::table::TableSlice;
    use crate::layout::Block;
    use crate::models::{MdaBudget, NameValue, TrendPoint};

    fn build(payload: &ReportPayload) -> PageSequence {
        build_pages(payload, &Theme::default(), &NumberFormat::default())
    }

    fn titles(pages: &PageSequence) -> Vec<String> {
        pages
            .blocks()
            .filter_map(|(_, p)| match &p.block {
                Block::SectionTitle { title, .. } => Some(title.clone()),
                _ => None,
            })
            .collect()
    }

    fn tables(pages: &PageSequence) -> Vec<&TableSlice> {
        pages
            .blocks()
            .filter_map(|(_, p)| match &p.block {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn kpis(pages: &PageSequence) -> Vec<&KpiGrid> {
        pages
            .blocks()
            .filter_map(|(_, p)| match &p.block {
                Block::KpiGrid(g) => Some(g),
                _ => None,
            })
            .collect()
    }

    fn only_fallback(pages: &PageSequence, text: &str) {
        assert_eq!(pages.len(), 1);
        let blocks = &pages.pages()[0].blocks;
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block, Block::Paragraph(text.to_string()));
    }

    fn nc(name: &str, count: u64) -> NameCount {
        NameCount {
            name: name.into(),
            count,
        }
    }

    #[test]
    fn test_empty_payloads_render_only_fallback() {
        only_fallback(&build(&ReportPayload::Overview(OverviewData::default())), NO_OVERVIEW_DATA);
        only_fallback(&build(&ReportPayload::Financial(FinancialData::default())), NO_FINANCIAL_DATA);
        only_fallback(&build(&ReportPayload::Projects(ProjectsData::default())), NO_PROJECT_DATA);
        only_fallback(
            &build(&ReportPayload::Users(UsersData {
                total_users: 9,
                active_users: 4,
                by_role: vec![],
            })),
            NO_USER_DATA,
        );
    }

    #[test]
    fn test_financial_fallback_text() {
        let pages = build(&ReportPayload::Financial(FinancialData::default()));
        only_fallback(&pages, "No financial data available for the selected period.");
        assert!(tables(&pages).is_empty());
    }

    #[test]
    fn test_overview_scenario() {
        let mut data = OverviewData {
            total_users: 42,
            active_users: 30,
            ..OverviewData::default()
        };
        data.users_by_role.insert("Admin".into(), 2);
        data.users_by_role.insert("Vendor".into(), 5);
        data.projects_by_status.insert("Completed".into(), 10);
        data.projects_by_status.insert("InProgress".into(), 3);
        let pages = build(&ReportPayload::Overview(data));

        let grids = kpis(&pages);
        assert_eq!(grids.len(), 1);
        let columns = grids[0].columns;
        let values: Vec<&str> = grids[0].cards[..columns].iter().map(|c| c.value.as_str()).collect();
        assert!(values.contains(&"42"));
        assert!(values.contains(&"30"));

        assert_eq!(titles(&pages), vec!["Users by Role", "Projects by Status"]);
        let t = tables(&pages);
        assert_eq!(t.len(), 2);
        assert_eq!(t[0].rows.len(), 2);
        assert_eq!(t[0].rows[0][0], "Admin");
        assert_eq!(t[1].rows.len(), 2);
        assert!(!titles(&pages).iter().any(|s| s == "Projects by MDA"));
    }

    #[test]
    fn test_overview_grid_has_two_rows() {
        let mut data = OverviewData::default();
        data.mda_counts.push(nc("Works", 4));
        let pages = build(&ReportPayload::Overview(data));
        assert_eq!(kpis(&pages)[0].rows(), 2);
        assert_eq!(titles(&pages), vec!["Projects by MDA"]);
    }

    #[test]
    fn test_financial_sections_in_order() {
        let data = FinancialData {
            budget_by_mda: vec![MdaBudget {
                name: "Health".into(),
                budget: 1000.0,
                expenditure: 250.0,
            }],
            revenue_trend: vec![TrendPoint {
                period: "2026-01".into(),
                revenue: 500.0,
                expenditure: 700.0,
            }],
            expenditure_by_recipient: vec![NameValue {
                name: "Acme Ltd".into(),
                value: 250.0,
            }],
        };
        let pages = build(&ReportPayload::Financial(data));
        assert_eq!(
            titles(&pages),
            vec!["Budget vs Expenditure by MDA", "Revenue Trend", "Expenditure by Recipient"]
        );
        let t = tables(&pages);
        assert_eq!(t[0].rows[0][3], "25%");
        assert_eq!(t[1].rows[0][3], "-NGN 200.00");
        assert_eq!(t[2].rows[0][2], "100.0%");
        assert!(kpis(&pages).is_empty());
    }

    #[test]
    fn test_financial_skips_empty_sequences() {
        let data = FinancialData {
            revenue_trend: vec![TrendPoint {
                period: "Q1".into(),
                revenue: 1.0,
                expenditure: 0.0,
            }],
            ..FinancialData::default()
        };
        let pages = build(&ReportPayload::Financial(data));
        assert_eq!(titles(&pages), vec!["Revenue Trend"]);
    }

    #[test]
    fn test_projects_sections() {
        let data = ProjectsData {
            by_status: vec![nc("Completed", 3), nc("Ongoing", 1)],
            by_category: vec![],
            by_mda: vec![nc("Works", 4)],
        };
        let pages = build(&ReportPayload::Projects(data));
        assert_eq!(titles(&pages), vec!["Projects by Status", "Projects by MDA"]);
        let t = tables(&pages);
        assert_eq!(t[0].rows[0], vec!["Completed", "3", "75.0%"]);
    }

    #[test]
    fn test_users_percentage_with_zero_total() {
        let data = UsersData {
            total_users: 0,
            active_users: 0,
            by_role: vec![NameValue {
                name: "Contractor".into(),
                value: 12.0,
            }],
        };
        let pages = build(&ReportPayload::Users(data));
        let grid = kpis(&pages)[0];
        assert_eq!(grid.cards.len(), 2);
        let active = &grid.cards[1];
        assert_eq!(active.label, "Active Users");
        assert_eq!(active.sub_label.as_deref(), Some("0%"));
        assert_eq!(tables(&pages)[0].rows[0][0], "Contractor");
    }

    #[test]
    fn test_users_percentage_rounds() {
        let data = UsersData {
            total_users: 42,
            active_users: 30,
            by_role: vec![NameValue {
                name: "Admin".into(),
                value: 42.0,
            }],
        };
        let pages = build(&ReportPayload::Users(data));
        assert_eq!(kpis(&pages)[0].cards[1].sub_label.as_deref(), Some("71%"));
    }

    #[test]
    fn test_many_mdas_flow_onto_more_pages() {
        let data = ProjectsData {
            by_mda: (0..120).map(|i| nc(&format!("MDA {i}"), i)).collect(),
            ..ProjectsData::default()
        };
        let pages = build(&ReportPayload::Projects(data));
        assert!(pages.len() >= 4);
        let rows: usize = tables(&pages).iter().map(|t| t.rows.len()).sum();
        assert_eq!(rows, 120);
        for (page, t) in pages.blocks().filter_map(|(i, p)| match &p.block {
            Block::Table(t) => Some((i, t)),
            _ => None,
        }) {
            assert_eq!(t.continued, page > 0);
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let data = ProjectsData {
            by_status: vec![nc("Completed", 3)],
            by_category: vec![nc("Roads", 2)],
            by_mda: vec![nc("Works", 4)],
        };
        let payload = ReportPayload::Projects(data);
        assert_eq!(build(&payload), build(&payload));
    }
}
