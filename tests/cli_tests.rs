use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const OVERVIEW: &str = r#"{
    "totalUsers": 42, "activeUsers": 30, "totalMDAs": 7, "activeMDAs": 6,
    "totalProjects": 13, "totalBudget": 2500000, "totalRevenue": 900000,
    "totalExpenditure": 1200000,
    "usersByRole": {"Admin": 2, "Vendor": 40},
    "projectsByStatus": {"Completed": 10, "InProgress": 3},
    "mdaCounts": []
}"#;

fn reports_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mda-reports"));
    cmd.env("HOME", home.path()).env_remove("MDA_REPORTS_LOG");
    cmd
}

fn write_payload(dir: &TempDir, name: &str, body: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();
    reports_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("plan"));
}

#[test]
fn test_export_writes_pdf_to_output() {
    let home = TempDir::new().unwrap();
    let data = write_payload(&home, "overview.json", OVERVIEW);
    let out = home.path().join("out").join("overview.pdf");

    reports_cmd(&home)
        .args(["export", "overview", "--data", &data, "--output", out.to_str().unwrap()])
        .args(["--from", "2026-01-01", "--to", "2026-06-30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(!home.path().join("out").join("overview.pdf.part").exists());
}

#[test]
fn test_export_defaults_to_output_dir_and_dated_filename() {
    let home = TempDir::new().unwrap();
    let data = write_payload(&home, "users.json", r#"{"totalUsers": 0, "activeUsers": 0, "byRole": []}"#);

    reports_cmd(&home)
        .args(["export", "users", "--data", &data, "--backend", "declarative"])
        .assert()
        .success()
        .stdout(predicate::str::contains("report-users-"))
        .stdout(predicate::str::contains("(1 page)"));

    let dir = home.path().join("Documents").join("mda-reports");
    let written: Vec<_> = fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("report-users-"));
    assert!(written[0].ends_with(".pdf"));

    let bytes = fs::read(dir.join(&written[0])).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("No user data available for the selected period."));
    assert!(text.contains("(Page 1 of 1)"));
}

#[test]
fn test_export_reads_tagged_payload_from_stdin() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("financial.pdf");

    reports_cmd(&home)
        .args(["export", "financial", "--data", "-", "--backend", "declarative"])
        .args(["--output", out.to_str().unwrap()])
        .write_stdin(r#"{"type": "financial", "data": {"budgetByMda": null}}"#)
        .assert()
        .success();

    let text = String::from_utf8_lossy(&fs::read(&out).unwrap()).to_string();
    assert!(text.contains("No financial data available for the selected period."));
}

#[test]
fn test_unknown_report_type_is_a_configuration_error() {
    let home = TempDir::new().unwrap();
    let data = write_payload(&home, "x.json", "{}");
    let out = home.path().join("budget.pdf");

    reports_cmd(&home)
        .args(["export", "budget", "--data", &data, "--output", out.to_str().unwrap()])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Unknown report type 'budget'"));

    assert!(!out.exists());
}

#[test]
fn test_mismatched_payload_tag_is_rejected() {
    let home = TempDir::new().unwrap();
    let data = write_payload(&home, "p.json", r#"{"type": "users", "data": {}}"#);
    let out = home.path().join("projects.pdf");

    reports_cmd(&home)
        .args(["export", "projects", "--data", &data, "--output", out.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("tagged 'users'"));

    assert!(!out.exists());
}

#[test]
fn test_unknown_backend_is_rejected() {
    let home = TempDir::new().unwrap();
    let data = write_payload(&home, "o.json", OVERVIEW);
    let out = home.path().join("o.pdf");

    reports_cmd(&home)
        .args(["export", "overview", "--data", &data, "--backend", "latex"])
        .args(["--output", out.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown backend 'latex'"));

    assert!(!out.exists());
}

#[test]
fn test_invalid_json_fails() {
    let home = TempDir::new().unwrap();
    let data = write_payload(&home, "bad.json", "{not json");

    reports_cmd(&home)
        .args(["export", "overview", "--data", &data])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid payload"));
}

#[test]
fn test_plan_prints_page_table() {
    let home = TempDir::new().unwrap();
    let data = write_payload(&home, "overview.json", OVERVIEW);

    reports_cmd(&home)
        .args(["plan", "overview", "--data", &data])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overview Report"))
        .stdout(predicate::str::contains("kpi grid 6 cards in 2 rows"))
        .stdout(predicate::str::contains("section  Users by Role"))
        .stdout(predicate::str::contains("Projects by MDA").not());
}

#[test]
fn test_init_writes_settings_once() {
    let home = TempDir::new().unwrap();
    let settings = home.path().join(".config").join("mda-reports").join("settings.json");

    reports_cmd(&home).arg("init").assert().success();
    assert!(settings.exists());
    let json = fs::read_to_string(&settings).unwrap();
    assert!(json.contains("MDA Management Portal"));

    reports_cmd(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_settings_choose_backend_per_report() {
    let home = TempDir::new().unwrap();
    let config = home.path().join(".config").join("mda-reports");
    fs::create_dir_all(&config).unwrap();
    fs::write(
        config.join("settings.json"),
        r#"{"output_dir": "~/exports", "document_title": "Ministry Dashboard",
            "backends": {"default": "imperative", "per_report": {"projects": "declarative"}}}"#,
    )
    .unwrap();
    let data = write_payload(&home, "p.json", "{}");

    reports_cmd(&home)
        .args(["export", "projects", "--data", &data])
        .assert()
        .success();

    let dir = home.path().join("exports");
    let entry = fs::read_dir(&dir).unwrap().next().unwrap().unwrap();
    let text = String::from_utf8_lossy(&fs::read(entry.path()).unwrap()).to_string();
    assert!(text.contains("(Ministry Dashboard)"));
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    reports_cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mda-reports"));
}
