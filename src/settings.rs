use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::error::{ReportError, Result};
use crate::fmt::NumberFormat;
use crate::models::ReportType;
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_output_dir_setting")]
    pub output_dir: String,
    #[serde(default = "default_document_title")]
    pub document_title: String,
    #[serde(default = "default_notice")]
    pub confidentiality_notice: String,
    #[serde(default)]
    pub number: NumberFormat,
    #[serde(default)]
    pub backends: BackendSettings,
    #[serde(default)]
    pub theme: Theme,
}

/// Which backend renders each report; reports not listed use `default`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub default: BackendKind,
    #[serde(default)]
    pub per_report: IndexMap<ReportType, BackendKind>,
}

impl BackendSettings {
    pub fn for_report(&self, report_type: ReportType) -> BackendKind {
        self.per_report
            .get(&report_type)
            .copied()
            .unwrap_or(self.default)
    }
}

fn default_document_title() -> String {
    "MDA Management Portal".to_string()
}

fn default_notice() -> String {
    "Confidential - for internal use only".to_string()
}

fn default_output_dir_setting() -> String {
    default_output_dir().to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir_setting(),
            document_title: default_document_title(),
            confidentiality_notice: default_notice(),
            number: NumberFormat::default(),
            backends: BackendSettings::default(),
            theme: Theme::default(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("mda-reports")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_output_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("mda-reports")
}

/// Missing file means defaults. A file that does not parse is reported and
/// ignored so a bad edit never blocks an export.
pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ReportError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn get_output_dir() -> PathBuf {
    PathBuf::from(expand_home(&load_settings().output_dir))
}

pub fn expand_home(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
