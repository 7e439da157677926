use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Overview,
    Financial,
    Projects,
    Users,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::Overview,
        ReportType::Financial,
        ReportType::Projects,
        ReportType::Users,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ReportType::Overview => "overview",
            ReportType::Financial => "financial",
            ReportType::Projects => "projects",
            ReportType::Users => "users",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportType::Overview => "Overview Report",
            ReportType::Financial => "Financial Report",
            ReportType::Projects => "Projects Report",
            ReportType::Users => "Users Report",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ReportType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        ReportType::ALL
            .into_iter()
            .find(|t| t.slug() == key)
            .ok_or_else(|| ReportError::UnknownReportType(s.to_string()))
    }
}

/// Fields degrade to their default when missing, null or malformed.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(T::default());
    }
    match serde_json::from_value(raw) {
        Ok(v) => Ok(v),
        Err(e) => {
            tracing::warn!("ignoring malformed payload field: {e}");
            Ok(T::default())
        }
    }
}

/// Whole-number totals also accept float spellings such as `42.0`; anything
/// else non-numeric counts as zero.
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    if let Some(n) = raw.as_u64() {
        return Ok(n);
    }
    match raw.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 => Ok(f.round() as u64),
        _ => {
            if !raw.is_null() {
                tracing::warn!("ignoring malformed payload count: {raw}");
            }
            Ok(0)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdaBudget {
    pub name: String,
    pub budget: f64,
    pub expenditure: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendPoint {
    pub period: String,
    pub revenue: f64,
    pub expenditure: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverviewData {
    #[serde(deserialize_with = "lenient_count")]
    pub total_users: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub active_users: u64,
    #[serde(rename = "totalMDAs", deserialize_with = "lenient_count")]
    pub total_mdas: u64,
    #[serde(rename = "activeMDAs", deserialize_with = "lenient_count")]
    pub active_mdas: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub total_projects: u64,
    #[serde(deserialize_with = "lenient")]
    pub total_budget: f64,
    #[serde(deserialize_with = "lenient")]
    pub total_revenue: f64,
    #[serde(deserialize_with = "lenient")]
    pub total_expenditure: f64,
    #[serde(deserialize_with = "lenient")]
    pub users_by_role: IndexMap<String, u64>,
    #[serde(deserialize_with = "lenient")]
    pub projects_by_status: IndexMap<String, u64>,
    #[serde(deserialize_with = "lenient")]
    pub mda_counts: Vec<NameCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancialData {
    #[serde(deserialize_with = "lenient")]
    pub budget_by_mda: Vec<MdaBudget>,
    #[serde(deserialize_with = "lenient")]
    pub revenue_trend: Vec<TrendPoint>,
    #[serde(deserialize_with = "lenient")]
    pub expenditure_by_recipient: Vec<NameValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectsData {
    #[serde(deserialize_with = "lenient")]
    pub by_status: Vec<NameCount>,
    #[serde(deserialize_with = "lenient")]
    pub by_category: Vec<NameCount>,
    #[serde(deserialize_with = "lenient")]
    pub by_mda: Vec<NameCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsersData {
    #[serde(deserialize_with = "lenient_count")]
    pub total_users: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub active_users: u64,
    #[serde(deserialize_with = "lenient")]
    pub by_role: Vec<NameValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ReportPayload {
    Overview(OverviewData),
    Financial(FinancialData),
    Projects(ProjectsData),
    Users(UsersData),
}

impl ReportPayload {
    pub fn report_type(&self) -> ReportType {
        match self {
            ReportPayload::Overview(_) => ReportType::Overview,
            ReportPayload::Financial(_) => ReportType::Financial,
            ReportPayload::Projects(_) => ReportType::Projects,
            ReportPayload::Users(_) => ReportType::Users,
        }
    }

    /// Parse a payload for `report_type`. Accepts either the bare data object
    /// or the tagged `{"type": ..., "data": ...}` form.
    pub fn from_json(report_type: ReportType, json: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(json)?;
        if let Some(tag) = raw.get("type").and_then(|t| t.as_str()) {
            let found: ReportType = tag.parse()?;
            if found != report_type {
                return Err(ReportError::PayloadMismatch {
                    expected: report_type.to_string(),
                    found: found.to_string(),
                });
            }
            let data = raw.get("data").cloned().unwrap_or(serde_json::Value::Null);
            return Self::from_value(report_type, data);
        }
        Self::from_value(report_type, raw)
    }

    fn from_value(report_type: ReportType, data: serde_json::Value) -> Result<Self> {
        let data = if data.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            data
        };
        Ok(match report_type {
            ReportType::Overview => ReportPayload::Overview(serde_json::from_value(data)?),
            ReportType::Financial => ReportPayload::Financial(serde_json::from_value(data)?),
            ReportType::Projects => ReportPayload::Projects(serde_json::from_value(data)?),
            ReportType::Users => ReportPayload::Users(serde_json::from_value(data)?),
        })
    }
}

/// Display-ready reporting period shown in the page header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start_date, self.end_date)
    }
}

/// Finished PDF plus the filename it should be saved under.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub page_count: usize,
}
