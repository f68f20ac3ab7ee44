//! Label source trait and the query/response types it speaks.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ExcipientError, Result};

/// Largest page size the DailyMed API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Comparison operator for the published-date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateComparison {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
}

impl DateComparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateComparison::Lt => "lt",
            DateComparison::Lte => "lte",
            DateComparison::Gt => "gt",
            DateComparison::Gte => "gte",
            DateComparison::Eq => "eq",
        }
    }
}

impl FromStr for DateComparison {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lt" => Ok(DateComparison::Lt),
            "lte" => Ok(DateComparison::Lte),
            "gt" => Ok(DateComparison::Gt),
            "gte" => Ok(DateComparison::Gte),
            "eq" => Ok(DateComparison::Eq),
            _ => Err(format!(
                "Unknown comparison: {}. Use lt, lte, gt, gte, or eq.",
                s
            )),
        }
    }
}

impl fmt::Display for DateComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for the SPL search endpoint (`spls.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplQuery {
    pub page: u32,
    pub pagesize: u32,
    pub drug_name: Option<String>,
    /// `g` for generic names, `b` for brand names.
    pub name_type: Option<String>,
    pub ndc: Option<String>,
    pub labeler: Option<String>,
    pub manufacturer: Option<String>,
    pub application_number: Option<String>,
    pub marketing_category_code: Option<String>,
    pub doctype: Option<String>,
    pub dea_schedule_code: Option<String>,
    pub drug_class_code: Option<String>,
    pub drug_class_coding_system: Option<String>,
    pub boxed_warning: Option<bool>,
    pub rxcui: Option<String>,
    pub setid: Option<String>,
    pub unii_code: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub published_date_comparison: Option<DateComparison>,
}

impl Default for SplQuery {
    fn default() -> Self {
        Self {
            page: 1,
            pagesize: 25,
            drug_name: None,
            name_type: None,
            ndc: None,
            labeler: None,
            manufacturer: None,
            application_number: None,
            marketing_category_code: None,
            doctype: None,
            dea_schedule_code: None,
            drug_class_code: None,
            drug_class_coding_system: None,
            boxed_warning: None,
            rxcui: None,
            setid: None,
            unii_code: None,
            published_date: None,
            published_date_comparison: None,
        }
    }
}

impl SplQuery {
    /// Query by drug name.
    pub fn drug_name(name: impl Into<String>) -> Self {
        Self {
            drug_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the page number (1-based) and page size.
    pub fn with_page(mut self, page: u32, pagesize: u32) -> Self {
        self.page = page;
        self.pagesize = pagesize;
        self
    }

    /// Page number, never below 1.
    pub fn effective_page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size clamped to what the API accepts.
    pub fn effective_pagesize(&self) -> u32 {
        self.pagesize.clamp(1, MAX_PAGE_SIZE)
    }

    /// Query-string parameters, omitting unset filters.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.effective_page().to_string()),
            ("pagesize", self.effective_pagesize().to_string()),
        ];

        let optional = [
            ("drug_name", &self.drug_name),
            ("name_type", &self.name_type),
            ("ndc", &self.ndc),
            ("labeler", &self.labeler),
            ("manufacturer", &self.manufacturer),
            ("application_number", &self.application_number),
            ("marketing_category_code", &self.marketing_category_code),
            ("doctype", &self.doctype),
            ("dea_schedule_code", &self.dea_schedule_code),
            ("drug_class_code", &self.drug_class_code),
            ("drug_class_coding_system", &self.drug_class_coding_system),
            ("rxcui", &self.rxcui),
            ("setid", &self.setid),
            ("unii_code", &self.unii_code),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                params.push((key, v.clone()));
            }
        }

        if let Some(boxed) = self.boxed_warning {
            params.push(("boxed_warning", boxed.to_string()));
        }
        if let Some(date) = self.published_date {
            params.push(("published_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(cmp) = self.published_date_comparison {
            params.push(("published_date_comparison", cmp.to_string()));
        }

        params
    }
}

/// One entry of an SPL search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplSummary {
    pub setid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub spl_version: Option<u32>,
    #[serde(default)]
    pub published_date: Option<String>,
}

impl SplSummary {
    pub fn new(setid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            setid: setid.into(),
            title: title.into(),
            spl_version: None,
            published_date: None,
        }
    }
}

/// Pagination metadata returned with listing responses.
///
/// DailyMed reports these numbers as strings (and missing pages as the
/// string `"null"`), so every field is parsed leniently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total_elements: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub elements_per_page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total_pages: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub current_page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub next_page: Option<u32>,
}

impl PageMetadata {
    /// The page after the current one, if the API reports more pages.
    pub fn following_page(&self) -> Option<u32> {
        let current = self.current_page.unwrap_or(1);
        let total = self.total_pages?;
        (current < total).then_some(current + 1)
    }
}

/// One page of SPL search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplSearchPage {
    #[serde(default)]
    pub data: Vec<SplSummary>,
    #[serde(default)]
    pub metadata: PageMetadata,
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Reject set ids that could escape their URL path segment.
pub fn validate_set_id(set_id: &str) -> Result<&str> {
    let trimmed = set_id.trim();
    if trimmed.is_empty()
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ExcipientError::InvalidRequest(format!(
            "Invalid SPL set id: '{}'",
            set_id
        )));
    }
    Ok(trimmed)
}

/// A source of SPL drug labels.
///
/// Implementations must be thread-safe (Send + Sync) so one instance can be
/// shared by every request handler.
#[async_trait]
pub trait LabelSource: Send + Sync {
    /// Search SPL documents.
    async fn search_spls(&self, query: &SplQuery) -> Result<SplSearchPage>;

    /// Raw SPL XML for a set id.
    async fn spl_document(&self, set_id: &str) -> Result<String>;

    /// NDCs listed for a set id, in API order.
    async fn spl_ndcs(&self, set_id: &str) -> Result<Vec<String>>;

    /// Labeler (packager) name for a set id, if the API reports one.
    async fn spl_packager(&self, set_id: &str) -> Result<Option<String>>;

    /// Name of this source (for logging).
    fn name(&self) -> &str;
}
