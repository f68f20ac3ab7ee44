//! DailyMed REST API (v2) client.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::{ExcipientError, Result, truncate_body};

use super::provider::{LabelSource, SplQuery, SplSearchPage, validate_set_id};

const SERVICE_NAME: &str = "DailyMed";

/// The paginated listing endpoints of the DailyMed API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    DrugNames,
    Ndcs,
    DrugClasses,
    Uniis,
    Rxcuis,
}

impl ListingKind {
    /// All listing kinds, in CLI help order.
    pub const ALL: [ListingKind; 5] = [
        ListingKind::DrugNames,
        ListingKind::Ndcs,
        ListingKind::DrugClasses,
        ListingKind::Uniis,
        ListingKind::Rxcuis,
    ];

    fn endpoint(&self) -> &'static str {
        match self {
            ListingKind::DrugNames => "drugnames.json",
            ListingKind::Ndcs => "ndcs.json",
            ListingKind::DrugClasses => "drugclasses.json",
            ListingKind::Uniis => "uniis.json",
            ListingKind::Rxcuis => "rxcuis.json",
        }
    }

    /// Filter parameters the endpoint accepts.
    pub fn allowed_filters(&self) -> &'static [&'static str] {
        match self {
            ListingKind::DrugNames => &["manufacturer", "name_type"],
            ListingKind::Ndcs => &[
                "application_number",
                "labeler",
                "marketing_category_code",
                "setid",
            ],
            ListingKind::DrugClasses => &[
                "drug_class_code",
                "drug_class_coding_system",
                "class_code_type",
                "class_name",
                "unii_code",
            ],
            ListingKind::Uniis => &[
                "active_moiety",
                "drug_class_code",
                "drug_class_coding_system",
                "rxcui",
                "unii_code",
            ],
            ListingKind::Rxcuis => &["rxcui", "rxstring", "rxtty"],
        }
    }
}

impl FromStr for ListingKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "drugnames" => Ok(ListingKind::DrugNames),
            "ndcs" => Ok(ListingKind::Ndcs),
            "drugclasses" => Ok(ListingKind::DrugClasses),
            "uniis" => Ok(ListingKind::Uniis),
            "rxcuis" => Ok(ListingKind::Rxcuis),
            _ => Err(format!(
                "Unknown listing: {}. Use drug-names, ndcs, drug-classes, uniis, or rxcuis.",
                s
            )),
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListingKind::DrugNames => "drug-names",
            ListingKind::Ndcs => "ndcs",
            ListingKind::DrugClasses => "drug-classes",
            ListingKind::Uniis => "uniis",
            ListingKind::Rxcuis => "rxcuis",
        };
        f.write_str(name)
    }
}

/// HTTP client for the DailyMed API.
#[derive(Debug, Clone)]
pub struct DailyMedClient {
    http: Client,
    base_url: String,
}

impl DailyMedClient {
    /// Create a client against the public API with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(&ServiceConfig::default())
    }

    /// Create a client from service configuration.
    pub fn with_config(config: &ServiceConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("excipient/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExcipientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.dailymed_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Version history of an SPL.
    pub async fn spl_history(&self, set_id: &str) -> Result<Value> {
        let set_id = validate_set_id(set_id)?;
        self.get_json(&format!("spls/{}/history.json", set_id), &[])
            .await
    }

    /// Packaging description of an SPL.
    pub async fn spl_packaging(&self, set_id: &str) -> Result<Value> {
        let set_id = validate_set_id(set_id)?;
        self.get_json(&format!("spls/{}/packaging.json", set_id), &[])
            .await
    }

    /// Raw NDC listing of an SPL.
    pub async fn spl_ndcs_raw(&self, set_id: &str) -> Result<Value> {
        let set_id = validate_set_id(set_id)?;
        self.get_json(&format!("spls/{}/ndcs.json", set_id), &[])
            .await
    }

    /// One page of a listing endpoint.
    ///
    /// Filters the endpoint does not accept are rejected before any request
    /// is sent.
    pub async fn listing(
        &self,
        kind: ListingKind,
        page: u32,
        pagesize: u32,
        filters: &[(String, String)],
    ) -> Result<Value> {
        let allowed = kind.allowed_filters();
        if let Some((key, _)) = filters.iter().find(|(k, _)| !allowed.contains(&k.as_str())) {
            return Err(ExcipientError::InvalidRequest(format!(
                "'{}' is not a filter of the {} listing (allowed: {})",
                key,
                kind,
                allowed.join(", ")
            )));
        }

        let mut params: Vec<(&str, String)> = vec![
            ("page", page.max(1).to_string()),
            ("pagesize", pagesize.max(1).to_string()),
        ];
        params.extend(filters.iter().map(|(k, v)| (k.as_str(), v.clone())));

        self.get_json(kind.endpoint(), &params).await
    }

    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, ?params, "DailyMed request");

        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|source| {
                warn!(%url, error = %source, "DailyMed request failed");
                ExcipientError::Http {
                    url: url.clone(),
                    source,
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ExcipientError::Http {
            url: url.clone(),
            source,
        })?;

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "DailyMed returned an error status");
            return Err(ExcipientError::Upstream {
                url,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }

    async fn get_json(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let body = self.get(endpoint, params).await?;
        if body.trim().is_empty() {
            return Err(ExcipientError::UnexpectedResponse {
                service: SERVICE_NAME.to_string(),
                message: format!("empty body from {}", endpoint),
            });
        }

        serde_json::from_str(&body).map_err(|e| ExcipientError::UnexpectedResponse {
            service: SERVICE_NAME.to_string(),
            message: format!(
                "invalid JSON from {}: {} ({})",
                endpoint,
                e,
                truncate_body(&body)
            ),
        })
    }
}

#[async_trait]
impl LabelSource for DailyMedClient {
    async fn search_spls(&self, query: &SplQuery) -> Result<SplSearchPage> {
        let value = self.get_json("spls.json", &query.to_params()).await?;
        serde_json::from_value(value).map_err(|e| ExcipientError::UnexpectedResponse {
            service: SERVICE_NAME.to_string(),
            message: format!("unrecognised SPL search page: {}", e),
        })
    }

    async fn spl_document(&self, set_id: &str) -> Result<String> {
        let set_id = validate_set_id(set_id)?;
        self.get(&format!("spls/{}.xml", set_id), &[]).await
    }

    async fn spl_ndcs(&self, set_id: &str) -> Result<Vec<String>> {
        let value = self.spl_ndcs_raw(set_id).await?;
        Ok(extract_ndcs(&value))
    }

    async fn spl_packager(&self, set_id: &str) -> Result<Option<String>> {
        let value = self.spl_packaging(set_id).await?;
        Ok(extract_packager(&value))
    }

    fn name(&self) -> &str {
        SERVICE_NAME
    }
}

/// All `ndc` string fields under `data`, in document order, deduplicated.
pub fn extract_ndcs(value: &Value) -> Vec<String> {
    let mut ndcs = Vec::new();
    if let Some(data) = value.get("data") {
        collect_strings(data, "ndc", &mut ndcs);
    }
    let mut seen = std::collections::HashSet::new();
    ndcs.retain(|ndc| seen.insert(ndc.clone()));
    ndcs
}

/// First non-empty labeler name under `data`.
pub fn extract_packager(value: &Value) -> Option<String> {
    let data = value.get("data")?;
    ["labeler_name", "labeler"].iter().find_map(|key| {
        let mut names = Vec::new();
        collect_strings(data, key, &mut names);
        names.into_iter().find(|n| !n.trim().is_empty())
    })
}

fn collect_strings(value: &Value, key: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                match v {
                    Value::String(s) if k == key => out.push(s.trim().to_string()),
                    _ => collect_strings(v, key, out),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_strings(item, key, out);
            }
        }
        _ => {}
    }
}
