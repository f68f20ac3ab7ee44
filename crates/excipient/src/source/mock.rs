//! In-memory label source for tests and offline demos.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{ExcipientError, Result};

use super::provider::{LabelSource, PageMetadata, SplQuery, SplSearchPage, SplSummary};

/// A label to serve from [`MockLabelSource`].
///
/// Renders a minimal but structurally faithful SPL document: a product data
/// section with the product name, form, route, and IACT/ACTIB ingredients,
/// plus an optional free-text "Inactive ingredients" section.
#[derive(Debug, Clone, Default)]
pub struct MockLabel {
    pub set_id: String,
    pub title: String,
    pub form: Option<String>,
    pub route: Option<String>,
    /// `(name, strength value, unit)`.
    pub active: Vec<(String, String, String)>,
    pub inactive: Vec<String>,
    pub inactive_text: Option<String>,
    pub ndcs: Vec<String>,
    pub packager: Option<String>,
}

impl MockLabel {
    pub fn new(set_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            set_id: set_id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }

    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn active(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        self.active.push((name.into(), value.into(), unit.into()));
        self
    }

    /// Structured (IACT) inactive ingredients.
    pub fn inactive<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inactive.extend(names.into_iter().map(Into::into));
        self
    }

    /// Paragraph text of the inactive ingredient section.
    pub fn inactive_text(mut self, text: impl Into<String>) -> Self {
        self.inactive_text = Some(text.into());
        self
    }

    pub fn ndc(mut self, ndc: impl Into<String>) -> Self {
        self.ndcs.push(ndc.into());
        self
    }

    pub fn packager(mut self, packager: impl Into<String>) -> Self {
        self.packager = Some(packager.into());
        self
    }

    /// Render the label as SPL XML.
    pub fn to_xml(&self) -> String {
        let mut ingredients = String::new();
        for (name, value, unit) in &self.active {
            ingredients.push_str(&format!(
                r#"<ingredient classCode="ACTIB"><quantity><numerator value="{}" unit="{}"/><denominator value="1" unit="1"/></quantity><ingredientSubstance><name>{}</name></ingredientSubstance></ingredient>"#,
                escape(value),
                escape(unit),
                escape(name)
            ));
        }
        for name in &self.inactive {
            ingredients.push_str(&format!(
                r#"<ingredient classCode="IACT"><ingredientSubstance><name>{}</name></ingredientSubstance></ingredient>"#,
                escape(name)
            ));
        }

        let form = self
            .form
            .as_ref()
            .map(|f| format!(r#"<formCode code="C00000" displayName="{}"/>"#, escape(f)))
            .unwrap_or_default();
        let route = self
            .route
            .as_ref()
            .map(|r| {
                format!(
                    r#"<consumedIn><substanceAdministration><routeCode code="C00000" displayName="{}"/></substanceAdministration></consumedIn>"#,
                    escape(r)
                )
            })
            .unwrap_or_default();
        let inactive_section = self
            .inactive_text
            .as_ref()
            .map(|text| {
                format!(
                    r#"<component><section><code code="51727-6" codeSystem="2.16.840.1.113883.6.1"/><title>INACTIVE INGREDIENTS</title><text><paragraph>{}</paragraph></text></section></component>"#,
                    escape(text)
                )
            })
            .unwrap_or_default();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<document xmlns="urn:hl7-org:v3">
<setId root="{set_id}"/>
<title>{title}</title>
<component><structuredBody>
<component><section><code code="48780-1" codeSystem="2.16.840.1.113883.6.1"/>
<subject><manufacturedProduct><manufacturedProduct><name>{title}</name>{form}{ingredients}</manufacturedProduct>{route}</manufacturedProduct></subject>
</section></component>
{inactive_section}
</structuredBody></component>
</document>"#,
            set_id = escape(&self.set_id),
            title = escape(&self.title),
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Label source backed by an in-memory list of labels.
///
/// Search matches the drug name case-insensitively against label titles and
/// paginates in insertion order.
#[derive(Debug, Default)]
pub struct MockLabelSource {
    labels: Vec<MockLabel>,
    raw_documents: HashMap<String, String>,
    failing: HashSet<String>,
    fail_search: bool,
    document_requests: AtomicUsize,
}

impl MockLabelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label.
    pub fn with_label(mut self, label: MockLabel) -> Self {
        self.labels.push(label);
        self
    }

    /// Serve `xml` verbatim for a set id that also appears in search results.
    pub fn with_raw_document(
        mut self,
        set_id: impl Into<String>,
        title: impl Into<String>,
        xml: impl Into<String>,
    ) -> Self {
        let set_id = set_id.into();
        self.labels.push(MockLabel::new(set_id.clone(), title));
        self.raw_documents.insert(set_id, xml.into());
        self
    }

    /// Make every request for this set id fail with an upstream error.
    pub fn failing_document(mut self, set_id: impl Into<String>) -> Self {
        self.failing.insert(set_id.into());
        self
    }

    /// Make the search endpoint fail.
    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    /// Number of SPL documents requested so far.
    pub fn document_requests(&self) -> usize {
        self.document_requests.load(Ordering::SeqCst)
    }

    fn label(&self, set_id: &str) -> Result<&MockLabel> {
        if self.failing.contains(set_id) {
            return Err(ExcipientError::Upstream {
                url: format!("mock://spls/{}", set_id),
                status: 500,
                body: "mock failure".to_string(),
            });
        }
        self.labels
            .iter()
            .find(|l| l.set_id == set_id)
            .ok_or_else(|| ExcipientError::NotFound(format!("SPL {}", set_id)))
    }
}

#[async_trait]
impl LabelSource for MockLabelSource {
    async fn search_spls(&self, query: &SplQuery) -> Result<SplSearchPage> {
        if self.fail_search {
            return Err(ExcipientError::Upstream {
                url: "mock://spls.json".to_string(),
                status: 503,
                body: "mock search failure".to_string(),
            });
        }

        let needle = query.drug_name.as_deref().unwrap_or("").to_lowercase();
        let matches: Vec<&MockLabel> = self
            .labels
            .iter()
            .filter(|l| l.title.to_lowercase().contains(&needle))
            .collect();

        let page = query.effective_page();
        let size = query.effective_pagesize();
        let total = matches.len() as u32;
        let total_pages = total.div_ceil(size).max(1);

        let data = matches
            .into_iter()
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .map(|l| SplSummary::new(l.set_id.clone(), l.title.clone()))
            .collect();

        Ok(SplSearchPage {
            data,
            metadata: PageMetadata {
                total_elements: Some(total),
                elements_per_page: Some(size),
                total_pages: Some(total_pages),
                current_page: Some(page),
                next_page: (page < total_pages).then_some(page + 1),
            },
        })
    }

    async fn spl_document(&self, set_id: &str) -> Result<String> {
        self.document_requests.fetch_add(1, Ordering::SeqCst);
        let label = self.label(set_id)?;
        Ok(self
            .raw_documents
            .get(set_id)
            .cloned()
            .unwrap_or_else(|| label.to_xml()))
    }

    async fn spl_ndcs(&self, set_id: &str) -> Result<Vec<String>> {
        Ok(self.label(set_id)?.ndcs.clone())
    }

    async fn spl_packager(&self, set_id: &str) -> Result<Option<String>> {
        Ok(self.label(set_id)?.packager.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spl::parse_spl;

    #[test]
    fn test_mock_label_renders_parsable_spl() {
        let label = MockLabel::new("set-1", "Tylenol Extra Strength")
            .form("TABLET, FILM COATED")
            .route("ORAL")
            .active("ACETAMINOPHEN", "500", "mg")
            .inactive(["CORN STARCH", "FD&C RED NO. 40"])
            .inactive_text("Inactive ingredients: talc and povidone");

        let doc = parse_spl(&label.to_xml()).unwrap();
        assert_eq!(doc.set_id.as_deref(), Some("set-1"));
        assert_eq!(doc.title, "Tylenol Extra Strength");
        assert_eq!(doc.form, "TABLET, FILM COATED");
        assert_eq!(doc.route, "ORAL");
        assert_eq!(doc.active[0].name, "Acetaminophen");
        assert_eq!(doc.active[0].strength, "500 mg");
        assert_eq!(
            doc.inactive,
            vec!["Corn Starch", "Fd&C Red No. 40", "Povidone", "Talc"]
        );
    }

    #[tokio::test]
    async fn test_search_paginates() {
        let source = MockLabelSource::new()
            .with_label(MockLabel::new("a", "Ibuprofen 200"))
            .with_label(MockLabel::new("b", "Acetaminophen"))
            .with_label(MockLabel::new("c", "IBUPROFEN 400"));

        let first = source
            .search_spls(&SplQuery::drug_name("ibuprofen").with_page(1, 1))
            .await
            .unwrap();
        assert_eq!(first.data[0].setid, "a");
        assert_eq!(first.metadata.total_elements, Some(2));
        assert_eq!(first.metadata.next_page, Some(2));

        let second = source
            .search_spls(&SplQuery::drug_name("ibuprofen").with_page(2, 1))
            .await
            .unwrap();
        assert_eq!(second.data[0].setid, "c");
        assert_eq!(second.metadata.following_page(), None);
    }

    #[tokio::test]
    async fn test_failures() {
        let source = MockLabelSource::new()
            .with_label(MockLabel::new("a", "Aspirin"))
            .failing_document("a");

        let err = source.spl_document("a").await.unwrap_err();
        assert!(err.is_upstream());
        assert_eq!(source.document_requests(), 1);

        assert!(matches!(
            source.spl_document("missing").await,
            Err(ExcipientError::NotFound(_))
        ));
    }
}
