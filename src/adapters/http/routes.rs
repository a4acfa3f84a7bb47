//! Endpoint URLs of the session service.
//!
//! Path segments and query values are percent-encoded by `Url`, so ids
//! containing `/`, spaces or `?` cannot escape their segment.

use reqwest::Url;

use crate::domain::foundation::{CompanyId, OperatorCode, WorkOrderId};
use crate::domain::work_order::DrawingPath;
use crate::ports::BackendError;

/// URL builder rooted at the configured base URL.
#[derive(Debug, Clone)]
pub struct BackendRoutes {
    base: Url,
}

impl BackendRoutes {
    /// Parses the base URL. A path prefix (`http://host/mes/`) is kept.
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let base = Url::parse(base_url)
            .map_err(|e| BackendError::transport(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::transport(format!(
                "base URL '{}' cannot carry a path",
                base_url
            )));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn sequencing(&self, operator: &OperatorCode) -> Url {
        let mut url = self.endpoint(&["api", "sequencing"]);
        url.query_pairs_mut()
            .append_pair("operator_code", operator.as_str());
        url
    }

    pub fn order_detail(
        &self,
        order: &WorkOrderId,
        company: &CompanyId,
        operation_sequence: i64,
    ) -> Url {
        let mut url = self.endpoint(&["api", "order", order.as_str(), "details"]);
        url.query_pairs_mut()
            .append_pair("empresa", company.as_str())
            .append_pair("codseq", &operation_sequence.to_string());
        url
    }

    pub fn start(&self) -> Url {
        self.endpoint(&["api", "session", "start"])
    }

    pub fn pause(&self) -> Url {
        self.endpoint(&["api", "session", "pause"])
    }

    pub fn finish(&self) -> Url {
        self.endpoint(&["api", "session", "finish"])
    }

    pub fn list(&self, order: &WorkOrderId) -> Url {
        self.endpoint(&["api", "session", "list", order.as_str()])
    }

    pub fn download(&self, drawing: &DrawingPath) -> Url {
        let mut url = self.endpoint(&["api", "download"]);
        url.query_pairs_mut().append_pair("file_path", drawing.as_str());
        url
    }
}
