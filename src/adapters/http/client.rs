//! HttpBackendClient - `BackendClient` over the service's JSON API.
//!
//! # Configuration
//!
//! ```ignore
//! let client = HttpBackendClient::new("http://mes.local:5000", Duration::from_secs(15))?;
//! let jobs = client.fetch_sequencing(&operator).await?;
//! ```
//!
//! Every request carries a fresh `x-request-id` so server logs can be
//! matched with ours. Response bodies are decoded whatever the HTTP status.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::dto::{
    decode_envelope, DetailPayload, EmptyPayload, FinishSessionBody, ListPayload,
    PauseSessionBody, SequencingPayload, StartPayload,
};
use super::routes::BackendRoutes;
use crate::config::BackendConfig;
use crate::domain::foundation::{CompanyId, OperatorCode, SessionId, WorkOrderId};
use crate::domain::session::{GoodQuantity, SessionHistory};
use crate::domain::work_order::{DrawingPath, WorkOrder, WorkOrderDetail};
use crate::ports::{BackendClient, BackendError, StartSessionRequest};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP implementation of the session backend.
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    client: Client,
    routes: BackendRoutes,
    timeout: Duration,
}

impl HttpBackendClient {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let routes = BackendRoutes::new(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            routes,
            timeout,
        })
    }

    /// Creates a client from the `backend` config section.
    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        Self::new(&config.base_url, config.request_timeout())
    }

    pub fn routes(&self) -> &BackendRoutes {
        &self.routes
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request plumbing
    // ─────────────────────────────────────────────────────────────────────────

    fn transport_error(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::transport(format!("timed out after {}s", self.timeout.as_secs()))
        } else if err.is_connect() {
            BackendError::transport(format!("connection failed: {}", err))
        } else {
            BackendError::transport(err.to_string())
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let request_id = Uuid::new_v4();
        let response = request
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await
            .map_err(|e| {
                let err = self.transport_error(e);
                tracing::error!(%request_id, error = %err, "backend request failed");
                err
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        tracing::debug!(%request_id, %status, bytes = body.len(), "backend response");

        decode_envelope(&body).map_err(|err| match err {
            BackendError::Decode(reason) => {
                tracing::error!(%request_id, %status, %reason, "undecodable backend response");
                BackendError::decode(format!("HTTP {}: {}", status, reason))
            }
            other => other,
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        tracing::debug!(%url, "GET");
        self.execute(self.client.get(url)).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, BackendError> {
        tracing::debug!(%url, "POST");
        self.execute(self.client.post(url).json(body)).await
    }
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn fetch_sequencing(&self, operator: &OperatorCode) -> Result<Vec<WorkOrder>, BackendError> {
        let payload: SequencingPayload = self.get(self.routes.sequencing(operator)).await?;
        payload.jobs.into_iter().map(WorkOrder::try_from).collect()
    }

    async fn fetch_work_order_detail(
        &self,
        order: &WorkOrderId,
        company: &CompanyId,
        operation_sequence: i64,
    ) -> Result<WorkOrderDetail, BackendError> {
        let payload: DetailPayload = self
            .get(self.routes.order_detail(order, company, operation_sequence))
            .await?;
        Ok(payload.data.map(WorkOrderDetail::from).unwrap_or_default())
    }

    async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<Option<SessionId>, BackendError> {
        let payload: StartPayload = self.post(self.routes.start(), &request).await?;
        Ok(payload.apontamento_id.map(SessionId::new))
    }

    async fn pause_session(&self, id: SessionId) -> Result<(), BackendError> {
        let body = PauseSessionBody { apontamento_id: id };
        let _: EmptyPayload = self.post(self.routes.pause(), &body).await?;
        Ok(())
    }

    async fn finish_session(
        &self,
        id: SessionId,
        quantity: GoodQuantity,
    ) -> Result<(), BackendError> {
        let body = FinishSessionBody {
            apontamento_id: id,
            quantidade_boa: quantity,
        };
        let _: EmptyPayload = self.post(self.routes.finish(), &body).await?;
        Ok(())
    }

    async fn list_sessions(&self, order: &WorkOrderId) -> Result<SessionHistory, BackendError> {
        let payload: ListPayload = self.get(self.routes.list(order)).await?;
        SessionHistory::try_from(payload)
    }

    async fn download_drawing(
        &self,
        drawing: &DrawingPath,
        destination: &Path,
    ) -> Result<u64, BackendError> {
        let request_id = Uuid::new_v4();
        let url = self.routes.download(drawing);
        tracing::debug!(%request_id, %url, "GET drawing");

        let response = self
            .client
            .get(url)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| self.transport_error(e))?;
            return match decode_envelope::<EmptyPayload>(&body) {
                Err(BackendError::Decode(_)) | Ok(_) => {
                    Err(BackendError::decode(format!("HTTP {} without error envelope", status)))
                }
                Err(rejected) => Err(rejected),
            };
        }

        let io_error = |e: std::io::Error| {
            BackendError::transport(format!("write {}: {}", destination.display(), e))
        };
        let mut file = tokio::fs::File::create(destination).await.map_err(io_error)?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let result = match chunk {
                Ok(bytes) => file.write_all(&bytes).await.map(|_| bytes.len()).map_err(io_error),
                Err(e) => Err(self.transport_error(e)),
            };
            match result {
                Ok(len) => written += len as u64,
                Err(err) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(destination).await;
                    return Err(err);
                }
            }
        }
        file.flush().await.map_err(io_error)?;

        tracing::info!(%request_id, path = %drawing, bytes = written, "drawing downloaded");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_base_url() {
        let err = HttpBackendClient::new("::nope::", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }

    #[test]
    fn keeps_routes_base() {
        let client = HttpBackendClient::new("http://localhost:5000", Duration::from_secs(1)).unwrap();
        assert_eq!(client.routes().base().host_str(), Some("localhost"));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        // Port 9 (discard) is not expected to be listening.
        let client = HttpBackendClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client
            .list_sessions(&WorkOrderId::new("OF-1").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
