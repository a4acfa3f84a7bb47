//! OperatorBoard - The operator's job queue ("sequencing") and drawings.
//!
//! Logging in means validating the operator code and loading the queue.
//! The operator's display name comes from the first queued job.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::foundation::{CompanyId, OperatorCode, ValidationError, WorkOrderId};
use crate::domain::session::SessionError;
use crate::domain::work_order::WorkOrder;
use crate::ports::BackendClient;

/// Job queue of the identified operator.
pub struct OperatorBoard {
    backend: Arc<dyn BackendClient>,
    operator: Option<OperatorCode>,
    jobs: Vec<WorkOrder>,
}

impl OperatorBoard {
    pub fn new(backend: Arc<dyn BackendClient>) -> Self {
        Self {
            backend,
            operator: None,
            jobs: Vec::new(),
        }
    }

    pub fn operator(&self) -> Option<&OperatorCode> {
        self.operator.as_ref()
    }

    /// Jobs in the order the server queued them.
    pub fn jobs(&self) -> &[WorkOrder] {
        &self.jobs
    }

    /// Display name taken from the first job, if the server sent one.
    pub fn operator_name(&self) -> Option<&str> {
        self.jobs.first().and_then(WorkOrder::operator_name)
    }

    /// Validates `code` and loads its queue.
    ///
    /// On failure the previous operator and queue are kept.
    pub async fn load(&mut self, code: &str) -> Result<&[WorkOrder], SessionError> {
        let operator = OperatorCode::new(code)?;
        let jobs = self.backend.fetch_sequencing(&operator).await?;
        tracing::info!(operator = %operator, jobs = jobs.len(), "sequencing loaded");
        self.operator = Some(operator);
        self.jobs = jobs;
        Ok(&self.jobs)
    }

    /// Reloads the queue of the current operator.
    pub async fn reload(&mut self) -> Result<&[WorkOrder], SessionError> {
        let operator = self.operator.clone().ok_or(SessionError::OperatorMissing)?;
        self.jobs = self.backend.fetch_sequencing(&operator).await?;
        Ok(&self.jobs)
    }

    /// Finds a queued job by order id, optionally narrowed by company.
    pub fn find(&self, order: &WorkOrderId, company: Option<&CompanyId>) -> Option<&WorkOrder> {
        self.jobs.iter().find(|job| match company {
            Some(company) => job.matches(order, company),
            None => job.id() == order,
        })
    }

    /// Downloads the job's engineering drawing into `directory`.
    ///
    /// Returns the path of the written file.
    pub async fn download_drawing(
        &self,
        order: &WorkOrder,
        directory: &Path,
    ) -> Result<PathBuf, SessionError> {
        let drawing = order.drawing().ok_or_else(|| {
            SessionError::from(ValidationError::empty_field("drawing"))
        })?;
        let destination = directory.join(drawing.file_name());
        let bytes = self
            .backend
            .download_drawing(drawing, &destination)
            .await?;
        tracing::info!(
            work_order = %order.id(),
            path = %destination.display(),
            bytes,
            "drawing saved"
        );
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{BackendCall, InMemoryBackend};
    use crate::domain::work_order::DrawingPath;
    use crate::ports::BackendError;

    fn job(id: &str, company: &str) -> WorkOrder {
        WorkOrder::new(WorkOrderId::new(id).unwrap(), CompanyId::new(company).unwrap())
    }

    #[tokio::test]
    async fn load_validates_code_before_calling_backend() {
        let backend = InMemoryBackend::new();
        let mut board = OperatorBoard::new(Arc::new(backend.clone()));

        let err = board.load("  ").await.unwrap_err();

        assert!(matches!(err, SessionError::Validation(_)));
        assert_eq!(backend.calls_of(BackendCall::Sequencing), 0);
    }

    #[tokio::test]
    async fn load_keeps_queue_order_and_name() {
        let backend = InMemoryBackend::new()
            .with_job(job("OF-2", "1").with_operator_name(Some("Ana".to_string())))
            .with_job(job("OF-1", "1"));
        let mut board = OperatorBoard::new(Arc::new(backend));

        let jobs = board.load("77").await.unwrap();

        assert_eq!(jobs[0].id().as_str(), "OF-2");
        assert_eq!(board.operator_name(), Some("Ana"));
        assert_eq!(board.operator().unwrap().as_str(), "77");
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_queue() {
        let backend = InMemoryBackend::new().with_job(job("OF-1", "1"));
        let mut board = OperatorBoard::new(Arc::new(backend.clone()));
        board.load("77").await.unwrap();
        backend.fail_next(BackendCall::Sequencing, BackendError::transport("down"));

        assert!(board.load("88").await.is_err());
        assert_eq!(board.operator().unwrap().as_str(), "77");
        assert_eq!(board.jobs().len(), 1);
    }

    #[tokio::test]
    async fn find_matches_id_and_company() {
        let backend = InMemoryBackend::new()
            .with_job(job("OF-1", "1"))
            .with_job(job("OF-1", "2"));
        let mut board = OperatorBoard::new(Arc::new(backend));
        board.load("77").await.unwrap();

        let id = WorkOrderId::new("OF-1").unwrap();
        let company = CompanyId::new("2").unwrap();
        assert_eq!(
            board.find(&id, Some(&company)).unwrap().company().as_str(),
            "2"
        );
        assert_eq!(board.find(&id, None).unwrap().company().as_str(), "1");
        assert!(board.find(&WorkOrderId::new("OF-9").unwrap(), None).is_none());
    }

    #[tokio::test]
    async fn reload_requires_operator() {
        let mut board = OperatorBoard::new(Arc::new(InMemoryBackend::new()));
        assert_eq!(board.reload().await.unwrap_err(), SessionError::OperatorMissing);
    }

    #[tokio::test]
    async fn download_saves_under_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let backend = InMemoryBackend::new().with_drawing("eng/bracket.step", b"ISO-10303".to_vec());
        let board = OperatorBoard::new(Arc::new(backend));
        let order = job("OF-1", "1").with_drawing(Some(DrawingPath::new("eng/bracket.step").unwrap()));

        let path = board.download_drawing(&order, dir.path()).await.unwrap();

        assert_eq!(path, dir.path().join("bracket.step"));
        assert_eq!(std::fs::read(path).unwrap(), b"ISO-10303");
    }

    #[tokio::test]
    async fn download_without_drawing_is_refused() {
        let backend = InMemoryBackend::new();
        let board = OperatorBoard::new(Arc::new(backend.clone()));
        let dir = tempfile::tempdir().unwrap();

        let err = board.download_drawing(&job("OF-1", "1"), dir.path()).await.unwrap_err();

        assert!(matches!(err, SessionError::Validation(_)));
        assert_eq!(backend.calls_of(BackendCall::Download), 0);
    }
}
