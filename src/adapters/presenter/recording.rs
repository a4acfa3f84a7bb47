//! Recording presenter and scripted exit confirmation.
//!
//! Captures everything the controller shows so tests can assert on it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::session::{Notice, SessionView};
use crate::ports::{ExitConfirmation, SessionPresenter};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Presenter that keeps every notice and rendered view.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    notices: Arc<Mutex<Vec<Notice>>>,
    views: Arc<Mutex<Vec<SessionView>>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    pub fn last_notice(&self) -> Option<Notice> {
        lock(&self.notices).last().cloned()
    }

    pub fn views(&self) -> Vec<SessionView> {
        lock(&self.views).clone()
    }

    pub fn last_view(&self) -> Option<SessionView> {
        lock(&self.views).last().cloned()
    }

    pub fn render_count(&self) -> usize {
        lock(&self.views).len()
    }

    pub fn clear(&self) {
        lock(&self.notices).clear();
        lock(&self.views).clear();
    }
}

impl SessionPresenter for RecordingPresenter {
    fn notify(&self, notice: Notice) {
        lock(&self.notices).push(notice);
    }

    fn render(&self, view: &SessionView) {
        lock(&self.views).push(view.clone());
    }
}

/// Confirmation that answers from a script and records the prompts.
///
/// Once the script runs out, `fallback` is returned.
#[derive(Debug, Clone)]
pub struct ScriptedConfirmation {
    answers: Arc<Mutex<VecDeque<bool>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    fallback: bool,
}

impl ScriptedConfirmation {
    pub fn new(fallback: bool) -> Self {
        Self {
            answers: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            fallback,
        }
    }

    pub fn always(answer: bool) -> Self {
        Self::new(answer)
    }

    /// Queues the next answer.
    pub fn with_answer(self, answer: bool) -> Self {
        lock(&self.answers).push_back(answer);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl ExitConfirmation for ScriptedConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        lock(&self.prompts).push(prompt.to_string());
        lock(&self.answers).pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_notices_in_order() {
        let presenter = RecordingPresenter::new();
        presenter.notify(Notice::info("one"));
        presenter.notify(Notice::error("two"));
        let messages: Vec<_> = presenter.notices().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn scripted_answers_then_fallback() {
        let confirm = ScriptedConfirmation::new(true).with_answer(false);
        assert!(!confirm.confirm("leave?").await);
        assert!(confirm.confirm("leave?").await);
        assert_eq!(confirm.prompts().len(), 2);
    }
}
