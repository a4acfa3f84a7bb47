//! Line-oriented terminal presenter.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;

use crate::domain::session::{Notice, SessionView};
use crate::ports::{format_elapsed, ExitConfirmation, SessionPresenter};

/// Writes notices and views to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePresenter;

impl ConsolePresenter {
    pub fn new() -> Self {
        Self
    }

    /// Renders a view as plain text lines.
    pub fn format_view(view: &SessionView) -> Vec<String> {
        let mut lines = Vec::new();
        let Some(order) = view.work_order.as_ref() else {
            lines.push("No work order open.".to_string());
            return lines;
        };

        let progress = order.progress();
        lines.push(format!(
            "Work order {} ({}) - {}",
            order.id(),
            order.company(),
            order.description().unwrap_or("-")
        ));
        lines.push(format!(
            "Progress: {}/{} {} ({}%)",
            progress.realized,
            progress.programmed,
            order.unit().unwrap_or(""),
            progress.percent
        ));
        if let Some(detail) = view.detail.as_ref() {
            lines.push(format!(
                "Operation: {}  Machine: {}  POP: {}",
                detail.operation.as_deref().unwrap_or("-"),
                detail.machine.as_deref().unwrap_or("-"),
                detail.pop_label()
            ));
            for material in &detail.materials {
                lines.push(format!(
                    "  material {} {} [{}]",
                    material.code.as_deref().unwrap_or("-"),
                    material.description.as_deref().unwrap_or("-"),
                    material.stock_location.as_deref().unwrap_or("-")
                ));
            }
        }

        let session = view
            .session_id
            .map(|id| format!(" #{}", id))
            .unwrap_or_default();
        lines.push(format!(
            "Status: {}{}  Elapsed: {}",
            view.state.status_label(),
            session,
            format_elapsed(view.elapsed_secs)
        ));

        let mut controls = Vec::new();
        if view.controls.start_enabled {
            controls.push("start");
        }
        if view.controls.pause_enabled {
            controls.push("pause");
        }
        if view.controls.finish_enabled {
            controls.push("finish <qty>");
        }
        lines.push(format!("Available: {}", controls.join(", ")));

        if view.history.is_empty() {
            lines.push("No sessions recorded.".to_string());
        }
        for row in &view.history {
            lines.push(format!(
                "  #{} {} {} -> {} qty {} [{}] {}",
                row.id,
                row.operator,
                row.started_at,
                row.ended_at,
                row.quantity,
                row.progress,
                row.integration
            ));
        }
        lines
    }
}

impl SessionPresenter for ConsolePresenter {
    fn notify(&self, notice: Notice) {
        println!("[{}] {}", notice.severity, notice.message);
    }

    fn render(&self, view: &SessionView) {
        for line in Self::format_view(view) {
            println!("{}", line);
        }
    }
}

/// Asks on stdin; anything starting with `y` or `s` confirms.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleConfirmation;

#[async_trait]
impl ExitConfirmation for ConsoleConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = io::stdout().flush();

        let answer = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => matches!(
                line.trim().chars().next(),
                Some('y') | Some('Y') | Some('s') | Some('S')
            ),
            _ => false,
        }
    }
}
