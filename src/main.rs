//! Terminal client for shop-floor work sessions.
//!
//! ```text
//! apontamento            # talks to the configured session service
//! apontamento --offline  # in-process backend seeded with demo jobs
//! ```

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use apontamento::adapters::{
    ConsoleConfirmation, ConsolePresenter, HttpBackendClient, InMemoryBackend, TickingStopwatch,
};
use apontamento::application::{ControllerOptions, OperatorBoard, SessionController};
use apontamento::config::{AppConfig, LogFormat, LoggingConfig};
use apontamento::domain::foundation::{CompanyId, WorkOrderId};
use apontamento::domain::work_order::{DrawingPath, WorkOrder};
use apontamento::ports::{format_elapsed, BackendClient};

const HELP: &str = "\
commands:
  login <code>             identify the operator and load the queue
  jobs                     list the queued work orders
  open <order> [company]   open a work order
  start | pause            session controls
  finish <qty>             finish with the good quantity
  status                   show the open work order
  refresh                  reload detail and history
  download <order> [dir]   save the order's drawing
  back                     leave the work order
  quit";

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let offline = std::env::args().skip(1).any(|arg| arg == "--offline");
    let backend: Arc<dyn BackendClient> = if offline {
        tracing::info!("running against the in-process backend");
        Arc::new(demo_backend()?)
    } else {
        tracing::info!(base_url = %config.backend.base_url, "running against session service");
        Arc::new(HttpBackendClient::from_config(&config.backend)?)
    };

    let controller = SessionController::new(
        backend.clone(),
        Arc::new(TickingStopwatch::new(config.clock.tick_interval())),
        Arc::new(ConsolePresenter::new()),
        Arc::new(ConsoleConfirmation),
    )
    .with_options(ControllerOptions::from(&config.clock));
    let mut board = OperatorBoard::new(backend);

    if let Some(code) = config.operator.default_code.as_deref() {
        login(&controller, &mut board, code).await;
    }

    println!("{}", HELP);
    loop {
        let Some(line) = prompt().await? else {
            break;
        };
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();

        match (command, args.as_slice()) {
            ("quit" | "exit", _) => {
                if controller.leave().await {
                    break;
                }
            }
            ("help", _) => println!("{}", HELP),
            ("login", [code]) => login(&controller, &mut board, code).await,
            ("jobs", _) => print_jobs(&board),
            ("open", [order, rest @ ..]) => {
                let Some(order) = lookup(&board, order, rest.first().copied()) else {
                    continue;
                };
                if let Err(err) = controller.open(order).await {
                    tracing::debug!(command = "open", error = %err, "command failed");
                }
            }
            ("start", _) => {
                if let Err(err) = controller.start().await {
                    tracing::debug!(command = "start", error = %err, "command failed");
                }
            }
            ("pause", _) => {
                if let Err(err) = controller.pause().await {
                    tracing::debug!(command = "pause", error = %err, "command failed");
                }
            }
            ("finish", [quantity]) => {
                if let Err(err) = controller.finish_with_input(quantity).await {
                    tracing::debug!(command = "finish", error = %err, "command failed");
                }
            }
            ("status", _) => {
                let view = controller.snapshot();
                for line in ConsolePresenter::format_view(&view) {
                    println!("{}", line);
                }
            }
            ("refresh", _) => {
                if let Err(err) = controller.refresh().await {
                    tracing::debug!(command = "refresh", error = %err, "command failed");
                }
            }
            ("download", [order, rest @ ..]) => {
                let Some(order) = lookup(&board, order, None) else {
                    continue;
                };
                let directory = rest.first().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
                match board.download_drawing(&order, &directory).await {
                    Ok(path) => println!("saved {}", path.display()),
                    Err(err) => println!("[error] {}", err.user_message()),
                }
            }
            ("back", _) => {
                if controller.leave().await {
                    if let Err(err) = board.reload().await {
                        println!("[error] {}", err.user_message());
                    }
                    print_jobs(&board);
                }
            }
            _ => println!("unknown command, type 'help'"),
        }
    }

    tracing::info!(elapsed = %format_elapsed(controller.snapshot().elapsed_secs), "exiting");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), BoxError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(logging.env_filter())
        .with_writer(io::stderr);
    match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    }
}

async fn prompt() -> Result<Option<String>, BoxError> {
    print!("> ");
    io::stdout().flush()?;
    let line = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map(|read| (read, line))
    })
    .await??;
    Ok(match line {
        (0, _) => None,
        (_, line) => Some(line),
    })
}

async fn login(controller: &SessionController, board: &mut OperatorBoard, code: &str) {
    if let Err(err) = controller.set_operator(code) {
        println!("[error] {}", err.user_message());
        return;
    }
    match board.load(code).await {
        Ok(_) => {
            if let Some(name) = board.operator_name() {
                println!("Hello, {}.", name);
            }
            print_jobs(board);
        }
        Err(err) => println!("[error] {}", err.user_message()),
    }
}

fn print_jobs(board: &OperatorBoard) {
    if board.jobs().is_empty() {
        println!("No jobs queued.");
        return;
    }
    for job in board.jobs() {
        let progress = job.progress();
        println!(
            "  {:>3} {} ({}) {} {}/{} {}",
            job.queue_position().map(|p| p.to_string()).unwrap_or_default(),
            job.id(),
            job.company(),
            job.description().unwrap_or("-"),
            progress.realized,
            progress.programmed,
            job.unit().unwrap_or("")
        );
    }
}

fn lookup(board: &OperatorBoard, order: &str, company: Option<&str>) -> Option<WorkOrder> {
    let parsed = WorkOrderId::new(order)
        .and_then(|id| company.map(CompanyId::new).transpose().map(|company| (id, company)));
    let (id, company) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            println!("[error] {}", err);
            return None;
        }
    };
    let found = board.find(&id, company.as_ref()).cloned();
    if found.is_none() {
        println!("Work order {} is not in the queue.", id);
    }
    found
}

fn demo_backend() -> Result<InMemoryBackend, BoxError> {
    let bracket = WorkOrder::new(WorkOrderId::new("OF-1001")?, CompanyId::new("1")?)
        .with_operation_sequence(Some(10))
        .with_queue_position(Some(1))
        .with_product(Some("BR-20".to_string()), Some("Bracket 20mm".to_string()))
        .with_unit(Some("PC".to_string()))
        .with_quantities(120.0, 45.0)
        .with_drawing(Some(DrawingPath::new("eng/BR-20.pdf")?))
        .with_operator_name(Some("Demo Operator".to_string()));
    let shaft = WorkOrder::new(WorkOrderId::new("OF-1002")?, CompanyId::new("1")?)
        .with_queue_position(Some(2))
        .with_product(Some("SH-08".to_string()), Some("Shaft 8mm".to_string()))
        .with_unit(Some("PC".to_string()))
        .with_quantities(40.0, 0.0);

    Ok(InMemoryBackend::new()
        .with_job(bracket)
        .with_job(shaft)
        .with_drawing("eng/BR-20.pdf", b"%PDF-1.4 demo drawing".to_vec()))
}
