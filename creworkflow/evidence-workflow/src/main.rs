use std::io::{self, Read};
use std::path::Path;

use evidence_workflow::backend::HttpBackend;
use evidence_workflow::errors::WorkflowError;
use evidence_workflow::handler::{run_batch, unreadable_report, BatchPlan, Workflow};
use evidence_workflow::models::{BatchReport, BatchRequest, WorkflowStep};

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<(), WorkflowError> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| WorkflowError::InvalidRequest(format!("failed reading stdin: {e}")))?;

    let request: BatchRequest = serde_json::from_str(&input)
        .map_err(|e| WorkflowError::InvalidRequest(format!("invalid json input: {e}")))?;
    if request.items.is_empty() {
        return Err(WorkflowError::InvalidRequest(
            "batch has no items".to_string(),
        ));
    }

    let backend = HttpBackend::new(request.api_base_url.clone(), request.bearer_token.clone());
    let mut workflow = Workflow::new(backend);
    let mut plans = Vec::new();
    let mut reports = Vec::new();
    for entry in &request.items {
        match tokio::fs::read(&entry.path).await {
            Ok(bytes) => {
                let file_name = Path::new(&entry.path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| entry.path.clone());
                let item_id = workflow.add_item(file_name, bytes);
                plans.push(BatchPlan {
                    item_id,
                    entry: entry.clone(),
                });
            }
            Err(e) => reports.push(unreadable_report(&entry.path, format!("failed reading file: {e}"))),
        }
    }

    reports.extend(run_batch(&mut workflow, &plans, request.default_state.as_deref()).await);
    let issued = reports
        .iter()
        .filter(|r| r.step == WorkflowStep::Done)
        .count();
    let report = BatchReport {
        issued,
        failed: reports.len() - issued,
        items: reports,
    };

    let output = serde_json::to_string_pretty(&report)
        .map_err(|e| WorkflowError::InvalidRequest(format!("failed serializing output: {e}")))?;
    println!("{output}");
    Ok(())
}
