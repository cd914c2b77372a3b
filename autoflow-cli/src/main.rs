//! Autoflow binary: manage a directory of stored flows and run them against
//! the simulated platform services.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio_stream::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use autoflow::platform::FlowServices;
use autoflow::{FlowEngine, FlowGraph, FlowStore, RunState};

#[derive(Parser, Debug)]
#[command(name = "autoflow")]
#[command(about = "Inspect, validate, and run flow automation graphs")]
struct Args {
    /// Directory holding stored flows
    #[arg(short, long, value_name = "DIR", default_value = "flows")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored flows, most recently updated first
    List,
    /// Print one stored flow as JSON
    Show { id: String },
    /// Check a flow file for structural problems
    Validate { path: PathBuf },
    /// Import a flow file into the store under a fresh id
    Import { path: PathBuf },
    /// Export a stored flow to a file
    Export { id: String, target: PathBuf },
    /// Delete a stored flow
    Delete { id: String },
    /// Run a stored flow with simulated platform services
    Run { id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    match execute(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = FlowStore::open(&args.store)?;

    match args.command {
        Command::List => {
            let flows = store.list_all()?;
            if flows.is_empty() {
                println!("no flows in {}", args.store.display());
            }
            for flow in flows {
                println!(
                    "{}  {}  ({} nodes, {} edges)",
                    flow.id,
                    flow.name,
                    flow.nodes.len(),
                    flow.edges.len()
                );
            }
        }
        Command::Show { id } => {
            let Some(flow) = store.load(&id) else {
                eprintln!("flow not found: {id}");
                return Ok(ExitCode::FAILURE);
            };
            println!("{}", serde_json::to_string_pretty(&flow)?);
        }
        Command::Validate { path } => {
            let text = std::fs::read_to_string(&path)?;
            let flow: FlowGraph = serde_json::from_str(&text)?;
            match flow.validate() {
                Ok(()) => println!("ok: {}", flow.name),
                Err(e) => {
                    eprintln!("invalid: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Import { path } => {
            let flow = store.import_from(&path)?;
            println!("imported {} as {}", flow.name, flow.id);
        }
        Command::Export { id, target } => {
            if store.export_to(&id, &target)? {
                println!("exported {id} to {}", target.display());
            } else {
                eprintln!("flow not found: {id}");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Delete { id } => {
            if store.delete(&id) {
                println!("deleted {id}");
            } else {
                eprintln!("flow not found: {id}");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Run { id } => {
            let Some(flow) = store.load(&id) else {
                eprintln!("flow not found: {id}");
                return Ok(ExitCode::FAILURE);
            };
            info!(flow = %flow.name, "starting run");
            let engine = FlowEngine::new(FlowServices::simulated());
            let mut states = engine.start(flow)?;
            while let Some(state) = states.next().await {
                match &state {
                    RunState::Running { label, .. } => println!("-> {label}"),
                    RunState::NodeCompleted { node_id } => {
                        println!("   done {node_id}");
                    }
                    _ => {}
                }
                if let Some(line) = terminal_line(&state) {
                    if matches!(state, RunState::Failed { .. }) {
                        eprintln!("{line}");
                        return Ok(ExitCode::FAILURE);
                    }
                    println!("{line}");
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Summary line for a terminal run state. Labels are absent when the run
/// ended before any node executed.
fn terminal_line(state: &RunState) -> Option<String> {
    match state {
        RunState::Succeeded { last_label } => Some(format!(
            "flow succeeded (last node: {})",
            last_label.as_deref().unwrap_or("<none>")
        )),
        RunState::Failed { label, reason, .. } => Some(format!(
            "flow failed at {}: {reason}",
            label.as_deref().unwrap_or("<no node>")
        )),
        RunState::Stopped { last_label } => Some(format!(
            "flow stopped (last node: {})",
            last_label.as_deref().unwrap_or("<none>")
        )),
        RunState::Running { .. } | RunState::NodeCompleted { .. } => None,
    }
}
