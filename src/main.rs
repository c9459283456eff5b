use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use jobrouter::manager::{JobManager, Submission};
use jobrouter::shutdown::install_shutdown_handler;
use jobrouter::{EchoProgram, JobTable, ManagerConfig};

#[derive(Parser, Debug)]
#[command(name = "jobrouter")]
#[command(version)]
#[command(about = "Demo driver for the job manager")]
struct Args {
    /// Number of execution units in the pool
    #[arg(long, default_value_t = 3)]
    pool_size: usize,

    /// Job names to submit, in order
    #[arg(default_values_t = vec!["routes".to_string(), "objects".to_string()])]
    jobs: Vec<String>,

    /// Per-job delay in milliseconds (simulated work)
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,
}

/// Default job table: the delegated routes plus the one local handler.
fn default_table() -> JobTable {
    let mut table = JobTable::new();
    table.register_delegated("routes", "/routes", "GET");
    table.register_delegated("objects", "/objects", "GET");
    table.register_local(
        "Get Saved Modules",
        Arc::new(|_body| Ok(json!({ "modules": [] }))),
    );
    table
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let shutdown = install_shutdown_handler();

    let (manager, coordinator) = JobManager::spawn(
        ManagerConfig::new(args.pool_size),
        default_table(),
        Arc::new(EchoProgram),
    );

    let mut outcomes = Vec::new();
    for name in &args.jobs {
        let body = json!({ "message": name, "delay_ms": args.delay_ms });
        match manager.submit(body).await {
            Ok(Submission::Local(result)) => {
                println!("{name}: local result {result}");
            }
            Ok(Submission::Delegated { id, outcome }) => {
                println!("{name}: queued as job {id}");
                outcomes.push((name.clone(), id, outcome));
            }
            Err(err) => {
                eprintln!("{name}: {err}");
            }
        }
    }

    for (name, id, outcome) in outcomes {
        tokio::select! {
            result = outcome => match result {
                Ok(outcome) => println!("{name} (job {id}): {outcome:?}"),
                Err(_) => println!("{name} (job {id}): outcome channel closed"),
            },
            _ = shutdown.cancelled() => break,
        }
    }

    manager.shutdown();
    let _ = coordinator.await;
    Ok(())
}
