//! hyperbio CLI tool.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hyperbio")]
#[command(about = "hyperbio orchestrator CLI", long_about = None)]
struct Cli {
    /// API server URL
    #[arg(long, env = "HYPERBIO_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage jobs
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Drive and inspect the worker
    Worker {
        #[command(subcommand)]
        command: WorkerCommands,
    },
    /// Scheduler triggers
    Scheduler {
        #[command(subcommand)]
        command: SchedulerCommands,
    },
}

#[derive(Subcommand)]
enum JobCommands {
    /// Enqueue a new job
    Enqueue {
        /// Job type, e.g. generate_site
        job_type: String,
        /// JSON payload for the executor
        #[arg(long, default_value = "{}")]
        payload: String,
    },
    /// Show one job
    Get {
        id: i64,
    },
    /// List recent jobs
    List {
        /// Filter by status (queued|running|success|failed)
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
}

#[derive(Subcommand)]
enum WorkerCommands {
    /// Run dispatch cycles
    Tick {
        /// Number of cycles to run
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Show queue depths per status
    Status,
}

#[derive(Subcommand)]
enum SchedulerCommands {
    /// Enqueue the nightly refresh batch
    Nightly,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Jobs { command } => match command {
            JobCommands::Enqueue { job_type, payload } => {
                commands::jobs::enqueue(&cli.api_url, &job_type, &payload).await
            }
            JobCommands::Get { id } => commands::jobs::get(&cli.api_url, id).await,
            JobCommands::List { status, limit } => {
                commands::jobs::list(&cli.api_url, status.as_deref(), limit).await
            }
        },
        Commands::Worker { command } => match command {
            WorkerCommands::Tick { count } => commands::worker::tick(&cli.api_url, count).await,
            WorkerCommands::Status => commands::worker::status(&cli.api_url).await,
        },
        Commands::Scheduler { command } => match command {
            SchedulerCommands::Nightly => commands::scheduler::nightly(&cli.api_url).await,
        },
    }
}
