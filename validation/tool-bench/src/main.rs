//! Benchmark CLI for MCP tool servers.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use experiment::{ExperimentSpec, DEFAULT_ITERATIONS, DEFAULT_MAX_ITERATIONS};
use mcp_protocol::McpClient;
use tool_bench::{
    run_experiment, tools_table, BenchApiClient, OutputFormat, ResultsReport, ScenarioConfig,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "tool-bench")]
#[command(about = "Benchmark tools on MCP servers from the terminal", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tools a server offers
    Tools {
        /// JSON-RPC endpoint of the MCP server
        #[arg(short, long, default_value = "http://localhost:8000/mcp")]
        url: String,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,
    },

    /// Run an experiment against one tool
    Run {
        /// JSON-RPC endpoint of the MCP server
        #[arg(short, long, default_value = "http://localhost:8000/mcp")]
        url: String,

        /// Tool to invoke
        #[arg(short, long)]
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,

        /// Number of sequential invocations
        #[arg(short, long, default_value_t = DEFAULT_ITERATIONS)]
        iterations: u32,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Run an experiment from a scenario file
    Scenario {
        /// Path to scenario YAML file
        #[arg(short, long)]
        file: PathBuf,

        /// Override iteration count
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Fetch an experiment stored by bench-api
    Fetch {
        /// Base URL of bench-api
        #[arg(long, default_value = "http://localhost:5000")]
        api: String,

        /// Experiment id
        #[arg(long)]
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// List available scenarios
    List {
        /// Scenarios directory
        #[arg(short, long, default_value = "validation/tool-bench/scenarios")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Tools { url, timeout_secs } => {
            let client = McpClient::new(url.as_str(), Duration::from_secs(timeout_secs))?;
            let tools = client.list_tools().await?;

            println!("{} tool(s) on {}", tools.len(), url);
            println!("{}", tools_table(&tools));
            Ok(())
        }
        Commands::Run {
            url,
            tool,
            args,
            iterations,
            timeout_secs,
            output,
        } => {
            let spec = ExperimentSpec::new(
                &url,
                &tool,
                args.as_deref(),
                iterations,
                DEFAULT_MAX_ITERATIONS,
            )?;

            let report = run_experiment(
                &spec,
                Duration::from_secs(timeout_secs),
                output == OutputFormat::Table,
            )
            .await?;
            println!("{}", ResultsReport::format(&report, output)?);
            Ok(())
        }
        Commands::Scenario {
            file,
            iterations,
            output,
        } => {
            let mut config = ScenarioConfig::from_file(&file)?;
            if let Some(i) = iterations {
                config.iterations = i;
            }
            config.validate()?;

            if output == OutputFormat::Table {
                println!("✓ Scenario loaded: {}", file.display());
                println!("  Name: {}", config.name);
                if !config.description.is_empty() {
                    println!("  Description: {}", config.description);
                }
                println!("  Tool: {}", config.tool);
                println!("  Iterations: {}", config.iterations);
                println!();
            }

            let spec = config.to_spec()?;
            let report = run_experiment(&spec, config.timeout(), output == OutputFormat::Table)
                .await?;
            println!("{}", ResultsReport::format(&report, output)?);
            Ok(())
        }
        Commands::Fetch { api, id, output } => {
            let client = BenchApiClient::new(&api, Duration::from_secs(30))?;
            let report = client.fetch_experiment(&id).await?;
            println!("{}", ResultsReport::format(&report, output)?);
            Ok(())
        }
        Commands::List { dir } => {
            println!("Available scenarios in {}:", dir.display());
            println!();

            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    eprintln!("Error reading directory: {}", e);
                    return Ok(());
                }
            };

            let mut scenarios = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                let is_yaml = matches!(
                    path.extension().and_then(|s| s.to_str()),
                    Some("yaml") | Some("yml")
                );
                if !is_yaml {
                    continue;
                }
                if let Ok(config) = ScenarioConfig::from_file(&path) {
                    let filename = entry.file_name().to_string_lossy().to_string();
                    scenarios.push((filename, config));
                }
            }
            scenarios.sort_by(|a, b| a.0.cmp(&b.0));

            if scenarios.is_empty() {
                println!("No scenario files found");
            }
            for (filename, config) in scenarios {
                println!("  {} - {} ({} x {})", filename, config.name, config.tool, config.iterations);
                if !config.description.is_empty() {
                    println!("    {}", config.description);
                }
                println!();
            }
            Ok(())
        }
    }
}
