use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use ticket_triage::{
    batch::{prediction_rows, BatchFormat},
    config::TriageConfig,
    ml::{BatchStats, TriageService},
    models::Ticket,
    priority::PriorityEngine,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ticket-triage")]
#[command(about = "Support ticket triage", long_about = None, version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "TRIAGE_CONFIG_PATH", default_value = "config/triage.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage a single ticket
    Classify {
        #[arg(short, long, default_value = "")]
        title: String,

        #[arg(short, long, default_value = "")]
        body: String,
    },

    /// Triage a file of tickets
    Batch {
        /// Input file: CSV with title and body columns, or JSON lines
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// csv or jsonl; taken from the input extension when omitted
        #[arg(short, long)]
        format: Option<BatchFormat>,
    },

    /// Show which priority rules match a text, without any model
    Rules {
        #[arg(short, long)]
        text: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = TriageConfig::load_from(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;

    init_tracing(&config);

    match cli.command {
        Commands::Classify { title, body } => {
            let service = TriageService::from_config(&config)?;
            let outcome = service.triage(&Ticket::new(title, body))?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        Commands::Batch {
            input,
            output,
            format,
        } => {
            let format = format
                .or_else(|| BatchFormat::from_path(&input))
                .unwrap_or_default();

            let service = TriageService::from_config(&config)?;
            let file = File::open(&input).with_context(|| format!("cannot open {}", input.display()))?;
            let tickets = format.read_tickets(BufReader::new(file))?;
            let results = service.triage_batch(&tickets);

            let stats = BatchStats::from_results(&results);
            tracing::info!(
                total = stats.total,
                failed = stats.failed,
                needs_review = stats.needs_review,
                "Batch complete"
            );
            for (idx, result) in results.iter().enumerate() {
                if let Err(e) = result {
                    tracing::warn!("Ticket {} failed: {}", idx, e);
                }
            }

            let writer: Box<dyn Write> = match output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(&path).with_context(|| format!("cannot create {}", path.display()))?,
                )),
                None => Box::new(BufWriter::new(std::io::stdout().lock())),
            };
            format.write_rows(writer, &prediction_rows(&tickets, &results))?;
        }

        Commands::Rules { text } => {
            let engine = PriorityEngine::new(&config.priority)?;
            let rules = engine.rules();

            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "priority": rules.rule_priority(&text),
                    "matched_patterns": rules.matched_patterns(&text),
                }))?
            );
        }
    }

    Ok(())
}

fn init_tracing(config: &TriageConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("ticket_triage={}", config.observability.log_level).into());

    let json = config.observability.json_logs;

    // Logs go to stderr; stdout carries results
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}
