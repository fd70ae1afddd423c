use clap::{Parser, Subcommand};
use serde::Serialize;
use spending_tracker::aggregator::{
    daily_category_totals, monthly_category_totals, total_by_period, weekly_category_totals,
    yearly_category_totals,
};
use spending_tracker::gemini::{GeminiClient, TextGenerator};
use spending_tracker::summarizer::Summarizer;
use spending_tracker::{Config, Result, Tracker};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Up Bank spending totals and Q&A from the terminal.
#[derive(Debug, Parser)]
#[command(name = "tracker", version)]
struct Args {
    /// Ignore the cached transactions and fetch everything again.
    #[arg(long, global = true)]
    refresh: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Outflows per category for each day
    Daily,
    /// Outflows per category for each ISO week
    Weekly,
    /// Outflows per category for each month
    Monthly,
    /// Outflows per category for each year
    Yearly,
    /// Money in and out for each month
    Totals,
    /// The cleaned, categorised transactions
    Transactions,
    /// Ask a question about monthly spending
    Ask {
        /// The question, e.g. "how much did I spend on takeaway in March?"
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logger();
    let args = Args::parse();

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn main_inner(args: Args) -> Result<()> {
    debug!("{args:?}");
    let config = Config::from_env()?;

    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::from_config(&config)?);
    let mut tracker = Tracker::from_config(&config, generator.clone())?;
    let transactions = tracker.transactions(args.refresh).await?;

    match args.command {
        Command::Daily => print_json(&daily_category_totals(&transactions)),
        Command::Weekly => print_json(&weekly_category_totals(&transactions)),
        Command::Monthly => print_json(&monthly_category_totals(&transactions)),
        Command::Yearly => print_json(&yearly_category_totals(&transactions)),
        Command::Totals => print_json(&total_by_period(&transactions)),
        Command::Transactions => print_json(&transactions),
        Command::Ask { question } => {
            let summarizer = Summarizer::new(generator);
            let monthly = monthly_category_totals(&transactions);
            let answer = summarizer.summarize(&monthly, &question.join(" ")).await?;
            println!("{answer}");
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Logs go to stderr so stdout stays pipeable.
fn init_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("spending_tracker=info,tracker=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
