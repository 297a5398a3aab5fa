mod display;
mod prompt;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use moodlayer_client::config::{DEFAULT_CONTRACT_ADDRESS, DEFAULT_ENDPOINT};
use moodlayer_client::receipt::{
    DEFAULT_RECEIPT_INTERVAL, DEFAULT_RECEIPT_RETRIES, ReceiptWait, TxStatus,
};
use moodlayer_client::{AdviceService, ClientConfig};
use moodlayer_core::{MoodData, MoodDataBuilder};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "moodlayer", version, about = "Mood assessment with on-chain AI advice")]
struct Cli {
    /// JSON-RPC endpoint of the network.
    #[arg(long, env = "MOODLAYER_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    endpoint: String,

    /// Address of the mood-advisor contract.
    #[arg(long, env = "MOODLAYER_CONTRACT", default_value = DEFAULT_CONTRACT_ADDRESS, global = true)]
    contract: String,

    /// Access key for the signing gateway. Without it, sample advice is shown.
    #[arg(long, env = "MOODLAYER_KEY", hide_env_values = true, global = true)]
    key: Option<String>,

    /// Sender address for raw contract calls.
    #[arg(long, env = "MOODLAYER_ACCOUNT", global = true)]
    account: Option<String>,

    /// Maximum receipt polls before giving up.
    #[arg(long, env = "MOODLAYER_RECEIPT_RETRIES", default_value_t = DEFAULT_RECEIPT_RETRIES, global = true)]
    receipt_retries: u32,

    /// Delay between receipt polls, in milliseconds.
    #[arg(long, env = "MOODLAYER_RECEIPT_INTERVAL_MS", default_value_t = (DEFAULT_RECEIPT_INTERVAL.as_millis() as u64), global = true)]
    receipt_interval_ms: u64,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the questionnaire.
    Questions,
    /// Submit an assessment and show the advice.
    Submit {
        /// Rating as key=value, e.g. --rating joyful=4. Repeatable.
        #[arg(long = "rating", short = 'r', value_parser = prompt::parse_rating_arg)]
        ratings: Vec<(String, i64)>,
        /// JSON object of ratings, applied before --rating flags.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Ask each question on the terminal.
        #[arg(long, short = 'i')]
        interactive: bool,
    },
    /// Show the latest advice stored in the contract.
    Latest,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            contract_address: self.contract.clone(),
            credential: self.key.clone(),
            account: self.account.clone(),
            receipt: ReceiptWait {
                status: TxStatus::Accepted,
                retries: self.receipt_retries,
                interval: Duration::from_millis(self.receipt_interval_ms),
            },
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("moodlayer=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("moodlayer v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Command::Questions => display::print_questions(cli.json)?,
        Command::Submit {
            ratings,
            file,
            interactive,
        } => {
            let mood = collect_mood(ratings, file.as_ref(), *interactive)?;
            let config = cli
                .client_config()
                .validated()
                .context("invalid client configuration")?;
            if let Some(line) = progress_line(&config) {
                eprintln!("{line}");
            }
            let service =
                AdviceService::from_config(config).context("invalid client configuration")?;
            let submission = service.submit(&mood).await;
            display::print_submission(&mood, &submission, cli.json)?;
        }
        Command::Latest => {
            let service = AdviceService::from_config(cli.client_config())
                .context("invalid client configuration")?;
            match service
                .latest_advice()
                .await
                .context("reading latest advice")?
            {
                Some(advice) => display::print_advice(&advice, cli.json)?,
                None => anyhow::bail!("no access key configured; set MOODLAYER_KEY or --key"),
            }
        }
    }

    Ok(())
}

/// Ratings from the JSON file, then the flags, then the terminal prompt.
fn collect_mood(
    ratings: &[(String, i64)],
    file: Option<&PathBuf>,
    interactive: bool,
) -> anyhow::Result<MoodData> {
    let mut builder = MoodDataBuilder::default();

    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading ratings from {}", path.display()))?;
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
            .with_context(|| format!("{} is not a JSON object", path.display()))?;
        builder = builder.merge_json(&object)?;
    }

    for (key, value) in ratings {
        builder.set(key, *value)?;
    }

    if interactive {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        builder = prompt::ask_all(builder, &mut stdin.lock(), &mut stdout)?;
    }

    Ok(builder.build())
}

/// Notice printed before a submission that will reach the network. Without a
/// key the service answers with sample advice at once.
fn progress_line(config: &ClientConfig) -> Option<&'static str> {
    config
        .has_credential()
        .then_some("Submitting assessment and waiting for the network to accept it...")
}
