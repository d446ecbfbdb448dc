//! Simulate voice-platform webhook calls against a running pharmacy agent.
//!
//! Usage:
//!   simulate-webhook [--url <url>] [--action start|end|save|flow|custom]
//!   simulate-webhook --action save --name "Jane Roe" --phone 555-0100
//!   simulate-webhook --action custom --payload payload.json

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pharmacy_agent::simulator::{SamplePatient, Simulator, DEFAULT_WEBHOOK_URL};

#[derive(Parser)]
#[command(name = "simulate-webhook")]
#[command(about = "Simulate voice-agent webhook calls for the pharmacy agent", long_about = None)]
struct Cli {
    /// Webhook URL
    #[arg(long, default_value = DEFAULT_WEBHOOK_URL)]
    url: String,

    /// Action to simulate
    #[arg(long, value_enum, default_value_t = Action::Flow)]
    action: Action,

    /// Patient name (for save action)
    #[arg(long)]
    name: Option<String>,

    /// Patient date of birth (for save action)
    #[arg(long)]
    dob: Option<String>,

    /// Patient phone number (for save action)
    #[arg(long)]
    phone: Option<String>,

    /// Patient visit reason (for save action)
    #[arg(long)]
    reason: Option<String>,

    /// JSON file with custom payload (for custom action)
    #[arg(long)]
    payload: Option<PathBuf>,

    /// Store file to print after a save, when the service shares this directory
    #[arg(long, default_value = "data.json")]
    data_file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Action {
    Start,
    End,
    Save,
    Flow,
    Custom,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let simulator = Simulator::new(cli.url, cli.data_file);

    let result = match cli.action {
        Action::Start => simulator.call_started().await.map(drop),
        Action::End => simulator.call_ended().await.map(drop),
        Action::Save => {
            let patient = SamplePatient::default().with_overrides(cli.name, cli.dob, cli.phone, cli.reason);
            simulator.save_data(&patient).await.map(drop)
        }
        Action::Flow => simulator.full_flow().await,
        Action::Custom => match cli.payload {
            Some(path) => simulator.custom(&path).await.map(drop),
            None => {
                eprintln!("Error: --payload file is required for custom action");
                return;
            }
        },
    };

    // Smoke-test aid: report and exit normally either way.
    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }
}
