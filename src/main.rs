use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sahayak::application::assistant::{Assistant, Collaborators};
use sahayak::config::AssistantConfig;
use sahayak::domain::ports::{BankingBackendBox, CodeGeneratorBox, SlotStore, SpeechSynthesizerBox};
use sahayak::infrastructure::clock::SystemClock;
use sahayak::infrastructure::codes::{FixedCodeGenerator, RandomCodeGenerator};
use sahayak::infrastructure::delivery::SmsOutbox;
use sahayak::infrastructure::http_backend::HttpBankingBackend;
use sahayak::infrastructure::in_memory::{InMemoryChallengeStore, InMemorySlotStore};
use sahayak::infrastructure::simulated_bank::SimulatedBank;
use sahayak::infrastructure::speech::{DisabledSynthesizer, HttpSpeechSynthesizer};
use sahayak::interfaces::csv::turn_reader::TurnReader;
use sahayak::interfaces::json::reply_writer::{ReplyRecord, ReplyWriter};
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Replays a voice-banking conversation script and prints one JSON reply per turn.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Conversation script (CSV: sender,intent,lang,text,account_id,from_account,to_account,amount,currency)
    script: PathBuf,

    /// TOML configuration file
    #[arg(long, env = "SAHAYAK_CONFIG")]
    config: Option<PathBuf>,

    /// Banking API root. Without it, turns run against a simulated bank.
    #[arg(long, env = "SECURE_API_BASE")]
    backend_url: Option<String>,

    /// Text-to-speech service endpoint
    #[arg(long, env = "TTS_URL")]
    tts_url: Option<String>,

    /// Issue this code for every challenge instead of a random one
    #[arg(long)]
    fixed_otp: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sahayak=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AssistantConfig::load(path).into_diagnostic()?,
        None => AssistantConfig::default(),
    };
    if let Some(url) = cli.backend_url {
        config.backend.base_url = Some(url);
    }
    if let Some(url) = cli.tts_url {
        config.speech.service_url = Some(url);
    }

    let backend: BankingBackendBox = match &config.backend.base_url {
        Some(url) => {
            info!(%url, "Using banking API");
            Box::new(HttpBankingBackend::new(url.clone()))
        }
        None => {
            info!("No banking API configured, using the simulated bank");
            Box::new(SimulatedBank::demo())
        }
    };
    let speech: SpeechSynthesizerBox = match &config.speech.service_url {
        Some(url) => Box::new(HttpSpeechSynthesizer::new(
            url.clone(),
            config.speech.output_dir.clone(),
        )),
        None => Box::new(DisabledSynthesizer),
    };
    let codes: CodeGeneratorBox = match cli.fixed_otp {
        Some(code) => Box::new(FixedCodeGenerator::new(code)),
        None => Box::new(RandomCodeGenerator),
    };

    let assistant = Assistant::from_config(
        config,
        Collaborators {
            backend,
            challenges: Box::new(InMemoryChallengeStore::new()),
            delivery: Box::new(SmsOutbox::new()),
            speech,
            clock: Box::new(SystemClock),
            codes,
        },
    )
    .into_diagnostic()?;
    let default_locale = assistant.config().default_locale.clone();

    // One slot store per sender, standing in for the dialogue engine's trackers.
    let mut sessions: HashMap<String, InMemorySlotStore> = HashMap::new();

    let file = File::open(cli.script).into_diagnostic()?;
    let reader = TurnReader::new(file);
    let stdout = io::stdout();
    let mut writer = ReplyWriter::new(stdout.lock());

    for row in reader.turns() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                error!(error = %e, "Error reading turn");
                continue;
            }
        };
        let intent = match row.intent() {
            Ok(intent) => intent,
            Err(e) => {
                error!(sender = %row.sender, error = %e, "Skipping turn");
                continue;
            }
        };

        let store = sessions.entry(row.sender.clone()).or_default();
        for op in row.slot_ops() {
            store.set_slot(&op.name, op.value).await.into_diagnostic()?;
        }

        let reply = assistant.handle(intent, &row.to_turn(&default_locale), &*store).await;
        writer
            .write_reply(&ReplyRecord::new(&row.sender, intent.as_str(), &reply))
            .into_diagnostic()?;
    }

    Ok(())
}
