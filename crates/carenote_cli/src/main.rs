use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{IsTerminal, Read};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use carenote_analytics::{mood_label, quality_score, ContextBuilder, Pipeline};
use carenote_core::{CarenoteConfig, ChatMessage, ChatRole};
use carenote_memory::{JournalCoordinator, SqliteNoteStore, DAILY_CHECK_IN};
use carenote_reasoning::{build_client, CareAssistant, LlmClient, MockProvider, ReportKind};
use chrono::Local;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file (TOML)
    #[arg(short, long, env = "CARENOTE_CONFIG", default_value = "carenote.toml")]
    config: String,

    /// Whose journal to operate on
    #[arg(short, long, env = "CARENOTE_USER", default_value = "default")]
    user: String,

    /// SQLite database path (overrides storage.db_path)
    #[arg(long)]
    db: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a diary or clinical note (text argument or stdin)
    Log {
        #[arg(value_enum)]
        mode: LogMode,
        text: Option<String>,
        /// Format a clinical note as SOAP through the assistant and score it
        #[arg(long)]
        soap: bool,
    },
    /// Print the trend summary as JSON
    Trends,
    /// Print risk advisories, one per line
    Alerts,
    /// Print the assistant context digest
    Context {
        #[arg(long)]
        no_clinical: bool,
        #[arg(long)]
        no_diary: bool,
    },
    /// Send one message to the care assistant
    Chat { message: Option<String> },
    /// Show the logging streak and level
    Streak,
    /// Print the plain-text health report, or an assistant summary
    Report {
        #[arg(long, value_enum)]
        summary: Option<Summary>,
    },
    /// Delete every note of the user
    Wipe {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogMode {
    Diary,
    Clinical,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Summary {
    Weekly,
    HealthTwin,
    MicroHabits,
    QuestionPrep,
    CareCircle,
    Monthly,
    DoctorPrep,
}

impl From<Summary> for ReportKind {
    fn from(s: Summary) -> Self {
        match s {
            Summary::Weekly => ReportKind::Weekly,
            Summary::HealthTwin => ReportKind::HealthTwin,
            Summary::MicroHabits => ReportKind::MicroHabits,
            Summary::QuestionPrep => ReportKind::QuestionPrep,
            Summary::CareCircle => ReportKind::CareCircle,
            Summary::Monthly => ReportKind::Monthly,
            Summary::DoctorPrep => ReportKind::DoctorPrep,
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Text argument, or all of stdin when it is piped.
fn input_text(arg: Option<String>) -> Result<String> {
    if let Some(text) = arg {
        return Ok(text);
    }
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!("No text given: pass it as an argument or pipe it on stdin");
    }
    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(text.trim().to_string())
}

fn llm_client(config: &CarenoteConfig) -> Arc<dyn LlmClient> {
    match build_client(&config.llm) {
        Ok(client) => client,
        Err(e) => {
            warn!("LLM provider unavailable ({:#}), replies will be offline", e);
            Arc::new(MockProvider::failing())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.log_json);

    let mut config = CarenoteConfig::load_or_default(&args.config);
    if let Some(db) = &args.db {
        config.storage.db_path = db.clone();
    }

    let store = Arc::new(SqliteNoteStore::new(&config.storage.db_path).await?);
    let coordinator = JournalCoordinator::new(store, Pipeline::from_config(&config))
        .with_privacy(config.privacy.clone());
    let user = args.user.as_str();

    match args.command {
        Command::Log { mode, text, soap } => {
            let text = input_text(text)?;
            if text.is_empty() {
                anyhow::bail!("Refusing to log an empty note");
            }
            let note = match mode {
                LogMode::Diary => coordinator.log_diary(user, &text, Some(DAILY_CHECK_IN)).await?,
                LogMode::Clinical => {
                    let soap_text = if soap {
                        assistant(&config).format_soap(&text).await
                    } else {
                        None
                    };
                    let note = coordinator.log_clinical(user, &text, soap_text.as_deref()).await?;
                    if let Some(clinical) = &note.clinical {
                        let quality = quality_score(&note.raw_text_redacted, &clinical.soap_text);
                        println!("{}\n", clinical.soap_text);
                        println!("Quality score: {}/100", quality.score);
                        for check in &quality.checks {
                            println!("  [{}] {}", if check.passed { "x" } else { " " }, check.label);
                        }
                    }
                    note
                }
            };
            println!("{}", serde_json::to_string_pretty(&note)?);
        }
        Command::Trends => {
            let trend = coordinator.trends(user).await?;
            println!("{}", serde_json::to_string_pretty(&trend)?);
            if !trend.is_empty() {
                println!("Mood: {}", mood_label(trend.sentiment_avg));
            }
        }
        Command::Alerts => {
            for alert in coordinator.alerts(user).await? {
                println!("{}", alert);
            }
        }
        Command::Context {
            no_clinical,
            no_diary,
        } => {
            println!("{}", coordinator.context(user, !no_clinical, !no_diary).await?);
        }
        Command::Chat { message } => {
            let message = input_text(message)?;
            let context = coordinator.context(user, true, true).await?;
            let reply = assistant(&config).chat_reply(&message, &context, &[]).await;
            println!("{}", reply);

            if let Some(note) = coordinator.log_chat_message(user, &message).await? {
                info!("Chat message logged as {}", note.id);
            }
            let transcript = [
                ChatMessage::new(ChatRole::User, message),
                ChatMessage::new(ChatRole::Assistant, reply),
            ];
            coordinator
                .save_chat_session(user, Uuid::new_v4(), &transcript)
                .await?;
        }
        Command::Streak => {
            let streak = coordinator.streak(user, Local::now().date_naive()).await?;
            println!("Streak: {} day(s)", streak.days);
            println!("Level: {} ({} more note(s) to the next level)", streak.level, streak.next_unlock);
        }
        Command::Report { summary: None } => {
            println!("{}", coordinator.report(user, Local::now().date_naive()).await?);
        }
        Command::Report {
            summary: Some(kind),
        } => {
            let notes = coordinator.notes(user).await?;
            match assistant(&config).report(kind.into(), &notes).await? {
                Some(text) => println!("{}", text),
                None => anyhow::bail!("The assistant could not produce a summary"),
            }
        }
        Command::Wipe { yes } => {
            if !yes {
                anyhow::bail!("Refusing to wipe without --yes");
            }
            let removed = coordinator.wipe(user).await?;
            println!("Removed {} note(s)", removed);
        }
    }

    Ok(())
}

fn assistant(config: &CarenoteConfig) -> CareAssistant {
    let llm = llm_client(config);
    info!("Care assistant using {}", llm.provider_name());
    CareAssistant::new(
        llm,
        ContextBuilder::from_config(&config.context, &config.analysis),
        &config.llm,
    )
}
