use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use mailsmith::{
    ConfigLoader, EmailAssistant, FollowUpRequest, ReplyRequest, RewriteMode, RewriteRequest,
};

#[derive(Parser)]
#[command(name = "mailsmith")]
#[command(version, about = "AI email assistant: replies, rewrites, intent detection")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults + mailsmith.toml + MAILSMITH_* env when absent)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Client identifier for rate limiting
    #[arg(long, default_value = "cli")]
    client: String,

    #[arg(long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a reply to an email (content from arg or stdin)
    Reply {
        content: Option<String>,

        /// Tone: professional, formal, casual, friendly, apologetic
        #[arg(long)]
        tone: Option<String>,

        /// Prompt version: v1, v2, v3
        #[arg(long)]
        version: Option<String>,

        /// Provider name (defaults to the configured default)
        #[arg(long)]
        provider: Option<String>,
    },
    /// Rewrite an email: polish, shorten, expand, make_formal, generate_reply
    Rewrite {
        mode: String,
        content: Option<String>,

        #[arg(long)]
        tone: Option<String>,

        /// Prompt version: v1, v2, v3 (only affects generate_reply)
        #[arg(long)]
        version: Option<String>,

        #[arg(long)]
        provider: Option<String>,
    },
    /// Detect the intent of an email
    Intent { content: Option<String> },
    /// Suggest three subject lines
    Subjects { content: Option<String> },
    /// Summarize an email into summary, action items, and deadlines
    Summarize { content: Option<String> },
    /// Score an email's sentiment, politeness, and professionalism
    Quality { content: Option<String> },
    /// Show the effective configuration
    Config {
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
    /// Generate a follow-up for an unanswered email
    FollowUp {
        content: Option<String>,

        /// 1 = first nudge, 2 = second, 3+ = final
        #[arg(long, default_value_t = 1)]
        number: u8,

        #[arg(long, default_value_t = 3)]
        days: u32,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "mailsmith=debug" } else { "mailsmith=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Use the argument when given, otherwise read the email from stdin.
fn content_or_stdin(content: Option<String>) -> mailsmith::Result<String> {
    match content {
        Some(c) => Ok(c),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer.trim().to_string())
        }
    }
}

async fn run(cli: Cli) -> mailsmith::Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    // Display-only: no providers (and thus no API keys) needed.
    if let Commands::Config { json } = &cli.command {
        println!("{}", ConfigLoader::render(&config, *json)?);
        return Ok(());
    }

    let assistant = EmailAssistant::from_config(&config)?;
    let client = cli.client.as_str();

    match cli.command {
        Commands::Reply {
            content,
            tone,
            version,
            provider,
        } => {
            let request = ReplyRequest {
                content: content_or_stdin(content)?,
                tone: tone.map(|t| t.parse()).transpose()?,
                version: version.map(|v| v.parse()).transpose()?,
                provider,
            };
            println!("{}", assistant.generate_reply(client, &request).await?);
        }
        Commands::Rewrite {
            mode,
            content,
            tone,
            version,
            provider,
        } => {
            let request = RewriteRequest {
                content: content_or_stdin(content)?,
                mode: mode.parse::<RewriteMode>()?,
                tone: tone.map(|t| t.parse()).transpose()?,
                version: version.map(|v| v.parse()).transpose()?,
                provider,
            };
            println!("{}", assistant.rewrite(client, &request).await?);
        }
        Commands::Intent { content } => {
            let classification = assistant
                .classify_intent(client, &content_or_stdin(content)?)
                .await?;
            println!("{}", serde_json::to_string_pretty(&classification)?);
        }
        Commands::Subjects { content } => {
            let subjects = assistant
                .subject_lines(client, &content_or_stdin(content)?)
                .await?;
            for subject in subjects {
                println!("{}", subject);
            }
        }
        Commands::Summarize { content } => {
            let summary = assistant
                .summarize(client, &content_or_stdin(content)?)
                .await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Quality { content } => {
            let score = assistant
                .score_quality(client, &content_or_stdin(content)?)
                .await?;
            println!("{}", serde_json::to_string_pretty(&score)?);
        }
        Commands::Config { .. } => unreachable!("handled before service construction"),
        Commands::FollowUp {
            content,
            number,
            days,
        } => {
            let request = FollowUpRequest {
                content: content_or_stdin(content)?,
                follow_up_number: number,
                days_passed: days,
                provider: None,
            };
            println!("{}", assistant.follow_up(client, &request).await?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
