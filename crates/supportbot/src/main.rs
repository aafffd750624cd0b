// supportbot/crates/supportbot/src/main.rs

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::io::{self, BufRead, Write};
#[cfg(feature = "cli")]
use supportbot::{config::Config, new_session_id, telemetry, utils::TextUtils, SupportBot};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "supportbot", version, about = "Rule-based customer-support assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Command {
    /// Chat on stdin; `quit` or `exit` ends the session
    Chat,
    /// Message and session totals
    Stats,
    /// Most recent logged messages, newest first
    Logs {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Intent frequencies over user messages
    Intents,
    /// Most recently started sessions
    Sessions {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Pattern and response counts per intent
    Coverage,
    /// Delete every logged message and session
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing();

    let cfg = Config::from_env()?;
    cfg.print_config();
    let bot = SupportBot::from_config(&cfg)?;
    let store = &bot.database().conversations;

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => chat(&bot)?,
        Command::Stats => {
            let totals = store.fetch_totals()?;
            println!("Total messages: {}", totals.total_messages);
            println!("Total sessions: {}", totals.total_sessions);
            println!("User messages:  {}", totals.user_messages);
            println!("Bot messages:   {}", totals.bot_messages);
        }
        Command::Logs { limit } => {
            for m in store.fetch_recent_messages(limit.unwrap_or(cfg.recent_limit))? {
                println!(
                    "{} [{}] {:<4} {:<10} {:<6} {}",
                    m.timestamp,
                    m.session_id,
                    m.role.as_str(),
                    m.intent.as_deref().unwrap_or("-"),
                    m.confidence.map(|c| c.as_str()).unwrap_or("-"),
                    TextUtils::preview(&m.message, 80),
                );
            }
        }
        Command::Intents => {
            for row in store.fetch_intent_counts()? {
                println!("{:<12} {}", row.intent, row.count);
            }
        }
        Command::Sessions { limit } => {
            for s in store.fetch_session_stats(limit.unwrap_or(cfg.session_limit))? {
                println!("{}  started {}  messages {}", s.session_id, s.started_at, s.message_count);
            }
        }
        Command::Coverage => {
            for row in bot.chatbot().knowledge().coverage() {
                println!("{:<12} patterns {:>3}  responses {:>3}", row.intent, row.patterns, row.responses);
            }
        }
        Command::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to clear the conversation log without --yes");
            }
            store.clear_all()?;
            println!("All conversations and sessions deleted.");
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn chat(bot: &SupportBot) -> anyhow::Result<()> {
    let session_id = new_session_id();
    println!("Support chat (session {}). Type 'help' for topics, 'quit' to leave.", session_id);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim_end_matches(['\r', '\n']);
        if matches!(message.trim().to_lowercase().as_str(), "quit" | "exit") {
            break;
        }

        let result = bot.respond(&session_id, message)?;
        println!("{}", result.response);
        println!("[{} · {}]", result.intent, result.confidence);
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    println!("CLI feature not enabled. Enable with --features cli");
}
