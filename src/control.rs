use configuration::BotConfig;
use core_types::{CoreError, StrategyKind};
use events::LogMessage;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::mpsc;

/// Console commands understood by `run` while the engine is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Strategy(StrategyKind),
    /// Stop the strategy and flatten the book, without leaving the loop.
    Panic,
    Status,
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Expected start, stop, strategy <kind>, panic or status.")]
    Unknown(String),

    #[error("'strategy' needs a pattern: gartley, butterfly or bat.")]
    MissingStrategy,

    #[error(transparent)]
    Strategy(#[from] CoreError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        match verb.as_str() {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "panic" => Ok(Command::Panic),
            "status" => Ok(Command::Status),
            "strategy" => {
                let kind = words.next().ok_or(CommandError::MissingStrategy)?;
                Ok(Command::Strategy(kind.parse()?))
            }
            _ => Err(CommandError::Unknown(line.trim().to_string())),
        }
    }
}

impl Command {
    /// The configuration after this command, plus the activity entry announcing it.
    /// `None` for commands that leave the configuration alone.
    pub fn reconfigure(&self, config: &BotConfig) -> Option<(BotConfig, LogMessage)> {
        match self {
            Command::Start => Some((config.with_running(true), LogMessage::success("Bot engine STARTED."))),
            Command::Stop => Some((config.with_running(false), LogMessage::warning("Bot engine STOPPED."))),
            Command::Strategy(kind) => {
                let next = BotConfig {
                    strategy: *kind,
                    ..config.clone()
                };
                let log = LogMessage::info(format!("Strategy set to {}. {}", kind, kind.description()));
                Some((next, log))
            }
            Command::Panic => Some((config.with_running(false), LogMessage::warning("Bot engine STOPPED."))),
            Command::Status => None,
        }
    }
}

/// Streams stdin lines to the runner until stdin closes.
///
/// Reads on a dedicated thread, so a pending read never holds up runtime shutdown.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read from stdin; console commands disabled.");
                    break;
                }
            }
        }
    });
    rx
}
