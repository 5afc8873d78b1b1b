//! Command-line argument parsing for the `hydrogen` binary.

use thiserror::Error;

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Send one message over the streaming endpoint
    Chat(String),
    /// Send one message over the non-streaming endpoint
    Send(String),
    /// Print the session's history
    History,
    /// List stored sessions
    Sessions,
    /// Show the session's active agent
    Agent,
    /// Clear the session's history
    Clear,
    /// Print a fresh session id
    New,
    /// Interactive prompt (default)
    Repl,
}

/// Arguments after parsing
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    /// `--session <id>` override
    pub session: Option<String>,
    pub command: CliCommand,
}

#[derive(Debug, Error, PartialEq)]
pub enum UsageError {
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("unknown argument '{0}'")]
    Unknown(String),
}

pub const USAGE: &str = "\
usage: hydrogen [--session <id>] [command]

commands:
  chat <text>   send a message and stream the reply
  send <text>   send a message without streaming
  history       print the conversation history
  sessions      list stored sessions
  agent         show the active agent
  clear         clear the conversation history
  new           print a fresh session id
  (none)        interactive prompt

options:
  --session <id>   session to use (default: $HYDROGEN_SESSION or 'default')
  -V, --version    print version
  -h, --help       print this help";

/// Parse command-line arguments, program name first.
pub fn parse_args<I>(args: I) -> Result<CliArgs, UsageError>
where
    I: Iterator<Item = String>,
{
    let mut args = args.skip(1);
    let mut session = None;
    let mut command = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => command = Some(CliCommand::Version),
            "--help" | "-h" => command = Some(CliCommand::Help),
            "--session" | "-s" => {
                session = Some(args.next().ok_or(UsageError::MissingValue("--session"))?);
            }
            "chat" | "send" => {
                let text = args.by_ref().collect::<Vec<_>>().join(" ");
                if text.trim().is_empty() {
                    return Err(UsageError::MissingValue(if arg == "chat" {
                        "chat"
                    } else {
                        "send"
                    }));
                }
                command = Some(if arg == "chat" {
                    CliCommand::Chat(text)
                } else {
                    CliCommand::Send(text)
                });
            }
            "history" => command = Some(CliCommand::History),
            "sessions" => command = Some(CliCommand::Sessions),
            "agent" => command = Some(CliCommand::Agent),
            "clear" => command = Some(CliCommand::Clear),
            "new" => command = Some(CliCommand::New),
            _ => return Err(UsageError::Unknown(arg)),
        }
        // --version and --help win over everything else
        if matches!(command, Some(CliCommand::Version | CliCommand::Help)) {
            break;
        }
    }

    Ok(CliArgs {
        session,
        command: command.unwrap_or(CliCommand::Repl),
    })
}
