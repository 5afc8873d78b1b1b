use std::io::Write;
use std::sync::Arc;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing_subscriber::EnvFilter;

use hydrogen_chat::adapters::ReqwestHttpClient;
use hydrogen_chat::cli::render::{
    format_history, format_outcome, format_sessions, format_transition,
};
use hydrogen_chat::cli::{parse_args, version_string, CliCommand, USAGE};
use hydrogen_chat::client::ChatClient;
use hydrogen_chat::config::ClientConfig;
use hydrogen_chat::conversation::Conversation;
use hydrogen_chat::error::ChatError;
use hydrogen_chat::orchestrator::{StreamOrchestrator, StreamUpdate, TurnOutcome};

const REPL_HELP: &str = "\
/history        show history
/sessions       list sessions
/switch <id>    switch session
/new            start a new session
/agent          show the active agent
/delete <id>    delete a message
/clear          clear history
/send <text>    send without streaming
/quit           exit";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print one live update. Returns whether reply text was printed.
fn print_update(update: &StreamUpdate) -> bool {
    let StreamUpdate::Transition(transition) = update else {
        return false;
    };
    let Some(text) = format_transition(transition) else {
        return false;
    };
    print!("{}", text);
    let _ = std::io::stdout().flush();
    matches!(
        transition,
        hydrogen_chat::state::Transition::ContentAppended { .. }
    )
}

fn report(err: &ChatError) {
    tracing::debug!(category = %err.category(), code = err.error_code(), error = %err, "request failed");
    eprintln!("error: {}", err.user_message());
    eprintln!("hint: {}", err.recovery_hint());
}

struct Cli {
    orchestrator: StreamOrchestrator,
    updates: UnboundedReceiver<StreamUpdate>,
    conversation: Conversation,
}

impl Cli {
    async fn chat(&mut self, text: &str) {
        let mut streamed = false;
        let result = {
            let turn = self.orchestrator.run(text, &mut self.conversation);
            tokio::pin!(turn);
            loop {
                tokio::select! {
                    result = &mut turn => break result,
                    Some(update) = self.updates.recv() => streamed |= print_update(&update),
                }
            }
        };
        while let Ok(update) = self.updates.try_recv() {
            streamed |= print_update(&update);
        }
        if streamed {
            println!();
        }

        match result {
            Ok(TurnOutcome::Completed { .. }) if streamed => {}
            Ok(outcome) => println!("{}", format_outcome(&outcome, &self.conversation.session)),
            Err(err) => report(&err),
        }
    }

    async fn send(&mut self, text: &str) {
        match self.orchestrator.send(text, &mut self.conversation).await {
            Ok(outcome) => println!("{}", format_outcome(&outcome, &self.conversation.session)),
            Err(err) => report(&err),
        }
        // Non-streaming turns only publish Finished
        while self.updates.try_recv().is_ok() {}
    }

    async fn history(&mut self) {
        if let Err(err) = self.conversation.load_history(self.orchestrator.api()).await {
            report(&err);
        }
        println!("{}", format_history(&self.conversation.session));
    }

    async fn sessions(&mut self) {
        match self.conversation.list_sessions(self.orchestrator.api()).await {
            Ok(sessions) => println!("{}", format_sessions(&sessions)),
            Err(err) => report(&err),
        }
    }

    async fn agent(&mut self) {
        if let Err(err) = self.conversation.load_active_agent(self.orchestrator.api()).await {
            report(&err);
        }
        let session = &self.conversation.session;
        println!("{} ({})", session.active_agent_label, session.active_agent);
    }

    async fn clear(&mut self) {
        match self.conversation.clear_history(self.orchestrator.api()).await {
            Ok(()) => println!("cleared session '{}'", self.conversation.session_id()),
            Err(err) => report(&err),
        }
    }

    async fn switch(&mut self, session_id: &str) {
        if let Err(err) = self
            .conversation
            .switch_session(self.orchestrator.api(), session_id)
            .await
        {
            report(&err);
        }
        println!("{}", format_history(&self.conversation.session));
    }

    async fn delete(&mut self, raw_id: &str) {
        let Ok(message_id) = raw_id.trim().parse::<i64>() else {
            eprintln!("error: '{}' is not a message id", raw_id);
            return;
        };
        if let Err(err) = self
            .conversation
            .delete_message(self.orchestrator.api(), message_id)
            .await
        {
            tracing::debug!(error = %err, "remote delete failed");
        }
    }

    async fn repl(&mut self) -> Result<()> {
        if let Err(err) = self.conversation.load_history(self.orchestrator.api()).await {
            report(&err);
        }
        let _ = self.conversation.load_active_agent(self.orchestrator.api()).await;
        println!(
            "session '{}' with {} (/help for commands)",
            self.conversation.session_id(),
            self.conversation.session.active_agent_label
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
            match command {
                "/quit" | "/exit" => break,
                "/help" => println!("{}", REPL_HELP),
                "/history" => self.history().await,
                "/sessions" => self.sessions().await,
                "/agent" => self.agent().await,
                "/clear" => self.clear().await,
                "/new" => println!("session '{}'", self.conversation.new_session()),
                "/switch" if !rest.trim().is_empty() => self.switch(rest.trim()).await,
                "/delete" => self.delete(rest).await,
                "/send" if !rest.trim().is_empty() => self.send(rest.trim()).await,
                _ if command.starts_with('/') => eprintln!("unknown command; /help lists them"),
                _ => self.chat(line).await,
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let args = parse_args(std::env::args()).map_err(|e| eyre!("{}\n\n{}", e, USAGE))?;
    match args.command {
        CliCommand::Version => {
            println!("{}", version_string());
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        _ => {}
    }

    let mut config = ClientConfig::from_env()?;
    if let Some(session) = args.session {
        config = config.with_session_id(session);
    }
    config.validate()?;

    let http = ReqwestHttpClient::with_connect_timeout(config.connect_timeout)?;
    let client = ChatClient::new(config.base_url.clone(), Arc::new(http))
        .with_session_token(config.session_token.clone());
    let (tx, rx) = mpsc::unbounded_channel();
    let mut cli = Cli {
        orchestrator: StreamOrchestrator::new(Arc::new(client)).with_updates(tx),
        updates: rx,
        conversation: Conversation::new(config.session_id.clone()),
    };
    tracing::debug!(base_url = %config.base_url, session_id = %config.session_id, "client ready");

    match args.command {
        CliCommand::Chat(text) => cli.chat(&text).await,
        CliCommand::Send(text) => cli.send(&text).await,
        CliCommand::History => cli.history().await,
        CliCommand::Sessions => cli.sessions().await,
        CliCommand::Agent => cli.agent().await,
        CliCommand::Clear => cli.clear().await,
        CliCommand::New => println!("{}", cli.conversation.new_session()),
        CliCommand::Repl => cli.repl().await?,
        CliCommand::Version | CliCommand::Help => {}
    }
    Ok(())
}
