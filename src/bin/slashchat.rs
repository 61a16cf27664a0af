use anyhow::Result;
use slashchat::api::ApiClient;
use slashchat::commands::{classify, filter_commands, is_command_mode};
use slashchat::config::Config;
use slashchat::state::{ChatSession, ConversationUpdate};
use slashchat::types::Role;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

fn print_prompt(session: &ChatSession) -> Result<()> {
    print!("{}> ", session.current_agent());
    std::io::stdout().flush()?;
    Ok(())
}

/// Line-mode stand-in for a completion menu: typing a bare `/prefix` lists
/// the matching commands instead of sending anything.
fn print_suggestions(input: &str) {
    let matches = filter_commands(input);
    if matches.is_empty() {
        println!("no matching commands");
        return;
    }
    for command in matches {
        println!("  {:<10} {}", command.trigger, command.description);
    }
}

async fn render_updates(mut rx: mpsc::UnboundedReceiver<ConversationUpdate>) {
    let mut stdout = std::io::stdout();
    while let Some(update) = rx.recv().await {
        match update {
            ConversationUpdate::Delta { text, .. } => {
                let _ = write!(stdout, "{text}");
                let _ = stdout.flush();
            }
            ConversationUpdate::MessageStarted { message } if message.role == Role::Assistant => {
                if let Some(agent) = message.agent {
                    let _ = write!(stdout, "[{agent}] ");
                    let _ = stdout.flush();
                }
            }
            ConversationUpdate::MessageSettled { .. } => {
                let _ = writeln!(stdout);
            }
            ConversationUpdate::ErrorSurfaced { message } => {
                let _ = writeln!(stdout, "error: {message}");
            }
            ConversationUpdate::MessageStarted { .. } | ConversationUpdate::AgentSelected { .. } => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let client = ApiClient::new(&config);

    match client.check_health().await {
        Ok(health) => {
            println!("backend: {} ({} agents loaded)", health.status, health.agent_count)
        }
        Err(error) => eprintln!("warning: {error}"),
    }
    match client.list_agents().await {
        Ok(roster) => {
            for agent in &roster.agents {
                println!("  /{:<9} {}", agent.id, agent.description);
            }
        }
        Err(error) => eprintln!("warning: {error}"),
    }
    println!("type a message, /command message, /clear, or /quit");

    let session = ChatSession::new(client);
    let (tx, rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(render_updates(rx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(&session)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" => break,
            "/clear" => {
                session.clear();
                continue;
            }
            _ => {}
        }

        // A bare /prefix is still command entry, not a message.
        if is_command_mode(input) {
            print_suggestions(input);
            continue;
        }

        let parsed = classify(input);
        session
            .send_message(&parsed.message, parsed.agent, Some(&tx))
            .await;
    }

    drop(tx);
    let _ = renderer.await;
    Ok(())
}
