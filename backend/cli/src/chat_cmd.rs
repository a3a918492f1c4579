//! CLI Chat Command
//!
//! Interactive conversation on stdin. Lines starting with `/` are commands;
//! anything else is sent as a turn in the current mode.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use shaman_config::ShamanConfig;
use shaman_core::Mode;
use shaman_turn::{
    Conversation, ConversationExporter, HttpRelayTransport, ImageAttachment, TurnController, TurnOutcome,
    UserTurn,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::resolve_image;
use crate::terminal_output::{note_error, note_info, print_message};

const HELP: &str = "Commands:
  /mode <chat|graph|draw>  switch the mode for the next turns
  /image <path|data-uri>   attach an image to the next turn
  /image                   drop the pending image
  /export <file.html>      save the conversation as HTML
  /help                    show this help
  /quit                    leave";

#[derive(Debug, PartialEq)]
enum ChatInput {
    Say(String),
    SetMode(Mode),
    Attach(String),
    Detach,
    Export(PathBuf),
    Help,
    Quit,
    Invalid(String),
}

fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return ChatInput::Say(line.to_string());
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "mode" => match arg.parse() {
            Ok(mode) => ChatInput::SetMode(mode),
            Err(e) => ChatInput::Invalid(format!("{e}")),
        },
        "image" if arg.is_empty() => ChatInput::Detach,
        "image" => ChatInput::Attach(arg.to_string()),
        "export" if arg.is_empty() => ChatInput::Invalid("usage: /export <file.html>".into()),
        "export" => ChatInput::Export(PathBuf::from(arg)),
        "help" => ChatInput::Help,
        "quit" | "exit" => ChatInput::Quit,
        other => ChatInput::Invalid(format!("unknown command /{other}, try /help")),
    }
}

pub async fn run(config: &ShamanConfig, initial_mode: Mode) -> Result<()> {
    let transport = Arc::new(HttpRelayTransport::new(&config.client.relay_url));
    let conversation = Arc::new(RwLock::new(Conversation::new()));
    let controller = TurnController::new(config.client.clone(), transport, Arc::clone(&conversation));
    let assistant = config.client.assistant_name.as_str();

    let mut mode = initial_mode;
    let mut image: Option<ImageAttachment> = None;

    note_info(&format!("Talking to {} via {} (mode: {mode}). /help for commands.", assistant, config.client.relay_url));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("[{mode}] > ");
        let _ = std::io::stderr().flush();

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            ChatInput::Say(text) => {
                let mut turn = UserTurn::text(text, mode);
                if let Some(attached) = image.take() {
                    turn = turn.with_image(attached);
                }
                let message_id = match controller.send(turn).await {
                    TurnOutcome::Skipped => continue,
                    TurnOutcome::Rendered { message_id, .. } | TurnOutcome::Failed { message_id, .. } => {
                        message_id
                    }
                };
                let conversation = conversation.read().await;
                if let Some(message) = conversation.get(message_id) {
                    print_message(&mut std::io::stdout(), message, assistant)?;
                }
            }
            ChatInput::SetMode(next) => {
                mode = next;
                note_info(&format!("Mode: {mode}"));
            }
            ChatInput::Attach(arg) => match resolve_image(&arg).await {
                Ok(attached) => {
                    debug!(mime = %attached.mime_type, "Image attached");
                    note_info(&format!("Image attached ({})", attached.mime_type));
                    image = Some(attached);
                }
                Err(e) => note_error(&format!("{e:#}")),
            },
            ChatInput::Detach => {
                image = None;
                note_info("Image dropped");
            }
            ChatInput::Export(path) => {
                let exporter = ConversationExporter::new(assistant);
                match exporter.export_html(&*conversation.read().await, &path).await {
                    Ok(written) => note_info(&format!("Saved to {}", written.display())),
                    Err(e) => note_error(&format!("{e:#}")),
                }
            }
            ChatInput::Help => eprintln!("{HELP}"),
            ChatInput::Quit => break,
            ChatInput::Invalid(msg) => note_error(&msg),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_a_turn() {
        assert_eq!(parse_input("  draw a cat \n"), ChatInput::Say("draw a cat".into()));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_input("/mode Graph"), ChatInput::SetMode(Mode::Graph));
        assert_eq!(parse_input("/image ./cat.png"), ChatInput::Attach("./cat.png".into()));
        assert_eq!(parse_input("/image"), ChatInput::Detach);
        assert_eq!(parse_input("/export out.html"), ChatInput::Export(PathBuf::from("out.html")));
        assert_eq!(parse_input("/exit"), ChatInput::Quit);
        assert!(matches!(parse_input("/mode paint"), ChatInput::Invalid(_)));
        assert!(matches!(parse_input("/export"), ChatInput::Invalid(_)));
        assert!(matches!(parse_input("/nope"), ChatInput::Invalid(_)));
    }
}
