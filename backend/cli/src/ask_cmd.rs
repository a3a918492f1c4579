//! CLI Ask Command
//!
//! Runs a single turn and prints the rendered reply.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use shaman_config::ShamanConfig;
use shaman_core::Mode;
use shaman_markdown::{mount_reply, PlainTextMount};
use shaman_turn::{
    Conversation, ConversationExporter, HttpRelayTransport, TurnController, TurnOutcome, UserTurn,
};
use tokio::sync::RwLock;

use crate::config::resolve_image;
use crate::terminal_output::note_info;

pub struct AskArgs {
    pub prompt: String,
    pub mode: Mode,
    pub image: Option<String>,
    pub html: Option<PathBuf>,
}

pub async fn run(config: &ShamanConfig, args: AskArgs) -> Result<()> {
    let mut turn = UserTurn::text(args.prompt, args.mode);
    if let Some(image) = &args.image {
        turn = turn.with_image(resolve_image(image).await?);
    }

    let transport = Arc::new(HttpRelayTransport::new(&config.client.relay_url));
    let conversation = Arc::new(RwLock::new(Conversation::new()));
    let controller = TurnController::new(config.client.clone(), transport, Arc::clone(&conversation));

    let outcome = controller.send(turn).await;

    if let Some(path) = &args.html {
        let exporter = ConversationExporter::new(&config.client.assistant_name);
        let written = exporter.export_html(&*conversation.read().await, path).await?;
        note_info(&format!("Saved conversation to {}", written.display()));
    }

    match outcome {
        TurnOutcome::Skipped => bail!("Nothing to send: give a prompt or --image"),
        TurnOutcome::Rendered { reply, .. } => {
            println!("{}", mount_reply(PlainTextMount::new(), &reply));
            Ok(())
        }
        TurnOutcome::Failed { error, .. } => bail!(error),
    }
}
