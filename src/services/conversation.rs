use std::sync::{Arc, MutexGuard};

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{Command, ConversationEntry, ConversationLog, Speaker};
use crate::services::assistant::{dispatch, interpret};
use crate::state::AppState;

/// One completed utterance: what was understood and what the assistant said.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantTurn {
    pub command: Command,
    pub reply: String,
}

/// Run a single utterance through the assistant.
///
/// Turns are serialized: a second utterance waits until the first one's
/// reply has been recorded.
pub async fn process_utterance(state: &Arc<AppState>, text: &str) -> anyhow::Result<AssistantTurn> {
    let _turn = state.pipeline.lock().await;

    let text = text.trim();
    record_entry(state, Speaker::User, text)?;

    let command = interpret(text);
    tracing::info!(
        intent = command.intent.as_str(),
        slots = ?command.parameters,
        "processing utterance"
    );

    let reply = dispatch(command.clone(), state.store.as_ref(), state.clock.now()).await;

    record_entry(state, Speaker::Assistant, &reply)?;

    Ok(AssistantTurn { command, reply })
}

pub fn snapshot(state: &AppState) -> anyhow::Result<Vec<ConversationEntry>> {
    Ok(lock_log(state)?.entries())
}

/// Current log plus a receiver for every entry recorded after it.
pub fn subscribe(
    state: &AppState,
) -> anyhow::Result<(Vec<ConversationEntry>, broadcast::Receiver<ConversationEntry>)> {
    let log = lock_log(state)?;
    Ok((log.entries(), state.events_tx.subscribe()))
}

pub fn conversation_len(state: &AppState) -> anyhow::Result<usize> {
    Ok(lock_log(state)?.len())
}

fn record_entry(state: &AppState, speaker: Speaker, text: &str) -> anyhow::Result<()> {
    let mut log = lock_log(state)?;
    let entry = log.push(speaker, text);
    // No subscribers is fine
    let _ = state.events_tx.send(entry);
    Ok(())
}

fn lock_log(state: &AppState) -> anyhow::Result<MutexGuard<'_, ConversationLog>> {
    state
        .conversation
        .lock()
        .map_err(|_| anyhow::anyhow!("conversation lock poisoned"))
}
