use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::models::{ConversationEntry, ConversationLog};
use crate::services::assistant::rules::GREETING;
use crate::services::clock::Clock;
use crate::services::store::AppointmentStore;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub store: Box<dyn AppointmentStore>,
    pub clock: Box<dyn Clock>,
    pub conversation: Mutex<ConversationLog>,
    /// Held for the whole of one utterance so commands run strictly in order.
    pub pipeline: tokio::sync::Mutex<()>,
    pub events_tx: broadcast::Sender<ConversationEntry>,
}

impl AppState {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        config: AppConfig,
        store: Box<dyn AppointmentStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(256);
        let log = ConversationLog::with_greeting(GREETING, config.conversation_limit);
        Self {
            db,
            config,
            store,
            clock,
            conversation: Mutex::new(log),
            pipeline: tokio::sync::Mutex::new(()),
            events_tx,
        }
    }
}
