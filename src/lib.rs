use std::sync::Arc;

use crate::audit::AuditLog;
use crate::config::Config;
use crate::confirm::ConfirmBroker;
use crate::platform::{ChannelRef, Chat, Moderation};

pub mod audit;
pub mod common;
pub mod config;
pub mod confirm;
pub mod discord;
pub mod platform;
pub mod plugins;

/// Everything a command handler is allowed to touch.
///
/// Handed to every plugin instead of a process-wide client singleton; each
/// component uses the capability handles it needs and nothing else.
pub struct Bot {
    pub config: Config,
    pub chat: Arc<dyn Chat>,
    pub moderation: Arc<dyn Moderation>,
    pub confirm: ConfirmBroker,
    pub audit: AuditLog,
}

impl Bot {
    /// Sends an outcome message back to the origin channel. A failed send
    /// only gets a trace line; nothing here may take the event loop down.
    pub async fn say(&self, channel: ChannelRef, text: &str) {
        if let Err(error) = self.chat.send(channel, text).await {
            tracing::warn!("could not send message: {error}");
        }
    }
}
