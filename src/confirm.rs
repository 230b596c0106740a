//! Reaction confirmation gate shared by the destructive moderation commands.
//!
//! A command hands its prompt to [`request_confirmation`], which posts the
//! prompt, attaches the approve/deny reactions and suspends until the asking
//! moderator reacts or the timeout runs out. Reaction events reach the wait
//! through [`ConfirmBroker::deliver`], fed by the gateway reaction handler.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::platform::{ChannelRef, Chat, MessageRef, UserRef};

pub const APPROVE: &str = "\u{1F44D}";
pub const DENY: &str = "\u{274C}";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one confirmation prompt. Settled exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Denied,
    Expired,
}

#[derive(Debug, Error)]
#[error("could not set up confirmation prompt: {0}")]
pub struct PromptSetupFailed(pub String);

struct Pending {
    actor: u64,
    approve: String,
    deny: String,
    tx: oneshot::Sender<Decision>,
}

/// Outstanding confirmation prompts, keyed by prompt message.
///
/// The lock is only ever held for map operations, never across an await, so
/// any number of prompts can wait concurrently.
#[derive(Default)]
pub struct ConfirmBroker {
    pending: Mutex<HashMap<MessageRef, Pending>>,
}

impl ConfirmBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(
        &self,
        prompt: MessageRef,
        actor: &UserRef,
        approve: &str,
        deny: &str,
    ) -> oneshot::Receiver<Decision> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(
            prompt,
            Pending {
                actor: actor.id,
                approve: approve.to_string(),
                deny: deny.to_string(),
                tx,
            },
        );
        rx
    }

    /// Feeds one reaction event. Returns whether a wait was settled.
    ///
    /// The (actor, token, prompt) triple is matched under the lock; a
    /// response from anyone but the registered actor, or with a token other
    /// than the two registered ones, leaves the wait untouched.
    pub fn deliver(&self, prompt: MessageRef, responder: u64, emoji: &str) -> bool {
        let mut pending = self.pending.lock().unwrap();
        let Some(wait) = pending.get(&prompt) else {
            return false;
        };
        if wait.actor != responder || (emoji != wait.approve && emoji != wait.deny) {
            return false;
        }
        let wait = pending.remove(&prompt).unwrap();
        let decision = if emoji == wait.approve {
            Decision::Approved
        } else {
            Decision::Denied
        };
        // the receiver may already have timed out; nothing to do then
        let _ = wait.tx.send(decision);
        true
    }

    fn forget(&self, prompt: MessageRef) {
        self.pending.lock().unwrap().remove(&prompt);
    }

    #[cfg(test)]
    fn outstanding(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

/// Posts `prompt_text` to `channel`, attaches the two reaction affordances
/// and waits for `actor` to answer with one of them.
///
/// Resolves to [`Decision::Expired`] when `timeout` elapses first. The
/// caller owns whatever destructive action the prompt was gating; this
/// function only ever reports the decision.
pub async fn request_confirmation(
    chat: &dyn Chat,
    broker: &ConfirmBroker,
    channel: ChannelRef,
    actor: &UserRef,
    prompt_text: &str,
    approve: &str,
    deny: &str,
    timeout: Duration,
) -> Result<Decision, PromptSetupFailed> {
    let prompt = chat
        .send(channel, prompt_text)
        .await
        .map_err(|error| PromptSetupFailed(error.to_string()))?;

    // both affordances must be attached before the wait starts
    futures_util::try_join!(
        chat.react(channel, prompt, approve),
        chat.react(channel, prompt, deny),
    )
    .map_err(|error| PromptSetupFailed(error.to_string()))?;

    let rx = broker.register(prompt, actor, approve, deny);

    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(decision)) => Ok(decision),
        Ok(Err(_)) | Err(_) => {
            broker.forget(prompt);
            Ok(Decision::Expired)
        }
    }
}
