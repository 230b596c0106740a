//! Capability seam between the bot logic and the host platform client.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuildRef(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelRef(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: u64,
    pub name: String,
}

impl UserRef {
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    // "name (ID: 123)", the form used in audit lines and the ban list
    pub fn tag(&self) -> String {
        format!("{} (ID: {})", self.name, self.id)
    }
}

/// One entry of the platform's ban list. Read-only view.
#[derive(Debug, Clone)]
pub struct BanEntry {
    pub user: UserRef,
    pub reason: Option<String>,
}

/// A single inbound message as the plugins see it.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub guild: Option<GuildRef>,
    pub channel: ChannelRef,
    pub author: UserRef,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("missing permission")]
    PermissionDenied,
    #[error("{0}")]
    Platform(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no member matching `{0}`")]
    NotFound(String),
    #[error("{0}")]
    Platform(String),
}

/// Plain message-channel access.
#[async_trait]
pub trait Chat: Send + Sync {
    async fn send(&self, channel: ChannelRef, text: &str) -> Result<MessageRef, ActionError>;

    async fn react(
        &self,
        channel: ChannelRef,
        message: MessageRef,
        emoji: &str,
    ) -> Result<(), ActionError>;
}

/// Guild moderation calls. The permission queries answer the single
/// capability flag the platform already tracks for the asking member.
#[async_trait]
pub trait Moderation: Send + Sync {
    async fn can_kick(&self, guild: GuildRef, user: &UserRef) -> Result<bool, ActionError>;

    async fn can_ban(&self, guild: GuildRef, user: &UserRef) -> Result<bool, ActionError>;

    /// Turns a target argument (mention or raw ID) into a member of `guild`.
    async fn resolve_member(&self, guild: GuildRef, token: &str) -> Result<UserRef, ResolveError>;

    async fn kick(
        &self,
        guild: GuildRef,
        user: &UserRef,
        reason: Option<&str>,
    ) -> Result<(), ActionError>;

    async fn ban(
        &self,
        guild: GuildRef,
        user: &UserRef,
        reason: Option<&str>,
    ) -> Result<(), ActionError>;

    async fn unban(&self, guild: GuildRef, user: &UserRef) -> Result<(), ActionError>;

    async fn bans(&self, guild: GuildRef) -> Result<Vec<BanEntry>, ActionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_tag_carries_name_and_id() {
        let user = UserRef {
            id: 123,
            name: "alice".to_string(),
        };
        assert_eq!(user.tag(), "alice (ID: 123)");
        assert_eq!(user.mention(), "<@123>");
    }
}
