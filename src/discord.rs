//! Discord binding: capability implementations over the serenity REST
//! client plus the gateway event handlers.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    ChannelId, Client, Context, EventHandler, GatewayIntents, GuildId, Message, MessageId,
    Permissions, Reaction, ReactionType, Ready, RoleId, UserId,
};
use serenity::http::{Http, HttpError};
use tracing::{debug, info};

use crate::audit::AuditLog;
use crate::config::Config;
use crate::confirm::ConfirmBroker;
use crate::platform::{
    ActionError, BanEntry, ChannelRef, Chat, GuildRef, Inbound, MessageRef, Moderation,
    ResolveError, UserRef,
};
use crate::{plugins, Bot};

fn to_action(error: serenity::Error) -> ActionError {
    match &error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 403 =>
        {
            ActionError::PermissionDenied
        }
        _ => ActionError::Platform(error.to_string()),
    }
}

pub struct Discord {
    http: Arc<Http>,
}

impl Discord {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    // Effective guild-wide permissions: the union of the member's role
    // permissions, with owner and administrator short-circuiting to all.
    async fn member_permissions(
        &self,
        guild: GuildRef,
        user: &UserRef,
    ) -> Result<Permissions, ActionError> {
        let guild_id = GuildId::new(guild.0);
        let partial = guild_id
            .to_partial_guild(&self.http)
            .await
            .map_err(to_action)?;
        if partial.owner_id.get() == user.id {
            return Ok(Permissions::all());
        }

        let member = guild_id
            .member(&self.http, UserId::new(user.id))
            .await
            .map_err(to_action)?;
        let roles = guild_id.roles(&self.http).await.map_err(to_action)?;

        // @everyone carries the guild's ID
        let mut permissions = roles
            .get(&RoleId::new(guild.0))
            .map(|role| role.permissions)
            .unwrap_or_else(Permissions::empty);
        for role_id in &member.roles {
            if let Some(role) = roles.get(role_id) {
                permissions |= role.permissions;
            }
        }

        if permissions.contains(Permissions::ADMINISTRATOR) {
            return Ok(Permissions::all());
        }
        Ok(permissions)
    }
}

#[async_trait]
impl Chat for Discord {
    async fn send(&self, channel: ChannelRef, text: &str) -> Result<MessageRef, ActionError> {
        let message = ChannelId::new(channel.0)
            .say(&self.http, text)
            .await
            .map_err(to_action)?;
        Ok(MessageRef(message.id.get()))
    }

    async fn react(
        &self,
        channel: ChannelRef,
        message: MessageRef,
        emoji: &str,
    ) -> Result<(), ActionError> {
        self.http
            .create_reaction(
                ChannelId::new(channel.0),
                MessageId::new(message.0),
                &ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(to_action)
    }
}

#[async_trait]
impl Moderation for Discord {
    async fn can_kick(&self, guild: GuildRef, user: &UserRef) -> Result<bool, ActionError> {
        Ok(self
            .member_permissions(guild, user)
            .await?
            .contains(Permissions::KICK_MEMBERS))
    }

    async fn can_ban(&self, guild: GuildRef, user: &UserRef) -> Result<bool, ActionError> {
        Ok(self
            .member_permissions(guild, user)
            .await?
            .contains(Permissions::BAN_MEMBERS))
    }

    async fn resolve_member(&self, guild: GuildRef, token: &str) -> Result<UserRef, ResolveError> {
        let Some(id) = crate::common::parse_user_token(token) else {
            return Err(ResolveError::NotFound(token.to_string()));
        };
        match GuildId::new(guild.0).member(&self.http, UserId::new(id)).await {
            Ok(member) => Ok(UserRef {
                id: member.user.id.get(),
                name: member.user.name.clone(),
            }),
            Err(serenity::Error::Http(HttpError::UnsuccessfulRequest(response)))
                if response.status_code.as_u16() == 404 =>
            {
                Err(ResolveError::NotFound(token.to_string()))
            }
            Err(error) => Err(ResolveError::Platform(error.to_string())),
        }
    }

    async fn kick(
        &self,
        guild: GuildRef,
        user: &UserRef,
        reason: Option<&str>,
    ) -> Result<(), ActionError> {
        let guild_id = GuildId::new(guild.0);
        let user_id = UserId::new(user.id);
        match reason {
            Some(reason) => guild_id.kick_with_reason(&self.http, user_id, reason).await,
            None => guild_id.kick(&self.http, user_id).await,
        }
        .map_err(to_action)
    }

    async fn ban(
        &self,
        guild: GuildRef,
        user: &UserRef,
        reason: Option<&str>,
    ) -> Result<(), ActionError> {
        let guild_id = GuildId::new(guild.0);
        let user_id = UserId::new(user.id);
        match reason {
            Some(reason) => {
                guild_id
                    .ban_with_reason(&self.http, user_id, 0, reason)
                    .await
            }
            None => guild_id.ban(&self.http, user_id, 0).await,
        }
        .map_err(to_action)
    }

    async fn unban(&self, guild: GuildRef, user: &UserRef) -> Result<(), ActionError> {
        GuildId::new(guild.0)
            .unban(&self.http, UserId::new(user.id))
            .await
            .map_err(to_action)
    }

    async fn bans(&self, guild: GuildRef) -> Result<Vec<BanEntry>, ActionError> {
        let bans = GuildId::new(guild.0)
            .bans(&self.http, None, None)
            .await
            .map_err(to_action)?;
        Ok(bans
            .into_iter()
            .map(|ban| BanEntry {
                user: UserRef {
                    id: ban.user.id.get(),
                    name: ban.user.name.clone(),
                },
                reason: ban.reason,
            })
            .collect())
    }
}

struct Handler {
    bot: Arc<Bot>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("logged in as {}", ready.user.name);
    }

    async fn message(&self, _ctx: Context, message: Message) {
        if message.author.bot {
            return;
        };
        let inbound = Inbound {
            guild: message.guild_id.map(|id| GuildRef(id.get())),
            channel: ChannelRef(message.channel_id.get()),
            author: UserRef {
                id: message.author.id.get(),
                name: message.author.name.clone(),
            },
            content: message.content.clone(),
        };
        plugins::handle_message(&self.bot, &inbound).await;
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        let Some(user_id) = reaction.user_id else {
            return;
        };
        let ReactionType::Unicode(emoji) = &reaction.emoji else {
            return;
        };
        let settled = self.bot.confirm.deliver(
            MessageRef(reaction.message_id.get()),
            user_id.get(),
            emoji,
        );
        if settled {
            debug!("confirmation prompt {} settled", reaction.message_id);
        };
    }
}

/// Connects to the gateway and runs until the process stops.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let token = config.bot.token.clone();
    let http = Arc::new(Http::new(&token));
    let caps = Arc::new(Discord::new(http));

    let bot = Arc::new(Bot {
        chat: caps.clone(),
        moderation: caps,
        confirm: ConfirmBroker::new(),
        audit: AuditLog::new(&config.bot.log_file),
        config,
    });

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS;

    let mut client = Client::builder(&token, intents)
        .event_handler(Handler { bot })
        .await?;

    info!("websocket established");
    client.start().await?;
    Ok(())
}
