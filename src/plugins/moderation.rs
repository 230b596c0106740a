use tracing::{debug, error};

use crate::audit::{AuditAction, NO_REASON};
use crate::common::{clamp_message, convec, crash_condition};
use crate::confirm::{self, Decision, APPROVE, DENY};
use crate::platform::{ActionError, GuildRef, Inbound, ResolveError};
use crate::Bot;

// command dispatch: first word routes, the rest are arguments
pub async fn mod_main(bot: &Bot, message: &Inbound) {
    if !bot.config.moderation.enabled {
        return;
    };

    // moderation only exists inside a guild
    let Some(guild) = message.guild else {
        return;
    };

    if crash_condition(&message.content, None) {
        return;
    };

    let Some(rest) = message.content.strip_prefix(bot.config.bot.prefix.as_str()) else {
        return;
    };
    let convec = convec(rest);
    let Some((&head, args)) = convec.split_first() else {
        return;
    };

    match head {
        "kick" => gated(bot, message, guild, args, Gated::Kick).await,
        "ban" => gated(bot, message, guild, args, Gated::Ban).await,
        "unban" => unban(bot, message, guild, args).await,
        "banlist" => banlist(bot, message, guild).await,
        _ => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gated {
    Kick,
    Ban,
}

impl Gated {
    fn verb(self) -> &'static str {
        match self {
            Gated::Kick => "kick",
            Gated::Ban => "ban",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Gated::Kick => "Kick",
            Gated::Ban => "Ban",
        }
    }
}

/// Kick and ban share one shape: capability check, target resolution,
/// reaction confirmation, then the platform call. Only ban is audited.
async fn gated(bot: &Bot, message: &Inbound, guild: GuildRef, args: &[&str], kind: Gated) {
    let allowed = match kind {
        Gated::Kick => bot.moderation.can_kick(guild, &message.author).await,
        Gated::Ban => bot.moderation.can_ban(guild, &message.author).await,
    };
    match allowed {
        Ok(true) => {}
        Ok(false) => {
            // same as the host framework's permission check: no reply
            debug!("{} refused: {} lacks the flag", kind.verb(), message.author.name);
            return;
        }
        Err(error) => {
            bot.say(message.channel, &format!("\u{274C} {} failed: {error}", kind.noun()))
                .await;
            return;
        }
    }

    let Some((&target_token, reason_words)) = args.split_first() else {
        let usage = format!(
            "Usage: `{}{} @member [reason]`",
            bot.config.bot.prefix,
            kind.verb()
        );
        bot.say(message.channel, &usage).await;
        return;
    };

    let target = match bot.moderation.resolve_member(guild, target_token).await {
        Ok(target) => target,
        Err(ResolveError::NotFound(token)) => {
            bot.say(
                message.channel,
                &format!("\u{274C} Could not find member `{token}`."),
            )
            .await;
            return;
        }
        Err(ResolveError::Platform(error)) => {
            bot.say(message.channel, &format!("\u{274C} {} failed: {error}", kind.noun()))
                .await;
            return;
        }
    };
    let reason = (!reason_words.is_empty()).then(|| reason_words.join(" "));

    let emphasis = match kind {
        Gated::Kick => "kick",
        Gated::Ban => "**ban**",
    };
    let prompt = format!(
        "{}, are you sure you want to {emphasis} {}? React with {APPROVE} to confirm or {DENY} to cancel.",
        message.author.mention(),
        target.mention()
    );

    let decision = match confirm::request_confirmation(
        bot.chat.as_ref(),
        &bot.confirm,
        message.channel,
        &message.author,
        &prompt,
        APPROVE,
        DENY,
        bot.config.confirm_timeout(),
    )
    .await
    {
        Ok(decision) => decision,
        Err(error) => {
            bot.say(message.channel, &format!("\u{274C} {error}")).await;
            return;
        }
    };

    match decision {
        Decision::Approved => {}
        Decision::Denied => {
            bot.say(message.channel, &format!("{} cancelled.", kind.noun()))
                .await;
            return;
        }
        Decision::Expired => {
            bot.say(message.channel, &format!("No response. {} cancelled.", kind.noun()))
                .await;
            return;
        }
    }

    let outcome = match kind {
        Gated::Kick => bot.moderation.kick(guild, &target, reason.as_deref()).await,
        Gated::Ban => bot.moderation.ban(guild, &target, reason.as_deref()).await,
    };

    match outcome {
        Ok(()) => {
            if kind == Gated::Ban {
                // the ban already stands; a failed write is operator news only
                if let Err(error) = bot
                    .audit
                    .record(AuditAction::Ban, &target, &message.author, reason.as_deref())
                    .await
                {
                    error!("{error}");
                }
            }
            let past = match kind {
                Gated::Kick => "kicked",
                Gated::Ban => "**banned**",
            };
            bot.say(
                message.channel,
                &format!(
                    "{} has been {past}. Reason: {}",
                    target.mention(),
                    reason.as_deref().unwrap_or(NO_REASON)
                ),
            )
            .await;
        }
        Err(ActionError::PermissionDenied) => {
            bot.say(
                message.channel,
                &format!(
                    "\u{274C} I don't have permission to {} this user.",
                    kind.verb()
                ),
            )
            .await;
        }
        Err(ActionError::Platform(error)) => {
            bot.say(message.channel, &format!("\u{274C} {} failed: {error}", kind.noun()))
                .await;
        }
    }
}

/// Unban by username, no confirmation gate. The first case-insensitive
/// match in platform enumeration order wins; two banned accounts sharing a
/// name resolve to whichever the platform lists first.
async fn unban(bot: &Bot, message: &Inbound, guild: GuildRef, args: &[&str]) {
    match bot.moderation.can_ban(guild, &message.author).await {
        Ok(true) => {}
        Ok(false) => {
            debug!("unban refused: {} lacks the flag", message.author.name);
            return;
        }
        Err(error) => {
            bot.say(message.channel, &format!("\u{274C} Unban failed: {error}"))
                .await;
            return;
        }
    }

    if args.is_empty() {
        let usage = format!("Usage: `{}unban username`", bot.config.bot.prefix);
        bot.say(message.channel, &usage).await;
        return;
    }
    let username = args.join(" ");

    let entries = match bot.moderation.bans(guild).await {
        Ok(entries) => entries,
        Err(error) => {
            bot.say(message.channel, &format!("\u{274C} Unban failed: {error}"))
                .await;
            return;
        }
    };

    let needle = username.to_lowercase();
    let Some(entry) = entries
        .iter()
        .find(|entry| entry.user.name.to_lowercase() == needle)
    else {
        bot.say(
            message.channel,
            &format!("\u{274C} Could not find a banned user named `{username}`."),
        )
        .await;
        return;
    };

    match bot.moderation.unban(guild, &entry.user).await {
        Ok(()) => {
            if let Err(error) = bot
                .audit
                .record(AuditAction::Unban, &entry.user, &message.author, None)
                .await
            {
                error!("{error}");
            }
            bot.say(
                message.channel,
                &format!("{} has been unbanned.", entry.user.mention()),
            )
            .await;
        }
        Err(ActionError::PermissionDenied) => {
            bot.say(
                message.channel,
                "\u{274C} I don't have permission to unban this user.",
            )
            .await;
        }
        Err(ActionError::Platform(error)) => {
            bot.say(message.channel, &format!("\u{274C} Unban failed: {error}"))
                .await;
        }
    }
}

async fn banlist(bot: &Bot, message: &Inbound, guild: GuildRef) {
    match bot.moderation.can_ban(guild, &message.author).await {
        Ok(true) => {}
        Ok(false) => {
            debug!("banlist refused: {} lacks the flag", message.author.name);
            return;
        }
        Err(error) => {
            bot.say(message.channel, &format!("\u{274C} Ban list failed: {error}"))
                .await;
            return;
        }
    }

    let entries = match bot.moderation.bans(guild).await {
        Ok(entries) => entries,
        Err(error) => {
            bot.say(message.channel, &format!("\u{274C} Ban list failed: {error}"))
                .await;
            return;
        }
    };

    if entries.is_empty() {
        bot.say(message.channel, "\u{2705} No users are currently banned.")
            .await;
        return;
    }

    let mut text = String::from("**\u{1F512} Banned Users:**\n");
    for entry in &entries {
        text += &format!(
            "- {} \u{2014} Reason: {}\n",
            entry.user.tag(),
            entry.reason.as_deref().unwrap_or(NO_REASON)
        );
    }

    bot.say(message.channel, &clamp_message(text)).await;
}
