use indexmap::IndexMap;

use crate::platform::Inbound;
use crate::Bot;

pub mod message;
pub mod moderation;

/// Ordered command table, used for help rendering. Registered once at
/// startup and never changed.
pub fn commands() -> IndexMap<&'static str, &'static str> {
    IndexMap::from([
        ("kick", "Kicks a member after reaction confirmation"),
        ("ban", "Bans a member after reaction confirmation"),
        ("unban", "Unbans a user by name"),
        ("banlist", "Lists banned users and their reasons"),
        ("modhelp", "Displays this message"),
        ("ver", "Displays version"),
    ])
}

/// Entry point for one inbound message; every plugin sees every message.
pub async fn handle_message(bot: &Bot, message: &Inbound) {
    tokio::join!(
        message::message_main(bot, message),
        moderation::mod_main(bot, message),
    );
}
