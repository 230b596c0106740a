use crate::platform::Inbound;
use crate::{plugins, Bot};

// main message engine: greetings and the help/version replies
pub async fn message_main(bot: &Bot, message: &Inbound) {
    if !bot.config.message.enabled {
        return;
    };

    if message.content.starts_with("$hello") {
        bot.say(message.channel, "Hello World!").await;
        return;
    };

    if message.content.starts_with("$who") {
        let reply = format!(
            "I am this server's moderation bot. Nice to meet you, {}!",
            message.author.mention()
        );
        bot.say(message.channel, &reply).await;
        return;
    };

    let prefix = &bot.config.bot.prefix;
    let trimmed = message.content.trim();

    if trimmed == format!("{prefix}modhelp") {
        bot.say(message.channel, &help(prefix)).await;
    } else if trimmed == format!("{prefix}ver") {
        bot.say(
            message.channel,
            concat!("Warden ", env!("CARGO_PKG_VERSION")),
        )
        .await;
    };
}

fn help(prefix: &str) -> String {
    let mut help = String::from("### Warden\n");
    for (name, about) in plugins::commands() {
        help += &format!("`{prefix}{name}` {about}\n");
    }
    help
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::moderation::tests::{test_bot, FakeChat, FakeMod};

    fn inbound(content: &str) -> Inbound {
        Inbound {
            guild: None,
            channel: crate::platform::ChannelRef(5),
            author: crate::platform::UserRef {
                id: 42,
                name: "visitor".to_string(),
            },
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn hello_gets_the_fixed_reply() {
        let chat = FakeChat::arc();
        let (bot, _dir) = test_bot(chat.clone(), FakeMod::arc());
        message_main(&bot, &inbound("$hello")).await;
        assert_eq!(chat.sent(), vec!["Hello World!".to_string()]);
    }

    #[tokio::test]
    async fn who_mentions_the_requester() {
        let chat = FakeChat::arc();
        let (bot, _dir) = test_bot(chat.clone(), FakeMod::arc());
        message_main(&bot, &inbound("$who")).await;
        let sent = chat.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("<@42>"));
    }

    #[tokio::test]
    async fn help_lists_every_registered_command() {
        let chat = FakeChat::arc();
        let (bot, _dir) = test_bot(chat.clone(), FakeMod::arc());
        message_main(&bot, &inbound("!modhelp")).await;
        let sent = chat.sent();
        assert_eq!(sent.len(), 1);
        for (name, _) in crate::plugins::commands() {
            assert!(sent[0].contains(&format!("`!{name}`")));
        }
    }

    #[tokio::test]
    async fn version_reply_names_the_build() {
        let chat = FakeChat::arc();
        let (bot, _dir) = test_bot(chat.clone(), FakeMod::arc());
        message_main(&bot, &inbound("!ver")).await;
        let sent = chat.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Warden "));
    }

    #[tokio::test]
    async fn disabled_plugin_stays_silent() {
        let chat = FakeChat::arc();
        let (mut bot, _dir) = test_bot(chat.clone(), FakeMod::arc());
        bot.config.message.enabled = false;
        message_main(&bot, &inbound("$hello")).await;
        assert!(chat.sent().is_empty());
    }
}
