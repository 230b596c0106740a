// shared text helpers for command plugins

/// Hard platform cap on outgoing message length, in characters.
pub const MESSAGE_LIMIT: usize = 2000;

const TRUNCATE_AT: usize = 1990;
const TRUNCATION_MARKER: &str = "\u{2026}truncated";

pub fn convec(content: &str) -> Vec<&str> {
    content.split_whitespace().collect()
}

// basic guard for checking command content
pub fn crash_condition(content: &str, character: Option<&str>) -> bool {
    let temp_convec = convec(content);

    let mut length = 2;

    if character.is_none() {
        length = 1;
    };

    if temp_convec.len() < length {
        return true;
    };

    if character.is_some() && character != Some(temp_convec[0]) {
        return true;
    };
    false
}

/// Reads a user ID out of a mention (`<@123>`, `<@!123>`) or a bare ID.
pub fn parse_user_token(token: &str) -> Option<u64> {
    let inner = token
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|rest| rest.trim_start_matches('!'))
        .unwrap_or(token);
    inner.parse().ok().filter(|id| *id != 0)
}

/// Clamps `text` to the platform message limit.
///
/// Oversized text keeps its first 1990 characters and gains a marker, so
/// the result is never above the limit and earlier content survives the cut.
pub fn clamp_message(text: String) -> String {
    if text.chars().count() <= MESSAGE_LIMIT {
        return text;
    }
    let mut cut: String = text.chars().take(TRUNCATE_AT).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crash_condition_flags_short_and_mismatched_content() {
        assert!(crash_condition("", None));
        assert!(!crash_condition("!banlist", None));
        assert!(crash_condition("!kick", Some("!kick")));
        assert!(!crash_condition("!kick <@1>", Some("!kick")));
        assert!(crash_condition("!ban <@1>", Some("!kick")));
    }

    #[test]
    fn user_tokens_parse_in_all_three_shapes() {
        assert_eq!(parse_user_token("<@123>"), Some(123));
        assert_eq!(parse_user_token("<@!123>"), Some(123));
        assert_eq!(parse_user_token("123"), Some(123));
        assert_eq!(parse_user_token("@someone"), None);
        assert_eq!(parse_user_token("<@0>"), None);
        assert_eq!(parse_user_token("<@abc>"), None);
    }

    #[test]
    fn short_messages_pass_through_untouched() {
        let text = "hello".to_string();
        assert_eq!(clamp_message(text.clone()), text);
    }

    #[test]
    fn oversized_messages_end_in_the_marker_at_the_limit() {
        let text = "x".repeat(2500);
        let clamped = clamp_message(text);
        assert_eq!(clamped.chars().count(), MESSAGE_LIMIT);
        assert!(clamped.ends_with(TRUNCATION_MARKER));
        assert!(clamped.starts_with(&"x".repeat(TRUNCATE_AT)));
    }
}
