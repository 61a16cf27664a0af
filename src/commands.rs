mod menu;

pub use menu::{CommandMenu, MenuKey, MenuKeyAction};

use crate::types::AgentId;

/// A registered slash command and the agent it routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashCommand {
    pub trigger: &'static str,
    pub agent: AgentId,
    pub description: &'static str,
    pub icon: &'static str,
}

/// The fixed command set. Registration order is display order for the
/// completion menu; triggers are unique.
pub const COMMANDS: &[SlashCommand] = &[
    SlashCommand {
        trigger: "/code",
        agent: AgentId::Code,
        description: "Code assistance and generation",
        icon: "code",
    },
    SlashCommand {
        trigger: "/search",
        agent: AgentId::Search,
        description: "Web search and information lookup",
        icon: "search",
    },
    SlashCommand {
        trigger: "/explain",
        agent: AgentId::Explain,
        description: "Explain concepts in detail",
        icon: "book",
    },
    SlashCommand {
        trigger: "/help",
        agent: AgentId::Help,
        description: "Show available commands",
        icon: "help",
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInput {
    pub command: Option<&'static SlashCommand>,
    pub message: String,
    pub agent: AgentId,
}

/// Classify raw input into the message text and the agent it targets.
///
/// An unrecognized leading token is not a command: the entire original
/// input becomes the message and it goes to the default agent.
pub fn classify(input: &str) -> ParsedInput {
    if !input.starts_with('/') {
        return ParsedInput {
            command: None,
            message: input.to_string(),
            agent: AgentId::Default,
        };
    }

    let (head, rest) = match input.find(' ') {
        Some(space) => (&input[..space], input[space + 1..].trim()),
        None => (input, ""),
    };

    match COMMANDS.iter().find(|c| c.trigger == head) {
        Some(command) => ParsedInput {
            command: Some(command),
            message: rest.to_string(),
            agent: command.agent,
        },
        None => ParsedInput {
            command: None,
            message: input.to_string(),
            agent: AgentId::Default,
        },
    }
}

/// Commands whose name or description contains the typed prefix,
/// case-insensitively, in registration order. Anything that is not a `/`
/// prefix returns the full set.
pub fn filter_commands(prefix: &str) -> Vec<&'static SlashCommand> {
    if prefix.is_empty() || !prefix.starts_with('/') {
        return COMMANDS.iter().collect();
    }

    let needle = prefix[1..].to_lowercase();
    COMMANDS
        .iter()
        .filter(|c| {
            c.trigger[1..].to_lowercase().contains(&needle)
                || c.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// True while the input could still become a command. Once a space is
/// typed the user has committed to a command-or-not and the completion
/// menu stays closed.
pub fn is_command_mode(input: &str) -> bool {
    input.starts_with('/') && !input.contains(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_input_routes_to_default_verbatim() {
        let parsed = classify("  hello there  ");
        assert_eq!(parsed.command, None);
        assert_eq!(parsed.message, "  hello there  ");
        assert_eq!(parsed.agent, AgentId::Default);
    }

    #[test]
    fn test_known_command_splits_off_message() {
        let parsed = classify("/code write a function");
        assert_eq!(parsed.command.map(|c| c.trigger), Some("/code"));
        assert_eq!(parsed.message, "write a function");
        assert_eq!(parsed.agent, AgentId::Code);
    }

    #[test]
    fn test_command_without_message_yields_empty_message() {
        let parsed = classify("/code");
        assert_eq!(parsed.command.map(|c| c.trigger), Some("/code"));
        assert_eq!(parsed.message, "");
        assert_eq!(parsed.agent, AgentId::Code);
    }

    #[test]
    fn test_unknown_command_keeps_full_input_as_message() {
        let parsed = classify("/unknown test");
        assert_eq!(parsed.command, None);
        assert_eq!(parsed.message, "/unknown test");
        assert_eq!(parsed.agent, AgentId::Default);
    }

    #[test]
    fn test_command_match_is_exact_not_prefix() {
        let parsed = classify("/codex please");
        assert_eq!(parsed.command, None);
        assert_eq!(parsed.message, "/codex please");
        assert_eq!(parsed.agent, AgentId::Default);
    }

    #[test]
    fn test_command_message_is_trimmed() {
        let parsed = classify("/search   rust sse parsing  ");
        assert_eq!(parsed.message, "rust sse parsing");
        assert_eq!(parsed.agent, AgentId::Search);
    }

    #[test]
    fn test_filter_without_slash_returns_all_in_registration_order() {
        let all = filter_commands("");
        let triggers: Vec<&str> = all.iter().map(|c| c.trigger).collect();
        assert_eq!(triggers, vec!["/code", "/search", "/explain", "/help"]);

        assert_eq!(filter_commands("code").len(), COMMANDS.len());
    }

    #[test]
    fn test_filter_matches_trigger_substring() {
        let matched = filter_commands("/ex");
        let triggers: Vec<&str> = matched.iter().map(|c| c.trigger).collect();
        assert_eq!(triggers, vec!["/explain"]);
    }

    #[test]
    fn test_filter_matches_description_substring() {
        let matched = filter_commands("/lookup");
        let triggers: Vec<&str> = matched.iter().map(|c| c.trigger).collect();
        assert_eq!(triggers, vec!["/search"]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let matched = filter_commands("/CODE");
        let triggers: Vec<&str> = matched.iter().map(|c| c.trigger).collect();
        assert_eq!(triggers, vec!["/code"]);
    }

    #[test]
    fn test_command_mode_detection() {
        assert!(is_command_mode("/"));
        assert!(is_command_mode("/cod"));
        assert!(!is_command_mode("/code hello"));
        assert!(!is_command_mode("hello"));
        assert!(!is_command_mode(""));
    }

    #[test]
    fn test_triggers_are_unique() {
        for (i, a) in COMMANDS.iter().enumerate() {
            for b in &COMMANDS[i + 1..] {
                assert_ne!(a.trigger, b.trigger);
            }
        }
    }
}
