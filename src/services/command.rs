use crate::config::CommandSet;

/// Meaning of a chat message for the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `<main> <signup>`
    Signup,
    /// `<main> <start>`
    Start,
    /// `<main> <end>`
    End,
    /// The trigger word with a missing or unknown subcommand; consumed silently.
    Unknown,
    /// A single token that may be a guess if the group has an active game.
    Guess(&'a str),
    /// Anything else.
    Ignore,
}

/// Classify a raw message using the configured vocabulary.
pub fn parse_command<'a>(commands: &CommandSet, content: &'a str) -> Command<'a> {
    let mut parts = content.split_whitespace();
    let Some(first) = parts.next() else {
        return Command::Ignore;
    };

    if first == commands.main {
        return match parts.next() {
            Some(sub) if sub == commands.signup => Command::Signup,
            Some(sub) if sub == commands.start => Command::Start,
            Some(sub) if sub == commands.end => Command::End,
            _ => Command::Unknown,
        };
    }

    if parts.next().is_none() {
        Command::Guess(first)
    } else {
        Command::Ignore
    }
}
