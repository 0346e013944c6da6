//! Command text parsing
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

/// A command split out of message text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Lowercased name without the leading slash
    pub name: String,
    pub args: Vec<String>,
    /// Bot name from a `/cmd@bot` form, if present
    pub addressed_to: Option<String>,
}

impl ParsedCommand {
    /// Whether this command is meant for `bot_username` (unaddressed commands are for everyone)
    pub fn is_addressed_to(&self, bot_username: &str) -> bool {
        self.addressed_to
            .as_deref()
            .map_or(true, |target| target.eq_ignore_ascii_case(bot_username))
    }
}

/// Cheap pre-filter: does the text look like a command at all
pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

/// Parse `/name[@bot] args...`. Returns `None` for non-command text or a bare `/`.
pub fn parse_command(text: &str) -> Option<ParsedCommand> {
    let text = text.trim_start();
    let rest = text.strip_prefix('/')?;

    let (token, tail) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    let (name, addressed_to) = match token.split_once('@') {
        Some((name, bot)) => (name, Some(bot.to_string()).filter(|b| !b.is_empty())),
        None => (token, None),
    };

    if name.is_empty() {
        return None;
    }

    Some(ParsedCommand {
        name: name.to_lowercase(),
        args: split_args(tail),
        addressed_to,
    })
}

/// Split arguments on whitespace, keeping `"quoted text"` together as one
/// argument. Quote characters toggle quoting and are not kept. An unterminated
/// quote runs to the end of the input.
pub fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in input.chars() {
        match ch {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}
