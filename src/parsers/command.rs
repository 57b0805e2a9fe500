use std::sync::LazyLock;

use regex::Regex;

use crate::models::ParsedCommand;

// Open and close tags are captured separately; pairs are kept only when they agree
static TAG_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^>]+)>(\s*[^<]*?\s*)</([^>]+)>").expect("valid regex"));

/// Classify a first user message that may carry slash-command markup
/// (`<command-name>`, `<command-args>`, `<command-message>`, `<local-command-stdout>`)
pub fn parse_command_xml(content: &str) -> ParsedCommand {
    let pairs: Vec<(&str, &str)> = TAG_PAIR
        .captures_iter(content)
        .filter(|caps| caps[1] == caps[3])
        .filter_map(|caps| {
            let tag = caps.get(1)?.as_str();
            let body = caps.get(2)?.as_str();
            Some((tag, body))
        })
        .collect();

    let find = |wanted: &str| pairs.iter().find(|(tag, _)| *tag == wanted).map(|(_, body)| body.to_string());

    if let Some(command_name) = find("command-name") {
        return ParsedCommand::Command {
            command_name,
            command_args: find("command-args"),
            command_message: find("command-message"),
        };
    }
    if let Some(stdout) = find("local-command-stdout") {
        return ParsedCommand::LocalCommand { stdout };
    }
    ParsedCommand::Text { content: content.to_string() }
}
