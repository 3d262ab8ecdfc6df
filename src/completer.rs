use reedline::{Completer, Span, Suggestion};

use crate::commands::HELP;

/// Commands whose first argument is a column name
const COLUMN_COMMANDS: &[&str] = &["filter", "f", "range", "dates", "clear", "sort", "s", "facets"];

/// Completes command words, then column names
pub struct CommandCompleter {
    commands: Vec<String>,
    columns: Vec<String>,
}

impl CommandCompleter {
    pub fn new(columns: Vec<String>) -> Self {
        let commands = HELP
            .iter()
            .filter_map(|(usage, _)| usage.split_whitespace().next())
            .map(str::to_string)
            .chain(["next", "prev"].iter().map(|c| c.to_string()))
            .collect();
        Self { commands, columns }
    }

    fn candidates(&self, input: &str) -> (Vec<&String>, &'static str, usize) {
        let words: Vec<&str> = input.split_whitespace().collect();
        let typing_new_word = input.is_empty() || input.ends_with(char::is_whitespace);
        let partial = if typing_new_word {
            ""
        } else {
            words.last().copied().unwrap_or("")
        };
        let word_index = if typing_new_word {
            words.len()
        } else {
            words.len().saturating_sub(1)
        };

        let lowered = partial.to_lowercase();
        match word_index {
            0 => (
                self.commands
                    .iter()
                    .filter(|c| c.starts_with(&lowered))
                    .collect(),
                "command",
                partial.len(),
            ),
            1 if COLUMN_COMMANDS.contains(&words[0].to_lowercase().as_str()) => (
                self.columns
                    .iter()
                    .filter(|c| c.to_lowercase().starts_with(&lowered))
                    .collect(),
                "column",
                partial.len(),
            ),
            _ => (Vec::new(), "", 0),
        }
    }
}

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let input = &line[..pos.min(line.len())];
        let (candidates, description, partial_len) = self.candidates(input);
        let start = pos.saturating_sub(partial_len);

        candidates
            .into_iter()
            .map(|value| Suggestion {
                value: value.clone(),
                description: Some(description.to_string()),
                extra: None,
                span: Span { start, end: pos },
                style: None,
                append_whitespace: true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(completer: &mut CommandCompleter, line: &str) -> Vec<String> {
        completer
            .complete(line, line.len())
            .into_iter()
            .map(|s| s.value)
            .collect()
    }

    #[test]
    fn test_completes_commands_then_columns() {
        let mut completer = CommandCompleter::new(vec!["name".to_string(), "Age".to_string()]);
        assert_eq!(values(&mut completer, "se"), vec!["search"]);
        assert_eq!(values(&mut completer, "sort a"), vec!["Age"]);
        assert_eq!(values(&mut completer, "sort "), vec!["name", "Age"]);
        assert!(values(&mut completer, "search a").is_empty());
    }
}
