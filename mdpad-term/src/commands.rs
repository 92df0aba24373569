//! Line commands read from stdin.

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `:name <text>`
    Name(String),
    /// `:color`
    Color,
    /// `:dark`
    ToggleDark,
    /// `:example`
    Example,
    /// `:link`
    Link,
    /// `:copy`
    Copy,
    /// `:open <id or address>`
    Open(String),
    /// `:undo`
    Undo,
    /// `:status`
    Status,
    /// `:users`
    Users,
    /// `:help`
    Help,
    /// `:quit`
    Quit,
    /// An unrecognized `:command`.
    Unknown(String),
    /// Anything else: text appended to the document.
    Edit(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        // `::text` escapes a line that starts with a colon.
        if let Some(rest) = line.strip_prefix("::") {
            return Self::Edit(format!(":{rest}"));
        }
        let Some(body) = line.strip_prefix(':') else {
            return Self::Edit(line.to_string());
        };

        let (word, arg) = match body.split_once(char::is_whitespace) {
            Some((word, arg)) => (word, arg.trim()),
            None => (body.trim_end(), ""),
        };
        match word {
            "name" => Self::Name(arg.to_string()),
            "color" => Self::Color,
            "dark" => Self::ToggleDark,
            "example" => Self::Example,
            "link" => Self::Link,
            "copy" => Self::Copy,
            "open" => Self::Open(arg.to_string()),
            "undo" => Self::Undo,
            "status" => Self::Status,
            "users" => Self::Users,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

pub const HELP: &str = "\
Type text to append it to the document. Commands:
  :name <text>   set your display name
  :color         pick a new random color
  :dark          toggle the dark preview theme
  :example       replace the document with an example
  :link          show the share link
  :copy          copy the share link to the clipboard
  :open <id>     switch to another document
  :undo          undo the last change
  :status        show the connection state
  :users         list participants
  :quit          exit
Start a line with '::' to type a literal ':'.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_edit() {
        assert_eq!(Command::parse("hello"), Command::Edit("hello".into()));
        assert_eq!(Command::parse(""), Command::Edit(String::new()));
    }

    #[test]
    fn test_commands() {
        assert_eq!(Command::parse(":name  Ada Lovelace "), Command::Name("Ada Lovelace".into()));
        assert_eq!(Command::parse(":color"), Command::Color);
        assert_eq!(Command::parse(":dark"), Command::ToggleDark);
        assert_eq!(Command::parse(":open doc-b"), Command::Open("doc-b".into()));
        assert_eq!(Command::parse(":q"), Command::Quit);
        assert_eq!(Command::parse(":quit "), Command::Quit);
    }

    #[test]
    fn test_name_without_argument_is_empty() {
        assert_eq!(Command::parse(":name"), Command::Name(String::new()));
    }

    #[test]
    fn test_unknown_and_escape() {
        assert_eq!(Command::parse(":frobnicate"), Command::Unknown("frobnicate".into()));
        assert_eq!(Command::parse("::smile: text"), Command::Edit(":smile: text".into()));
    }
}
