use thiserror::Error;

pub const HELP: &str = "\
commands:
  list               show the notes
  reload             fetch the notes again
  new                start a new note
  edit <id>          edit an existing note
  title <text>       set the title of the form
  content <text>     set the content of the form (\\n starts a new line)
  show               show the form
  save               create or update the note in the form
  delete <id>        delete a note
  help               show this text
  quit               leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Reload,
    New,
    Edit(String),
    Title(String),
    Content(String),
    Show,
    Save,
    Delete(String),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command `{0}`, type `help` for the list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb {
            "list" | "ls" => Ok(Self::List),
            "reload" => Ok(Self::Reload),
            "new" => Ok(Self::New),
            "edit" => required(rest, "edit <id>").map(Self::Edit),
            "title" => Ok(Self::Title(rest.to_string())),
            "content" => Ok(Self::Content(rest.replace("\\n", "\n"))),
            "show" => Ok(Self::Show),
            "save" => Ok(Self::Save),
            "delete" | "rm" => required(rest, "delete <id>").map(Self::Delete),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

fn required(arg: &str, usage: &'static str) -> Result<String, ParseError> {
    if arg.is_empty() {
        Err(ParseError::Usage(usage))
    } else {
        Ok(arg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_verbs() {
        assert_eq!(Command::parse("list"), Ok(Command::List));
        assert_eq!(Command::parse("  save "), Ok(Command::Save));
        assert_eq!(Command::parse("exit"), Ok(Command::Quit));
    }

    #[test]
    fn keeps_inner_spacing_of_text_arguments() {
        assert_eq!(
            Command::parse("title  Shopping  list "),
            Ok(Command::Title("Shopping  list".to_string()))
        );
        assert_eq!(
            Command::parse("content eggs\\nmilk"),
            Ok(Command::Content("eggs\nmilk".to_string()))
        );
    }

    #[test]
    fn blank_title_is_passed_through_for_validation() {
        assert_eq!(Command::parse("title"), Ok(Command::Title(String::new())));
    }

    #[test]
    fn id_commands_require_an_argument() {
        assert_eq!(
            Command::parse("edit"),
            Err(ParseError::Usage("edit <id>"))
        );
        assert_eq!(
            Command::parse("rm 7f3a"),
            Ok(Command::Delete("7f3a".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_verbs() {
        let err = Command::parse("frobnicate 1").expect_err("unknown");
        assert_eq!(
            err.to_string(),
            "unknown command `frobnicate`, type `help` for the list"
        );
    }
}
