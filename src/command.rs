/// A resolved executable plus its argument vector, argv[0] included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub path: String,
    pub argv: Vec<String>,
}

/// Split a shell-like command line into a [`Command`].
///
/// Tokens are whitespace-delimited and empty tokens are discarded. Returns
/// `None` when nothing remains to execute.
pub fn parse(commandline: &str) -> Option<Command> {
    let argv: Vec<String> = commandline
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let path = argv.first()?.clone();

    Some(Command { path, argv })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_path_and_args() {
        let command = parse("ls -la /tmp").unwrap();
        assert_eq!(command.path, "ls");
        assert_eq!(command.argv, vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn test_parse_program_name_is_first_argument() {
        let command = parse("firefox").unwrap();
        assert_eq!(command.path, "firefox");
        assert_eq!(command.argv, vec!["firefox"]);
    }

    #[test]
    fn test_parse_collapses_repeated_whitespace() {
        let command = parse("  echo \t hi   there ").unwrap();
        assert_eq!(command.path, "echo");
        assert_eq!(command.argv, vec!["echo", "hi", "there"]);
    }

    #[test]
    fn test_parse_empty_line_is_none() {
        assert!(parse("").is_none());
        assert!(parse("   \t  ").is_none());
    }
}
