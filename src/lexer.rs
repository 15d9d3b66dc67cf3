//! Splitting of raw input lines into words.
//!
//! Words are separated by runs of spaces and newlines. There is no quoting and
//! no escaping, so a delimiter can never be part of a word. Words are kept as
//! raw bytes; input does not have to be valid UTF-8.

use crate::error::ShellError;
use std::borrow::Cow;
use std::ffi::OsString;
use std::fmt;

/// One word of an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: Vec<u8>,
}

impl Token {
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        Self { text: text.into() }
    }

    /// Copy `text` into a new token, reporting allocation failure instead of aborting.
    fn try_from_bytes(text: &[u8]) -> Result<Self, ShellError> {
        let mut owned = Vec::new();
        owned.try_reserve_exact(text.len())?;
        owned.extend_from_slice(text);
        Ok(Self { text: owned })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    /// The word as text, with invalid UTF-8 replaced.
    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }

    /// The word as a program argument, bytes preserved where the platform allows.
    pub fn to_os_string(&self) -> OsString {
        #[cfg(unix)]
        {
            use std::os::unix::ffi::OsStringExt;
            OsString::from_vec(self.text.clone())
        }
        #[cfg(not(unix))]
        {
            OsString::from(self.to_str_lossy().into_owned())
        }
    }

    /// Replace the token's text, dropping the previous contents.
    pub fn replace(&mut self, text: Vec<u8>) {
        self.text = text;
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord { start: usize },
}

struct LexingFSM<'a> {
    input: &'a [u8],
    state: LexingState,
    out: Vec<Token>,
}

impl<'a> LexingFSM<'a> {
    fn new(input: &'a [u8]) -> Self {
        LexingFSM {
            input,
            state: LexingState::Start,
            out: Vec::new(),
        }
    }

    fn make_tokens(mut self) -> Result<Vec<Token>, ShellError> {
        for (pos, &byte) in self.input.iter().enumerate() {
            match (self.state, is_delimiter(byte)) {
                (LexingState::Start, true) => {}
                (LexingState::Start, false) => {
                    self.state = LexingState::ReadingWord { start: pos };
                }
                (LexingState::ReadingWord { start }, true) => {
                    self.finish_word(start, pos)?;
                    self.state = LexingState::Start;
                }
                (LexingState::ReadingWord { .. }, false) => {}
            }
        }

        if let LexingState::ReadingWord { start } = self.state {
            self.finish_word(start, self.input.len())?;
        }

        Ok(self.out)
    }

    fn finish_word(&mut self, start: usize, end: usize) -> Result<(), ShellError> {
        let token = Token::try_from_bytes(&self.input[start..end])?;
        self.out.try_reserve(1)?;
        self.out.push(token);
        Ok(())
    }
}

fn is_delimiter(byte: u8) -> bool {
    byte == b' ' || byte == b'\n'
}

/// Split a raw line into words.
///
/// Blank lines (empty, or only delimiters) produce an empty vector.
pub fn tokenize(line: &[u8]) -> Result<Vec<Token>, ShellError> {
    LexingFSM::new(line).make_tokens()
}

/// The words of one non-empty input line, program name first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<Token>,
}

impl CommandLine {
    /// Wrap a token sequence; `None` when there are no tokens.
    pub fn from_tokens(tokens: Vec<Token>) -> Option<Self> {
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    /// Tokenize `line`. Blank lines yield `Ok(None)`.
    pub fn parse(line: impl AsRef<[u8]>) -> Result<Option<Self>, ShellError> {
        Ok(Self::from_tokens(tokenize(line.as_ref())?))
    }

    /// The first word: a builtin name or the program to run.
    pub fn program(&self) -> Cow<'_, str> {
        self.tokens[0].to_str_lossy()
    }

    /// Everything after the program name.
    pub fn args(&self) -> &[Token] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    /// The full argument vector, argument 0 being the program name.
    pub fn argv(&self) -> Vec<OsString> {
        self.tokens.iter().map(Token::to_os_string).collect()
    }

    /// The line as the raw words joined by single spaces.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                out.push(b' ');
            }
            out.extend_from_slice(token.as_bytes());
        }
        out
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        tokenize(line.as_bytes())
            .unwrap()
            .iter()
            .map(|t| t.to_str_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_delimiters_only_is_empty() {
        assert!(words("").is_empty());
        assert!(words(" ").is_empty());
        assert!(words("\n").is_empty());
        assert!(words("  \n \n   ").is_empty());
    }

    #[test]
    fn test_runs_of_delimiters_are_one_separator() {
        assert_eq!(words("echo hi"), vec!["echo", "hi"]);
        assert_eq!(words("echo   \n  hi"), vec!["echo", "hi"]);
        assert_eq!(words("  echo hi  \n"), vec!["echo", "hi"]);
    }

    #[test]
    fn test_no_quoting_or_escaping() {
        assert_eq!(words("echo \"a b\""), vec!["echo", "\"a", "b\""]);
        assert_eq!(words("a\\ b"), vec!["a\\", "b"]);
    }

    #[test]
    fn test_tabs_are_part_of_words() {
        assert_eq!(words("a\tb c"), vec!["a\tb", "c"]);
    }

    #[test]
    fn test_references_are_kept_verbatim() {
        assert_eq!(words("echo $A ${B C}"), vec!["echo", "$A", "${B", "C}"]);
    }

    #[test]
    fn test_non_ascii_words() {
        assert_eq!(words("héllo wörld\n"), vec!["héllo", "wörld"]);
    }

    #[test]
    fn test_invalid_utf8_bytes_are_kept() {
        let tokens = tokenize(b"cat caf\xe9.txt\n").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].as_bytes(), b"caf\xe9.txt");
        assert_eq!(tokens[1].to_str_lossy(), "caf\u{fffd}.txt");
    }

    #[test]
    #[cfg(unix)]
    fn test_argv_preserves_raw_bytes() {
        use std::os::unix::ffi::OsStrExt;
        let cmd = CommandLine::parse(b"cat caf\xe9").unwrap().unwrap();
        let argv = cmd.argv();
        assert_eq!(argv[0], "cat");
        assert_eq!(argv[1].as_bytes(), b"caf\xe9");
    }

    #[test]
    fn test_command_line_parse() {
        assert_eq!(CommandLine::parse(" \n").unwrap(), None);

        let cmd = CommandLine::parse("set A hello\n").unwrap().unwrap();
        assert_eq!(cmd.program(), "set");
        assert_eq!(cmd.args().len(), 2);
        assert_eq!(cmd.argv(), vec!["set", "A", "hello"]);
        assert_eq!(cmd.to_string(), "set A hello");
        assert_eq!(cmd.to_bytes(), b"set A hello");
    }

    #[test]
    fn test_token_replace() {
        let mut token = Token::new("$A");
        token.replace(b"value".to_vec());
        assert_eq!(token.as_bytes(), b"value");
    }
}
