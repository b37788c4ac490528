//! Lexical analysis: splitting a raw command line into words.
//!
//! Runs of whitespace separate words. Content inside matching single or
//! double quotes joins the current word with the quotes stripped; a quote of
//! one kind is an ordinary character inside the other kind, and adjacent
//! quoted/unquoted segments concatenate into a single word. There is no
//! escape character: `$`, `\`, `*`, `&` and `|` carry no meaning here.

use thiserror::Error;

/// Errors produced while analyzing a command line.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A closing quote (single or double) was not found before end of line.
    #[error("no closing quotation")]
    UnterminatedQuote,
    /// A position that grammatically requires a command held no words,
    /// such as an empty pipeline stage or a bare redirection.
    #[error("missing command")]
    EmptyCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    /// Walks the input once, emitting a word on every transition out of a
    /// word. Being inside `ReadingWord` with an empty buffer still counts as
    /// a word, so `""` yields one empty word.
    fn make_words(&mut self) -> Result<Vec<String>, ParseError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::ReadingSingleQuote => self.handle_quote(ch, '\''),
                LexingState::ReadingDoubleQuote => self.handle_quote(ch, '"'),
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote | LexingState::ReadingDoubleQuote => {
                return Err(ParseError::UnterminatedQuote);
            }
            LexingState::ReadingWord => out.push(std::mem::take(&mut self.buffer)),
            LexingState::Start => {}
        }

        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn handle_start(&mut self, ch: char) {
        match ch {
            c if c.is_whitespace() => {}
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            c => {
                self.buffer.push(c);
                self.state = LexingState::ReadingWord;
            }
        }
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) {
        match ch {
            c if c.is_whitespace() => {
                out.push(std::mem::take(&mut self.buffer));
                self.state = LexingState::Start;
            }
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            c => self.buffer.push(c),
        }
    }

    fn handle_quote(&mut self, ch: char, closing: char) {
        if ch == closing {
            self.state = LexingState::ReadingWord;
        } else {
            self.buffer.push(ch);
        }
    }
}

/// Splits a raw command line into words.
///
/// # Returns
/// The ordered words of the line, quotes stripped, or a [`ParseError`] if a
/// quote is left unterminated.
pub fn split_words(line: &str) -> Result<Vec<String>, ParseError> {
    let mut lexer = LexingFSM::new(line);
    lexer.make_words()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        split_words(line).unwrap()
    }

    #[test]
    fn splits_on_whitespace_runs() {
        assert_eq!(words("echo a  b\tc"), vec!["echo", "a", "b", "c"]);
    }

    #[test]
    fn empty_line_yields_no_words() {
        assert_eq!(words(""), Vec::<String>::new());
        assert_eq!(words("   \t "), Vec::<String>::new());
    }

    #[test]
    fn quoted_spans_become_single_words() {
        assert_eq!(words(r#"a "b c" 'd e'"#), vec!["a", "b c", "d e"]);
    }

    #[test]
    fn quotes_are_stripped() {
        assert_eq!(words(r#"echo "hello""#), vec!["echo", "hello"]);
        assert_eq!(words("echo 'hello'"), vec!["echo", "hello"]);
    }

    #[test]
    fn adjacent_segments_concatenate() {
        assert_eq!(words(r#"a"b c"d"#), vec!["ab cd"]);
        assert_eq!(words(r#"'x'"y"z"#), vec!["xyz"]);
    }

    #[test]
    fn empty_quoted_string_is_an_empty_word() {
        assert_eq!(words(r#"echo """#), vec!["echo", ""]);
        assert_eq!(words("''"), vec![""]);
    }

    #[test]
    fn other_quote_kind_is_literal_inside_quotes() {
        assert_eq!(words(r#""it's""#), vec!["it's"]);
        assert_eq!(words(r#"'say "hi"'"#), vec![r#"say "hi""#]);
    }

    #[test]
    fn specials_are_ordinary_characters() {
        assert_eq!(words(r"echo $HOME \n a&b"), vec!["echo", "$HOME", r"\n", "a&b"]);
    }

    #[test]
    fn unterminated_double_quote_fails() {
        assert_eq!(split_words(r#"echo "abc"#), Err(ParseError::UnterminatedQuote));
    }

    #[test]
    fn unterminated_single_quote_fails() {
        assert_eq!(split_words("echo 'abc"), Err(ParseError::UnterminatedQuote));
    }

    #[test]
    fn quote_reopened_after_close_still_fails_when_left_open() {
        assert_eq!(split_words(r#"a "b" "c"#), Err(ParseError::UnterminatedQuote));
    }
}
