use super::types::{Loc, Located};
use std::fmt::Display;
use std::io::BufRead;

pub const MAX_LINE_LENGTH: usize = 1024;
pub const MAX_TOKENS: usize = 256;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    LineTooLong(usize),
    TooManyTokens(usize),
    Read(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::LineTooLong(len) => write!(
                f,
                "line is {} characters long (at most {} allowed)",
                len, MAX_LINE_LENGTH
            ),
            Error::TooManyTokens(count) => write!(
                f,
                "line has {} tokens (at most {} allowed)",
                count, MAX_TOKENS
            ),
            Error::Read(msg) => write!(f, "could not read line: {}", msg),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum RawToken {
    Value(Located<String>),
    Nothing,
    EndOfStream,
}

#[derive(Debug)]
enum SeekMode {
    Comment,
    Whitespace,
    Word,
}

impl From<char> for SeekMode {
    fn from(c: char) -> Self {
        if RawToken::COMMENT_CHARS.contains(&c) {
            SeekMode::Comment
        } else if c.is_whitespace() {
            SeekMode::Whitespace
        } else {
            SeekMode::Word
        }
    }
}

impl SeekMode {
    fn should_terminate(&self, cur: Option<char>) -> bool {
        match (self, cur.map(SeekMode::from)) {
            (SeekMode::Comment, _) => true,
            (_, None) => true,
            (SeekMode::Whitespace, Some(SeekMode::Whitespace)) => false,
            (SeekMode::Whitespace, Some(_)) => true,
            (SeekMode::Word, Some(SeekMode::Word)) => false,
            (SeekMode::Word, Some(_)) => true,
        }
    }
}

impl RawToken {
    const COMMENT_CHARS: [char; 2] = ['#', ';'];
    // Deleted outright, so `r1,r2` is the single token `r1r2`.
    const DROPPED_CHARS: [char; 2] = ['\r', ','];

    fn consume_one(
        line_no: usize,
        chars: &mut std::iter::Peekable<impl Iterator<Item = (usize, char)>>,
    ) -> RawToken {
        let (start, first) = match chars.next() {
            None => return RawToken::EndOfStream,
            Some(next) => next,
        };

        let sm = SeekMode::from(first);
        if let SeekMode::Comment = sm {
            return RawToken::EndOfStream;
        }

        let mut word = String::new();
        word.push(first);
        while !sm.should_terminate(chars.peek().map(|(_, c)| *c)) {
            if let Some((_, c)) = chars.next() {
                word.push(c);
            }
        }

        match sm {
            SeekMode::Word => {
                RawToken::Value(Located::with_loc(Loc::new(line_no, start + 1), word))
            }
            _ => RawToken::Nothing,
        }
    }
}

/// Splits one line of source into tokens; `line_no` is 1-based.
pub fn tokenize_line(line_no: usize, line: &str) -> Result<Vec<Located<String>>, Located<Error>> {
    let loc = Loc::new(line_no, 1);

    let len = line.chars().count();
    if len > MAX_LINE_LENGTH {
        return Err(Located::with_loc(loc, Error::LineTooLong(len)));
    }

    let mut chars = line
        .char_indices()
        .filter(|(_, c)| !RawToken::DROPPED_CHARS.contains(c))
        .peekable();

    let mut tokens = Vec::new();
    loop {
        match RawToken::consume_one(line_no, &mut chars) {
            RawToken::Nothing => (),
            RawToken::EndOfStream => break,
            RawToken::Value(token) => tokens.push(token),
        }
    }

    if tokens.len() > MAX_TOKENS {
        return Err(Located::with_loc(loc, Error::TooManyTokens(tokens.len())));
    }

    Ok(tokens)
}

#[derive(Debug, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub tokens: Vec<Located<String>>,
}

/// Reads a source one line at a time. The end of the input is reported as
/// `Ok(None)`, distinct from an empty or comment-only line.
pub struct LineReader<R> {
    reader: R,
    line_no: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        LineReader {
            reader,
            line_no: 0,
            buf: Vec::new(),
        }
    }

    pub fn next_line(&mut self) -> Result<Option<Line>, Located<Error>> {
        self.buf.clear();
        let loc = Loc::new(self.line_no + 1, 1);
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|err| Located::with_loc(loc, Error::Read(err.to_string())))?;
        if read == 0 {
            return Ok(None);
        }

        self.line_no += 1;
        let text = String::from_utf8_lossy(&self.buf);
        let text = text.strip_suffix('\n').unwrap_or(&*text);

        Ok(Some(Line {
            number: self.line_no,
            tokens: tokenize_line(self.line_no, text)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::{Loc, Located};
    use super::*;

    fn words(line: &str) -> Vec<String> {
        tokenize_line(1, line)
            .unwrap()
            .into_iter()
            .map(Located::value)
            .collect()
    }

    #[test]
    fn consume_single_simple() {
        let line = "MOV r1";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            RawToken::consume_one(1, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(1, 1), "MOV".to_owned()))
        );
        assert_eq!(RawToken::consume_one(1, &mut line_it), RawToken::Nothing);
        assert_eq!(
            RawToken::consume_one(1, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(1, 5), "r1".to_owned()))
        );
        assert_eq!(RawToken::consume_one(1, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_comment_nospace() {
        let line = "MOV r1#my comment text";
        let mut line_it = line.char_indices().peekable();
        assert_eq!(
            RawToken::consume_one(1, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(1, 1), "MOV".to_owned()))
        );
        assert_eq!(RawToken::consume_one(1, &mut line_it), RawToken::Nothing);
        assert_eq!(
            RawToken::consume_one(1, &mut line_it),
            RawToken::Value(Located::with_loc(Loc::new(1, 5), "r1".to_owned()))
        );
        assert_eq!(RawToken::consume_one(1, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn consume_single_comment_start() {
        let mut line_it = ";".char_indices().peekable();
        assert_eq!(RawToken::consume_one(1, &mut line_it), RawToken::EndOfStream);
    }

    #[test]
    fn comments_and_punctuation() {
        assert_eq!(words("  mov r1, 5 ; load five"), vec!["mov", "r1", "5"]);
        assert_eq!(words("add r1,r2"), vec!["add", "r1r2"]);
        assert_eq!(words("ret\r"), vec!["ret"]);
        assert_eq!(words("loop: # nothing else"), vec!["loop:"]);
        assert!(words("   # only a comment").is_empty());
        assert!(words("").is_empty());
    }

    #[test]
    fn columns_refer_to_the_raw_line() {
        let tokens = tokenize_line(4, "\tjmp,  done").unwrap();
        assert_eq!(tokens[0].loc(), Some(Loc::new(4, 2)));
        assert_eq!(tokens[1].loc(), Some(Loc::new(4, 8)));
    }

    #[test]
    fn overflow() {
        let long = "x".repeat(MAX_LINE_LENGTH + 1);
        assert_eq!(
            tokenize_line(1, &long).map_err(Located::value),
            Err(Error::LineTooLong(MAX_LINE_LENGTH + 1))
        );

        let many = "a ".repeat(MAX_TOKENS + 1);
        assert!(many.len() <= MAX_LINE_LENGTH);
        assert_eq!(
            tokenize_line(1, &many).map_err(Located::value),
            Err(Error::TooManyTokens(MAX_TOKENS + 1))
        );

        let most = "a ".repeat(MAX_TOKENS);
        assert_eq!(tokenize_line(1, &most).unwrap().len(), MAX_TOKENS);
    }

    #[test]
    fn end_of_input_is_not_an_empty_line() {
        let mut reader = LineReader::new(std::io::Cursor::new("nop\n\nret"));
        let first = reader.next_line().unwrap().unwrap();
        assert_eq!(first.number, 1);
        assert_eq!(first.tokens.len(), 1);

        let second = reader.next_line().unwrap().unwrap();
        assert_eq!(second.number, 2);
        assert!(second.tokens.is_empty());

        let third = reader.next_line().unwrap().unwrap();
        assert_eq!(third.tokens[0].loc(), Some(Loc::new(3, 1)));

        assert_eq!(reader.next_line().unwrap(), None);
    }
}
