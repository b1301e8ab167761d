//! `.proto` lexer. Built on the same char-cursor shape as
//! [`protobuf::text::lexer::Lexer`] but with the richer token/escape set
//! `.proto` source needs: block comments, hex/octal numbers and the full
//! backslash-escape alphabet.

use std::borrow::Cow;
use std::fmt;
use std::str::Chars;

use protobuf::text::Loc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    InvalidCharacter(char),
    UnterminatedBlockComment,
    UnterminatedString,
    InvalidEscape,
    InvalidNumber(String),
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::InvalidCharacter(c) => write!(f, "invalid character: {:?}", c),
            LexError::UnterminatedBlockComment => write!(f, "unterminated block comment"),
            LexError::UnterminatedString => write!(f, "unterminated string literal"),
            LexError::InvalidEscape => write!(f, "invalid escape sequence"),
            LexError::InvalidNumber(s) => write!(f, "invalid number: {}", s),
        }
    }
}

impl std::error::Error for LexError {}

pub type LexResult<T> = Result<T, LexError>;

/// `Ident` borrows straight out of the source text; `StrLit` does too for
/// the common case of a literal with no backslash escapes, falling back to
/// an owned `String` only once an escape forces a character to differ from
/// its source bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Ident(&'a str),
    IntLit(u64),
    FloatLit(f64),
    StrLit(Cow<'a, str>),
    Symbol(char),
}

pub struct ProtoLexer<'a> {
    input: &'a str,
    chars: Chars<'a>,
    pos: usize,
    line: u32,
    col: u32,
    peeked: Option<(Token<'a>, Loc)>,
}

impl<'a> ProtoLexer<'a> {
    pub fn new(input: &'a str) -> ProtoLexer<'a> {
        ProtoLexer { input, chars: input.chars(), pos: 0, line: 1, col: 1, peeked: None }
    }

    pub fn loc(&self) -> Loc {
        self.peeked.as_ref().map(|(_, l)| *l).unwrap_or(Loc { line: self.line, col: self.col })
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn peek_char2(&self) -> Option<char> {
        let mut it = self.chars.clone();
        it.next();
        it.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) -> LexResult<()> {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_char2() == Some('/') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_char2() == Some('*') => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek_char() {
                            None => return Err(LexError::UnterminatedBlockComment),
                            Some('*') if self.peek_char2() == Some('/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn scan_escape(&mut self) -> LexResult<char> {
        let c = self.bump().ok_or(LexError::InvalidEscape)?;
        Ok(match c {
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0B}',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            '0'..='7' => {
                let mut v = c.to_digit(8).unwrap();
                for _ in 0..2 {
                    match self.peek_char().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            self.bump();
                            v = v * 8 + d;
                        }
                        None => break,
                    }
                }
                char::from_u32(v).ok_or(LexError::InvalidEscape)?
            }
            'x' => {
                let mut v: u32 = 0;
                let mut n = 0;
                while n < 2 {
                    match self.peek_char().and_then(|c| c.to_digit(16)) {
                        Some(d) => {
                            self.bump();
                            v = v * 16 + d;
                            n += 1;
                        }
                        None => break,
                    }
                }
                if n == 0 {
                    return Err(LexError::InvalidEscape);
                }
                char::from_u32(v).ok_or(LexError::InvalidEscape)?
            }
            'u' => self.scan_hex_escape(4)?,
            'U' => self.scan_hex_escape(8)?,
            _ => return Err(LexError::InvalidEscape),
        })
    }

    fn scan_hex_escape(&mut self, digits: usize) -> LexResult<char> {
        let mut v: u32 = 0;
        for _ in 0..digits {
            let c = self.bump().ok_or(LexError::InvalidEscape)?;
            let d = c.to_digit(16).ok_or(LexError::InvalidEscape)?;
            v = v * 16 + d;
        }
        if v > 0x10FFFF {
            return Err(LexError::InvalidEscape);
        }
        char::from_u32(v).ok_or(LexError::InvalidEscape)
    }

    /// Scans a quoted string. Literals with no backslash escape are
    /// returned as a `Cow::Borrowed` slice of `self.input`; an escape
    /// forces a switch to building an owned `String` from that point on,
    /// since the decoded character can differ from the source bytes.
    fn scan_string(&mut self) -> LexResult<Cow<'a, str>> {
        let quote = self.bump().unwrap();
        let start = self.pos;
        loop {
            match self.peek_char() {
                None | Some('\n') => return Err(LexError::UnterminatedString),
                Some(c) if c == quote => {
                    let text = &self.input[start..self.pos];
                    self.bump();
                    return Ok(Cow::Borrowed(text));
                }
                Some('\\') => {
                    let mut out = self.input[start..self.pos].to_owned();
                    self.bump();
                    out.push(self.scan_escape()?);
                    return self.scan_string_tail(quote, out).map(Cow::Owned);
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn scan_string_tail(&mut self, quote: char, mut out: String) -> LexResult<String> {
        loop {
            match self.peek_char() {
                None | Some('\n') => return Err(LexError::UnterminatedString),
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(out);
                }
                Some('\\') => {
                    self.bump();
                    out.push(self.scan_escape()?);
                }
                Some(c) => {
                    out.push(c);
                    self.bump();
                }
            }
        }
    }

    fn scan_number(&mut self) -> LexResult<Token<'a>> {
        let start = self.pos;
        if self.peek_char() == Some('0') && matches!(self.peek_char2(), Some('x') | Some('X')) {
            self.bump();
            self.bump();
            let hex_start = self.pos;
            while self.peek_char().map(|c| c.is_ascii_hexdigit()).unwrap_or(false) {
                self.bump();
            }
            let text = &self.input[hex_start..self.pos];
            return u64::from_str_radix(text, 16)
                .map(Token::IntLit)
                .map_err(|_| LexError::InvalidNumber(text.to_owned()));
        }
        let mut is_float = false;
        while self.peek_char().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.bump();
        }
        if self.peek_char() == Some('.') && self.peek_char2().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            is_float = true;
            self.bump();
            while self.peek_char().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                self.bump();
            }
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            is_float = true;
            self.bump();
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                self.bump();
            }
            while self.peek_char().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                self.bump();
            }
        }
        let text = &self.input[start..self.pos];
        if is_float {
            text.parse::<f64>().map(Token::FloatLit).map_err(|_| LexError::InvalidNumber(text.to_owned()))
        } else if text.len() > 1 && text.starts_with('0') {
            // Octal literal (proto2 field default / option constant).
            u64::from_str_radix(&text[1..], 8).map(Token::IntLit).map_err(|_| LexError::InvalidNumber(text.to_owned()))
        } else {
            text.parse::<u64>().map(Token::IntLit).map_err(|_| LexError::InvalidNumber(text.to_owned()))
        }
    }

    fn scan_token(&mut self) -> LexResult<Option<(Token<'a>, Loc)>> {
        self.skip_trivia()?;
        let loc = Loc { line: self.line, col: self.col };
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(None),
        };
        let token = if c == '"' || c == '\'' {
            Token::StrLit(self.scan_string()?)
        } else if c.is_ascii_digit() {
            self.scan_number()?
        } else if c.is_alphabetic() || c == '_' {
            let start = self.pos;
            while self.peek_char().map(|c| c.is_alphanumeric() || c == '_').unwrap_or(false) {
                self.bump();
            }
            Token::Ident(&self.input[start..self.pos])
        } else if "{}[]()<>=;,.:-+".contains(c) {
            self.bump();
            Token::Symbol(c)
        } else {
            return Err(LexError::InvalidCharacter(c));
        };
        Ok(Some((token, loc)))
    }

    pub fn peek(&mut self) -> LexResult<Option<&Token<'a>>> {
        if self.peeked.is_none() {
            self.peeked = self.scan_token()?;
        }
        Ok(self.peeked.as_ref().map(|(t, _)| t))
    }

    pub fn advance(&mut self) -> LexResult<Option<(Token<'a>, Loc)>> {
        if self.peeked.is_none() {
            self.peeked = self.scan_token()?;
        }
        Ok(self.peeked.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_keywords_and_identifiers() {
        let mut l = ProtoLexer::new("message Foo {");
        assert_eq!(l.advance().unwrap().unwrap().0, Token::Ident("message".into()));
        assert_eq!(l.advance().unwrap().unwrap().0, Token::Ident("Foo".into()));
        assert_eq!(l.advance().unwrap().unwrap().0, Token::Symbol('{'));
    }

    #[test]
    fn skips_line_and_block_comments() {
        let mut l = ProtoLexer::new("// line\nfoo /* block\nspanning */ bar");
        assert_eq!(l.advance().unwrap().unwrap().0, Token::Ident("foo".into()));
        assert_eq!(l.advance().unwrap().unwrap().0, Token::Ident("bar".into()));
    }

    #[test]
    fn scans_hex_and_decimal_numbers() {
        let mut l = ProtoLexer::new("0x1F 42 -1");
        assert_eq!(l.advance().unwrap().unwrap().0, Token::IntLit(31));
        assert_eq!(l.advance().unwrap().unwrap().0, Token::IntLit(42));
        assert_eq!(l.advance().unwrap().unwrap().0, Token::Symbol('-'));
        assert_eq!(l.advance().unwrap().unwrap().0, Token::IntLit(1));
    }

    #[test]
    fn scans_float_with_exponent() {
        let mut l = ProtoLexer::new("1.5e10");
        assert_eq!(l.advance().unwrap().unwrap().0, Token::FloatLit(1.5e10));
    }

    #[test]
    fn decodes_string_escapes() {
        let mut l = ProtoLexer::new(r#""a\nb\x41B""#);
        match l.advance().unwrap().unwrap().0 {
            Token::StrLit(s) => assert_eq!(s.as_ref(), "a\nbAB"),
            other => panic!("expected string literal, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let mut l = ProtoLexer::new("/* never closed");
        assert_eq!(l.advance(), Err(LexError::UnterminatedBlockComment));
    }
}
