//! Token-level scanning built on [`super::lexer::Lexer`], shared by the
//! text-format reader and the JSON reader.

use std::fmt;

use super::lexer::{unescape, Lexer, LexerError, ParserLanguage};
use super::loc::Loc;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    StrLit(String),
    /// The raw decimal text of a number, kept unparsed so callers can pick
    /// the target integer/float type (mirrors JSON's single number kind).
    NumberLit(String),
    Symbol(char),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenizerError {
    Lexer(LexerError),
    UnexpectedEof,
    UnexpectedChar(char),
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizerError::Lexer(e) => write!(f, "{}", e),
            TokenizerError::UnexpectedEof => write!(f, "unexpected end of input"),
            TokenizerError::UnexpectedChar(c) => write!(f, "unexpected character: {:?}", c),
        }
    }
}

impl std::error::Error for TokenizerError {}

impl From<LexerError> for TokenizerError {
    fn from(e: LexerError) -> Self {
        TokenizerError::Lexer(e)
    }
}

pub type TokenizerResult<T> = Result<T, TokenizerError>;

/// A one-token-lookahead stream over `.proto`/text-format/JSON source.
#[derive(Clone)]
pub struct Tokenizer<'a> {
    lexer: Lexer<'a>,
    peeked: Option<(Token, Loc)>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str, language: ParserLanguage) -> Tokenizer<'a> {
        Tokenizer { lexer: Lexer::new(input, language), peeked: None }
    }

    pub fn loc(&self) -> Loc {
        self.peeked.as_ref().map(|(_, l)| *l).unwrap_or_else(|| self.lexer.loc())
    }

    fn skip_trivia(&mut self) {
        loop {
            self.lexer.skip_whitespace();
            if !self.lexer.skip_line_comment(self.lexer.language != ParserLanguage::Json) {
                break;
            }
        }
    }

    fn scan_token(&mut self) -> TokenizerResult<Option<(Token, Loc)>> {
        self.skip_trivia();
        let loc = self.lexer.loc();
        let c = match self.lexer.rest().chars().next() {
            Some(c) => c,
            None => return Ok(None),
        };
        let token = if c == '"' || c == '\'' {
            let body = self.lexer.scan_quoted()?;
            Token::StrLit(unescape(&body, self.lexer.language)?)
        } else if c == '-' || c.is_ascii_digit() {
            let s = self.scan_number();
            Token::NumberLit(s)
        } else if c.is_alphabetic() || c == '_' {
            let s = self.lexer.take_while(|c| c.is_alphanumeric() || c == '_').to_owned();
            Token::Ident(s)
        } else {
            let mut consumed = '\0';
            self.lexer.take_while(|ch| {
                if consumed == '\0' {
                    consumed = ch;
                    true
                } else {
                    false
                }
            });
            Token::Symbol(c)
        };
        Ok(Some((token, loc)))
    }

    /// Scans a decimal number: optional leading `-`, digits, optional
    /// `.digits`, optional `e`/`E` exponent with its own optional sign.
    /// Special float tokens (`Infinity`, `NaN`) are lexed as identifiers,
    /// not here.
    fn scan_number(&mut self) -> String {
        self.lexer
            .take_while(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
            .to_owned()
    }

    fn peek(&mut self) -> TokenizerResult<Option<&Token>> {
        if self.peeked.is_none() {
            self.peeked = self.scan_token()?;
        }
        Ok(self.peeked.as_ref().map(|(t, _)| t))
    }

    fn advance(&mut self) -> TokenizerResult<Option<Token>> {
        if self.peeked.is_none() {
            self.peeked = self.scan_token()?;
        }
        Ok(self.peeked.take().map(|(t, _)| t))
    }

    pub fn next_token_if_map<F, R>(&mut self, f: F) -> TokenizerResult<Option<R>>
    where
        F: FnOnce(&Token) -> Option<R>,
    {
        self.peek()?;
        match self.peeked.take() {
            Some((t, loc)) => match f(&t) {
                Some(r) => Ok(Some(r)),
                None => {
                    self.peeked = Some((t, loc));
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub fn lookahead_is_str_lit(&mut self) -> TokenizerResult<bool> {
        Ok(matches!(self.peek()?, Some(Token::StrLit(_))))
    }

    pub fn lookahead_is_number(&mut self) -> TokenizerResult<bool> {
        Ok(matches!(self.peek()?, Some(Token::NumberLit(_))))
    }

    pub fn lookahead_is_symbol(&mut self, c: char) -> TokenizerResult<bool> {
        Ok(matches!(self.peek()?, Some(Token::Symbol(s)) if *s == c))
    }

    pub fn lookahead_is_ident(&mut self, ident: &str) -> TokenizerResult<bool> {
        Ok(matches!(self.peek()?, Some(Token::Ident(s)) if s == ident))
    }

    pub fn next_str_lit(&mut self) -> TokenizerResult<String> {
        match self.advance()? {
            Some(Token::StrLit(s)) => Ok(s),
            Some(_) | None => Err(TokenizerError::UnexpectedEof),
        }
    }

    pub fn next_number_lit(&mut self) -> TokenizerResult<String> {
        match self.advance()? {
            Some(Token::NumberLit(s)) => Ok(s),
            Some(_) | None => Err(TokenizerError::UnexpectedEof),
        }
    }

    pub fn next_ident(&mut self) -> TokenizerResult<String> {
        match self.advance()? {
            Some(Token::Ident(s)) => Ok(s),
            Some(_) | None => Err(TokenizerError::UnexpectedEof),
        }
    }

    pub fn next_ident_if_eq(&mut self, ident: &str) -> TokenizerResult<bool> {
        if self.lookahead_is_ident(ident)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn next_ident_expect_eq(&mut self, ident: &str) -> TokenizerResult<()> {
        if self.next_ident_if_eq(ident)? {
            Ok(())
        } else {
            Err(TokenizerError::UnexpectedEof)
        }
    }

    pub fn next_symbol_if_eq(&mut self, c: char) -> TokenizerResult<bool> {
        if self.lookahead_is_symbol(c)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn next_symbol_expect_eq(&mut self, c: char) -> TokenizerResult<()> {
        if self.next_symbol_if_eq(c)? {
            Ok(())
        } else {
            Err(TokenizerError::UnexpectedEof)
        }
    }

    pub fn is_eof(&mut self) -> TokenizerResult<bool> {
        Ok(self.peek()?.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_object_literal() {
        let mut t = Tokenizer::new(r#"{ "a": 1, "b": -2.5 }"#, ParserLanguage::Json);
        t.next_symbol_expect_eq('{').unwrap();
        assert_eq!(t.next_str_lit().unwrap(), "a");
        t.next_symbol_expect_eq(':').unwrap();
        assert_eq!(t.next_number_lit().unwrap(), "1");
        t.next_symbol_expect_eq(',').unwrap();
        assert_eq!(t.next_str_lit().unwrap(), "b");
        t.next_symbol_expect_eq(':').unwrap();
        assert_eq!(t.next_number_lit().unwrap(), "-2.5");
        t.next_symbol_expect_eq('}').unwrap();
        assert!(t.is_eof().unwrap());
    }

    #[test]
    fn skips_hash_comments_outside_json() {
        let mut t = Tokenizer::new("foo # a comment\nbar", ParserLanguage::TextFormat);
        assert_eq!(t.next_ident().unwrap(), "foo");
        assert_eq!(t.next_ident().unwrap(), "bar");
    }

    #[test]
    fn recognizes_true_false_null_as_idents() {
        let mut t = Tokenizer::new("true false null", ParserLanguage::Json);
        assert!(t.next_ident_if_eq("true").unwrap());
        assert!(t.next_ident_if_eq("false").unwrap());
        assert!(t.next_ident_if_eq("null").unwrap());
    }
}
