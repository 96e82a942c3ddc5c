use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use rust_decimal::Decimal;

use crate::ast::Token;

/// Numeric literal: hex or decimal digits, optional fraction and exponent,
/// optional type suffix.
static NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(?:0[xX](?P<hex>[0-9a-fA-F]+)|(?P<int>\d+)(?P<frac>\.\d+)?(?P<exp>[eE][+-]?\d+)?)(?P<suffix>[lLfFdDbBhH])?",
    )
    .ok()
});

/// Malformed input at a byte offset.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at position {position}")]
pub struct LexError {
    pub message: String,
    pub position: usize,
}

impl LexError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        LexError {
            message: message.into(),
            position,
        }
    }
}

pub struct Lexer {
    input: String,
    /// Byte offset of the next unread character.
    position: usize,
    /// Byte offset where the last returned token began.
    token_start: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.to_string(),
            position: 0,
            token_start: 0,
        }
    }

    /// Byte offset of the most recent token.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input[self.position..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    /// Consumes `n` characters and yields `token`.
    fn take(&mut self, n: usize, token: Token) -> Token {
        for _ in 0..n {
            self.advance();
        }
        token
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_escape(&mut self) -> Result<char, LexError> {
        let at = self.position;
        self.advance(); // backslash
        let escaped = match self.current_char() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('\\') => '\\',
            Some('u') => {
                self.advance();
                let start = self.position;
                for _ in 0..4 {
                    match self.current_char() {
                        Some(c) if c.is_ascii_hexdigit() => self.advance(),
                        _ => return Err(LexError::new("Invalid unicode escape", at)),
                    }
                }
                let code = u32::from_str_radix(&self.input[start..self.position], 16)
                    .map_err(|_| LexError::new("Invalid unicode escape", at))?;
                return char::from_u32(code).ok_or_else(|| LexError::new("Invalid unicode escape", at));
            }
            Some(ch) => return Err(LexError::new(format!("Invalid escape sequence: \\{}", ch), at)),
            None => return Err(LexError::new("Unterminated string: unexpected EOF after backslash", at)),
        };
        self.advance();
        Ok(escaped)
    }

    /// Reads quoted text. Single-quoted text of exactly one character is a char.
    fn read_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    if quote == '\'' {
                        let mut chars = result.chars();
                        if let (Some(only), None) = (chars.next(), chars.next()) {
                            return Ok(Token::Char(only));
                        }
                    }
                    return Ok(Token::String(result));
                }
                '\\' => result.push(self.read_escape()?),
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::new("Unterminated string: missing closing quote", start))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let caps = NUMBER
            .as_ref()
            .and_then(|re| re.captures(&self.input[start..]))
            .ok_or_else(|| LexError::new("Invalid number", start))?;
        let text = caps.get(0).map_or("", |m| m.as_str());
        let suffix = caps
            .name("suffix")
            .and_then(|m| m.as_str().chars().next())
            .map(|c| c.to_ascii_uppercase());
        let invalid = || LexError::new(format!("Invalid number literal '{}'", text), start);

        let token = if let Some(hex) = caps.name("hex") {
            let n = i128::from_str_radix(hex.as_str(), 16).map_err(|_| invalid())?;
            integer_token(n, suffix).ok_or_else(invalid)?
        } else {
            let digits = caps.name("int").map_or("", |m| m.as_str());
            let is_float = caps.name("frac").is_some() || caps.name("exp").is_some();
            let body = &text[..text.len() - usize::from(suffix.is_some())];
            match (is_float, suffix) {
                (false, None | Some('L') | Some('B')) => {
                    let n = if digits.len() > 1 && digits.starts_with('0') {
                        i128::from_str_radix(digits, 8)
                    } else {
                        digits.parse::<i128>()
                    }
                    .map_err(|_| invalid())?;
                    integer_token(n, suffix).ok_or_else(invalid)?
                }
                (true, Some('L') | Some('B')) => return Err(invalid()),
                (_, Some('F')) => Token::Float(body.parse::<f32>().map_err(|_| invalid())?),
                (_, Some('H')) => {
                    let decimal = if caps.name("exp").is_some() {
                        Decimal::from_scientific(body)
                    } else {
                        Decimal::from_str(body)
                    };
                    Token::BigDecimal(decimal.map_err(|_| invalid())?)
                }
                _ => Token::Double(body.parse::<f64>().map_err(|_| invalid())?),
            }
        };

        self.position += text.len();
        if self
            .current_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(LexError::new(
                format!("Unexpected character after number '{}'", text),
                self.position,
            ));
        }
        Ok(token)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.position;

        let Some(ch) = self.current_char() else {
            return Ok(Token::Eof);
        };
        let next = self.peek_char(1);
        let token = match ch {
            '#' => self.take(1, Token::Hash),
            '@' => self.take(1, Token::At),
            '$' => self.take(1, Token::Dollar),
            '?' => self.take(1, Token::Question),
            '~' => self.take(1, Token::Tilde),
            '^' => self.take(1, Token::Caret),
            '+' => self.take(1, Token::Plus),
            '-' => self.take(1, Token::Minus),
            '*' => self.take(1, Token::Star),
            '/' => self.take(1, Token::Slash),
            '%' => self.take(1, Token::Percent),
            '(' => self.take(1, Token::LParen),
            ')' => self.take(1, Token::RParen),
            '[' => self.take(1, Token::LBracket),
            ']' => self.take(1, Token::RBracket),
            '{' => self.take(1, Token::LBrace),
            '}' => self.take(1, Token::RBrace),
            '.' => self.take(1, Token::Dot),
            ',' => self.take(1, Token::Comma),
            ':' => self.take(1, Token::Colon),
            '|' if next == Some('|') => self.take(2, Token::Or),
            '|' => self.take(1, Token::Pipe),
            '&' if next == Some('&') => self.take(2, Token::And),
            '&' => self.take(1, Token::Amp),
            '=' if next == Some('=') => self.take(2, Token::EqEq),
            '=' => self.take(1, Token::Assign),
            '!' if next == Some('=') => self.take(2, Token::NotEq),
            '!' => self.take(1, Token::Not),
            '<' if next == Some('=') => self.take(2, Token::LtEq),
            '<' if next == Some('<') => self.take(2, Token::Shl),
            '<' => self.take(1, Token::Lt),
            '>' if next == Some('=') => self.take(2, Token::GtEq),
            '>' if next == Some('>') => {
                if self.peek_char(2) == Some('>') {
                    self.take(3, Token::Ushr)
                } else {
                    self.take(2, Token::Shr)
                }
            }
            '>' => self.take(1, Token::Gt),
            '"' | '\'' => self.read_string(ch)?,
            c if c.is_ascii_digit() => self.read_number()?,
            c if c.is_alphabetic() || c == '_' => {
                let ident = self.read_identifier();
                Token::keyword(&ident).unwrap_or(Token::Identifier(ident))
            }
            c => {
                return Err(LexError::new(
                    format!("Unexpected character '{}'", c),
                    self.position,
                ));
            }
        };
        Ok(token)
    }

    /// Lexes the whole input, ending with [`Token::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

/// Narrowest integer token for `n`, honoring an `L` or `B` suffix.
fn integer_token(n: i128, suffix: Option<char>) -> Option<Token> {
    match suffix {
        Some('B') => Some(Token::BigInteger(n)),
        Some('L') => i64::try_from(n).ok().map(Token::Long),
        _ => Some(if let Ok(n) = i32::try_from(n) {
            Token::Int(n)
        } else if let Ok(n) = i64::try_from(n) {
            Token::Long(n)
        } else {
            Token::BigInteger(n)
        }),
    }
}

#[test]
fn test_word_operators() {
    let mut lexer = Lexer::new("and or not eq shl true null");
    assert_eq!(lexer.next_token(), Ok(Token::And));
    assert_eq!(lexer.next_token(), Ok(Token::Or));
    assert_eq!(lexer.next_token(), Ok(Token::Not));
    assert_eq!(lexer.next_token(), Ok(Token::EqEq));
    assert_eq!(lexer.next_token(), Ok(Token::Shl));
    assert_eq!(lexer.next_token(), Ok(Token::Boolean(true)));
    assert_eq!(lexer.next_token(), Ok(Token::Null));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_navigation() {
    let mut lexer = Lexer::new("bean.items[#LAST].name");
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("bean".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Dot));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("items".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::LBracket));
    assert_eq!(lexer.next_token(), Ok(Token::Hash));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("LAST".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::RBracket));
    assert_eq!(lexer.next_token(), Ok(Token::Dot));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("name".to_string())));
}

#[test]
fn test_number_suffixes() {
    let mut lexer = Lexer::new("42 42L 2.5F 2D 7B 1.25H 0x1F 017");
    assert_eq!(lexer.next_token(), Ok(Token::Int(42)));
    assert_eq!(lexer.next_token(), Ok(Token::Long(42)));
    assert_eq!(lexer.next_token(), Ok(Token::Float(2.5)));
    assert_eq!(lexer.next_token(), Ok(Token::Double(2.0)));
    assert_eq!(lexer.next_token(), Ok(Token::BigInteger(7)));
    assert_eq!(lexer.next_token(), Ok(Token::BigDecimal(Decimal::new(125, 2))));
    assert_eq!(lexer.next_token(), Ok(Token::Int(31)));
    assert_eq!(lexer.next_token(), Ok(Token::Int(15)));
}

#[test]
fn test_unterminated_string_reports_start() {
    let mut lexer = Lexer::new("a + \"open");
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("a".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Plus));
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err.position, 4);
}
