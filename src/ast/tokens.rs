use rust_decimal::Decimal;

/// Lexical tokens.
///
/// Word operators (`and`, `shl`, `eq`, ...) are produced as the same token as
/// their symbolic form.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// 32-bit integer; decimal, hex (`0x1F`) or octal (`017`)
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0xff
    /// ```
    Int(i32),

    /// Integer with an `L` suffix, or too large for `int`
    ///
    /// # Examples
    /// ```text
    /// 42L
    /// 5000000000
    /// ```
    Long(i64),

    /// Floating-point literal with an `F` suffix
    Float(f32),

    /// Floating-point literal, optionally with a `D` suffix
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e10
    /// 2D
    /// ```
    Double(f64),

    /// Integer with a `B` suffix
    ///
    /// # Examples
    /// ```text
    /// 123456789012345678901234B
    /// ```
    BigInteger(i128),

    /// Decimal with an `H` suffix
    ///
    /// # Examples
    /// ```text
    /// 10.25H
    /// ```
    BigDecimal(Decimal),

    /// Double-quoted string, or single-quoted text longer than one character
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'hello'
    /// ```
    String(String),

    /// Single-quoted single character
    ///
    /// # Examples
    /// ```text
    /// 'a'
    /// '\n'
    /// ```
    Char(char),

    /// `true` or `false`
    Boolean(bool),

    /// `null`
    Null,

    /// Property, method, variable or class name segment
    ///
    /// # Examples
    /// ```text
    /// name
    /// getItems
    /// _count
    /// ```
    Identifier(String),

    // Keywords
    /// `new`
    New,
    /// `instanceof`
    InstanceOf,
    /// `in`
    In,

    // Prefixes
    /// Variable prefix (`#name`, `#this`, `#root`), map literal opener (`#{`)
    Hash,
    /// Static member delimiter (`@Class@member`)
    At,

    // Operators
    /// `=`
    Assign,
    /// `?`
    Question,
    /// `||`, `or`
    Or,
    /// `&&`, `and`
    And,
    /// `!`, `not`
    Not,
    /// `|`, `bor`; also the `[|]` middle subscript
    Pipe,
    /// `^`, `xor`; also the `[^]` first subscript and `{^ }` selection
    Caret,
    /// `&`, `band`
    Amp,
    /// `~`, `bnot`
    Tilde,
    /// `==`, `eq`
    EqEq,
    /// `!=`, `neq`
    NotEq,
    /// `<`, `lt`
    Lt,
    /// `>`, `gt`
    Gt,
    /// `<=`, `lte`
    LtEq,
    /// `>=`, `gte`
    GtEq,
    /// `<<`, `shl`
    Shl,
    /// `>>`, `shr`
    Shr,
    /// `>>>`, `ushr`
    Ushr,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`; also the `[*]` all subscript
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `$`: the `[$]` last subscript and `{$ }` selection
    Dollar,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Comma,
    Colon,

    /// End of input
    Eof,
}

impl Token {
    /// Maps a word operator or keyword to its token.
    pub fn keyword(word: &str) -> Option<Token> {
        Some(match word {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            "new" => Token::New,
            "instanceof" => Token::InstanceOf,
            "in" => Token::In,
            "or" => Token::Or,
            "and" => Token::And,
            "not" => Token::Not,
            "bor" => Token::Pipe,
            "xor" => Token::Caret,
            "band" => Token::Amp,
            "bnot" => Token::Tilde,
            "eq" => Token::EqEq,
            "neq" => Token::NotEq,
            "lt" => Token::Lt,
            "gt" => Token::Gt,
            "lte" => Token::LtEq,
            "gte" => Token::GtEq,
            "shl" => Token::Shl,
            "shr" => Token::Shr,
            "ushr" => Token::Ushr,
            _ => return None,
        })
    }
}
