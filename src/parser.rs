use std::mem;

use crate::{
    ast::{BinaryOp, Literal, Node, NodeKind, SelectKind, Token, UnaryOp},
    lexer::{LexError, Lexer},
    value::DynamicSubscript,
};

/// Malformed expression text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    /// Byte offset of the offending token.
    pub position: usize,
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            message: e.message,
            position: e.position,
        }
    }
}

/// Parses `text` into a tree.
///
/// ```
/// use graphnav_lang::parse;
///
/// let node = parse("bean.items[#LAST].name").unwrap();
/// assert_eq!(node.to_string(), "bean.items[#LAST].name");
/// ```
pub fn parse(text: &str) -> Result<Node, ParseError> {
    Parser::new(Lexer::new(text))?.parse()
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    position: usize,
    /// One token of lookahead, with its position.
    peeked: Option<(Token, usize)>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let position = lexer.token_start();
        Ok(Parser {
            lexer,
            current_token,
            position,
            peeked: None,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let (token, position) = match self.peeked.take() {
            Some(peeked) => peeked,
            None => (self.lexer.next_token()?, self.lexer.token_start()),
        };
        self.current_token = token;
        self.position = position;
        Ok(())
    }

    fn peek(&mut self) -> Result<&Token, ParseError> {
        if self.peeked.is_none() {
            let token = self.lexer.next_token()?;
            self.peeked = Some((token, self.lexer.token_start()));
        }
        Ok(self.peeked.as_ref().map_or(&Token::Eof, |(token, _)| token))
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.position,
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.error(format!(
                "Expected {:?}, got {:?}",
                expected, self.current_token
            )));
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Identifier(name) => {
                self.advance()?;
                Ok(name)
            }
            token => {
                self.current_token = token;
                Err(self.error(format!(
                    "Expected identifier, got {:?}",
                    self.current_token
                )))
            }
        }
    }

    /// `a.b.C`, as written after `new`, `instanceof` and `@`.
    fn parse_class_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_identifier()?;
        while self.check(&Token::Dot) && matches!(self.peek()?, Token::Identifier(_)) {
            self.advance()?;
            name.push('.');
            name.push_str(&self.expect_identifier()?);
        }
        Ok(name)
    }

    /// `(a, b, c)`; the opening parenthesis is current.
    fn parse_arguments(&mut self) -> Result<Vec<Node>, ParseError> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        while !self.check(&Token::RParen) {
            args.push(self.parse_assignment()?);
            if !self.check(&Token::RParen) {
                self.expect(Token::Comma)?;
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }

    /// `{a, b}`; the opening brace is current.
    fn parse_list_literal(&mut self) -> Result<Node, ParseError> {
        self.expect(Token::LBrace)?;
        let mut items = Vec::new();
        while !self.check(&Token::RBrace) {
            items.push(self.parse_assignment()?);
            if !self.check(&Token::RBrace) {
                self.expect(Token::Comma)?;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(Node::new(NodeKind::List(items)))
    }

    /// `#{k: v}`; the brace after `#` is current.
    fn parse_map_literal(&mut self) -> Result<Node, ParseError> {
        self.expect(Token::LBrace)?;
        let mut entries = Vec::new();
        while !self.check(&Token::RBrace) {
            let key = self.parse_binary(1)?;
            self.expect(Token::Colon)?;
            let value = self.parse_assignment()?;
            entries.push((key, value));
            if !self.check(&Token::RBrace) {
                self.expect(Token::Comma)?;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(Node::new(NodeKind::Map(entries)))
    }

    /// What follows `#`.
    fn parse_hash(&mut self) -> Result<Node, ParseError> {
        if self.check(&Token::LBrace) {
            return self.parse_map_literal();
        }
        let name = self.expect_identifier()?;
        Ok(match name.as_str() {
            "this" => Node::new(NodeKind::This),
            "root" => Node::new(NodeKind::Root),
            "FIRST" => Node::constant(Literal::Subscript(DynamicSubscript::First)),
            "MID" => Node::constant(Literal::Subscript(DynamicSubscript::Mid)),
            "LAST" => Node::constant(Literal::Subscript(DynamicSubscript::Last)),
            "ALL" => Node::constant(Literal::Subscript(DynamicSubscript::All)),
            _ => Node::variable(name),
        })
    }

    /// `@Class@field` or `@Class@method(args)`; the first `@` is consumed.
    fn parse_static(&mut self) -> Result<Node, ParseError> {
        let class = self.parse_class_name()?;
        self.expect(Token::At)?;
        let name = self.expect_identifier()?;
        if self.check(&Token::LParen) {
            let args = self.parse_arguments()?;
            return Ok(Node::new(NodeKind::StaticMethod { class, name, args }));
        }
        Ok(Node::new(NodeKind::StaticField { class, name }))
    }

    /// `new C(args)`, `new T[n]`, `new T[] {..}`; `new` is consumed.
    fn parse_constructor(&mut self) -> Result<Node, ParseError> {
        let class = self.parse_class_name()?;
        if self.check(&Token::LParen) {
            let args = self.parse_arguments()?;
            return Ok(Node::new(NodeKind::Constructor {
                class,
                args,
                array: false,
            }));
        }
        self.expect(Token::LBracket)?;
        let init = if self.check(&Token::RBracket) {
            self.advance()?;
            self.parse_list_literal()?
        } else {
            let size = self.parse_expression()?;
            self.expect(Token::RBracket)?;
            size
        };
        Ok(Node::new(NodeKind::Constructor {
            class,
            args: vec![init],
            array: true,
        }))
    }

    /// Contents of `[...]`: a symbolic subscript or an expression.
    fn parse_index(&mut self) -> Result<Node, ParseError> {
        let symbolic = match self.current_token {
            Token::Caret => Some(DynamicSubscript::First),
            Token::Pipe => Some(DynamicSubscript::Mid),
            Token::Dollar => Some(DynamicSubscript::Last),
            Token::Star => Some(DynamicSubscript::All),
            _ => None,
        };
        if let Some(subscript) = symbolic
            && matches!(self.peek()?, Token::RBracket)
        {
            self.advance()?;
            return Ok(Node::constant(Literal::Subscript(subscript)));
        }
        self.parse_expression()
    }

    /// Parse primary expressions: literals, variables, names, calls, static
    /// members, constructors, collection literals and parenthesized expressions
    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let literal = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Int(n) => Literal::Int(n),
            Token::Long(n) => Literal::Long(n),
            Token::Float(n) => Literal::Float(n),
            Token::Double(n) => Literal::Double(n),
            Token::BigInteger(n) => Literal::BigInteger(n),
            Token::BigDecimal(n) => Literal::BigDecimal(n),
            Token::String(s) => Literal::String(s),
            Token::Char(c) => Literal::Char(c),
            Token::Boolean(b) => Literal::Boolean(b),
            Token::Null => Literal::Null,

            Token::Identifier(name) => {
                self.advance()?;
                if self.check(&Token::LParen) {
                    let args = self.parse_arguments()?;
                    return Ok(Node::method(name, args));
                }
                return Ok(Node::property(name));
            }
            Token::Hash => {
                self.advance()?;
                return self.parse_hash();
            }
            Token::At => {
                self.advance()?;
                return self.parse_static();
            }
            Token::New => {
                self.advance()?;
                return self.parse_constructor();
            }
            Token::LBrace => {
                self.current_token = Token::LBrace;
                return self.parse_list_literal();
            }
            Token::LBracket => {
                self.advance()?;
                let key = self.parse_index()?;
                self.expect(Token::RBracket)?;
                return Ok(Node::index(key));
            }
            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                return Ok(expr);
            }

            token => {
                self.current_token = token;
                return Err(self.error(format!(
                    "Unexpected token in primary expression: {:?}",
                    self.current_token
                )));
            }
        };
        self.advance()?;
        Ok(Node::constant(literal))
    }

    /// `.{ expr }` and the selection forms; `.{` is consumed.
    fn parse_brace_step(&mut self) -> Result<Node, ParseError> {
        let kind = match self.current_token {
            Token::Question => Some(SelectKind::All),
            Token::Caret => Some(SelectKind::First),
            Token::Dollar => Some(SelectKind::Last),
            _ => None,
        };
        if kind.is_some() {
            self.advance()?;
        }
        let expr = self.parse_expression()?;
        self.expect(Token::RBrace)?;
        Ok(match kind {
            Some(kind) => Node::new(NodeKind::Selection {
                kind,
                condition: Box::new(expr),
            }),
            None => Node::new(NodeKind::Projection(Box::new(expr))),
        })
    }

    /// Parse navigation: a primary followed by `.name`, `.name(args)`,
    /// `[index]`, projections and selections
    fn parse_navigation(&mut self) -> Result<Node, ParseError> {
        let mut steps = vec![self.parse_primary()?];

        loop {
            if self.check(&Token::Dot) {
                self.advance()?;
                match mem::replace(&mut self.current_token, Token::Eof) {
                    Token::LBrace => {
                        self.advance()?;
                        steps.push(self.parse_brace_step()?);
                    }
                    Token::Identifier(name) => {
                        self.advance()?;
                        if self.check(&Token::LParen) {
                            let args = self.parse_arguments()?;
                            steps.push(Node::method(name, args));
                        } else {
                            steps.push(Node::property(name));
                        }
                    }
                    token => {
                        self.current_token = token;
                        return Err(self.error(format!(
                            "Expected property name after '.', got {:?}",
                            self.current_token
                        )));
                    }
                }
            } else if self.check(&Token::LBracket) {
                self.advance()?;
                let key = self.parse_index()?;
                self.expect(Token::RBracket)?;
                steps.push(Node::index(key));
            } else {
                break;
            }
        }

        Ok(Node::chain(steps))
    }

    /// Parse prefix operators and the postfix `instanceof`
    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let op = match self.current_token {
            Token::Minus => Some(UnaryOp::Negate),
            Token::Plus => Some(UnaryOp::Plus),
            Token::Not => Some(UnaryOp::Not),
            Token::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = op {
            self.advance()?;
            let operand = self.parse_unary()?;
            if op == UnaryOp::Negate
                && let NodeKind::Constant(literal) = operand.kind()
                && let Some(negated) = negate_literal(literal)
            {
                return Ok(Node::constant(negated));
            }
            return Ok(Node::unary(op, operand));
        }

        let operand = self.parse_navigation()?;
        if self.check(&Token::InstanceOf) {
            self.advance()?;
            let class = self.parse_class_name()?;
            return Ok(Node::new(NodeKind::InstanceOf {
                operand: Box::new(operand),
                class,
            }));
        }
        Ok(operand)
    }

    /// The binary operator at the current token, if any. `not in` spans two
    /// tokens.
    fn binary_op(&mut self) -> Result<Option<BinaryOp>, ParseError> {
        if self.check(&Token::Not) {
            let not_in = matches!(self.peek()?, Token::In);
            return Ok(not_in.then_some(BinaryOp::NotIn));
        }
        Ok(Some(match self.current_token {
            Token::Or => BinaryOp::Or,
            Token::And => BinaryOp::And,
            Token::Pipe => BinaryOp::BitOr,
            Token::Caret => BinaryOp::Xor,
            Token::Amp => BinaryOp::BitAnd,
            Token::EqEq => BinaryOp::Equal,
            Token::NotEq => BinaryOp::NotEqual,
            Token::Lt => BinaryOp::Less,
            Token::Gt => BinaryOp::Greater,
            Token::LtEq => BinaryOp::LessEqual,
            Token::GtEq => BinaryOp::GreaterEqual,
            Token::In => BinaryOp::In,
            Token::Shl => BinaryOp::ShiftLeft,
            Token::Shr => BinaryOp::ShiftRight,
            Token::Ushr => BinaryOp::UnsignedShiftRight,
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Subtract,
            Token::Star => BinaryOp::Multiply,
            Token::Slash => BinaryOp::Divide,
            Token::Percent => BinaryOp::Remainder,
            _ => return Ok(None),
        }))
    }

    /// Parse left-associative binary operators binding at least as tightly as `min`
    fn parse_binary(&mut self, min: u8) -> Result<Node, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some(op) = self.binary_op()? {
            if op.precedence() < min {
                break;
            }
            self.advance()?;
            if op == BinaryOp::NotIn {
                self.advance()?;
            }
            let right = self.parse_binary(op.precedence() + 1)?;
            left = Node::binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse `c ? a : b`, right associative
    fn parse_conditional(&mut self) -> Result<Node, ParseError> {
        let condition = self.parse_binary(1)?;
        if !self.check(&Token::Question) {
            return Ok(condition);
        }
        self.advance()?;
        let then = self.parse_assignment()?;
        self.expect(Token::Colon)?;
        let otherwise = self.parse_conditional()?;
        Ok(Node::new(NodeKind::Ternary {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }))
    }

    /// Parse `target = value`, right associative
    fn parse_assignment(&mut self) -> Result<Node, ParseError> {
        let target = self.parse_conditional()?;
        if !self.check(&Token::Assign) {
            return Ok(target);
        }
        self.advance()?;
        let value = self.parse_assignment()?;
        Ok(Node::assign(target, value))
    }

    /// Parse a comma-separated sequence
    pub fn parse_expression(&mut self) -> Result<Node, ParseError> {
        let mut items = vec![self.parse_assignment()?];
        while self.check(&Token::Comma) {
            self.advance()?;
            items.push(self.parse_assignment()?);
        }
        Ok(Node::sequence(items))
    }

    /// Parses the whole input as one expression.
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let node = self.parse_expression()?;
        if !self.check(&Token::Eof) {
            return Err(self.error(format!("Unexpected token {:?}", self.current_token)));
        }
        Ok(node)
    }
}

fn negate_literal(literal: &Literal) -> Option<Literal> {
    Some(match literal {
        Literal::Int(n) => Literal::Int(n.checked_neg()?),
        Literal::Long(n) => Literal::Long(n.checked_neg()?),
        Literal::Float(n) => Literal::Float(-n),
        Literal::Double(n) => Literal::Double(-n),
        Literal::BigInteger(n) => Literal::BigInteger(n.checked_neg()?),
        Literal::BigDecimal(n) => Literal::BigDecimal(-*n),
        _ => return None,
    })
}
