/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Logical
    /// Short-circuit OR (`||`, `or`); yields the deciding operand
    Or,
    /// Short-circuit AND (`&&`, `and`); yields the deciding operand
    And,

    // Bitwise
    /// Bitwise OR (`|`, `bor`)
    BitOr,
    /// Bitwise XOR (`^`, `xor`)
    Xor,
    /// Bitwise AND (`&`, `band`)
    BitAnd,

    // Comparison
    /// Equal (`==`, `eq`)
    Equal,
    /// Not equal (`!=`, `neq`)
    NotEqual,
    /// Less than (`<`, `lt`)
    Less,
    /// Greater than (`>`, `gt`)
    Greater,
    /// Less than or equal (`<=`, `lte`)
    LessEqual,
    /// Greater than or equal (`>=`, `gte`)
    GreaterEqual,
    /// Membership (`in`)
    In,
    /// Negated membership (`not in`)
    NotIn,

    // Shifts
    /// Left shift (`<<`, `shl`)
    ShiftLeft,
    /// Arithmetic right shift (`>>`, `shr`)
    ShiftRight,
    /// Logical right shift (`>>>`, `ushr`)
    UnsignedShiftRight,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Remainder (`%`)
    Remainder,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::Xor => "^",
            BinaryOp::BitAnd => "&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "not in",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::UnsignedShiftRight => ">>>",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::BitOr => 3,
            BinaryOp::Xor => 4,
            BinaryOp::BitAnd => 5,
            BinaryOp::Equal | BinaryOp::NotEqual => 6,
            BinaryOp::Less
            | BinaryOp::Greater
            | BinaryOp::LessEqual
            | BinaryOp::GreaterEqual
            | BinaryOp::In
            | BinaryOp::NotIn => 7,
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight | BinaryOp::UnsignedShiftRight => 8,
            BinaryOp::Add | BinaryOp::Subtract => 9,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Remainder => 10,
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation (`-`)
    Negate,
    /// Numeric promotion (`+`)
    Plus,
    /// Logical NOT (`!`, `not`)
    Not,
    /// Bitwise complement (`~`, `bnot`)
    BitNot,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

/// Which matches a selection keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectKind {
    /// `{? cond}`: every match
    All,
    /// `{^ cond}`: the first match
    First,
    /// `{$ cond}`: the last match
    Last,
}

impl SelectKind {
    pub fn marker(self) -> char {
        match self {
            SelectKind::All => '?',
            SelectKind::First => '^',
            SelectKind::Last => '$',
        }
    }
}
