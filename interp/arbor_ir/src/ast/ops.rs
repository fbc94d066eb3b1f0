//! Operator tags for binary and unary nodes.

use std::fmt;

/// Binary operator tag.
///
/// The `*Checked` variants select trapping arithmetic: overflow raises
/// instead of wrapping. `AndAlso`, `OrElse`, and `Coalesce` are
/// short-circuiting control constructs handled by the tree walker, not
/// the numeric engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    AddChecked,
    Sub,
    SubChecked,
    Mul,
    MulChecked,
    Div,
    Modulo,
    Power,
    And,
    Or,
    ExclusiveOr,
    LeftShift,
    RightShift,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    ArrayIndex,
    Coalesce,
    AndAlso,
    OrElse,
}

impl BinaryOp {
    /// Whether this operator traps on overflow.
    pub fn is_checked(self) -> bool {
        matches!(self, Self::AddChecked | Self::SubChecked | Self::MulChecked)
    }

    /// Whether this operator yields a boolean from two operands of a
    /// common scalar kind (equality included).
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    /// Whether this operator is a shift (right operand is a count).
    pub fn is_shift(self) -> bool {
        matches!(self, Self::LeftShift | Self::RightShift)
    }

    /// Whether this operator is a short-circuiting control construct.
    pub fn is_control(self) -> bool {
        matches!(self, Self::AndAlso | Self::OrElse | Self::Coalesce)
    }

    /// Operator name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Add | Self::AddChecked => "addition",
            Self::Sub | Self::SubChecked => "subtraction",
            Self::Mul | Self::MulChecked => "multiplication",
            Self::Div => "division",
            Self::Modulo => "remainder",
            Self::Power => "power",
            Self::And => "bitwise and",
            Self::Or => "bitwise or",
            Self::ExclusiveOr => "bitwise xor",
            Self::LeftShift => "left shift",
            Self::RightShift => "right shift",
            Self::Eq => "equality",
            Self::NotEq => "inequality",
            Self::Lt => "less-than",
            Self::LtEq => "less-or-equal",
            Self::Gt => "greater-than",
            Self::GtEq => "greater-or-equal",
            Self::ArrayIndex => "array index",
            Self::Coalesce => "coalesce",
            Self::AndAlso => "logical and",
            Self::OrElse => "logical or",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unary operator tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation, wrapping on overflow.
    Negate,
    /// Arithmetic negation, trapping on overflow.
    NegateChecked,
    /// Boolean complement, or bitwise complement on integer kinds.
    Not,
    /// Identity.
    UnaryPlus,
    /// Kind conversion, wrapping/truncating on magnitude loss.
    Convert,
    /// Kind conversion, trapping on magnitude loss.
    ConvertChecked,
    /// Length of an array value, as a 32-bit signed integer.
    ArrayLength,
    /// The operand sub-tree itself, unevaluated.
    Quote,
    /// The operand if it is an instance of the node's declared type,
    /// otherwise the absent value.
    TypeAs,
}

impl UnaryOp {
    /// Operator name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Negate | Self::NegateChecked => "negation",
            Self::Not => "complement",
            Self::UnaryPlus => "unary plus",
            Self::Convert => "conversion",
            Self::ConvertChecked => "checked conversion",
            Self::ArrayLength => "array length",
            Self::Quote => "quote",
            Self::TypeAs => "type-as",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
