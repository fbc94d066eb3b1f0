//! Declared static types and the primitive-kind lattice.

use std::fmt;
use std::sync::Arc;

/// One of the eleven primitive numeric kinds.
///
/// Ordered by promotion rank: when two kinds meet in a binary
/// operation, the wider of the two wins (see [`PrimitiveKind::wider`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
}

impl PrimitiveKind {
    /// All numeric kinds, in promotion order.
    pub const ALL: [PrimitiveKind; 11] = [
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Decimal,
    ];

    /// The widest of the two kinds, per the promotion lattice.
    pub fn wider(self, other: Self) -> Self {
        if self >= other { self } else { other }
    }

    /// Whether this is one of the eight fixed-width integer kinds.
    pub fn is_integer(self) -> bool {
        !matches!(self, Self::F32 | Self::F64 | Self::Decimal)
    }

    /// Whether this is a binary floating-point kind.
    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Whether this integer kind is signed. Floats and decimal are
    /// signed by definition.
    pub fn is_signed(self) -> bool {
        !matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    /// Lowercase kind name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar kind: a numeric primitive, boolean, or character.
///
/// Booleans and characters sit outside the numeric promotion grid but
/// are individually convertible, so the conversion table and the
/// numeric engine dispatch over this wider set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Numeric(PrimitiveKind),
    Bool,
    Char,
}

impl ScalarKind {
    /// Lowercase kind name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Numeric(k) => k.name(),
            Self::Bool => "bool",
            Self::Char => "char",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameter and result shape of a delegate type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionTy {
    pub params: Vec<Ty>,
    /// `Ty::Void` marks a side-effecting shape with no result.
    pub result: Ty,
}

/// Declared static type of an expression node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ty {
    /// A plain scalar.
    Scalar(ScalarKind),
    /// An optional ("nullable") scalar. Operators over this type take
    /// the lifted evaluation path.
    Nullable(ScalarKind),
    /// A named reference type.
    Object(Arc<str>),
    /// An array with the given element type.
    Array(Arc<Ty>),
    /// A delegate type.
    Function(Arc<FunctionTy>),
    /// "No result"; also the declared type of side-effecting lambdas.
    Void,
}

impl Ty {
    pub const BOOL: Ty = Ty::Scalar(ScalarKind::Bool);
    pub const CHAR: Ty = Ty::Scalar(ScalarKind::Char);

    /// A plain numeric scalar type.
    pub fn numeric(kind: PrimitiveKind) -> Ty {
        Ty::Scalar(ScalarKind::Numeric(kind))
    }

    /// An optional numeric scalar type.
    pub fn nullable_numeric(kind: PrimitiveKind) -> Ty {
        Ty::Nullable(ScalarKind::Numeric(kind))
    }

    /// A named reference type.
    pub fn object(name: &str) -> Ty {
        Ty::Object(Arc::from(name))
    }

    /// An array type with the given element type.
    pub fn array(elem: Ty) -> Ty {
        Ty::Array(Arc::new(elem))
    }

    /// A delegate type.
    pub fn function(params: Vec<Ty>, result: Ty) -> Ty {
        Ty::Function(Arc::new(FunctionTy { params, result }))
    }

    /// The scalar kind and whether it is lifted (optional), if this is
    /// a scalar or optional-scalar type.
    pub fn as_scalar(&self) -> Option<(ScalarKind, bool)> {
        match self {
            Ty::Scalar(k) => Some((*k, false)),
            Ty::Nullable(k) => Some((*k, true)),
            _ => None,
        }
    }

    /// Whether this type admits the absent value.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            Ty::Nullable(_) | Ty::Object(_) | Ty::Array(_) | Ty::Function(_)
        )
    }

    /// Whether this is the "no result" marker.
    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Void)
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Scalar(k) => write!(f, "{k}"),
            Ty::Nullable(k) => write!(f, "{k}?"),
            Ty::Object(name) => write!(f, "{name}"),
            Ty::Array(elem) => write!(f, "{elem}[]"),
            Ty::Function(ft) => {
                write!(f, "fn(")?;
                for (i, p) in ft.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {}", ft.result)
            }
            Ty::Void => write!(f, "void"),
        }
    }
}
