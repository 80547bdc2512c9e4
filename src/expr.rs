//! # Expression Tree
//!
//! A compact, immutable expression tree shared by the compiler passes that
//! feed the telemetry sink. Nodes are tagged variants behind an `Arc`, so
//! clones are cheap and rewrites reconstruct new trees instead of mutating
//! shared structure.

use std::fmt;
use std::sync::Arc;

/// Scalar type carried by an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
}

/// How a call node binds to its callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Compiler-internal intrinsic. The name is not user-controlled.
    Intrinsic,
    /// Call to an externally defined function.
    Extern,
    /// Call to an externally defined C++ function.
    ExternCpp,
    /// Load from a user-provided image or buffer.
    Image,
}

/// Binary operator tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
    Eq,
    Ne,
    Lt,
    Le,
    And,
    Or,
}

impl BinaryOp {
    /// Infix symbol, or `None` for operators printed in function style.
    fn infix_symbol(self) -> Option<&'static str> {
        match self {
            BinaryOp::Add => Some("+"),
            BinaryOp::Sub => Some("-"),
            BinaryOp::Mul => Some("*"),
            BinaryOp::Div => Some("/"),
            BinaryOp::Mod => Some("%"),
            BinaryOp::Eq => Some("=="),
            BinaryOp::Ne => Some("!="),
            BinaryOp::Lt => Some("<"),
            BinaryOp::Le => Some("<="),
            BinaryOp::And => Some("&&"),
            BinaryOp::Or => Some("||"),
            BinaryOp::Min | BinaryOp::Max => None,
        }
    }

    /// True when the operator yields a boolean regardless of operand types.
    fn is_predicate(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::And
                | BinaryOp::Or
        )
    }
}

/// An immutable, cheaply clonable expression.
///
/// Structurally identical trees compare equal; sharing is an implementation
/// detail and never observable through this API.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    node: Arc<ExprKind>,
}

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntImm {
        ty: Type,
        value: i64,
    },
    FloatImm {
        ty: Type,
        value: f64,
    },
    Variable {
        ty: Type,
        name: String,
    },
    Binary {
        op: BinaryOp,
        lhs: Expr,
        rhs: Expr,
    },
    Not {
        value: Expr,
    },
    Select {
        cond: Expr,
        if_true: Expr,
        if_false: Expr,
    },
    Call {
        ty: Type,
        kind: CallKind,
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    fn make(kind: ExprKind) -> Expr {
        Expr {
            node: Arc::new(kind),
        }
    }

    /// 32-bit integer constant.
    pub fn int(value: i64) -> Expr {
        Expr::make(ExprKind::IntImm {
            ty: Type::Int32,
            value,
        })
    }

    /// 32-bit float constant.
    pub fn float(value: f64) -> Expr {
        Expr::make(ExprKind::FloatImm {
            ty: Type::Float32,
            value,
        })
    }

    /// Named variable reference.
    pub fn var(ty: Type, name: impl Into<String>) -> Expr {
        Expr::make(ExprKind::Variable {
            ty,
            name: name.into(),
        })
    }

    /// Binary operation.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::make(ExprKind::Binary { op, lhs, rhs })
    }

    /// Logical negation.
    pub fn not(value: Expr) -> Expr {
        Expr::make(ExprKind::Not { value })
    }

    /// Three-way select: `cond ? if_true : if_false`.
    pub fn select(cond: Expr, if_true: Expr, if_false: Expr) -> Expr {
        Expr::make(ExprKind::Select {
            cond,
            if_true,
            if_false,
        })
    }

    /// Call node of the given kind.
    pub fn call(ty: Type, kind: CallKind, name: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::make(ExprKind::Call {
            ty,
            kind,
            name: name.into(),
            args,
        })
    }

    /// The node variant, for read-only dispatch.
    pub fn kind(&self) -> &ExprKind {
        &self.node
    }

    /// Result type of this expression.
    pub fn ty(&self) -> Type {
        match self.kind() {
            ExprKind::IntImm { ty, .. }
            | ExprKind::FloatImm { ty, .. }
            | ExprKind::Variable { ty, .. }
            | ExprKind::Call { ty, .. } => *ty,
            ExprKind::Binary { op, lhs, .. } => {
                if op.is_predicate() {
                    Type::Bool
                } else {
                    lhs.ty()
                }
            }
            ExprKind::Not { .. } => Type::Bool,
            ExprKind::Select { if_true, .. } => if_true.ty(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::IntImm { value, .. } => write!(f, "{}", value),
            ExprKind::FloatImm { value, .. } => write!(f, "{:?}", value),
            ExprKind::Variable { name, .. } => write!(f, "{}", name),
            ExprKind::Binary { op, lhs, rhs } => match op.infix_symbol() {
                Some(sym) => write!(f, "({} {} {})", lhs, sym, rhs),
                None => {
                    let callee = match op {
                        BinaryOp::Min => "min",
                        _ => "max",
                    };
                    write!(f, "{}({}, {})", callee, lhs, rhs)
                }
            },
            ExprKind::Not { value } => write!(f, "!{}", value),
            ExprKind::Select {
                cond,
                if_true,
                if_false,
            } => write!(f, "select({}, {}, {})", cond, if_true, if_false),
            ExprKind::Call { name, args, .. } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_infix_and_functional() {
        let x = Expr::var(Type::Int32, "x");
        let y = Expr::var(Type::Int32, "y");
        let sum = Expr::binary(BinaryOp::Add, x.clone(), Expr::int(1));
        assert_eq!(sum.to_string(), "(x + 1)");

        let m = Expr::binary(BinaryOp::Min, x.clone(), y.clone());
        assert_eq!(m.to_string(), "min(x, y)");

        let sel = Expr::select(Expr::binary(BinaryOp::Lt, x, y), Expr::int(0), Expr::int(1));
        assert_eq!(sel.to_string(), "select((x < y), 0, 1)");
    }

    #[test]
    fn test_display_call_args() {
        let call = Expr::call(
            Type::Float32,
            CallKind::Extern,
            "lut",
            vec![Expr::var(Type::Int32, "i"), Expr::int(4)],
        );
        assert_eq!(call.to_string(), "lut(i, 4)");
    }

    #[test]
    fn test_structural_equality() {
        let a = Expr::binary(BinaryOp::Mul, Expr::var(Type::Int32, "v"), Expr::int(2));
        let b = Expr::binary(BinaryOp::Mul, Expr::var(Type::Int32, "v"), Expr::int(2));
        assert_eq!(a, b, "structurally identical trees should compare equal");
    }

    #[test]
    fn test_predicate_type() {
        let cmp = Expr::binary(
            BinaryOp::Lt,
            Expr::var(Type::Int32, "x"),
            Expr::int(10),
        );
        assert_eq!(cmp.ty(), Type::Bool);
        assert_eq!(Expr::not(cmp).ty(), Type::Bool);
    }
}
