//! # Name Anonymization
//!
//! Structural rewrite pass that scrubs user-identifying symbol names from
//! captured expressions before they reach a report:
//! - Named variables become `anon<N>`
//! - Extern and extern-C++ calls become `define_extern_<N>`
//! - Image/buffer references become `image<N>`
//!
//! Operators, structure, and constants are left intact, so anonymized
//! expressions keep their semantic shape.

use crate::expr::{CallKind, Expr, ExprKind};
use std::collections::HashMap;

/// Alias namespace.
///
/// Extern-call, image, and generic variable names are aliased through
/// independent counters so aliases from different categories never collide
/// and stay visually distinguishable in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Bare variable references (`anon<N>`).
    Generic,
    /// Extern and extern-C++ call targets (`define_extern_<N>`).
    Extern,
    /// Image and buffer references (`image<N>`).
    Image,
}

const NAMESPACE_COUNT: usize = 3;

impl Namespace {
    fn prefix(self) -> &'static str {
        match self {
            Namespace::Generic => "anon",
            Namespace::Extern => "define_extern_",
            Namespace::Image => "image",
        }
    }

    fn index(self) -> usize {
        match self {
            Namespace::Generic => 0,
            Namespace::Extern => 1,
            Namespace::Image => 2,
        }
    }
}

/// Stateful rewriter that replaces every free-standing symbolic reference
/// with a synthetic, collision-free alias.
///
/// One instance must be reused across everything that should share aliases:
/// the mapping is append-only, so within one `Anonymizer` the same original
/// name always yields the same alias, and two distinct names in the same
/// namespace never yield the same one.
#[derive(Debug, Default)]
pub struct Anonymizer {
    /// Per-namespace original-name -> alias maps. Each namespace's next
    /// counter value is its map's current size.
    remapping: [HashMap<String, String>; NAMESPACE_COUNT],
}

impl Anonymizer {
    /// Create an anonymizer with no names seen yet.
    pub fn new() -> Self {
        Anonymizer::default()
    }

    /// Look up or mint the alias for `name` in `namespace`.
    ///
    /// The first sight of a name is assigned `<prefix><N>`, where `N` counts
    /// the distinct names already aliased in that namespace; later sights
    /// return the stored alias unchanged. Never fails.
    pub fn alias(&mut self, name: &str, namespace: Namespace) -> String {
        let map = &mut self.remapping[namespace.index()];
        if let Some(existing) = map.get(name) {
            return existing.clone();
        }
        let alias = format!("{}{}", namespace.prefix(), map.len());
        map.insert(name.to_string(), alias.clone());
        alias
    }

    /// Rewrite `expr` bottom-up, returning an equivalent tree with all
    /// symbolic names replaced.
    ///
    /// Extern and extern-C++ calls collapse to a single aliased variable of
    /// the call's result type; their argument subtrees are discarded rather
    /// than independently sanitized. Known data-loss point: argument
    /// structure under a collapsed call never reaches the report.
    pub fn rewrite(&mut self, expr: &Expr) -> Expr {
        match expr.kind() {
            ExprKind::IntImm { .. } | ExprKind::FloatImm { .. } => expr.clone(),
            ExprKind::Variable { ty, name } => {
                Expr::var(*ty, self.alias(name, Namespace::Generic))
            }
            ExprKind::Call {
                ty,
                kind: CallKind::Extern | CallKind::ExternCpp,
                name,
                ..
            } => Expr::var(*ty, self.alias(name, Namespace::Extern)),
            ExprKind::Call {
                ty,
                kind: CallKind::Image,
                name,
                ..
            } => Expr::var(*ty, self.alias(name, Namespace::Image)),
            ExprKind::Call {
                ty,
                kind: CallKind::Intrinsic,
                name,
                args,
            } => {
                // Intrinsic names are compiler-internal; only the arguments
                // can carry user symbols.
                let args = args.iter().map(|arg| self.rewrite(arg)).collect();
                Expr::call(*ty, CallKind::Intrinsic, name.clone(), args)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.rewrite(lhs);
                let rhs = self.rewrite(rhs);
                Expr::binary(*op, lhs, rhs)
            }
            ExprKind::Not { value } => Expr::not(self.rewrite(value)),
            ExprKind::Select {
                cond,
                if_true,
                if_false,
            } => {
                let cond = self.rewrite(cond);
                let if_true = self.rewrite(if_true);
                let if_false = self.rewrite(if_false);
                Expr::select(cond, if_true, if_false)
            }
        }
    }
}
