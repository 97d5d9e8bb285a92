//! Splitting location invariants into a pure invariant and a cost rate

use super::types::TypeKind;
use super::Type;
use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};

/// A location invariant split into its invariant conjuncts and its rate
/// equations `rate(x) == e`
#[derive(Debug, Clone, Default)]
pub struct RateDecomposition {
    /// Conjunction of the invariant parts, if any
    pub invariant: Option<Expr>,
    /// `(cost variable, rate)` pairs in source order
    pub rates: Vec<(Expr, Expr)>,
}

impl RateDecomposition {
    /// Decompose an annotated invariant of invariant-with-rate type
    #[must_use]
    pub fn decompose(expr: Expr) -> Self {
        let mut decomposition = Self::default();
        decomposition.visit(expr);
        decomposition
    }

    /// The rate of the first rate equation; later ones are not used
    #[must_use]
    pub fn cost_rate(&self) -> Option<&Expr> {
        self.rates.first().map(|(_, rate)| rate)
    }

    fn visit(&mut self, expr: Expr) {
        if expr.ty.is_invariant() {
            self.push_invariant(expr);
            return;
        }
        match expr.kind {
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                self.visit(*left);
                self.visit(*right);
            }
            ExprKind::Binary {
                op: BinaryOp::Eq,
                left,
                right,
            } if left.ty.is_rate() || right.ty.is_rate() => {
                let (rate, value) = if left.ty.is_rate() {
                    (*left, *right)
                } else {
                    (*right, *left)
                };
                let cost = match rate.kind {
                    ExprKind::Unary {
                        op: UnaryOp::Rate,
                        operand,
                    } => *operand,
                    kind => Expr {
                        kind,
                        span: rate.span,
                        ty: rate.ty,
                    },
                };
                self.rates.push((cost, value));
            }
            kind => self.push_invariant(Expr {
                kind,
                span: expr.span,
                ty: expr.ty,
            }),
        }
    }

    fn push_invariant(&mut self, expr: Expr) {
        self.invariant = Some(match self.invariant.take() {
            None => expr,
            Some(previous) => {
                let kind = if previous.ty.is_value() && expr.ty.is_value() {
                    TypeKind::Bool
                } else {
                    TypeKind::Invariant
                };
                let span = previous.span.merge(expr.span);
                let mut conjunction = Expr::binary(BinaryOp::And, previous, expr).with_span(span);
                conjunction.ty = Type::from(kind);
                conjunction
            }
        });
    }
}
