//! Expression annotation
//!
//! Types are assigned bottom-up. A node whose children failed is left
//! unannotated so that one mistake produces one diagnostic.

use super::compat::{assignment_compatible, inline_if_compatible};
use super::scope::DeclKind;
use super::types::{Base, Prefixes, TypeKind};
use super::{Type, TypeChecker};
use crate::ast::{AssignOp, BinaryOp, Expr, ExprKind, UnaryOp};
use crate::Span;

/// Result type of a binary operator over operands that are not both plain
/// values, or `None` if the combination is ill-typed.
///
/// The rules are order sensitive: `clock < 5` is an invariant while
/// `5 < clock` is only a guard.
#[must_use]
pub fn type_of_binary_non_int(left: &Type, op: BinaryOp, right: &Type) -> Option<Type> {
    let int = Type::is_integer;
    let clock = Type::is_clock;
    let diff = Type::is_diff;

    let kind = match op {
        BinaryOp::Add => {
            if int(left) && clock(right) || clock(left) && int(right) {
                TypeKind::Clock
            } else if diff(left) && int(right) || int(left) && diff(right) {
                TypeKind::Diff
            } else {
                return None;
            }
        }
        BinaryOp::Sub => {
            // int - clock stays out so that it can become a clock guard
            if clock(left) && int(right) {
                TypeKind::Clock
            } else if diff(left) && int(right)
                || int(left) && diff(right)
                || clock(left) && clock(right)
            {
                TypeKind::Diff
            } else {
                return None;
            }
        }
        BinaryOp::And => {
            if left.is_invariant() && right.is_invariant() {
                TypeKind::Invariant
            } else if left.is_invariant_with_rate() && right.is_invariant_with_rate() {
                TypeKind::InvariantWithRate
            } else if left.is_guard() && right.is_guard() {
                TypeKind::Guard
            } else if left.is_constraint() && right.is_constraint() {
                TypeKind::Constraint
            } else {
                return None;
            }
        }
        BinaryOp::Or => {
            if left.is_value() && right.is_invariant() {
                TypeKind::Invariant
            } else if left.is_value() && right.is_guard() {
                TypeKind::Guard
            } else if left.is_constraint() && right.is_constraint() {
                TypeKind::Constraint
            } else {
                return None;
            }
        }
        BinaryOp::Lt | BinaryOp::Le => {
            if clock(left) && clock(right)
                || clock(left) && int(right)
                || diff(left) && int(right)
                || int(left) && diff(right)
            {
                TypeKind::Invariant
            } else if int(left) && clock(right) {
                TypeKind::Guard
            } else {
                return None;
            }
        }
        BinaryOp::Eq | BinaryOp::Ne => {
            if clock(left) && clock(right)
                || clock(left) && int(right)
                || int(left) && clock(right)
                || diff(left) && int(right)
                || int(left) && diff(right)
            {
                if op == BinaryOp::Eq {
                    TypeKind::Guard
                } else {
                    TypeKind::Constraint
                }
            } else if op == BinaryOp::Eq
                && (left.is_rate() && int(right) || int(left) && right.is_rate())
            {
                TypeKind::InvariantWithRate
            } else {
                return None;
            }
        }
        BinaryOp::Ge | BinaryOp::Gt => {
            if clock(left) && clock(right)
                || int(left) && clock(right)
                || diff(left) && int(right)
                || int(left) && diff(right)
            {
                TypeKind::Invariant
            } else if clock(left) && right.is_guard() {
                TypeKind::Guard
            } else {
                return None;
            }
        }
        _ => return None,
    };
    Some(kind.into())
}

/// Types allowed as the operands of a comma and as edge updates
pub(super) fn is_assignable_result(ty: &Type) -> bool {
    ty.is_value() || ty.is_scalar() || ty.is_clock() || ty.is_record() || ty.is_void() || ty.is_cost()
}

impl TypeChecker<'_> {
    /// Annotate `expr` and all its subexpressions with types.
    ///
    /// Returns `false` if an error was reported; the failing node and its
    /// ancestors keep the unknown type.
    pub fn annotate(&mut self, expr: &mut Expr) -> bool {
        let mut ok = true;
        expr.for_each_child_mut(|child| ok &= self.annotate(child));
        if !ok {
            return false;
        }
        match self.type_of(expr) {
            Some(ty) => {
                expr.ty = ty;
                true
            }
            None => false,
        }
    }

    /// Annotate a bound expression and require a constant integer
    pub(super) fn annotate_constant_integer(&mut self, expr: &mut Expr) -> bool {
        if !self.annotate(expr) {
            return false;
        }
        if !expr.ty.is_integer() {
            self.error(expr.span, "Integer expression expected");
            false
        } else if self.depends_on_persistent(expr) {
            self.error(expr.span, "Constant expression expected");
            false
        } else {
            true
        }
    }

    fn type_of(&mut self, expr: &Expr) -> Option<Type> {
        match &expr.kind {
            ExprKind::Constant(_) => Some(Type::int()),
            ExprKind::Boolean(_) => Some(Type::bool()),
            ExprKind::Identifier(symbol) => Some(self.symbols.type_of(*symbol).clone()),
            ExprKind::Binary { op, left, right } => self.type_of_binary(expr.span, *op, left, right),
            ExprKind::Unary { op, operand } => {
                let ty = &operand.ty;
                let kind = match op {
                    UnaryOp::Not if ty.is_value() => TypeKind::Bool,
                    UnaryOp::Not if ty.is_constraint() => TypeKind::Constraint,
                    UnaryOp::Neg if ty.is_value() => TypeKind::Int(None),
                    UnaryOp::Not | UnaryOp::Neg => {
                        self.error(expr.span, "Invalid operation for type");
                        return None;
                    }
                    UnaryOp::Rate if ty.is_cost() => TypeKind::Rate,
                    UnaryOp::Rate => {
                        self.error(expr.span, "Can only apply rate to cost variables");
                        return None;
                    }
                };
                Some(kind.into())
            }
            ExprKind::Assign { op, target, value } => {
                self.type_of_assignment(expr.span, *op, target, value)
            }
            ExprKind::Increment { target, .. } => {
                if !self.is_lhs_value(target) {
                    self.error(target.span, "Left hand side value expected");
                    None
                } else if !target.ty.is_integer() {
                    self.error(expr.span, "Integer expected");
                    None
                } else {
                    Some(Type::int())
                }
            }
            ExprKind::InlineIf {
                condition,
                then_branch,
                else_branch,
            } => {
                if !condition.ty.is_value() {
                    self.error(expr.span, "First argument of inline if must be an integer");
                    None
                } else if !inline_if_compatible(&then_branch.ty, &else_branch.ty) {
                    self.error(expr.span, "Incompatible arguments to inline if");
                    None
                } else {
                    Some(then_branch.ty.clone())
                }
            }
            ExprKind::Comma { left, right } => {
                for side in [left, right] {
                    if !is_assignable_result(&side.ty) {
                        self.error(side.span, "Incompatible type for comma expression");
                        return None;
                    }
                }
                Some(right.ty.clone())
            }
            ExprKind::Call { callee, args } => {
                let TypeKind::Function { parameters, result } = &callee.ty.kind else {
                    self.error(callee.span, "Function name expected");
                    return None;
                };
                let result = Type::clone(result);
                let parameters = self.symbols.scope_types(*parameters);
                if parameters.len() > args.len() {
                    self.error(expr.span, "Too few arguments");
                } else if parameters.len() < args.len() {
                    for extra in &args[parameters.len()..] {
                        self.error(extra.span, "Too many arguments");
                    }
                } else {
                    for ((_, parameter), argument) in parameters.iter().zip(args) {
                        self.check_parameter_compatible(None, parameter, argument);
                    }
                }
                Some(result)
            }
            ExprKind::Index { base, index } => self.type_of_index(base, index),
            ExprKind::Field { base, name } => {
                let members = match base.ty.kind {
                    TypeKind::Record(scope) | TypeKind::Process(scope) => scope,
                    _ => {
                        self.error(base.span, "Record or process expected");
                        return None;
                    }
                };
                let member = self
                    .symbols
                    .index_of(members, name)
                    .and_then(|i| self.symbols.get(members, i));
                match member {
                    Some(member) => Some(self.symbols.type_of(member).clone()),
                    None => {
                        self.error(expr.span, "Unknown member");
                        None
                    }
                }
            }
            ExprKind::List(items) => {
                let fields = self.symbols.new_scope(None);
                for item in items {
                    let name = item.name.as_deref().unwrap_or_default();
                    self.symbols.add_symbol(
                        fields,
                        name,
                        item.value.ty.clone(),
                        DeclKind::Field,
                        item.value.span,
                    );
                }
                Some(Type::record(fields))
            }
            ExprKind::Forall { symbol, body } => {
                let bound = self.symbols.type_of(*symbol).clone();
                self.check_type(&bound, false, expr.span);
                let kind = if body.ty.is_value() {
                    Some(TypeKind::Bool)
                } else if body.ty.is_invariant() {
                    Some(TypeKind::Invariant)
                } else if body.ty.is_guard() {
                    Some(TypeKind::Guard)
                } else if body.ty.is_constraint() {
                    Some(TypeKind::Constraint)
                } else {
                    self.error(body.span, "Boolean expected");
                    None
                };
                if !self.is_side_effect_free(body) {
                    self.error(body.span, "Expression must be side effect free");
                }
                kind.map(Type::from)
            }
        }
    }

    fn type_of_binary(&mut self, span: Span, op: BinaryOp, left: &Expr, right: &Expr) -> Option<Type> {
        let (lhs, rhs) = (&left.ty, &right.ty);
        if lhs.is_value() && rhs.is_value() {
            return Some(if op.is_arithmetic() {
                Type::int()
            } else {
                Type::bool()
            });
        }
        if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
            if lhs.is_record() && rhs.is_record() && lhs.record_fields() == rhs.record_fields() {
                return Some(Type::bool());
            }
            if lhs.base() == Base::Scalar || rhs.base() == Base::Scalar {
                if !lhs.is_same_scalar(rhs) {
                    self.error(
                        span,
                        "Scalars can only be compared to scalars of the same scalarset",
                    );
                    return None;
                }
                return Some(Type::bool());
            }
        }
        let ty = type_of_binary_non_int(lhs, op, rhs);
        if ty.is_none() {
            self.error(span, "Invalid operands to binary operator");
        }
        ty
    }

    fn type_of_assignment(
        &mut self,
        span: Span,
        op: AssignOp,
        target: &Expr,
        value: &Expr,
    ) -> Option<Type> {
        match op {
            AssignOp::Assign => {
                if !assignment_compatible(&target.ty, &value.ty) {
                    self.error(span, "Incompatible types");
                    return None;
                }
                if !self.is_lhs_value(target) {
                    self.error(target.span, "Left hand side value expected");
                    return None;
                }
            }
            AssignOp::Add => {
                // Reported without aborting; the target type is still assigned
                if !(target.ty.is_integer() || target.ty.is_cost()) || !value.ty.is_integer() {
                    self.error(
                        span,
                        "Increment operator can only be used for integer and cost variables.",
                    );
                } else if !self.is_lhs_value(target) {
                    self.error(target.span, "Left hand side value expected");
                }
            }
            _ => {
                if !target.ty.is_value() || !value.ty.is_value() {
                    self.error(span, "Non-integer types must use regular assignment operator");
                    return None;
                }
                if !self.is_lhs_value(target) {
                    self.error(target.span, "Left hand side value expected");
                    return None;
                }
            }
        }
        Some(target.ty.clone())
    }

    fn type_of_index(&mut self, base: &Expr, index: &Expr) -> Option<Type> {
        let Some((size, element)) = base.ty.array_parts() else {
            self.error(base.span, "Array expected");
            return None;
        };
        if size.is_integer() && index.ty.is_value() {
            let interpreter = self.interpreter();
            let checked = interpreter
                .evaluate(index)
                .and_then(|value| Ok((value, interpreter.evaluate_type_range(size)?)));
            if let Ok((value, range)) = checked {
                if !range.contains_value(value) {
                    self.error(index.span, "Array index out of range");
                    return None;
                }
            }
        } else if size.is_scalar() && index.ty.is_scalar() && !size.is_same_scalar(&index.ty) {
            self.error(index.span, "Incompatible type");
            return None;
        }
        Some(element.clone())
    }

    /// Check if `expr` denotes an assignable location
    #[must_use]
    pub fn is_lhs_value(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Identifier(symbol) => !self
                .symbols
                .type_of(*symbol)
                .has_prefix(Prefixes::CONSTANT),
            ExprKind::Field { base, .. } | ExprKind::Index { base, .. } => self.is_lhs_value(base),
            ExprKind::Assign { target, .. } => self.is_lhs_value(target),
            ExprKind::Increment { op, target } => op.is_prefix() && self.is_lhs_value(target),
            ExprKind::InlineIf {
                then_branch,
                else_branch,
                ..
            } => {
                if !self.is_lhs_value(then_branch) || !self.is_lhs_value(else_branch) {
                    return false;
                }
                // Integer locations must also agree on their declared range
                let then_ty = then_branch.ty.innermost();
                let else_ty = else_branch.ty.innermost();
                !then_ty.is_integer() || then_ty.bounds() == else_ty.bounds()
            }
            ExprKind::Comma { right, .. } => self.is_lhs_value(right),
            _ => false,
        }
    }

    /// Check if `expr` denotes one statically known location
    #[must_use]
    pub fn is_unique_reference(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Identifier(symbol) => !self
                .symbols
                .type_of(*symbol)
                .has_prefix(Prefixes::CONSTANT),
            ExprKind::Field { base, .. } => self.is_unique_reference(base),
            ExprKind::Index { base, index } => {
                self.is_unique_reference(base) && !self.depends_on_persistent(index)
            }
            ExprKind::Assign { target, .. } => self.is_unique_reference(target),
            ExprKind::Increment { op, target } => {
                op.is_prefix() && self.is_unique_reference(target)
            }
            ExprKind::Comma { right, .. } => self.is_unique_reference(right),
            _ => false,
        }
    }

    /// Check that the range and size expressions inside `ty` are well formed.
    ///
    /// Bounds that cannot be computed are tolerated unless `in_record` is set,
    /// since record layouts must not depend on template parameters.
    pub fn check_type(&mut self, ty: &Type, in_record: bool, span: Span) {
        match &ty.kind {
            TypeKind::Int(Some(bounds)) | TypeKind::Scalar { bounds, .. } => {
                let mut lower = Expr::clone(&bounds.lower);
                let mut upper = Expr::clone(&bounds.upper);
                if !self.annotate_constant_integer(&mut lower)
                    || !self.annotate_constant_integer(&mut upper)
                {
                    return;
                }
                let interpreter = self.interpreter();
                let evaluated = interpreter.evaluate(&lower).map_err(|_| lower.span).and_then(
                    |low| {
                        interpreter
                            .evaluate(&upper)
                            .map(|high| (low, high))
                            .map_err(|_| upper.span)
                    },
                );
                match evaluated {
                    Ok((low, high)) if low > high => self.error(upper.span, "Invalid integer range"),
                    Ok(_) => {}
                    Err(at) if in_record => {
                        self.error(at, "Parameterised types not allowed in records");
                    }
                    Err(_) => {}
                }
            }
            TypeKind::Array { size, element } => {
                self.check_type(size, false, span);
                self.check_type(element, in_record, span);
                let at = size.bounds().map_or(span, |bounds| bounds.upper.span);
                if !size.is_scalar() {
                    self.error(at, "Invalid array size");
                    return;
                }
                let dimension = self.interpreter().evaluate_type_range(size);
                match dimension {
                    Ok(range) if range.is_empty() => self.error(at, "Invalid array size"),
                    Ok(_) => {}
                    Err(_) if in_record => {
                        self.error(at, "Parameterised types not allowed in records");
                    }
                    Err(_) => {}
                }
            }
            TypeKind::Record(fields) => {
                for (field, field_ty) in self.symbols.scope_types(*fields) {
                    let at = self.symbols.symbol(field).span;
                    self.check_type(&field_ty, true, at);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::IncrementOp;
    use crate::interpreter::Valuation;
    use crate::semantic::{Diagnostics, ScalarSetId, SymbolId, SymbolTable};
    use pretty_assertions::assert_eq;

    struct Fixture {
        symbols: SymbolTable,
        constants: Valuation,
        diagnostics: Diagnostics,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                symbols: SymbolTable::new(),
                constants: Valuation::new(),
                diagnostics: Diagnostics::new(),
            }
        }

        fn declare(&mut self, name: &str, ty: Type) -> SymbolId {
            let global = self.symbols.global();
            self.symbols
                .add_symbol(global, name, ty, DeclKind::Variable, Span::default())
        }

        fn annotate(&mut self, expr: &mut Expr) -> bool {
            TypeChecker::new(&mut self.symbols, &mut self.constants, &mut self.diagnostics)
                .annotate(expr)
        }

        fn check_type(&mut self, ty: &Type, in_record: bool) {
            TypeChecker::new(&mut self.symbols, &mut self.constants, &mut self.diagnostics)
                .check_type(ty, in_record, Span::default());
        }

        fn errors(&self) -> Vec<&str> {
            self.diagnostics.error_messages()
        }
    }

    fn int_range(lower: i32, upper: i32) -> Type {
        Type::ranged_int(Expr::constant(lower), Expr::constant(upper))
    }

    #[test]
    fn test_clock_comparison_asymmetry() {
        let mut fx = Fixture::new();
        let c = fx.declare("c", Type::clock());

        let mut invariant = Expr::binary(BinaryOp::Lt, Expr::ident(c), Expr::constant(5));
        assert!(fx.annotate(&mut invariant));
        assert_eq!(invariant.ty.base(), Base::Invariant);

        let mut guard = Expr::binary(BinaryOp::Lt, Expr::constant(5), Expr::ident(c));
        assert!(fx.annotate(&mut guard));
        assert_eq!(guard.ty.base(), Base::Guard);
        assert!(fx.errors().is_empty());
    }

    #[test]
    fn test_binary_non_int_table() {
        let clock = Type::clock();
        let int = Type::int();
        let diff = Type::from(TypeKind::Diff);
        let at = |l: &Type, op, r: &Type| type_of_binary_non_int(l, op, r).map(|t| t.base());

        assert_eq!(at(&clock, BinaryOp::Add, &int), Some(Base::Clock));
        assert_eq!(at(&int, BinaryOp::Sub, &clock), None);
        assert_eq!(at(&clock, BinaryOp::Sub, &clock), Some(Base::Diff));
        assert_eq!(at(&diff, BinaryOp::Le, &int), Some(Base::Invariant));
        assert_eq!(at(&clock, BinaryOp::Eq, &int), Some(Base::Guard));
        assert_eq!(at(&clock, BinaryOp::Ne, &int), Some(Base::Constraint));
        assert_eq!(at(&int, BinaryOp::Gt, &clock), Some(Base::Invariant));
        assert_eq!(
            at(&Type::from(TypeKind::Rate), BinaryOp::Eq, &int),
            Some(Base::InvariantWithRate)
        );
        assert_eq!(at(&clock, BinaryOp::Mul, &int), None);
    }

    #[test]
    fn test_conjunction_strength() {
        let invariant = Type::from(TypeKind::Invariant);
        let guard = Type::from(TypeKind::Guard);
        let with_rate = Type::from(TypeKind::InvariantWithRate);
        let constraint = Type::from(TypeKind::Constraint);
        let and = |l: &Type, r: &Type| type_of_binary_non_int(l, BinaryOp::And, r).map(|t| t.base());

        assert_eq!(and(&invariant, &Type::bool()), Some(Base::Invariant));
        assert_eq!(and(&invariant, &with_rate), Some(Base::InvariantWithRate));
        assert_eq!(and(&invariant, &guard), Some(Base::Guard));
        assert_eq!(and(&guard, &constraint), Some(Base::Constraint));
        assert_eq!(and(&with_rate, &guard), None);

        let or = |l: &Type, r: &Type| type_of_binary_non_int(l, BinaryOp::Or, r).map(|t| t.base());
        assert_eq!(or(&Type::bool(), &invariant), Some(Base::Invariant));
        assert_eq!(or(&invariant, &Type::bool()), Some(Base::Constraint));
    }

    #[test]
    fn test_values_and_failure_propagation() {
        let mut fx = Fixture::new();
        let c = fx.declare("c", Type::clock());
        let mut sum = Expr::binary(BinaryOp::Add, Expr::constant(1), Expr::boolean(true));
        assert!(fx.annotate(&mut sum));
        assert_eq!(sum.ty, Type::int());

        let mut nested = Expr::binary(
            BinaryOp::And,
            Expr::binary(BinaryOp::Mul, Expr::ident(c), Expr::constant(2)),
            Expr::boolean(true),
        );
        assert!(!fx.annotate(&mut nested));
        assert_eq!(nested.ty.base(), Base::Unknown);
        assert_eq!(fx.errors(), vec!["Invalid operands to binary operator"]);
    }

    #[test]
    fn test_unary_operators() {
        let mut fx = Fixture::new();
        let c = fx.declare("c", Type::clock());
        let cost = fx.declare("cost", Type::cost());

        let mut negated = Expr::unary(
            UnaryOp::Not,
            Expr::binary(BinaryOp::Lt, Expr::ident(c), Expr::constant(3)),
        );
        assert!(fx.annotate(&mut negated));
        assert_eq!(negated.ty.base(), Base::Constraint);

        let mut rate = Expr::unary(UnaryOp::Rate, Expr::ident(cost));
        assert!(fx.annotate(&mut rate));
        assert_eq!(rate.ty.base(), Base::Rate);

        let mut bad_rate = Expr::unary(UnaryOp::Rate, Expr::ident(c));
        assert!(!fx.annotate(&mut bad_rate));
        let mut bad_neg = Expr::unary(UnaryOp::Neg, Expr::ident(c));
        assert!(!fx.annotate(&mut bad_neg));
        assert_eq!(
            fx.errors(),
            vec![
                "Can only apply rate to cost variables",
                "Invalid operation for type"
            ]
        );
    }

    #[test]
    fn test_assignment_rules() {
        let mut fx = Fixture::new();
        let x = fx.declare("x", int_range(0, 5));
        let n = fx.declare("N", Type::int().with_prefix(Prefixes::CONSTANT));
        let c = fx.declare("c", Type::clock());
        let cost = fx.declare("cost", Type::cost());

        let mut ok = Expr::assign(AssignOp::Assign, Expr::ident(x), Expr::constant(3));
        assert!(fx.annotate(&mut ok));
        assert_eq!(ok.ty, int_range(0, 5));

        let mut reset = Expr::assign(AssignOp::Assign, Expr::ident(c), Expr::constant(0));
        assert!(fx.annotate(&mut reset));

        let mut constant = Expr::assign(AssignOp::Assign, Expr::ident(n), Expr::constant(3));
        assert!(!fx.annotate(&mut constant));

        let mut from_clock = Expr::assign(AssignOp::Assign, Expr::ident(x), Expr::ident(c));
        assert!(!fx.annotate(&mut from_clock));

        let mut accrue = Expr::assign(AssignOp::Add, Expr::ident(cost), Expr::constant(2));
        assert!(fx.annotate(&mut accrue));

        let mut scale = Expr::assign(AssignOp::Mul, Expr::ident(c), Expr::constant(2));
        assert!(!fx.annotate(&mut scale));

        assert_eq!(
            fx.errors(),
            vec![
                "Left hand side value expected",
                "Incompatible types",
                "Non-integer types must use regular assignment operator"
            ]
        );
    }

    #[test]
    fn test_add_assign_error_keeps_type() {
        let mut fx = Fixture::new();
        let c = fx.declare("c", Type::clock());
        let mut expr = Expr::assign(AssignOp::Add, Expr::ident(c), Expr::constant(1));
        assert!(fx.annotate(&mut expr));
        assert!(expr.ty.is_clock());
        assert_eq!(
            fx.errors(),
            vec!["Increment operator can only be used for integer and cost variables."]
        );
    }

    #[test]
    fn test_increment() {
        let mut fx = Fixture::new();
        let i = fx.declare("i", Type::int());
        let b = fx.declare("b", Type::bool());
        let mut inc = Expr::increment(IncrementOp::PostIncrement, Expr::ident(i));
        assert!(fx.annotate(&mut inc));
        assert_eq!(inc.ty, Type::int());
        let mut on_bool = Expr::increment(IncrementOp::PreIncrement, Expr::ident(b));
        assert!(!fx.annotate(&mut on_bool));
        let mut on_value = Expr::increment(IncrementOp::PreDecrement, Expr::constant(1));
        assert!(!fx.annotate(&mut on_value));
        assert_eq!(
            fx.errors(),
            vec!["Integer expected", "Left hand side value expected"]
        );
    }

    #[test]
    fn test_inline_if() {
        let mut fx = Fixture::new();
        let c = fx.declare("c", Type::clock());
        let mut ok = Expr::inline_if(Expr::boolean(true), Expr::constant(1), Expr::constant(2));
        assert!(fx.annotate(&mut ok));
        let mut mixed = Expr::inline_if(Expr::boolean(true), Expr::ident(c), Expr::constant(2));
        assert!(!fx.annotate(&mut mixed));
        let mut clock_condition =
            Expr::inline_if(Expr::ident(c), Expr::constant(1), Expr::constant(2));
        assert!(!fx.annotate(&mut clock_condition));
        assert_eq!(
            fx.errors(),
            vec![
                "Incompatible arguments to inline if",
                "First argument of inline if must be an integer"
            ]
        );
    }

    #[test]
    fn test_lhs_values() {
        let mut fx = Fixture::new();
        let a = fx.declare("a", Type::array_of(3, int_range(0, 5)));
        let b = fx.declare("b", Type::array_of(3, int_range(0, 5)));
        let w = fx.declare("w", int_range(0, 9));
        let i = fx.declare("i", Type::int());
        let n = fx.declare("N", Type::int().with_prefix(Prefixes::CONSTANT));
        let checker_input = |fx: &mut Fixture, mut expr: Expr| {
            assert!(fx.annotate(&mut expr));
            expr
        };

        let element = checker_input(&mut fx, Expr::index(Expr::ident(a), Expr::ident(i)));
        let same_range = checker_input(
            &mut fx,
            Expr::inline_if(
                Expr::boolean(true),
                Expr::index(Expr::ident(a), Expr::constant(0)),
                Expr::index(Expr::ident(b), Expr::constant(1)),
            ),
        );
        let other_range = checker_input(
            &mut fx,
            Expr::inline_if(
                Expr::boolean(true),
                Expr::index(Expr::ident(a), Expr::constant(0)),
                Expr::ident(w),
            ),
        );
        let pre = Expr::increment(IncrementOp::PreIncrement, Expr::ident(i));
        let post = Expr::increment(IncrementOp::PostIncrement, Expr::ident(i));

        let checker = TypeChecker::new(&mut fx.symbols, &mut fx.constants, &mut fx.diagnostics);
        assert!(checker.is_lhs_value(&element));
        assert!(checker.is_lhs_value(&same_range));
        assert!(!checker.is_lhs_value(&other_range));
        assert!(checker.is_lhs_value(&pre));
        assert!(!checker.is_lhs_value(&post));
        assert!(!checker.is_lhs_value(&Expr::ident(n)));
        assert!(checker.is_unique_reference(&Expr::index(Expr::ident(a), Expr::constant(1))));
        assert!(!checker.is_unique_reference(&same_range));
    }

    #[test]
    fn test_array_index_checks() {
        let mut fx = Fixture::new();
        let set = ScalarSetId(0);
        let a = fx.declare("a", Type::array_of(3, Type::int()));
        let s = fx.declare("s", Type::array(Type::scalar(set, 2), Type::bool()));
        let k = fx.declare("k", Type::scalar(set, 2));
        let other = fx.declare("o", Type::scalar(ScalarSetId(1), 2));

        let mut inside = Expr::index(Expr::ident(a), Expr::constant(2));
        assert!(fx.annotate(&mut inside));
        assert_eq!(inside.ty, Type::int());
        let mut outside = Expr::index(Expr::ident(a), Expr::constant(3));
        assert!(!fx.annotate(&mut outside));
        let mut by_scalar = Expr::index(Expr::ident(s), Expr::ident(k));
        assert!(fx.annotate(&mut by_scalar));
        let mut wrong_set = Expr::index(Expr::ident(s), Expr::ident(other));
        assert!(!fx.annotate(&mut wrong_set));
        let mut not_array = Expr::index(Expr::ident(k), Expr::constant(0));
        assert!(!fx.annotate(&mut not_array));
        assert_eq!(
            fx.errors(),
            vec!["Array index out of range", "Incompatible type", "Array expected"]
        );
    }

    #[test]
    fn test_scalar_index_needs_scalar_array() {
        let mut fx = Fixture::new();
        let set = ScalarSetId(0);
        let a = fx.declare("a", Type::array_of(3, Type::int()));
        let s = fx.declare("s", Type::array(Type::scalar(set, 3), Type::int()));
        let k = fx.declare("k", Type::scalar(set, 3));
        let i = fx.declare("i", int_range(0, 2));

        let mut int_array_by_scalar = Expr::index(Expr::ident(a), Expr::ident(k));
        assert!(!fx.annotate(&mut int_array_by_scalar));
        let mut scalar_array_by_int = Expr::index(Expr::ident(s), Expr::ident(i));
        assert!(!fx.annotate(&mut scalar_array_by_int));
        let mut scalar_array_by_constant = Expr::index(Expr::ident(s), Expr::constant(0));
        assert!(!fx.annotate(&mut scalar_array_by_constant));
        let mut int_array_by_int = Expr::index(Expr::ident(a), Expr::ident(i));
        assert!(fx.annotate(&mut int_array_by_int));
        assert_eq!(
            fx.errors(),
            vec!["Incompatible type", "Incompatible type", "Incompatible type"]
        );
    }

    #[test]
    fn test_comma_expression() {
        let mut fx = Fixture::new();
        let x = fx.declare("x", Type::int());
        let c = fx.declare("c", Type::clock());

        let mut updates = Expr::comma(
            Expr::assign(AssignOp::Assign, Expr::ident(x), Expr::constant(1)),
            Expr::assign(AssignOp::Assign, Expr::ident(c), Expr::constant(0)),
        );
        assert!(fx.annotate(&mut updates));
        assert_eq!(updates.ty, Type::clock());

        let mut with_guard = Expr::comma(
            Expr::binary(BinaryOp::Lt, Expr::ident(c), Expr::constant(2)),
            Expr::ident(x),
        );
        assert!(!fx.annotate(&mut with_guard));
        assert_eq!(fx.errors(), vec!["Incompatible type for comma expression"]);
    }

    #[test]
    fn test_scalar_equality() {
        let mut fx = Fixture::new();
        let k = fx.declare("k", Type::scalar(ScalarSetId(0), 2));
        let l = fx.declare("l", Type::scalar(ScalarSetId(0), 2));
        let m = fx.declare("m", Type::scalar(ScalarSetId(1), 2));
        let mut same = Expr::binary(BinaryOp::Eq, Expr::ident(k), Expr::ident(l));
        assert!(fx.annotate(&mut same));
        assert_eq!(same.ty, Type::bool());
        let mut other = Expr::binary(BinaryOp::Ne, Expr::ident(k), Expr::ident(m));
        assert!(!fx.annotate(&mut other));
        assert_eq!(
            fx.errors(),
            vec!["Scalars can only be compared to scalars of the same scalarset"]
        );
    }

    #[test]
    fn test_call_arity_and_result() {
        let mut fx = Fixture::new();
        let global = fx.symbols.global();
        let params = fx.symbols.new_scope(Some(global));
        fx.symbols
            .add_symbol(params, "p", Type::int(), DeclKind::Parameter, Span::default());
        let f = fx.declare("f", Type::function(params, Type::bool()));

        let mut call = Expr::call(Expr::ident(f), vec![Expr::constant(1)]);
        assert!(fx.annotate(&mut call));
        assert_eq!(call.ty, Type::bool());

        let mut few = Expr::call(Expr::ident(f), vec![]);
        fx.annotate(&mut few);
        let mut many = Expr::call(Expr::ident(f), vec![Expr::constant(1), Expr::constant(2)]);
        fx.annotate(&mut many);
        let mut not_function = Expr::call(Expr::constant(1), vec![]);
        assert!(!fx.annotate(&mut not_function));
        assert_eq!(
            fx.errors(),
            vec!["Too few arguments", "Too many arguments", "Function name expected"]
        );
    }

    #[test]
    fn test_member_access() {
        let mut fx = Fixture::new();
        let fields = fx.symbols.new_scope(None);
        fx.symbols
            .add_symbol(fields, "a", Type::bool(), DeclKind::Field, Span::default());
        let r = fx.declare("r", Type::record(fields));
        let x = fx.declare("x", Type::int());

        let mut ok = Expr::field(Expr::ident(r), "a");
        assert!(fx.annotate(&mut ok));
        assert_eq!(ok.ty, Type::bool());
        let mut missing = Expr::field(Expr::ident(r), "b");
        assert!(!fx.annotate(&mut missing));
        let mut not_record = Expr::field(Expr::ident(x), "a");
        assert!(!fx.annotate(&mut not_record));
        assert_eq!(
            fx.errors(),
            vec!["Unknown member", "Record or process expected"]
        );
    }

    #[test]
    fn test_forall_body() {
        let mut fx = Fixture::new();
        let c = fx.declare("c", Type::clock());
        let i = fx.declare("i", int_range(0, 3));
        let mut quantified = Expr::forall(
            i,
            Expr::binary(BinaryOp::Lt, Expr::ident(c), Expr::ident(i)),
        );
        assert!(fx.annotate(&mut quantified));
        assert_eq!(quantified.ty.base(), Base::Invariant);

        let mut over_clock = Expr::forall(i, Expr::ident(c));
        assert!(!fx.annotate(&mut over_clock));
        assert_eq!(fx.errors(), vec!["Boolean expected"]);
    }

    #[test]
    fn test_check_type_ranges() {
        let mut fx = Fixture::new();
        let x = fx.declare("x", Type::int());
        let p = fx.declare("P", Type::int().with_prefix(Prefixes::CONSTANT));

        fx.check_type(&int_range(0, 5), false);
        assert!(fx.errors().is_empty());

        fx.check_type(&int_range(5, 0), false);
        fx.check_type(&Type::ranged_int(Expr::constant(0), Expr::ident(x)), false);
        fx.check_type(&Type::ranged_int(Expr::constant(0), Expr::boolean(true)), false);
        assert_eq!(
            fx.errors(),
            vec!["Invalid integer range", "Integer expression expected"]
        );

        // Parameterised bounds are only an error inside records
        let parameterised = Type::ranged_int(Expr::constant(0), Expr::ident(p));
        fx.check_type(&parameterised, false);
        assert_eq!(fx.errors().len(), 2);
        fx.check_type(&parameterised, true);
        assert_eq!(
            fx.errors().last().copied(),
            Some("Parameterised types not allowed in records")
        );
    }

    #[test]
    fn test_check_type_arrays_and_records() {
        let mut fx = Fixture::new();
        let p = fx.declare("P", Type::int().with_prefix(Prefixes::CONSTANT));

        fx.check_type(&Type::array(Type::bool(), Type::int()), false);
        fx.check_type(&Type::array(int_range(3, 1), Type::int()), false);
        assert_eq!(
            fx.errors(),
            vec![
                "Invalid array size",
                "Invalid integer range",
                "Invalid array size"
            ]
        );

        let fields = fx.symbols.new_scope(None);
        fx.symbols.add_symbol(
            fields,
            "a",
            Type::array(Type::ranged_int(Expr::constant(0), Expr::ident(p)), Type::int()),
            DeclKind::Field,
            Span::default(),
        );
        fx.check_type(&Type::record(fields), false);
        assert_eq!(
            fx.errors().last().copied(),
            Some("Parameterised types not allowed in records")
        );
    }
}
