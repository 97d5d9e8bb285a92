//! Constant-expression interpreter
//!
//! Evaluates expressions under an explicit [`Valuation`] of constants. An
//! evaluation that needs runtime state fails with an [`EvalError`]; callers
//! treat that as "not computable at check time" and fall back to weaker
//! static checks, never as a diagnostic.

mod value;

pub use value::Value;

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::semantic::{Bounds, Range, SymbolId, SymbolTable, Type, TypeKind};
use indexmap::IndexMap;
use smol_str::SmolStr;
use thiserror::Error;

/// Compile-time values of symbols: constant initialisers or instance arguments
pub type Valuation = IndexMap<SymbolId, Expr>;

/// Nesting limit for symbol substitution
const MAX_DEPTH: usize = 256;

/// Why an expression could not be evaluated at check time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A symbol without compile-time value was read
    #[error("symbol {0:?} has no compile-time value")]
    NotConstant(SymbolId),
    /// A construct that only has a runtime meaning
    #[error("{0} cannot be evaluated at check time")]
    Unsupported(&'static str),
    /// Arithmetic overflow
    #[error("arithmetic overflow")]
    Overflow,
    /// Division or remainder by zero
    #[error("division by zero")]
    DivisionByZero,
    /// Array access outside the array
    #[error("index {0} out of range")]
    IndexOutOfRange(i32),
    /// Member access to a missing field
    #[error("unknown member `{0}`")]
    UnknownMember(SmolStr),
    /// A list where a single integer was needed
    #[error("expected a single value")]
    NotScalar,
    /// A type without declared range
    #[error("type has no declared range")]
    Unbounded,
    /// Substitution did not terminate
    #[error("evaluation nested too deeply")]
    TooDeep,
}

/// Result of an evaluation
pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluator over layered valuations; later layers shadow earlier ones
#[derive(Debug, Clone)]
pub struct Interpreter<'a> {
    symbols: &'a SymbolTable,
    layers: Vec<&'a Valuation>,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter over a valuation
    #[must_use]
    pub fn new(symbols: &'a SymbolTable, valuation: &'a Valuation) -> Self {
        Self {
            symbols,
            layers: vec![valuation],
        }
    }

    /// Derive an interpreter that additionally knows `extra`
    #[must_use]
    pub fn with_valuation(&self, extra: &'a Valuation) -> Self {
        let mut layers = self.layers.clone();
        layers.push(extra);
        Self {
            symbols: self.symbols,
            layers,
        }
    }

    /// Evaluate to a single integer
    ///
    /// # Errors
    ///
    /// Fails if the expression depends on runtime state, uses a runtime-only
    /// operator, overflows, or denotes a list.
    pub fn evaluate(&self, expr: &Expr) -> EvalResult<i32> {
        self.value(expr)?.as_int()
    }

    /// Evaluate to a value, possibly a list
    ///
    /// # Errors
    ///
    /// See [`Interpreter::evaluate`].
    pub fn value(&self, expr: &Expr) -> EvalResult<Value> {
        self.eval(expr, 0)
    }

    /// Evaluate both bounds of a range; fails if either fails
    ///
    /// # Errors
    ///
    /// See [`Interpreter::evaluate`].
    pub fn evaluate_range(&self, lower: &Expr, upper: &Expr) -> EvalResult<Range> {
        let lower = self.evaluate(lower)?;
        let upper = self.evaluate(upper)?;
        Ok(Range::new(lower, upper))
    }

    /// Evaluate declared bounds
    ///
    /// # Errors
    ///
    /// See [`Interpreter::evaluate`].
    pub fn evaluate_bounds(&self, bounds: &Bounds) -> EvalResult<Range> {
        self.evaluate_range(&bounds.lower, &bounds.upper)
    }

    /// Evaluate the declared range of an integer or scalar type
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Unbounded`] for types without declared range.
    pub fn evaluate_type_range(&self, ty: &Type) -> EvalResult<Range> {
        let bounds = ty.bounds().ok_or(EvalError::Unbounded)?;
        self.evaluate_bounds(bounds)
    }

    /// Evaluate to every integer contained in the value
    ///
    /// # Errors
    ///
    /// See [`Interpreter::evaluate`].
    pub fn evaluate_all(&self, expr: &Expr) -> EvalResult<Vec<i32>> {
        let mut out = Vec::new();
        self.value(expr)?.flatten_into(&mut out);
        Ok(out)
    }

    fn lookup(&self, symbol: SymbolId) -> Option<&'a Expr> {
        self.layers.iter().rev().find_map(|layer| layer.get(&symbol))
    }

    fn eval(&self, expr: &Expr, depth: usize) -> EvalResult<Value> {
        if depth > MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        match &expr.kind {
            ExprKind::Constant(value) => Ok(Value::Int(*value)),
            ExprKind::Boolean(value) => Ok(Value::from_bool(*value)),
            ExprKind::Identifier(symbol) => {
                let definition = self.lookup(*symbol).ok_or(EvalError::NotConstant(*symbol))?;
                self.eval(definition, depth + 1)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand, depth + 1)?.as_int()?;
                match op {
                    UnaryOp::Neg => value.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
                    UnaryOp::Not => Ok(Value::from_bool(value == 0)),
                    UnaryOp::Rate => Err(EvalError::Unsupported("rate")),
                }
            }
            ExprKind::Binary { op, left, right } => {
                let lhs = self.eval(left, depth + 1)?;
                let rhs = self.eval(right, depth + 1)?;
                Self::eval_binary(*op, &lhs, &rhs)
            }
            ExprKind::InlineIf {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval(condition, depth + 1)?.as_int()? != 0 {
                    self.eval(then_branch, depth + 1)
                } else {
                    self.eval(else_branch, depth + 1)
                }
            }
            ExprKind::Comma { left, right } => {
                self.eval(left, depth + 1)?;
                self.eval(right, depth + 1)
            }
            ExprKind::Index { base, index } => {
                let Value::List(values) = self.eval(base, depth + 1)? else {
                    return Err(EvalError::NotScalar);
                };
                let index = self.eval(index, depth + 1)?.as_int()?;
                let offset = index
                    .checked_sub(self.array_lower(base, depth)?)
                    .ok_or(EvalError::Overflow)?;
                usize::try_from(offset)
                    .ok()
                    .and_then(|offset| values.get(offset).cloned())
                    .ok_or(EvalError::IndexOutOfRange(index))
            }
            ExprKind::Field { base, name } => {
                let fields = self
                    .static_type(base)
                    .record_fields()
                    .ok_or(EvalError::Unsupported("member access"))?;
                let position = self
                    .symbols
                    .index_of(fields, name)
                    .ok_or_else(|| EvalError::UnknownMember(name.clone()))?;
                let Value::List(values) = self.eval(base, depth + 1)? else {
                    return Err(EvalError::NotScalar);
                };
                values
                    .get(position)
                    .cloned()
                    .ok_or_else(|| EvalError::UnknownMember(name.clone()))
            }
            ExprKind::List(items) => items
                .iter()
                .map(|item| self.eval(&item.value, depth + 1))
                .collect::<EvalResult<Vec<_>>>()
                .map(Value::List),
            ExprKind::Assign { .. } | ExprKind::Increment { .. } => {
                Err(EvalError::Unsupported("assignment"))
            }
            ExprKind::Call { .. } => Err(EvalError::Unsupported("function call")),
            ExprKind::Forall { .. } => Err(EvalError::Unsupported("quantifier")),
        }
    }

    /// Declared type of an expression, falling back to the symbol for
    /// identifiers that were never annotated
    fn static_type<'e>(&'e self, expr: &'e Expr) -> &'e Type {
        match (&expr.ty.kind, &expr.kind) {
            (TypeKind::Unknown, ExprKind::Identifier(symbol)) => self.symbols.type_of(*symbol),
            _ => &expr.ty,
        }
    }

    fn array_lower(&self, base: &Expr, depth: usize) -> EvalResult<i32> {
        match self.static_type(base).array_parts().and_then(|(size, _)| size.bounds()) {
            Some(bounds) => self.eval(&bounds.lower, depth + 1)?.as_int(),
            None => Ok(0),
        }
    }

    fn eval_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult<Value> {
        match op {
            BinaryOp::Eq => return Ok(Value::from_bool(lhs == rhs)),
            BinaryOp::Ne => return Ok(Value::from_bool(lhs != rhs)),
            _ => {}
        }
        let (a, b) = (lhs.as_int()?, rhs.as_int()?);
        let value = match op {
            BinaryOp::Add => a.checked_add(b).ok_or(EvalError::Overflow)?,
            BinaryOp::Sub => a.checked_sub(b).ok_or(EvalError::Overflow)?,
            BinaryOp::Mul => a.checked_mul(b).ok_or(EvalError::Overflow)?,
            BinaryOp::Div | BinaryOp::Mod if b == 0 => return Err(EvalError::DivisionByZero),
            BinaryOp::Div => a.checked_div(b).ok_or(EvalError::Overflow)?,
            BinaryOp::Mod => a.checked_rem(b).ok_or(EvalError::Overflow)?,
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            BinaryOp::BitXor => a ^ b,
            BinaryOp::Shl => u32::try_from(b)
                .ok()
                .and_then(|shift| a.checked_shl(shift))
                .ok_or(EvalError::Overflow)?,
            BinaryOp::Shr => u32::try_from(b)
                .ok()
                .and_then(|shift| a.checked_shr(shift))
                .ok_or(EvalError::Overflow)?,
            BinaryOp::Min => a.min(b),
            BinaryOp::Max => a.max(b),
            BinaryOp::Lt => i32::from(a < b),
            BinaryOp::Le => i32::from(a <= b),
            BinaryOp::Ge => i32::from(a >= b),
            BinaryOp::Gt => i32::from(a > b),
            BinaryOp::And => i32::from(a != 0 && b != 0),
            BinaryOp::Or => i32::from(a != 0 || b != 0),
            BinaryOp::Eq => i32::from(a == b),
            BinaryOp::Ne => i32::from(a != b),
        };
        Ok(Value::Int(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AssignOp, ListItem};
    use crate::semantic::DeclKind;
    use crate::Span;
    use pretty_assertions::assert_eq;

    fn constant(symbols: &mut SymbolTable, name: &str, ty: Type) -> SymbolId {
        let global = symbols.global();
        symbols.add_symbol(global, name, ty, DeclKind::Variable, Span::default())
    }

    #[test]
    fn test_arithmetic_and_comparison() {
        let symbols = SymbolTable::new();
        let valuation = Valuation::new();
        let interpreter = Interpreter::new(&symbols, &valuation);
        let expr = Expr::binary(
            BinaryOp::Mul,
            Expr::binary(BinaryOp::Add, Expr::constant(2), Expr::constant(3)),
            Expr::constant(4),
        );
        assert_eq!(interpreter.evaluate(&expr), Ok(20));
        let cmp = Expr::binary(BinaryOp::Le, Expr::constant(5), Expr::constant(4));
        assert_eq!(interpreter.evaluate(&cmp), Ok(0));
        let max = Expr::binary(BinaryOp::Max, Expr::constant(5), Expr::constant(9));
        assert_eq!(interpreter.evaluate(&max), Ok(9));
    }

    #[test]
    fn test_symbols_resolve_through_valuation() {
        let mut symbols = SymbolTable::new();
        let n = constant(&mut symbols, "N", Type::int());
        let m = constant(&mut symbols, "M", Type::int());
        let mut valuation = Valuation::new();
        valuation.insert(n, Expr::constant(4));
        valuation.insert(
            m,
            Expr::binary(BinaryOp::Sub, Expr::ident(n), Expr::constant(1)),
        );
        let interpreter = Interpreter::new(&symbols, &valuation);
        assert_eq!(interpreter.evaluate(&Expr::ident(m)), Ok(3));
        assert_eq!(
            interpreter.evaluate_range(&Expr::constant(0), &Expr::ident(m)),
            Ok(Range::new(0, 3))
        );
    }

    #[test]
    fn test_missing_symbol_is_not_constant() {
        let mut symbols = SymbolTable::new();
        let x = constant(&mut symbols, "x", Type::int());
        let valuation = Valuation::new();
        let interpreter = Interpreter::new(&symbols, &valuation);
        let expr = Expr::binary(BinaryOp::Add, Expr::ident(x), Expr::constant(1));
        assert_eq!(interpreter.evaluate(&expr), Err(EvalError::NotConstant(x)));
    }

    #[test]
    fn test_runtime_operators_fail() {
        let mut symbols = SymbolTable::new();
        let x = constant(&mut symbols, "x", Type::int());
        let mut valuation = Valuation::new();
        valuation.insert(x, Expr::constant(1));
        let interpreter = Interpreter::new(&symbols, &valuation);
        let assign = Expr::assign(AssignOp::Assign, Expr::ident(x), Expr::constant(2));
        assert_eq!(
            interpreter.evaluate(&assign),
            Err(EvalError::Unsupported("assignment"))
        );
        let div = Expr::binary(BinaryOp::Div, Expr::constant(1), Expr::constant(0));
        assert_eq!(interpreter.evaluate(&div), Err(EvalError::DivisionByZero));
        let overflow = Expr::binary(BinaryOp::Add, Expr::constant(i32::MAX), Expr::constant(1));
        assert_eq!(interpreter.evaluate(&overflow), Err(EvalError::Overflow));
    }

    #[test]
    fn test_derived_valuation_shadows() {
        let mut symbols = SymbolTable::new();
        let p = constant(&mut symbols, "p", Type::int());
        let base = Valuation::new();
        let mut arguments = Valuation::new();
        arguments.insert(p, Expr::constant(7));
        let interpreter = Interpreter::new(&symbols, &base);
        assert!(interpreter.evaluate(&Expr::ident(p)).is_err());
        let derived = interpreter.with_valuation(&arguments);
        assert_eq!(derived.evaluate(&Expr::ident(p)), Ok(7));
    }

    #[test]
    fn test_array_index_and_evaluate_all() {
        let mut symbols = SymbolTable::new();
        let table = constant(&mut symbols, "t", Type::array_of(3, Type::int()));
        let mut valuation = Valuation::new();
        valuation.insert(
            table,
            Expr::positional_list(vec![Expr::constant(4), Expr::constant(9), Expr::constant(2)]),
        );
        let interpreter = Interpreter::new(&symbols, &valuation);
        let access = Expr::index(Expr::ident(table), Expr::constant(1));
        assert_eq!(interpreter.evaluate(&access), Ok(9));
        let outside = Expr::index(Expr::ident(table), Expr::constant(3));
        assert_eq!(interpreter.evaluate(&outside), Err(EvalError::IndexOutOfRange(3)));
        assert_eq!(interpreter.evaluate_all(&Expr::ident(table)), Ok(vec![4, 9, 2]));
        assert_eq!(interpreter.evaluate(&Expr::ident(table)), Err(EvalError::NotScalar));
    }

    #[test]
    fn test_record_member() {
        let mut symbols = SymbolTable::new();
        let fields = symbols.new_scope(None);
        symbols.add_symbol(fields, "a", Type::int(), DeclKind::Field, Span::default());
        symbols.add_symbol(fields, "b", Type::int(), DeclKind::Field, Span::default());
        let r = constant(&mut symbols, "r", Type::record(fields));
        let mut valuation = Valuation::new();
        valuation.insert(
            r,
            Expr::list(vec![
                ListItem::named("a", Expr::constant(1)),
                ListItem::named("b", Expr::constant(2)),
            ]),
        );
        let interpreter = Interpreter::new(&symbols, &valuation);
        assert_eq!(interpreter.evaluate(&Expr::field(Expr::ident(r), "b")), Ok(2));
        assert_eq!(
            interpreter.evaluate(&Expr::field(Expr::ident(r), "c")),
            Err(EvalError::UnknownMember("c".into()))
        );
    }

    #[test]
    fn test_self_reference_terminates() {
        let mut symbols = SymbolTable::new();
        let n = constant(&mut symbols, "N", Type::int());
        let mut valuation = Valuation::new();
        valuation.insert(n, Expr::ident(n));
        let interpreter = Interpreter::new(&symbols, &valuation);
        assert_eq!(interpreter.evaluate(&Expr::ident(n)), Err(EvalError::TooDeep));
    }

    #[test]
    fn test_type_range() {
        let symbols = SymbolTable::new();
        let valuation = Valuation::new();
        let interpreter = Interpreter::new(&symbols, &valuation);
        let ty = Type::ranged_int(Expr::constant(0), Expr::constant(5));
        assert_eq!(interpreter.evaluate_type_range(&ty), Ok(Range::new(0, 5)));
        assert_eq!(
            interpreter.evaluate_type_range(&Type::int()),
            Err(EvalError::Unbounded)
        );
    }
}
