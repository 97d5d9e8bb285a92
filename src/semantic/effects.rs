//! Read and write sets of expressions and function bodies
//!
//! A function's [`FunctionEffects`] summarise the non-local symbols its body
//! may assign and read, so that callers can decide side-effect freedom and
//! constness of a call without re-traversing the body.

use super::scope::{ScopeId, SymbolId, SymbolTable};
use super::types::{Prefixes, TypeKind};
use crate::ast::{Block, Expr, ExprKind, Function, Statement};
use indexmap::{IndexMap, IndexSet};

/// Effect summary of a function body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionEffects {
    /// Non-local symbols the function may assign
    pub changes: IndexSet<SymbolId>,
    /// Non-local symbols the function reads
    pub depends: IndexSet<SymbolId>,
}

impl FunctionEffects {
    /// Effects recorded on a checked function declaration
    #[must_use]
    pub fn of(function: &Function) -> Self {
        Self {
            changes: function.changes.clone(),
            depends: function.depends.clone(),
        }
    }
}

/// Function symbol to its effect summary
pub type EffectTable = IndexMap<SymbolId, FunctionEffects>;

/// Computes read and write sets over annotated or unannotated trees
#[derive(Debug, Clone, Copy)]
pub struct EffectCollector<'a> {
    symbols: &'a SymbolTable,
    functions: &'a EffectTable,
}

impl<'a> EffectCollector<'a> {
    /// Create a collector that knows the summaries in `functions`
    #[must_use]
    pub fn new(symbols: &'a SymbolTable, functions: &'a EffectTable) -> Self {
        Self { symbols, functions }
    }

    /// Symbols `expr` may assign
    #[must_use]
    pub fn writes(&self, expr: &Expr) -> IndexSet<SymbolId> {
        let mut out = IndexSet::new();
        self.collect_writes(expr, &mut out);
        out
    }

    /// Symbols `expr` reads
    #[must_use]
    pub fn reads(&self, expr: &Expr) -> IndexSet<SymbolId> {
        let mut out = IndexSet::new();
        self.collect_reads(expr, &mut out);
        out
    }

    /// Effect summary of a function body, excluding its parameters and locals
    #[must_use]
    pub fn function_effects(&self, parameters: ScopeId, body: &Block) -> FunctionEffects {
        let mut locals: IndexSet<SymbolId> =
            self.symbols.scope(parameters).symbols().iter().copied().collect();
        let mut effects = FunctionEffects::default();
        self.block_effects(body, &mut locals, &mut effects);
        effects.changes.retain(|symbol| !locals.contains(symbol));
        effects.depends.retain(|symbol| !locals.contains(symbol));
        effects
    }

    fn block_effects(
        &self,
        block: &Block,
        locals: &mut IndexSet<SymbolId>,
        effects: &mut FunctionEffects,
    ) {
        locals.extend(self.symbols.scope(block.scope).symbols().iter().copied());
        for variable in &block.variables {
            locals.insert(variable.symbol);
            if let Some(init) = &variable.initialiser {
                self.expr_effects(init, effects);
            }
        }
        for statement in &block.statements {
            self.statement_effects(statement, locals, effects);
        }
    }

    fn statement_effects(
        &self,
        statement: &Statement,
        locals: &mut IndexSet<SymbolId>,
        effects: &mut FunctionEffects,
    ) {
        match statement {
            Statement::Empty | Statement::Break | Statement::Continue => {}
            Statement::Expr(expr) | Statement::Return(Some(expr)) => {
                self.expr_effects(expr, effects);
            }
            Statement::Return(None) => {}
            Statement::For {
                init,
                condition,
                step,
                body,
            } => {
                self.expr_effects(init, effects);
                self.expr_effects(condition, effects);
                self.expr_effects(step, effects);
                self.statement_effects(body, locals, effects);
            }
            Statement::Iteration { symbol, body } => {
                locals.insert(*symbol);
                self.statement_effects(body, locals, effects);
            }
            Statement::While { condition, body } | Statement::DoWhile { body, condition } => {
                self.expr_effects(condition, effects);
                self.statement_effects(body, locals, effects);
            }
            Statement::Block(block) | Statement::Default(block) => {
                self.block_effects(block, locals, effects);
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expr_effects(condition, effects);
                self.statement_effects(then_branch, locals, effects);
                if let Some(else_branch) = else_branch {
                    self.statement_effects(else_branch, locals, effects);
                }
            }
            Statement::Switch {
                condition: expr,
                block,
            }
            | Statement::Case { label: expr, block } => {
                self.expr_effects(expr, effects);
                self.block_effects(block, locals, effects);
            }
        }
    }

    fn expr_effects(&self, expr: &Expr, effects: &mut FunctionEffects) {
        self.collect_writes(expr, &mut effects.changes);
        self.collect_reads(expr, &mut effects.depends);
    }

    fn collect_writes(&self, expr: &Expr, out: &mut IndexSet<SymbolId>) {
        match &expr.kind {
            ExprKind::Assign { target, .. } | ExprKind::Increment { target, .. } => {
                assigned_roots(target, out);
            }
            ExprKind::Call { callee, args } => {
                if let ExprKind::Identifier(function) = callee.kind {
                    if let Some(effects) = self.functions.get(&function) {
                        out.extend(effects.changes.iter().copied());
                    }
                    self.reference_arguments(function, args, out);
                }
            }
            _ => {}
        }
        expr.for_each_child(|child| self.collect_writes(child, out));
    }

    /// Arguments bound to non-constant reference parameters are assigned by the call
    fn reference_arguments(&self, function: SymbolId, args: &[Expr], out: &mut IndexSet<SymbolId>) {
        let TypeKind::Function { parameters, .. } = self.symbols.type_of(function).kind else {
            return;
        };
        for (i, arg) in args.iter().enumerate() {
            let Some(parameter) = self.symbols.get(parameters, i) else {
                break;
            };
            let ty = self.symbols.type_of(parameter);
            if ty.has_prefix(Prefixes::REFERENCE) && !ty.has_prefix(Prefixes::CONSTANT) {
                assigned_roots(arg, out);
            }
        }
    }

    fn collect_reads(&self, expr: &Expr, out: &mut IndexSet<SymbolId>) {
        match &expr.kind {
            ExprKind::Identifier(symbol) => {
                out.insert(*symbol);
            }
            ExprKind::Call { callee, args } => {
                if let ExprKind::Identifier(function) = callee.kind {
                    if let Some(effects) = self.functions.get(&function) {
                        out.extend(effects.depends.iter().copied());
                    }
                } else {
                    self.collect_reads(callee, out);
                }
                for arg in args {
                    self.collect_reads(arg, out);
                }
                return;
            }
            _ => {}
        }
        expr.for_each_child(|child| self.collect_reads(child, out));
    }
}

/// Symbols whose storage an assignment to `target` may modify
fn assigned_roots(target: &Expr, out: &mut IndexSet<SymbolId>) {
    match &target.kind {
        ExprKind::Identifier(symbol) => {
            out.insert(*symbol);
        }
        ExprKind::Index { base, .. } | ExprKind::Field { base, .. } => assigned_roots(base, out),
        ExprKind::Assign { target, .. } | ExprKind::Increment { target, .. } => {
            assigned_roots(target, out);
        }
        ExprKind::Comma { right, .. } => assigned_roots(right, out),
        ExprKind::InlineIf {
            then_branch,
            else_branch,
            ..
        } => {
            assigned_roots(then_branch, out);
            assigned_roots(else_branch, out);
        }
        _ => {}
    }
}
