//! Function bodies

use super::compat::assignment_compatible;
use super::types::TypeKind;
use super::{Type, TypeChecker};
use crate::ast::{Block, Expr, Function, Statement};
use tracing::debug;

impl TypeChecker<'_> {
    /// Check parameter types and the body of a function, then record its
    /// effect summary on the declaration and for later callers
    pub(super) fn check_function(&mut self, function: &mut Function) {
        let signature = self.symbols.symbol(function.symbol);
        let span = signature.span;
        let result = match &signature.ty.kind {
            TypeKind::Function { result, .. } => Type::clone(result),
            _ => Type::void(),
        };

        for (parameter, ty) in self.symbols.scope_types(function.parameters) {
            let at = self.symbols.symbol(parameter).span;
            self.check_type(&ty, false, at);
        }
        self.check_type(&result, false, span);
        self.check_block(&mut function.body, &result);

        let effects = self
            .effects()
            .function_effects(function.parameters, &function.body);
        debug!(
            function = %self.symbols.symbol(function.symbol).name,
            changes = effects.changes.len(),
            depends = effects.depends.len(),
            "function effects"
        );
        function.changes.clone_from(&effects.changes);
        function.depends.clone_from(&effects.depends);
        self.functions.insert(function.symbol, effects);
    }

    fn check_block(&mut self, block: &mut Block, result: &Type) {
        for variable in &mut block.variables {
            let symbol = self.symbols.symbol(variable.symbol);
            let (ty, span) = (symbol.ty.clone(), symbol.span);
            self.check_type(&ty, false, span);
            if let Some(init) = variable.initialiser.as_mut() {
                if self.annotate(init) {
                    self.apply_initialiser(&ty, init);
                }
            }
        }
        for statement in &mut block.statements {
            self.check_statement(statement, result);
        }
    }

    fn check_statement(&mut self, statement: &mut Statement, result: &Type) {
        match statement {
            Statement::Empty | Statement::Break | Statement::Continue => {}
            Statement::Expr(expr) => self.check_effect_expression(expr),
            Statement::For {
                init,
                condition,
                step,
                body,
            } => {
                self.check_effect_expression(init);
                self.check_condition(condition);
                self.check_effect_expression(step);
                self.check_statement(body, result);
            }
            Statement::Iteration { symbol, body } => {
                let bound = self.symbols.symbol(*symbol);
                let (ty, span) = (bound.ty.clone(), bound.span);
                self.check_type(&ty, false, span);
                self.check_statement(body, result);
            }
            Statement::While { condition, body } | Statement::DoWhile { body, condition } => {
                self.check_condition(condition);
                self.check_statement(body, result);
            }
            Statement::Block(block) | Statement::Default(block) => self.check_block(block, result),
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition);
                self.check_statement(then_branch, result);
                if let Some(else_branch) = else_branch {
                    self.check_statement(else_branch, result);
                }
            }
            Statement::Switch {
                condition: expr,
                block,
            }
            | Statement::Case { label: expr, block } => {
                self.annotate(expr);
                self.check_block(block, result);
            }
            Statement::Return(Some(value)) => {
                if self.annotate(value) && !assignment_compatible(result, &value.ty) {
                    self.error(value.span, "Incompatible return type");
                }
            }
            Statement::Return(None) => {}
        }
    }

    /// Expression statements, loop initialisers and steps
    fn check_effect_expression(&mut self, expr: &mut Expr) {
        if self.annotate(expr) {
            let ty = &expr.ty;
            if !(ty.is_value() || ty.is_clock() || ty.is_record() || ty.is_void() || ty.is_scalar()) {
                self.error(expr.span, "Invalid expression in function");
            }
        }
    }

    fn check_condition(&mut self, expr: &mut Expr) {
        if self.annotate(expr) && !expr.ty.is_value() {
            self.error(expr.span, "Boolean expected");
        }
    }
}
