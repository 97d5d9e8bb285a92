//! Function body statements

use super::decl::Variable;
use super::Expr;
use crate::semantic::{ScopeId, SymbolId};

/// A block with its own scope of local variables
#[derive(Debug, Clone)]
pub struct Block {
    /// Scope holding the local variables
    pub scope: ScopeId,
    /// Local variable declarations, in order
    pub variables: Vec<Variable>,
    /// Statements
    pub statements: Vec<Statement>,
}

impl Block {
    /// Create a block
    #[must_use]
    pub fn new(scope: ScopeId, variables: Vec<Variable>, statements: Vec<Statement>) -> Self {
        Self {
            scope,
            variables,
            statements,
        }
    }
}

/// A statement
#[derive(Debug, Clone)]
pub enum Statement {
    /// `;`
    Empty,
    /// `e;`
    Expr(Expr),
    /// `for (init; cond; step) body`
    For {
        /// Initialisation
        init: Expr,
        /// Loop condition
        condition: Expr,
        /// Step
        step: Expr,
        /// Loop body
        body: Box<Statement>,
    },
    /// `for (i : T) body`
    Iteration {
        /// Iteration variable
        symbol: SymbolId,
        /// Loop body
        body: Box<Statement>,
    },
    /// `while (cond) body`
    While {
        /// Loop condition
        condition: Expr,
        /// Loop body
        body: Box<Statement>,
    },
    /// `do body while (cond);`
    DoWhile {
        /// Loop body
        body: Box<Statement>,
        /// Loop condition
        condition: Expr,
    },
    /// `{ ... }`
    Block(Block),
    /// `if (cond) then else other`
    If {
        /// Condition
        condition: Expr,
        /// Taken branch
        then_branch: Box<Statement>,
        /// Optional other branch
        else_branch: Option<Box<Statement>>,
    },
    /// `switch (cond) { ... }`
    Switch {
        /// Switched expression
        condition: Expr,
        /// Cases
        block: Block,
    },
    /// `case e: ...`
    Case {
        /// Case label
        label: Expr,
        /// Case statements
        block: Block,
    },
    /// `default: ...`
    Default(Block),
    /// `break;`
    Break,
    /// `continue;`
    Continue,
    /// `return e;`
    Return(Option<Expr>),
}
