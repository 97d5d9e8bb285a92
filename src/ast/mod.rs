//! Declaration tree of a timed-automata model
//!
//! The parser produces this tree with every expression typed as unknown.
//! The checker annotates it in place: every expression receives a type,
//! initialisers are normalised, location invariants are split into a pure
//! invariant and a cost rate, and function effect sets are filled in.

mod decl;
mod expr;
mod stmt;

pub use decl::{
    Declaration, Edge, Function, Instance, PathQuantifier, ProgressMeasure, Property, State, Sync,
    SyncDirection, Template, Variable,
};
pub use expr::{AssignOp, BinaryOp, Expr, ExprKind, IncrementOp, ListItem, UnaryOp};
pub use stmt::{Block, Statement};

use crate::interpreter::Valuation;
use crate::semantic::{ScopeId, SymbolTable};

/// A complete model
#[derive(Debug)]
pub struct System {
    /// All scopes and symbols
    pub symbols: SymbolTable,
    /// Global declarations, in source order
    pub declarations: Vec<Declaration>,
    /// Properties to verify
    pub properties: Vec<Property>,
    /// Expression evaluated before every update
    pub before_update: Option<Expr>,
    /// Expression evaluated after every update
    pub after_update: Option<Expr>,
    /// Values of constants, filled in declaration order by the checker
    pub constants: Valuation,
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

impl System {
    /// Create an empty model
    #[must_use]
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            declarations: Vec::new(),
            properties: Vec::new(),
            before_update: None,
            after_update: None,
            constants: Valuation::new(),
        }
    }

    /// The global scope
    #[must_use]
    pub fn global(&self) -> ScopeId {
        self.symbols.global()
    }

    /// Global and template-level functions
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        fn collect<'a>(declarations: &'a [Declaration], out: &mut Vec<&'a Function>) {
            for declaration in declarations {
                match declaration {
                    Declaration::Function(function) => out.push(function),
                    Declaration::Template(template) => collect(&template.declarations, out),
                    _ => {}
                }
            }
        }
        let mut functions = Vec::new();
        collect(&self.declarations, &mut functions);
        functions.into_iter()
    }
}
