//! Persistent variable analysis
//!
//! Collects, once per model, the symbols that denote mutable runtime state.
//! An expression reading one of them is not computable at check time; an
//! expression assigning one of them has a side effect on the model.

use super::effects::EffectCollector;
use super::scope::{SymbolId, SymbolTable};
use super::types::Prefixes;
use crate::ast::{Declaration, Expr, System};
use indexmap::IndexSet;

/// The set of symbols holding runtime state
#[derive(Debug, Clone, Default)]
pub struct PersistentVariables {
    variables: IndexSet<SymbolId>,
}

impl PersistentVariables {
    /// Collect every non-constant variable and every reference or
    /// non-constant template parameter of the model
    #[must_use]
    pub fn collect(system: &System) -> Self {
        let mut persistent = Self::default();
        persistent.visit_declarations(&system.symbols, &system.declarations);
        persistent
    }

    fn visit_declarations(&mut self, symbols: &SymbolTable, declarations: &[Declaration]) {
        for declaration in declarations {
            match declaration {
                Declaration::Variable(variable) => {
                    if !symbols
                        .type_of(variable.symbol)
                        .has_prefix(Prefixes::CONSTANT)
                    {
                        self.variables.insert(variable.symbol);
                    }
                }
                Declaration::Template(template) => {
                    for &parameter in symbols.scope(template.parameters).symbols() {
                        let ty = symbols.type_of(parameter);
                        if ty.has_prefix(Prefixes::REFERENCE) || !ty.has_prefix(Prefixes::CONSTANT)
                        {
                            self.variables.insert(parameter);
                        }
                    }
                    self.visit_declarations(symbols, &template.declarations);
                }
                Declaration::Function(_) | Declaration::Instance(_) | Declaration::Progress(_) => {}
            }
        }
    }

    /// Check if a symbol holds runtime state
    #[must_use]
    pub fn contains(&self, symbol: SymbolId) -> bool {
        self.variables.contains(&symbol)
    }

    /// All persistent symbols
    #[must_use]
    pub fn variables(&self) -> &IndexSet<SymbolId> {
        &self.variables
    }

    /// Check if `expr` reads runtime state
    #[must_use]
    pub fn depends_on_persistent(&self, effects: &EffectCollector<'_>, expr: &Expr) -> bool {
        effects
            .reads(expr)
            .iter()
            .any(|symbol| self.variables.contains(symbol))
    }

    /// Check if `expr` can be evaluated before the model runs
    #[must_use]
    pub fn is_computable_at_check_time(&self, effects: &EffectCollector<'_>, expr: &Expr) -> bool {
        !self.depends_on_persistent(effects, expr)
    }

    /// Check if `expr` assigns no runtime state
    #[must_use]
    pub fn is_side_effect_free(&self, effects: &EffectCollector<'_>, expr: &Expr) -> bool {
        !effects
            .writes(expr)
            .iter()
            .any(|symbol| self.variables.contains(symbol))
    }
}
