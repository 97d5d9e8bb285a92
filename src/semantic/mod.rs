//! Semantic analysis of timed-automata models
//!
//! This module performs:
//! - Type annotation of every expression in the model
//! - Type well-formedness checks for declared ranges and array sizes
//! - Initialiser validation and normalisation
//! - Shape checks for invariants, guards, synchronisations and updates
//! - Template instantiation and function call argument checks
//! - Effect summaries for function bodies
//!
//! Every problem is reported through a [`DiagnosticSink`]; checking never
//! stops at the first error.

mod annotate;
mod compat;
mod effects;
mod error;
mod function;
mod initialiser;
mod persistent;
mod range;
mod rate;
mod scope;
mod types;

pub use annotate::type_of_binary_non_int;
pub use compat::{assignment_compatible, inline_if_compatible, Incompatibility};
pub use effects::{EffectCollector, EffectTable, FunctionEffects};
pub use error::{DiagnosticSink, Diagnostics, SemanticDiagnostic};
pub use initialiser::InitialiserError;
pub use persistent::PersistentVariables;
pub use range::Range;
pub use rate::RateDecomposition;
pub use scope::{DeclKind, Scope, ScopeId, Symbol, SymbolId, SymbolTable};
pub use types::{Base, Bounds, ChannelCapability, Prefixes, ScalarSetId, Type, TypeKind};

use crate::ast::{
    Declaration, Edge, Expr, Instance, ProgressMeasure, Property, State, SyncDirection, System,
    Template, Variable,
};
use crate::config::CheckerConfig;
use crate::interpreter::{Interpreter, Valuation};
use crate::Span;
use tracing::{debug, instrument, trace};

/// Type checker for one model
///
/// Borrows the symbol table, the growing constant valuation and the
/// diagnostic sink for the duration of one pass.
pub struct TypeChecker<'a> {
    symbols: &'a mut SymbolTable,
    constants: &'a mut Valuation,
    persistent: PersistentVariables,
    functions: EffectTable,
    sink: &'a mut dyn DiagnosticSink,
    config: CheckerConfig,
}

impl<'a> TypeChecker<'a> {
    /// Create a checker with no persistent variables and no known functions
    #[must_use]
    pub fn new(
        symbols: &'a mut SymbolTable,
        constants: &'a mut Valuation,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        Self {
            symbols,
            constants,
            persistent: PersistentVariables::default(),
            functions: EffectTable::new(),
            sink,
            config: CheckerConfig::default(),
        }
    }

    /// Use a configuration
    #[must_use]
    pub fn with_config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use the persistent variables of the model
    #[must_use]
    pub fn with_persistent(mut self, persistent: PersistentVariables) -> Self {
        self.persistent = persistent;
        self
    }

    /// Use effect summaries of already checked functions
    #[must_use]
    pub fn with_functions(mut self, functions: EffectTable) -> Self {
        self.functions = functions;
        self
    }

    /// Effect summaries recorded so far
    #[must_use]
    pub fn functions(&self) -> &EffectTable {
        &self.functions
    }

    fn interpreter(&self) -> Interpreter<'_> {
        Interpreter::new(&*self.symbols, &*self.constants)
    }

    fn effects(&self) -> EffectCollector<'_> {
        EffectCollector::new(&*self.symbols, &self.functions)
    }

    fn depends_on_persistent(&self, expr: &Expr) -> bool {
        self.persistent.depends_on_persistent(&self.effects(), expr)
    }

    fn is_side_effect_free(&self, expr: &Expr) -> bool {
        self.persistent.is_side_effect_free(&self.effects(), expr)
    }

    fn error(&mut self, span: Span, message: &str) {
        trace!(error = message, "type error reported");
        self.sink.report_error(span, message);
    }

    fn warning(&mut self, span: Span, message: &str) {
        self.sink.report_warning(span, message);
    }

    // ========== Declarations ==========

    /// Check declarations in order; constants become available to later ones
    pub fn check_declarations(&mut self, declarations: &mut [Declaration]) {
        for declaration in declarations {
            match declaration {
                Declaration::Variable(variable) => self.check_variable(variable),
                Declaration::Function(function) => self.check_function(function),
                Declaration::Template(template) => self.check_template(template),
                Declaration::Instance(instance) => self.check_instance(instance),
                Declaration::Progress(progress) => self.check_progress(progress),
            }
        }
    }

    fn check_variable(&mut self, variable: &mut Variable) {
        let symbol = self.symbols.symbol(variable.symbol);
        let (ty, span) = (symbol.ty.clone(), symbol.span);
        self.check_type(&ty, false, span);
        self.check_variable_initialiser(variable);
        if ty.has_prefix(Prefixes::CONSTANT) {
            if let Some(init) = &variable.initialiser {
                self.constants.insert(variable.symbol, init.clone());
            }
        }
    }

    fn check_template(&mut self, template: &mut Template) {
        debug!(
            template = %self.symbols.symbol(template.symbol).name,
            states = template.states.len(),
            edges = template.edges.len(),
            "checking template"
        );
        for (parameter, ty) in self.symbols.scope_types(template.parameters) {
            let span = self.symbols.symbol(parameter).span;
            self.check_type(&ty, false, span);
        }
        self.check_declarations(&mut template.declarations);
        for state in &mut template.states {
            self.check_state(state);
        }
        for edge in &mut template.edges {
            self.check_edge(edge);
        }
    }

    // ========== Locations and edges ==========

    fn check_state(&mut self, state: &mut State) {
        let Some(mut invariant) = state.invariant.take() else {
            return;
        };
        let mut valid = self.annotate(&mut invariant);
        if valid {
            if !invariant.ty.is_invariant_with_rate() {
                self.error(invariant.span, "Invalid invariant expression");
                valid = false;
            }
            if !self.is_side_effect_free(&invariant) {
                self.error(invariant.span, "Invariant must be side effect free");
                valid = false;
            }
        }
        if !valid {
            state.invariant = Some(invariant);
            return;
        }

        let decomposition = RateDecomposition::decompose(invariant);
        if decomposition.rates.len() > 1 {
            trace!(
                state = %state.name,
                dropped = decomposition.rates.len() - 1,
                "only the first cost rate is kept"
            );
        }
        state.cost_rate = decomposition.cost_rate().cloned();
        state.invariant = decomposition.invariant;
    }

    fn check_edge(&mut self, edge: &mut Edge) {
        for (symbol, ty) in self.symbols.scope_types(edge.select) {
            let span = self.symbols.symbol(symbol).span;
            self.check_type(&ty, false, span);
        }

        if let Some(guard) = edge.guard.as_mut() {
            if self.annotate(guard) {
                if !guard.ty.is_guard() {
                    self.error(guard.span, "Invalid guard");
                } else if !self.is_side_effect_free(guard) {
                    self.error(guard.span, "Guard must be side effect free");
                }
            }
        }

        if let Some(sync) = edge.sync.as_mut() {
            if self.annotate(&mut sync.channel) {
                let channel = &sync.channel.ty;
                if !channel.is_channel() {
                    self.error(sync.channel.span, "Channel expected");
                } else if !self.is_side_effect_free(&sync.channel) {
                    self.error(sync.span, "Synchronisation must be side effect free");
                } else {
                    let clock_guard = edge.guard.as_ref().is_some_and(|g| !g.ty.is_value());
                    let urgent = channel.has_prefix(Prefixes::URGENT);
                    let receives_broadcast = channel.has_prefix(Prefixes::BROADCAST)
                        && sync.direction == SyncDirection::Receive;
                    if urgent && clock_guard {
                        self.error(sync.span, "Clock guards are not allowed on urgent edges");
                    } else if receives_broadcast && clock_guard {
                        self.error(
                            sync.span,
                            "Clock guards are not allowed on broadcast receivers",
                        );
                    }
                }
            }
        }

        if let Some(assign) = edge.assign.as_mut() {
            if self.annotate(assign) {
                if !annotate::is_assignable_result(&assign.ty) {
                    self.error(assign.span, "Invalid assignment expression");
                }
                if self.config.diagnostics.no_effect_warnings
                    && assign.as_constant() != Some(1)
                    && self.is_side_effect_free(assign)
                {
                    self.warning(assign.span, "Expression does not have any effect");
                }
            }
        }
    }

    // ========== Instances ==========

    fn check_instance(&mut self, instance: &mut Instance) {
        debug!(
            process = %self.symbols.symbol(instance.symbol).name,
            arguments = instance.arguments.len(),
            "checking instance"
        );
        let annotated: Vec<bool> = instance
            .arguments
            .values_mut()
            .map(|argument| self.annotate(argument))
            .collect();

        for ((&parameter, argument), ok) in instance.arguments.iter().zip(annotated) {
            if !ok {
                continue;
            }
            if !self.is_side_effect_free(argument) {
                self.error(argument.span, "Argument must be side effect free");
                continue;
            }

            // Legal shapes: constant reference to a computable value, reference
            // to a unique location, or a computable value
            let parameter_ty = self.symbols.type_of(parameter).clone();
            let reference = parameter_ty.has_prefix(Prefixes::REFERENCE);
            let constant = parameter_ty.has_prefix(Prefixes::CONSTANT);
            let computable = !self.depends_on_persistent(argument);
            let shaped = if reference {
                self.is_unique_reference(argument)
            } else {
                computable
            };
            if !(reference && constant && computable) && !shaped {
                self.error(argument.span, "Incompatible argument");
                continue;
            }

            self.check_parameter_compatible(Some(&instance.arguments), &parameter_ty, argument);
        }
    }

    // ========== Progress measures and properties ==========

    fn check_progress(&mut self, progress: &mut ProgressMeasure) {
        if let Some(guard) = progress.guard.as_mut() {
            if self.annotate(guard) {
                if !guard.ty.is_value() {
                    self.error(guard.span, "Progress measure must evaluate to a boolean");
                } else if !self.is_side_effect_free(guard) {
                    self.error(guard.span, "Progress measure must be side effect free");
                }
            }
        }
        let measure = &mut progress.measure;
        if self.annotate(measure) {
            if !measure.ty.is_value() {
                self.error(measure.span, "Progress measure must evaluate to a value");
            } else if !self.is_side_effect_free(measure) {
                self.error(measure.span, "Progress measure must be side effect free");
            }
        }
    }

    /// Check a property; returns `false` if an error was reported
    pub fn check_property(&mut self, property: &mut Property) -> bool {
        let span = property.span();
        let mut formulas: Vec<&mut Expr> = match property {
            Property::Quantified { formula, .. } => vec![formula],
            Property::LeadsTo {
                premise,
                conclusion,
            } => vec![premise, conclusion],
        };

        // Both sides of a leads-to are annotated even if the first fails
        let mut annotated = true;
        for formula in &mut formulas {
            annotated &= self.annotate(formula);
        }
        if !annotated {
            return false;
        }

        let mut ok = true;
        if !formulas.iter().all(|formula| self.is_side_effect_free(formula)) {
            self.error(span, "Property must be side effect free");
            ok = false;
        }
        if !formulas.iter().all(|formula| formula.ty.is_constraint()) {
            self.error(span, "Property must be a constraint");
            ok = false;
        }
        ok
    }

    /// Annotate an ad hoc expression and require a constraint
    pub fn check_constraint(&mut self, expr: &mut Expr) -> bool {
        if !self.annotate(expr) {
            return false;
        }
        if !expr.ty.is_constraint() {
            self.error(expr.span, "Property must be a constraint");
            return false;
        }
        true
    }
}

/// Check a whole model with the default configuration
pub fn check_system(system: &mut System, sink: &mut dyn DiagnosticSink) {
    check_system_with_config(system, sink, &CheckerConfig::default());
}

/// Check a whole model, annotating it in place.
///
/// Persistent variables are collected once before any declaration is
/// checked. Declarations are then visited in order, so a constant is
/// available to every later declaration.
#[instrument(skip_all)]
pub fn check_system_with_config(
    system: &mut System,
    sink: &mut dyn DiagnosticSink,
    config: &CheckerConfig,
) {
    // ========== Phase 1: Persistent variables ==========
    let persistent = PersistentVariables::collect(system);
    debug!(count = persistent.variables().len(), "persistent variables collected");

    let System {
        symbols,
        declarations,
        properties,
        before_update,
        after_update,
        constants,
    } = system;
    let mut checker = TypeChecker::new(symbols, constants, sink)
        .with_config(config.clone())
        .with_persistent(persistent);

    // ========== Phase 2: Update hooks ==========
    debug!(
        hooks = usize::from(before_update.is_some()) + usize::from(after_update.is_some()),
        "annotating update hooks"
    );
    for hook in [before_update, after_update].into_iter().flatten() {
        checker.annotate(hook);
    }

    // ========== Phase 3: Declarations ==========
    debug!(declarations = declarations.len(), "checking declarations");
    checker.check_declarations(declarations);

    // ========== Phase 4: Properties ==========
    debug!(properties = properties.len(), "checking properties");
    for property in properties.iter_mut() {
        checker.check_property(property);
    }
}

/// Check a property against an already checked model
pub fn check_property(
    system: &mut System,
    property: &mut Property,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    checker_for(system, sink).check_property(property)
}

/// Annotate an ad hoc expression against an already checked model and
/// require it to be a constraint
pub fn check_expression(system: &mut System, expr: &mut Expr, sink: &mut dyn DiagnosticSink) -> bool {
    checker_for(system, sink).check_constraint(expr)
}

fn checker_for<'s>(system: &'s mut System, sink: &'s mut dyn DiagnosticSink) -> TypeChecker<'s> {
    let persistent = PersistentVariables::collect(system);
    let functions: EffectTable = system
        .functions()
        .map(|function| (function.symbol, FunctionEffects::of(function)))
        .collect();
    TypeChecker::new(&mut system.symbols, &mut system.constants, sink)
        .with_persistent(persistent)
        .with_functions(functions)
}
