//! Declaration nodes produced by the parser and normalised by the checker

use super::stmt::Block;
use super::Expr;
use crate::interpreter::Valuation;
use crate::semantic::{ScopeId, SymbolId};
use crate::Span;
use indexmap::IndexSet;
use smol_str::SmolStr;

/// A top-level or template-level declaration
#[derive(Debug, Clone)]
pub enum Declaration {
    /// Variable or constant
    Variable(Variable),
    /// Function
    Function(Function),
    /// Template (timed automaton)
    Template(Template),
    /// Template instantiation
    Instance(Instance),
    /// Progress measure
    Progress(ProgressMeasure),
}

/// A variable or constant declaration
#[derive(Debug, Clone)]
pub struct Variable {
    /// Declared symbol
    pub symbol: SymbolId,
    /// Initialiser; normalised to an aligned literal list for arrays and records
    pub initialiser: Option<Expr>,
}

impl Variable {
    /// Create a variable declaration
    #[must_use]
    pub fn new(symbol: SymbolId, initialiser: Option<Expr>) -> Self {
        Self {
            symbol,
            initialiser,
        }
    }
}

/// A function declaration
#[derive(Debug, Clone)]
pub struct Function {
    /// Function symbol; its type carries parameters and result
    pub symbol: SymbolId,
    /// Parameter scope
    pub parameters: ScopeId,
    /// Body
    pub body: Block,
    /// Non-local symbols the function may assign
    pub changes: IndexSet<SymbolId>,
    /// Non-local symbols the function reads
    pub depends: IndexSet<SymbolId>,
}

impl Function {
    /// Create a function declaration with empty effect sets
    #[must_use]
    pub fn new(symbol: SymbolId, parameters: ScopeId, body: Block) -> Self {
        Self {
            symbol,
            parameters,
            body,
            changes: IndexSet::new(),
            depends: IndexSet::new(),
        }
    }
}

/// A template: a parameterised timed automaton
#[derive(Debug, Clone)]
pub struct Template {
    /// Template symbol
    pub symbol: SymbolId,
    /// Parameter scope
    pub parameters: ScopeId,
    /// Scope of local declarations
    pub scope: ScopeId,
    /// Local declarations
    pub declarations: Vec<Declaration>,
    /// Locations
    pub states: Vec<State>,
    /// Edges
    pub edges: Vec<Edge>,
}

/// A location
#[derive(Debug, Clone)]
pub struct State {
    /// Location name
    pub name: SmolStr,
    /// Invariant; after checking, rate equations are removed
    pub invariant: Option<Expr>,
    /// Cost rate extracted from the invariant
    pub cost_rate: Option<Expr>,
    /// Source location
    pub span: Span,
}

impl State {
    /// Create a location
    #[must_use]
    pub fn new(name: impl Into<SmolStr>, invariant: Option<Expr>) -> Self {
        Self {
            name: name.into(),
            invariant,
            cost_rate: None,
            span: Span::default(),
        }
    }
}

/// Direction of a synchronisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// `c!`
    Send,
    /// `c?`
    Receive,
}

/// A synchronisation label
#[derive(Debug, Clone)]
pub struct Sync {
    /// Channel expression
    pub channel: Expr,
    /// Direction
    pub direction: SyncDirection,
    /// Source location
    pub span: Span,
}

impl Sync {
    /// Create a synchronisation
    #[must_use]
    pub fn new(channel: Expr, direction: SyncDirection) -> Self {
        let span = channel.span;
        Self {
            channel,
            direction,
            span,
        }
    }
}

/// An edge between two locations
#[derive(Debug, Clone)]
pub struct Edge {
    /// Scope of `select` bound variables
    pub select: ScopeId,
    /// Guard
    pub guard: Option<Expr>,
    /// Synchronisation
    pub sync: Option<Sync>,
    /// Update
    pub assign: Option<Expr>,
    /// Source location
    pub span: Span,
}

impl Edge {
    /// Create an edge
    #[must_use]
    pub fn new(
        select: ScopeId,
        guard: Option<Expr>,
        sync: Option<Sync>,
        assign: Option<Expr>,
    ) -> Self {
        Self {
            select,
            guard,
            sync,
            assign,
            span: Span::default(),
        }
    }
}

/// A template instantiation
#[derive(Debug, Clone)]
pub struct Instance {
    /// Process symbol
    pub symbol: SymbolId,
    /// Instantiated template
    pub template: SymbolId,
    /// Parameter symbol to argument
    pub arguments: Valuation,
    /// Source location
    pub span: Span,
}

/// A progress measure
#[derive(Debug, Clone)]
pub struct ProgressMeasure {
    /// Optional guard
    pub guard: Option<Expr>,
    /// Measure
    pub measure: Expr,
}

/// Path quantifier of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathQuantifier {
    /// `E<>`
    PossiblyEventually,
    /// `A[]`
    Always,
    /// `E[]`
    PossiblyAlways,
    /// `A<>`
    Eventually,
}

/// A property to verify
#[derive(Debug, Clone)]
pub enum Property {
    /// Path-quantified formula
    Quantified {
        /// Quantifier
        quantifier: PathQuantifier,
        /// Formula
        formula: Expr,
    },
    /// `p --> q`
    LeadsTo {
        /// Premise
        premise: Expr,
        /// Conclusion
        conclusion: Expr,
    },
}

impl Property {
    /// Source location of the whole property
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Property::Quantified { formula, .. } => formula.span,
            Property::LeadsTo {
                premise,
                conclusion,
            } => premise.span.merge(conclusion.span),
        }
    }
}
