//! Semantic type representation
//!
//! A [`Type`] is an immutable value: a [`TypeKind`] carrying the
//! tag-specific payload plus a set of [`Prefixes`]. Boolean-like types form
//! a strength lattice (value, invariant, guard, constraint) exposed through
//! the `is_*` predicates.

use super::scope::ScopeId;
use crate::ast::Expr;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

/// Independently combinable type prefix flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Prefixes(u8);

impl Prefixes {
    /// No prefix
    pub const NONE: Self = Self(0);
    /// `urgent`
    pub const URGENT: Self = Self(1);
    /// `committed`
    pub const COMMITTED: Self = Self(1 << 1);
    /// `const`
    pub const CONSTANT: Self = Self(1 << 2);
    /// `broadcast`
    pub const BROADCAST: Self = Self(1 << 3);
    /// `&`
    pub const REFERENCE: Self = Self(1 << 4);
    /// `meta`
    pub const META: Self = Self(1 << 5);
    /// `winning`
    pub const WINNING: Self = Self(1 << 6);
    /// `losing`
    pub const LOSING: Self = Self(1 << 7);

    /// Check whether every flag in `other` is set
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check whether no flag is set
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Remove the flags in `other`
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for Prefixes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Prefixes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Prefixes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Prefixes, &str); 8] = [
            (Prefixes::URGENT, "urgent"),
            (Prefixes::COMMITTED, "committed"),
            (Prefixes::CONSTANT, "const"),
            (Prefixes::BROADCAST, "broadcast"),
            (Prefixes::META, "meta"),
            (Prefixes::WINNING, "winning"),
            (Prefixes::LOSING, "losing"),
            (Prefixes::REFERENCE, "&"),
        ];
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Identity of a scalar set declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScalarSetId(pub u32);

/// Declared `[lower, upper]` bound expressions of an integer or scalar type
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    /// Lower bound expression
    pub lower: Arc<Expr>,
    /// Upper bound expression
    pub upper: Arc<Expr>,
}

impl Bounds {
    /// Create bounds from two expressions
    #[must_use]
    pub fn new(lower: Expr, upper: Expr) -> Self {
        Self {
            lower: Arc::new(lower),
            upper: Arc::new(upper),
        }
    }
}

/// The tag of a type, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    /// No value
    Void,
    /// Real-valued clock
    Clock,
    /// Bounded or unbounded integer
    Int,
    /// Boolean
    Bool,
    /// Scalar set member
    Scalar,
    /// Synchronisation channel
    Channel,
    /// Array
    Array,
    /// Record
    Record,
    /// Function
    Function,
    /// Template
    Template,
    /// Process (instantiated template)
    Process,
    /// Location invariant shaped expression
    Invariant,
    /// Invariant that may contain a rate equation
    InvariantWithRate,
    /// Edge guard shaped expression
    Guard,
    /// Clock difference
    Diff,
    /// Property constraint
    Constraint,
    /// Cost variable
    Cost,
    /// Rate of a cost variable
    Rate,
    /// Not yet annotated
    Unknown,
}

/// Tag-specific payload of a type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// No value
    Void,
    /// Real-valued clock
    Clock,
    /// Integer; `None` means unconstrained (e.g. a raw constant)
    Int(Option<Bounds>),
    /// Boolean
    Bool,
    /// Member of a scalar set
    Scalar {
        /// Identity of the scalar set
        set: ScalarSetId,
        /// Index bounds of the set
        bounds: Bounds,
    },
    /// Synchronisation channel
    Channel,
    /// Array
    Array {
        /// Index type, either an integer range or a scalar set
        size: Arc<Type>,
        /// Element type
        element: Arc<Type>,
    },
    /// Record with its field scope
    Record(ScopeId),
    /// Function with its parameter scope and result type
    Function {
        /// Parameter scope
        parameters: ScopeId,
        /// Result type
        result: Arc<Type>,
    },
    /// Template with its parameter scope
    Template(ScopeId),
    /// Process with the scope of its members
    Process(ScopeId),
    /// Location invariant shaped expression
    Invariant,
    /// Invariant that may contain a rate equation
    InvariantWithRate,
    /// Edge guard shaped expression
    Guard,
    /// Clock difference
    Diff,
    /// Property constraint
    Constraint,
    /// Cost variable
    Cost,
    /// Rate of a cost variable
    Rate,
    /// Not yet annotated
    Unknown,
}

/// A resolved semantic type
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    /// Tag and payload
    pub kind: TypeKind,
    /// Prefix flags
    pub prefixes: Prefixes,
}

impl Default for Type {
    fn default() -> Self {
        Self::unknown()
    }
}

impl From<TypeKind> for Type {
    fn from(kind: TypeKind) -> Self {
        Self {
            kind,
            prefixes: Prefixes::NONE,
        }
    }
}

impl Type {
    /// Create a type from a kind and prefixes
    #[must_use]
    pub fn new(kind: TypeKind, prefixes: Prefixes) -> Self {
        Self { kind, prefixes }
    }

    /// The unknown type of an unannotated expression
    #[must_use]
    pub fn unknown() -> Self {
        TypeKind::Unknown.into()
    }

    /// The void type
    #[must_use]
    pub fn void() -> Self {
        TypeKind::Void.into()
    }

    /// The clock type
    #[must_use]
    pub fn clock() -> Self {
        TypeKind::Clock.into()
    }

    /// The boolean type
    #[must_use]
    pub fn bool() -> Self {
        TypeKind::Bool.into()
    }

    /// An integer without declared range
    #[must_use]
    pub fn int() -> Self {
        TypeKind::Int(None).into()
    }

    /// An integer with declared range
    #[must_use]
    pub fn ranged_int(lower: Expr, upper: Expr) -> Self {
        TypeKind::Int(Some(Bounds::new(lower, upper))).into()
    }

    /// A channel
    #[must_use]
    pub fn channel() -> Self {
        TypeKind::Channel.into()
    }

    /// A cost variable
    #[must_use]
    pub fn cost() -> Self {
        TypeKind::Cost.into()
    }

    /// A scalar set member
    #[must_use]
    pub fn scalar(set: ScalarSetId, size: i32) -> Self {
        TypeKind::Scalar {
            set,
            bounds: Bounds::new(Expr::constant(0), Expr::constant(size.saturating_sub(1))),
        }
        .into()
    }

    /// An array indexed by `size`
    #[must_use]
    pub fn array(size: Type, element: Type) -> Self {
        TypeKind::Array {
            size: Arc::new(size),
            element: Arc::new(element),
        }
        .into()
    }

    /// An array with `len` elements, indexed by `int[0, len - 1]`; the upper
    /// bound saturates, so a non-positive `len` yields an empty index range
    #[must_use]
    pub fn array_of(len: i32, element: Type) -> Self {
        Self::array(
            Self::ranged_int(Expr::constant(0), Expr::constant(len.saturating_sub(1))),
            element,
        )
    }

    /// A record whose fields live in `fields`
    #[must_use]
    pub fn record(fields: ScopeId) -> Self {
        TypeKind::Record(fields).into()
    }

    /// A function type
    #[must_use]
    pub fn function(parameters: ScopeId, result: Type) -> Self {
        TypeKind::Function {
            parameters,
            result: Arc::new(result),
        }
        .into()
    }

    /// Add prefixes to this type
    #[must_use]
    pub fn with_prefix(mut self, prefixes: Prefixes) -> Self {
        self.prefixes |= prefixes;
        self
    }

    /// Check for a prefix flag
    #[must_use]
    pub const fn has_prefix(&self, prefix: Prefixes) -> bool {
        self.prefixes.contains(prefix)
    }

    /// The tag of this type
    #[must_use]
    pub fn base(&self) -> Base {
        match &self.kind {
            TypeKind::Void => Base::Void,
            TypeKind::Clock => Base::Clock,
            TypeKind::Int(_) => Base::Int,
            TypeKind::Bool => Base::Bool,
            TypeKind::Scalar { .. } => Base::Scalar,
            TypeKind::Channel => Base::Channel,
            TypeKind::Array { .. } => Base::Array,
            TypeKind::Record(_) => Base::Record,
            TypeKind::Function { .. } => Base::Function,
            TypeKind::Template(_) => Base::Template,
            TypeKind::Process(_) => Base::Process,
            TypeKind::Invariant => Base::Invariant,
            TypeKind::InvariantWithRate => Base::InvariantWithRate,
            TypeKind::Guard => Base::Guard,
            TypeKind::Diff => Base::Diff,
            TypeKind::Constraint => Base::Constraint,
            TypeKind::Cost => Base::Cost,
            TypeKind::Rate => Base::Rate,
            TypeKind::Unknown => Base::Unknown,
        }
    }

    /// Declared range of an integer or scalar type
    #[must_use]
    pub fn bounds(&self) -> Option<&Bounds> {
        match &self.kind {
            TypeKind::Int(bounds) => bounds.as_ref(),
            TypeKind::Scalar { bounds, .. } => Some(bounds),
            _ => None,
        }
    }

    /// Index and element type of an array
    #[must_use]
    pub fn array_parts(&self) -> Option<(&Type, &Type)> {
        match &self.kind {
            TypeKind::Array { size, element } => Some((size, element)),
            _ => None,
        }
    }

    /// Field scope of a record
    #[must_use]
    pub fn record_fields(&self) -> Option<ScopeId> {
        match self.kind {
            TypeKind::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Strip all array layers
    #[must_use]
    pub fn innermost(&self) -> &Type {
        let mut ty = self;
        while let Some((_, element)) = ty.array_parts() {
            ty = element;
        }
        ty
    }

    /// Two scalar types denote the same scalar set
    #[must_use]
    pub fn is_same_scalar(&self, other: &Type) -> bool {
        match (&self.kind, &other.kind) {
            (TypeKind::Scalar { set: a, .. }, TypeKind::Scalar { set: b, .. }) => a == b,
            _ => false,
        }
    }

    /// `void`
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.base() == Base::Void
    }

    /// `clock`
    #[must_use]
    pub fn is_clock(&self) -> bool {
        self.base() == Base::Clock
    }

    /// Clock difference
    #[must_use]
    pub fn is_diff(&self) -> bool {
        self.base() == Base::Diff
    }

    /// Cost variable
    #[must_use]
    pub fn is_cost(&self) -> bool {
        self.base() == Base::Cost
    }

    /// Rate of a cost variable
    #[must_use]
    pub fn is_rate(&self) -> bool {
        self.base() == Base::Rate
    }

    /// Channel
    #[must_use]
    pub fn is_channel(&self) -> bool {
        self.base() == Base::Channel
    }

    /// Array
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.base() == Base::Array
    }

    /// Record
    #[must_use]
    pub fn is_record(&self) -> bool {
        self.base() == Base::Record
    }

    /// Integer (bounded or not)
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.base() == Base::Int
    }

    /// Scalar set member or integer
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.base() == Base::Scalar || self.is_integer()
    }

    /// Plain value: integer or boolean
    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self.base(), Base::Int | Base::Bool)
    }

    /// Valid location invariant
    #[must_use]
    pub fn is_invariant(&self) -> bool {
        self.base() == Base::Invariant || self.is_value()
    }

    /// Valid location invariant, possibly containing a rate equation
    #[must_use]
    pub fn is_invariant_with_rate(&self) -> bool {
        self.base() == Base::InvariantWithRate || self.is_invariant()
    }

    /// Valid edge guard
    #[must_use]
    pub fn is_guard(&self) -> bool {
        self.base() == Base::Guard || self.is_invariant()
    }

    /// Valid property constraint
    #[must_use]
    pub fn is_constraint(&self) -> bool {
        self.base() == Base::Constraint || self.is_guard()
    }
}

/// How much a channel may be used for; arguments must not lose capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChannelCapability {
    /// Urgent channel
    Urgent = 0,
    /// Broadcast channel
    Broadcast = 1,
    /// Plain channel
    Unrestricted = 2,
}

impl ChannelCapability {
    /// Capability of a channel type, `None` for other types
    #[must_use]
    pub fn of(ty: &Type) -> Option<Self> {
        if !ty.is_channel() {
            return None;
        }
        Some(if ty.has_prefix(Prefixes::URGENT) {
            Self::Urgent
        } else if ty.has_prefix(Prefixes::BROADCAST) {
            Self::Broadcast
        } else {
            Self::Unrestricted
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.prefixes.is_empty() {
            write!(f, "{} ", self.prefixes)?;
        }
        match &self.kind {
            TypeKind::Void => write!(f, "void"),
            TypeKind::Clock => write!(f, "clock"),
            TypeKind::Int(None) => write!(f, "int"),
            TypeKind::Int(Some(bounds)) => write!(f, "int[{},{}]", bounds.lower, bounds.upper),
            TypeKind::Bool => write!(f, "bool"),
            TypeKind::Scalar { set, bounds } => {
                write!(f, "scalar#{}[{},{}]", set.0, bounds.lower, bounds.upper)
            }
            TypeKind::Channel => write!(f, "chan"),
            TypeKind::Array { size, element } => write!(f, "{element}[{size}]"),
            TypeKind::Record(scope) => write!(f, "struct#{}", scope.0),
            TypeKind::Function { result, .. } => write!(f, "{result}(...)"),
            TypeKind::Template(_) => write!(f, "template"),
            TypeKind::Process(_) => write!(f, "process"),
            TypeKind::Invariant => write!(f, "invariant"),
            TypeKind::InvariantWithRate => write!(f, "invariant with rate"),
            TypeKind::Guard => write!(f, "guard"),
            TypeKind::Diff => write!(f, "diff"),
            TypeKind::Constraint => write!(f, "constraint"),
            TypeKind::Cost => write!(f, "cost"),
            TypeKind::Rate => write!(f, "rate"),
            TypeKind::Unknown => write!(f, "<unknown>"),
        }
    }
}
