//! Symbol tables and scope management
//!
//! Scopes live in an arena owned by the [`SymbolTable`]; parent links and
//! symbol references are plain indices, so a scope can never outlive its
//! parent. Two scopes are the same scope iff their [`ScopeId`]s are equal.

use super::types::{ScalarSetId, Type};
use crate::Span;
use indexmap::IndexMap;
use smol_str::SmolStr;

/// Index of a scope in the symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

/// Index of a symbol in the symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// The kind of declaration that introduced a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// A variable or constant
    Variable,
    /// A template or function parameter
    Parameter,
    /// A function
    Function,
    /// A template
    Template,
    /// A process instance
    Instance,
    /// A record field or literal list entry
    Field,
    /// A `select` or `forall` bound variable, or an iteration variable
    Bound,
}

/// A named binding
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Symbol name; empty for anonymous record fields
    pub name: SmolStr,
    /// Declared type
    pub ty: Type,
    /// Declaration that introduced the symbol
    pub decl: DeclKind,
    /// Definition span
    pub span: Span,
}

/// A scope containing symbols
#[derive(Debug, Default)]
pub struct Scope {
    /// Bindings in declaration order; duplicates are kept
    symbols: Vec<SymbolId>,
    /// Latest binding per name
    names: IndexMap<SmolStr, SymbolId>,
    /// Parent scope (None for the global scope)
    parent: Option<ScopeId>,
}

impl Scope {
    /// Get the parent scope index
    #[must_use]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Bindings in declaration order
    #[must_use]
    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }
}

/// The symbol table owning all scopes and symbols
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    next_scalar_set: u32,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a new symbol table with a global scope
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            symbols: Vec::new(),
            next_scalar_set: 0,
        }
    }

    /// The global scope
    #[must_use]
    pub const fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Create a new scope chained to `parent`
    pub fn new_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(index_u32(self.scopes.len()));
        self.scopes.push(Scope {
            parent,
            ..Scope::default()
        });
        id
    }

    /// Add a binding to `scope`; an existing binding of the same name is shadowed
    pub fn add_symbol(
        &mut self,
        scope: ScopeId,
        name: impl Into<SmolStr>,
        ty: Type,
        decl: DeclKind,
        span: Span,
    ) -> SymbolId {
        let name = name.into();
        let id = SymbolId(index_u32(self.symbols.len()));
        self.symbols.push(Symbol {
            name: name.clone(),
            ty,
            decl,
            span,
        });
        let frame = &mut self.scopes[scope.0 as usize];
        frame.symbols.push(id);
        if !name.is_empty() {
            frame.names.insert(name, id);
        }
        id
    }

    /// Look up a name in `scope`, then its parents
    #[must_use]
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = self.scope(id);
            if let Some(symbol) = frame.names.get(name) {
                return Some(*symbol);
            }
            current = frame.parent;
        }
        None
    }

    /// Number of bindings directly in `scope`
    #[must_use]
    pub fn size(&self, scope: ScopeId) -> usize {
        self.scope(scope).symbols.len()
    }

    /// The `index`th binding of `scope`
    #[must_use]
    pub fn get(&self, scope: ScopeId, index: usize) -> Option<SymbolId> {
        self.scope(scope).symbols.get(index).copied()
    }

    /// Position of the binding named `name` directly in `scope`
    #[must_use]
    pub fn index_of(&self, scope: ScopeId, name: &str) -> Option<usize> {
        let frame = self.scope(scope);
        let symbol = frame.names.get(name)?;
        frame.symbols.iter().position(|id| id == symbol)
    }

    /// Append all bindings of `other` to `scope`
    pub fn merge(&mut self, scope: ScopeId, other: ScopeId) {
        let incoming: Vec<SymbolId> = self.scope(other).symbols.clone();
        for id in incoming {
            let name = self.symbols[id.0 as usize].name.clone();
            let frame = &mut self.scopes[scope.0 as usize];
            frame.symbols.push(id);
            if !name.is_empty() {
                frame.names.insert(name, id);
            }
        }
    }

    /// Get a scope
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    /// Get a symbol
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    /// Declared type of a symbol
    #[must_use]
    pub fn type_of(&self, id: SymbolId) -> &Type {
        &self.symbol(id).ty
    }

    /// Types of all bindings of `scope`, in order
    #[must_use]
    pub fn scope_types(&self, scope: ScopeId) -> Vec<(SymbolId, Type)> {
        self.scope(scope)
            .symbols
            .iter()
            .map(|id| (*id, self.type_of(*id).clone()))
            .collect()
    }

    /// Allocate the identity of a new scalar set
    pub fn alloc_scalar_set(&mut self) -> ScalarSetId {
        let id = ScalarSetId(self.next_scalar_set);
        self.next_scalar_set += 1;
        id
    }
}

fn index_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(table: &mut SymbolTable, scope: ScopeId, name: &str, ty: Type) -> SymbolId {
        table.add_symbol(scope, name, ty, DeclKind::Variable, Span::default())
    }

    #[test]
    fn test_resolve_searches_parents() {
        let mut table = SymbolTable::new();
        let global = table.global();
        let x = add(&mut table, global, "x", Type::int());
        let inner = table.new_scope(Some(global));
        let y = add(&mut table, inner, "y", Type::clock());

        assert_eq!(table.resolve(inner, "x"), Some(x));
        assert_eq!(table.resolve(inner, "y"), Some(y));
        assert_eq!(table.resolve(global, "y"), None);
        assert_eq!(table.scope(inner).parent(), Some(global));
    }

    #[test]
    fn test_duplicates_shadow() {
        let mut table = SymbolTable::new();
        let global = table.global();
        let first = add(&mut table, global, "x", Type::int());
        let second = add(&mut table, global, "x", Type::bool());

        assert_ne!(first, second);
        assert_eq!(table.size(global), 2);
        assert_eq!(table.resolve(global, "x"), Some(second));
        assert_eq!(table.index_of(global, "x"), Some(1));
        assert_eq!(table.get(global, 0), Some(first));
    }

    #[test]
    fn test_inner_shadows_outer() {
        let mut table = SymbolTable::new();
        let global = table.global();
        add(&mut table, global, "x", Type::int());
        let inner = table.new_scope(Some(global));
        let local = add(&mut table, inner, "x", Type::clock());
        assert_eq!(table.resolve(inner, "x"), Some(local));
    }

    #[test]
    fn test_anonymous_fields_are_indexed_but_unnamed() {
        let mut table = SymbolTable::new();
        let fields = table.new_scope(None);
        add(&mut table, fields, "", Type::int());
        add(&mut table, fields, "b", Type::int());
        assert_eq!(table.size(fields), 2);
        assert_eq!(table.index_of(fields, ""), None);
        assert_eq!(table.index_of(fields, "b"), Some(1));
    }

    #[test]
    fn test_merge_appends() {
        let mut table = SymbolTable::new();
        let params = table.new_scope(None);
        let a = add(&mut table, params, "a", Type::int());
        let locals = table.new_scope(None);
        let b = add(&mut table, locals, "b", Type::int());
        let combined = table.new_scope(None);
        table.merge(combined, params);
        table.merge(combined, locals);

        assert_eq!(table.size(combined), 2);
        assert_eq!(table.resolve(combined, "a"), Some(a));
        assert_eq!(table.index_of(combined, "b"), Some(1));
        assert_eq!(table.get(combined, 1), Some(b));
    }

    #[test]
    fn test_scope_identity() {
        let mut table = SymbolTable::new();
        let a = table.new_scope(None);
        let b = table.new_scope(None);
        assert_ne!(a, b);
        assert_ne!(table.alloc_scalar_set(), table.alloc_scalar_set());
    }
}
