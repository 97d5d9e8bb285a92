//! Initialiser checking and normalisation
//!
//! Array and record initialisers are rewritten into literal lists aligned
//! with the declared element or field order and typed with the declared
//! type. A failure aborts the whole initialiser and becomes exactly one
//! diagnostic.

use super::types::TypeKind;
use super::{Type, TypeChecker};
use crate::ast::{Expr, ExprKind, ListItem, Variable};
use crate::Span;
use thiserror::Error;
use tracing::trace;

/// Why an initialiser does not fit its declared type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitialiserError {
    /// Array initialised by something other than a list
    #[error("Invalid array initialiser")]
    InvalidArray {
        /// Location
        span: Span,
    },
    /// Array indexed by a scalar set
    #[error("Arrays of scalarsets cannot have initialisers")]
    ScalarsetArray {
        /// Location
        span: Span,
    },
    /// Array size not computable
    #[error("Arrays with parameterized size cannot have an initialiser")]
    ParameterizedSize {
        /// Location
        span: Span,
    },
    /// More elements than the array holds
    #[error("Excess elements in array initialiser")]
    ExcessArrayElements {
        /// Location
        span: Span,
    },
    /// Named entry in an array initialiser
    #[error("Unknown field specified in initialiser")]
    NamedArrayElement {
        /// Location
        span: Span,
    },
    /// Fewer elements than the array holds
    #[error("Missing fields in initialiser")]
    MissingArrayElements {
        /// Location
        span: Span,
    },
    /// Not a value, or an uninitialisable type
    #[error("Invalid initialiser")]
    Invalid {
        /// Location
        span: Span,
    },
    /// Value outside the declared range
    #[error("Initialiser is out of range")]
    OutOfRange {
        /// Location
        span: Span,
    },
    /// Record initialised by something other than a list or same record
    #[error("Invalid initialiser for struct")]
    InvalidStruct {
        /// Location
        span: Span,
    },
    /// Named entry without matching field
    #[error("Unknown field")]
    UnknownField {
        /// Location
        span: Span,
    },
    /// More entries than the record has fields
    #[error("Excess elements in intialiser")]
    ExcessFields {
        /// Location
        span: Span,
    },
    /// A field initialised twice
    #[error("Multiple initialisers for field")]
    DuplicateField {
        /// Location
        span: Span,
    },
    /// A field left uninitialised
    #[error("Incomplete initialiser")]
    Incomplete {
        /// Location
        span: Span,
    },
}

impl InitialiserError {
    /// Get the span of the offending expression
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::InvalidArray { span }
            | Self::ScalarsetArray { span }
            | Self::ParameterizedSize { span }
            | Self::ExcessArrayElements { span }
            | Self::NamedArrayElement { span }
            | Self::MissingArrayElements { span }
            | Self::Invalid { span }
            | Self::OutOfRange { span }
            | Self::InvalidStruct { span }
            | Self::UnknownField { span }
            | Self::ExcessFields { span }
            | Self::DuplicateField { span }
            | Self::Incomplete { span } => *span,
        }
    }
}

impl TypeChecker<'_> {
    /// Check the initialiser of a global or template-level variable and
    /// replace it by its normalised form
    pub(super) fn check_variable_initialiser(&mut self, variable: &mut Variable) {
        let Some(init) = variable.initialiser.as_mut() else {
            return;
        };
        if !self.annotate(init) {
            return;
        }
        if self.depends_on_persistent(init) {
            self.error(init.span, "Constant expression expected");
        } else if !self.is_side_effect_free(init) {
            self.error(init.span, "Initialiser must not have side effects");
        } else {
            let ty = self.symbols.type_of(variable.symbol).clone();
            self.apply_initialiser(&ty, init);
        }
    }

    /// Normalise `init` in place, reporting a failure as one error
    pub(super) fn apply_initialiser(&mut self, ty: &Type, init: &mut Expr) {
        match self.normalise_initialiser(ty, init) {
            Ok(normalised) => *init = normalised,
            Err(error) => self.error(error.span(), &error.to_string()),
        }
    }

    /// Check `init` against `ty` and return the normalised initialiser
    ///
    /// # Errors
    ///
    /// Returns the first shape or range violation found.
    pub fn normalise_initialiser(&self, ty: &Type, init: &Expr) -> Result<Expr, InitialiserError> {
        match &ty.kind {
            TypeKind::Array { size, element } => {
                let ExprKind::List(items) = &init.kind else {
                    return Err(InitialiserError::InvalidArray { span: init.span });
                };
                if !size.is_integer() {
                    return Err(InitialiserError::ScalarsetArray { span: init.span });
                }
                let dimension = self
                    .interpreter()
                    .evaluate_type_range(size)
                    .ok()
                    .and_then(|range| Some(i64::from(range.upper()?) - i64::from(range.lower()?) + 1))
                    .ok_or(InitialiserError::ParameterizedSize { span: init.span })?;
                let count = i64::try_from(items.len()).unwrap_or(i64::MAX);
                if count > dimension {
                    return Err(InitialiserError::ExcessArrayElements { span: init.span });
                }
                let mut normalised = Vec::with_capacity(items.len());
                for item in items {
                    if item.name.is_some() {
                        return Err(InitialiserError::NamedArrayElement {
                            span: item.value.span,
                        });
                    }
                    normalised.push(ListItem::positional(
                        self.normalise_initialiser(element, &item.value)?,
                    ));
                }
                if count < dimension {
                    return Err(InitialiserError::MissingArrayElements { span: init.span });
                }
                Ok(typed_list(normalised, init.span, ty))
            }
            TypeKind::Bool => {
                if init.ty.is_value() {
                    Ok(init.clone())
                } else {
                    Err(InitialiserError::Invalid { span: init.span })
                }
            }
            TypeKind::Int(bounds) => {
                if !init.ty.is_value() {
                    return Err(InitialiserError::Invalid { span: init.span });
                }
                let Some(bounds) = bounds else {
                    return Ok(init.clone());
                };
                let interpreter = self.interpreter();
                match interpreter
                    .evaluate(init)
                    .and_then(|value| Ok((value, interpreter.evaluate_bounds(bounds)?)))
                {
                    Ok((value, range)) if !range.contains_value(value) => {
                        Err(InitialiserError::OutOfRange { span: init.span })
                    }
                    Ok(_) => Ok(init.clone()),
                    Err(reason) => {
                        trace!(%reason, "initialiser range deferred to runtime");
                        Ok(init.clone())
                    }
                }
            }
            TypeKind::Record(fields) => {
                if init.ty.record_fields() == Some(*fields) {
                    return Ok(init.clone());
                }
                let ExprKind::List(items) = &init.kind else {
                    return Err(InitialiserError::InvalidStruct { span: init.span });
                };
                let field_types = self.symbols.scope_types(*fields);
                let mut slots: Vec<Option<Expr>> = vec![None; field_types.len()];
                let mut current = 0;
                for item in items {
                    if let Some(name) = &item.name {
                        current = self.symbols.index_of(*fields, name).ok_or(
                            InitialiserError::UnknownField {
                                span: item.value.span,
                            },
                        )?;
                    }
                    let Some(slot) = slots.get_mut(current) else {
                        return Err(InitialiserError::ExcessFields {
                            span: item.value.span,
                        });
                    };
                    if slot.is_some() {
                        return Err(InitialiserError::DuplicateField {
                            span: item.value.span,
                        });
                    }
                    *slot = Some(self.normalise_initialiser(&field_types[current].1, &item.value)?);
                    current += 1;
                }
                let mut normalised = Vec::with_capacity(slots.len());
                for ((symbol, _), slot) in field_types.iter().zip(slots) {
                    let value = slot.ok_or(InitialiserError::Incomplete { span: init.span })?;
                    let name = self.symbols.symbol(*symbol).name.clone();
                    normalised.push(ListItem {
                        name: (!name.is_empty()).then_some(name),
                        value,
                    });
                }
                Ok(typed_list(normalised, init.span, ty))
            }
            _ => Err(InitialiserError::Invalid { span: init.span }),
        }
    }
}

fn typed_list(items: Vec<ListItem>, span: Span, ty: &Type) -> Expr {
    let mut list = Expr::new(ExprKind::List(items), span);
    list.ty = ty.clone();
    list
}
