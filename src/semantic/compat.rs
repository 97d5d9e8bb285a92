//! Compatibility rules between types and between parameters and arguments

use super::types::{Base, ChannelCapability, Prefixes, Type};
use super::TypeChecker;
use crate::ast::Expr;
use crate::interpreter::{Interpreter, Valuation};
use crate::semantic::Range;
use thiserror::Error;
use tracing::trace;

/// Why an argument cannot be bound to a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Incompatibility {
    /// Non-constant reference bound to something that is not a location
    #[error("Reference parameter requires left value argument")]
    NotLeftValue,
    /// Array dimensions differ
    #[error("Incompatible type")]
    ArrayShape,
    /// Base types differ
    #[error("Incompatible argument")]
    BaseType,
    /// Reference to an integer with a different declared range
    #[error("Range of argument does not match range of formal parameter")]
    RangeMismatch,
    /// Argument values may fall outside the parameter range
    #[error("Range of argument is outside of the range of the formal parameter")]
    OutOfRange,
    /// Records with different fields or different scalar sets
    #[error("Argument has incompatible type")]
    StructuralMismatch,
    /// Channel argument with less capability than the parameter
    #[error("Incompatible channel type")]
    ChannelCapability,
}

/// Check if two types may be the branches of an inline if
#[must_use]
pub fn inline_if_compatible(then_ty: &Type, else_ty: &Type) -> bool {
    if then_ty.is_value() && else_ty.is_value() {
        return true;
    }
    if then_ty.is_clock() && else_ty.is_clock() {
        return true;
    }
    if then_ty.is_channel() && else_ty.is_channel() {
        return then_ty.has_prefix(Prefixes::URGENT) == else_ty.has_prefix(Prefixes::URGENT)
            && then_ty.has_prefix(Prefixes::BROADCAST) == else_ty.has_prefix(Prefixes::BROADCAST);
    }
    if let (Some((then_size, then_element)), Some((else_size, else_element))) =
        (then_ty.array_parts(), else_ty.array_parts())
    {
        return same_array_size(then_size, else_size)
            && inline_if_compatible(then_element, else_element);
    }
    if then_ty.is_record() && else_ty.is_record() {
        return then_ty.record_fields() == else_ty.record_fields();
    }
    then_ty.is_same_scalar(else_ty)
}

/// Check if a value of type `source` may be assigned to a location of type `target`
#[must_use]
pub fn assignment_compatible(target: &Type, source: &Type) -> bool {
    if (target.is_clock() || target.is_value()) && source.is_value() {
        return true;
    }
    if target.is_record() && source.is_record() {
        return target.record_fields() == source.record_fields();
    }
    target.is_same_scalar(source)
}

/// Array index types match: identical bound expressions for integer
/// ranges, identical set for scalars
fn same_array_size(a: &Type, b: &Type) -> bool {
    if a.is_integer() && b.is_integer() {
        a.bounds() == b.bounds()
    } else if a.base() == Base::Scalar && b.base() == Base::Scalar {
        a.is_same_scalar(b)
    } else {
        false
    }
}

impl TypeChecker<'_> {
    /// Check an argument against a parameter and report the first violated
    /// rule. `arguments` seeds the interpreter with instance arguments.
    pub(super) fn check_parameter_compatible(
        &mut self,
        arguments: Option<&Valuation>,
        parameter: &Type,
        argument: &Expr,
    ) -> bool {
        match self.parameter_compatibility(arguments, parameter, argument) {
            Ok(()) => true,
            Err(incompatibility) => {
                self.error(argument.span, &incompatibility.to_string());
                false
            }
        }
    }

    fn parameter_compatibility(
        &self,
        arguments: Option<&Valuation>,
        parameter: &Type,
        argument: &Expr,
    ) -> Result<(), Incompatibility> {
        let reference = parameter.has_prefix(Prefixes::REFERENCE);
        let constant = parameter.has_prefix(Prefixes::CONSTANT);
        let mut lhs = self.is_lhs_value(argument);
        let mut argument_ty = argument.ty.clone();

        if !reference {
            if parameter.is_integer() && argument_ty.base() == Base::Bool {
                argument_ty = Type::ranged_int(Expr::constant(0), Expr::constant(1));
                lhs = false;
            }
            if parameter.base() == Base::Bool && argument_ty.is_integer() {
                argument_ty = Type::bool();
                lhs = false;
            }
        }

        if reference && !constant && !lhs {
            return Err(Incompatibility::NotLeftValue);
        }

        let mut parameter_ty = parameter;
        let mut arg_ty = &argument_ty;
        while let Some((parameter_size, parameter_element)) = parameter_ty.array_parts() {
            let Some((argument_size, argument_element)) = arg_ty.array_parts() else {
                return Err(Incompatibility::ArrayShape);
            };
            if !same_array_size(argument_size, parameter_size) {
                return Err(Incompatibility::ArrayShape);
            }
            parameter_ty = parameter_element;
            arg_ty = argument_element;
        }

        if parameter_ty.base() != arg_ty.base() {
            return Err(Incompatibility::BaseType);
        }

        match parameter_ty.base() {
            Base::Int => {
                let base = self.interpreter();
                let interpreter = match arguments {
                    Some(extra) => base.with_valuation(extra),
                    None => base,
                };
                integer_compatibility(&interpreter, parameter_ty, arg_ty, argument, lhs)
            }
            Base::Record if parameter_ty.record_fields() != arg_ty.record_fields() => {
                Err(Incompatibility::StructuralMismatch)
            }
            Base::Channel
                if ChannelCapability::of(arg_ty) < ChannelCapability::of(parameter_ty) =>
            {
                Err(Incompatibility::ChannelCapability)
            }
            Base::Scalar if !parameter_ty.is_same_scalar(arg_ty) => {
                Err(Incompatibility::StructuralMismatch)
            }
            _ => Ok(()),
        }
    }
}

fn integer_compatibility(
    interpreter: &Interpreter<'_>,
    parameter: &Type,
    argument_ty: &Type,
    argument: &Expr,
    lhs: bool,
) -> Result<(), Incompatibility> {
    // Unranged parameters accept any integer
    if parameter.bounds().is_none() {
        return Ok(());
    }
    let reference = parameter.has_prefix(Prefixes::REFERENCE);
    let constant = parameter.has_prefix(Prefixes::CONSTANT);

    if lhs {
        // A location has no fixed value; compare declared ranges
        match (
            interpreter.evaluate_type_range(parameter),
            interpreter.evaluate_type_range(argument_ty),
        ) {
            (Ok(parameter_range), Ok(argument_range)) => {
                if reference && !constant && argument_range != parameter_range {
                    return Err(Incompatibility::RangeMismatch);
                }
                if reference && constant && !parameter_range.contains(&argument_range) {
                    return Err(Incompatibility::OutOfRange);
                }
                if parameter_range.intersect(&argument_range).is_empty() {
                    return Err(Incompatibility::OutOfRange);
                }
            }
            _ => {
                if reference && parameter.bounds() != argument_ty.bounds() {
                    return Err(Incompatibility::RangeMismatch);
                }
            }
        }
        return Ok(());
    }

    let computed = interpreter.evaluate_type_range(parameter).and_then(|range| {
        let values = interpreter.evaluate_all(argument)?;
        let hull = values
            .into_iter()
            .fold(Range::empty(), |hull, value| hull.join(&Range::point(value)));
        Ok((range, hull))
    });
    match computed {
        Ok((parameter_range, hull)) if !parameter_range.contains(&hull) => {
            Err(Incompatibility::OutOfRange)
        }
        Ok(_) => Ok(()),
        Err(reason) => {
            trace!(%reason, "argument range deferred to runtime");
            Ok(())
        }
    }
}
