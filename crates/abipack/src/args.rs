//! Argument list building: from one input container (or a positional list)
//! to the ordered typed arguments of a method, and on to the encoder.

use crate::coerce::{coerce, coerce_field};
use crate::error::{Error, ErrorKind, PackError};
use crate::resolve::Field;
use crate::typed::TypedValue;
use crate::types::{Method, Param};
use crate::value::DynamicValue;

/// Source of method descriptors. Implementations are immutable while in use.
pub trait SchemaProvider {
    fn method_by_name(&self, name: &str) -> Option<&Method>;
    fn method_by_selector(&self, selector: &[u8]) -> Option<&Method>;
}

/// Binary call encoder. Must accept exactly the [`TypedValue`] shapes this
/// crate produces for each declared type.
pub trait Encoder {
    type Error;

    fn encode(&self, method: &Method, args: &[TypedValue]) -> Result<Vec<u8>, Self::Error>;
}

/// Resolves and coerces every parameter against `input`, in declared order.
/// Stops at the first failure, tagged with the parameter's name and type.
pub fn to_args(params: &[Param], input: &DynamicValue) -> Result<Vec<TypedValue>, Error> {
    let mut out = Vec::with_capacity(params.len());
    for (idx, param) in params.iter().enumerate() {
        tracing::debug!(idx, param = %param.name, ty = %param.ty, "coerce param");
        let v = coerce_field(&param.ty, Field::Named(&param.name), input)
            .map_err(|e| e.at_field(&param.name).for_param(&param.name, &param.ty))?;
        out.push(v);
    }
    Ok(out)
}

/// Coerces an already-ordered argument list, one value per parameter.
pub fn coerce_positional(params: &[Param], args: &[DynamicValue]) -> Result<Vec<TypedValue>, Error> {
    check_arg_count(params.len(), args.len())?;
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            coerce(&param.ty, arg)
                .map_err(|e| e.at_field(&param.name).for_param(&param.name, &param.ty))
        })
        .collect()
}

fn check_arg_count(expected: usize, got: usize) -> Result<(), Error> {
    if expected != got {
        return Err(Error::new(
            ErrorKind::ArgumentCountMismatch,
            format!("expected {expected} arguments, but got {got}"),
        ));
    }
    Ok(())
}

/// Drives schema lookup, coercion and encoding. Holds its collaborators by
/// reference; nothing is cached between calls.
pub struct ArgPacker<'a, S, E> {
    schema: &'a S,
    encoder: &'a E,
}

impl<S, E> Clone for ArgPacker<'_, S, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, E> Copy for ArgPacker<'_, S, E> {}

impl<'a, S: SchemaProvider, E: Encoder> ArgPacker<'a, S, E> {
    pub fn new(schema: &'a S, encoder: &'a E) -> Self {
        ArgPacker { schema, encoder }
    }

    pub fn method(&self, name: &str) -> Result<&'a Method, Error> {
        self.schema
            .method_by_name(name)
            .ok_or_else(|| Error::method_not_found(format!("{name:?}")))
    }

    pub fn method_by_selector(&self, selector: &[u8]) -> Result<&'a Method, Error> {
        self.schema
            .method_by_selector(selector)
            .ok_or_else(|| Error::method_not_found(format!("selector 0x{}", hex::encode(selector))))
    }

    pub fn coerce_by_name(&self, name: &str, input: &DynamicValue) -> Result<Vec<TypedValue>, Error> {
        let method = self.method(name)?;
        tracing::debug!(method = %method.name, "coerce by name");
        to_args(&method.inputs, input)
    }

    pub fn coerce_by_selector(
        &self,
        selector: &[u8],
        input: &DynamicValue,
    ) -> Result<Vec<TypedValue>, Error> {
        let method = self.method_by_selector(selector)?;
        tracing::debug!(method = %method.name, "coerce by selector");
        to_args(&method.inputs, input)
    }

    /// Packs a call from one aggregate input container.
    pub fn pack_any(&self, name: &str, input: &DynamicValue) -> Result<Vec<u8>, PackError<E::Error>> {
        let method = self.method(name)?;
        let args = to_args(&method.inputs, input).map_err(log_failure)?;
        self.encode(method, &args)
    }

    /// Same as [`ArgPacker::pack_any`], with the method looked up by selector.
    pub fn pack_by_selector(
        &self,
        selector: &[u8],
        input: &DynamicValue,
    ) -> Result<Vec<u8>, PackError<E::Error>> {
        let method = self.method_by_selector(selector)?;
        let args = to_args(&method.inputs, input).map_err(log_failure)?;
        self.encode(method, &args)
    }

    /// Packs pre-typed positional arguments; only the count is checked.
    pub fn pack_args(
        &self,
        name: &str,
        args: &[TypedValue],
    ) -> Result<Vec<u8>, PackError<E::Error>> {
        let method = self.method(name)?;
        check_arg_count(method.inputs.len(), args.len())?;
        self.encode(method, args)
    }

    /// Coerces loosely-typed positional arguments, then packs them.
    pub fn pack_positional(
        &self,
        name: &str,
        args: &[DynamicValue],
    ) -> Result<Vec<u8>, PackError<E::Error>> {
        let method = self.method(name)?;
        let typed = coerce_positional(&method.inputs, args).map_err(log_failure)?;
        self.encode(method, &typed)
    }

    fn encode(&self, method: &Method, args: &[TypedValue]) -> Result<Vec<u8>, PackError<E::Error>> {
        tracing::debug!(method = %method.name, args = args.len(), "encode");
        self.encoder.encode(method, args).map_err(PackError::Encode)
    }
}

fn log_failure(err: Error) -> Error {
    tracing::debug!(code = err.code(), path = %err.path(), "coercion failed: {}", err.message);
    err
}
