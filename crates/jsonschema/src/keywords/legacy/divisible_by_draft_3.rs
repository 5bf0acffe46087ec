use crate::{
    compiler,
    error::ValidationError,
    keywords::multiple_of::{MultipleOfFloatValidator, MultipleOfIntegerValidator},
    keywords::CompilationResult,
    paths::JsonPointer,
    primitive_type::PrimitiveType,
};
use serde_json::{Map, Value};

/// Draft 3's `divisibleBy`, superseded by `multipleOf` in later drafts but otherwise identical.
#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    if let Value::Number(divisible_by) = schema {
        let divisible_by = divisible_by.as_f64().expect("Always valid");
        let schema_path = ctx.as_pointer_with("divisibleBy");
        if divisible_by.fract() == 0. {
            Some(MultipleOfIntegerValidator::compile(divisible_by, schema_path))
        } else {
            Some(MultipleOfFloatValidator::compile(divisible_by, schema_path))
        }
    } else {
        Some(Err(ValidationError::single_type_error(
            JsonPointer::default(),
            ctx.clone().into_pointer(),
            schema,
            PrimitiveType::Number,
        )))
    }
}
