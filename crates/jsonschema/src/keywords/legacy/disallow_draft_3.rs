use crate::{
    compiler,
    error::{error, no_error, ErrorIterator, ValidationError},
    keywords::CompilationResult,
    paths::{JsonPointer, JsonPointerNode},
    primitive_type::{PrimitiveType, PrimitiveTypesBitMap},
    validator::Validate,
};
use serde_json::{Map, Value};
use std::convert::TryFrom;

/// Draft 3's `disallow`, the inverse of `type`: the instance must NOT match any listed type.
pub(crate) struct DisallowValidator {
    types: PrimitiveTypesBitMap,
    schema_path: JsonPointer,
}

impl DisallowValidator {
    #[inline]
    pub(crate) fn compile<'a>(types: PrimitiveTypesBitMap, schema_path: JsonPointer) -> CompilationResult<'a> {
        Ok(Box::new(DisallowValidator { types, schema_path }))
    }
}

impl Validate for DisallowValidator {
    fn is_valid(&self, instance: &Value) -> bool {
        let matches = match instance {
            Value::Array(_) => self.types.contains_type(PrimitiveType::Array),
            Value::Bool(_) => self.types.contains_type(PrimitiveType::Boolean),
            Value::Null => self.types.contains_type(PrimitiveType::Null),
            Value::Number(num) => {
                self.types.contains_type(PrimitiveType::Number)
                    || (self.types.contains_type(PrimitiveType::Integer)
                        && (num.is_u64() || num.is_i64()))
            }
            Value::Object(_) => self.types.contains_type(PrimitiveType::Object),
            Value::String(_) => self.types.contains_type(PrimitiveType::String),
        };
        !matches
    }

    fn validate<'instance>(
        &self,
        instance: &'instance Value,
        instance_path: &JsonPointerNode,
    ) -> ErrorIterator<'instance> {
        if self.is_valid(instance) {
            no_error()
        } else {
            error(ValidationError::multiple_type_error(
                self.schema_path.clone(),
                instance_path.into(),
                instance,
                self.types,
            ))
        }
    }
}

fn types_from_value(item: &Value, schema_path: &JsonPointer) -> Result<PrimitiveTypesBitMap, ValidationError<'static>> {
    match item {
        Value::String(string) => {
            if let Ok(primitive_type) = PrimitiveType::try_from(string.as_str()) {
                Ok(PrimitiveTypesBitMap::new().add_type(primitive_type))
            } else {
                Err(ValidationError::null_schema())
            }
        }
        Value::Array(items) => {
            let mut types = PrimitiveTypesBitMap::new();
            for item in items {
                if let Value::String(string) = item {
                    if let Ok(primitive_type) = PrimitiveType::try_from(string.as_str()) {
                        types |= primitive_type;
                        continue;
                    }
                }
                return Err(ValidationError::single_type_error(
                    JsonPointer::default(),
                    schema_path.clone(),
                    item,
                    PrimitiveType::String,
                ));
            }
            Ok(types)
        }
        _ => Err(ValidationError::single_type_error(
            JsonPointer::default(),
            schema_path.clone(),
            item,
            PrimitiveType::String,
        )),
    }
}

#[inline]
pub(crate) fn compile<'a>(
    ctx: &compiler::Context,
    _: &'a Map<String, Value>,
    schema: &'a Value,
) -> Option<CompilationResult<'a>> {
    let schema_path = ctx.as_pointer_with("disallow");
    match types_from_value(schema, &schema_path) {
        Ok(types) => Some(DisallowValidator::compile(types, schema_path)),
        Err(error) => Some(Err(error)),
    }
}
