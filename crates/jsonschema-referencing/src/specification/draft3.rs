use serde_json::Value;

use crate::{segments::Segment, Error, Resolver, ResourceRef, Segments};

use super::subresources::SubresourceIterator;

pub(crate) fn subresources_of(contents: &Value) -> SubresourceIterator<'_> {
    match contents.as_object() {
        Some(schema) => Box::new(schema.iter().flat_map(|(key, value)| match key.as_str() {
            "additionalProperties" | "additionalItems" => {
                Box::new(std::iter::once(value)) as SubresourceIterator<'_>
            }
            "extends" | "items" => match value {
                Value::Array(arr) => Box::new(arr.iter()) as SubresourceIterator<'_>,
                _ => Box::new(std::iter::once(value)),
            },
            "properties" | "patternProperties" => {
                Box::new(value.as_object().into_iter().flat_map(|o| o.values()))
            }
            // `type` and `disallow` can mix type-name strings with inline schemas.
            "type" | "disallow" => match value {
                Value::Array(arr) => {
                    Box::new(arr.iter().filter(|item| item.is_object())) as SubresourceIterator<'_>
                }
                Value::Object(_) => Box::new(std::iter::once(value)),
                _ => Box::new(std::iter::empty()),
            },
            _ => Box::new(std::iter::empty()),
        })),
        None => Box::new(std::iter::empty()),
    }
}

pub(crate) fn maybe_in_subresource<'r>(
    segments: &Segments,
    resolver: &Resolver<'r>,
    subresource: ResourceRef<'r>,
) -> Result<Resolver<'r>, Error> {
    const IN_VALUE: &[&str] = &["additionalProperties", "additionalItems"];
    const IN_CHILD: &[&str] = &["properties", "patternProperties"];

    let mut iter = segments.iter();
    while let Some(segment) = iter.next() {
        if let Segment::Key(key) = segment {
            if (*key == "items" || *key == "extends" || *key == "type" || *key == "disallow")
                && subresource.contents().is_object()
            {
                return resolver.in_subresource(subresource);
            }
            if !IN_VALUE.contains(&key.as_ref())
                && (!IN_CHILD.contains(&key.as_ref()) || iter.next().is_none())
            {
                return Ok(resolver.clone());
            }
        }
    }
    resolver.in_subresource(subresource)
}
