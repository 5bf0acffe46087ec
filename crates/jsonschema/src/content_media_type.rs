//! Validation of the `contentMediaType` keyword's well-known media types.
use ahash::AHashMap;
use once_cell::sync::Lazy;
use serde_json::Value;

/// A function that checks if a decoded string conforms to a given media type.
pub(crate) type ContentMediaTypeCheckType = fn(&str) -> bool;

fn is_json(instance_string: &str) -> bool {
    serde_json::from_str::<Value>(instance_string).is_ok()
}

pub(crate) static DEFAULT_CONTENT_MEDIA_TYPE_CHECKS: Lazy<
    AHashMap<&'static str, ContentMediaTypeCheckType>,
> = Lazy::new(|| {
    let mut map: AHashMap<&'static str, ContentMediaTypeCheckType> = AHashMap::new();
    map.insert("application/json", is_json);
    map
});
