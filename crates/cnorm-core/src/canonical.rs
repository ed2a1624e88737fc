//! # Canonical Serialization: JCS Byte Production
//!
//! `CanonicalBytes` is the sole construction path for bytes that feed a
//! document identity. Two documents with the same normative content must
//! hash to the same identity on every machine, so the encoding cannot rely on
//! map iteration order or on a language's default string representation.
//!
//! ## Rules
//!
//! 1. **Reject floats.** Values are booleans, integers or strings; a float
//!    in a document is a data error, and JCS number formatting has edge cases.
//! 2. **Sorted keys, compact separators.** Serialization uses `serde_jcs`
//!    (RFC 8785), which yields one byte sequence per logical JSON value.
//! 3. **Strip volatile fields first.** Callers remove free text and
//!    bookkeeping fields (see [`CanonicalBytes::without_fields`]) before
//!    hashing.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructors are [`CanonicalBytes::new()`] and
///   [`CanonicalBytes::without_fields()`].
/// - No float appears anywhere in the encoded value.
/// - Object keys are sorted, separators are compact (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// float, `CanonicalizationError::SerializationFailed` if JSON conversion
    /// or JCS serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Construct canonical bytes from a serializable object after removing
    /// the named top-level fields.
    ///
    /// Used for identity computation, where free-text documentation and the
    /// identity field itself must not influence the digest. Non-object values
    /// are canonicalized unchanged.
    pub fn without_fields(
        obj: &impl Serialize,
        excluded: &[&str],
    ) -> Result<Self, CanonicalizationError> {
        let mut value = serde_json::to_value(obj)?;
        if let Value::Object(map) = &mut value {
            for field in excluded {
                map.remove(*field);
            }
        }
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Walk a JSON tree and fail on the first non-integral number.
fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Object(map) => map.values().try_for_each(reject_floats),
        Value::Array(arr) => arr.iter().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_str(cb: &CanonicalBytes) -> &str {
        std::str::from_utf8(cb.as_bytes()).unwrap()
    }

    #[test]
    fn sorts_keys_with_compact_separators() {
        let data = serde_json::json!({"type": "Policy", "name": "p", "allowed": {"b": [1], "a": [2]}});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(
            as_str(&cb),
            r#"{"allowed":{"a":[2],"b":[1]},"name":"p","type":"Policy"}"#
        );
    }

    #[test]
    fn without_fields_drops_top_level_keys_only() {
        let data = serde_json::json!({"doc": "x", "id": "y", "nested": {"doc": "kept"}});
        let cb = CanonicalBytes::without_fields(&data, &["doc", "id"]).unwrap();
        assert_eq!(as_str(&cb), r#"{"nested":{"doc":"kept"}}"#);
    }

    #[test]
    fn without_fields_ignores_missing_keys() {
        let data = serde_json::json!({"a": 1});
        let cb = CanonicalBytes::without_fields(&data, &["ts"]).unwrap();
        assert_eq!(as_str(&cb), r#"{"a":1}"#);
    }

    #[test]
    fn float_rejected_anywhere_in_tree() {
        let data = serde_json::json!({"allowed": {"p": [1, 2.5]}});
        match CanonicalBytes::new(&data) {
            Err(CanonicalizationError::FloatRejected(f)) => assert_eq!(f, 2.5),
            other => panic!("expected FloatRejected, got: {other:?}"),
        }
    }

    #[test]
    fn integers_and_bools_pass_through() {
        let data = serde_json::json!({"n": -42, "big": 9999999999i64, "flag": true, "nil": null});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(as_str(&cb), r#"{"big":9999999999,"flag":true,"n":-42,"nil":null}"#);
    }

    #[test]
    fn empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), 2);
    }

    #[test]
    fn unicode_passes_through_unescaped() {
        let data = serde_json::json!({"name": "\u{00e9}t\u{00e9}"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert!(as_str(&cb).contains('\u{00e9}'));
    }
}
