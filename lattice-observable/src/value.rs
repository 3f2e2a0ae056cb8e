//! Dynamic Values
//!
//! [`Value`] is what flows into the observable factories: primitives,
//! plain structures, sequences, maps, opaque references and handles to
//! containers that are already reactive.
//!
//! The dispatcher never inspects a value ad hoc. It asks for its
//! [`ValueKind`] once and switches on that.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::types::Observable;

/// Integers below this magnitude survive an `f64` round trip.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Structural classification used for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Primitives, `null`, `undefined` and opaque references.
    Scalar,
    /// A plain key-value record.
    Structure,
    /// An ordered sequence.
    Sequence,
    /// An associative map.
    Map,
    /// A handle to an existing reactive container.
    AlreadyReactive,
}

/// A reference to a value the library does not know how to convert.
///
/// Compared by identity, never by content.
#[derive(Clone)]
pub struct OpaqueRef(Arc<dyn Any + Send + Sync>);

impl OpaqueRef {
    /// Wrap an arbitrary value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the wrapped value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// True if both refer to the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl PartialEq for OpaqueRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for OpaqueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueRef({:p})", Arc::as_ptr(&self.0))
    }
}

/// A dynamically typed value.
///
/// Equality (`==`) is value equality for plain data and identity for
/// opaque references and reactive containers; `NaN` equals `NaN`. Use
/// [`structurally_eq`](Value::structurally_eq) to look inside containers.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    /// A plain structure. Key order is preserved.
    Object(IndexMap<String, Value>),
    /// An associative map. Key order is preserved.
    Map(IndexMap<String, Value>),
    Opaque(OpaqueRef),
    Observable(Observable),
}

impl Value {
    /// Wrap an arbitrary Rust value as an opaque reference.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Value::Opaque(OpaqueRef::new(value))
    }

    /// Build an associative map from key-value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Classify this value for dispatch.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Observable(_) => ValueKind::AlreadyReactive,
            Value::Object(_) => ValueKind::Structure,
            Value::Array(_) => ValueKind::Sequence,
            Value::Map(_) => ValueKind::Map,
            _ => ValueKind::Scalar,
        }
    }

    /// True for handles to reactive containers.
    pub fn is_observable(&self) -> bool {
        matches!(self, Value::Observable(_))
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::Opaque(_) => "opaque reference",
            Value::Observable(o) => o.type_name(),
        }
    }

    pub fn as_observable(&self) -> Option<&Observable> {
        match self {
            Value::Observable(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Deep equality that looks through reactive containers.
    ///
    /// Two containers are equal when their current contents are; `NaN`
    /// equals `NaN`. Containers that refer back to themselves are compared
    /// once per pair, so cyclic graphs terminate.
    pub fn structurally_eq(&self, other: &Value) -> bool {
        self.eq_within(other, &mut SmallVec::new())
    }

    fn eq_within(&self, other: &Value, seen: &mut SmallVec<[(usize, usize); 8]>) -> bool {
        match (self, other) {
            (Value::Observable(a), Value::Observable(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                let pair = (a.addr(), b.addr());
                if seen.contains(&pair) {
                    return true;
                }
                seen.push(pair);
                let equal = a.contents().eq_within(&b.contents(), seen);
                seen.pop();
                equal
            }
            (Value::Observable(a), plain) => {
                same_shape(a, plain) && a.contents().eq_within(plain, seen)
            }
            (plain, Value::Observable(b)) => {
                same_shape(b, plain) && plain.eq_within(&b.contents(), seen)
            }
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_within(y, seen))
            }
            (Value::Object(a), Value::Object(b)) | (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.eq_within(w, seen)))
            }
            _ => self == other,
        }
    }

    /// Snapshot as JSON. Containers are read through, `undefined` and
    /// opaque references become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Undefined | Value::Null | Value::Opaque(_) => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => {
                Json::from(*n as i64)
            }
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(props) | Value::Map(props) => Json::Object(
                props
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Observable(o) => o.to_plain().to_json(),
        }
    }
}

/// Whether `plain` could equal the contents of `observable`. Boxes hold
/// any value; collections only match their own kind.
fn same_shape(observable: &Observable, plain: &Value) -> bool {
    match observable {
        Observable::Box(_) => true,
        Observable::Array(_) => matches!(plain, Value::Array(_)),
        Observable::Map(_) => matches!(plain, Value::Map(_)),
        Observable::Object(_) => matches!(plain, Value::Object(_)),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) | (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            (Value::Observable(a), Value::Observable(b)) => a == b,
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(props) => Value::Object(
                props
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(props: IndexMap<String, Value>) -> Self {
        Value::Object(props)
    }
}

impl From<Observable> for Value {
    fn from(observable: Observable) -> Self {
        Value::Observable(observable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Enhancer, ObservableObject};
    use serde_json::json;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(Value::from(json!({"a": 1})).kind(), ValueKind::Structure);
        assert_eq!(Value::from(json!([1, 2])).kind(), ValueKind::Sequence);
        assert_eq!(Value::map([("a", 1)]).kind(), ValueKind::Map);
        assert_eq!(Value::from(42).kind(), ValueKind::Scalar);
        assert_eq!(Value::from("literal").kind(), ValueKind::Scalar);
        assert_eq!(Value::Null.kind(), ValueKind::Scalar);
        assert_eq!(Value::Undefined.kind(), ValueKind::Scalar);
        assert_eq!(Value::opaque(7u8).kind(), ValueKind::Scalar);
    }

    #[test]
    fn opaque_values_compare_by_identity() {
        let a = Value::opaque(String::from("x"));
        let b = Value::opaque(String::from("x"));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        if let Value::Opaque(inner) = &a {
            assert_eq!(inner.downcast_ref::<String>().map(String::as_str), Some("x"));
        }
    }

    #[test]
    fn structural_equality_is_deep() {
        let a = Value::from(json!({"x": [1, 2, {"y": null}]}));
        let b = Value::from(json!({"x": [1, 2, {"y": null}]}));
        let c = Value::from(json!({"x": [1, 2, {"y": 0}]}));

        assert!(a.structurally_eq(&b));
        assert!(!a.structurally_eq(&c));
        assert!(Value::Number(f64::NAN).structurally_eq(&Value::Number(f64::NAN)));
    }

    #[test]
    fn nan_equals_nan() {
        assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_eq!(
            Value::Array(vec![Value::Number(f64::NAN)]),
            Value::Array(vec![Value::Number(f64::NAN)])
        );
        assert_ne!(Value::Number(f64::NAN), Value::Number(0.0));
    }

    #[test]
    fn containers_never_equal_mismatched_plain_values() {
        let object = Value::from(ObservableObject::new(Enhancer::Deep, None));
        assert!(!object.structurally_eq(&Value::Undefined));
        assert!(!Value::from(json!([])).structurally_eq(&object));
    }

    #[test]
    fn self_referencing_objects_compare_without_overflow() {
        let cyclic = |id: i32| {
            let object = ObservableObject::new(Enhancer::Deep, None);
            object.set("id", Value::from(id)).unwrap();
            object.set("me", Value::from(object.clone())).unwrap();
            Value::from(object)
        };
        let a = cyclic(1);
        let b = cyclic(1);
        let c = cyclic(2);

        assert!(a.structurally_eq(&a.clone()));
        assert!(a.structurally_eq(&b));
        assert!(!a.structurally_eq(&c));
        assert!(!a.structurally_eq(&Value::from(json!({"id": 1, "me": {}}))));
    }

    #[test]
    fn json_roundtrip_keeps_key_order() {
        let json = json!({"b": 1, "a": [true, "s"]});
        let value = Value::from(json.clone());

        if let Value::Object(props) = &value {
            let keys: Vec<&str> = props.keys().map(String::as_str).collect();
            assert_eq!(keys, ["b", "a"]);
        }
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn undefined_serializes_as_null() {
        assert_eq!(Value::Undefined.to_json(), serde_json::Value::Null);
    }
}
