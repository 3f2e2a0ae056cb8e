//! Reactive Containers
//!
//! The four container kinds the factories construct, plus the enhancer
//! policies that govern what is stored inside them.
//!
//! - [`ObservableValue`]: a boxed single value.
//! - [`ObservableArray`]: an ordered sequence.
//! - [`ObservableMap`]: an associative map.
//! - [`ObservableObject`]: a dynamically extensible structure.
//!
//! All of them are cheap-to-clone handles around shared state, and all of
//! them report reads and writes to the tracking layer in
//! [`crate::reactive`].

mod modifiers;
mod observable_array;
mod observable_map;
mod observable_object;
mod observable_value;

pub use modifiers::{enhancer_for, Enhancer};
pub use observable_array::ObservableArray;
pub use observable_map::ObservableMap;
pub use observable_object::ObservableObject;
pub use observable_value::ObservableValue;

use smallvec::SmallVec;

use crate::value::Value;

/// Handle to any reactive container.
#[derive(Debug, Clone)]
pub enum Observable {
    Box(ObservableValue),
    Array(ObservableArray),
    Map(ObservableMap),
    Object(ObservableObject),
}

impl Observable {
    /// True if both handles refer to the same container.
    pub fn ptr_eq(&self, other: &Observable) -> bool {
        match (self, other) {
            (Observable::Box(a), Observable::Box(b)) => a.ptr_eq(b),
            (Observable::Array(a), Observable::Array(b)) => a.ptr_eq(b),
            (Observable::Map(a), Observable::Map(b)) => a.ptr_eq(b),
            (Observable::Object(a), Observable::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Observable::Box(b) => b.name(),
            Observable::Array(a) => a.name(),
            Observable::Map(m) => m.name(),
            Observable::Object(o) => o.name(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Observable::Box(_) => "observable value",
            Observable::Array(_) => "observable array",
            Observable::Map(_) => "observable map",
            Observable::Object(_) => "observable object",
        }
    }

    /// Enhancer applied to values written into the container. For objects
    /// this is the default used for newly added members.
    pub fn enhancer(&self) -> Enhancer {
        match self {
            Observable::Box(b) => b.enhancer(),
            Observable::Array(a) => a.enhancer(),
            Observable::Map(m) => m.enhancer(),
            Observable::Object(o) => o.default_enhancer(),
        }
    }

    pub fn as_box(&self) -> Option<&ObservableValue> {
        match self {
            Observable::Box(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ObservableArray> {
        match self {
            Observable::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ObservableMap> {
        match self {
            Observable::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObservableObject> {
        match self {
            Observable::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Address of the shared container state.
    pub(crate) fn addr(&self) -> usize {
        match self {
            Observable::Box(b) => b.addr(),
            Observable::Array(a) => a.addr(),
            Observable::Map(m) => m.addr(),
            Observable::Object(o) => o.addr(),
        }
    }

    /// One level of contents. Nested containers stay as handles.
    pub(crate) fn contents(&self) -> Value {
        match self {
            Observable::Box(b) => b.get(),
            Observable::Array(a) => Value::Array(a.to_vec()),
            Observable::Map(m) => Value::Map(m.entries()),
            Observable::Object(o) => Value::Object(o.entries()),
        }
    }

    /// Deep snapshot with every nested container replaced by plain data.
    ///
    /// A container reached again through its own contents is cut off and
    /// becomes `Undefined`.
    pub fn to_plain(&self) -> Value {
        self.plain_within(&mut SmallVec::new())
    }

    fn plain_within(&self, path: &mut SmallVec<[usize; 8]>) -> Value {
        let addr = self.addr();
        if path.contains(&addr) {
            return Value::Undefined;
        }
        path.push(addr);
        let plain = unwrap_nested(self.contents(), path);
        path.pop();
        plain
    }
}

fn unwrap_nested(value: Value, path: &mut SmallVec<[usize; 8]>) -> Value {
    match value {
        Value::Observable(o) => o.plain_within(path),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| unwrap_nested(item, path))
                .collect(),
        ),
        Value::Object(props) => Value::Object(
            props
                .into_iter()
                .map(|(k, v)| (k, unwrap_nested(v, path)))
                .collect(),
        ),
        Value::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k, unwrap_nested(v, path)))
                .collect(),
        ),
        other => other,
    }
}

impl PartialEq for Observable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

macro_rules! observable_conversions {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Observable {
                fn from(container: $ty) -> Self {
                    Observable::$variant(container)
                }
            }

            impl From<$ty> for Value {
                fn from(container: $ty) -> Self {
                    Value::Observable(Observable::$variant(container))
                }
            }
        )*
    };
}

observable_conversions! {
    Box => ObservableValue,
    Array => ObservableArray,
    Map => ObservableMap,
    Object => ObservableObject,
}
