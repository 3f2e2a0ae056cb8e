//! Observable Decorators
//!
//! A decorator binds one enhancer to a reusable member registration. It
//! replaces implicit member interception with an explicit call:
//!
//! ```rust,ignore
//! let todo = OBSERVABLE.object(IndexMap::new(), DecoratorMap::new(), OptionsArg::Absent)?;
//!
//! // members written later go through the bound enhancer
//! OBSERVABLE.reference.apply(&todo, "payload", None)?;
//! OBSERVABLE.deep.apply(&todo, "tags", Some(json!(["a"]).into()))?;
//! ```
//!
//! The four policy decorators are statics shared by the whole process.

use serde::{Deserialize, Deserializer};

use crate::error::Result;
use crate::types::{Enhancer, ObservableObject};
use crate::value::Value;

/// A reusable member annotation bound to one enhancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObservableDecorator {
    enhancer: Enhancer,
}

pub static DEEP_DECORATOR: ObservableDecorator = ObservableDecorator::new(Enhancer::Deep);
pub static SHALLOW_DECORATOR: ObservableDecorator = ObservableDecorator::new(Enhancer::Shallow);
pub static REF_DECORATOR: ObservableDecorator = ObservableDecorator::new(Enhancer::Reference);
pub static REF_STRUCT_DECORATOR: ObservableDecorator =
    ObservableDecorator::new(Enhancer::Structural);

impl ObservableDecorator {
    /// Bind `enhancer` to a new decorator.
    pub const fn new(enhancer: Enhancer) -> Self {
        Self { enhancer }
    }

    /// The bound enhancer.
    pub fn enhancer(&self) -> Enhancer {
        self.enhancer
    }

    /// The shared decorator for a policy name: `deep`, `shallow`, `ref`
    /// or `struct`.
    pub fn by_name(name: &str) -> Option<&'static ObservableDecorator> {
        match Enhancer::from_name(name)? {
            Enhancer::Deep => Some(&DEEP_DECORATOR),
            Enhancer::Shallow => Some(&SHALLOW_DECORATOR),
            Enhancer::Reference => Some(&REF_DECORATOR),
            Enhancer::Structural => Some(&REF_STRUCT_DECORATOR),
        }
    }

    /// Register `key` on `target` under this decorator's enhancer.
    ///
    /// With an initial value the member is created immediately and the
    /// value is enhanced; without one the member is declared and its first
    /// write is enhanced. Declaring a key that already exists is a no-op.
    pub fn apply(&self, target: &ObservableObject, key: &str, initial: Option<Value>) -> Result<()> {
        tracing::debug!(object = %target.name(), %key, enhancer = self.enhancer.name(), "applying decorator");
        match initial {
            Some(value) => target.define_property(key, value, self.enhancer),
            None => {
                target.declare_property(key, self.enhancer);
                Ok(())
            }
        }
    }
}

impl<'de> Deserialize<'de> for ObservableDecorator {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        ObservableDecorator::by_name(&name).copied().ok_or_else(|| {
            serde::de::Error::unknown_variant(&name, &["deep", "shallow", "ref", "struct"])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn singletons_bind_their_policies() {
        assert_eq!(DEEP_DECORATOR.enhancer(), Enhancer::Deep);
        assert_eq!(SHALLOW_DECORATOR.enhancer(), Enhancer::Shallow);
        assert_eq!(REF_DECORATOR.enhancer(), Enhancer::Reference);
        assert_eq!(REF_STRUCT_DECORATOR.enhancer(), Enhancer::Structural);
    }

    #[test]
    fn lookup_by_name_returns_the_singleton() {
        let found = ObservableDecorator::by_name("ref").unwrap();
        assert!(std::ptr::eq(found, &REF_DECORATOR));
        assert!(ObservableDecorator::by_name("computed").is_none());
    }

    #[test]
    fn apply_with_initial_value_enhances_it() {
        let target = ObservableObject::new(Enhancer::Reference, None);
        DEEP_DECORATOR
            .apply(&target, "items", Some(Value::from(json!([1, 2]))))
            .unwrap();

        assert!(target.get("items").is_observable());
        assert_eq!(target.enhancer_of("items"), Some(Enhancer::Deep));
    }

    #[test]
    fn apply_without_value_is_lazy() {
        let target = ObservableObject::new(Enhancer::Deep, None);
        REF_DECORATOR.apply(&target, "payload", None).unwrap();
        assert_eq!(target.get("payload"), Value::Undefined);

        target.set("payload", Value::from(json!({"a": 1}))).unwrap();
        assert_eq!(target.get("payload"), Value::from(json!({"a": 1})));
    }

    #[test]
    fn deserializes_from_policy_name() {
        let decorator: ObservableDecorator = serde_json::from_value(json!("struct")).unwrap();
        assert_eq!(decorator, REF_STRUCT_DECORATOR);
        assert!(serde_json::from_value::<ObservableDecorator>(json!("nope")).is_err());
    }
}
