//! Enhancers
//!
//! An enhancer decides what actually gets stored when a value is written
//! into a reactive container: the value itself, or a reactive container
//! built from it.
//!
//! | policy       | sequences / structures / maps      | other values |
//! |--------------|------------------------------------|--------------|
//! | `Deep`       | converted, children converted too  | unchanged    |
//! | `Shallow`    | converted, children kept as-is     | rejected     |
//! | `Reference`  | unchanged                          | unchanged    |
//! | `Structural` | unchanged, equal value keeps old   | same         |

use std::sync::Arc;

use crate::api::{CreateObservableOptions, DecoratorMap, OptionsArg, OBSERVABLE};
use crate::error::{ObservableError, Result};
use crate::types::Observable;
use crate::value::Value;

/// Conversion policy applied on every write into a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Enhancer {
    /// Recursively turn collections into reactive containers.
    Deep,
    /// Turn collections into containers whose children are references.
    Shallow,
    /// Store values as they are.
    Reference,
    /// Store values as they are, keeping the old value when the new one is
    /// structurally equal.
    Structural,
}

impl Enhancer {
    /// Every policy, in table order.
    pub const ALL: [Enhancer; 4] = [
        Enhancer::Deep,
        Enhancer::Shallow,
        Enhancer::Reference,
        Enhancer::Structural,
    ];

    /// Name used on the factory table (`observable.ref`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Enhancer::Deep => "deep",
            Enhancer::Shallow => "shallow",
            Enhancer::Reference => "ref",
            Enhancer::Structural => "struct",
        }
    }

    /// Look a policy up by its table name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    /// Compute the value to store when `new_value` replaces `old_value`
    /// in the container called `name`.
    pub fn enhance(self, new_value: Value, old_value: &Value, name: &str) -> Result<Value> {
        match self {
            Enhancer::Deep => deep_enhancer(new_value, name),
            Enhancer::Shallow => shallow_enhancer(new_value, name),
            Enhancer::Reference => Ok(new_value),
            Enhancer::Structural => Ok(if new_value.structurally_eq(old_value) {
                old_value.clone()
            } else {
                new_value
            }),
        }
    }
}

/// Pick the enhancer a configuration implies.
///
/// A default decorator always wins; otherwise `deep: false` selects
/// [`Enhancer::Reference`] and anything else [`Enhancer::Deep`].
pub fn enhancer_for(options: &CreateObservableOptions) -> Enhancer {
    match options.default_decorator {
        Some(decorator) => decorator.enhancer(),
        None if !options.deep => Enhancer::Reference,
        None => Enhancer::Deep,
    }
}

fn deep_enhancer(value: Value, name: &str) -> Result<Value> {
    let options = OptionsArg::Name(name.to_owned());
    Ok(match value {
        Value::Array(items) => OBSERVABLE.array(items, options)?.into(),
        Value::Object(props) => OBSERVABLE.object(props, DecoratorMap::new(), options)?.into(),
        Value::Map(entries) => OBSERVABLE.map(entries, options)?.into(),
        other => other,
    })
}

fn shallow_enhancer(value: Value, name: &str) -> Result<Value> {
    let options = || OptionsArg::Record(Arc::new(CreateObservableOptions::shallow(name)));
    Ok(match value {
        Value::Undefined | Value::Null => value,
        Value::Observable(Observable::Array(_) | Observable::Map(_) | Observable::Object(_)) => {
            value
        }
        Value::Array(items) => OBSERVABLE.array(items, options())?.into(),
        Value::Object(props) => OBSERVABLE.object(props, DecoratorMap::new(), options())?.into(),
        Value::Map(entries) => OBSERVABLE.map(entries, options())?.into(),
        _ => return Err(ObservableError::ShallowModifierMisuse),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DEEP_DECORATOR, REF_STRUCT_DECORATOR};
    use serde_json::json;

    #[test]
    fn names_roundtrip() {
        for enhancer in Enhancer::ALL {
            assert_eq!(Enhancer::from_name(enhancer.name()), Some(enhancer));
        }
        assert_eq!(Enhancer::from_name("bogus"), None);
    }

    #[test]
    fn deep_converts_collections() {
        let value = Value::from(json!({"a": [1, 2]}));
        let enhanced = Enhancer::Deep
            .enhance(value, &Value::Undefined, "owner")
            .unwrap();

        let object = enhanced.as_observable().and_then(Observable::as_object).unwrap();
        assert_eq!(object.name(), "owner");
        assert!(matches!(object.get("a"), Value::Observable(Observable::Array(_))));
    }

    #[test]
    fn deep_leaves_scalars_alone() {
        let enhanced = Enhancer::Deep
            .enhance(Value::from(3), &Value::Undefined, "n")
            .unwrap();
        assert_eq!(enhanced, Value::from(3));
    }

    #[test]
    fn shallow_does_not_recurse() {
        let value = Value::from(json!([{"b": 1}]));
        let enhanced = Enhancer::Shallow
            .enhance(value, &Value::Undefined, "list")
            .unwrap();

        let array = enhanced.as_observable().and_then(Observable::as_array).unwrap();
        assert_eq!(array.enhancer(), Enhancer::Reference);
        assert_eq!(array.get(0), Some(Value::from(json!({"b": 1}))));
    }

    #[test]
    fn shallow_rejects_scalars() {
        let err = Enhancer::Shallow
            .enhance(Value::from(1), &Value::Undefined, "n")
            .unwrap_err();
        assert!(matches!(err, ObservableError::ShallowModifierMisuse));

        assert_eq!(
            Enhancer::Shallow
                .enhance(Value::Null, &Value::Undefined, "n")
                .unwrap(),
            Value::Null
        );
    }

    #[test]
    fn structural_keeps_equal_old_value() {
        let old = Value::from(json!({"x": 1}));
        let kept = Enhancer::Structural
            .enhance(Value::from(json!({"x": 1})), &old, "s")
            .unwrap();
        assert_eq!(kept, old);

        let replaced = Enhancer::Structural
            .enhance(Value::from(json!({"x": 2})), &old, "s")
            .unwrap();
        assert_eq!(replaced, Value::from(json!({"x": 2})));
    }

    #[test]
    fn reference_passes_through() {
        let value = Value::from(json!([1]));
        assert_eq!(
            Enhancer::Reference
                .enhance(value.clone(), &Value::Undefined, "r")
                .unwrap(),
            value
        );
    }

    #[test]
    fn decorator_overrides_deep_flag() {
        let options = CreateObservableOptions {
            name: None,
            deep: false,
            default_decorator: Some(DEEP_DECORATOR),
        };
        assert_eq!(enhancer_for(&options), Enhancer::Deep);

        let options = CreateObservableOptions {
            default_decorator: Some(REF_STRUCT_DECORATOR),
            ..CreateObservableOptions::default()
        };
        assert_eq!(enhancer_for(&options), Enhancer::Structural);
    }

    #[test]
    fn deep_flag_selects_reference_or_deep() {
        assert_eq!(enhancer_for(&CreateObservableOptions::default()), Enhancer::Deep);
        assert_eq!(
            enhancer_for(&CreateObservableOptions::shallow("x")),
            Enhancer::Reference
        );
    }
}
