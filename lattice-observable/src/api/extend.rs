//! Extending observable objects with new members.

use indexmap::IndexMap;

use super::decorator::{ObservableDecorator, DEEP_DECORATOR, REF_DECORATOR};
use super::options::CreateObservableOptions;
use crate::error::{ObservableError, Result};
use crate::types::ObservableObject;
use crate::value::Value;

/// Per-member decorator overrides, keyed by member name.
pub type DecoratorMap = IndexMap<String, ObservableDecorator>;

/// Add every entry of `props` to `target`.
///
/// Members listed in `decorators` use that decorator; all others use the
/// options' default decorator, or the deep/ref decorator picked by
/// `options.deep`. In debug builds a decorator for a key missing from
/// `props` is rejected.
pub fn extend_observable(
    target: &ObservableObject,
    props: IndexMap<String, Value>,
    decorators: &DecoratorMap,
    options: &CreateObservableOptions,
) -> Result<()> {
    if cfg!(debug_assertions) {
        if let Some(key) = decorators.keys().find(|key| !props.contains_key(*key)) {
            return Err(ObservableError::DecoratorForUnknownProperty(key.clone()));
        }
    }

    let default_decorator = options.default_decorator.unwrap_or(if options.deep {
        DEEP_DECORATOR
    } else {
        REF_DECORATOR
    });

    for (key, value) in props {
        let decorator = decorators.get(&key).unwrap_or(&default_decorator);
        decorator.apply(target, &key, Some(value))?;
    }
    Ok(())
}
