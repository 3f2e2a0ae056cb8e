//! The Observable Factory Table
//!
//! [`OBSERVABLE`] is the public surface: typed factories (`boxed`, `array`,
//! `map`, `object` and their deprecated shallow aliases), the four policy
//! decorators, the polymorphic entry point [`call`], and a name-addressed
//! [`invoke`] for callers that only have positional [`Arguments`].
//!
//! # Dispatch
//!
//! [`call`] looks at its arguments in a fixed order:
//!
//! 1. A property key in second position means member decoration: the deep
//!    decorator is applied to the target object.
//! 2. A container that is already reactive is returned unchanged.
//! 3. Structures go to `object`, sequences to `array`, maps to `map`.
//! 4. Everything else is rejected; scalars must be boxed explicitly.
//!
//! [`call`]: ObservableFactories::call
//! [`invoke`]: ObservableFactories::invoke

use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::decorator::{
    ObservableDecorator, DEEP_DECORATOR, REF_DECORATOR, REF_STRUCT_DECORATOR, SHALLOW_DECORATOR,
};
use super::deprecation::deprecated;
use super::extend::{extend_observable, DecoratorMap};
use super::options::{
    resolve_options, shallow_create_observable_options, CreateObservableOptions, OptionsArg,
};
use crate::error::{ObservableError, Result};
use crate::types::{
    enhancer_for, Observable, ObservableArray, ObservableMap, ObservableObject, ObservableValue,
};
use crate::value::Value;

/// One positional argument of a dynamic call.
#[derive(Debug, Clone)]
pub enum Argument {
    Value(Value),
    /// A property name; in second position it marks member decoration.
    Key(String),
    Options(OptionsArg),
    Decorators(DecoratorMap),
}

impl Argument {
    /// A property-name argument.
    pub fn key(key: impl Into<String>) -> Self {
        Argument::Key(key.into())
    }

    fn describe(&self) -> &'static str {
        match self {
            Argument::Value(value) => value.type_name(),
            Argument::Key(_) => "property key",
            Argument::Options(_) => "options",
            Argument::Decorators(_) => "decorator map",
        }
    }
}

macro_rules! value_arguments {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Argument {
                fn from(value: $ty) -> Self {
                    Argument::Value(Value::from(value))
                }
            }
        )*
    };
}

value_arguments!(
    bool,
    f64,
    i32,
    u32,
    &str,
    String,
    Vec<Value>,
    serde_json::Value,
    Observable,
    ObservableValue,
    ObservableArray,
    ObservableMap,
    ObservableObject,
);

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::Value(value)
    }
}

impl From<OptionsArg> for Argument {
    fn from(options: OptionsArg) -> Self {
        Argument::Options(options)
    }
}

impl From<CreateObservableOptions> for Argument {
    fn from(options: CreateObservableOptions) -> Self {
        Argument::Options(options.into())
    }
}

impl From<DecoratorMap> for Argument {
    fn from(decorators: DecoratorMap) -> Self {
        Argument::Decorators(decorators)
    }
}

/// Positional arguments of a dynamic call. Factories take at most three.
pub type Arguments = SmallVec<[Argument; 3]>;

/// Build [`Arguments`] from anything convertible into [`Argument`].
///
/// ```rust,ignore
/// let args = arguments![json!([1, 2, 3]), json!({"name": "nums"})];
/// ```
#[macro_export]
macro_rules! arguments {
    ($($arg:expr),* $(,)?) => {
        <$crate::api::Arguments>::from_iter([$($crate::api::Argument::from($arg)),*])
    };
}

fn is_absent(arg: &Option<Argument>) -> bool {
    matches!(
        arg,
        None | Some(Argument::Value(Value::Undefined | Value::Null))
    )
}

fn take_value(arg: Option<Argument>, factory: &str, position: usize) -> Result<Value> {
    match arg {
        None => Ok(Value::Undefined),
        Some(Argument::Value(value)) => Ok(value),
        Some(_) => Err(ObservableError::unexpected_argument(factory, position, "a value")),
    }
}

fn take_options(arg: Option<Argument>, factory: &str, position: usize) -> Result<OptionsArg> {
    if is_absent(&arg) {
        return Ok(OptionsArg::Absent);
    }
    match arg {
        Some(Argument::Options(options)) => Ok(options),
        Some(Argument::Value(Value::String(name))) => Ok(OptionsArg::Name(name)),
        Some(Argument::Value(value @ Value::Object(_))) => Ok(OptionsArg::Json(value.to_json())),
        _ => Err(ObservableError::unexpected_argument(
            factory,
            position,
            "an options object or name",
        )),
    }
}

fn take_name(arg: Option<Argument>, factory: &str, position: usize) -> Result<Option<String>> {
    if is_absent(&arg) {
        return Ok(None);
    }
    match arg {
        Some(Argument::Value(Value::String(name)))
        | Some(Argument::Options(OptionsArg::Name(name))) => Ok(Some(name)),
        _ => Err(ObservableError::unexpected_argument(factory, position, "a name")),
    }
}

fn take_decorators(arg: Option<Argument>, factory: &str, position: usize) -> Result<DecoratorMap> {
    if is_absent(&arg) {
        return Ok(DecoratorMap::new());
    }
    let unexpected =
        || ObservableError::unexpected_argument(factory, position, "a map of decorator names");
    match arg {
        Some(Argument::Decorators(decorators)) => Ok(decorators),
        Some(Argument::Value(Value::Object(names))) => names
            .into_iter()
            .map(|(key, name)| -> Result<(String, ObservableDecorator)> {
                let decorator = name
                    .as_str()
                    .and_then(ObservableDecorator::by_name)
                    .ok_or_else(unexpected)?;
                Ok((key, *decorator))
            })
            .collect(),
        _ => Err(unexpected()),
    }
}

fn take_items(arg: Option<Argument>, factory: &str) -> Result<Vec<Value>> {
    if is_absent(&arg) {
        return Ok(Vec::new());
    }
    match arg {
        Some(Argument::Value(Value::Array(items))) => Ok(items),
        Some(Argument::Value(Value::Observable(Observable::Array(array)))) => Ok(array.to_vec()),
        _ => Err(ObservableError::unexpected_argument(factory, 0, "an array")),
    }
}

fn take_entries(arg: Option<Argument>, factory: &str) -> Result<IndexMap<String, Value>> {
    if is_absent(&arg) {
        return Ok(IndexMap::new());
    }
    match arg {
        Some(Argument::Value(Value::Map(entries) | Value::Object(entries))) => Ok(entries),
        Some(Argument::Value(Value::Observable(Observable::Map(map)))) => Ok(map.entries()),
        _ => Err(ObservableError::unexpected_argument(
            factory,
            0,
            "a map or plain object",
        )),
    }
}

fn take_props(arg: Option<Argument>, factory: &str) -> Result<IndexMap<String, Value>> {
    if is_absent(&arg) {
        return Ok(IndexMap::new());
    }
    match arg {
        Some(Argument::Value(Value::Object(props))) => Ok(props),
        _ => Err(ObservableError::unexpected_argument(factory, 0, "a plain object")),
    }
}

fn shallow_named(name: Option<&str>) -> OptionsArg {
    match name {
        Some(name) => CreateObservableOptions::shallow(name).into(),
        None => OptionsArg::Record(Arc::clone(shallow_create_observable_options())),
    }
}

/// The named factory surface, assembled once.
///
/// The policy fields are the shared decorator singletons themselves, used
/// as member annotations rather than called.
#[derive(Debug)]
pub struct ObservableFactories {
    /// Store members as references.
    pub reference: &'static ObservableDecorator,
    /// Convert members into shallow containers.
    pub shallow: &'static ObservableDecorator,
    /// Convert members recursively.
    pub deep: &'static ObservableDecorator,
    /// Store members as references, ignoring structurally equal writes.
    pub structural: &'static ObservableDecorator,
}

/// The factory table.
pub static OBSERVABLE: ObservableFactories = ObservableFactories {
    reference: &REF_DECORATOR,
    shallow: &SHALLOW_DECORATOR,
    deep: &DEEP_DECORATOR,
    structural: &REF_STRUCT_DECORATOR,
};

/// The default entry point: `OBSERVABLE.call(args)`.
pub fn observable(args: Arguments) -> Result<Observable> {
    OBSERVABLE.call(args)
}

impl ObservableFactories {
    /// Box a single value.
    pub fn boxed(
        &self,
        value: impl Into<Value>,
        options: impl Into<OptionsArg>,
    ) -> Result<ObservableValue> {
        let options = resolve_options(&options.into())?;
        ObservableValue::new(value.into(), enhancer_for(&options), options.name.clone())
    }

    #[deprecated(note = "use `boxed` with `CreateObservableOptions::shallow`")]
    pub fn shallow_box(&self, value: impl Into<Value>, name: Option<&str>) -> Result<ObservableValue> {
        deprecated("observable.shallowBox", "observable.box(value, { deep: false })");
        self.boxed(value, shallow_named(name))
    }

    /// Wrap a sequence.
    pub fn array(
        &self,
        initial: Vec<Value>,
        options: impl Into<OptionsArg>,
    ) -> Result<ObservableArray> {
        let options = resolve_options(&options.into())?;
        ObservableArray::new(initial, enhancer_for(&options), options.name.clone())
    }

    #[deprecated(note = "use `array` with `CreateObservableOptions::shallow`")]
    pub fn shallow_array(&self, initial: Vec<Value>, name: Option<&str>) -> Result<ObservableArray> {
        deprecated("observable.shallowArray", "observable.array(values, { deep: false })");
        self.array(initial, shallow_named(name))
    }

    /// Wrap an associative map.
    pub fn map(
        &self,
        initial: IndexMap<String, Value>,
        options: impl Into<OptionsArg>,
    ) -> Result<ObservableMap> {
        let options = resolve_options(&options.into())?;
        ObservableMap::new(initial, enhancer_for(&options), options.name.clone())
    }

    #[deprecated(note = "use `map` with `CreateObservableOptions::shallow`")]
    pub fn shallow_map(
        &self,
        initial: IndexMap<String, Value>,
        name: Option<&str>,
    ) -> Result<ObservableMap> {
        deprecated("observable.shallowMap", "observable.map(values, { deep: false })");
        self.map(initial, shallow_named(name))
    }

    /// Build a dynamically extensible object from `props`.
    ///
    /// `decorators` overrides the policy of individual members. Members
    /// added after creation use the policy the options select.
    pub fn object(
        &self,
        props: IndexMap<String, Value>,
        decorators: DecoratorMap,
        options: impl Into<OptionsArg>,
    ) -> Result<ObservableObject> {
        let options = resolve_options(&options.into())?;
        let target = ObservableObject::new(enhancer_for(&options), options.name.clone());
        extend_observable(&target, props, &decorators, &options)?;
        Ok(target)
    }

    #[deprecated(note = "use `object` with `CreateObservableOptions::shallow`")]
    pub fn shallow_object(
        &self,
        props: IndexMap<String, Value>,
        name: Option<&str>,
    ) -> Result<ObservableObject> {
        deprecated(
            "observable.shallowObject",
            "observable.object(values, {}, { deep: false })",
        );
        self.object(props, DecoratorMap::new(), shallow_named(name))
    }

    /// Policy decorator by table name: `ref`, `shallow`, `deep`, `struct`.
    pub fn decorator(&self, name: &str) -> Option<&'static ObservableDecorator> {
        ObservableDecorator::by_name(name)
    }

    /// Convert a value without options. Scalars are rejected.
    pub fn from_value(&self, value: impl Into<Value>) -> Result<Observable> {
        let value: Value = value.into();
        self.call(crate::arguments![value])
    }

    /// The polymorphic entry point.
    pub fn call(&self, args: Arguments) -> Result<Observable> {
        if matches!(args.get(1), Some(Argument::Key(_))) {
            return self.decorate(args);
        }

        let mut args = args.into_iter();
        let value = take_value(args.next(), "observable", 0)?;
        tracing::debug!(kind = ?value.kind(), "dispatching observable value");

        match value {
            Value::Observable(observable) => Ok(observable),
            Value::Object(props) => {
                let decorators = take_decorators(args.next(), "object", 1)?;
                let options = take_options(args.next(), "object", 2)?;
                Ok(self.object(props, decorators, options)?.into())
            }
            Value::Array(items) => {
                let options = take_options(args.next(), "array", 1)?;
                Ok(self.array(items, options)?.into())
            }
            Value::Map(entries) => {
                let options = take_options(args.next(), "map", 1)?;
                Ok(self.map(entries, options)?.into())
            }
            _ => Err(ObservableError::Unconvertible),
        }
    }

    fn decorate(&self, args: Arguments) -> Result<Observable> {
        let mut args = args.into_iter();
        let target = match args.next() {
            Some(Argument::Value(Value::Observable(Observable::Object(object)))) => object,
            Some(other) => {
                return Err(ObservableError::InvalidDecoratorTarget {
                    found: other.describe(),
                })
            }
            None => return Err(ObservableError::InvalidDecoratorTarget { found: "nothing" }),
        };
        let Some(Argument::Key(key)) = args.next() else {
            return Err(ObservableError::unexpected_argument("observable", 1, "a property key"));
        };
        let initial = match args.next() {
            None => None,
            Some(Argument::Value(value)) => Some(value),
            Some(_) => {
                return Err(ObservableError::unexpected_argument(
                    "observable",
                    2,
                    "an initial value",
                ))
            }
        };

        self.deep.apply(&target, &key, initial)?;
        Ok(Observable::Object(target))
    }

    /// Call a factory by its table name with positional arguments.
    ///
    /// `box`, `array`, `map` and their shallow aliases accept at most two
    /// arguments, and `object`/`shallowObject` reject a property key or
    /// string in second position: both shapes mean the factory was used as
    /// a decorator. A name for `shallowObject` is passed as
    /// [`OptionsArg::Name`].
    #[allow(deprecated)]
    pub fn invoke(&self, factory: &str, args: Arguments) -> Result<Observable> {
        match factory {
            "box" | "shallowBox" | "array" | "shallowArray" | "map" | "shallowMap"
                if args.len() > 2 =>
            {
                return Err(ObservableError::incorrectly_used_as_decorator(factory));
            }
            "object" | "shallowObject"
                if matches!(
                    args.get(1),
                    Some(Argument::Key(_) | Argument::Value(Value::String(_)))
                ) =>
            {
                return Err(ObservableError::incorrectly_used_as_decorator(factory));
            }
            _ => {}
        }

        let mut args = args.into_iter();
        let observable = match factory {
            "box" => self
                .boxed(
                    take_value(args.next(), factory, 0)?,
                    take_options(args.next(), factory, 1)?,
                )?
                .into(),
            "shallowBox" => self
                .shallow_box(
                    take_value(args.next(), factory, 0)?,
                    take_name(args.next(), factory, 1)?.as_deref(),
                )?
                .into(),
            "array" => self
                .array(
                    take_items(args.next(), factory)?,
                    take_options(args.next(), factory, 1)?,
                )?
                .into(),
            "shallowArray" => self
                .shallow_array(
                    take_items(args.next(), factory)?,
                    take_name(args.next(), factory, 1)?.as_deref(),
                )?
                .into(),
            "map" => self
                .map(
                    take_entries(args.next(), factory)?,
                    take_options(args.next(), factory, 1)?,
                )?
                .into(),
            "shallowMap" => self
                .shallow_map(
                    take_entries(args.next(), factory)?,
                    take_name(args.next(), factory, 1)?.as_deref(),
                )?
                .into(),
            "object" => self
                .object(
                    take_props(args.next(), factory)?,
                    take_decorators(args.next(), factory, 1)?,
                    take_options(args.next(), factory, 2)?,
                )?
                .into(),
            "shallowObject" => self
                .shallow_object(
                    take_props(args.next(), factory)?,
                    take_name(args.next(), factory, 1)?.as_deref(),
                )?
                .into(),
            name if self.decorator(name).is_some() => {
                return Err(ObservableError::NotAFactory(name.to_owned()))
            }
            other => return Err(ObservableError::UnknownFactory(other.to_owned())),
        };
        Ok(observable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments;
    use crate::types::Enhancer;
    use serde_json::json;

    fn props(json: serde_json::Value) -> IndexMap<String, Value> {
        match Value::from(json) {
            Value::Object(props) => props,
            other => panic!("expected an object, got {other:?}"),
        }
    }

    #[test]
    fn policy_fields_are_the_singletons() {
        assert!(std::ptr::eq(OBSERVABLE.reference, &REF_DECORATOR));
        assert!(std::ptr::eq(OBSERVABLE.shallow, &SHALLOW_DECORATOR));
        assert!(std::ptr::eq(OBSERVABLE.deep, &DEEP_DECORATOR));
        assert!(std::ptr::eq(OBSERVABLE.structural, &REF_STRUCT_DECORATOR));
    }

    #[test]
    fn boxed_uses_resolved_options() {
        let deep = OBSERVABLE.boxed(1, OptionsArg::Absent).unwrap();
        assert_eq!(deep.enhancer(), Enhancer::Deep);

        let named = OBSERVABLE.boxed(1, "counter").unwrap();
        assert_eq!(named.name(), "counter");

        let reference = OBSERVABLE
            .boxed(1, CreateObservableOptions::shallow("r"))
            .unwrap();
        assert_eq!(reference.enhancer(), Enhancer::Reference);
    }

    #[test]
    fn call_routes_by_kind() {
        let object = OBSERVABLE.call(arguments![json!({"a": 1})]).unwrap();
        assert!(object.as_object().is_some());

        let array = OBSERVABLE.call(arguments![json!([1, 2])]).unwrap();
        assert!(array.as_array().is_some());

        let map = OBSERVABLE.call(arguments![Value::map([("k", 1)])]).unwrap();
        assert!(map.as_map().is_some());
    }

    #[test]
    fn call_accepts_json_options_for_arrays() {
        let array = OBSERVABLE
            .call(arguments![json!([1]), json!({"name": "nums", "deep": false})])
            .unwrap();
        let array = array.as_array().unwrap();
        assert_eq!(array.name(), "nums");
        assert_eq!(array.enhancer(), Enhancer::Reference);
    }

    #[test]
    fn call_accepts_decorator_names_for_objects() {
        let object = OBSERVABLE
            .call(arguments![json!({"a": [1], "b": [2]}), json!({"a": "ref"})])
            .unwrap();
        let object = object.as_object().unwrap();
        assert_eq!(object.enhancer_of("a"), Some(Enhancer::Reference));
        assert_eq!(object.enhancer_of("b"), Some(Enhancer::Deep));
    }

    #[test]
    fn call_returns_existing_observables_unchanged() {
        let array = OBSERVABLE.array(vec![Value::from(1)], OptionsArg::Absent).unwrap();
        let result = OBSERVABLE.call(arguments![array.clone()]).unwrap();
        assert!(result.as_array().is_some_and(|a| a.ptr_eq(&array)));
    }

    #[test]
    fn call_rejects_scalars() {
        for value in [Value::from(42), Value::from("literal"), Value::Null, Value::Undefined] {
            let err = OBSERVABLE.call(arguments![value]).unwrap_err();
            assert!(matches!(err, ObservableError::Unconvertible));
        }
        assert!(matches!(
            OBSERVABLE.call(Arguments::new()),
            Err(ObservableError::Unconvertible)
        ));
    }

    #[test]
    fn key_in_second_position_decorates() {
        let target = OBSERVABLE
            .object(IndexMap::new(), DecoratorMap::new(), OptionsArg::Absent)
            .unwrap();

        let result = OBSERVABLE
            .call(arguments![target.clone(), Argument::key("todos"), json!([{"done": false}])])
            .unwrap();

        assert!(result.as_object().is_some_and(|o| o.ptr_eq(&target)));
        assert_eq!(target.enhancer_of("todos"), Some(Enhancer::Deep));
        assert!(target.get("todos").is_observable());
    }

    #[test]
    fn decorating_a_non_object_fails() {
        let err = OBSERVABLE
            .call(arguments![json!([1]), Argument::key("x")])
            .unwrap_err();
        assert!(matches!(
            err,
            ObservableError::InvalidDecoratorTarget { found: "array" }
        ));
    }

    #[test]
    fn invoke_guards_against_decorator_use() {
        for factory in ["box", "array", "map", "shallowBox", "shallowArray", "shallowMap"] {
            let err = OBSERVABLE
                .invoke(factory, arguments![1, 2, 3])
                .unwrap_err();
            assert!(
                matches!(&err, ObservableError::IncorrectlyUsedAsDecorator { factory: f } if f == factory)
            );
        }

        let err = OBSERVABLE
            .invoke("object", arguments![json!({}), Argument::key("prop")])
            .unwrap_err();
        assert!(err.to_string().contains("observable.object"));
    }

    #[test]
    fn invoke_treats_string_second_argument_as_decorator_use() {
        for factory in ["object", "shallowObject"] {
            let err = OBSERVABLE
                .invoke(factory, arguments![json!({"a": 1}), "name"])
                .unwrap_err();
            assert!(
                matches!(&err, ObservableError::IncorrectlyUsedAsDecorator { factory: f } if f == factory)
            );
        }

        let named = OBSERVABLE
            .invoke(
                "shallowObject",
                arguments![json!({"a": 1}), OptionsArg::Name("named".into())],
            )
            .unwrap();
        assert_eq!(named.name(), "named");
    }

    #[test]
    fn invoke_dispatches_by_name() {
        let boxed = OBSERVABLE.invoke("box", arguments![5, "five"]).unwrap();
        assert_eq!(boxed.name(), "five");

        let map = OBSERVABLE
            .invoke("map", arguments![json!({"a": 1})])
            .unwrap();
        assert_eq!(map.as_map().map(ObservableMap::len), Some(1));

        let object = OBSERVABLE
            .invoke(
                "object",
                arguments![json!({"a": {"b": 1}}), DecoratorMap::new(), json!({"deep": false})],
            )
            .unwrap();
        let object = object.as_object().unwrap();
        assert_eq!(object.get("a"), Value::from(json!({"b": 1})));
    }

    #[test]
    fn invoke_rejects_policies_and_unknown_names() {
        assert!(matches!(
            OBSERVABLE.invoke("ref", Arguments::new()),
            Err(ObservableError::NotAFactory(name)) if name == "ref"
        ));
        assert!(matches!(
            OBSERVABLE.invoke("computed", Arguments::new()),
            Err(ObservableError::UnknownFactory(name)) if name == "computed"
        ));
    }

    #[test]
    #[allow(deprecated)]
    fn shallow_alias_notice_is_emitted_once() {
        let message = ("observable.shallowBox", "observable.box(value, { deep: false })");

        OBSERVABLE.shallow_box(1, None).unwrap();
        OBSERVABLE.shallow_box(2, Some("again")).unwrap();

        assert!(!deprecated(message.0, message.1));
    }

    #[test]
    #[allow(deprecated)]
    fn shallow_aliases_use_reference_policy() {
        let boxed = OBSERVABLE.shallow_box(json!({"a": 1}), Some("n")).unwrap();
        assert_eq!(boxed.name(), "n");
        assert_eq!(boxed.enhancer(), Enhancer::Reference);

        let array = OBSERVABLE
            .shallow_array(vec![Value::from(json!({"a": 1}))], None)
            .unwrap();
        assert_eq!(array.enhancer(), Enhancer::Reference);
        assert!(!array.get(0).is_some_and(|v| v.is_observable()));

        let map = OBSERVABLE
            .shallow_map(props(json!({"a": [1]})), Some("m"))
            .unwrap();
        assert_eq!(map.get("a"), Some(Value::from(json!([1]))));

        let object = OBSERVABLE
            .shallow_object(props(json!({"a": [1]})), None)
            .unwrap();
        assert_eq!(object.default_enhancer(), Enhancer::Reference);
        assert_eq!(object.get("a"), Value::from(json!([1])));
    }

    #[test]
    fn object_is_dynamically_extensible() {
        let object = OBSERVABLE
            .object(props(json!({"a": 1})), DecoratorMap::new(), OptionsArg::Absent)
            .unwrap();
        object.set("later", Value::from(json!({"nested": true}))).unwrap();

        assert!(object.get("later").is_observable());
        assert_eq!(object.keys(), ["a", "later"]);
    }
}
