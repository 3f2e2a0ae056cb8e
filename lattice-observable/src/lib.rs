//! Lattice Observable
//!
//! This crate provides the `observable` entry point of the Lattice
//! reactive state layer. It turns plain data into reactive containers:
//!
//! - Boxed values, arrays, maps and dynamically extensible objects
//! - Four storage policies (deep, shallow, ref, struct) and their decorators
//! - Option resolution with frozen shared defaults
//! - A polymorphic dispatcher that picks the container from the value
//!
//! # Architecture
//!
//! - `api`: option resolver, decorators, the factory table
//! - `types`: the reactive containers and their enhancer policies
//! - `reactive`: atoms, reactions and dependency tracking
//! - `value`: the dynamic value model the containers store
//! - `error`: the error type shared by all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use lattice_observable::{arguments, OBSERVABLE};
//! use lattice_observable::reactive::autorun;
//! use serde_json::json;
//!
//! let todo = OBSERVABLE.call(arguments![json!({"title": "write docs", "done": false})])?;
//! let todo = todo.as_object().unwrap().clone();
//!
//! let reader = todo.clone();
//! let _reaction = autorun(move || {
//!     println!("done: {:?}", reader.get("done"));
//! });
//!
//! // Prints "done: Bool(true)"
//! todo.set("done", true.into())?;
//! ```

pub mod api;
pub mod error;
pub mod reactive;
pub mod types;
pub mod value;

pub use api::{
    extend_observable, observable, Argument, Arguments, CreateObservableOptions, DecoratorMap,
    ObservableDecorator, ObservableFactories, OptionsArg, OBSERVABLE,
};
pub use error::{ObservableError, Result};
pub use types::{
    Enhancer, Observable, ObservableArray, ObservableMap, ObservableObject, ObservableValue,
};
pub use value::{Value, ValueKind};
