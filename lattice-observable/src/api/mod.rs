//! The `observable` Entry Point
//!
//! - [`options`]: normalizing factory options into a shared record.
//! - [`decorator`]: the four policy decorators.
//! - [`factory`]: the factory table and the polymorphic dispatcher.
//! - [`extend`]: adding members to an existing object.
//! - [`deprecation`]: one-time notices for the shallow aliases.

pub mod decorator;
pub mod deprecation;
pub mod extend;
pub mod factory;
pub mod options;

pub use decorator::{
    ObservableDecorator, DEEP_DECORATOR, REF_DECORATOR, REF_STRUCT_DECORATOR, SHALLOW_DECORATOR,
};
pub use deprecation::deprecated;
pub use extend::{extend_observable, DecoratorMap};
pub use factory::{observable, Argument, Arguments, ObservableFactories, OBSERVABLE};
pub use options::{
    default_create_observable_options, resolve_options, shallow_create_observable_options,
    CreateObservableOptions, OptionsArg,
};
