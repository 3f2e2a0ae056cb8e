//! Errors raised by the observable factories.
//!
//! Every variant signals caller misuse rather than a transient failure, so
//! nothing in this crate retries or recovers from them. They are returned
//! synchronously from the call that triggered them.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = ObservableError> = std::result::Result<T, E>;

/// Errors produced while resolving options, dispatching values, or
/// mutating reactive containers.
#[derive(Debug, Error)]
pub enum ObservableError {
    /// An options object carried a key outside `deep`, `name`,
    /// `defaultDecorator`.
    #[error("invalid option for (extend)observable: {key}")]
    InvalidOption { key: String },

    /// Options were given as something other than a name or an object.
    #[error("expected options object")]
    ExpectedOptionsObject,

    /// An options object had a recognised key with a value of the wrong shape.
    #[error("failed to parse observable options: {0}")]
    OptionsParse(#[from] serde_json::Error),

    /// A factory received decorator-shaped arguments.
    #[error(
        "Expected one or two arguments to observable.{factory}. \
         Did you accidentally try to use observable.{factory} as decorator?"
    )]
    IncorrectlyUsedAsDecorator { factory: String },

    /// The default entry point was given a value it cannot convert.
    #[error(
        "The provided value could not be converted into an observable. \
         If you want just create an observable reference to the object use 'observable.box(value)'"
    )]
    Unconvertible,

    /// The shallow enhancer only accepts collections.
    #[error("The shallow modifier / decorator can only used in combination with arrays, objects and maps")]
    ShallowModifierMisuse,

    /// A decorator was applied to something other than an observable object.
    #[error("decorators can only be applied to observable objects, got {found}")]
    InvalidDecoratorTarget { found: &'static str },

    /// A positional argument did not have the shape the factory expects.
    #[error("observable.{factory}: argument {position} should be {expected}")]
    UnexpectedArgument {
        factory: String,
        position: usize,
        expected: &'static str,
    },

    /// No factory with this name exists on the table.
    #[error("observable.{0} is not a known factory")]
    UnknownFactory(String),

    /// A policy accessor (`ref`, `shallow`, `deep`, `struct`) was invoked.
    #[error("observable.{0} is a decorator, not a factory")]
    NotAFactory(String),

    /// A decorator map named a property that the props do not contain.
    #[error("Trying to declare a decorator for unspecified property '{0}'")]
    DecoratorForUnknownProperty(String),

    /// An array index was past the end of the array.
    #[error("[{name}] Index out of bounds, {index} is larger than {len}")]
    IndexOutOfBounds {
        name: String,
        index: usize,
        len: usize,
    },
}

impl ObservableError {
    /// Creates a decorator-misuse error for the named factory.
    pub fn incorrectly_used_as_decorator(factory: impl Into<String>) -> Self {
        Self::IncorrectlyUsedAsDecorator {
            factory: factory.into(),
        }
    }

    /// Creates an unexpected-argument error.
    pub fn unexpected_argument(
        factory: impl Into<String>,
        position: usize,
        expected: &'static str,
    ) -> Self {
        Self::UnexpectedArgument {
            factory: factory.into(),
            position,
            expected,
        }
    }
}
