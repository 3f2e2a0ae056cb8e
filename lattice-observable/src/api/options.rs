//! Create-Observable Options
//!
//! Factories accept their configuration in several shapes: nothing at all,
//! a bare name, a typed record, or a JSON object. [`resolve_options`]
//! turns each of them into one shared [`CreateObservableOptions`].
//!
//! When no custom name or decorator is involved, the frozen defaults are
//! handed out by pointer instead of allocating a new record per call.
//!
//! JSON option objects are validated in debug builds only: an unknown key
//! fails immediately. Release builds skip the check.

use std::sync::{Arc, OnceLock};

use serde::Deserialize;

use super::decorator::ObservableDecorator;
use crate::error::{ObservableError, Result};

const VALID_OPTION_KEYS: [&str; 3] = ["deep", "name", "defaultDecorator"];

/// Configuration for a single factory call.
///
/// If `default_decorator` is set it decides the enhancer and `deep` is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateObservableOptions {
    pub name: Option<String>,
    pub deep: bool,
    pub default_decorator: Option<ObservableDecorator>,
}

impl Default for CreateObservableOptions {
    fn default() -> Self {
        Self {
            name: None,
            deep: true,
            default_decorator: None,
        }
    }
}

impl CreateObservableOptions {
    /// Deep options carrying a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Shallow (`deep: false`) options carrying a name.
    pub fn shallow(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            deep: false,
            default_decorator: None,
        }
    }
}

static DEFAULT_OPTIONS: OnceLock<Arc<CreateObservableOptions>> = OnceLock::new();
static SHALLOW_OPTIONS: OnceLock<Arc<CreateObservableOptions>> = OnceLock::new();

/// The shared `{ deep: true }` record.
pub fn default_create_observable_options() -> &'static Arc<CreateObservableOptions> {
    DEFAULT_OPTIONS.get_or_init(|| Arc::new(CreateObservableOptions::default()))
}

/// The shared `{ deep: false }` record.
pub fn shallow_create_observable_options() -> &'static Arc<CreateObservableOptions> {
    SHALLOW_OPTIONS.get_or_init(|| {
        Arc::new(CreateObservableOptions {
            deep: false,
            ..CreateObservableOptions::default()
        })
    })
}

/// Options as they arrive at a factory.
#[derive(Debug, Clone, Default)]
pub enum OptionsArg {
    /// No options given.
    #[default]
    Absent,
    /// Name shortcut: `{ name, deep: true }`.
    Name(String),
    /// A prepared record, used as-is.
    Record(Arc<CreateObservableOptions>),
    /// An options object in JSON form.
    Json(serde_json::Value),
}

impl From<&str> for OptionsArg {
    fn from(name: &str) -> Self {
        OptionsArg::Name(name.to_owned())
    }
}

impl From<String> for OptionsArg {
    fn from(name: String) -> Self {
        OptionsArg::Name(name)
    }
}

impl From<CreateObservableOptions> for OptionsArg {
    fn from(options: CreateObservableOptions) -> Self {
        OptionsArg::Record(Arc::new(options))
    }
}

impl From<Arc<CreateObservableOptions>> for OptionsArg {
    fn from(options: Arc<CreateObservableOptions>) -> Self {
        OptionsArg::Record(options)
    }
}

impl From<serde_json::Value> for OptionsArg {
    fn from(json: serde_json::Value) -> Self {
        OptionsArg::Json(json)
    }
}

impl<T: Into<OptionsArg>> From<Option<T>> for OptionsArg {
    fn from(options: Option<T>) -> Self {
        options.map_or(OptionsArg::Absent, Into::into)
    }
}

fn assert_valid_option(key: &str) -> Result<()> {
    if VALID_OPTION_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(ObservableError::InvalidOption {
            key: key.to_owned(),
        })
    }
}

/// Normalize factory options into a shared record.
pub fn resolve_options(input: &OptionsArg) -> Result<Arc<CreateObservableOptions>> {
    match input {
        OptionsArg::Absent | OptionsArg::Json(serde_json::Value::Null) => {
            Ok(Arc::clone(default_create_observable_options()))
        }
        OptionsArg::Name(name) | OptionsArg::Json(serde_json::Value::String(name)) => {
            Ok(Arc::new(CreateObservableOptions::named(name.clone())))
        }
        OptionsArg::Record(options) => Ok(Arc::clone(options)),
        OptionsArg::Json(json) => {
            let Some(object) = json.as_object() else {
                return Err(ObservableError::ExpectedOptionsObject);
            };
            if cfg!(debug_assertions) {
                object.keys().try_for_each(|key| assert_valid_option(key))?;
            }
            let options = CreateObservableOptions::deserialize(json)?;
            Ok(Arc::new(options))
        }
    }
}
