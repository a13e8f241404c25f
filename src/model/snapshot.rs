use serde::Serialize;
use serde_json::Value;
use crate::utils::{errors::InternalError, redact::redact};

///
/// A single name/value row displayed on the config page.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Setting {
    pub name: String,
    pub value: String,
}

impl Setting {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Setting { name: name.into(), value: value.into() }
    }
}

///
/// The public fields of a configuration value, ordered by name.
///
/// Any field whose serialised name starts with an underscore is internal and is never included.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    settings: Vec<Setting>,
}

impl ConfigSnapshot {
    ///
    /// Reflect over the serialised form of the config. It must serialise to a map/struct.
    ///
    pub fn capture<T: Serialize>(config: &T) -> Result<Self, InternalError> {
        let values = match serde_json::to_value(config)? {
            Value::Object(values) => values,
            other => return Err(InternalError::InvalidSnapshot {
                cause: format!("expected a struct or map but found {}", kind(&other)) }),
        };

        let mut settings: Vec<Setting> = values.iter()
            .filter(|(name, _)| !name.starts_with('_'))
            .map(|(name, value)| Setting::new(name.as_str(), display(value)))
            .collect();

        // Sort by name so the order is stable for the same config.
        settings.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(ConfigSnapshot { settings })
    }

    ///
    /// Mask any secret-looking values.
    ///
    pub fn redacted(self) -> Self {
        ConfigSnapshot {
            settings: self.settings.into_iter()
                .map(|setting| Setting { value: redact(&setting.name, &setting.value), name: setting.name })
                .collect()
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.settings.iter()
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_)  => "an array",
        Value::Object(_) => "an object",
    }
}
