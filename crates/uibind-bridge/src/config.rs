#![forbid(unsafe_code)]

//! Layered widget configuration.
//!
//! An effective configuration is assembled by overlaying, in increasing
//! precedence: builtin defaults → process-wide shared configuration (from
//! the [`ConfigRegistry`], keyed by binding kind) → per-instance declared
//! options. Assembly always produces a fresh map; the inputs (the shared
//! registry in particular) are never mutated, so one instance cannot
//! contaminate another's defaults.
//!
//! The registry replaces ambient global configuration: it is built once at
//! startup and handed to each binding constructor as `Rc<ConfigRegistry>`.

use core::fmt;

use ahash::AHashMap;
use uibind_scope::{Value, ValueMap};

/// An ordered-insensitive map of configuration keys to [`Value`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigMap {
    entries: AHashMap<String, Value>,
}

impl ConfigMap {
    /// An empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Insert a key, replacing any existing value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries (order unspecified).
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Overlay `other` onto `self`, later entries winning.
    fn overlay(&mut self, other: &Self) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    /// Assemble an effective configuration. Produces a fresh map; none of
    /// the inputs are mutated.
    #[must_use]
    pub fn assemble(builtin: &Self, shared: Option<&Self>, declared: &Self) -> Self {
        let mut effective = builtin.clone();
        if let Some(shared) = shared {
            effective.overlay(shared);
        }
        effective.overlay(declared);
        effective
    }

    /// Deep [`Value`] view of the whole map, usable as a fingerprint.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut m = ValueMap::new();
        for (k, v) in &self.entries {
            m.insert(k.clone(), v.clone());
        }
        Value::Map(m)
    }

    /// Build from a `Value::Map`. `Null` yields an empty map; anything
    /// else is rejected with a description of the offending type.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Map(m) => {
                let mut entries = AHashMap::with_capacity(m.len());
                for (k, v) in m {
                    entries.insert(k.clone(), v.clone());
                }
                Ok(Self { entries })
            }
            other => Err(format!("expected a map of options, got {}", other.type_name())),
        }
    }
}

impl FromIterator<(String, Value)> for ConfigMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Process-wide shared configuration, keyed by binding kind (e.g.
/// `"calendar"`, `"date"`, or a plugin's widget name). Read-only after
/// construction.
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    shared: AHashMap<String, ConfigMap>,
}

impl ConfigRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of shared defaults for one binding kind.
    #[must_use]
    pub fn with(mut self, kind: impl Into<String>, config: ConfigMap) -> Self {
        self.shared.insert(kind.into(), config);
        self
    }

    /// Shared configuration for a binding kind, if any was registered.
    #[must_use]
    pub fn shared(&self, kind: &str) -> Option<&ConfigMap> {
        self.shared.get(kind)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.is_empty()
    }
}

impl fmt::Display for ConfigRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.shared.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        write!(f, "ConfigRegistry[{}]", kinds.join(", "))
    }
}

#[cfg(feature = "config-json")]
mod json {
    use super::{ConfigMap, ConfigRegistry};
    use uibind_scope::{Value, ValueMap};

    /// Errors from registry JSON loading.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ConfigError {
        /// The document is not valid JSON.
        Parse(String),
        /// The document is JSON but not an object-of-objects.
        UnsupportedShape(String),
    }

    impl core::fmt::Display for ConfigError {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            match self {
                Self::Parse(msg) => write!(f, "invalid registry JSON: {msg}"),
                Self::UnsupportedShape(msg) => write!(f, "unsupported registry shape: {msg}"),
            }
        }
    }

    impl std::error::Error for ConfigError {}

    fn to_value(v: &serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .unwrap_or_else(|| Value::Float(n.as_f64().unwrap_or(f64::NAN))),
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(to_value).collect())
            }
            serde_json::Value::Object(obj) => {
                let mut m = ValueMap::new();
                for (k, v) in obj {
                    m.insert(k.clone(), to_value(v));
                }
                Value::Map(m)
            }
        }
    }

    impl ConfigRegistry {
        /// Load a registry from a JSON object of the shape
        /// `{ "<kind>": { "<key>": <value>, ... }, ... }`.
        pub fn from_json(source: &str) -> Result<Self, ConfigError> {
            let document: serde_json::Value = serde_json::from_str(source)
                .map_err(|e| ConfigError::Parse(e.to_string()))?;
            let serde_json::Value::Object(kinds) = document else {
                return Err(ConfigError::UnsupportedShape(
                    "top level must be an object keyed by binding kind".into(),
                ));
            };
            let mut registry = Self::new();
            for (kind, config) in &kinds {
                let serde_json::Value::Object(entries) = config else {
                    return Err(ConfigError::UnsupportedShape(format!(
                        "kind '{kind}' must map to an object"
                    )));
                };
                let mut map = ConfigMap::new();
                for (k, v) in entries {
                    map.insert(k.clone(), to_value(v));
                }
                registry = registry.with(kind.clone(), map);
            }
            Ok(registry)
        }
    }
}

#[cfg(feature = "config-json")]
pub use json::ConfigError;
