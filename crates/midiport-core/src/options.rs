//! Port construction options.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Backend-specific options, keyed by name.
pub type BackendParams = HashMap<String, ParamValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        Self::Int(i as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// Read an optional parameter, falling back to `default` when absent or mistyped.
pub fn get_param_or<T>(
    params: &BackendParams,
    name: &str,
    default: T,
    convert: impl FnOnce(&ParamValue) -> Option<T>,
) -> T {
    params.get(name).and_then(convert).unwrap_or(default)
}

/// Serialization strategy for a port's compound operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    /// Reentrant per-port lock around the inbox and every transport call.
    #[default]
    Reentrant,
    /// No port-level lock, for single-threaded callers. Inbox and driver
    /// access stay memory safe; only the atomicity of poll-then-check steps
    /// is given up.
    Unlocked,
}

/// Options passed to a backend when opening a port.
///
/// ```ignore
/// let options = PortOptions::new()
///     .name("Synth In")
///     .autoreset(true)
///     .param("cable", "loop-a");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortOptions {
    pub name: Option<String>,
    /// Send the reset sequence before closing.
    pub autoreset: bool,
    pub locking: LockMode,
    pub params: BackendParams,
}

impl PortOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn autoreset(mut self, autoreset: bool) -> Self {
        self.autoreset = autoreset;
        self
    }

    pub fn locking(mut self, locking: LockMode) -> Self {
        self.locking = locking;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}
