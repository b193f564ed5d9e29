//! Remote value wrapping — runtime values to `Runtime.RemoteObject` descriptors.
//!
//! [`RuntimeValue`] models the dynamic values a console call can carry.
//! [`wrap`] classifies one into the wire descriptor: primitives keep their
//! value and nothing else, everything else gets a subtype, a class name and
//! a description.

use std::fmt;
use std::sync::Arc;

use cdp_protocol::{ProtocolError, RemoteObject, RemoteObjectSubtype, RemoteObjectType};
use serde_json::Value;

/// Failure while describing a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WrapError {
    /// A host object could not produce its textual representation.
    #[error("cannot describe {class_name}: {reason}")]
    Describe { class_name: String, reason: String },
}

impl From<WrapError> for ProtocolError {
    fn from(e: WrapError) -> Self {
        ProtocolError::new(e.to_string())
    }
}

/// An object supplied by the embedding process.
///
/// Host objects classify as plain objects; their class name comes from the
/// bracketed tag (`[object Date]` gives `Date`).
pub trait HostObject: fmt::Debug + Send + Sync {
    /// Object-to-string tag in `[object Tag]` form.
    fn type_tag(&self) -> String;

    /// Default textual representation.
    fn describe(&self) -> Result<String, WrapError>;
}

/// A dynamically typed runtime value.
#[derive(Debug, Clone)]
pub enum RuntimeValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    /// A symbol with an optional description.
    Symbol(Option<String>),
    Array(Vec<RuntimeValue>),
    RegExp { source: String, flags: String },
    Error { name: String, message: String },
    Map(Vec<(RuntimeValue, RuntimeValue)>),
    Set(Vec<RuntimeValue>),
    Function { name: String },
    Object(Vec<(String, RuntimeValue)>),
    Host(Arc<dyn HostObject>),
}

impl RuntimeValue {
    pub fn regexp(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self::RegExp {
            source: source.into(),
            flags: flags.into(),
        }
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::Function { name: name.into() }
    }

    pub fn host(object: impl HostObject + 'static) -> Self {
        Self::Host(Arc::new(object))
    }

    pub fn kind(&self) -> RemoteObjectType {
        match self {
            Self::Undefined => RemoteObjectType::Undefined,
            Self::Bool(_) => RemoteObjectType::Boolean,
            Self::Number(_) => RemoteObjectType::Number,
            Self::BigInt(_) => RemoteObjectType::Bigint,
            Self::String(_) => RemoteObjectType::String,
            Self::Symbol(_) => RemoteObjectType::Symbol,
            Self::Function { .. } => RemoteObjectType::Function,
            Self::Null
            | Self::Array(_)
            | Self::RegExp { .. }
            | Self::Error { .. }
            | Self::Map(_)
            | Self::Set(_)
            | Self::Object(_)
            | Self::Host(_) => RemoteObjectType::Object,
        }
    }

    /// `null` counts as a primitive here even though its type tag is `object`.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Undefined
                | Self::Null
                | Self::Bool(_)
                | Self::Number(_)
                | Self::BigInt(_)
                | Self::String(_)
                | Self::Symbol(_)
        )
    }

    /// Object-to-string tag, as the host would report it.
    pub fn type_tag(&self) -> String {
        let tag = match self {
            Self::Undefined => "Undefined",
            Self::Null => "Null",
            Self::Bool(_) => "Boolean",
            Self::Number(_) => "Number",
            Self::BigInt(_) => "BigInt",
            Self::String(_) => "String",
            Self::Symbol(_) => "Symbol",
            Self::Array(_) => "Array",
            Self::RegExp { .. } => "RegExp",
            Self::Error { .. } => "Error",
            Self::Map(_) => "Map",
            Self::Set(_) => "Set",
            Self::Function { .. } => "Function",
            Self::Object(_) => "Object",
            Self::Host(host) => return host.type_tag(),
        };
        format!("[object {tag}]")
    }

    /// Default textual representation (string conversion semantics).
    pub fn to_display_string(&self) -> Result<String, WrapError> {
        Ok(match self {
            Self::Undefined => "undefined".into(),
            Self::Null => "null".into(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => number_to_string(*n),
            Self::BigInt(n) => n.to_string(),
            Self::String(s) => s.clone(),
            Self::Symbol(desc) => format!("Symbol({})", desc.as_deref().unwrap_or("")),
            Self::Array(items) => {
                let parts = items
                    .iter()
                    .map(|item| match item {
                        Self::Undefined | Self::Null => Ok(String::new()),
                        other => other.to_display_string(),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                parts.join(",")
            }
            Self::RegExp { source, flags } => format!("/{source}/{flags}"),
            Self::Error { name, message } if message.is_empty() => name.clone(),
            Self::Error { name, message } => format!("{name}: {message}"),
            Self::Function { name } => format!("function {name}() {{ [native code] }}"),
            Self::Map(_) | Self::Set(_) | Self::Object(_) => self.type_tag(),
            Self::Host(host) => host.describe()?,
        })
    }
}

/// Wrap a runtime value into its wire descriptor.
pub fn wrap(value: &RuntimeValue) -> Result<RemoteObject, WrapError> {
    let mut obj = RemoteObject::of_type(value.kind());

    if value.is_primitive() {
        match value {
            RuntimeValue::Null => {
                obj.subtype = Some(RemoteObjectSubtype::Null);
                obj.value = Some(Value::Null);
            }
            RuntimeValue::Bool(b) => obj.value = Some(Value::Bool(*b)),
            RuntimeValue::String(s) => obj.value = Some(Value::String(s.clone())),
            RuntimeValue::Number(n) => match serializable_number(*n) {
                Some(v) => obj.value = Some(v),
                None => obj.unserializable_value = Some(number_to_string(*n)),
            },
            RuntimeValue::BigInt(n) => obj.unserializable_value = Some(format!("{n}n")),
            // Symbols have no JSON form, so they travel as their description.
            RuntimeValue::Symbol(_) => obj.description = Some(value.to_display_string()?),
            _ => {}
        }
        return Ok(obj);
    }

    let (subtype, class_name) = match value {
        RuntimeValue::Array(_) => (Some(RemoteObjectSubtype::Array), "Array".to_string()),
        RuntimeValue::RegExp { .. } => (Some(RemoteObjectSubtype::Regexp), "RegExp".to_string()),
        RuntimeValue::Error { name, .. } => (Some(RemoteObjectSubtype::Error), name.clone()),
        RuntimeValue::Map(_) => (Some(RemoteObjectSubtype::Map), "Map".to_string()),
        RuntimeValue::Set(_) => (Some(RemoteObjectSubtype::Set), "Set".to_string()),
        RuntimeValue::Function { .. } => (None, "Function".to_string()),
        other => (
            Some(RemoteObjectSubtype::Object),
            class_name_from_tag(&other.type_tag()),
        ),
    };

    obj.subtype = subtype;
    obj.class_name = Some(class_name);
    obj.description = Some(value.to_display_string()?);
    Ok(obj)
}

/// Wrap every argument of a console call, stopping at the first failure.
pub fn wrap_all(values: &[RuntimeValue]) -> Result<Vec<RemoteObject>, WrapError> {
    values.iter().map(wrap).collect()
}

/// `[object Date]` gives `Date`; anything not in bracketed form is returned whole.
pub fn class_name_from_tag(tag: &str) -> String {
    tag.strip_prefix("[object ")
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(tag)
        .to_string()
}

fn serializable_number(n: f64) -> Option<Value> {
    if !n.is_finite() || (n == 0.0 && n.is_sign_negative()) {
        return None;
    }
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        return Some(Value::from(n as i64));
    }
    serde_json::Number::from_f64(n).map(Value::Number)
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".into() } else { "-Infinity".into() }
    } else if n == 0.0 && n.is_sign_negative() {
        "-0".into()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

impl From<bool> for RuntimeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for RuntimeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for RuntimeValue {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<u32> for RuntimeValue {
    fn from(n: u32) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for RuntimeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for RuntimeValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<RuntimeValue>> From<Vec<T>> for RuntimeValue {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RuntimeValue>> From<Option<T>> for RuntimeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}

impl From<Value> for RuntimeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => Self::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inspection-style formatting for the local console
// ─────────────────────────────────────────────────────────────────────────────

impl fmt::Display for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            other => write!(f, "{}", Inspect(other)),
        }
    }
}

/// Nested rendering: strings quoted, collections expanded.
struct Inspect<'a>(&'a RuntimeValue);

impl fmt::Display for Inspect<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            RuntimeValue::String(s) => write!(f, "'{s}'"),
            RuntimeValue::Array(items) => {
                write!(f, "[")?;
                write_list(f, items.iter().map(Inspect))?;
                write!(f, "]")
            }
            RuntimeValue::Set(items) => {
                write!(f, "Set({}) {{", items.len())?;
                write_list(f, items.iter().map(Inspect))?;
                write!(f, "}}")
            }
            RuntimeValue::Map(entries) => {
                write!(f, "Map({}) {{", entries.len())?;
                write_list(
                    f,
                    entries
                        .iter()
                        .map(|(k, v)| format!("{} => {}", Inspect(k), Inspect(v))),
                )?;
                write!(f, "}}")
            }
            RuntimeValue::Object(fields) => {
                write!(f, "{{")?;
                write_list(f, fields.iter().map(|(k, v)| format!("{k}: {}", Inspect(v))))?;
                write!(f, "}}")
            }
            RuntimeValue::Function { name } => write!(f, "[Function: {name}]"),
            RuntimeValue::Host(host) => match host.describe() {
                Ok(text) => write!(f, "{text}"),
                Err(_) => write!(f, "{}", host.type_tag()),
            },
            other => match other.to_display_string() {
                Ok(text) => write!(f, "{text}"),
                Err(_) => write!(f, "{}", other.type_tag()),
            },
        }
    }
}

fn write_list<I, T>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: Iterator<Item = T>,
    T: fmt::Display,
{
    let mut first = true;
    for item in items {
        if first {
            write!(f, " {item}")?;
            first = false;
        } else {
            write!(f, ", {item}")?;
        }
    }
    if !first {
        write!(f, " ")?;
    }
    Ok(())
}
