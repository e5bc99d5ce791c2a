//! # Permissions
//!
//! Permission values and permission maps.
//! A permission map binds resource-type names to the actions a role may
//! perform on them.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{RbacError, RbacResult};

/// The wildcard string, used both as a type key and as an action value.
pub const WILDCARD: &str = "*";

/// How permission values that are neither `"*"` nor a list of strings are
/// handled while decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoding {
    /// Reject the whole map with [`RbacError::MalformedPermissionValue`].
    #[default]
    Strict,
    /// Keep the key but grant nothing for it.
    Lenient,
}

/// The actions granted for one resource type.
///
/// Serialized as the string `"*"` or as an array of action names:
///
/// ```
/// use user_roles::PermissionValue;
///
/// let any: PermissionValue = serde_json::from_str(r#""*""#).unwrap();
/// assert!(any.allows("publish"));
///
/// let some: PermissionValue = serde_json::from_str(r#"["edit", "view"]"#).unwrap();
/// assert!(some.allows("edit"));
/// assert!(!some.allows("delete"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PermissionValue {
    /// Every action is granted.
    Wildcard,
    /// Exactly these actions are granted, in declaration order.
    Actions(Vec<String>),
}

impl PermissionValue {
    /// Create an action list from anything yielding action names.
    pub fn actions<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PermissionValue::Actions(actions.into_iter().map(Into::into).collect())
    }

    /// An action list that grants nothing.
    pub fn none() -> Self {
        PermissionValue::Actions(Vec::new())
    }

    /// Check whether this value grants `action`.
    ///
    /// Comparison is exact and case-sensitive. Inside an action list, `"*"`
    /// is an ordinary action name and only matches the action `"*"`.
    pub fn allows(&self, action: &str) -> bool {
        match self {
            PermissionValue::Wildcard => true,
            PermissionValue::Actions(actions) => actions.iter().any(|a| a == action),
        }
    }

    /// Check if this is the `"*"` value.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, PermissionValue::Wildcard)
    }

    /// Decode a JSON value stored under `resource_type`.
    ///
    /// # Errors
    ///
    /// Returns [`RbacError::MalformedPermissionValue`] if the value is not
    /// `"*"` or an array of strings.
    pub fn from_json(resource_type: &str, value: &Value) -> RbacResult<Self> {
        match value {
            Value::String(s) if s == WILDCARD => Ok(PermissionValue::Wildcard),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(malformed(resource_type, "array element", other)),
                })
                .collect::<RbacResult<Vec<_>>>()
                .map(PermissionValue::Actions),
            other => Err(malformed(resource_type, "value", other)),
        }
    }

    /// Decode a JSON value, falling back to a value that grants nothing.
    pub fn from_json_lenient(resource_type: &str, value: &Value) -> Self {
        Self::from_json(resource_type, value).unwrap_or_else(|err| {
            tracing::warn!(
                resource_type = %resource_type,
                error = %err,
                "Malformed permission value, denying all actions for this type"
            );
            PermissionValue::none()
        })
    }
}

fn malformed(resource_type: &str, what: &str, found: &Value) -> RbacError {
    RbacError::MalformedPermissionValue {
        resource_type: resource_type.to_string(),
        reason: format!(
            "expected \"*\" or an array of strings, found {} {}",
            what,
            describe(found)
        ),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

impl Serialize for PermissionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PermissionValue::Wildcard => serializer.serialize_str(WILDCARD),
            PermissionValue::Actions(actions) => {
                let mut seq = serializer.serialize_seq(Some(actions.len()))?;
                for action in actions {
                    seq.serialize_element(action)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for PermissionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = PermissionValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("\"*\" or an array of action names")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v == WILDCARD {
                    Ok(PermissionValue::Wildcard)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut actions = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(action) = seq.next_element::<String>()? {
                    actions.push(action);
                }
                Ok(PermissionValue::Actions(actions))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// A role's permissions: resource-type name to [`PermissionValue`].
///
/// Keys are unique and kept in insertion order. Re-inserting an existing key
/// replaces its value in place, so the key keeps its original position.
/// Order only matters to [`WildcardMode::FirstKey`](crate::WildcardMode::FirstKey).
///
/// # Example
///
/// ```
/// use user_roles::{PermissionMap, PermissionValue};
///
/// let map = PermissionMap::new()
///     .with("users", PermissionValue::actions(["edit", "view"]))
///     .with("pages", PermissionValue::Wildcard);
///
/// assert_eq!(map.first_key(), Some("users"));
/// assert!(map.can("edit", "pages"));
/// assert!(!map.can("delete", "users"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionMap {
    entries: Vec<(String, PermissionValue)>,
}

impl PermissionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace the value for `resource_type`.
    ///
    /// # Returns
    ///
    /// The previous value, if the key was already present
    pub fn insert(
        &mut self,
        resource_type: impl Into<String>,
        value: PermissionValue,
    ) -> Option<PermissionValue> {
        let resource_type = resource_type.into();
        match self.entries.iter_mut().find(|(k, _)| *k == resource_type) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((resource_type, value));
                None
            }
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, resource_type: impl Into<String>, value: PermissionValue) -> Self {
        self.insert(resource_type, value);
        self
    }

    /// Get the value stored for `resource_type`.
    pub fn get(&self, resource_type: &str) -> Option<&PermissionValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == resource_type)
            .map(|(_, v)| v)
    }

    /// Get the value stored under the `"*"` key.
    pub fn any_type(&self) -> Option<&PermissionValue> {
        self.get(WILDCARD)
    }

    /// Check if `resource_type` has an entry.
    pub fn contains_key(&self, resource_type: &str) -> bool {
        self.get(resource_type).is_some()
    }

    /// The first-inserted key.
    pub fn first_key(&self) -> Option<&str> {
        self.entries.first().map(|(k, _)| k.as_str())
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PermissionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get the count of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decide whether this map grants `action` on `resource_type`, using the
    /// default [`WildcardMode`](crate::WildcardMode).
    pub fn can(&self, action: &str, resource_type: &str) -> bool {
        crate::resolver::can(self, action, resource_type)
    }

    /// Parse a map from a JSON object, keeping key order.
    ///
    /// # Example
    ///
    /// ```
    /// use user_roles::{Decoding, PermissionMap};
    ///
    /// let map = PermissionMap::from_json_str(r#"{"*": "*", "users": ["view"]}"#, Decoding::Strict).unwrap();
    /// assert_eq!(map.first_key(), Some("*"));
    ///
    /// assert!(PermissionMap::from_json_str(r#"{"pages": "edit"}"#, Decoding::Strict).is_err());
    ///
    /// let lenient = PermissionMap::from_json_str(r#"{"pages": "edit"}"#, Decoding::Lenient).unwrap();
    /// assert!(!lenient.can("edit", "pages"));
    /// ```
    pub fn from_json_str(json: &str, decoding: Decoding) -> RbacResult<Self> {
        let raw: RawPermissionMap = serde_json::from_str(json)?;
        raw.decode(decoding)
    }
}

impl<K: Into<String>> FromIterator<(K, PermissionValue)> for PermissionMap {
    fn from_iter<T: IntoIterator<Item = (K, PermissionValue)>>(iter: T) -> Self {
        let mut map = PermissionMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for PermissionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PermissionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MapVisitor;

        impl<'de> Visitor<'de> for MapVisitor {
            type Value = PermissionMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of resource types to permission values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = PermissionMap::new();
                while let Some((k, v)) = access.next_entry::<String, PermissionValue>()? {
                    map.insert(k, v);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MapVisitor)
    }
}

/// An order-preserving, not yet validated permission map.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawPermissionMap(Vec<(String, Value)>);

impl RawPermissionMap {
    pub(crate) fn decode(self, decoding: Decoding) -> RbacResult<PermissionMap> {
        let mut map = PermissionMap::new();
        for (resource_type, value) in self.0 {
            let value = match decoding {
                Decoding::Strict => PermissionValue::from_json(&resource_type, &value)?,
                Decoding::Lenient => PermissionValue::from_json_lenient(&resource_type, &value),
            };
            map.insert(resource_type, value);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for RawPermissionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawVisitor;

        impl<'de> Visitor<'de> for RawVisitor {
            type Value = RawPermissionMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of resource types to permission values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, Value)> = Vec::new();
                while let Some((k, v)) = access.next_entry::<String, Value>()? {
                    // Duplicate keys keep their first position and take the last value
                    match entries.iter_mut().find(|(existing, _)| *existing == k) {
                        Some((_, slot)) => *slot = v,
                        None => entries.push((k, v)),
                    }
                }
                Ok(RawPermissionMap(entries))
            }
        }

        deserializer.deserialize_map(RawVisitor)
    }
}
