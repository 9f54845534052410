//! Tagged values and shared objects.
//!
//! A [`Value`] is either a primitive, compared by value, or an [`ObjectRef`],
//! compared by identity. Objects hold an ordered map of [`Property`] entries
//! whose attribute flags decide what may be written, removed or enumerated.

use crate::error::{CoreError, CoreResult};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Largest integer an `f64` represents exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A property value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Present but undefined
    #[default]
    Undefined,
    /// Null
    Null,
    /// Boolean
    Bool(bool),
    /// Number (double precision)
    Number(f64),
    /// String
    String(String),
    /// Shared object, compared by reference
    Object(ObjectRef),
}

impl Value {
    /// Name of the value's type
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Object(_) => "object",
        }
    }

    /// Borrow the object handle, if this is an object
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow the string, if this is a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the number, if this is a number
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Strict equality: primitives by value, objects by identity.
    ///
    /// `NaN` is never equal to itself and `0.0` equals `-0.0`.
    #[must_use]
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Build a value from JSON. Objects and arrays become fresh objects;
    /// array elements are keyed by their index.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Array(items) => Self::Object(ObjectRef::from_pairs(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), Self::from_json(item))),
            )),
            serde_json::Value::Object(map) => Self::Object(ObjectRef::from_pairs(
                map.iter().map(|(k, v)| (k.clone(), Self::from_json(v))),
            )),
        }
    }

    /// Render as JSON, including only enumerable properties.
    ///
    /// `Undefined` and non-finite numbers render as `null`.
    ///
    /// # Errors
    ///
    /// Returns `CyclicValue` if an object contains itself.
    pub fn to_json(&self) -> CoreResult<serde_json::Value> {
        let mut ancestors = Vec::new();
        self.to_json_inner(&mut ancestors)
    }

    fn to_json_inner(&self, ancestors: &mut Vec<usize>) -> CoreResult<serde_json::Value> {
        Ok(match self {
            Self::Undefined | Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Object(obj) => {
                let addr = obj.addr();
                if ancestors.contains(&addr) {
                    return Err(CoreError::CyclicValue);
                }
                ancestors.push(addr);
                let mut map = serde_json::Map::new();
                for (key, value) in obj.enumerable_entries() {
                    map.insert(key, value.to_json_inner(ancestors)?);
                }
                ancestors.pop();
                serde_json::Value::Object(map)
            }
        })
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}

/// A property slot with its attribute flags
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Current value
    pub value: Value,
    /// Visible to key enumeration
    pub enumerable: bool,
    /// Value may be replaced
    pub writable: bool,
    /// Property may be removed or redefined
    pub configurable: bool,
}

impl Property {
    /// Create a plain data property (all flags set)
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            enumerable: true,
            writable: true,
            configurable: true,
        }
    }

    /// Set the enumerable flag
    #[must_use]
    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = enumerable;
        self
    }

    /// Set the writable flag
    #[must_use]
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    /// Set the configurable flag
    #[must_use]
    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }
}

/// Ordered property map
#[derive(Debug, Clone, Default)]
pub struct Object {
    properties: IndexMap<String, Property>,
}

impl Object {
    /// Create an empty object
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a property's value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).map(|p| &p.value)
    }

    /// Get a property with its attributes
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    /// Check that `set(key, ..)` would succeed
    ///
    /// # Errors
    ///
    /// Returns `ReadOnly` if the property exists and is not writable
    pub fn check_set(&self, key: &str) -> CoreResult<()> {
        match self.properties.get(key) {
            Some(prop) if !prop.writable => Err(CoreError::ReadOnly {
                key: key.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Check that `delete(key)` would succeed
    ///
    /// # Errors
    ///
    /// Returns `NonConfigurable` if the property exists and is not configurable
    pub fn check_delete(&self, key: &str) -> CoreResult<()> {
        match self.properties.get(key) {
            Some(prop) if !prop.configurable => Err(CoreError::NonConfigurable {
                key: key.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Assign a value, creating a plain property if absent
    ///
    /// # Errors
    ///
    /// Returns `ReadOnly` if the property exists and is not writable
    pub fn set(&mut self, key: &str, value: Value) -> CoreResult<()> {
        self.check_set(key)?;
        match self.properties.get_mut(key) {
            Some(prop) => prop.value = value,
            None => {
                self.properties.insert(key.to_string(), Property::new(value));
            }
        }
        Ok(())
    }

    /// Define (or redefine) a property with explicit attributes
    ///
    /// # Errors
    ///
    /// Returns `NonConfigurable` if the existing property is not configurable
    pub fn define(&mut self, key: &str, property: Property) -> CoreResult<()> {
        self.check_delete(key)?;
        self.properties.insert(key.to_string(), property);
        Ok(())
    }

    /// Remove a property. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `NonConfigurable` if the property is not configurable
    pub fn delete(&mut self, key: &str) -> CoreResult<bool> {
        self.check_delete(key)?;
        Ok(self.properties.shift_remove(key).is_some())
    }

    /// Own enumerable keys in insertion order
    #[must_use]
    pub fn own_enumerable_keys(&self) -> Vec<String> {
        self.properties
            .iter()
            .filter(|(_, p)| p.enumerable)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Own enumerable key/value pairs in insertion order
    #[must_use]
    pub fn enumerable_entries(&self) -> Vec<(String, Value)> {
        self.properties
            .iter()
            .filter(|(_, p)| p.enumerable)
            .map(|(k, p)| (k.clone(), p.value.clone()))
            .collect()
    }

    /// Check whether a property exists, enumerable or not
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Number of properties, enumerable or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if there are no properties
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Shared handle to an [`Object`].
///
/// Clones share the same object; equality is identity.
#[derive(Clone, Default)]
pub struct ObjectRef(Arc<RwLock<Object>>);

impl ObjectRef {
    /// Create a new empty object
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing object
    #[must_use]
    pub fn from_object(object: Object) -> Self {
        Self(Arc::new(RwLock::new(object)))
    }

    /// Create an object from key/value pairs, in order
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut object = Object::new();
        for (key, value) in pairs {
            object
                .properties
                .insert(key.into(), Property::new(value.into()));
        }
        Self::from_object(object)
    }

    /// Check whether two handles point to the same object
    #[must_use]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Get a property's value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    /// Get a property with its attributes
    #[must_use]
    pub fn property(&self, key: &str) -> Option<Property> {
        self.0.read().property(key).cloned()
    }

    /// See [`Object::check_set`]
    ///
    /// # Errors
    ///
    /// Returns `ReadOnly` if the property exists and is not writable
    pub fn check_set(&self, key: &str) -> CoreResult<()> {
        self.0.read().check_set(key)
    }

    /// See [`Object::check_delete`]
    ///
    /// # Errors
    ///
    /// Returns `NonConfigurable` if the property is not configurable
    pub fn check_delete(&self, key: &str) -> CoreResult<()> {
        self.0.read().check_delete(key)
    }

    /// See [`Object::set`]
    ///
    /// # Errors
    ///
    /// Returns `ReadOnly` if the property exists and is not writable
    pub fn set(&self, key: &str, value: impl Into<Value>) -> CoreResult<()> {
        self.0.write().set(key, value.into())
    }

    /// See [`Object::define`]
    ///
    /// # Errors
    ///
    /// Returns `NonConfigurable` if the existing property is not configurable
    pub fn define(&self, key: &str, property: Property) -> CoreResult<()> {
        self.0.write().define(key, property)
    }

    /// See [`Object::delete`]
    ///
    /// # Errors
    ///
    /// Returns `NonConfigurable` if the property is not configurable
    pub fn delete(&self, key: &str) -> CoreResult<bool> {
        self.0.write().delete(key)
    }

    /// Own enumerable keys, read fresh on every call
    #[must_use]
    pub fn own_enumerable_keys(&self) -> Vec<String> {
        self.0.read().own_enumerable_keys()
    }

    /// Own enumerable key/value pairs under a single read lock
    #[must_use]
    pub fn enumerable_entries(&self) -> Vec<(String, Value)> {
        self.0.read().enumerable_entries()
    }

    /// Check whether a property exists
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    /// Number of properties
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Check if there are no properties
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Identity only; contents may be cyclic or locked.
        match self.0.try_read() {
            Some(obj) => write!(f, "ObjectRef({:#x}, {} props)", self.addr(), obj.len()),
            None => write!(f, "ObjectRef({:#x}, locked)", self.addr()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_eq_primitives() {
        assert_eq!(Value::from("a"), Value::from("a"));
        assert_eq!(Value::from(12), Value::Number(12.0));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::Null, Value::Undefined);
        assert_eq!(Value::Number(0.0), Value::Number(-0.0));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }

    #[test]
    fn test_strict_eq_objects_by_identity() {
        let a = ObjectRef::from_pairs([("age", 12)]);
        let b = ObjectRef::from_pairs([("age", 12)]);
        assert_ne!(Value::from(a.clone()), Value::from(b));
        assert_eq!(Value::from(a.clone()), Value::from(a));
    }

    #[test]
    fn test_set_and_get() {
        let obj = ObjectRef::new();
        obj.set("name", "A").unwrap();
        assert_eq!(obj.get("name"), Some(Value::from("A")));
        assert_eq!(obj.get("missing"), None);
    }

    #[test]
    fn test_set_read_only_fails() {
        let obj = ObjectRef::new();
        obj.define("fixed", Property::new(1).with_writable(false))
            .unwrap();
        let err = obj.set("fixed", 2).unwrap_err();
        assert_eq!(
            err,
            CoreError::ReadOnly {
                key: "fixed".to_string()
            }
        );
        assert_eq!(obj.get("fixed"), Some(Value::from(1)));
    }

    #[test]
    fn test_delete_non_configurable_fails() {
        let obj = ObjectRef::new();
        obj.define("pinned", Property::new(1).with_configurable(false))
            .unwrap();
        assert!(obj.delete("pinned").is_err());
        assert!(obj.define("pinned", Property::new(2)).is_err());
        assert!(obj.contains_key("pinned"));
    }

    #[test]
    fn test_delete_reports_existence() {
        let obj = ObjectRef::from_pairs([("a", 1)]);
        assert!(obj.delete("a").unwrap());
        assert!(!obj.delete("a").unwrap());
    }

    #[test]
    fn test_enumeration_skips_hidden() {
        let obj = ObjectRef::from_pairs([("a", 1), ("b", 2)]);
        obj.define("hidden", Property::new(3).with_enumerable(false))
            .unwrap();
        assert_eq!(obj.own_enumerable_keys(), vec!["a", "b"]);
        assert_eq!(obj.len(), 3);
    }

    #[test]
    fn test_enumeration_is_fresh() {
        let obj = ObjectRef::from_pairs([("a", 1)]);
        assert_eq!(obj.own_enumerable_keys(), vec!["a"]);
        obj.set("b", 2).unwrap();
        obj.delete("a").unwrap();
        assert_eq!(obj.own_enumerable_keys(), vec!["b"]);
    }

    #[test]
    fn test_delete_preserves_order() {
        let obj = ObjectRef::from_pairs([("a", 1), ("b", 2), ("c", 3)]);
        obj.delete("b").unwrap();
        assert_eq!(obj.own_enumerable_keys(), vec!["a", "c"]);
    }

    #[test]
    fn test_from_json_to_json() {
        let json = json!({"name": "A", "data": {"age": 12}, "ok": true, "none": null});
        let value = Value::from_json(&json);
        assert!(value.as_object().is_some());
        assert_eq!(value.to_json().unwrap(), json);
    }

    #[test]
    fn test_to_json_numbers() {
        assert_eq!(Value::from(12).to_json().unwrap(), json!(12));
        assert_eq!(Value::from(1.5).to_json().unwrap(), json!(1.5));
        assert_eq!(Value::Number(f64::NAN).to_json().unwrap(), json!(null));
        assert_eq!(Value::Undefined.to_json().unwrap(), json!(null));
    }

    #[test]
    fn test_to_json_array_becomes_indexed_object() {
        let value = Value::from_json(&json!(["x", "y"]));
        assert_eq!(value.to_json().unwrap(), json!({"0": "x", "1": "y"}));
    }

    #[test]
    fn test_to_json_cycle() {
        let obj = ObjectRef::new();
        obj.set("me", obj.clone()).unwrap();
        assert_eq!(
            Value::from(obj).to_json().unwrap_err(),
            CoreError::CyclicValue
        );
    }

    #[test]
    fn test_to_json_shared_child_is_not_a_cycle() {
        let child = ObjectRef::from_pairs([("v", 1)]);
        let parent = ObjectRef::from_pairs([("a", child.clone()), ("b", child)]);
        let json = Value::from(parent).to_json().unwrap();
        assert_eq!(json, json!({"a": {"v": 1}, "b": {"v": 1}}));
    }

    #[test]
    fn test_debug_does_not_recurse() {
        let obj = ObjectRef::new();
        obj.set("me", obj.clone()).unwrap();
        let s = format!("{:?}", obj);
        assert!(s.contains("1 props"));
    }
}
