//! # Property-Interception Facade
//!
//! Lookup-or-default adapter mapping dynamic property access onto the four
//! engine operations. A fixed allow-list of real method/accessor names is
//! checked first; any other name routes to `getItem`/`setItem`/`removeItem`.
//! Values are coerced to their string form before the engine sees them, so
//! a value that stringifies identically to the stored one hits the engine's
//! same-value no-op.

use std::sync::Arc;

use crate::storage::{StorageArea, StorageError, StorageResult};

/// Real method/accessor names that dynamic access must not shadow
pub const RESERVED_PROPS: [&str; 6] = ["length", "key", "getItem", "setItem", "removeItem", "clear"];

/// A dynamic host value on its way into or out of storage
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A string
    Str(String),
    /// An integer
    Int(i64),
    /// A floating-point number
    Float(f64),
    /// A boolean
    Bool(bool),
    /// The host's null
    Null,
    /// The host's undefined/missing value
    Undefined,
    /// A plain object (stringifies as "[object Object]")
    Object,
    /// An identity-only value with no string representation (the Symbol
    /// case); coercion fails with `InvalidArgument`
    Opaque(String),
}

impl PropertyValue {
    /// Coerce to the string representation stored by the engine
    pub fn coerce(&self) -> StorageResult<String> {
        match self {
            PropertyValue::Str(s) => Ok(s.clone()),
            PropertyValue::Int(i) => Ok(i.to_string()),
            PropertyValue::Float(f) => {
                if f.is_nan() {
                    Ok("NaN".to_string())
                } else if f.is_infinite() {
                    Ok(if *f > 0.0 { "Infinity" } else { "-Infinity" }.to_string())
                } else {
                    Ok(f.to_string())
                }
            }
            PropertyValue::Bool(b) => Ok(b.to_string()),
            PropertyValue::Null => Ok("null".to_string()),
            PropertyValue::Undefined => Ok("undefined".to_string()),
            PropertyValue::Object => Ok("[object Object]".to_string()),
            PropertyValue::Opaque(desc) => Err(StorageError::InvalidArgument(format!(
                "can't convert {} to string",
                desc
            ))),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Str(s.to_string())
    }
}

/// Result of a dynamic property read
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyRead {
    /// The name is a reserved method/accessor, not a stored entry
    Reserved,
    /// A stored value
    Value(String),
    /// No entry under this name
    Absent,
}

/// Result of a dynamic property write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyWrite {
    /// Stored through `setItem`
    Stored,
    /// Rejected: the name shadows a reserved method/accessor
    Rejected,
}

/// Adapter routing dynamic property access to one storage area.
#[derive(Debug, Clone)]
pub struct StorageProxy {
    area: Arc<StorageArea>,
}

impl StorageProxy {
    /// Wrap an area
    pub fn new(area: Arc<StorageArea>) -> Self {
        Self { area }
    }

    /// The underlying area
    pub fn area(&self) -> &Arc<StorageArea> {
        &self.area
    }

    fn is_reserved(prop: &str) -> bool {
        RESERVED_PROPS.contains(&prop)
    }

    /// Dynamic property read: reserved names resolve to the real member,
    /// everything else goes through `getItem`.
    pub fn get(&self, prop: &str) -> PropertyRead {
        if Self::is_reserved(prop) {
            return PropertyRead::Reserved;
        }
        match self.area.get_item(prop) {
            Some(value) => PropertyRead::Value(value),
            None => PropertyRead::Absent,
        }
    }

    /// Dynamic property write: reserved names are rejected, everything else
    /// is coerced and stored through `setItem`.
    pub fn set(&self, prop: &str, value: &PropertyValue) -> StorageResult<PropertyWrite> {
        if Self::is_reserved(prop) {
            return Ok(PropertyWrite::Rejected);
        }
        let value = value.coerce()?;
        self.area.set_item(prop, &value)?;
        Ok(PropertyWrite::Stored)
    }

    /// Dynamic property delete: routes to `removeItem`; deleting a reserved
    /// name is a no-op success, as is deleting an absent entry.
    pub fn delete(&self, prop: &str) -> StorageResult<()> {
        if Self::is_reserved(prop) {
            return Ok(());
        }
        self.area.remove_item(prop)
    }

    /// Dynamic `in`-style probe
    pub fn has(&self, prop: &str) -> bool {
        Self::is_reserved(prop) || self.area.get_item(prop).is_some()
    }

    /// Enumerable property names: the stored keys in iteration order
    pub fn own_keys(&self) -> Vec<String> {
        self.area.keys()
    }

    /// Dynamic method invocation with arity checking.
    ///
    /// `setItem` requires two arguments; `getItem`, `removeItem` and `key`
    /// require one. Extraneous arguments are ignored. Unknown names fail
    /// with [`StorageError::NoSuchMethod`].
    pub fn invoke(&self, method: &str, args: &[PropertyValue]) -> StorageResult<PropertyValue> {
        match method {
            "length" => Ok(PropertyValue::Int(self.area.len() as i64)),
            "key" => {
                require("key", 1, args)?;
                match self.area.key(coerce_index(&args[0])) {
                    Some(key) => Ok(PropertyValue::Str(key)),
                    None => Ok(PropertyValue::Null),
                }
            }
            "getItem" => {
                require("getItem", 1, args)?;
                let key = args[0].coerce()?;
                match self.area.get_item(&key) {
                    Some(value) => Ok(PropertyValue::Str(value)),
                    None => Ok(PropertyValue::Null),
                }
            }
            "setItem" => {
                require("setItem", 2, args)?;
                let key = args[0].coerce()?;
                let value = args[1].coerce()?;
                self.area.set_item(&key, &value)?;
                Ok(PropertyValue::Undefined)
            }
            "removeItem" => {
                require("removeItem", 1, args)?;
                let key = args[0].coerce()?;
                self.area.remove_item(&key)?;
                Ok(PropertyValue::Undefined)
            }
            "clear" => {
                self.area.clear()?;
                Ok(PropertyValue::Undefined)
            }
            other => Err(StorageError::NoSuchMethod(other.to_string())),
        }
    }
}

fn require(method: &'static str, required: usize, args: &[PropertyValue]) -> StorageResult<()> {
    if args.len() < required {
        return Err(StorageError::MissingArgument {
            method,
            required,
            provided: args.len(),
        });
    }
    Ok(())
}

/// Non-numeric index arguments resolve to ordinal 0, numeric ones truncate
fn coerce_index(value: &PropertyValue) -> i64 {
    match value {
        PropertyValue::Int(i) => *i,
        PropertyValue::Float(f) => *f as i64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::{AreaRegistry, Dispatcher};
    use crate::storage::{StorageClass, StorageConfig};

    fn proxy() -> StorageProxy {
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(AreaRegistry::new())));
        StorageProxy::new(Arc::new(StorageArea::provisioned(
            StorageClass::Local,
            "origin-test".to_string(),
            &StorageConfig::default(),
            dispatcher,
        )))
    }

    #[test]
    fn test_coercion() {
        assert_eq!(PropertyValue::Int(42).coerce().unwrap(), "42");
        assert_eq!(PropertyValue::Float(1.5).coerce().unwrap(), "1.5");
        assert_eq!(PropertyValue::Float(f64::NAN).coerce().unwrap(), "NaN");
        assert_eq!(
            PropertyValue::Float(f64::NEG_INFINITY).coerce().unwrap(),
            "-Infinity"
        );
        assert_eq!(PropertyValue::Bool(true).coerce().unwrap(), "true");
        assert_eq!(PropertyValue::Null.coerce().unwrap(), "null");
        assert_eq!(PropertyValue::Undefined.coerce().unwrap(), "undefined");
        assert_eq!(PropertyValue::Object.coerce().unwrap(), "[object Object]");
    }

    #[test]
    fn test_opaque_value_is_rejected() {
        let proxy = proxy();
        let err = proxy
            .set("k", &PropertyValue::Opaque("Symbol(test)".to_string()))
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(_)));
        assert_eq!(proxy.area().len(), 0);
    }

    #[test]
    fn test_dynamic_get_set_delete() {
        let proxy = proxy();

        proxy.set("color", &PropertyValue::from("red")).unwrap();
        assert_eq!(proxy.get("color"), PropertyRead::Value("red".to_string()));
        assert!(proxy.has("color"));

        proxy.delete("color").unwrap();
        assert_eq!(proxy.get("color"), PropertyRead::Absent);
        assert!(!proxy.has("color"));
    }

    #[test]
    fn test_reserved_names_resolve_to_members() {
        let proxy = proxy();
        for name in RESERVED_PROPS {
            assert_eq!(proxy.get(name), PropertyRead::Reserved);
            assert!(proxy.has(name));
        }
    }

    #[test]
    fn test_reserved_write_is_rejected() {
        let proxy = proxy();
        let outcome = proxy.set("setItem", &PropertyValue::from("x")).unwrap();
        assert_eq!(outcome, PropertyWrite::Rejected);
        assert_eq!(proxy.area().get_item("setItem"), None);
    }

    #[test]
    fn test_delete_reserved_is_noop() {
        let proxy = proxy();
        proxy.delete("clear").unwrap();
        proxy.invoke("clear", &[]).unwrap();
    }

    #[test]
    fn test_non_string_values_are_stringified() {
        let proxy = proxy();
        proxy.set("n", &PropertyValue::Int(7)).unwrap();
        proxy.set("o", &PropertyValue::Object).unwrap();

        assert_eq!(proxy.area().get_item("n").as_deref(), Some("7"));
        assert_eq!(
            proxy.area().get_item("o").as_deref(),
            Some("[object Object]")
        );
    }

    #[test]
    fn test_own_keys_in_order() {
        let proxy = proxy();
        proxy.set("b", &PropertyValue::from("2")).unwrap();
        proxy.set("a", &PropertyValue::from("1")).unwrap();
        assert_eq!(proxy.own_keys(), vec!["b", "a"]);
    }

    #[test]
    fn test_invoke_arity_checks() {
        let proxy = proxy();

        let err = proxy.invoke("setItem", &[PropertyValue::from("k")]).unwrap_err();
        assert_eq!(
            err,
            StorageError::MissingArgument {
                method: "setItem",
                required: 2,
                provided: 1,
            }
        );

        let err = proxy.invoke("removeItem", &[]).unwrap_err();
        assert!(matches!(err, StorageError::MissingArgument { .. }));
    }

    #[test]
    fn test_invoke_ignores_extraneous_args() {
        let proxy = proxy();
        proxy
            .invoke(
                "setItem",
                &[
                    PropertyValue::from("k"),
                    PropertyValue::from("v"),
                    PropertyValue::from("ignored"),
                ],
            )
            .unwrap();
        assert_eq!(proxy.area().get_item("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_invoke_roundtrip() {
        let proxy = proxy();
        proxy
            .invoke("setItem", &[PropertyValue::from("k"), PropertyValue::Int(1)])
            .unwrap();

        assert_eq!(
            proxy.invoke("getItem", &[PropertyValue::from("k")]).unwrap(),
            PropertyValue::Str("1".to_string())
        );
        assert_eq!(proxy.invoke("length", &[]).unwrap(), PropertyValue::Int(1));
        assert_eq!(
            proxy.invoke("key", &[PropertyValue::Int(0)]).unwrap(),
            PropertyValue::Str("k".to_string())
        );
        // Non-numeric index resolves to ordinal 0
        assert_eq!(
            proxy.invoke("key", &[PropertyValue::from("nope")]).unwrap(),
            PropertyValue::Str("k".to_string())
        );
    }

    #[test]
    fn test_invoke_unknown_method() {
        let proxy = proxy();
        let err = proxy.invoke("evict", &[]).unwrap_err();
        assert_eq!(err, StorageError::NoSuchMethod("evict".to_string()));
    }
}
