#![forbid(unsafe_code)]

//! The validation mapping and its deep-merge engine
//!
//! A `ValidationMapping` is a keyed container of validation name to
//! parameters. Composing operations never touch the receiver: every call
//! returns a new instance with its own storage, so earlier links of a chain
//! stay valid after the chain is continued or split.

use crate::error::InvokeError;
use crate::types::{Params, Value};
use crate::variant::{Dispatch, Variant, next_identity};
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

/// Marker for values that should be treated as a trailing options argument
pub trait ExtractableOptions {
    /// Returns true when the value is an options container
    fn is_extractable_options(&self) -> bool;
}

/// A keyed container of validation name to parameters
pub struct ValidationMapping {
    variant: Variant,
    entries: Params,
    id: u64,
}

impl ValidationMapping {
    /// Creates an empty mapping of the given variant
    pub fn new(variant: &Variant) -> Self {
        Self::with_entries(variant.clone(), Params::new())
    }

    fn with_entries(variant: Variant, entries: Params) -> Self {
        Self {
            variant,
            entries,
            id: next_identity(),
        }
    }

    /// The variant this mapping dispatches aliases through
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    /// Opaque identity token of this instance
    pub fn identity(&self) -> u64 {
        self.id
    }

    /// Borrows the underlying keyed container
    pub fn as_params(&self) -> &Params {
        &self.entries
    }

    /// Consumes the mapping, returning the underlying keyed container
    pub fn into_params(self) -> Params {
        self.entries
    }

    /// Sets a single entry on this instance only
    ///
    /// Other instances, including the one this mapping was composed from,
    /// are never affected.
    pub fn insert(&mut self, name: impl Into<String>, params: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), params.into())
    }

    /// Composes `params` into `name`, then each of `extra` in order
    ///
    /// When both the current value and the incoming value are keyed
    /// containers, the incoming top-level keys overwrite the current ones and
    /// other keys are kept. Nested containers are replaced, not merged.
    /// Otherwise the incoming value replaces the current one.
    pub fn compose_deep(&self, name: &str, params: Value, extra: &[Value]) -> Self {
        let composed = self.compose_deep_internal(name, params);
        extra.iter().fold(composed, |mapping, opt| {
            mapping.compose_deep_internal(name, opt.clone())
        })
    }

    fn compose_deep_internal(&self, name: &str, params: Value) -> Self {
        let merged = match (self.entries.get(name), params) {
            (Some(Value::Object(current)), Value::Object(incoming)) => {
                let mut merged = current.clone();
                for (key, value) in incoming {
                    merged.insert(key, value);
                }
                Value::Object(merged)
            }
            (_, params) => params,
        };
        tracing::trace!(mapping = %self.describe(), validation = name, "Composed validation");

        let mut entries = self.entries.clone();
        entries.insert(name.to_string(), merged);
        Self::with_entries(self.variant.clone(), entries)
    }

    /// Adds each top-level key of `defaults` that this mapping lacks
    ///
    /// Existing keys always win.
    pub fn defaults(&self, defaults: &Params) -> Self {
        let mut entries = self.entries.clone();
        for (key, value) in defaults {
            entries
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        Self::with_entries(self.variant.clone(), entries)
    }

    /// Runs the alias `name` with `args` and returns the resulting mapping
    ///
    /// # Errors
    ///
    /// Returns `InvokeError::NotDefined` if this mapping's variant has no
    /// such alias, `InvokeError::AliasCycle` if a chain of value aliases
    /// leads back to a name already on the chain, or whatever error the
    /// alias body reports.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<ValidationMapping, InvokeError> {
        let mut current = name.to_string();
        let mut args = args.to_vec();
        let mut chain: Vec<String> = Vec::new();

        loop {
            let op = self
                .variant
                .lookup(&current)
                .ok_or_else(|| InvokeError::NotDefined {
                    variant: self.variant.display_name(),
                    name: current.clone(),
                })?;
            tracing::trace!(mapping = %self.describe(), alias = %current, args = args.len(), "Invoking alias");

            match op {
                Dispatch::Run(op) => return op(self, &args),
                Dispatch::Forward { target, params } => {
                    if chain.contains(&current) {
                        return Err(InvokeError::AliasCycle { alias: current });
                    }
                    args.insert(0, params);
                    chain.push(std::mem::replace(&mut current, target.into()));
                }
            }
        }
    }

    /// Whether this mapping's variant knows the alias `name`
    pub fn responds_to(&self, name: &str) -> bool {
        self.variant.responds_to(name)
    }

    /// Debug representation: `<VariantName:0xIDENTITY>`
    pub fn describe(&self) -> String {
        format!("<{}:0x{:x}>", self.variant.display_name(), self.id)
    }
}

macro_rules! builtin_shortcuts {
    ($($name:ident),* $(,)?) => {
        impl ValidationMapping {
            $(
                #[doc = concat!("Invokes the `", stringify!($name), "` alias with a single argument")]
                pub fn $name(&self, arg: impl Into<Value>) -> Result<ValidationMapping, InvokeError> {
                    self.invoke(stringify!($name), &[arg.into()])
                }
            )*
        }
    };
}

builtin_shortcuts!(
    absence,
    confirmation,
    format,
    inclusion,
    numericality,
    acceptance,
    exclusion,
    length,
    presence,
    uniqueness,
    associated,
    size,
);

impl ExtractableOptions for ValidationMapping {
    fn is_extractable_options(&self) -> bool {
        true
    }
}

impl Clone for ValidationMapping {
    /// Copies the entries into a new instance with its own identity
    fn clone(&self) -> Self {
        Self::with_entries(self.variant.clone(), self.entries.clone())
    }
}

impl Deref for ValidationMapping {
    type Target = Params;

    fn deref(&self) -> &Params {
        &self.entries
    }
}

impl PartialEq for ValidationMapping {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl PartialEq<Params> for ValidationMapping {
    fn eq(&self, other: &Params) -> bool {
        &self.entries == other
    }
}

impl Serialize for ValidationMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl From<ValidationMapping> for Params {
    fn from(mapping: ValidationMapping) -> Self {
        mapping.entries
    }
}

impl From<ValidationMapping> for Value {
    fn from(mapping: ValidationMapping) -> Self {
        Value::Object(mapping.entries)
    }
}

impl fmt::Display for ValidationMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl fmt::Debug for ValidationMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationMapping")
            .field("variant", &self.variant.display_name())
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty() -> ValidationMapping {
        Variant::seeded("Mappings").new_mapping()
    }

    #[test]
    fn test_scalar_replace() {
        let mapping = empty()
            .compose_deep("k", json!(5), &[])
            .compose_deep("k", json!("x"), &[]);
        assert_eq!(mapping["k"], json!("x"));
    }

    #[test]
    fn test_container_merge_is_shallow_by_key() {
        let mapping = empty().compose_deep("k", json!({"a": 1, "b": 2}), &[]);
        let merged = mapping.compose_deep("k", json!({"b": 3, "c": 4}), &[]);
        assert_eq!(merged["k"], json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_nested_containers_are_replaced() {
        let mapping = empty().compose_deep("k", json!({"if": {"a": 1, "b": 2}}), &[]);
        let merged = mapping.compose_deep("k", json!({"if": {"c": 3}}), &[]);
        assert_eq!(merged["k"], json!({"if": {"c": 3}}));
    }

    #[test]
    fn test_mixed_shapes_replace() {
        let container = empty().compose_deep("k", json!({"if": false}), &[]);
        assert_eq!(container.compose_deep("k", json!(true), &[])["k"], json!(true));

        let scalar = empty().compose_deep("k", json!(true), &[]);
        assert_eq!(
            scalar.compose_deep("k", json!({"if": false}), &[])["k"],
            json!({"if": false})
        );
    }

    #[test]
    fn test_chained_overrides_apply_left_to_right() {
        let mapping = empty().compose_deep("k", json!({"a": 1}), &[json!({"b": 2}), json!({"a": 3})]);
        assert_eq!(mapping["k"], json!({"a": 3, "b": 2}));
    }

    #[test]
    fn test_compose_leaves_receiver_untouched() {
        let base = empty().compose_deep("k", json!({"a": 1}), &[]);
        let composed = base.compose_deep("k", json!({"b": 2}), &[]);
        assert_eq!(base["k"], json!({"a": 1}));
        assert_eq!(composed["k"], json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_mutating_result_does_not_affect_receiver() {
        let base = empty().compose_deep("k", json!({"a": 1}), &[]);
        let mut composed = base.compose_deep("other", json!(true), &[]);
        composed.insert("k", json!({"a": 99}));
        composed.insert("fresh", json!(1));

        assert_eq!(base["k"], json!({"a": 1}));
        assert!(!base.contains_key("fresh"));
        assert!(!base.contains_key("other"));
    }

    #[test]
    fn test_mutating_receiver_does_not_affect_result() {
        let mut base = empty().compose_deep("k", json!({"a": 1}), &[]);
        let composed = base.compose_deep("k", json!({"b": 2}), &[]);
        base.insert("k", json!({"a": 99}));
        base.insert("fresh", json!(1));

        assert_eq!(composed["k"], json!({"a": 1, "b": 2}));
        assert!(!composed.contains_key("fresh"));
    }

    #[test]
    fn test_defaults_existing_key_wins() {
        let mapping = empty().compose_deep("presence", json!(true), &[]);
        let filled = mapping.defaults(json!({"presence": false}).as_object().unwrap());
        assert_eq!(filled["presence"], json!(true));
    }

    #[test]
    fn test_defaults_fills_absent_key() {
        let filled = empty().defaults(json!({"length": {"foo": "bar"}}).as_object().unwrap());
        assert_eq!(filled["length"], json!({"foo": "bar"}));
    }

    #[test]
    fn test_is_extractable_options() {
        assert!(empty().is_extractable_options());
    }

    #[test]
    fn test_describe_named_variant() {
        let variant = Variant::seeded("TestingVals");
        let mapping = variant.new_mapping();
        assert_eq!(
            mapping.describe(),
            format!("<TestingVals:0x{:x}>", mapping.identity())
        );
        assert_eq!(mapping.to_string(), mapping.describe());
    }

    #[test]
    fn test_describe_anonymous_variant() {
        let variant = Variant::seeded("Parent").derive();
        let mapping = variant.new_mapping();
        assert_eq!(
            mapping.describe(),
            format!(
                "<(Anonymous:0x{:x}):0x{:x}>",
                variant.identity(),
                mapping.identity()
            )
        );
    }

    #[test]
    fn test_each_instance_has_its_own_identity() {
        let base = empty();
        let composed = base.compose_deep("k", json!(1), &[]);
        let cloned = composed.clone();
        assert_ne!(base.identity(), composed.identity());
        assert_ne!(composed.identity(), cloned.identity());
        assert_eq!(composed, cloned);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mapping = empty().compose_deep("presence", json!(true), &[]);
        assert_eq!(
            serde_json::to_value(&mapping).unwrap(),
            json!({"presence": true})
        );
    }

    #[test]
    fn test_invoke_unknown_alias() {
        let mapping = empty();
        let err = mapping.invoke("nope", &[]).unwrap_err();
        assert_eq!(
            err,
            InvokeError::NotDefined {
                variant: "Mappings".to_string(),
                name: "nope".to_string(),
            }
        );
    }

    #[test]
    fn test_builtin_shortcuts_chain() {
        let mapping = empty()
            .presence(true)
            .unwrap()
            .uniqueness(json!({"scope": "account_id"}))
            .unwrap();
        assert_eq!(mapping["presence"], json!(true));
        assert_eq!(mapping["uniqueness"], json!({"scope": "account_id"}));
    }
}
