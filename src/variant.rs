#![forbid(unsafe_code)]

//! Variants: alias registries with copy-on-derive inheritance
//!
//! A `Variant` owns two pieces of state:
//! - the ordered list of alias names it knows (built-ins first, then
//!   ancestor additions, then its own)
//! - a dispatch table from alias name to the operation that runs it
//!
//! Deriving a variant copies both at the moment of derivation. Later
//! definitions on the parent never reach the child, and vice versa.

use crate::builtin;
use crate::error::{DefineError, InvokeError};
use crate::mapping::ValidationMapping;
use crate::types::{ValidationName, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Names that collide with the mapping's own protocol surface
pub const RESERVED_NAMES: &[&str] = &[
    "extractable_options?",
    "is_extractable_options",
    "class",
    "inspect",
    "describe",
    "merge",
    "deep_merge",
    "deep_merge_internal",
    "compose_deep",
    "compose_deep_internal",
];

/// Name of the process-wide base variant
pub const ROOT_VARIANT_NAME: &str = "NamedValidations";

/// An alias body: receives the mapping and the caller's arguments
pub type AliasFn =
    Arc<dyn Fn(&ValidationMapping, &[Value]) -> Result<ValidationMapping, InvokeError> + Send + Sync>;

static ROOT: LazyLock<Variant> = LazyLock::new(|| Variant::seeded(ROOT_VARIANT_NAME));

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// Hands out opaque identity tokens for variants and mapping instances
pub(crate) fn next_identity() -> u64 {
    NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed)
}

/// How a new alias is defined
pub enum AliasDefinition {
    /// Forward to an already-known alias with fixed parameters
    Value { target: String, params: Value },
    /// Run an arbitrary operation
    Block(AliasFn),
}

impl AliasDefinition {
    /// Shorthand for a value alias
    pub fn value(target: impl Into<String>, params: impl Into<Value>) -> Self {
        AliasDefinition::Value {
            target: target.into(),
            params: params.into(),
        }
    }

    /// Shorthand for a block alias
    pub fn block<F>(f: F) -> Self
    where
        F: Fn(&ValidationMapping, &[Value]) -> Result<ValidationMapping, InvokeError>
            + Send
            + Sync
            + 'static,
    {
        AliasDefinition::Block(Arc::new(f))
    }
}

impl fmt::Debug for AliasDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AliasDefinition::Value { target, params } => f
                .debug_struct("Value")
                .field("target", target)
                .field("params", params)
                .finish(),
            AliasDefinition::Block(_) => f.write_str("Block(..)"),
        }
    }
}

/// A bound alias body
#[derive(Clone)]
pub(crate) enum Dispatch {
    /// Runs `target` with `params` prepended to the caller's arguments
    Forward { target: ValidationName, params: Value },
    /// Runs an operation directly
    Run(AliasFn),
}

#[derive(Clone, Default)]
struct Registry {
    aliases: Vec<ValidationName>,
    table: HashMap<ValidationName, Dispatch>,
}

struct Descriptor {
    name: Option<String>,
    id: u64,
    registry: RwLock<Registry>,
}

/// A mapping "class": its own alias list and dispatch table
///
/// Handles are cheap to clone and compare by identity.
#[derive(Clone)]
pub struct Variant {
    inner: Arc<Descriptor>,
}

impl Variant {
    /// The process-wide base variant, seeded with the built-in aliases
    pub fn root() -> Variant {
        ROOT.clone()
    }

    /// A fresh base variant seeded with the built-in aliases
    ///
    /// Unlike [`Variant::root`] nothing is shared with other base variants.
    pub fn seeded(name: impl Into<String>) -> Variant {
        let variant = Variant::with_registry(Some(name.into()), Registry::default());
        builtin::seed(&variant);
        variant
    }

    fn with_registry(name: Option<String>, registry: Registry) -> Variant {
        Variant {
            inner: Arc::new(Descriptor {
                name,
                id: next_identity(),
                registry: RwLock::new(registry),
            }),
        }
    }

    /// Derives an anonymous variant from this one
    pub fn derive(&self) -> Variant {
        self.derive_with(None)
    }

    /// Derives a named variant from this one
    pub fn derive_named(&self, name: impl Into<String>) -> Variant {
        self.derive_with(Some(name.into()))
    }

    fn derive_with(&self, name: Option<String>) -> Variant {
        let snapshot = self.registry().clone();
        let child = Variant::with_registry(name, snapshot);
        tracing::debug!(
            parent = %self.display_name(),
            child = %child.display_name(),
            aliases = child.registry().aliases.len(),
            "Derived variant"
        );
        child
    }

    /// The variant's name, if it has one
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Opaque identity token of this variant
    pub fn identity(&self) -> u64 {
        self.inner.id
    }

    /// The name used in descriptions, synthesized for anonymous variants
    pub fn display_name(&self) -> String {
        match &self.inner.name {
            Some(name) => name.clone(),
            None => format!("(Anonymous:0x{:x})", self.inner.id),
        }
    }

    /// All alias names known to this variant, in definition order
    pub fn aliases(&self) -> Vec<ValidationName> {
        self.registry().aliases.clone()
    }

    /// Whether an alias with this name can be invoked
    pub fn responds_to(&self, name: &str) -> bool {
        self.registry().table.contains_key(name)
    }

    /// A new, empty mapping of this variant
    pub fn new_mapping(&self) -> ValidationMapping {
        ValidationMapping::new(self)
    }

    /// Defines a new alias
    ///
    /// # Errors
    ///
    /// Returns `DefineError` if:
    /// - `name` is one of [`RESERVED_NAMES`]
    /// - `name` is not a valid identifier
    /// - a value alias targets a name this variant does not know
    pub fn define(
        &self,
        name: &str,
        definition: AliasDefinition,
    ) -> Result<ValidationName, DefineError> {
        if RESERVED_NAMES.contains(&name) {
            return Err(DefineError::ReservedName(name.to_string()));
        }
        let alias = ValidationName::new(name)
            .ok_or_else(|| DefineError::InvalidName(name.to_string()))?;

        let op = match definition {
            AliasDefinition::Block(op) => Dispatch::Run(op),
            AliasDefinition::Value { target, params } => {
                let target = self
                    .registry()
                    .aliases
                    .iter()
                    .find(|known| known.as_str() == target)
                    .cloned()
                    .ok_or_else(|| DefineError::UnknownAlias {
                        name: name.to_string(),
                        target: target.clone(),
                    })?;
                Dispatch::Forward { target, params }
            }
        };

        self.register(alias.clone(), op);
        tracing::debug!(variant = %self.display_name(), alias = %alias, "Defined alias");
        Ok(alias)
    }

    /// Defines a value alias: `name(opts..)` runs `target(params, opts..)`
    pub fn define_value(
        &self,
        name: &str,
        target: &str,
        params: impl Into<Value>,
    ) -> Result<ValidationName, DefineError> {
        self.define(name, AliasDefinition::value(target, params))
    }

    /// Defines a block alias from an arbitrary operation
    pub fn define_block<F>(&self, name: &str, f: F) -> Result<ValidationName, DefineError>
    where
        F: Fn(&ValidationMapping, &[Value]) -> Result<ValidationMapping, InvokeError>
            + Send
            + Sync
            + 'static,
    {
        self.define(name, AliasDefinition::block(f))
    }

    /// Defines an alias that composes its first argument into `name`
    ///
    /// Further arguments are applied as sequential overrides.
    pub fn define_builtin(&self, name: &str) -> Result<ValidationName, DefineError> {
        let target = ValidationName::new(name)
            .ok_or_else(|| DefineError::InvalidName(name.to_string()))?;
        self.define(name, AliasDefinition::Block(builtin::compose_into(target)))
    }

    /// Appends `name` to this variant's list and binds its operation
    ///
    /// Redefining a name rebinds it and appends it again.
    pub(crate) fn register(&self, name: ValidationName, op: Dispatch) {
        let mut registry = self.registry_mut();
        registry.table.insert(name.clone(), op);
        registry.aliases.push(name);
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Dispatch> {
        self.registry().table.get(name).cloned()
    }

    fn registry(&self) -> RwLockReadGuard<'_, Registry> {
        self.inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Variant {}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("name", &self.display_name())
            .field("aliases", &self.registry().aliases)
            .finish()
    }
}
