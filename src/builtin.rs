#![forbid(unsafe_code)]

//! Built-in aliases seeded into every base variant
//!
//! One alias per validation kind understood by common validation frameworks,
//! plus `defaults` for non-destructive option filling.

use crate::error::InvokeError;
use crate::mapping::ValidationMapping;
use crate::types::{ValidationName, Value};
use crate::variant::{AliasFn, Dispatch, Variant};
use std::sync::Arc;

/// Validation kinds seeded as aliases, in registration order
pub const BUILTIN_VALIDATIONS: &[&str] = &[
    "absence",
    "confirmation",
    "format",
    "inclusion",
    "numericality",
    "acceptance",
    "exclusion",
    "length",
    "presence",
    "uniqueness",
    "associated",
    "size",
];

/// Alias that fills in missing top-level keys
pub const DEFAULTS_ALIAS: &str = "defaults";

/// Seeds `variant` with every built-in alias
pub(crate) fn seed(variant: &Variant) {
    for &name in BUILTIN_VALIDATIONS {
        let name = ValidationName::from_static(name);
        variant.register(name.clone(), Dispatch::Run(compose_into(name)));
    }
    variant.register(
        ValidationName::from_static(DEFAULTS_ALIAS),
        Dispatch::Run(Arc::new(fill_defaults)),
    );
}

/// Body of a built-in alias: `name(arg, opts..)` composes `arg` then each opt
pub(crate) fn compose_into(name: ValidationName) -> AliasFn {
    Arc::new(move |mapping: &ValidationMapping, args: &[Value]| {
        let (arg, opts) = args.split_first().ok_or_else(|| InvokeError::WrongArgumentCount {
            alias: name.to_string(),
            expected: 1,
            given: 0,
        })?;
        Ok(mapping.compose_deep(name.as_str(), arg.clone(), opts))
    })
}

fn fill_defaults(mapping: &ValidationMapping, args: &[Value]) -> Result<ValidationMapping, InvokeError> {
    match args {
        [Value::Object(defaults)] => Ok(mapping.defaults(defaults)),
        [other] => Err(InvokeError::InvalidArgument {
            alias: DEFAULTS_ALIAS.to_string(),
            message: format!("expected a keyed container, got {other}"),
        }),
        _ => Err(InvokeError::WrongArgumentCount {
            alias: DEFAULTS_ALIAS.to_string(),
            expected: 1,
            given: args.len(),
        }),
    }
}
