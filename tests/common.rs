//! Test utilities for named-validations integration tests

#![allow(dead_code)]

use named_validations::{Value, Variant};
use serde_json::json;

/// Fallible fixture setup
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Unwraps an Ok alias result, panicking with the error otherwise
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("alias call failed: {:?}", e),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("{}: alias call failed: {:?}", $msg, e),
        }
    };
}

/// Unwraps a Some value, panicking otherwise
#[macro_export]
macro_rules! assert_some {
    ($expr:expr) => {
        match $expr {
            Some(v) => v,
            None => panic!("expected a value, found None"),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Some(v) => v,
            None => panic!("{}: expected a value, found None", $msg),
        }
    };
}

/// Names of the aliases defined by [`fixture_variant`], in definition order
pub const FIXTURE_ALIASES: &[&str] = &[
    "testing",
    "overwrite",
    "other_value1",
    "other_value2",
    "other_opts1",
    "other_opts2",
    "nesting",
    "block1",
    "block2",
    "block3",
    "reset",
    "arg0",
    "arg1",
    "arg2",
];

/// An anonymous variant derived from the root with a spread of aliases
pub fn fixture_variant() -> TestResult<Variant> {
    let vals = Variant::root().derive();

    vals.define_value("testing", "presence", true)?;
    vals.define_value("overwrite", "presence", false)?;

    vals.define_value("other_value1", "acceptance", true)?;
    vals.define_value("other_value2", "acceptance", "foo")?;
    vals.define_value("other_opts1", "acceptance", json!({"if": false}))?;
    vals.define_value("other_opts2", "acceptance", json!({"if": true, "unless": true}))?;

    vals.define_value("nesting", "other_opts1", json!({"if": true, "allow_blank": true}))?;

    vals.define_block("block1", |m, _| Ok(m.compose_deep("presence", json!(true), &[])))?;
    vals.define_block("block2", |m, _| Ok(m.compose_deep("presence", json!(false), &[])))?;
    vals.define_block("block3", |m, _| m.invoke("block1", &[])?.invoke("block2", &[]))?;

    vals.define_block("reset", |m, _| Ok(m.variant().new_mapping()))?;

    vals.define_block("arg0", |m, _| Ok(m.compose_deep("presence", json!(true), &[])))?;
    vals.define_block("arg1", |m, args| {
        let opt = args.first().cloned().unwrap_or(Value::Null);
        Ok(m.compose_deep("presence", opt, &[]))
    })?;
    vals.define_block("arg2", |m, args| {
        let opt1 = args.first().cloned().unwrap_or(Value::Null);
        let opt2 = args.get(1).cloned().unwrap_or(Value::Bool(false));
        Ok(m
            .compose_deep("presence", opt1, &[])
            .compose_deep("acceptance", opt2, &[]))
    })?;

    Ok(vals)
}
