#![forbid(unsafe_code)]

//! Error types for named validations
//!
//! Definition-time failures (`DefineError`), dispatch failures (`InvokeError`)
//! and alias-file failures (`ConfigError`) are kept apart and folded into the
//! top-level `Error` for callers that do not care which phase failed.

/// Errors raised while defining an alias on a variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefineError {
    /// The alias name collides with the mapping's own protocol surface
    #[error("reserved name {0}")]
    ReservedName(String),

    /// A value alias points at a name the variant does not know yet
    #[error("unknown alias {target} (while defining {name})")]
    UnknownAlias { name: String, target: String },

    /// The alias name is not a valid identifier
    #[error("invalid alias name: {0:?}")]
    InvalidName(String),
}

/// Errors raised while invoking an alias on a mapping
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
    /// The mapping's variant has no alias with this name
    #[error("undefined alias {name} for {variant}")]
    NotDefined { variant: String, name: String },

    /// An alias received the wrong number of arguments
    #[error("wrong number of arguments for {alias} (given {given}, expected {expected})")]
    WrongArgumentCount {
        alias: String,
        expected: usize,
        given: usize,
    },

    /// A chain of value aliases leads back to itself
    #[error("alias {alias} forwards to itself")]
    AliasCycle { alias: String },

    /// An argument has a shape the alias cannot use
    #[error("invalid argument for {alias}: {message}")]
    InvalidArgument { alias: String, message: String },
}

/// Errors raised while loading alias definitions from TOML
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The alias file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid TOML syntax or shape
    #[error("Invalid configuration syntax: {0}")]
    InvalidSyntax(#[from] toml::de::Error),

    /// Well-formed TOML with invalid contents
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Top-level error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Alias definition error
    #[error("Definition error: {0}")]
    Define(#[from] DefineError),

    /// Alias invocation error
    #[error("Invocation error: {0}")]
    Invoke(#[from] InvokeError),

    /// Alias file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
