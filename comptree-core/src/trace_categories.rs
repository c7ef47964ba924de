//! Trace utilities

/// Trace category for script emission.
pub const EMIT: &str = "emit";
/// Trace category for tree flattening.
pub const FLATTEN: &str = "flatten";
/// Trace category for installing scripts.
pub const INSTALL: &str = "install";
/// Trace category for configuration loading.
pub const LOAD: &str = "load";
/// Trace category for simulated completion requests.
pub const SIMULATE: &str = "simulate";
/// Trace category for table validation.
pub const VALIDATE: &str = "validate";
