//! Shared, version-pinned report identifiers.
//!
//! These constants are the single source of truth for the `schema_version`
//! strings that appear in the CLI's machine-readable output.

pub const ABIPACK_COERCE_REPORT_SCHEMA_VERSION: &str = "abipack.coerce.report@0.1.0";
pub const ABIPACK_METHODS_REPORT_SCHEMA_VERSION: &str = "abipack.methods.report@0.1.0";
pub const ABIPACK_FUNCTION_REF_REPORT_SCHEMA_VERSION: &str = "abipack.function-ref.report@0.1.0";

/// Environment variable holding the `tracing` filter for the CLI.
pub const ABIPACK_LOG_ENV: &str = "ABIPACK_LOG";
