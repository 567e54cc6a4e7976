//! Reads plugin options from TOML.
//!
//! ```toml
//! [plugins.living-doc]
//! title = "Orders"
//!
//! [plugins.repository-stub]
//! skip = ["com.acme.AuditRepository"]
//! ```

use std::{fs, path::Path};

use archc_core::{
    application::{ApplicationError, Options},
    error::ArchResult,
};
use tracing::{debug, instrument};

/// Parse options text. Floats and dates are not option values and are
/// rejected.
pub fn parse_options(source: &str) -> ArchResult<Options> {
    toml::from_str(source).map_err(|e| ApplicationError::InvalidOptions { reason: e.to_string() }.into())
}

#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_options(path: impl AsRef<Path>) -> ArchResult<Options> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| ApplicationError::InvalidOptions {
        reason: format!("failed to read '{}': {e}", path.display()),
    })?;
    let options = parse_options(&raw).map_err(|e| ApplicationError::InvalidOptions {
        reason: format!("'{}': {e}", path.display()),
    })?;
    debug!(plugins = options.plugin_ids().count(), "options loaded");
    Ok(options)
}
