//! `${VAR}` and `${VAR:-default}` expansion for path-like config values.
//!
//! Bare `$VAR` is left alone so literal dollar signs in paths survive.

use std::borrow::Cow;
use std::env::VarError;

use crate::ConfigError;

/// Expand `${VAR}` references in `value`, reporting failures against `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }
    shellexpand::env_with_context(value, |var| std::env::var(var).map(Some))
        .map(Cow::into_owned)
        .map_err(|e| {
            let reason = match e.cause {
                VarError::NotPresent => "not set",
                VarError::NotUnicode(_) => "not valid unicode",
            };
            ConfigError::EnvVar {
                field: field.to_owned(),
                message: format!("${{{}}} {reason}", e.var_name),
            }
        })
}
