//! Configuration validation with detailed error reporting.
//!
//! [`validate`] enforces what the server cannot start without: a usable
//! listen port. The backend key must be present (the parsers reject a
//! missing one) but may be empty, in which case requests are acknowledged
//! and go nowhere. [`lint_backends`] warns about that and about malformed
//! backend URLs; a malformed backend is reported again at forwarding time
//! as an ordinary delivery failure.

use url::Url;

use super::model::Config;
use crate::error::ValidationError;

/// Validate a single backend base URL. Returns `Ok(())` or a human-readable error.
pub fn validate_backend_url(url: &str) -> Result<(), String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ValidationError {
            field: "server.port".into(),
            message: "port must be between 1 and 65535".into(),
            suggestion: None,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Non-fatal checks on the backend list and each backend URL.
#[must_use]
pub fn lint_backends(config: &Config) -> Vec<ValidationError> {
    if config.backends().is_empty() {
        return vec![ValidationError {
            field: "backend.servers".into(),
            message: "no backend servers configured, requests will be acknowledged and dropped"
                .into(),
            suggestion: Some("e.g. backend.servers=http://localhost:8081".into()),
        }];
    }

    config
        .backends()
        .iter()
        .enumerate()
        .filter_map(|(i, backend)| {
            validate_backend_url(backend)
                .err()
                .map(|message| ValidationError {
                    field: format!("backend.servers[{i}]"),
                    suggestion: (!backend.contains("://"))
                        .then(|| format!("did you mean 'http://{backend}'?")),
                    message,
                })
        })
        .collect()
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let mut lines = vec![format!(
        "  listen port {}, {} backends\n",
        config.server.port,
        config.backends().len()
    )];

    for backend in config.backends() {
        lines.push(format!("  -> {backend}"));
    }

    format!("{} is valid\n{}", path, lines.join("\n"))
}
