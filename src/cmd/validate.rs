//! `relaycast validate`: check a configuration file for errors.
//!
//! Parses and validates the config file, reporting results in either
//! human-readable text or machine-readable JSON. Malformed backend URLs
//! are listed as warnings and do not fail validation.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::sources::parse_config_str;
use crate::config::validation;
use crate::error::{RelaycastError, ValidationError};

fn to_json(errors: &[ValidationError]) -> Vec<serde_json::Value> {
    errors
        .iter()
        .map(|e| {
            serde_json::json!({
                "field": e.field,
                "message": e.message,
                "suggestion": e.suggestion,
            })
        })
        .collect()
}

pub fn execute(args: &ValidateArgs) -> Result<(), RelaycastError> {
    let path = &args.config;

    if !path.exists() {
        return Err(RelaycastError::ConfigFileNotFound { path: path.clone() });
    }

    let content = std::fs::read_to_string(path)?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let config = parse_config_str(ext, &content, &path.display().to_string())?;

    let warnings = validation::lint_backends(&config);

    if let Err(errors) = validation::validate(&config) {
        match args.format {
            ValidateFormat::Text => {
                eprintln!("\u{2717} {} has {} errors\n", path.display(), errors.len());
                for error in &errors {
                    eprintln!("{error}");
                }
            }
            ValidateFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "errors": to_json(&errors),
                        "warnings": to_json(&warnings),
                    })
                );
            }
        }
        return Err(RelaycastError::ConfigValidation { errors });
    }

    match args.format {
        ValidateFormat::Text => {
            println!(
                "\u{2713} {}",
                validation::format_validation_report(&path.display().to_string(), &config)
            );
            if !warnings.is_empty() {
                println!("\n  {} warnings:", warnings.len());
                for warning in &warnings {
                    println!("{warning}");
                }
            }
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "port": config.server.port,
                    "backends": config.backends(),
                    "warnings": to_json(&warnings),
                })
            );
        }
    }

    Ok(())
}
