//! Contact configuration
//!
//! Two input paths produce the same [`ContactConfig`]: a JSON file and the
//! single-line command grammar used by solver input decks:
//!
//! ```text
//! primary_blocks <name>... secondary_blocks <name>... penalty_parameter <value>
//! ```
//!
//! `master_blocks` and `slave_blocks` are accepted as deprecated synonyms.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ContactEngineError, Result};

/// User-facing contact configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Block names whose skin becomes triangular contact facets
    pub primary_blocks: Vec<String>,

    /// Block names whose skin nodes become contact nodes
    pub secondary_blocks: Vec<String>,

    /// Penalty stiffness; must be strictly positive
    pub penalty_parameter: f64,
}

impl ContactConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let config: ContactConfig = serde_json::from_reader(reader).map_err(|e| {
            ContactEngineError::ConfigError(format!(
                "failed to parse {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration invariants
    pub fn validate(&self) -> Result<()> {
        if self.primary_blocks.is_empty() {
            return Err(ContactEngineError::ConfigError(
                "no primary blocks specified".to_string(),
            ));
        }
        if self.secondary_blocks.is_empty() {
            return Err(ContactEngineError::ConfigError(
                "no secondary blocks specified".to_string(),
            ));
        }
        if self.penalty_parameter <= 0.0 || self.penalty_parameter.is_nan() {
            return Err(ContactEngineError::ConfigError(format!(
                "penalty parameter must be positive, got {}",
                self.penalty_parameter
            )));
        }
        Ok(())
    }
}

/// Parse the single-line contact command grammar
pub fn parse_contact_command(command: &str) -> Result<ContactConfig> {
    #[derive(PartialEq)]
    enum Section {
        None,
        Primary,
        Secondary,
        Penalty,
    }

    let mut primary_blocks = Vec::new();
    let mut secondary_blocks = Vec::new();
    let mut penalty_parameter: Option<f64> = None;
    let mut section = Section::None;

    for token in command.split_whitespace() {
        match token {
            "primary_blocks" | "master_blocks" => {
                if token == "master_blocks" {
                    log::warn!("'master_blocks' is deprecated; use 'primary_blocks'");
                }
                section = Section::Primary;
            }
            "secondary_blocks" | "slave_blocks" => {
                if token == "slave_blocks" {
                    log::warn!("'slave_blocks' is deprecated; use 'secondary_blocks'");
                }
                section = Section::Secondary;
            }
            "penalty_parameter" => section = Section::Penalty,
            value => match section {
                Section::Primary => primary_blocks.push(value.to_string()),
                Section::Secondary => secondary_blocks.push(value.to_string()),
                Section::Penalty => {
                    if penalty_parameter.is_some() {
                        return Err(ContactEngineError::ConfigError(
                            "multiple penalty_parameter values".to_string(),
                        ));
                    }
                    penalty_parameter = Some(value.parse::<f64>().map_err(|_| {
                        ContactEngineError::ConfigError(format!(
                            "invalid penalty parameter '{}'",
                            value
                        ))
                    })?);
                }
                Section::None => {
                    return Err(ContactEngineError::ConfigError(format!(
                        "unexpected token '{}' before any keyword",
                        value
                    )));
                }
            },
        }
    }

    let penalty_parameter = penalty_parameter.ok_or_else(|| {
        ContactEngineError::ConfigError("missing penalty_parameter".to_string())
    })?;

    let config = ContactConfig {
        primary_blocks,
        secondary_blocks,
        penalty_parameter,
    };
    config.validate()?;
    Ok(config)
}
