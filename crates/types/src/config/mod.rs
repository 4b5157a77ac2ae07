// Path: crates/types/src/config/mod.rs

//! Shared configuration structures for the ledger, document store and host node.
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Selects the fingerprint function used for mining and verification.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub enum FingerprintKind {
    /// SHA-256, 64 hex characters.
    #[default]
    Sha256,
    /// The legacy 32-bit rolling hash, 8 hex characters.
    Rolling32,
}

/// Selects how the document store derives content addresses.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub enum AddressingMode {
    /// A SHA-256 hash of the plaintext bytes.
    #[default]
    ContentHash,
    /// A fingerprint of file name, size and upload time (legacy behaviour).
    Attributes,
}

/// Configuration for the hash chain.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Required number of leading zero hex digits in every block hash.
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    /// The fingerprint function.
    #[serde(default)]
    pub fingerprint: FingerprintKind,
    /// Optional upper bound on nonces tried per block. Unbounded when absent.
    #[serde(default)]
    pub max_mining_iterations: Option<u64>,
    /// Optional path of the append-only block journal.
    #[serde(default)]
    pub journal_path: Option<PathBuf>,
}

fn default_difficulty() -> u32 {
    2
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            fingerprint: FingerprintKind::default(),
            max_mining_iterations: None,
            journal_path: None,
        }
    }
}

/// Configuration for the document store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// How content addresses are derived.
    #[serde(default)]
    pub addressing: AddressingMode,
    /// Largest accepted upload in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            addressing: AddressingMode::default(),
            max_file_size: default_max_file_size(),
        }
    }
}

/// Configuration for emergency access grants.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EmergencyConfig {
    /// Duration used when a request does not name one.
    #[serde(default = "default_duration_mins")]
    pub default_duration_mins: u64,
    /// Longest duration a doctor may request.
    #[serde(default = "default_max_duration_mins")]
    pub max_duration_mins: u64,
}

fn default_duration_mins() -> u64 {
    60
}
fn default_max_duration_mins() -> u64 {
    24 * 60
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            default_duration_mins: default_duration_mins(),
            max_duration_mins: default_max_duration_mins(),
        }
    }
}

/// Configuration for the observability endpoints of the host binary.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct TelemetryConfig {
    /// Address of the `/metrics`, `/healthz`, `/readyz` server. Disabled when absent.
    #[serde(default)]
    pub addr: Option<SocketAddr>,
}

/// Configuration for the host node (`node.toml`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct NodeConfig {
    /// Ledger settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Document store settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Emergency access settings.
    #[serde(default)]
    pub emergency: EmergencyConfig,
    /// Telemetry settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl NodeConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ValidationError> {
        toml::from_str(s).map_err(|e| ValidationError::Config(e.to_string()))
    }

    /// Reads and parses a TOML file, then validates it.
    pub fn load(path: &Path) -> Result<Self, ValidationError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Performs semantic checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        // A SHA-256 digest has 64 hex digits; anything above cannot be satisfied.
        let width = match self.ledger.fingerprint {
            FingerprintKind::Sha256 => 64,
            FingerprintKind::Rolling32 => 8,
        };
        if self.ledger.difficulty > width {
            return Err(ValidationError::Config(format!(
                "difficulty {} exceeds digest width {}",
                self.ledger.difficulty, width
            )));
        }
        if self.ledger.max_mining_iterations == Some(0) {
            return Err(ValidationError::Config(
                "max_mining_iterations must be positive".into(),
            ));
        }
        if self.emergency.max_duration_mins == 0 {
            return Err(ValidationError::Config(
                "emergency.max_duration_mins must be positive".into(),
            ));
        }
        if self.emergency.default_duration_mins == 0
            || self.emergency.default_duration_mins > self.emergency.max_duration_mins
        {
            return Err(ValidationError::Config(format!(
                "emergency.default_duration_mins must be within 1..={}",
                self.emergency.max_duration_mins
            )));
        }
        if self.storage.max_file_size == 0 {
            return Err(ValidationError::Config(
                "storage.max_file_size must be positive".into(),
            ));
        }
        Ok(())
    }
}
