use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    pub ledger: LedgerSettings,
    pub agent: AgentSettings,
    pub judge: JudgeSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Ledger backend. `memory` runs an in-process ledger for development
    /// and testing; a remote RPC backend plugs in behind the same client
    /// seam.
    pub backend: String,
    /// Ledger endpoint for remote backends.
    pub endpoint: String,
    /// Target program identifier on the ledger.
    pub program_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Path to the oracle signing credential (hex public key file).
    pub keypair_path: PathBuf,
    /// Poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum concurrent in-flight request fulfillments.
    pub worker_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeSettings {
    /// Chat-completions endpoint of the AI judge service.
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the judge API key. The key itself
    /// never lives in the config file.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerSettings {
                backend: "memory".to_string(),
                endpoint: "http://127.0.0.1:8899".to_string(),
                program_id: "alignment-protocol".to_string(),
            },
            agent: AgentSettings {
                keypair_path: PathBuf::from("./oracle-key.hex"),
                poll_interval_ms: 10_000,
                worker_limit: 8,
            },
            judge: JudgeSettings {
                endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
                model: "gpt-4o".to_string(),
                api_key_env: "JUDGE_API_KEY".to_string(),
                timeout_secs: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

impl OracleConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Resolve the judge API key from the configured environment variable.
    pub fn judge_api_key(&self) -> Result<String> {
        std::env::var(&self.judge.api_key_env).with_context(|| {
            format!(
                "Judge API key not found in environment variable {}",
                self.judge.api_key_env
            )
        })
    }
}
