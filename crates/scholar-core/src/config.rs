// ── Runtime console configuration ──
//
// Describes how to reach the backend and where session files live.
// Never touches disk itself; scholar-config builds one from a profile.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use scholar_api::{TlsMode, TransportConfig};

use crate::manager::DEFAULT_OPERATION_TIMEOUT;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (local development backends).
    DangerAcceptInvalid,
}

/// Configuration for one console session.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Backend base URL (e.g., `http://localhost:5000`).
    pub api_url: Url,
    /// Bearer token, when the profile resolves one.
    pub token: Option<SecretString>,
    pub tls: TlsVerification,
    /// Bound on each remote call.
    pub timeout: Duration,
    /// Directory holding `users.json` and `session.json`.
    pub data_dir: PathBuf,
}

impl ConsoleConfig {
    pub fn new(api_url: Url, data_dir: PathBuf) -> Self {
        Self {
            api_url,
            token: None,
            tls: TlsVerification::default(),
            timeout: DEFAULT_OPERATION_TIMEOUT,
            data_dir,
        }
    }

    /// Bound applied by the managers to every gateway call.
    pub fn operation_timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
            token: self.token.clone(),
        }
    }
}
