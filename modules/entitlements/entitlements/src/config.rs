use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::service::ServiceConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntitlementsConfig {
    #[serde(default = "default_serialize_client_activations")]
    pub serialize_client_activations: bool,
}

impl Default for EntitlementsConfig {
    fn default() -> Self {
        Self {
            serialize_client_activations: default_serialize_client_activations(),
        }
    }
}

fn default_serialize_client_activations() -> bool {
    true
}

impl From<&EntitlementsConfig> for ServiceConfig {
    fn from(cfg: &EntitlementsConfig) -> Self {
        Self {
            serialize_client_activations: cfg.serialize_client_activations,
        }
    }
}

/// Credentials accepted by the REST surface.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 key for dashboard user tokens.
    #[serde(default = "empty_secret")]
    pub jwt_secret: SecretString,
    /// Shared secret for internal services (`X-Service-Secret`). Disabled when unset.
    #[serde(default)]
    pub service_secret: Option<SecretString>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: empty_secret(),
            service_secret: None,
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::from("")
}

impl AuthConfig {
    pub fn is_jwt_configured(&self) -> bool {
        !self.jwt_secret.expose_secret().is_empty()
    }
}

const REDACTED: &str = "***redacted***";

fn redacted(secret: &SecretString) -> &'static str {
    if secret.expose_secret().is_empty() {
        ""
    } else {
        REDACTED
    }
}

/// Serialization never reveals secret values.
impl Serialize for AuthConfig {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Redacted {
            jwt_secret: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            service_secret: Option<&'static str>,
        }

        Redacted {
            jwt_secret: redacted(&self.jwt_secret),
            service_secret: self.service_secret.as_ref().map(redacted),
        }
        .serialize(s)
    }
}
