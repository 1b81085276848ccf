//! Liveness check used by the container `HEALTHCHECK`.

use crate::utils::error::Result;
use crate::utils::validation::validate_url;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthOutcome {
    Healthy { status: u16 },
    Unhealthy { status: u16 },
    Unreachable { reason: String },
}

impl HealthOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthOutcome::Healthy { .. })
    }

    /// 0 = healthy, 1 = unhealthy (Docker HEALTHCHECK convention)
    pub fn exit_code(&self) -> i32 {
        if self.is_healthy() {
            0
        } else {
            1
        }
    }
}

pub fn default_health_url(port: u16) -> String {
    format!("http://127.0.0.1:{}/health", port)
}

/// Issues a single GET against `url`. Only an invalid URL is an error;
/// connection failures and non-2xx answers are reported as outcomes.
pub async fn check_health(url: &str, timeout: Duration) -> Result<HealthOutcome> {
    validate_url("healthcheck.url", url)?;

    let client = Client::builder().timeout(timeout).build()?;

    tracing::debug!("Probing health endpoint: {}", url);
    let outcome = match client.get(url).send().await {
        Ok(response) if response.status().is_success() => HealthOutcome::Healthy {
            status: response.status().as_u16(),
        },
        Ok(response) => HealthOutcome::Unhealthy {
            status: response.status().as_u16(),
        },
        Err(e) => HealthOutcome::Unreachable {
            reason: e.to_string(),
        },
    };

    tracing::debug!("Health check outcome: {:?}", outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_health_url() {
        assert_eq!(default_health_url(8000), "http://127.0.0.1:8000/health");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(HealthOutcome::Healthy { status: 200 }.exit_code(), 0);
        assert_eq!(HealthOutcome::Unhealthy { status: 503 }.exit_code(), 1);
        assert_eq!(
            HealthOutcome::Unreachable {
                reason: "connection refused".to_string()
            }
            .exit_code(),
            1
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        assert!(check_health("not a url", Duration::from_secs(1)).await.is_err());
    }
}
