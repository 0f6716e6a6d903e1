//! Billing policy configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Billing policy: dues value and background cadences.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Monthly dues value in cents.
    #[serde(default = "default_dues_value_cents")]
    pub dues_value_cents: i64,

    /// Seconds between event lifecycle reconciliation ticks.
    #[serde(default = "default_lifecycle_interval")]
    pub lifecycle_interval_secs: u64,

    /// Seconds between reconciliation sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Seconds an unprocessed webhook row must age before the sweep
    /// retries it (the gateway redelivers younger ones on its own).
    #[serde(default = "default_webhook_retry_grace")]
    pub webhook_retry_grace_secs: u64,

    /// Days past due before a pending charge is flagged as stale.
    #[serde(default = "default_stale_pending_days")]
    pub stale_pending_after_days: i64,
}

impl BillingConfig {
    /// Validate billing configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dues_value_cents <= 0 {
            return Err(ValidationError::InvalidDuesValue);
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            dues_value_cents: default_dues_value_cents(),
            lifecycle_interval_secs: default_lifecycle_interval(),
            sweep_interval_secs: default_sweep_interval(),
            webhook_retry_grace_secs: default_webhook_retry_grace(),
            stale_pending_after_days: default_stale_pending_days(),
        }
    }
}

fn default_dues_value_cents() -> i64 {
    5000
}

fn default_lifecycle_interval() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    900
}

fn default_webhook_retry_grace() -> u64 {
    300
}

fn default_stale_pending_days() -> i64 {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(BillingConfig::default().validate().is_ok());
    }

    #[test]
    fn non_positive_dues_are_rejected() {
        let config = BillingConfig {
            dues_value_cents: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidDuesValue));
    }
}
