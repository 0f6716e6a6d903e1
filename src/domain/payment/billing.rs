//! Billing types and cycles.
//!
//! String forms match the gateway wire format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode};

/// How a charge is (or will be) paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingType {
    Boleto,
    CreditCard,
    Pix,

    /// The payer chooses the method at checkout. Event charges are created
    /// this way; the settled method arrives later via webhook.
    Undefined,
}

impl BillingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingType::Boleto => "BOLETO",
            BillingType::CreditCard => "CREDIT_CARD",
            BillingType::Pix => "PIX",
            BillingType::Undefined => "UNDEFINED",
        }
    }
}

impl fmt::Display for BillingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BillingType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOLETO" => Ok(BillingType::Boleto),
            "CREDIT_CARD" => Ok(BillingType::CreditCard),
            "PIX" => Ok(BillingType::Pix),
            "UNDEFINED" => Ok(BillingType::Undefined),
            other => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Unknown billing type: {}", other),
            )),
        }
    }
}

/// Recurrence cycle of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    /// Number of months covered by one installment.
    pub fn months(&self) -> u32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Quarterly => 3,
            BillingCycle::Yearly => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "MONTHLY",
            BillingCycle::Quarterly => "QUARTERLY",
            BillingCycle::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MONTHLY" => Ok(BillingCycle::Monthly),
            "QUARTERLY" => Ok(BillingCycle::Quarterly),
            "YEARLY" => Ok(BillingCycle::Yearly),
            other => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Unknown billing cycle: {}", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_type_roundtrips() {
        for bt in [
            BillingType::Boleto,
            BillingType::CreditCard,
            BillingType::Pix,
            BillingType::Undefined,
        ] {
            let parsed: BillingType = bt.as_str().parse().unwrap();
            assert_eq!(bt, parsed);
        }
    }

    #[test]
    fn cycle_months() {
        assert_eq!(BillingCycle::Monthly.months(), 1);
        assert_eq!(BillingCycle::Quarterly.months(), 3);
        assert_eq!(BillingCycle::Yearly.months(), 12);
    }

    #[test]
    fn unknown_strings_are_rejected(){
        assert!("CASH".parse::<BillingType>().is_err());
        assert!("WEEKLY".parse::<BillingCycle>().is_err());
    }
}
