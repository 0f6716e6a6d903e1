//! Membership ranks.
//!
//! Ranks form a total order; everything at or above `Soldado` pays monthly
//! dues. `Aluno` (a student still in trial) is never billed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Membership rank, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Aluno,
    Soldado,
    Cabo,
    Sargento,
    Tenente,
    Capitao,
    Major,
    Coronel,
    Comandante,
    Admin,
}

impl Rank {
    /// The lowest rank that pays dues.
    pub const DUES_THRESHOLD: Rank = Rank::Soldado;

    /// Returns true if members of this rank are billed monthly dues.
    ///
    /// This is the eligibility policy: a rank is eligible once it reaches
    /// `Soldado` in the total order. Pure and total; used to gate
    /// subscription activation and to compute the collection rate.
    pub fn is_payment_eligible(&self) -> bool {
        *self >= Self::DUES_THRESHOLD
    }

    /// Canonical storage string for this rank.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Aluno => "aluno",
            Rank::Soldado => "soldado",
            Rank::Cabo => "cabo",
            Rank::Sargento => "sargento",
            Rank::Tenente => "tenente",
            Rank::Capitao => "capitao",
            Rank::Major => "major",
            Rank::Coronel => "coronel",
            Rank::Comandante => "comandante",
            Rank::Admin => "admin",
        }
    }

    /// All ranks in ascending order.
    pub fn all() -> [Rank; 10] {
        [
            Rank::Aluno,
            Rank::Soldado,
            Rank::Cabo,
            Rank::Sargento,
            Rank::Tenente,
            Rank::Capitao,
            Rank::Major,
            Rank::Coronel,
            Rank::Comandante,
            Rank::Admin,
        ]
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Rank {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aluno" => Ok(Rank::Aluno),
            "soldado" => Ok(Rank::Soldado),
            "cabo" => Ok(Rank::Cabo),
            "sargento" => Ok(Rank::Sargento),
            "tenente" => Ok(Rank::Tenente),
            "capitao" => Ok(Rank::Capitao),
            "major" => Ok(Rank::Major),
            "coronel" => Ok(Rank::Coronel),
            "comandante" => Ok(Rank::Comandante),
            "admin" => Ok(Rank::Admin),
            other => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Unknown rank: {}", other),
            )),
        }
    }
}
