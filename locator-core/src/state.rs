use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Australian state and territory codes accepted by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AustralianState {
    Nsw,
    Vic,
    Qld,
    Wa,
    Sa,
    Tas,
    Act,
    Nt,
}

impl AustralianState {
    pub const ALL: [AustralianState; 8] = [
        AustralianState::Nsw,
        AustralianState::Vic,
        AustralianState::Qld,
        AustralianState::Wa,
        AustralianState::Sa,
        AustralianState::Tas,
        AustralianState::Act,
        AustralianState::Nt,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            AustralianState::Nsw => "NSW",
            AustralianState::Vic => "VIC",
            AustralianState::Qld => "QLD",
            AustralianState::Wa => "WA",
            AustralianState::Sa => "SA",
            AustralianState::Tas => "TAS",
            AustralianState::Act => "ACT",
            AustralianState::Nt => "NT",
        }
    }

    /// Full name, as shown in verification messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            AustralianState::Nsw => "New South Wales",
            AustralianState::Vic => "Victoria",
            AustralianState::Qld => "Queensland",
            AustralianState::Wa => "Western Australia",
            AustralianState::Sa => "South Australia",
            AustralianState::Tas => "Tasmania",
            AustralianState::Act => "Australian Capital Territory",
            AustralianState::Nt => "Northern Territory",
        }
    }
}

impl fmt::Display for AustralianState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AustralianState {
    type Err = String;

    /// Exact match on one of the eight uppercase codes, the same set
    /// serde accepts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.code() == s)
            .ok_or_else(|| format!("unknown state code: {s}"))
    }
}
