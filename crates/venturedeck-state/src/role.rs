//! Role vocabulary shared by every front-end.

use serde::{Deserialize, Serialize};

/// The active user role. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Creator,
    Innovator,
    Investor,
    /// No role selected yet (onboarding).
    #[default]
    None,
}

impl Role {
    /// All roles a user can select. `None` is not selectable.
    pub const SELECTABLE: [Role; 3] = [Role::Creator, Role::Innovator, Role::Investor];

    /// The string written to durable storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Creator => "creator",
            Role::Innovator => "innovator",
            Role::Investor => "investor",
            Role::None => "none",
        }
    }

    /// Parse a persisted value. Anything outside the enumerated set is `None`.
    pub fn from_persisted(value: &str) -> Self {
        match value {
            "creator" => Role::Creator,
            "innovator" => Role::Innovator,
            "investor" => Role::Investor,
            _ => Role::None,
        }
    }

    /// Whether this is a real, selected role.
    pub fn is_selected(&self) -> bool {
        !matches!(self, Role::None)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    /// Strict parse for user input (CLI flags). Persisted values go through
    /// [`Role::from_persisted`] instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "creator" => Ok(Role::Creator),
            "innovator" => Ok(Role::Innovator),
            "investor" => Ok(Role::Investor),
            "none" => Ok(Role::None),
            other => Err(format!(
                "unknown role '{other}' (expected creator, innovator, investor or none)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_round_trip() {
        for role in Role::SELECTABLE {
            assert_eq!(Role::from_persisted(role.as_str()), role);
        }
    }

    #[test]
    fn test_unknown_persisted_value_is_none() {
        assert_eq!(Role::from_persisted("admin"), Role::None);
        assert_eq!(Role::from_persisted(""), Role::None);
        assert_eq!(Role::from_persisted("Creator"), Role::None);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("Investor".parse::<Role>().unwrap(), Role::Investor);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Role::Innovator).unwrap();
        assert_eq!(json, "\"innovator\"");
    }
}
