//! Identity permissions and the access verdict.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Identity reported for faces the recognizer could not match.
pub const UNKNOWN_IDENTITY: &str = "Unknown";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    #[default]
    General,
    Admin,
}

impl FromStr for PermissionLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(PermissionLevel::General),
            "admin" => Ok(PermissionLevel::Admin),
            other => Err(anyhow!("unknown permission level '{}'", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    AllowedGeneral,
    AllowedAdmin,
    RestrictedViolation,
}

impl Verdict {
    /// Status text shown next to the subject's box.
    pub fn status(&self) -> &'static str {
        match self {
            Verdict::AllowedGeneral | Verdict::AllowedAdmin => "ALLOWED",
            Verdict::RestrictedViolation => "RESTRICTED",
        }
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, Verdict::RestrictedViolation)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status())
    }
}

/// A conforming identity is a recognizer label, not free text.
///
/// Allowed: "niraj", "Unknown", "j.doe-2"
/// Disallowed: empty, whitespace, path separators, anything over 64 chars.
pub fn validate_identity(identity: &str) -> Result<()> {
    static IDENTITY_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = IDENTITY_RE.get_or_init(|| {
        regex::Regex::new(r"^[A-Za-z0-9_.-]{1,64}$").expect("identity pattern compiles")
    });
    if !re.is_match(identity) {
        return Err(anyhow!(
            "identity '{}' must match ^[A-Za-z0-9_.-]{{1,64}}$",
            identity
        ));
    }
    Ok(())
}

/// Identity to permission mapping. Anything not listed, including [`UNKNOWN_IDENTITY`],
/// is `General`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    levels: HashMap<String, PermissionLevel>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_levels<I, S>(levels: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, PermissionLevel)>,
        S: Into<String>,
    {
        let mut policy = Self::new();
        for (identity, level) in levels {
            policy.grant(identity, level)?;
        }
        Ok(policy)
    }

    pub fn grant(&mut self, identity: impl Into<String>, level: PermissionLevel) -> Result<()> {
        let identity = identity.into();
        validate_identity(&identity)?;
        self.levels.insert(identity, level);
        Ok(())
    }

    pub fn permission(&self, identity: &str) -> PermissionLevel {
        self.levels.get(identity).copied().unwrap_or_default()
    }

    /// Decide access for one subject.
    ///
    /// Only restricted-zone membership matters; general zones admit everyone.
    pub fn verdict(&self, identity: &str, in_restricted: bool) -> Verdict {
        if !in_restricted {
            return Verdict::AllowedGeneral;
        }
        match self.permission(identity) {
            PermissionLevel::Admin => Verdict::AllowedAdmin,
            PermissionLevel::General => Verdict::RestrictedViolation,
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlisted_identities_default_to_general() {
        let policy = AccessPolicy::new();
        assert_eq!(policy.permission("bob"), PermissionLevel::General);
        assert_eq!(policy.permission(UNKNOWN_IDENTITY), PermissionLevel::General);
    }

    #[test]
    fn admin_in_restricted_is_allowed() {
        let policy = AccessPolicy::from_levels([("alice", PermissionLevel::Admin)]).unwrap();
        assert_eq!(policy.verdict("alice", true), Verdict::AllowedAdmin);
    }

    #[test]
    fn absent_identity_in_restricted_is_violation() {
        let policy = AccessPolicy::new();
        assert_eq!(policy.verdict("alice", true), Verdict::RestrictedViolation);
        assert_eq!(
            policy.verdict(UNKNOWN_IDENTITY, true),
            Verdict::RestrictedViolation
        );
    }

    #[test]
    fn explicit_general_in_restricted_is_violation() {
        let policy = AccessPolicy::from_levels([("niraj", PermissionLevel::General)]).unwrap();
        assert_eq!(policy.verdict("niraj", true), Verdict::RestrictedViolation);
    }

    #[test]
    fn outside_restricted_everyone_is_allowed() {
        let policy = AccessPolicy::from_levels([("alice", PermissionLevel::Admin)]).unwrap();
        assert_eq!(policy.verdict("alice", false), Verdict::AllowedGeneral);
        assert_eq!(policy.verdict("bob", false), Verdict::AllowedGeneral);
    }

    #[test]
    fn status_labels() {
        assert_eq!(Verdict::AllowedAdmin.status(), "ALLOWED");
        assert_eq!(Verdict::AllowedGeneral.to_string(), "ALLOWED");
        assert_eq!(Verdict::RestrictedViolation.status(), "RESTRICTED");
        assert!(Verdict::RestrictedViolation.is_violation());
        assert!(!Verdict::AllowedAdmin.is_violation());
    }

    #[test]
    fn grant_rejects_malformed_identity() {
        let mut policy = AccessPolicy::new();
        assert!(policy.grant("", PermissionLevel::Admin).is_err());
        assert!(policy.grant("two words", PermissionLevel::Admin).is_err());
        assert!(policy.grant("../etc", PermissionLevel::Admin).is_err());
        assert!(policy.is_empty());
        assert!(policy.grant("j.doe-2", PermissionLevel::Admin).is_ok());
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn permission_level_parses() {
        assert_eq!("Admin".parse::<PermissionLevel>().unwrap(), PermissionLevel::Admin);
        assert!("root".parse::<PermissionLevel>().is_err());
    }
}
