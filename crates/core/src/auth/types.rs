use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::functions::token_expiry;

/// Trust tier of a shop account.
///
/// Ordered so that a higher role satisfies every requirement a lower one does:
/// `Admin > Worker > Client`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Client,
    Worker,
    Admin,
}

impl Role {
    /// Returns true if this role meets the `required` minimum.
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Worker => "WORKER",
            Self::Client => "CLIENT",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "WORKER" => Ok(Self::Worker),
            "CLIENT" => Ok(Self::Client),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Validated account data handed over by the login/registration flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub profile: Role,
    pub active: bool,
}

/// Claims carried by a session token.
///
/// `profile` and `active` are optional on the wire: a token that omits them
/// still verifies, and the authorization check rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    /// Builds the claims for `identity` issued at `issued_at`.
    pub fn for_identity(identity: &Identity, issued_at: DateTime<Utc>) -> Self {
        Self {
            id: identity.id.to_string(),
            name: identity.name.clone(),
            surname: identity.surname.clone(),
            email: identity.email.clone(),
            profile: Some(identity.profile),
            active: Some(identity.active),
            iat: issued_at.timestamp(),
            exp: token_expiry(issued_at).timestamp(),
        }
    }

    /// Subject id parsed as a uuid.
    pub fn subject(&self) -> Option<Uuid> {
        self.id.parse().ok()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_hierarchy_is_total() {
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(Role::Admin.satisfies(Role::Worker));
        assert!(Role::Admin.satisfies(Role::Client));
        assert!(Role::Worker.satisfies(Role::Worker));
        assert!(Role::Worker.satisfies(Role::Client));
        assert!(!Role::Worker.satisfies(Role::Admin));
        assert!(Role::Client.satisfies(Role::Client));
        assert!(!Role::Client.satisfies(Role::Worker));
        assert!(!Role::Client.satisfies(Role::Admin));
    }

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Worker).unwrap(), "\"WORKER\"");
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"OWNER\"").is_err());
    }

    #[test]
    fn role_from_str_round_trips_display() {
        for role in [Role::Admin, Role::Worker, Role::Client] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn claims_without_profile_or_active_deserialize() {
        let json = r#"{"id":"x","name":"a","surname":"b","email":"c","iat":0,"exp":1}"#;
        let claims: TokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.profile, None);
        assert_eq!(claims.active, None);
    }

    #[test]
    fn for_identity_copies_identity_fields() {
        let identity = Identity {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            surname: "Ruiz".to_string(),
            email: "ana@club.test".to_string(),
            profile: Role::Worker,
            active: true,
        };
        let now = Utc::now();
        let claims = TokenClaims::for_identity(&identity, now);

        assert_eq!(claims.subject(), Some(identity.id));
        assert_eq!(claims.profile, Some(Role::Worker));
        assert_eq!(claims.active, Some(true));
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }
}
