use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of account roles carried in every token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Tenant,
    Landlord,
    Agent,
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Tenant,
        Role::Landlord,
        Role::Agent,
        Role::Admin,
        Role::SuperAdmin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tenant => "TENANT",
            Role::Landlord => "LANDLORD",
            Role::Agent => "AGENT",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// Discriminates access tokens from refresh tokens.
///
/// Both kinds are otherwise identical signed artifacts, so this marker is checked on
/// every verification path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a session belongs to. Input to issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub session_id: String,
}

/// Application claims as signed into a token: the identity plus its type marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub identity: Identity,
    pub token_type: TokenType,
}

impl SessionClaims {
    pub fn access(identity: Identity) -> Self {
        Self {
            identity,
            token_type: TokenType::Access,
        }
    }

    pub fn refresh(identity: Identity) -> Self {
        Self {
            identity,
            token_type: TokenType::Refresh,
        }
    }
}

/// Trusted identity recovered from a verified token.
///
/// Only the token service constructs this, after signature, issuer, audience, time
/// window and type marker have all been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenPayload {
    identity: Identity,
}

impl TokenPayload {
    pub(crate) fn verified(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn user_id(&self) -> &str {
        &self.identity.user_id
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    pub fn session_id(&self) -> &str {
        &self.identity.session_id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.identity.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"SUPER_ADMIN\""
        );
        let role: Role = serde_json::from_str("\"LANDLORD\"").unwrap();
        assert_eq!(role, Role::Landlord);
        assert!(serde_json::from_str::<Role>("\"OWNER\"").is_err());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("SUPER_ADMIN".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_token_type_wire_names() {
        assert_eq!(serde_json::to_string(&TokenType::Access).unwrap(), "\"access\"");
        assert!(serde_json::from_str::<TokenType>("\"id\"").is_err());
    }

    #[test]
    fn test_payload_serializes_as_identity() {
        let payload = TokenPayload::verified(Identity {
            user_id: "u-1".into(),
            email: "a@example.com".into(),
            role: Role::Agent,
            session_id: "s-1".into(),
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["role"], "AGENT");
        assert_eq!(json["sessionId"], "s-1");
        assert!(payload.has_any_role(&[Role::Agent, Role::Admin]));
        assert!(!payload.has_any_role(&[Role::Admin]));
    }
}
