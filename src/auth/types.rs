use serde::{Deserialize, Serialize};

/// JWT claims identifying the user who owns the battles being driven
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserClaims {
    pub user_id: i64,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// A freshly minted guest identity
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub token: String,
    pub user_id: i64,
    pub expires_in_days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_claims_serialization() {
        let claims = UserClaims {
            user_id: 42,
            exp: 1234567890,
            iat: 1234567800,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"user_id\":42"));

        let deserialized: UserClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, claims);
    }
}
