use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Роль пользователя. Права проверяются только через типизированные
/// предикаты (`TokenClaims::is_admin` и т.п.), без словарных флагов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supplier,
    Customer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: i64, // user_id
    pub username: String,
    pub roles: BTreeSet<Role>,
    pub exp: usize, // expiration timestamp
    pub iat: usize, // issued at
}

impl TokenClaims {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn is_supplier(&self) -> bool {
        self.has_role(Role::Supplier)
    }

    /// Admins and suppliers may manage the product catalog.
    pub fn can_manage_products(&self) -> bool {
        self.is_admin() || self.is_supplier()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: BTreeSet<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with(roles: &[Role]) -> TokenClaims {
        TokenClaims {
            sub: 1,
            username: "test".to_string(),
            roles: roles.iter().copied().collect(),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn role_predicates() {
        let admin = claims_with(&[Role::Admin]);
        assert!(admin.is_admin());
        assert!(admin.can_manage_products());

        let supplier = claims_with(&[Role::Supplier]);
        assert!(!supplier.is_admin());
        assert!(supplier.can_manage_products());

        let customer = claims_with(&[Role::Customer]);
        assert!(!customer.is_admin());
        assert!(!customer.can_manage_products());
    }

    #[test]
    fn roles_serialize_as_lowercase() {
        let json = serde_json::to_string(&Role::Supplier).unwrap();
        assert_eq!(json, "\"supplier\"");
    }
}
