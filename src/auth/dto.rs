use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo::{Role, User};

/// Request body for user registration. A `role` is honored when present and
/// defaults to `user`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Request body for login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for the refresh exchange.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for admin-created admin accounts.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Public view of a user: everything except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            is_active: user.is_active,
        }
    }
}

/// Response returned by register and login: both tokens plus the user.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Response for the refresh exchange. Only a new access token: refresh
/// tokens are never rotated.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Response for create-admin. No tokens: the new admin logs in on their own.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedAdminResponse {
    pub message: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_uses_camel_case_wire_names() {
        let resp = AuthResponse {
            message: "Login successful".into(),
            access_token: "aaa".into(),
            refresh_token: "rrr".into(),
            user: PublicUser {
                id: Uuid::new_v4(),
                name: "Alice".into(),
                email: "a@x.com".into(),
                role: Role::User,
                is_active: true,
            },
        };
        let json = serde_json::to_string(&resp).expect("serialize");
        assert!(json.contains(r#""accessToken":"aaa""#));
        assert!(json.contains(r#""refreshToken":"rrr""#));
        assert!(json.contains(r#""isActive":true"#));
        assert!(json.contains(r#""role":"user""#));
        assert!(!json.contains("password"));
    }

    #[test]
    fn refresh_request_round_trips_wire_name() {
        let req: RefreshRequest =
            serde_json::from_str(r#"{"refreshToken":"tok"}"#).expect("deserialize");
        assert_eq!(req.refresh_token, "tok");
        let json = serde_json::to_string(&req).expect("serialize");
        assert!(json.contains("refreshToken"));
    }

    #[test]
    fn register_request_role_is_optional() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"Alice","email":"a@x.com","password":"pw123456"}"#,
        )
        .expect("deserialize");
        assert!(req.role.is_none());

        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"Root","email":"r@x.com","password":"pw123456","role":"admin"}"#,
        )
        .expect("deserialize");
        assert_eq!(req.role, Some(Role::Admin));
    }
}
