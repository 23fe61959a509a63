use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::Validator, models::Role};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> crate::error::AppResult<()> {
        Validator::new()
            .check(!self.username.trim().is_empty(), "username is required")
            .check(self.username.len() <= 150, "username must be at most 150 characters")
            .check(self.email.contains('@'), "email must be a valid address")
            .check(self.password.len() >= 8, "password must be at least 8 characters")
            .check(
                self.phone.as_ref().is_none_or(|p| p.len() <= 15),
                "phone must be at most 15 characters",
            )
            .finish()
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    /// Username or email.
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    /// Dashboard the client should open after login.
    pub dashboard: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
