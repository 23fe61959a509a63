use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    entity::{
        influencer_profiles::ActiveModel as ProfileActive,
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, issue_token},
    models::{Role, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn password_matches(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    payload.validate()?;
    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    // Concurrent duplicates are caught by the unique indexes on insert.
    let exist = Users::find()
        .filter(
            Condition::any()
                .add(UserCol::Username.eq(username.as_str()))
                .add(UserCol::Email.eq(email.as_str())),
        )
        .one(&state.orm)
        .await?;
    if let Some(existing) = exist {
        let field = if existing.username == username { "Username" } else { "Email" };
        return Err(AppError::BadRequest(format!("{field} is already taken")));
    }

    let password_hash = hash_password(&payload.password)?;

    let txn = state.orm.begin().await?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(payload.role),
        full_name: Set(payload.full_name.filter(|n| !n.trim().is_empty())),
        phone: Set(payload.phone.filter(|p| !p.trim().is_empty())),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|err| AppError::on_unique_violation(err, "Username or email is already taken"))?;

    if user.role == Role::Influencer {
        ProfileActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            photo_url: Set(None),
            bio: Set(None),
            featured: Set(false),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");
    audit::record(
        &state.pool,
        user.id,
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "role": user.role.as_str() }),
    )
    .await;

    Ok(ApiResponse::success("User created", User::from(user), None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { login, password } = payload;
    let login = login.trim();
    let user = Users::find()
        .filter(
            Condition::any()
                .add(UserCol::Username.eq(login))
                .add(UserCol::Email.eq(login.to_lowercase())),
        )
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) if u.is_active => u,
        _ => return Err(AppError::Unauthorized("Invalid username or password".into())),
    };

    if !password_matches(&password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid username or password".into()));
    }

    let token = issue_token(
        user.id,
        user.role,
        &state.config.jwt_secret,
        state.config.jwt_ttl_hours,
    )?;

    audit::record(
        &state.pool,
        user.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        role: user.role,
        dashboard: user.role.as_str().to_string(),
    };
    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn current_user(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", User::from(model), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(password_matches("correct horse", &hash).unwrap());
        assert!(!password_matches("wrong horse", &hash).unwrap());
    }
}
