mod common;

use influencer_storefront::{
    dto::{
        auth::{LoginRequest, RegisterRequest},
        catalog::CreateCategoryRequest,
    },
    entity::{InfluencerProfiles, influencer_profiles},
    error::AppError,
    models::Role,
    services::{auth_service, catalog_service},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use common::{create_user, setup_state, suffix};

fn register(username: &str, email: &str, role: Role) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: "s3cret-pass".into(),
        role,
        full_name: Some("Test Person".into()),
        phone: None,
    }
}

fn login(login: &str, password: &str) -> LoginRequest {
    LoginRequest {
        login: login.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn registration_creates_profile_and_rejects_duplicates() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let tag = suffix();
    let username = format!("creator-{tag}");
    let email = format!("creator-{tag}@example.com");

    let user = auth_service::register_user(&state, register(&username, &email, Role::Influencer))
        .await?
        .data
        .unwrap();
    assert_eq!(user.role, Role::Influencer);

    let profile = InfluencerProfiles::find()
        .filter(influencer_profiles::Column::UserId.eq(user.id))
        .one(&state.orm)
        .await?;
    assert!(profile.is_some());

    let customer = auth_service::register_user(
        &state,
        register(&format!("buyer-{tag}"), &format!("buyer-{tag}@example.com"), Role::Customer),
    )
    .await?
    .data
    .unwrap();
    let no_profile = InfluencerProfiles::find()
        .filter(influencer_profiles::Column::UserId.eq(customer.id))
        .one(&state.orm)
        .await?;
    assert!(no_profile.is_none());

    let same_username = auth_service::register_user(
        &state,
        register(&username, &format!("other-{tag}@example.com"), Role::Customer),
    )
    .await;
    assert!(matches!(same_username, Err(AppError::BadRequest(_))));

    // Emails are stored lowercased, so a different case still collides.
    let same_email = auth_service::register_user(
        &state,
        register(&format!("other-{tag}"), &email.to_uppercase(), Role::Customer),
    )
    .await;
    assert!(matches!(same_email, Err(AppError::BadRequest(_))));

    let invalid =
        auth_service::register_user(&state, register("", "no-at-sign", Role::Customer)).await;
    assert!(matches!(invalid, Err(AppError::Validation(errors)) if errors.len() == 2));

    Ok(())
}

#[tokio::test]
async fn concurrent_duplicates_are_bad_requests() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let tag = suffix();
    let username = format!("racer-{tag}");
    let email = format!("racer-{tag}@example.com");

    let (first, second) = tokio::join!(
        auth_service::register_user(&state, register(&username, &email, Role::Influencer)),
        auth_service::register_user(&state, register(&username, &email, Role::Influencer)),
    );
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|r| matches!(r, Err(AppError::BadRequest(_)))));

    let influencer = create_user(&state, Role::Influencer).await?;
    let name = format!("Race-{tag}");
    let (first, second) = tokio::join!(
        catalog_service::create_category(
            &state,
            &influencer,
            CreateCategoryRequest { name: name.clone() },
        ),
        catalog_service::create_category(
            &state,
            &influencer,
            CreateCategoryRequest { name: name.to_lowercase() },
        ),
    );
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|r| matches!(r, Err(AppError::BadRequest(_)))));

    Ok(())
}

#[tokio::test]
async fn login_reports_dashboard_and_rejects_inactive_users() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let tag = suffix();
    let influencer = format!("host-{tag}");
    let customer = format!("guest-{tag}");
    auth_service::register_user(
        &state,
        register(&influencer, &format!("{influencer}@example.com"), Role::Influencer),
    )
    .await?;
    let guest = auth_service::register_user(
        &state,
        register(&customer, &format!("{customer}@example.com"), Role::Customer),
    )
    .await?
    .data
    .unwrap();

    let session = auth_service::login_user(&state, login(&influencer, "s3cret-pass"))
        .await?
        .data
        .unwrap();
    assert_eq!(session.dashboard, "influencer");
    assert!(session.token.starts_with("Bearer "));

    // Login also accepts the email address.
    let session = auth_service::login_user(
        &state,
        login(&format!("{customer}@example.com"), "s3cret-pass"),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(session.dashboard, "customer");
    assert_eq!(session.role, Role::Customer);

    let wrong = auth_service::login_user(&state, login(&customer, "not-the-pass")).await;
    assert!(matches!(wrong, Err(AppError::Unauthorized(_))));

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(guest.id)
        .execute(&state.pool)
        .await?;
    let inactive = auth_service::login_user(&state, login(&customer, "s3cret-pass")).await;
    assert!(matches!(inactive, Err(AppError::Unauthorized(_))));

    Ok(())
}
