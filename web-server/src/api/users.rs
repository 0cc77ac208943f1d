// web-server/src/api/users.rs
use actix_web::{delete, get, post, put, web, HttpResponse};
use common::models::{Credentials, NewUser, User, UserProfile, UserSummary};
use common::now;
use common::store::WriteOutcome;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::AppState;

async fn hash_password(state: &AppState, password: String) -> Result<String, ApiError> {
    let hasher = state.hasher;
    Ok(web::block(move || hasher.hash(&password)).await??)
}

fn mail_taken() -> ApiError {
    ApiError::Conflict("A user with this mail already exists".to_string())
}

#[get("/")]
pub async fn get_all_users(
    _auth: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let users: Vec<UserSummary> = state
        .users
        .find_all()
        .await?
        .iter()
        .map(UserSummary::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

#[get("/me")]
pub async fn get_me(
    auth: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let record = state
        .users
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User does not exist".to_string()))?;

    Ok(HttpResponse::Ok().json(UserProfile::from(&record)))
}

#[post("/create_user")]
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<NewUser>,
) -> Result<HttpResponse, ApiError> {
    let mut new_user = body.into_inner();
    let mail = new_user.mail.clone();

    let password_hash = hash_password(&state, std::mem::take(&mut new_user.password)).await?;
    let id = state
        .users
        .insert_unless(User::new(new_user, password_hash, now()), &|user: &User| user.mail == mail)
        .await?
        .ok_or_else(mail_taken)?;

    tracing::info!("Created user {}", id);
    Ok(HttpResponse::Ok().json(json!({
        "status_code": 200,
        "id": id
    })))
}

#[post("/log_in")]
pub async fn log_in(
    state: web::Data<AppState>,
    body: web::Json<Credentials>,
) -> Result<HttpResponse, ApiError> {
    let Credentials { mail, password } = body.into_inner();
    tracing::info!("Login attempt for {}", mail);

    let record = state
        .users
        .find_one(&|user: &User| user.mail == mail)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let hasher = state.hasher;
    let password_hash = record.doc.password_hash.clone();
    let valid = web::block(move || hasher.verify(&password, &password_hash)).await??;
    if !valid {
        tracing::warn!("Invalid password for user {}", record.id);
        return Err(ApiError::BadRequest("Invalid password".to_string()));
    }

    let token = state.tokens.issue(&record.id)?;

    Ok(HttpResponse::Ok().json(json!({
        "status_code": 200,
        "message": "Login successful",
        "user_id": record.id,
        "access_token": token,
        "token_type": "bearer"
    })))
}

#[put("/{user_id}")]
pub async fn update_user(
    _auth: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<NewUser>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let mut update = body.into_inner();

    let mut record = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User does not exist".to_string()))?;

    let mail = update.mail.clone();
    let password_hash = hash_password(&state, std::mem::take(&mut update.password)).await?;
    record.doc.apply(update, password_hash, now());

    match state
        .users
        .update_unless(&user_id, record.doc, &|user: &User| user.mail == mail)
        .await?
    {
        WriteOutcome::Written => (),
        WriteOutcome::Missing => return Err(ApiError::NotFound("User does not exist".to_string())),
        WriteOutcome::Conflict => return Err(mail_taken()),
    }

    Ok(HttpResponse::Ok().json(json!({
        "status_code": 200,
        "message": "User Updated Successfully"
    })))
}

#[delete("/{user_id}")]
pub async fn delete_user(
    _auth: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    if !state.users.delete(&user_id).await? {
        return Err(ApiError::NotFound("User does not exist".to_string()));
    }

    tracing::info!("Deleted user {}", user_id);
    Ok(HttpResponse::Ok().json(json!({
        "status_code": 200,
        "message": "User Deleted Successfully"
    })))
}
