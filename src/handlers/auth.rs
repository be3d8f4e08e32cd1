// src/handlers/auth.rs
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::models::user::SessionUser;
use crate::users::UserRegistry;
use crate::utils::{require_user, RequestError};

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SignupForm {
    username: String,
    password: String,
    confirm: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileForm {
    bio: String,
    avatar_url: Option<String>,
    banner_url: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UsernameForm {
    new_username: String,
    current_password: String,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PasswordForm {
    current_password: String,
    new_password: String,
    confirm_password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct DeleteForm {
    password: String,
}

#[derive(Serialize)]
struct MeResponse {
    initials: String,
    #[serde(flatten)]
    user: SessionUser,
}

pub async fn sign_up(
    users: web::Data<UserRegistry>,
    form: web::Json<SignupForm>,
) -> Result<HttpResponse, RequestError> {
    let session = users.sign_up(&form.username, &form.password, &form.confirm)?;
    Ok(HttpResponse::Created().json(session))
}

pub async fn log_in(
    users: web::Data<UserRegistry>,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse, RequestError> {
    let session = users.log_in(&form.username, &form.password)?;
    Ok(HttpResponse::Ok().json(session))
}

pub async fn log_out(users: web::Data<UserRegistry>) -> Result<HttpResponse, RequestError> {
    users.log_out()?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn me(users: web::Data<UserRegistry>) -> Result<HttpResponse, RequestError> {
    let user = require_user(&users)?;
    Ok(HttpResponse::Ok().json(MeResponse {
        initials: user.initials(),
        user,
    }))
}

pub async fn update_profile(
    users: web::Data<UserRegistry>,
    form: web::Json<ProfileForm>,
) -> Result<HttpResponse, RequestError> {
    let user = require_user(&users)?;
    let form = form.into_inner();
    let session = users.update_profile(&user.username, &form.bio, form.avatar_url, form.banner_url)?;
    Ok(HttpResponse::Ok().json(session))
}

pub async fn change_username(
    users: web::Data<UserRegistry>,
    form: web::Json<UsernameForm>,
) -> Result<HttpResponse, RequestError> {
    let user = require_user(&users)?;
    let session = users.change_username(&user.username, &form.new_username, &form.current_password)?;
    Ok(HttpResponse::Ok().json(session))
}

pub async fn change_password(
    users: web::Data<UserRegistry>,
    form: web::Json<PasswordForm>,
) -> Result<HttpResponse, RequestError> {
    let user = require_user(&users)?;
    users.change_password(
        &user.username,
        &form.current_password,
        &form.new_password,
        &form.confirm_password,
    )?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn delete_account(
    users: web::Data<UserRegistry>,
    form: web::Json<DeleteForm>,
) -> Result<HttpResponse, RequestError> {
    let user = require_user(&users)?;
    users.delete_account(&user.username, &form.password)?;
    Ok(HttpResponse::NoContent().finish())
}
