use crate::auth::magic_link::LinkOutcome;
use crate::error::AppError;
use crate::validate::FieldErrors;
use crate::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
struct IndexTemplate {}

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/check_email.html")]
struct CheckEmailTemplate {
    email: String,
    dev_link: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
struct SignupTemplate {
    email: String,
    magic: String,
    first_name: String,
    last_name: String,
    errors: FieldErrors,
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
}

#[derive(Deserialize)]
pub struct MagicQuery {
    magic: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    magic: String,
    first_name: String,
    last_name: String,
}

pub async fn index() -> impl IntoResponse {
    IndexTemplate {}
}

pub async fn login_page() -> impl IntoResponse {
    LoginTemplate { error: None }
}

pub async fn submit_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match state.magic_link.issue_login_attempt(&session, &form.email).await {
        Ok(issued) => Ok(CheckEmailTemplate {
            email: issued.email,
            dev_link: issued.dev_link,
        }
        .into_response()),
        Err(crate::auth::MagicLinkError::Validation(errors)) => Ok(LoginTemplate {
            error: errors.values().next().cloned(),
        }
        .into_response()),
        Err(err) => Err(err.into()),
    }
}

pub async fn validate_magic_link(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MagicQuery>,
) -> Result<Response, AppError> {
    let outcome = state
        .magic_link
        .consume_link(&session, query.magic.as_deref())
        .await?;

    match outcome {
        LinkOutcome::Authenticated(_) => Ok(Redirect::to("/app").into_response()),
        LinkOutcome::SignupRequired(email) => Ok(SignupTemplate {
            email,
            // Relayed through a hidden field so signup can resubmit the
            // same token without another email round trip.
            magic: query.magic.unwrap_or_default(),
            first_name: String::new(),
            last_name: String::new(),
            errors: FieldErrors::new(),
        }
        .into_response()),
    }
}

pub async fn complete_signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let result = state
        .magic_link
        .complete_signup(&session, Some(&form.magic), &form.first_name, &form.last_name)
        .await;

    match result {
        Ok(_) => Ok(Redirect::to("/app").into_response()),
        Err(crate::auth::MagicLinkError::Validation(errors)) => {
            let email = state
                .magic_link
                .payload_from_param(Some(&form.magic))
                .map(|p| p.email)
                .unwrap_or_default();
            Ok(SignupTemplate {
                email,
                magic: form.magic,
                first_name: form.first_name,
                last_name: form.last_name,
                errors,
            }
            .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn logout(session: Session) -> Result<Response, AppError> {
    session
        .flush()
        .await
        .map_err(|_| AppError::InternalError)?;
    Ok(Redirect::to("/login").into_response())
}
