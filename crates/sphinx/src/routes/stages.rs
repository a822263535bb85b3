//! Riddle pages and answer submissions.
//!
//! Every submission ends in a 302. Rejections all go to the configured entry
//! URL, whatever the reason.

use axum::{
    Form,
    extract::{
        Path, State,
        rejection::{FormRejection, PathRejection},
    },
    http::header,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use sphinx_common::constants::paths;

use super::{AppError, RealIp, found};
use crate::flow::Outcome;
use crate::pages::ROBOTS_TXT;
use crate::state::AppState;

/// Posted answer form
#[derive(Deserialize)]
pub struct GuessForm {
    /// The guess. Missing counts as empty.
    #[serde(default)]
    k: String,
}

/// An unreadable body is treated as an empty guess
fn guess_text(form: Result<Form<GuessForm>, FormRejection>) -> String {
    match form {
        Ok(Form(form)) => form.k,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable guess form");
            String::new()
        }
    }
}

/// An undecodable path segment never matches a token
fn segment_text(path: Result<Path<String>, PathRejection>) -> String {
    path.map(|Path(segment)| segment).unwrap_or_default()
}

/// Map a flow outcome to its redirect
fn redirect_for(state: &AppState, outcome: Outcome) -> Response {
    match outcome {
        Outcome::Advance => found(paths::SECOND_PAGE),
        Outcome::FinalIssued(token) => found(&format!(
            "{}{}{}",
            paths::FINAL_PREFIX,
            token,
            paths::FINAL_PAGE_SUFFIX
        )),
        Outcome::Escape => found(&state.config.redirect_url),
        Outcome::Rejected(reason) => {
            tracing::debug!(reason = reason.as_str(), "Sending visitor back to entry");
            found(&state.config.index_url)
        }
    }
}

/// GET / and /index.html
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(state.pages.index()?))
}

/// POST /submit
pub async fn submit_first(
    State(state): State<AppState>,
    RealIp(client): RealIp,
    form: Result<Form<GuessForm>, FormRejection>,
) -> Response {
    let guess = guess_text(form);
    let outcome = state.flow.submit_first(&client, &guess).await;
    redirect_for(&state, outcome)
}

/// GET /q2.html
pub async fn second_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let guid = Uuid::new_v4().to_string();
    Ok(Html(state.pages.second(&guid)?))
}

/// POST /q2
pub async fn submit_second(
    State(state): State<AppState>,
    RealIp(client): RealIp,
    form: Result<Form<GuessForm>, FormRejection>,
) -> Response {
    let guess = guess_text(form);
    let outcome = state.flow.submit_second(&client, &guess).await;
    redirect_for(&state, outcome)
}

/// GET /final/{token}.html
pub async fn final_page(
    State(state): State<AppState>,
    RealIp(client): RealIp,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let file = segment_text(path);
    let Some(segment) = file.strip_suffix(paths::FINAL_PAGE_SUFFIX) else {
        return Ok(found(&state.config.index_url));
    };

    match state.flow.view_final(&client, segment) {
        Ok(token) => Ok(Html(state.pages.last(&token.to_string())?).into_response()),
        Err(_) => Ok(found(&state.config.index_url)),
    }
}

/// POST /final/{token}
pub async fn submit_final(
    State(state): State<AppState>,
    RealIp(client): RealIp,
    path: Result<Path<String>, PathRejection>,
    form: Result<Form<GuessForm>, FormRejection>,
) -> Response {
    let segment = segment_text(path);
    let guess = guess_text(form);
    let outcome = state.flow.submit_final(&client, &segment, &guess).await;
    redirect_for(&state, outcome)
}

/// GET /robots.txt
pub async fn robots() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], ROBOTS_TXT)
}
