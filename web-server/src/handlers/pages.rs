//! Landing and form screens
//!
//! The session (current screen) is looked up from the cookie on every
//! request; only `/start` creates one and only `/start` and `/home`
//! change it.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use mindcheck_core::{AssessError, PredictError, RawAnswers, RiskAssessment, Screen, Session};

use crate::form::{AssessForm, FormError};
use crate::session::session_cookie;
use crate::views::{self, Outcome};
use crate::AppState;

fn screen_of(state: &AppState, headers: &HeaderMap) -> Screen {
    state
        .sessions
        .lookup(headers)
        .map(|(_, session)| session.screen())
        .unwrap_or_default()
}

/// GET /
pub async fn landing(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match screen_of(&state, &headers) {
        Screen::Landing => Html(views::landing()).into_response(),
        Screen::Form => Redirect::to("/assess").into_response(),
    }
}

/// POST /start
pub async fn start(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, mut session, is_new) = match state.sessions.lookup(&headers) {
        Some((id, session)) => (id, session, false),
        None => {
            let (id, session) = state.sessions.create();
            (id, session, true)
        }
    };
    session.get_started();
    state.sessions.save(id, session);

    let mut response = Redirect::to("/assess").into_response();
    if is_new {
        response.headers_mut().insert(header::SET_COOKIE, session_cookie(id));
    }
    response
}

/// POST /home
pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some((id, mut session)) = state.sessions.lookup(&headers) {
        session.back_to_landing();
        state.sessions.save(id, session);
    }
    Redirect::to("/").into_response()
}

/// GET /assess
pub async fn form(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match screen_of(&state, &headers) {
        Screen::Landing => Redirect::to("/").into_response(),
        Screen::Form => Html(views::form(&AssessForm::default(), Outcome::None)).into_response(),
    }
}

/// POST /assess
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(values): Form<AssessForm>,
) -> Response {
    let Some((id, session)) = state.sessions.lookup(&headers) else {
        return Redirect::to("/").into_response();
    };

    let raw = match values.to_answers() {
        Ok(raw) => raw,
        Err(FormError::Validation(e)) => {
            return Html(views::form(&values, Outcome::Message(&e.to_string()))).into_response()
        }
        Err(e @ FormError::UnknownOption(_)) => {
            return (
                StatusCode::BAD_REQUEST,
                Html(views::form(&values, Outcome::Message(&e.to_string()))),
            )
                .into_response()
        }
    };

    match run_submit(&state, session, raw).await {
        Ok(assessment) => {
            tracing::debug!(session = %id, tier = %assessment.tier, "Form assessment completed");
            Html(views::form(&values, Outcome::Result(&assessment))).into_response()
        }
        Err(AssessError::WrongScreen(_)) => Redirect::to("/").into_response(),
        Err(e) if e.is_user_correctable() => {
            Html(views::form(&values, Outcome::Message(&e.to_string()))).into_response()
        }
        Err(e) => {
            tracing::error!(session = %id, "Assessment failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(views::internal_error())).into_response()
        }
    }
}

async fn run_submit(
    state: &AppState,
    session: Session,
    raw: RawAnswers,
) -> Result<RiskAssessment, AssessError> {
    let assessor = state.assessor.clone();
    match tokio::task::spawn_blocking(move || session.submit(&assessor, &raw)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Prediction task failed: {}", e);
            Err(AssessError::Predict(PredictError::Inference(e.to_string())))
        }
    }
}
