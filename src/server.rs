use anyhow::Context;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use tower_http::trace::TraceLayer;

use tracing::{info, warn};

use crate::AppState;
use crate::config::AppConfig;
use crate::error::QuizError;
use crate::quiz::{Question, QuestionBank, QuizEngine};
use crate::session::{Session, SessionStore};

/// Largest accepted request body. Answers are short.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Load the question bank named in the configuration, or the built-in one.
pub fn load_question_bank(config: &AppConfig) -> anyhow::Result<QuestionBank> {
    let bank = match &config.quiz.questions_file {
        Some(path) => QuestionBank::load_from_path(path)
            .with_context(|| format!("failed to load question bank from {path}"))?,
        None => QuestionBank::builtin(),
    };

    info!(
        name: "quiz.bank.loaded",
        source = config.quiz.questions_file.as_deref().unwrap_or("builtin"),
        questions = bank.len(),
        "Question bank loaded"
    );
    if bank.is_empty() {
        warn!("Question bank is empty; every quiz start will fail");
    }
    Ok(bank)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let bank = load_question_bank(&config)?;
    let engine = QuizEngine::new(bank, SessionStore::new());
    let state = AppState::new(engine, Arc::clone(&config));

    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    // A zero timeout turns the limit off; a very large timeout keeps the
    // layer stack the same type either way.
    let timeout_duration = match state.config.server.request_timeout_secs {
        0 => Duration::from_secs(365 * 24 * 60 * 60),
        secs => Duration::from_secs(secs),
    };

    Router::new()
        .route("/quiz/start", get(start_quiz))
        .route("/quiz/answer", post(submit_answer))
        .route("/quiz/reset", get(reset_quiz).post(reset_quiz))
        .route("/quiz/progress", get(quiz_progress))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| {
                let duration = timeout_duration;
                async move {
                    match tokio::time::timeout(duration, next.run(req)).await {
                        Ok(res) => res,
                        Err(_) => {
                            (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response()
                        }
                    }
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// JSON body for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error kind, e.g. `missing_user`.
    pub error: String,
    pub message: String,
}

impl QuizError {
    /// HTTP status for this error kind.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingUser => StatusCode::BAD_REQUEST,
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::QuizAlreadyCompleted => StatusCode::CONFLICT,
            Self::NoQuestions => StatusCode::SERVICE_UNAVAILABLE,
            Self::OutOfRange { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for QuizError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

fn log_rejection(user_id: &str, err: &QuizError) {
    if err.status_code().is_server_error() {
        tracing::error!(user_id = %user_id, error = %err, "Quiz request failed");
    } else {
        tracing::debug!(user_id = %user_id, kind = err.kind(), "Quiz request rejected");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters identifying the user.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub user: Option<String>,
}

impl UserQuery {
    fn user_id(&self) -> &str {
        self.user.as_deref().unwrap_or_default()
    }
}

/// Request body for the answer API.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerRequest {
    #[serde(rename = "userID", alias = "user_id", default)]
    pub user_id: String,
    #[serde(default)]
    pub answer: String,
}

/// A question as shown to players. Accepted answers are never exposed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionView {
    pub index: usize,
    pub prompt: String,
}

impl QuestionView {
    fn new(index: usize, question: &Question) -> Self {
        Self {
            index,
            prompt: question.prompt().to_string(),
        }
    }
}

/// Response from the start API.
#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    pub user_id: String,
    pub question: QuestionView,
    pub total_questions: usize,
    pub score: usize,
}

/// Response from the answer API.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub correct: bool,
    pub completed: bool,
    pub score: usize,
    pub next_question: Option<QuestionView>,
}

/// Response from the progress API.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    #[serde(flatten)]
    pub session: Session,
    pub total_questions: usize,
}

/// GET /quiz/start?user=<id> - Start or resume a quiz.
async fn start_quiz(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<StartResponse>, QuizError> {
    let user_id = query.user_id();
    let started = state
        .engine
        .start(user_id)
        .inspect_err(|e| log_rejection(user_id, e))?;

    let index = started.session.current_index();
    info!(
        name: "quiz.started",
        user_id = %user_id,
        index = index,
        "Quiz started"
    );

    Ok(Json(StartResponse {
        user_id: user_id.to_string(),
        question: QuestionView::new(index, &started.question),
        total_questions: state.engine.total_questions(),
        score: started.session.score(),
    }))
}

/// POST /quiz/answer - Submit an answer for the current question.
async fn submit_answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, QuizError> {
    let outcome = state
        .engine
        .submit_answer(&req.user_id, &req.answer)
        .inspect_err(|e| log_rejection(&req.user_id, e))?;

    info!(
        name: "quiz.answered",
        user_id = %req.user_id,
        correct = outcome.correct,
        completed = outcome.completed,
        score = outcome.session.score(),
        "Answer recorded"
    );

    let next_index = outcome.session.current_index();
    Ok(Json(AnswerResponse {
        correct: outcome.correct,
        completed: outcome.completed,
        score: outcome.session.score(),
        next_question: outcome
            .next_question
            .as_ref()
            .map(|q| QuestionView::new(next_index, q)),
    }))
}

/// GET|POST /quiz/reset?user=<id> - Reset progress to the first question.
///
/// Unknown users get a fresh session; an empty or missing `user` is rejected with 400.
async fn reset_quiz(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Session>, QuizError> {
    let user_id = query.user_id();
    let session = state
        .engine
        .reset(user_id)
        .inspect_err(|e| log_rejection(user_id, e))?;

    info!(name: "quiz.reset", user_id = %user_id, "Quiz reset");
    Ok(Json(session))
}

/// GET /quiz/progress?user=<id> - Inspect progress without starting a quiz.
async fn quiz_progress(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ProgressResponse>, QuizError> {
    let user_id = query.user_id();
    let session = state
        .engine
        .progress(user_id)
        .inspect_err(|e| log_rejection(user_id, e))?;

    Ok(Json(ProgressResponse {
        session,
        total_questions: state.engine.total_questions(),
    }))
}
