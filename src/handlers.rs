use actix_web::{web, HttpResponse, Responder};

use crate::error::QuizError;
use crate::models::{ErrorResponse, QuizSummary, QuizView, SyncQuizRequest};
use crate::reader::{self, Selection};
use crate::state::AppState;
use crate::sync::{self, QuizSnapshot};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health Check", body = String)
    )
)]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

#[derive(Debug, Default, PartialEq, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReadParams {
    /// Quiz to read; the listing is returned when absent.
    #[serde(rename = "quizId")]
    quiz_id: Option<String>,
    /// `1` or `true` returns every question regardless of `count`.
    admin: Option<String>,
    /// Number of questions to sample at random.
    count: Option<String>,
}

impl ReadParams {
    /// Collects the known parameters from raw query pairs. A repeated key
    /// keeps its last value; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = ReadParams::default();
        for (name, value) in pairs {
            match name.as_str() {
                "quizId" => params.quiz_id = Some(value),
                "admin" => params.admin = Some(value),
                "count" => params.count = Some(value),
                _ => {}
            }
        }
        params
    }
}

#[utoipa::path(
    get,
    path = "/quizzes",
    params(
        ReadParams
    ),
    responses(
        (status = 200, description = "Quiz listing, or a single quiz when quizId is given", body = QuizView),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn get_quizzes(
    data: web::Data<AppState>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, QuizError> {
    let params = ReadParams::from_pairs(query.into_inner());
    let quiz_id = params
        .quiz_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let Some(quiz_id) = quiz_id else {
        let listing: Vec<QuizSummary> = reader::list_quizzes(data.store.as_ref()).await?;
        return Ok(HttpResponse::Ok().json(listing));
    };

    let selection = Selection::new(
        reader::parse_count(params.count.as_deref()),
        reader::parse_admin(params.admin.as_deref()),
    );
    let quiz = reader::read_quiz(
        data.store.as_ref(),
        quiz_id,
        selection,
        &mut rand::thread_rng(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(quiz))
}

#[utoipa::path(
    put,
    path = "/quizzes",
    request_body = SyncQuizRequest,
    responses(
        (status = 204, description = "Quiz synchronized"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn put_quiz(
    data: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, QuizError> {
    let snapshot = QuizSnapshot::parse(&body)?;
    sync::synchronize(data.store.as_ref(), &snapshot).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// CORS preflight; the allow headers are added to every response.
pub async fn preflight() -> impl Responder {
    HttpResponse::NoContent().finish()
}
