use actix_web::dev::Server;
use actix_web::http::Method;
use actix_web::{middleware, web, App, HttpServer};
use crate::models::{
    ErrorResponse, Question, QuestionInput, QuizSummary, QuizView, SyncQuizRequest,
};
use std::net::TcpListener;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod reader;
pub mod schema;
pub mod seed;
pub mod state;
pub mod store;
pub mod sync;

use state::AppState;
use store::QuizStore;

/// Largest accepted `PUT /quizzes` body, in bytes.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::get_quizzes,
        handlers::put_quiz,
    ),
    components(
        schemas(
            QuizSummary, QuizView, Question,
            SyncQuizRequest, QuestionInput,
            ErrorResponse
        )
    ),
    tags(
        (name = "Quizzes", description = "Quiz listing, retrieval and synchronization")
    )
)]
pub struct ApiDoc;

/// Every response may be read cross-origin.
pub fn cors_headers() -> middleware::DefaultHeaders {
    middleware::DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Headers", "*"))
        .add(("Access-Control-Allow-Methods", "GET,PUT,OPTIONS"))
}

/// Routes shared by the TCP server and the Lambda adapter.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route("/health", web::get().to(handlers::health_check))
    .service(
        web::resource("/quizzes")
            .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
            .route(web::get().to(handlers::get_quizzes))
            .route(web::put().to(handlers::put_quiz))
            .route(web::method(Method::OPTIONS).to(handlers::preflight)),
    );
}

pub fn app_data(store: Arc<dyn QuizStore>) -> web::Data<AppState> {
    web::Data::new(AppState { store })
}

pub fn run(listener: TcpListener, store: Arc<dyn QuizStore>) -> Result<Server, std::io::Error> {
    let data = app_data(store);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(middleware::Logger::default())
            .wrap(cors_headers())
            .configure(configure)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
