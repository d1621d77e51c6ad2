use actix_web::{middleware, App};
use env_logger::Env;
use quiz_store_api::config::Settings;
use quiz_store_api::store::{MemoryStore, QuizStore};
use quiz_store_api::{app_data, configure, cors_headers, run, seed};
use std::net::TcpListener;
use std::sync::Arc;

async fn build_store(settings: &Settings) -> Arc<dyn QuizStore> {
    #[cfg(feature = "dynamodb")]
    {
        if let Some(table) = &settings.table {
            log::info!("Using DynamoDB table {}", table);
            return Arc::new(quiz_store_api::store::DynamoStore::from_env(table.clone()).await);
        }
    }

    #[cfg(not(feature = "dynamodb"))]
    {
        if let Some(table) = &settings.table {
            log::warn!(
                "TABLE={} is set but DynamoDB support is not compiled in, using the in-memory store",
                table
            );
        }
    }

    let store = Arc::new(MemoryStore::new());
    seed::load_dir(store.as_ref(), &settings.seed_dir).await;
    store
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = Settings::from_env();
    let store = build_store(&settings).await;

    if settings.lambda {
        log::info!("Starting Lambda handler");
        let data = app_data(store);
        let app_factory = move || {
            App::new()
                .app_data(data.clone())
                .wrap(middleware::Logger::default())
                .wrap(cors_headers())
                .configure(configure)
        };
        lambda_web::run_actix_on_lambda(app_factory)
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    } else {
        log::info!("Starting server at http://{}", settings.bind_address);
        log::info!("Swagger UI available at http://{}/swagger-ui/", settings.bind_address);
        let listener = TcpListener::bind(&settings.bind_address)?;
        run(listener, store)?.await?;
    }
    Ok(())
}
