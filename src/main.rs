use devis_assistant::configuration::{get_configuration, DatabaseSettings};
use devis_assistant::connectors;
use devis_assistant::errors::expose_details;
use devis_assistant::ingress;
use devis_assistant::services::InboundPipeline;
use devis_assistant::startup::run;
use devis_assistant::state::AppState;
use devis_assistant::store::{PgStore, Store};
use devis_assistant::telemetry::{get_subscriber, init_subscriber};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

/// A database that cannot be reached leaves the store out; store-backed routes answer 503.
async fn connect_store(database: &DatabaseSettings) -> Option<Arc<dyn Store>> {
    tracing::info!(
        db_host = %database.host,
        db_port = database.port,
        db_name = %database.database_name,
        "Connecting to PostgreSQL"
    );

    let connect_options = PgConnectOptions::new()
        .host(&database.host)
        .port(database.port)
        .username(&database.username)
        .password(&database.password)
        .database(&database.database_name)
        .ssl_mode(PgSslMode::Prefer);

    let pool = match PgPoolOptions::new()
        .max_connections(database.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(connect_options)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!("Failed to connect to database: {}", err);
            return None;
        }
    };

    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("Failed to run migrations: {}", err);
    }

    Some(Arc::new(PgStore::new(pool)))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("devis-assistant".into(), "info".into());
    init_subscriber(subscriber);

    let settings = get_configuration().expect("Failed to read configuration.");
    expose_details(!settings.environment.is_production());

    let mut state = AppState::new(settings.pipeline.clone(), settings.webhook.clone())
        .with_whatsapp(connectors::whatsapp::init(&settings.connectors))
        .with_completion(connectors::completion::init(&settings.connectors))
        .with_renderer(connectors::renderer::init(&settings.connectors))
        .with_notifier(connectors::mailer::init(&settings.connectors))
        .with_identity(connectors::identity::init(&settings.connectors));
    match settings.database.as_ref() {
        Some(database) => {
            if let Some(store) = connect_store(database).await {
                state = state.with_store(store);
            }
        }
        None => tracing::warn!("No database configured, data store unavailable"),
    }

    let (queue, worker) = ingress::start(
        InboundPipeline::new(state.clone()),
        settings.pipeline.queue_capacity,
        settings.pipeline.workers,
    );

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!("Start server at {:?}", &address);
    let listener = TcpListener::bind(&address)?;

    let result = run(listener, state, queue).await?.await;
    worker.shutdown(settings.pipeline.shutdown_grace()).await;
    result
}
