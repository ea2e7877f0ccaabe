use crate::errors::AppError;
use crate::forms::MAX_CSV_BYTES;
use crate::health::HealthChecker;
use crate::ingress::IngressQueue;
use crate::middleware;
use crate::routes;
use crate::state::AppState;
use actix_cors::Cors;
use actix_web::{dev::Server, error, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

/// Webhook bodies and JSON forms are small; CSV uploads get their own cap.
const JSON_LIMIT: usize = 1024 * 1024;

pub async fn run(
    listener: TcpListener,
    state: AppState,
    queue: IngressQueue,
) -> Result<Server, std::io::Error> {
    let health_checker = web::Data::new(Arc::new(HealthChecker::new(state.clone())));
    let state = web::Data::new(state);
    let queue = web::Data::new(queue);

    let json_config = web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            let message = match &err {
                error::JsonPayloadError::Deserialize(inner) => format!("Invalid JSON: {inner}"),
                other => other.to_string(),
            };
            error::InternalError::from_response(
                err,
                actix_web::ResponseError::error_response(&AppError::BadRequest(message)),
            )
            .into()
        });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(json_config.clone())
            .app_data(web::PayloadConfig::new(JSON_LIMIT))
            .app_data(state.clone())
            .app_data(queue.clone())
            .app_data(health_checker.clone())
            .service(web::scope("/health").service(routes::health_check))
            .service(
                web::scope("/webhooks/whatsapp")
                    .service(routes::webhook::verify_handler)
                    .service(routes::webhook::receive_handler),
            )
            .service(
                web::scope("/api/v1")
                    .wrap(middleware::authentication::Manager::new())
                    .service(
                        web::scope("/auth")
                            .service(routes::auth::register_handler)
                            .service(routes::auth::login_handler)
                            .service(routes::auth::me_handler),
                    )
                    .service(
                        web::scope("/conversations")
                            .service(routes::conversation::list_handler)
                            .service(routes::conversation::item_handler)
                            .service(routes::conversation::messages_handler)
                            .service(routes::conversation::status_handler),
                    )
                    .service(web::scope("/prospects").service(routes::prospect::list_handler))
                    .service(
                        web::scope("/products")
                            .app_data(web::PayloadConfig::new(MAX_CSV_BYTES))
                            .service(routes::product::list_handler)
                            .service(routes::product::upload_handler)
                            .service(routes::product::item_handler)
                            .service(routes::product::add_handler)
                            .service(routes::product::update_handler)
                            .service(routes::product::delete_handler),
                    )
                    .service(
                        web::scope("/devis")
                            .service(routes::quote::list_handler)
                            .service(routes::quote::pdf_handler)
                            .service(routes::quote::item_handler)
                            .service(routes::quote::add_handler),
                    )
                    .service(
                        web::scope("/settings")
                            .service(routes::settings::get_handler)
                            .service(routes::settings::update_handler),
                    )
                    .service(
                        web::scope("/faq")
                            .service(routes::faq::list_handler)
                            .service(routes::faq::add_handler)
                            .service(routes::faq::update_handler)
                            .service(routes::faq::delete_handler),
                    )
                    .service(web::scope("/wa").service(routes::message::send_handler)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
