use actix_web::{http::Method, web};

use crate::{errors::JsonError, handlers::contact};

/// Contact payloads are small; anything larger is rejected before parsing.
const CONTACT_PAYLOAD_LIMIT: usize = 16 * 1024;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/contact")
            .app_data(
                web::JsonConfig::default()
                    .limit(CONTACT_PAYLOAD_LIMIT)
                    .error_handler(|err, _req| {
                        tracing::debug!("Rejected contact payload: {}", err);
                        JsonError::from(err).into()
                    }),
            )
            .service(
                web::resource("")
                    .route(web::post().to(contact::submit_contact))
                    .route(web::method(Method::OPTIONS).to(contact::contact_preflight)),
            )
            .service(
                web::resource("/validate")
                    .route(web::post().to(contact::validate_contact))
                    .route(web::method(Method::OPTIONS).to(contact::contact_preflight)),
            ),
    );
}
