//! Request logging and CORS for the chainforum API.

use actix_cors::Cors;
use actix_web::middleware::Logger;

/// remote-ip "request-line" status-code response-size "referrer" "user-agent" time
pub fn standard_middleware() -> Logger {
    Logger::default()
}

/// The web client is served from a different origin than the API.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_header()
        .allowed_methods(vec!["GET", "POST"])
        .max_age(3600)
}
