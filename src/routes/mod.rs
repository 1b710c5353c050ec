use actix_web::{web, HttpResponse, Responder};

mod gate;

use crate::types::{AppState, HealthStatus};

// Handler function for the health check endpoint
async fn health_check(data: web::Data<AppState>) -> impl Responder {
    // Calculate uptime in seconds
    let uptime = data.start_time.elapsed().as_secs();

    let store_health = data.store.health_check().await;

    let status = HealthStatus {
        status: String::from("OK"),
        version: data.version.clone(),
        store_health: Some(store_health),
        uptime_seconds: uptime,
    };

    // Return the status as JSON
    HttpResponse::Ok().json(status)
}

// Configure all routes function
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Registered ahead of the catch-all proxy so it is answered locally
    cfg.route("/health", web::get().to(health_check));
    gate::configure_routes(cfg);
}
