use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::{
    config::Config,
    handlers::{
        cooldown_status_handler, passthrough_handler, stamp_submission_handler,
        survey_page_handler, CooldownServiceType,
    },
    services::ProxyService,
    types::Result,
};

// Survey page gate route handler
async fn survey_page(
    req: HttpRequest,
    body: web::Bytes,
    service: web::Data<CooldownServiceType>,
    proxy: web::Data<ProxyService>,
    config: web::Data<Config>,
) -> HttpResponse {
    survey_page_handler(req, body, service, proxy, config).await
}

// Cooldown status route handler
async fn cooldown_status(
    req: HttpRequest,
    service: web::Data<CooldownServiceType>,
) -> Result<impl Responder> {
    cooldown_status_handler(req, service).await
}

// Submission stamp route handler
async fn stamp_submission(
    req: HttpRequest,
    service: web::Data<CooldownServiceType>,
) -> HttpResponse {
    stamp_submission_handler(req, service).await
}

// Upstream passthrough route handler
async fn passthrough(
    req: HttpRequest,
    body: web::Bytes,
    proxy: web::Data<ProxyService>,
) -> HttpResponse {
    passthrough_handler(req, body, proxy).await
}

// Configure all routes function
//
// Requests are classified by method and path; anything that does not match
// a gate route, including other methods on these same paths, falls through
// to the upstream proxy.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/cooldown")
            .route(web::get().to(cooldown_status))
            .route(web::route().to(passthrough)),
    );
    cfg.service(
        web::resource("/api/submit")
            .route(web::post().to(stamp_submission))
            .route(web::route().to(passthrough)),
    );

    // The survey allow-list gets the cooldown gate
    cfg.service(
        web::resource("/")
            .route(web::get().to(survey_page))
            .route(web::route().to(passthrough)),
    );
    cfg.service(
        web::resource("/index.html")
            .route(web::get().to(survey_page))
            .route(web::route().to(passthrough)),
    );

    cfg.default_service(web::route().to(passthrough));
}
