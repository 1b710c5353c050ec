use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;
use uuid::Uuid;

use crate::{
    config::Config,
    repositories::CooldownRepository,
    services::{CooldownService, ProxyService},
    types::Result,
    utils::{safe_get_cookie, session_cookie, SESSION_COOKIE_NAME},
};

pub type CooldownServiceType = CooldownService<CooldownRepository>;

// Resolves the visitor identifier from the request cookie, assigning a
// fresh one when the cookie is absent or unreadable
fn resolve_sid(req: &HttpRequest) -> String {
    req.headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| safe_get_cookie(Some(raw), SESSION_COOKIE_NAME))
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

// Tolerant query lookup; a malformed query string yields no value
fn query_param(req: &HttpRequest, name: &str) -> Option<String> {
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .find(|(key, _)| key.as_ref() == name)
        .map(|(_, value)| value.into_owned())
}

fn redirect(location: &str, sid: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .cookie(session_cookie(sid))
        .finish()
}

/// Survey page gate: redirect visitors inside the cooldown window to the
/// thank-you flow, proxy everyone else through to the form
pub async fn survey_page_handler(
    req: HttpRequest,
    body: web::Bytes,
    service: web::Data<CooldownServiceType>,
    proxy: web::Data<ProxyService>,
    config: web::Data<Config>,
) -> HttpResponse {
    let sid = resolve_sid(&req);

    // A visitor already in the thank-you flow skips the lookup, otherwise
    // the cooldown redirect below would loop forever
    if query_param(&req, "thanks").as_deref() == Some("1") {
        let mut location = config.upstream.thankyou_path.clone();
        if let Some(retry) = query_param(&req, "retry_after").filter(|v| !v.is_empty()) {
            location = format!("{}?retry_after={}", location, retry);
        }
        return redirect(&location, &sid);
    }

    // A store read failure inside check() degrades to serving the form
    let status = service.check(&sid).await;
    if status.active {
        info!(
            "Visitor on cooldown, {} minute(s) remaining",
            status.retry_after
        );
        return redirect(
            &format!("/?thanks=1&retry_after={}", status.retry_after),
            &sid,
        );
    }

    proxy.forward(&req, body, &sid).await
}

/// Cooldown status route handler
pub async fn cooldown_status_handler(
    req: HttpRequest,
    service: web::Data<CooldownServiceType>,
) -> Result<impl Responder> {
    let sid = resolve_sid(&req);
    let status = service.status(&sid).await?;
    Ok(HttpResponse::Ok().cookie(session_cookie(&sid)).json(status))
}

/// Submission stamp route handler
pub async fn stamp_submission_handler(
    req: HttpRequest,
    service: web::Data<CooldownServiceType>,
) -> HttpResponse {
    let sid = resolve_sid(&req);

    match service.stamp(&sid).await {
        Ok(ts) => HttpResponse::Ok()
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .cookie(session_cookie(&sid))
            .json(json!({ "ok": true, "ts": ts })),
        Err(e) => {
            // The caller must learn the cooldown was not recorded
            error!("Failed to record submission stamp: {}", e);
            HttpResponse::InternalServerError()
                .cookie(session_cookie(&sid))
                .json(json!({ "ok": false, "error": "kv_put_failed" }))
        }
    }
}

/// Catch-all passthrough to the upstream origin
pub async fn passthrough_handler(
    req: HttpRequest,
    body: web::Bytes,
    proxy: web::Data<ProxyService>,
) -> HttpResponse {
    let sid = resolve_sid(&req);
    proxy.forward(&req, body, &sid).await
}
