// src/services/proxy.rs - Upstream passthrough
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::config::UpstreamConfig;
use crate::errors::ConfigError;
use crate::utils::session_cookie;

// Headers that must not be forwarded in either direction. Host and
// content-length are recomputed by the client for the rewritten request.
const HOP_BY_HOP_HEADERS: [&str; 10] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|header| name.eq_ignore_ascii_case(header))
}

// The visitor cookie replaces whatever the upstream tried to set
fn is_skipped_response_header(name: &str) -> bool {
    is_hop_by_hop(name) || name.eq_ignore_ascii_case("set-cookie")
}

/// Rewrites an incoming path to live under the origin's base path.
///
/// Root maps to the base path exactly; a path already carrying the base
/// prefix passes through unchanged; anything else is appended under the
/// prefix with its leading slash stripped. The query string is preserved.
fn join_origin_path(origin: &Url, path: &str, query: &str) -> Url {
    let mut target = origin.clone();

    let base = origin.path();
    let base_prefix = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };

    let joined = if path.is_empty() || path == "/" {
        base_prefix
    } else if path.starts_with(&base_prefix) {
        path.to_string()
    } else {
        format!("{}{}", base_prefix, path.trim_start_matches('/'))
    };

    target.set_path(&joined);
    target.set_query((!query.is_empty()).then_some(query));
    target
}

// Compares the configured origin against the host the request arrived on.
// Equality means the proxy would call itself forever.
fn hosts_collide(origin: &Url, request_host: &str) -> bool {
    let host = match origin.host_str() {
        Some(host) => host,
        None => return false,
    };

    let origin_host = match origin.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    origin_host.eq_ignore_ascii_case(request_host)
}

/// Transparent reverse proxy to the configured upstream origin
#[derive(Clone)]
pub struct ProxyService {
    client: reqwest::Client,
    origin: Option<Url>,
}

impl ProxyService {
    /// Build the proxy from configuration, parsing the origin URL once
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ConfigError> {
        let origin = match &config.origin {
            Some(raw) => Some(Url::parse(raw).map_err(|e| {
                ConfigError::ParseError(format!("Could not parse UPSTREAM_ORIGIN '{}': {}", raw, e))
            })?),
            None => None,
        };

        Ok(Self {
            client: reqwest::Client::new(),
            origin,
        })
    }

    /// Forward the request to the upstream origin and relay its response,
    /// re-attaching the visitor cookie.
    ///
    /// Every outcome produces a response: a placeholder when no origin is
    /// configured, HTTP 500 when the origin points back at this host, and
    /// HTTP 502 when the upstream cannot be reached.
    pub async fn forward(&self, req: &HttpRequest, body: web::Bytes, sid: &str) -> HttpResponse {
        let origin = match &self.origin {
            Some(origin) => origin,
            None => {
                return HttpResponse::Ok()
                    .content_type("text/plain; charset=utf-8")
                    .cookie(session_cookie(sid))
                    .body("Hello from the feedback gate (no upstream origin configured).");
            }
        };

        {
            let conn = req.connection_info();
            if hosts_collide(origin, conn.host()) {
                error!(
                    "Upstream origin misconfigured: points at this host ({}), refusing to proxy",
                    conn.host()
                );
                return HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .cookie(session_cookie(sid))
                    .body(
                        "Misconfigured upstream origin (would proxy to itself). \
                         Point UPSTREAM_ORIGIN at the static content host.",
                    );
            }
        }

        let target = join_origin_path(origin, req.path(), req.query_string());
        debug!("Proxying {} {} -> {}", req.method(), req.path(), target);

        let method = match reqwest::Method::from_bytes(req.method().as_str().as_bytes()) {
            Ok(method) => method,
            Err(e) => {
                error!("Could not map request method for proxying: {}", e);
                return HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .cookie(session_cookie(sid))
                    .body("Unsupported request method");
            }
        };

        let mut headers = HeaderMap::new();
        for (name, value) in req.headers() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_str().as_bytes()),
                HeaderValue::from_bytes(value.as_bytes()),
            ) {
                headers.append(name, value);
            }
        }

        let upstream = match self
            .client
            .request(method, target.clone())
            .headers(headers)
            .body(body.to_vec())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Upstream fetch failed for {}: {}", target, e);
                return HttpResponse::BadGateway()
                    .content_type("text/plain; charset=utf-8")
                    .cookie(session_cookie(sid))
                    .body("Upstream fetch failed");
            }
        };

        let status = StatusCode::from_u16(upstream.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);

        let mut response = HttpResponse::build(status);
        for (name, value) in upstream.headers() {
            if is_skipped_response_header(name.as_str()) {
                continue;
            }
            response.append_header((name.as_str(), value.as_bytes()));
        }
        response.cookie(session_cookie(sid));

        match upstream.bytes().await {
            Ok(bytes) => response.body(bytes),
            Err(e) => {
                error!("Failed to read upstream response body: {}", e);
                HttpResponse::BadGateway()
                    .content_type("text/plain; charset=utf-8")
                    .cookie(session_cookie(sid))
                    .body("Upstream fetch failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(raw: &str) -> Url {
        Url::parse(raw).expect("test origin must parse")
    }

    #[test]
    fn root_maps_to_origin_base_path() {
        let target = join_origin_path(&origin("https://static.example.com/feedback/"), "/", "");
        assert_eq!(target.as_str(), "https://static.example.com/feedback/");
    }

    #[test]
    fn base_path_gains_trailing_slash() {
        let target = join_origin_path(&origin("https://static.example.com/feedback"), "/", "");
        assert_eq!(target.as_str(), "https://static.example.com/feedback/");
    }

    #[test]
    fn prefixed_paths_pass_through_unchanged() {
        let target = join_origin_path(
            &origin("https://static.example.com/feedback/"),
            "/feedback/app.js",
            "",
        );
        assert_eq!(target.path(), "/feedback/app.js");
    }

    #[test]
    fn relative_paths_append_under_the_base() {
        let target = join_origin_path(
            &origin("https://static.example.com/feedback/"),
            "/assets/logo.png",
            "",
        );
        assert_eq!(target.path(), "/feedback/assets/logo.png");
    }

    #[test]
    fn origin_without_base_path_keeps_request_paths() {
        let target = join_origin_path(&origin("https://static.example.com"), "/app.js", "");
        assert_eq!(target.path(), "/app.js");
    }

    #[test]
    fn query_string_is_preserved() {
        let target = join_origin_path(
            &origin("https://static.example.com/feedback/"),
            "/index.html",
            "thanks=1&retry_after=12",
        );
        assert_eq!(target.query(), Some("thanks=1&retry_after=12"));
    }

    #[test]
    fn empty_query_is_dropped() {
        let target = join_origin_path(
            &origin("https://static.example.com/feedback/"),
            "/index.html",
            "",
        );
        assert_eq!(target.query(), None);
    }

    #[test]
    fn same_host_collides() {
        assert!(hosts_collide(
            &origin("https://survey.example.com/"),
            "survey.example.com"
        ));
        assert!(hosts_collide(
            &origin("https://survey.example.com:8443/"),
            "survey.example.com:8443"
        ));
        assert!(hosts_collide(
            &origin("https://Survey.Example.com/"),
            "survey.example.com"
        ));
    }

    #[test]
    fn distinct_hosts_do_not_collide() {
        assert!(!hosts_collide(
            &origin("https://static.example.com/"),
            "survey.example.com"
        ));
        assert!(!hosts_collide(
            &origin("https://survey.example.com:8443/"),
            "survey.example.com:9000"
        ));
    }

    #[test]
    fn hop_by_hop_headers_are_stripped() {
        assert!(is_hop_by_hop("Connection"));
        assert!(is_hop_by_hop("transfer-encoding"));
        assert!(is_hop_by_hop("Host"));
        assert!(!is_hop_by_hop("content-type"));
    }

    #[test]
    fn upstream_cookies_are_replaced() {
        assert!(is_skipped_response_header("Set-Cookie"));
        assert!(!is_skipped_response_header("cache-control"));
    }
}
