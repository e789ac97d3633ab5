// API module entry
// Request dispatch for the evaluation results API

mod handlers;
mod response;
mod types;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, ORIGIN};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::AppState;
use crate::http::{self, cors};
use crate::logger::{self, AccessLogEntry};
use crate::store::Collection;

use response::ApiError;

/// Resolved route of a request path
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Health,
    Results,
    Collection(Collection),
    Document(Collection, String),
}

impl Route {
    fn resolve(path: &str) -> Option<Self> {
        match path {
            "/health" => return Some(Self::Health),
            "/api/results" => return Some(Self::Results),
            _ => {}
        }

        let rest = path.strip_prefix('/')?;
        let (segment, file_name) = match rest.split_once('/') {
            Some((segment, file_name)) => (segment, Some(file_name)),
            None => (rest, None),
        };
        let collection = Collection::from_route(segment)?;

        match file_name {
            None | Some("") => Some(Self::Collection(collection)),
            Some(encoded) => http::percent_decode(encoded).map(|name| Self::Document(collection, name)),
        }
    }

    const fn allowed_methods(&self) -> &'static str {
        match self {
            Self::Collection(_) => "GET, POST",
            Self::Health | Self::Results | Self::Document(..) => "GET",
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Generic over the body type so the router can be driven without a socket.
pub async fn handle_request<B>(
    req: Request<B>,
    peer: Option<SocketAddr>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut access = AccessLogEntry::start(
        peer,
        req.method(),
        req.uri(),
        req.version(),
        req.headers(),
    );
    let enable_cors = state.config.http.enable_cors;
    let origin = req.headers().get(ORIGIN).cloned();

    let mut response = if enable_cors && cors::is_preflight(req.method(), req.headers()) {
        cors::build_preflight_response(req.headers())
    } else {
        let mut resp = dispatch(req, &state).await;
        if enable_cors {
            cors::apply_cors_headers(origin.as_ref(), &mut resp);
        }
        resp
    };

    if let Ok(server) = state.config.http.server_name.parse() {
        response.headers_mut().insert(hyper::header::SERVER, server);
    }

    if state.access_log_enabled() {
        let body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        access.finish(response.status().as_u16(), body_bytes);
        logger::log_access(&access, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let Some(route) = Route::resolve(req.uri().path()) else {
        return http::build_404_response();
    };

    let result = match (req.method().clone(), route) {
        (Method::GET, Route::Health) => Ok(handlers::handle_health()),
        (Method::GET, Route::Results) => Ok(handlers::handle_results(state).await),
        (Method::GET, Route::Collection(collection)) => {
            handlers::handle_list(state, collection).await
        }
        (Method::POST, Route::Collection(collection)) => {
            if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
                return resp;
            }
            handlers::handle_save(req, state, collection).await
        }
        (Method::GET, Route::Document(collection, file_name)) => {
            handlers::handle_get(state, collection, &file_name).await
        }
        (method, route) => {
            logger::log_debug(&format!(
                "Method not allowed: {method} {}",
                req.uri().path()
            ));
            return http::build_405_response(route.allowed_methods());
        }
    };

    result.unwrap_or_else(ApiError::into_response)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response(max_body_size))
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}
