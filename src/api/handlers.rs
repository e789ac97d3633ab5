// Results API handlers module

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};

use super::response::ApiError;
use super::types::{DocumentResponse, EvaluationPayload, HealthResponse, SaveResponse};
use crate::config::AppState;
use crate::http;
use crate::store::{effective_run_id, normalize_payload, Collection};

type HandlerResult = Result<Response<Full<Bytes>>, ApiError>;

/// `POST /raw_input`, `POST /standardized_output`
pub async fn handle_save<B>(req: Request<B>, state: &AppState, collection: Collection) -> HandlerResult
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body = read_body(req, state.config.http.max_body_size).await?;
    let payload = EvaluationPayload::from_body(&body).map_err(ApiError::Validation)?;

    let run_id = effective_run_id(payload.run_id.as_deref());
    let data = normalize_payload(payload.data);
    let saved_as = state
        .store
        .save(collection, &payload.benchmark_name, &run_id, &data)
        .await?;

    Ok(http::build_json_response(
        StatusCode::OK,
        &SaveResponse {
            status: "success",
            run_id,
            saved_as,
        },
    ))
}

/// `GET /raw_input`, `GET /standardized_output`
pub async fn handle_list(state: &AppState, collection: Collection) -> HandlerResult {
    let names = state.store.list(collection).await?;
    Ok(http::build_json_response(StatusCode::OK, &names))
}

/// `GET /raw_input/{file_name}`, `GET /standardized_output/{file_name}`
pub async fn handle_get(state: &AppState, collection: Collection, file_name: &str) -> HandlerResult {
    let (file_name, data) = state.store.load(collection, file_name).await?;
    Ok(http::build_json_response(
        StatusCode::OK,
        &DocumentResponse { file_name, data },
    ))
}

/// `GET /api/results`
pub async fn handle_results(state: &AppState) -> Response<Full<Bytes>> {
    let results = state.store.summaries().await;
    http::build_json_response(StatusCode::OK, &results)
}

/// `GET /health`
pub fn handle_health() -> Response<Full<Bytes>> {
    http::build_json_response(StatusCode::OK, &HealthResponse { status: "ok" })
}

/// Collect the request body, refusing anything over `limit` bytes
async fn read_body<B>(req: Request<B>, limit: u64) -> Result<Bytes, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), max).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(ApiError::PayloadTooLarge(limit))
        }
        Err(e) => Err(ApiError::BodyRead(e.to_string())),
    }
}
