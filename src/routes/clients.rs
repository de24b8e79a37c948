use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    state::AppState,
    types::{MailClientsRequest, NewCustomer},
    validation,
};

fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .map_err(|e| AppError::BadRequest(format!("invalid customer id {:?}: {}", raw, e)))
}

// Malformed JSON, a missing content type and wrong field types are all plain 400s
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(v)| v).map_err(|e| AppError::BadRequest(e.body_text()))
}

/// POST /api/clients
pub async fn create_customer(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Json<NewCustomer>, JsonRejection>,
) -> AppResult<Response> {
    let candidate = json_body(body).map_err(|e| e.logged(request_id.as_str()))?;
    validation::validate(&candidate).map_err(|e| AppError::from(e).logged(request_id.as_str()))?;

    let stored = state
        .repo
        .create(candidate)
        .await
        .map_err(|e| AppError::from(e).logged(request_id.as_str()))?;

    match serde_json::to_string(&stored) {
        Ok(js) => tracing::info!("{} : {}", request_id, js),
        Err(e) => tracing::warn!("{}: cannot serialize stored customer {}: {}", request_id, stored.id, e),
    }

    Ok(StatusCode::CREATED.into_response())
}

/// GET /api/clients/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(&id).map_err(|e| e.logged(request_id.as_str()))?;
    let customer = state.repo.first(id).await.map_err(|e| AppError::from(e).logged(request_id.as_str()))?;
    Ok((StatusCode::OK, Json(customer)).into_response())
}

/// DELETE /api/clients/{id}
///
/// Answers 204 whether or not a live row matched.
pub async fn delete_customer(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(&id).map_err(|e| e.logged(request_id.as_str()))?;
    let rows = state.repo.delete(id).await.map_err(|e| AppError::from(e).logged(request_id.as_str()))?;
    tracing::debug!("{}: deleted {} customer row(s) for id {}", request_id, rows, id);
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// GET /api/clients
pub async fn find_customers(State(state): State<AppState>, request_id: RequestId) -> AppResult<Response> {
    let customers = state.repo.find().await.map_err(|e| AppError::from(e).logged(request_id.as_str()))?;
    Ok((StatusCode::OK, Json(customers)).into_response())
}

/// POST /api/clients/send
///
/// Sends the mailing for `mailing_id` and soft-deletes every customer in it.
/// `mailing_id` is required: `{}` is a 400 rather than retiring mailing 0.
pub async fn mail_clients(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Json<MailClientsRequest>, JsonRejection>,
) -> AppResult<Response> {
    let request = json_body(body).map_err(|e| e.logged(request_id.as_str()))?;

    tracing::info!("{}: deleting all customers with mailing id {}", request_id, request.mailing_id);

    let rows = state
        .repo
        .delete_by_mailing_id(request.mailing_id)
        .await
        .map_err(|e| AppError::from(e).logged(request_id.as_str()))?;
    tracing::info!("{}: {} customers were deleted", request_id, rows);

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// GET and DELETE /api/clients/send
///
/// The literal `send` segment shadows `{id}` for every method, so these answer
/// the way the id routes answer any non-numeric id.
pub async fn send_as_customer_id(request_id: RequestId) -> AppResult<Response> {
    Err(AppError::BadRequest("invalid customer id \"send\"".to_string()).logged(request_id.as_str()))
}
