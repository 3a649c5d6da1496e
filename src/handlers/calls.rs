use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    CallEvent, CallSession, CallStage, CallSummary, Disposition, Intent, ResponseDirective,
};
use crate::services::dialogue;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// ── POST /api/calls ──

#[derive(Deserialize)]
pub struct StartCallRequest {
    pub lead_phone: String,
    pub lead_name: Option<String>,
}

#[derive(Serialize)]
pub struct StartCallResponse {
    pub call_id: String,
    pub stage: CallStage,
    pub directive: ResponseDirective,
}

pub async fn start_call(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartCallRequest>,
) -> Result<Json<StartCallResponse>, AppError> {
    let lead_phone = body.lead_phone.trim();
    if lead_phone.is_empty() {
        return Err(AppError::BadRequest("lead_phone is required".to_string()));
    }

    let session = CallSession::new(lead_phone, body.lead_name.as_deref());

    {
        let db = state.db.lock().unwrap();
        queries::save_call(&db, &session)?;
    }

    tracing::info!(call_id = %session.id, lead_phone = %session.lead_phone, "call started");

    Ok(Json(StartCallResponse {
        call_id: session.id,
        stage: session.stage,
        directive: dialogue::opening_directive(),
    }))
}

// ── POST /api/calls/:id/turn ──

#[derive(Deserialize)]
pub struct TurnRequest {
    pub utterance: String,
}

#[derive(Serialize)]
pub struct TurnResponse {
    pub call_id: String,
    pub intent: Intent,
    pub stage: CallStage,
    pub directive: ResponseDirective,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<Disposition>,
}

pub async fn take_turn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let mut session = {
        let db = state.db.lock().unwrap();
        queries::get_call(&db, &id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("call {id}")))?;

    let was_terminal = session.is_terminal();
    let intent = state.classifier.classify(&body.utterance, session.stage);

    tracing::info!(
        call_id = %session.id,
        intent = intent.label(),
        stage = session.stage.as_str(),
        "processing turn"
    );

    let directive = dialogue::advance(
        &mut session,
        &body.utterance,
        intent.clone(),
        &state.inventory,
        &state.config.dialogue_limits(),
    );

    {
        let db = state.db.lock().unwrap();
        queries::save_call(&db, &session)?;
    }

    finish_turn(&state, &session, &directive, was_terminal).await;

    Ok(Json(TurnResponse {
        call_id: session.id.clone(),
        intent,
        stage: session.stage,
        directive,
        disposition: session.disposition.clone(),
    }))
}

// ── POST /api/calls/:id/cancel ──

#[derive(Deserialize)]
pub struct CancelRequest {
    pub outcome: String,
}

pub async fn cancel_call(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CancelRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let disposition = match body.outcome.as_str() {
        "handed_off" => Disposition::HandedOff,
        "no_response" => Disposition::NoResponse,
        other => {
            return Err(AppError::BadRequest(format!(
                "unknown cancellation outcome: {other}"
            )))
        }
    };

    let mut session = {
        let db = state.db.lock().unwrap();
        queries::get_call(&db, &id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("call {id}")))?;

    let was_terminal = session.is_terminal();
    let directive = dialogue::cancel(&mut session, disposition);

    {
        let db = state.db.lock().unwrap();
        queries::save_call(&db, &session)?;
    }

    finish_turn(&state, &session, &directive, was_terminal).await;

    Ok(Json(TurnResponse {
        call_id: session.id.clone(),
        intent: Intent::Unclear,
        stage: session.stage,
        directive,
        disposition: session.disposition.clone(),
    }))
}

/// Post-turn bookkeeping: broadcast the lifecycle event, and hand a newly
/// finished call to the CRM collaborator.
async fn finish_turn(
    state: &Arc<AppState>,
    session: &CallSession,
    directive: &ResponseDirective,
    was_terminal: bool,
) {
    let _ = state.call_events_tx.send(CallEvent {
        call_id: session.id.clone(),
        stage: session.stage,
        directive: directive.label().to_string(),
        disposition: session.disposition.clone(),
    });

    if !was_terminal && session.is_terminal() {
        if let Err(e) = state.crm.export(session).await {
            tracing::error!(error = %e, call_id = %session.id, "CRM export failed");
        }
    }
}

// ── GET /api/calls/:id ──

pub async fn get_call(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<CallSession>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let session = {
        let db = state.db.lock().unwrap();
        queries::get_call(&db, &id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("call {id}")))?;

    Ok(Json(session))
}

// ── GET /api/calls ──

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

pub async fn list_calls(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CallSummary>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let limit = query.limit.unwrap_or(100);
    let summaries = {
        let db = state.db.lock().unwrap();
        queries::list_calls(&db, limit)?
    };

    Ok(Json(summaries))
}
