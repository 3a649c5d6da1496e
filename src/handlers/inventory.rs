use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::inventory::Inventory;
use crate::state::AppState;

// GET /api/inventory
pub async fn get_inventory(State(state): State<Arc<AppState>>) -> Json<Inventory> {
    Json((*state.inventory).clone())
}
