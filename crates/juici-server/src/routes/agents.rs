use super::{method_not_allowed, preflight};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use juici::errors::ServiceError;
use juici::models::agent::{AgentList, AgentProfile};

async fn list_agents(State(state): State<AppState>) -> Json<AgentList> {
    Json(AgentList {
        agents: state.service.agents(),
    })
}

async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AgentProfile>, ApiError> {
    state
        .service
        .profile(&id)
        .map(Json)
        .ok_or_else(|| ServiceError::UnknownAgent(id).into())
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/agents",
            get(list_agents)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/agents/:id",
            get(get_agent)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}
