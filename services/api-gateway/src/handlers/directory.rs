use axum::{extract::State, response::Json};
use fluxora_models::Credits;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub url: String,
    pub features: &'static [&'static str],
}

pub async fn list_services(State(state): State<AppState>) -> Json<Vec<ServiceInfo>> {
    Json(
        state
            .services
            .iter()
            .map(|service| ServiceInfo {
                name: service.name,
                url: service.url.clone(),
                features: service.features,
            })
            .collect(),
    )
}

pub async fn credits() -> Json<Credits> {
    Json(Credits::default())
}
