use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{Destination, Tag},
    routes::AppState,
};

/// Handler listing the tag vocabulary
pub async fn tags(State(state): State<AppState>) -> AppResult<Json<Vec<Tag>>> {
    let tags = state.catalog.list_tags().await?;
    Ok(Json(tags))
}

/// Handler listing live destinations
pub async fn destinations(State(state): State<AppState>) -> AppResult<Json<Vec<Destination>>> {
    let destinations = state.catalog.list_destinations().await?;
    Ok(Json(destinations))
}
