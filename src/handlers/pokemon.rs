use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};
use crate::handlers::common::{attachment, safe_filename};
use crate::middlewares::AuthUser;
use crate::models::{PokemonDetail, PokemonSearchPage, PokemonSummary};
use crate::services::export;
use crate::state::AppState;

const MAX_SEARCH_LIMIT: u32 = 200;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Exact Pokémon name; when set the page holds that single Pokémon
    pub name: Option<String>,
    #[param(default = 20, minimum = 1, maximum = 200)]
    pub limit: Option<u32>,
    #[param(default = 0, minimum = 0)]
    pub offset: Option<u32>,
}

/// Search the catalog by name, or page through it
#[utoipa::path(
    get,
    path = "/api/v1/pokemon/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Search results", body = PokemonSearchPage),
        (status = 400, description = "Invalid pagination"),
        (status = 404, description = "No Pokémon with that name"),
        (status = 502, description = "Catalog returned an error"),
        (status = 503, description = "Catalog unreachable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Pokemon"
)]
pub async fn search_pokemon(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<PokemonSearchPage>> {
    let limit = params.limit.unwrap_or(20);
    if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_SEARCH_LIMIT
        )));
    }

    let page = state
        .catalog
        .search(params.name.as_deref(), limit, params.offset.unwrap_or(0))
        .await?;

    Ok(Json(page))
}

/// Pokémon details including the species description
#[utoipa::path(
    get,
    path = "/api/v1/pokemon/{id_or_name}",
    params(
        ("id_or_name" = String, Path, description = "Pokémon id or name")
    ),
    responses(
        (status = 200, description = "Pokémon details", body = PokemonDetail),
        (status = 404, description = "Pokémon not found"),
        (status = 502, description = "Catalog returned an error"),
        (status = 503, description = "Catalog unreachable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Pokemon"
)]
pub async fn get_pokemon(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id_or_name): Path<String>,
) -> AppResult<Json<PokemonDetail>> {
    let detail = state.catalog.get_with_description(&id_or_name).await?;
    Ok(Json(detail))
}

/// All Pokémon of one type
#[utoipa::path(
    get,
    path = "/api/v1/pokemon/type/{type_name}",
    params(
        ("type_name" = String, Path, description = "Type name, e.g. fire")
    ),
    responses(
        (status = 200, description = "Pokémon of the type", body = Vec<PokemonSummary>),
        (status = 404, description = "Unknown type"),
        (status = 502, description = "Catalog returned an error"),
        (status = 503, description = "Catalog unreachable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Pokemon"
)]
pub async fn get_pokemon_by_type(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(type_name): Path<String>,
) -> AppResult<Json<Vec<PokemonSummary>>> {
    let pokemon = state.catalog.by_type(&type_name).await?;
    Ok(Json(pokemon))
}

/// Printable PDF card for one Pokémon
#[utoipa::path(
    get,
    path = "/api/v1/pokemon/{id_or_name}/card",
    params(
        ("id_or_name" = String, Path, description = "Pokémon id or name")
    ),
    responses(
        (status = 200, description = "PDF card (application/pdf attachment)"),
        (status = 404, description = "Pokémon not found"),
        (status = 502, description = "Catalog returned an error"),
        (status = 503, description = "Catalog unreachable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Pokemon"
)]
pub async fn get_pokemon_card(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id_or_name): Path<String>,
) -> AppResult<Response> {
    let detail = state.catalog.get_with_description(&id_or_name).await?;

    // The card is still useful without its picture
    let sprite = match state.catalog.fetch_image(&detail.pokemon.sprite).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(pokemon = %detail.pokemon.name, "Sprite download failed: {}", e);
            None
        }
    };

    let pdf = export::pokemon_card_pdf(&detail, sprite.as_deref())?;
    let filename = format!("pokemon_{}.pdf", safe_filename(&detail.pokemon.name));

    Ok(attachment("application/pdf", &filename, pdf))
}
