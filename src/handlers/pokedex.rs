use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::common::{attachment, safe_filename, validate_optional};
use crate::middlewares::AuthUser;
use crate::models::{
    AddPokedexEntry, Patch, PokedexEntry, PokedexFilter, PokedexStats, SortField, SortOrder,
    UpdatePokedexEntry,
};
use crate::services::PokedexService;
use crate::state::AppState;

const NICKNAME_MAX: usize = 50;
const NOTES_MAX: usize = 500;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePokedexEntryRequest {
    pub pokemon_id: i32,
    pub nickname: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_captured: bool,
    #[serde(default)]
    pub favorite: bool,
}

/// Partial update: absent fields are left alone, `null` clears nullable ones
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePokedexEntryRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub nickname: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub notes: Patch<String>,
    pub is_captured: Option<bool>,
    pub favorite: Option<bool>,
    /// RFC 3339 timestamp
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub capture_date: Patch<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PokedexEntryResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub pokemon_id: i32,
    pub pokemon_name: String,
    pub pokemon_sprite: String,
    pub is_captured: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>)]
    pub capture_date: Option<OffsetDateTime>,
    pub nickname: Option<String>,
    pub notes: Option<String>,
    pub favorite: bool,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
}

impl From<PokedexEntry> for PokedexEntryResponse {
    fn from(e: PokedexEntry) -> Self {
        Self {
            id: e.id,
            owner_id: e.owner_id,
            pokemon_id: e.pokemon_id,
            pokemon_name: e.pokemon_name,
            pokemon_sprite: e.pokemon_sprite,
            is_captured: e.is_captured,
            capture_date: e.capture_date,
            nickname: e.nickname,
            notes: e.notes,
            favorite: e.favorite,
            created_at: e.created_at,
        }
    }
}

/// Entry enriched with the catalog types
#[derive(Debug, Serialize, ToSchema)]
pub struct PokedexEntryWithTypesResponse {
    #[serde(flatten)]
    pub entry: PokedexEntryResponse,
    pub types: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPokedexParams {
    pub captured: Option<bool>,
    pub favorite: Option<bool>,
    /// pokemon_id, capture_date or pokemon_name
    #[param(default = "pokemon_id")]
    pub sort: Option<String>,
    /// asc or desc
    #[param(default = "asc")]
    pub order: Option<String>,
    #[param(default = 20, minimum = 1, maximum = 200)]
    pub limit: Option<i64>,
    #[param(default = 0, minimum = 0)]
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportPokedexParams {
    pub captured: Option<bool>,
    pub favorite: Option<bool>,
    #[param(default = "pokemon_id")]
    pub sort: Option<String>,
    #[param(default = "asc")]
    pub order: Option<String>,
}

fn build_filter(
    captured: Option<bool>,
    favorite: Option<bool>,
    sort: Option<&str>,
    order: Option<&str>,
) -> AppResult<PokedexFilter> {
    Ok(PokedexFilter {
        captured,
        favorite,
        sort: SortField::parse(sort)?,
        order: SortOrder::parse(order)?,
    })
}

impl UpdatePokedexEntryRequest {
    fn into_update(self) -> AppResult<UpdatePokedexEntry> {
        let capture_date = match self.capture_date {
            Patch::Missing => Patch::Missing,
            Patch::Null => Patch::Null,
            Patch::Value(raw) => Patch::Value(OffsetDateTime::parse(&raw, &Rfc3339).map_err(
                |_| AppError::Validation("capture_date must be an RFC 3339 timestamp".to_string()),
            )?),
        };

        Ok(UpdatePokedexEntry {
            nickname: self.nickname,
            notes: self.notes,
            is_captured: self.is_captured,
            favorite: self.favorite,
            capture_date,
        })
    }
}

// ============ Handlers ============

/// Add a Pokémon to the current user's Pokédex
#[utoipa::path(
    post,
    path = "/api/v1/pokedex",
    request_body = CreatePokedexEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = PokedexEntryResponse),
        (status = 400, description = "Validation error or Pokémon already in the Pokédex"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Pokémon not found in the catalog"),
        (status = 503, description = "Catalog unreachable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Pokedex"
)]
pub async fn add_entry(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePokedexEntryRequest>,
) -> AppResult<(StatusCode, Json<PokedexEntryResponse>)> {
    validate_optional("nickname", payload.nickname.as_deref(), NICKNAME_MAX)?;
    validate_optional("notes", payload.notes.as_deref(), NOTES_MAX)?;

    let input = AddPokedexEntry {
        pokemon_id: payload.pokemon_id,
        nickname: payload.nickname,
        notes: payload.notes,
        is_captured: payload.is_captured,
        favorite: payload.favorite,
    };

    let entry = PokedexService::add(&state.db, &state.catalog, user.id, input).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// List the current user's Pokédex
#[utoipa::path(
    get,
    path = "/api/v1/pokedex",
    params(ListPokedexParams),
    responses(
        (status = 200, description = "Pokédex entries", body = Vec<PokedexEntryResponse>),
        (status = 400, description = "Invalid filter, sort or pagination"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Pokedex"
)]
pub async fn list_entries(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListPokedexParams>,
) -> AppResult<Json<Vec<PokedexEntryResponse>>> {
    let filter = build_filter(
        params.captured,
        params.favorite,
        params.sort.as_deref(),
        params.order.as_deref(),
    )?;

    let entries = PokedexService::list(
        &state.db,
        user.id,
        &filter,
        params.limit.unwrap_or(20),
        params.offset.unwrap_or(0),
    )
    .await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// List the current user's Pokédex with each entry's types
#[utoipa::path(
    get,
    path = "/api/v2/pokedex",
    params(ListPokedexParams),
    responses(
        (status = 200, description = "Pokédex entries with types", body = Vec<PokedexEntryWithTypesResponse>),
        (status = 400, description = "Invalid filter, sort or pagination"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Catalog unreachable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Pokedex"
)]
pub async fn list_entries_with_types(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListPokedexParams>,
) -> AppResult<Json<Vec<PokedexEntryWithTypesResponse>>> {
    let filter = build_filter(
        params.captured,
        params.favorite,
        params.sort.as_deref(),
        params.order.as_deref(),
    )?;

    let entries = PokedexService::list_with_types(
        &state.db,
        &state.catalog,
        user.id,
        &filter,
        params.limit.unwrap_or(20),
        params.offset.unwrap_or(0),
    )
    .await?;

    Ok(Json(
        entries
            .into_iter()
            .map(|(entry, types)| PokedexEntryWithTypesResponse {
                entry: entry.into(),
                types,
            })
            .collect(),
    ))
}

/// Partially update a Pokédex entry
#[utoipa::path(
    patch,
    path = "/api/v1/pokedex/{entry_id}",
    params(
        ("entry_id" = Uuid, Path, description = "Entry ID")
    ),
    request_body = UpdatePokedexEntryRequest,
    responses(
        (status = 200, description = "Entry updated", body = PokedexEntryResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Entry belongs to another user"),
        (status = 404, description = "Entry not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Pokedex"
)]
pub async fn update_entry(
    user: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<UpdatePokedexEntryRequest>,
) -> AppResult<Json<PokedexEntryResponse>> {
    validate_optional("nickname", payload.nickname.as_value().map(String::as_str), NICKNAME_MAX)?;
    validate_optional("notes", payload.notes.as_value().map(String::as_str), NOTES_MAX)?;

    let update = payload.into_update()?;
    let entry = PokedexService::patch(&state.db, user.id, entry_id, &update).await?;

    Ok(Json(entry.into()))
}

/// Remove a Pokédex entry
#[utoipa::path(
    delete,
    path = "/api/v1/pokedex/{entry_id}",
    params(
        ("entry_id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Entry belongs to another user"),
        (status = 404, description = "Entry not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Pokedex"
)]
pub async fn delete_entry(
    user: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    PokedexService::delete(&state.db, user.id, entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Collection statistics
#[utoipa::path(
    get,
    path = "/api/v1/pokedex/stats",
    responses(
        (status = 200, description = "Pokédex statistics", body = PokedexStats),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Catalog unreachable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Pokedex"
)]
pub async fn get_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<PokedexStats>> {
    let stats = PokedexService::stats(&state.db, &state.catalog, user.id).await?;
    Ok(Json(stats))
}

/// Download the Pokédex as CSV
#[utoipa::path(
    get,
    path = "/api/v1/pokedex/export",
    params(ExportPokedexParams),
    responses(
        (status = 200, description = "CSV file (text/csv attachment)"),
        (status = 400, description = "Invalid filter or sort"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Pokedex"
)]
pub async fn export_entries(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ExportPokedexParams>,
) -> AppResult<Response> {
    let filter = build_filter(
        params.captured,
        params.favorite,
        params.sort.as_deref(),
        params.order.as_deref(),
    )?;

    let csv = PokedexService::export_csv(&state.db, user.id, &filter).await?;
    let filename = format!("pokedex_{}.csv", safe_filename(&user.username));

    Ok(attachment("text/csv; charset=utf-8", &filename, csv))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_parses_capture_date() {
        let request: UpdatePokedexEntryRequest =
            serde_json::from_str(r#"{"capture_date": "2024-05-01T08:30:00Z", "nickname": null}"#)
                .unwrap();
        let update = request.into_update().unwrap();

        assert!(matches!(update.capture_date, Patch::Value(_)));
        assert_eq!(update.nickname, Patch::Null);
        assert!(update.notes.is_missing());
        assert_eq!(update.is_captured, None);
    }

    #[test]
    fn test_update_request_rejects_bad_date() {
        let request: UpdatePokedexEntryRequest =
            serde_json::from_str(r#"{"capture_date": "yesterday"}"#).unwrap();
        assert!(matches!(
            request.into_update(),
            Err(AppError::Validation(_))
        ));
    }
}
