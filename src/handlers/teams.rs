use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::common::{attachment, safe_filename, validate_required};
use crate::middlewares::AuthUser;
use crate::models::{CreateTeam, Patch, TeamMemberView, TeamWithMembers, UpdateTeam};
use crate::services::TeamService;
use crate::state::AppState;

const TEAM_NAME_MAX: usize = 100;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    pub name: String,
    pub description: Option<String>,
    /// Catalog ids in team order; each must be in the caller's Pokédex
    pub pokemon_ids: Vec<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    /// Replaces the whole member list when present
    pub pokemon_ids: Option<Vec<i32>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamMemberResponse {
    pub id: Uuid,
    pub position: i32,
    pub pokedex_entry_id: Uuid,
    pub pokemon_id: i32,
    pub pokemon_name: String,
}

impl From<TeamMemberView> for TeamMemberResponse {
    fn from(m: TeamMemberView) -> Self {
        Self {
            id: m.id,
            position: m.position,
            pokedex_entry_id: m.pokedex_entry_id,
            pokemon_id: m.pokemon_id,
            pokemon_name: m.pokemon_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
    pub members: Vec<TeamMemberResponse>,
    /// Member catalog ids in position order
    pub pokemon_ids: Vec<i32>,
}

impl From<TeamWithMembers> for TeamResponse {
    fn from(t: TeamWithMembers) -> Self {
        let pokemon_ids = t.members.iter().map(|m| m.pokemon_id).collect();

        Self {
            id: t.team.id,
            name: t.team.name,
            description: t.team.description,
            created_at: t.team.created_at,
            members: t.members.into_iter().map(Into::into).collect(),
            pokemon_ids,
        }
    }
}

// ============ Handlers ============

/// Create a team from Pokémon in the current user's Pokédex
#[utoipa::path(
    post,
    path = "/api/v1/teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Invalid size, duplicated member or Pokémon not in the Pokédex"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Teams"
)]
pub async fn create_team(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateTeamRequest>,
) -> AppResult<(StatusCode, Json<TeamResponse>)> {
    validate_required("name", &payload.name, TEAM_NAME_MAX)?;

    let input = CreateTeam {
        name: payload.name,
        description: payload.description,
        pokemon_ids: payload.pokemon_ids,
    };

    let team = TeamService::create(&state.db, user.id, &input).await?;
    Ok((StatusCode::CREATED, Json(team.into())))
}

/// List the current user's teams
#[utoipa::path(
    get,
    path = "/api/v1/teams",
    responses(
        (status = 200, description = "Teams, oldest first", body = Vec<TeamResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Teams"
)]
pub async fn list_teams(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TeamResponse>>> {
    let teams = TeamService::list(&state.db, user.id).await?;
    Ok(Json(teams.into_iter().map(Into::into).collect()))
}

/// Get one team with its members
#[utoipa::path(
    get,
    path = "/api/v1/teams/{team_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team details", body = TeamResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Team belongs to another user"),
        (status = 404, description = "Team not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Teams"
)]
pub async fn get_team(
    user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> AppResult<Json<TeamResponse>> {
    let team = TeamService::get(&state.db, user.id, team_id).await?;
    Ok(Json(team.into()))
}

/// Update a team's details and/or replace its members
#[utoipa::path(
    put,
    path = "/api/v1/teams/{team_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Team updated", body = TeamResponse),
        (status = 400, description = "Invalid size, duplicated member or Pokémon not in the Pokédex"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Team belongs to another user"),
        (status = 404, description = "Team not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Teams"
)]
pub async fn update_team(
    user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
    Json(payload): Json<UpdateTeamRequest>,
) -> AppResult<Json<TeamResponse>> {
    if let Some(name) = &payload.name {
        validate_required("name", name, TEAM_NAME_MAX)?;
    }

    let input = UpdateTeam {
        name: payload.name,
        description: payload.description.into_update(),
        pokemon_ids: payload.pokemon_ids,
    };

    let team = TeamService::update(&state.db, user.id, team_id, &input).await?;
    Ok(Json(team.into()))
}

/// Delete a team and its members
#[utoipa::path(
    delete,
    path = "/api/v1/teams/{team_id}",
    params(
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Team belongs to another user"),
        (status = 404, description = "Team not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Teams"
)]
pub async fn delete_team(
    user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    TeamService::delete(&state.db, user.id, team_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Download a team sheet as PDF
#[utoipa::path(
    get,
    path = "/api/v1/teams/{team_id}/export",
    params(
        ("team_id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "PDF file (application/pdf attachment)"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Team belongs to another user"),
        (status = 404, description = "Team not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Teams"
)]
pub async fn export_team(
    user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> AppResult<Response> {
    let (team, pdf) = TeamService::export(&state.db, user.id, team_id).await?;
    let filename = format!("team_{}.pdf", safe_filename(&team.name));

    Ok(attachment("application/pdf", &filename, pdf))
}
