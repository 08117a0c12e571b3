// Library crate for the Pokédex API
// Exports modules for use by the server binary and tests

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{
    add_entry, create_team, delete_entry, delete_team, export_entries, export_team, get_pokemon,
    get_pokemon_by_type, get_pokemon_card, get_stats, get_team, health, list_entries,
    list_entries_with_types, list_teams, login, me, register, search_pokemon, update_entry,
    update_team,
};
use crate::middlewares::{
    apply_middleware, auth_middleware, rate_limited, LOGIN_LIMIT, REGISTER_LIMIT,
};
use crate::state::AppState;

/// Build the application router with the given state
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    // Protected routes (require an active user)
    let protected_routes = Router::new()
        .route("/api/v1/auth/me", get(me))
        // Catalog passthrough
        .route("/api/v1/pokemon/search", get(search_pokemon))
        .route("/api/v1/pokemon/type/{type_name}", get(get_pokemon_by_type))
        .route("/api/v1/pokemon/{id_or_name}", get(get_pokemon))
        .route("/api/v1/pokemon/{id_or_name}/card", get(get_pokemon_card))
        // Pokédex routes
        .route("/api/v1/pokedex", post(add_entry))
        .route("/api/v1/pokedex", get(list_entries))
        .route("/api/v1/pokedex/stats", get(get_stats))
        .route("/api/v1/pokedex/export", get(export_entries))
        .route("/api/v1/pokedex/{entry_id}", patch(update_entry))
        .route("/api/v1/pokedex/{entry_id}", delete(delete_entry))
        .route("/api/v2/pokedex", get(list_entries_with_types))
        // Team routes
        .route("/api/v1/teams", post(create_team))
        .route("/api/v1/teams", get(list_teams))
        .route("/api/v1/teams/{team_id}", get(get_team))
        .route("/api/v1/teams/{team_id}", put(update_team))
        .route("/api/v1/teams/{team_id}", delete(delete_team))
        .route("/api/v1/teams/{team_id}/export", get(export_team))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Public auth routes, each with its own per-IP quota
    let register_routes = rate_limited(
        Router::new().route("/api/v1/auth/register", post(register)),
        REGISTER_LIMIT,
        &config,
    );
    let login_routes = rate_limited(
        Router::new().route("/api/v1/auth/login", post(login)),
        LOGIN_LIMIT,
        &config,
    );

    let app = Router::new()
        .route("/health", get(health))
        .merge(register_routes)
        .merge(login_routes)
        .merge(protected_routes)
        .with_state(state);

    apply_middleware(app, &config)
}
