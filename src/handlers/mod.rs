pub mod auth;
pub mod common;
pub mod health;
pub mod pokedex;
pub mod pokemon;
pub mod teams;

pub use auth::{login, me, register, LoginRequest, RegisterRequest, TokenResponse};
pub use common::{validate_optional, validate_required};
pub use health::{health, HealthResponse};
pub use pokedex::{
    add_entry, delete_entry, export_entries, get_stats, list_entries, list_entries_with_types,
    update_entry, CreatePokedexEntryRequest, PokedexEntryResponse, PokedexEntryWithTypesResponse,
    UpdatePokedexEntryRequest,
};
pub use pokemon::{get_pokemon, get_pokemon_by_type, get_pokemon_card, search_pokemon};
pub use teams::{
    create_team, delete_team, export_team, get_team, list_teams, update_team, CreateTeamRequest,
    TeamMemberResponse, TeamResponse, UpdateTeamRequest,
};
