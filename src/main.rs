use anyhow::Context;
use tracing_subscriber::EnvFilter;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use pokedex_api::config::Config;
use pokedex_api::handlers::{
    CreatePokedexEntryRequest, CreateTeamRequest, HealthResponse, LoginRequest,
    PokedexEntryResponse, PokedexEntryWithTypesResponse, RegisterRequest, TeamMemberResponse,
    TeamResponse, TokenResponse, UpdatePokedexEntryRequest, UpdateTeamRequest,
};
use pokedex_api::models::{
    Pokemon, PokemonDetail, PokemonSearchPage, PokemonStat, PokemonSummary, PokedexStats,
    SearchHit, UserResponse,
};
use pokedex_api::state::AppState;
use pokedex_api::{build_router, handlers};

/// Security scheme for Bearer token
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::pokemon::search_pokemon,
        handlers::pokemon::get_pokemon,
        handlers::pokemon::get_pokemon_by_type,
        handlers::pokemon::get_pokemon_card,
        handlers::pokedex::add_entry,
        handlers::pokedex::list_entries,
        handlers::pokedex::list_entries_with_types,
        handlers::pokedex::update_entry,
        handlers::pokedex::delete_entry,
        handlers::pokedex::get_stats,
        handlers::pokedex::export_entries,
        handlers::teams::create_team,
        handlers::teams::list_teams,
        handlers::teams::get_team,
        handlers::teams::update_team,
        handlers::teams::delete_team,
        handlers::teams::export_team,
    ),
    components(schemas(
        HealthResponse,
        RegisterRequest,
        LoginRequest,
        TokenResponse,
        UserResponse,
        Pokemon,
        PokemonStat,
        PokemonDetail,
        PokemonSummary,
        SearchHit,
        PokemonSearchPage,
        CreatePokedexEntryRequest,
        UpdatePokedexEntryRequest,
        PokedexEntryResponse,
        PokedexEntryWithTypesResponse,
        PokedexStats,
        CreateTeamRequest,
        UpdateTeamRequest,
        TeamMemberResponse,
        TeamResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration, login and current user"),
        (name = "Pokemon", description = "PokeAPI catalog passthrough"),
        (name = "Pokedex", description = "Per-user Pokédex collection"),
        (name = "Teams", description = "Teams of up to six Pokémon")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let addr = config.server_addr();
    tracing::info!(
        app = %config.app_name,
        version = %config.app_version,
        "Starting server"
    );

    // Initialize application state (database, schema, catalog client)
    tracing::info!("Connecting to database...");
    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;
    tracing::info!("Database connection established");

    // Build the main application router
    let app = build_router(state)
        // Add Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server started on http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
