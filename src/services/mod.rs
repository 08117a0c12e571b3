pub mod auth;
pub mod catalog;
pub mod catalog_cache;
pub mod export;
pub mod pokedex;
pub mod team;

pub use auth::{AuthService, Claims};
pub use catalog::CatalogClient;
pub use catalog_cache::CatalogCache;
pub use pokedex::PokedexService;
pub use team::TeamService;
