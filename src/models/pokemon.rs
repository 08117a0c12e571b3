use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Normalized Pokémon record, independent of the PokeAPI payload layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Pokemon {
    pub id: i32,
    pub name: String,
    pub sprite: String,
    pub types: Vec<String>,
    pub stats: Vec<PokemonStat>,
    pub abilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PokemonStat {
    pub name: String,
    pub base: i32,
}

/// Pokémon plus the species flavor text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PokemonDetail {
    #[serde(flatten)]
    pub pokemon: Pokemon,
    pub description: String,
}

/// Lightweight listing entry (id and name only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PokemonSummary {
    pub id: i32,
    pub name: String,
}

/// One search hit: a resolved Pokémon for name lookups, a summary for pages
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SearchHit {
    Detailed(Pokemon),
    Summary(PokemonSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PokemonSearchPage {
    pub count: u64,
    pub limit: u32,
    pub offset: u32,
    pub results: Vec<SearchHit>,
}
