use std::sync::{Arc, OnceLock};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{
    Pokemon, PokemonDetail, PokemonSearchPage, PokemonStat, PokemonSummary, SearchHit,
};
use crate::services::CatalogCache;

const SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

const FALLBACK_LOCALE: &str = "en";

/// PokeAPI client.
///
/// Every lookup goes through the shared [`CatalogCache`]; listings and type
/// queries are not cached.
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    // Built on first use from a blocking thread, then shared by every clone
    blocking: Arc<OnceLock<reqwest::blocking::Client>>,
    base_url: String,
    timeout: Duration,
    locale: String,
    cache: Arc<CatalogCache>,
}

impl CatalogClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        locale: &str,
        cache: Arc<CatalogCache>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            blocking: Arc::new(OnceLock::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            locale: locale.to_string(),
            cache,
        })
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Fetch one Pokémon by numeric id or name
    pub async fn get(&self, identifier: &str) -> AppResult<Pokemon> {
        let key = normalize_identifier(identifier)?;
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let url = format!("{}/pokemon/{}", self.base_url, key);
        let raw: RawPokemon = self.fetch_json(&url, "Pokemon").await?;
        let pokemon = transform(raw);
        self.remember(&key, &pokemon);

        Ok(pokemon)
    }

    /// Same as [`get`](Self::get) plus the species flavor text
    pub async fn get_with_description(&self, identifier: &str) -> AppResult<PokemonDetail> {
        let pokemon = self.get(identifier).await?;

        let url = format!("{}/pokemon-species/{}", self.base_url, pokemon.id);
        let description = match self.fetch_json::<RawSpecies>(&url, "Species").await {
            Ok(species) => pick_flavor_text(&species, &self.locale),
            Err(AppError::NotFound(_)) => String::new(),
            Err(e) => return Err(e),
        };

        Ok(PokemonDetail {
            pokemon,
            description,
        })
    }

    /// Resolve a single name, or list one upstream page of summaries
    pub async fn search(
        &self,
        name: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> AppResult<PokemonSearchPage> {
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            let pokemon = self.get(name).await?;
            return Ok(PokemonSearchPage {
                count: 1,
                limit: 1,
                offset: 0,
                results: vec![SearchHit::Detailed(pokemon)],
            });
        }

        let url = format!(
            "{}/pokemon?limit={}&offset={}",
            self.base_url, limit, offset
        );
        let listing: RawListing = self.fetch_json(&url, "Pokemon").await?;

        let results: Vec<SearchHit> = summarize(listing.results.iter())
            .into_iter()
            .map(SearchHit::Summary)
            .collect();

        Ok(PokemonSearchPage {
            count: listing.count.unwrap_or(results.len() as u64),
            limit,
            offset,
            results,
        })
    }

    /// Members of a type as `{id, name}` pairs
    pub async fn by_type(&self, type_name: &str) -> AppResult<Vec<PokemonSummary>> {
        let key = normalize_identifier(type_name)
            .map_err(|_| AppError::NotFound("Type".to_string()))?;

        let url = format!("{}/type/{}", self.base_url, key);
        let raw: RawType = self.fetch_json(&url, "Type").await?;

        Ok(summarize(raw.pokemon.iter().map(|member| &member.pokemon)))
    }

    /// Download raw image bytes (sprites for the printable card)
    pub async fn fetch_image(&self, url: &str) -> AppResult<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        check_status(response.status(), url, "Sprite")?;

        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }

    /// Blocking variant of [`get`](Self::get).
    ///
    /// Must not be called on an async worker thread; see
    /// [`get_on_blocking_pool`](Self::get_on_blocking_pool).
    pub fn get_blocking(&self, identifier: &str) -> AppResult<Pokemon> {
        let key = normalize_identifier(identifier)?;
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let url = format!("{}/pokemon/{}", self.base_url, key);
        tracing::info!("PokeAPI [blocking] GET {}", url);

        let response = self
            .blocking_client()?
            .get(&url)
            .send()
            .map_err(transport_error)?;
        check_status(response.status(), &url, "Pokemon")?;

        let raw: RawPokemon = response.json().map_err(decode_error)?;
        let pokemon = transform(raw);
        self.remember(&key, &pokemon);

        Ok(pokemon)
    }

    /// Run [`get_blocking`](Self::get_blocking) on the blocking thread pool
    pub async fn get_on_blocking_pool(&self, identifier: &str) -> AppResult<Pokemon> {
        let client = self.clone();
        let identifier = identifier.to_string();

        tokio::task::spawn_blocking(move || client.get_blocking(&identifier))
            .await
            .map_err(|e| AppError::Internal(format!("Catalog lookup task failed: {}", e)))?
    }

    fn blocking_client(&self) -> AppResult<&reqwest::blocking::Client> {
        if let Some(client) = self.blocking.get() {
            return Ok(client);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        // A concurrent first call may have won; its client is kept
        Ok(self.blocking.get_or_init(|| client))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str, resource: &str) -> AppResult<T> {
        tracing::info!("PokeAPI GET {}", url);

        let response = self.client.get(url).send().await.map_err(transport_error)?;
        check_status(response.status(), url, resource)?;

        response.json::<T>().await.map_err(decode_error)
    }

    fn remember(&self, key: &str, pokemon: &Pokemon) {
        self.cache.insert(key, pokemon.clone());
        let id_key = pokemon.id.to_string();
        if id_key != key {
            self.cache.insert(&id_key, pokemon.clone());
        }
    }
}

/// Lower-case and check an id or name before it goes into a URL path
fn normalize_identifier(identifier: &str) -> AppResult<String> {
    let key = CatalogCache::key(identifier);
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');

    if valid {
        Ok(key)
    } else {
        Err(AppError::NotFound("Pokemon".to_string()))
    }
}

fn check_status(status: StatusCode, url: &str, resource: &str) -> AppResult<()> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(resource.to_string()));
    }

    tracing::error!("PokeAPI returned status {} for {}", status, url);
    if status.is_server_error() {
        Err(AppError::UpstreamError(format!(
            "PokeAPI returned status {}",
            status
        )))
    } else {
        Err(AppError::UpstreamError(format!(
            "Unexpected PokeAPI status {}",
            status
        )))
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    tracing::error!("Network error calling PokeAPI: {}", err);
    AppError::UpstreamUnavailable(err.to_string())
}

fn decode_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        return transport_error(err);
    }
    AppError::UpstreamError(format!("Unexpected PokeAPI payload: {}", err))
}

/// Trailing numeric segment of a resource URL (`.../pokemon/25/` -> 25)
pub fn extract_id_from_url(url: &str) -> Option<i32> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

fn sprite_url(id: i32) -> String {
    format!("{}/{}.png", SPRITE_BASE_URL, id)
}

fn summarize<'a>(resources: impl Iterator<Item = &'a NamedResource>) -> Vec<PokemonSummary> {
    resources
        .filter_map(|resource| match extract_id_from_url(&resource.url) {
            Some(id) => Some(PokemonSummary {
                id,
                name: resource.name.clone(),
            }),
            None => {
                tracing::warn!(url = %resource.url, "Skipping listing entry without an id");
                None
            }
        })
        .collect()
}

fn transform(raw: RawPokemon) -> Pokemon {
    let sprites = raw.sprites.unwrap_or_default();
    let artwork = sprites
        .other
        .and_then(|other| other.official_artwork)
        .and_then(|artwork| artwork.front_default);

    let sprite = artwork
        .filter(|s| !s.is_empty())
        .or(sprites.front_default.filter(|s| !s.is_empty()))
        .unwrap_or_else(|| sprite_url(raw.id));

    Pokemon {
        id: raw.id,
        name: raw.name,
        sprite,
        types: raw.types.into_iter().map(|t| t.kind.name).collect(),
        stats: raw
            .stats
            .into_iter()
            .map(|s| PokemonStat {
                name: s.stat.name,
                base: s.base_stat,
            })
            .collect(),
        abilities: raw.abilities.into_iter().map(|a| a.ability.name).collect(),
    }
}

fn pick_flavor_text(species: &RawSpecies, locale: &str) -> String {
    let in_language = |lang: &str| {
        species
            .flavor_text_entries
            .iter()
            .find(|entry| entry.language.name == lang)
    };

    in_language(locale)
        .or_else(|| in_language(FALLBACK_LOCALE))
        .map(|entry| clean_flavor_text(&entry.flavor_text))
        .unwrap_or_default()
}

// Flavor texts carry the game's line breaks and form feeds
fn clean_flavor_text(text: &str) -> String {
    text.replace(['\n', '\x0c'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// PokeAPI payloads (only the fields we read)

#[derive(Deserialize)]
struct NamedResource {
    name: String,
    #[serde(default)]
    url: String,
}

#[derive(Deserialize)]
struct RawPokemon {
    id: i32,
    name: String,
    #[serde(default)]
    sprites: Option<RawSprites>,
    #[serde(default)]
    types: Vec<RawTypeSlot>,
    #[serde(default)]
    stats: Vec<RawStat>,
    #[serde(default)]
    abilities: Vec<RawAbilitySlot>,
}

#[derive(Deserialize, Default)]
struct RawSprites {
    #[serde(default)]
    front_default: Option<String>,
    #[serde(default)]
    other: Option<RawOtherSprites>,
}

#[derive(Deserialize)]
struct RawOtherSprites {
    #[serde(rename = "official-artwork", default)]
    official_artwork: Option<RawArtwork>,
}

#[derive(Deserialize)]
struct RawArtwork {
    #[serde(default)]
    front_default: Option<String>,
}

#[derive(Deserialize)]
struct RawTypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Deserialize)]
struct RawStat {
    base_stat: i32,
    stat: NamedResource,
}

#[derive(Deserialize)]
struct RawAbilitySlot {
    ability: NamedResource,
}

#[derive(Deserialize)]
struct RawSpecies {
    #[serde(default)]
    flavor_text_entries: Vec<RawFlavorText>,
}

#[derive(Deserialize)]
struct RawFlavorText {
    flavor_text: String,
    language: NamedResource,
}

#[derive(Deserialize)]
struct RawListing {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    results: Vec<NamedResource>,
}

#[derive(Deserialize)]
struct RawType {
    #[serde(default)]
    pokemon: Vec<RawTypeMember>,
}

#[derive(Deserialize)]
struct RawTypeMember {
    pokemon: NamedResource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_blocking_client_is_built_once() {
        let cache = Arc::new(CatalogCache::new(4));
        let catalog =
            CatalogClient::new("http://127.0.0.1:1", Duration::from_secs(1), "en", cache).unwrap();
        let copy = catalog.clone();
        assert!(catalog.blocking.get().is_none());

        assert!(catalog.get_on_blocking_pool("pikachu").await.is_err());
        let first = catalog.blocking.get().unwrap() as *const reqwest::blocking::Client;

        assert!(copy.get_on_blocking_pool("eevee").await.is_err());
        let second = copy.blocking.get().unwrap() as *const reqwest::blocking::Client;

        assert_eq!(first, second);
    }

    fn raw(value: serde_json::Value) -> RawPokemon {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_transform_prefers_official_artwork() {
        let pokemon = transform(raw(json!({
            "id": 25,
            "name": "pikachu",
            "sprites": {
                "front_default": "front.png",
                "other": { "official-artwork": { "front_default": "artwork.png" } }
            },
            "types": [{ "slot": 1, "type": { "name": "electric", "url": "" } }],
            "stats": [{ "base_stat": 35, "stat": { "name": "hp", "url": "" } }],
            "abilities": [{ "ability": { "name": "static", "url": "" } }]
        })));

        assert_eq!(pokemon.sprite, "artwork.png");
        assert_eq!(pokemon.types, vec!["electric"]);
        assert_eq!(
            pokemon.stats,
            vec![PokemonStat {
                name: "hp".to_string(),
                base: 35
            }]
        );
        assert_eq!(pokemon.abilities, vec!["static"]);
    }

    #[test]
    fn test_transform_sprite_fallbacks() {
        let pokemon = transform(raw(json!({
            "id": 1,
            "name": "bulbasaur",
            "sprites": { "front_default": "front.png", "other": { "official-artwork": { "front_default": null } } }
        })));
        assert_eq!(pokemon.sprite, "front.png");

        let pokemon = transform(raw(json!({ "id": 7, "name": "squirtle", "sprites": null })));
        assert_eq!(pokemon.sprite, format!("{}/7.png", SPRITE_BASE_URL));
        assert!(pokemon.types.is_empty());
    }

    #[test]
    fn test_extract_id_from_url() {
        assert_eq!(
            extract_id_from_url("https://pokeapi.co/api/v2/pokemon/25/"),
            Some(25)
        );
        assert_eq!(extract_id_from_url("https://pokeapi.co/api/v2/pokemon/132"), Some(132));
        assert_eq!(extract_id_from_url("https://pokeapi.co/api/v2/pokemon/ditto/"), None);
        assert_eq!(extract_id_from_url(""), None);
    }

    #[test]
    fn test_flavor_text_locale_fallback() {
        let species: RawSpecies = serde_json::from_value(json!({
            "flavor_text_entries": [
                { "flavor_text": "When several of\nthese POKéMON\x0cgather", "language": { "name": "en", "url": "" } },
                { "flavor_text": "Cuando se juntan", "language": { "name": "es", "url": "" } }
            ]
        }))
        .unwrap();

        assert_eq!(pick_flavor_text(&species, "es"), "Cuando se juntan");
        assert_eq!(
            pick_flavor_text(&species, "ja"),
            "When several of these POKéMON gather"
        );

        let empty = RawSpecies {
            flavor_text_entries: Vec::new(),
        };
        assert_eq!(pick_flavor_text(&empty, "es"), "");
    }

    #[test]
    fn test_identifier_normalization() {
        assert_eq!(normalize_identifier(" Pikachu ").unwrap(), "pikachu");
        assert_eq!(normalize_identifier("mr-mime").unwrap(), "mr-mime");
        assert!(normalize_identifier("").is_err());
        assert!(normalize_identifier("../type/fire").is_err());
    }

    #[test]
    fn test_status_mapping() {
        assert!(check_status(StatusCode::OK, "u", "Pokemon").is_ok());
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, "u", "Pokemon"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            check_status(StatusCode::BAD_GATEWAY, "u", "Pokemon"),
            Err(AppError::UpstreamError(_))
        ));
    }
}
