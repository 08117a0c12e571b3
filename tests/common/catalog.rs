use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Pokémon served by the fake PokeAPI: (id, name, types)
pub const DEX: &[(i32, &str, &[&str])] = &[
    (1, "bulbasaur", &["grass", "poison"]),
    (4, "charmander", &["fire"]),
    (6, "charizard", &["fire", "flying"]),
    (7, "squirtle", &["water"]),
    (25, "pikachu", &["electric"]),
];

/// Name that makes the fake upstream answer 500
pub const BROKEN_NAME: &str = "missingno";

#[allow(dead_code)]
pub fn name_of(id: i32) -> &'static str {
    DEX.iter()
        .find(|(dex_id, _, _)| *dex_id == id)
        .map(|(_, name, _)| *name)
        .unwrap_or("unknown")
}

#[derive(Clone)]
struct CatalogState {
    base_url: String,
    pokemon_hits: Arc<AtomicUsize>,
}

/// In-process stand-in for PokeAPI, bound to an ephemeral port
pub struct FakeCatalog {
    pub base_url: String,
    pokemon_hits: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FakeCatalog {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake catalog");
        let addr = listener.local_addr().expect("Fake catalog has no address");
        let base_url = format!("http://{}", addr);

        let pokemon_hits = Arc::new(AtomicUsize::new(0));
        let state = CatalogState {
            base_url: base_url.clone(),
            pokemon_hits: pokemon_hits.clone(),
        };

        let router = Router::new()
            .route("/pokemon", get(listing))
            .route("/pokemon/{key}", get(pokemon))
            .route("/pokemon-species/{id}", get(species))
            .route("/type/{name}", get(type_members))
            .route("/sprites/{file}", get(sprite))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Fake catalog stopped");
        });

        Self {
            base_url,
            pokemon_hits,
        }
    }

    /// Number of `/pokemon/{key}` requests served so far
    pub fn pokemon_hits(&self) -> usize {
        self.pokemon_hits.load(Ordering::SeqCst)
    }
}

fn find(key: &str) -> Option<&'static (i32, &'static str, &'static [&'static str])> {
    DEX.iter()
        .find(|(id, name, _)| id.to_string() == key || *name == key)
}

fn pokemon_payload(base_url: &str, (id, name, types): &(i32, &str, &[&str])) -> Value {
    let types: Vec<Value> = types
        .iter()
        .enumerate()
        .map(|(slot, t)| {
            json!({
                "slot": slot + 1,
                "type": { "name": t, "url": format!("{}/type/{}/", base_url, t) }
            })
        })
        .collect();

    json!({
        "id": id,
        "name": name,
        "sprites": {
            "front_default": null,
            "other": {
                "official-artwork": {
                    "front_default": format!("{}/sprites/{}.png", base_url, id)
                }
            }
        },
        "types": types,
        "stats": [
            { "base_stat": 45, "stat": { "name": "hp", "url": "" } },
            { "base_stat": 49, "stat": { "name": "attack", "url": "" } }
        ],
        "abilities": [
            { "ability": { "name": "overgrow", "url": "" }, "is_hidden": false }
        ]
    })
}

async fn pokemon(State(state): State<CatalogState>, Path(key): Path<String>) -> Response {
    state.pokemon_hits.fetch_add(1, Ordering::SeqCst);

    if key == BROKEN_NAME {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    match find(&key) {
        Some(entry) => Json(pokemon_payload(&state.base_url, entry)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn species(Path(id): Path<i32>) -> Response {
    let entries = match id {
        25 => json!([
            {
                "flavor_text": "When several of\nthese POKéMON gather,\x0ctheir electricity could build.",
                "language": { "name": "en", "url": "" }
            },
            {
                "flavor_text": "Cuando se juntan\nvarios de estos POKéMON,\x0csu electricidad puede causar tormentas.",
                "language": { "name": "es", "url": "" }
            }
        ]),
        1 => json!([
            {
                "flavor_text": "A strange seed was\nplanted on its back at birth.",
                "language": { "name": "en", "url": "" }
            }
        ]),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    Json(json!({ "id": id, "flavor_text_entries": entries })).into_response()
}

async fn listing(
    State(state): State<CatalogState>,
    Query(params): Query<HashMap<String, usize>>,
) -> Json<Value> {
    let limit = params.get("limit").copied().unwrap_or(20);
    let offset = params.get("offset").copied().unwrap_or(0);

    let results: Vec<Value> = DEX
        .iter()
        .skip(offset)
        .take(limit)
        .map(|(id, name, _)| {
            json!({ "name": name, "url": format!("{}/pokemon/{}/", state.base_url, id) })
        })
        .collect();

    Json(json!({ "count": DEX.len(), "next": null, "previous": null, "results": results }))
}

async fn type_members(State(state): State<CatalogState>, Path(name): Path<String>) -> Response {
    let members: Vec<Value> = DEX
        .iter()
        .filter(|(_, _, types)| types.contains(&name.as_str()))
        .map(|(id, pokemon, _)| {
            json!({
                "slot": 1,
                "pokemon": { "name": pokemon, "url": format!("{}/pokemon/{}/", state.base_url, id) }
            })
        })
        .collect();

    if members.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }

    Json(json!({ "name": name, "pokemon": members })).into_response()
}

// Sprites are never available, so cards render without an image
async fn sprite(Path(_file): Path<String>) -> StatusCode {
    StatusCode::NOT_FOUND
}
