use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokedexEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub pokemon_id: i32,
    pub pokemon_name: String,
    pub pokemon_sprite: String,
    pub is_captured: bool,
    pub capture_date: Option<OffsetDateTime>,
    pub nickname: Option<String>,
    pub notes: Option<String>,
    pub favorite: bool,
    pub created_at: OffsetDateTime,
}

/// What a caller supplies when adding a Pokémon to their Pokédex
#[derive(Debug, Clone, Default)]
pub struct AddPokedexEntry {
    pub pokemon_id: i32,
    pub nickname: Option<String>,
    pub notes: Option<String>,
    pub is_captured: bool,
    pub favorite: bool,
}

/// Entry creation DTO; name and sprite come from the catalog
#[derive(Debug, Clone)]
pub struct CreatePokedexEntry {
    pub pokemon_id: i32,
    pub pokemon_name: String,
    pub pokemon_sprite: String,
    pub is_captured: bool,
    pub favorite: bool,
    pub nickname: Option<String>,
    pub notes: Option<String>,
}

/// Tri-state field of a partial update: absent, explicit `null`, or a value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    /// `None` when the field was not supplied, `Some(None)` for an explicit null
    pub fn into_update(self) -> Option<Option<T>> {
        match self {
            Patch::Missing => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }
}

// Only reached when the key is present; absent keys fall back to `Default`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// Partial entry update, applied field by field
#[derive(Debug, Clone, Default)]
pub struct UpdatePokedexEntry {
    pub nickname: Patch<String>,
    pub notes: Patch<String>,
    pub is_captured: Option<bool>,
    pub favorite: Option<bool>,
    pub capture_date: Patch<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    PokemonId,
    CaptureDate,
    PokemonName,
}

impl SortField {
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        match raw {
            None | Some("pokemon_id") => Ok(SortField::PokemonId),
            Some("capture_date") => Ok(SortField::CaptureDate),
            Some("pokemon_name") => Ok(SortField::PokemonName),
            Some(other) => Err(AppError::Validation(format!(
                "Invalid sort '{}': expected pokemon_id, capture_date or pokemon_name",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        match raw {
            None | Some("asc") => Ok(SortOrder::Asc),
            Some("desc") => Ok(SortOrder::Desc),
            Some(other) => Err(AppError::Validation(format!(
                "Invalid order '{}': expected asc or desc",
                other
            ))),
        }
    }
}

/// Filters shared by listing and CSV export
#[derive(Debug, Clone, Copy, Default)]
pub struct PokedexFilter {
    pub captured: Option<bool>,
    pub favorite: Option<bool>,
    pub sort: SortField,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PokedexStats {
    pub total_pokemon: u64,
    pub captured: u64,
    pub favorites: u64,
    pub completion_percentage: f64,
    pub most_common_type: Option<String>,
    pub capture_streak_days: u32,
}
