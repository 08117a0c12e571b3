use std::collections::HashSet;

use futures::future::try_join_all;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use time::{Date, Duration};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    AddPokedexEntry, CreatePokedexEntry, PokedexEntry, PokedexFilter, PokedexStats,
    UpdatePokedexEntry,
};
use crate::repositories::{PokedexRepository, Repository, TeamRepository};
use crate::services::{export, CatalogClient};

pub const MAX_PAGE_SIZE: i64 = 200;

/// Per-user collection operations
pub struct PokedexService;

impl PokedexService {
    /// Add a Pokémon to the owner's Pokédex, denormalizing name and sprite
    pub async fn add(
        db: &DatabaseConnection,
        catalog: &CatalogClient,
        owner_id: Uuid,
        input: AddPokedexEntry,
    ) -> AppResult<PokedexEntry> {
        if PokedexRepository::find_by_owner_and_pokemon(db, owner_id, input.pokemon_id)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateEntry(
                "Pokemon already in your Pokedex".to_string(),
            ));
        }

        let pokemon = catalog
            .get_on_blocking_pool(&input.pokemon_id.to_string())
            .await?;

        let create = CreatePokedexEntry {
            pokemon_id: input.pokemon_id,
            pokemon_name: pokemon.name,
            pokemon_sprite: pokemon.sprite,
            is_captured: input.is_captured,
            favorite: input.favorite,
            nickname: input.nickname,
            notes: input.notes,
        };

        let entry = PokedexRepository::create(db, owner_id, &create).await?;
        tracing::info!(owner_id = %owner_id, pokemon_id = entry.pokemon_id, "Pokedex entry added");

        Ok(entry)
    }

    pub async fn list(
        db: &DatabaseConnection,
        owner_id: Uuid,
        filter: &PokedexFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<PokedexEntry>> {
        let (limit, offset) = validate_page(limit, offset)?;
        PokedexRepository::list_by_owner(db, owner_id, filter, limit, offset).await
    }

    /// Page of entries, each paired with its catalog types
    pub async fn list_with_types(
        db: &DatabaseConnection,
        catalog: &CatalogClient,
        owner_id: Uuid,
        filter: &PokedexFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<(PokedexEntry, Vec<String>)>> {
        let entries = Self::list(db, owner_id, filter, limit, offset).await?;

        let lookups = entries.iter().map(|entry| {
            let key = entry.pokemon_id.to_string();
            async move { catalog.get(&key).await }
        });
        let pokemon = try_join_all(lookups).await?;

        Ok(entries
            .into_iter()
            .zip(pokemon)
            .map(|(entry, pokemon)| (entry, pokemon.types))
            .collect())
    }

    /// Apply a partial update to one of the owner's entries
    pub async fn patch(
        db: &DatabaseConnection,
        owner_id: Uuid,
        entry_id: Uuid,
        input: &UpdatePokedexEntry,
    ) -> AppResult<PokedexEntry> {
        Self::owned_entry(db, owner_id, entry_id).await?;
        PokedexRepository::update(db, entry_id, input).await
    }

    /// Hard delete, together with the team memberships pointing at the entry.
    ///
    /// The remaining members of each affected team move up to keep positions
    /// contiguous from 1. A team left without members is deleted.
    pub async fn delete(db: &DatabaseConnection, owner_id: Uuid, entry_id: Uuid) -> AppResult<()> {
        let txn = db.begin().await?;

        Self::owned_entry(&txn, owner_id, entry_id).await?;

        let team_ids = TeamRepository::team_ids_for_entry(&txn, entry_id).await?;
        TeamRepository::delete_members_for_entry(&txn, entry_id).await?;

        let mut emptied = 0;
        for team_id in &team_ids {
            if TeamRepository::compact_positions(&txn, *team_id).await? == 0 {
                TeamRepository::delete(&txn, *team_id).await?;
                emptied += 1;
            }
        }

        PokedexRepository::delete(&txn, entry_id).await?;

        txn.commit().await?;

        if !team_ids.is_empty() {
            tracing::info!(
                entry_id = %entry_id,
                teams = team_ids.len(),
                emptied,
                "Removed team memberships of deleted entry"
            );
        }
        Ok(())
    }

    pub async fn stats(
        db: &DatabaseConnection,
        catalog: &CatalogClient,
        owner_id: Uuid,
    ) -> AppResult<PokedexStats> {
        let entries =
            PokedexRepository::list_all_by_owner(db, owner_id, &PokedexFilter::default()).await?;

        let total = entries.len() as u64;
        let captured = entries.iter().filter(|e| e.is_captured).count() as u64;
        let favorites = entries.iter().filter(|e| e.favorite).count() as u64;

        let capture_dates: Vec<Date> = entries
            .iter()
            .filter_map(|e| e.capture_date.map(|d| d.date()))
            .collect();

        let mut seen = HashSet::new();
        let distinct_ids: Vec<i32> = entries
            .iter()
            .map(|e| e.pokemon_id)
            .filter(|id| seen.insert(*id))
            .collect();

        let lookups = distinct_ids.iter().map(|id| {
            let key = id.to_string();
            async move { catalog.get(&key).await }
        });
        let pokemon = try_join_all(lookups).await?;

        Ok(PokedexStats {
            total_pokemon: total,
            captured,
            favorites,
            completion_percentage: completion_percentage(captured, total),
            most_common_type: most_common(pokemon.iter().flat_map(|p| p.types.iter())),
            capture_streak_days: longest_streak(capture_dates),
        })
    }

    /// CSV export of every entry matching the filter
    pub async fn export_csv(
        db: &DatabaseConnection,
        owner_id: Uuid,
        filter: &PokedexFilter,
    ) -> AppResult<Vec<u8>> {
        let entries = PokedexRepository::list_all_by_owner(db, owner_id, filter).await?;
        export::pokedex_csv(&entries)
    }

    async fn owned_entry<C: ConnectionTrait>(
        db: &C,
        owner_id: Uuid,
        entry_id: Uuid,
    ) -> AppResult<PokedexEntry> {
        let entry = PokedexRepository::find_by_id(db, entry_id).await?;

        if entry.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Not allowed to access this Pokedex entry".to_string(),
            ));
        }

        Ok(entry)
    }
}

fn validate_page(limit: i64, offset: i64) -> AppResult<(u64, u64)> {
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    if offset < 0 {
        return Err(AppError::Validation(
            "offset must be greater than or equal to 0".to_string(),
        ));
    }

    Ok((limit as u64, offset as u64))
}

/// Captured share of the collection, rounded to one decimal
fn completion_percentage(captured: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (captured as f64 * 1000.0 / total as f64).round() / 10.0
}

/// Longest run of consecutive calendar days among the given dates
fn longest_streak(mut dates: Vec<Date>) -> u32 {
    dates.sort_unstable();
    dates.dedup();

    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<Date> = None;

    for date in dates {
        current = match previous {
            Some(prev) if prev + Duration::days(1) == date => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(date);
    }

    longest
}

/// Most frequent value; the first one seen wins a tie
fn most_common<'a>(values: impl Iterator<Item = &'a String>) -> Option<String> {
    let mut counts: Vec<(&String, u32)> = Vec::new();

    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&String, u32)> = None;
    for (value, count) in counts {
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((value, count)),
        }
    }

    best.map(|(value, _)| value.clone())
}
