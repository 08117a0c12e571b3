use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};
use uuid::Uuid;

use crate::entity::pokedex_entry::{self, ActiveModel, Column, Entity as PokedexEntity};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{
    CreatePokedexEntry, PokedexEntry, PokedexFilter, SortField, SortOrder, UpdatePokedexEntry,
};
use crate::repositories::Repository;

/// Pokédex entry repository for database operations
pub struct PokedexRepository;

#[async_trait]
impl Repository<PokedexEntry> for PokedexRepository {
    async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<PokedexEntry> {
        let model = PokedexEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Pokedex entry".to_string()))?;

        Ok(model.into())
    }

    async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
        let result = PokedexEntity::delete_by_id(id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Pokedex entry".to_string()));
        }

        Ok(())
    }
}

impl PokedexRepository {
    /// Create a new entry; capture_date is stamped when created as captured
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        owner_id: Uuid,
        input: &CreatePokedexEntry,
    ) -> AppResult<PokedexEntry> {
        let now = time::OffsetDateTime::now_utc();

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            pokemon_id: Set(input.pokemon_id),
            pokemon_name: Set(input.pokemon_name.clone()),
            pokemon_sprite: Set(input.pokemon_sprite.clone()),
            is_captured: Set(input.is_captured),
            capture_date: Set(input.is_captured.then_some(now)),
            nickname: Set(input.nickname.clone()),
            notes: Set(input.notes.clone()),
            favorite: Set(input.favorite),
            created_at: Set(now),
        };

        let result = model.insert(db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateEntry("Pokemon already in your Pokedex".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        Ok(result.into())
    }

    /// Find the owner's entry for a given Pokémon
    pub async fn find_by_owner_and_pokemon<C: ConnectionTrait>(
        db: &C,
        owner_id: Uuid,
        pokemon_id: i32,
    ) -> AppResult<Option<PokedexEntry>> {
        let model = PokedexEntity::find()
            .filter(Column::OwnerId.eq(owner_id))
            .filter(Column::PokemonId.eq(pokemon_id))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    /// List the owner's entries matching the filter, one page at a time
    pub async fn list_by_owner<C: ConnectionTrait>(
        db: &C,
        owner_id: Uuid,
        filter: &PokedexFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<PokedexEntry>> {
        let models = Self::filtered(owner_id, filter)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    /// All of the owner's entries matching the filter (no pagination)
    pub async fn list_all_by_owner<C: ConnectionTrait>(
        db: &C,
        owner_id: Uuid,
        filter: &PokedexFilter,
    ) -> AppResult<Vec<PokedexEntry>> {
        let models = Self::filtered(owner_id, filter).all(db).await?;
        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    /// Apply the supplied fields of a partial update
    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        input: &UpdatePokedexEntry,
    ) -> AppResult<PokedexEntry> {
        let model = PokedexEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Pokedex entry".to_string()))?;

        let had_capture_date = model.capture_date.is_some();
        let mut active: ActiveModel = model.into();

        if let Some(nickname) = input.nickname.clone().into_update() {
            active.nickname = Set(nickname);
        }
        if let Some(notes) = input.notes.clone().into_update() {
            active.notes = Set(notes);
        }
        if let Some(favorite) = input.favorite {
            active.favorite = Set(favorite);
        }
        if let Some(capture_date) = input.capture_date.clone().into_update() {
            active.capture_date = Set(capture_date);
        }
        if let Some(is_captured) = input.is_captured {
            active.is_captured = Set(is_captured);

            // Stamp the first capture; an existing date is never cleared
            let date_after_patch = match input.capture_date.as_value() {
                Some(_) => true,
                None if input.capture_date.is_missing() => had_capture_date,
                None => false,
            };
            if is_captured && !date_after_patch {
                active.capture_date = Set(Some(time::OffsetDateTime::now_utc()));
            }
        }

        let result = active.update(db).await?;
        Ok(result.into())
    }

    fn filtered(owner_id: Uuid, filter: &PokedexFilter) -> Select<PokedexEntity> {
        let mut query = PokedexEntity::find().filter(Column::OwnerId.eq(owner_id));

        if let Some(captured) = filter.captured {
            query = query.filter(Column::IsCaptured.eq(captured));
        }
        if let Some(favorite) = filter.favorite {
            query = query.filter(Column::Favorite.eq(favorite));
        }

        let column = match filter.sort {
            SortField::PokemonId => Column::PokemonId,
            SortField::CaptureDate => Column::CaptureDate,
            SortField::PokemonName => Column::PokemonName,
        };
        let order = match filter.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        // Entry id breaks ties so repeated calls return the same order
        query
            .order_by(column, order)
            .order_by_asc(Column::Id)
    }
}

// Conversion from SeaORM model to our domain model
impl From<pokedex_entry::Model> for PokedexEntry {
    fn from(m: pokedex_entry::Model) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            pokemon_id: m.pokemon_id,
            pokemon_name: m.pokemon_name,
            pokemon_sprite: m.pokemon_sprite,
            is_captured: m.is_captured,
            capture_date: m.capture_date,
            nickname: m.nickname,
            notes: m.notes,
            favorite: m.favorite,
            created_at: m.created_at,
        }
    }
}
