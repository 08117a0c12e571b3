use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::pokedex_entry::Entity as PokedexEntity;
use crate::entity::team::{self, ActiveModel, Column, Entity as TeamEntity};
use crate::entity::team_member::{
    ActiveModel as MemberActiveModel, Column as MemberColumn, Entity as MemberEntity,
};
use crate::error::{AppError, AppResult};
use crate::models::{PokedexEntry, Team, TeamMemberView, UpdateTeam};
use crate::repositories::Repository;

/// Team repository for database operations
pub struct TeamRepository;

#[async_trait]
impl Repository<Team> for TeamRepository {
    async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Team> {
        let model = TeamEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Team".to_string()))?;

        Ok(model.into())
    }

    async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
        let result = TeamEntity::delete_by_id(id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Team".to_string()));
        }

        Ok(())
    }
}

impl TeamRepository {
    /// Create a new team (members are inserted separately)
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        trainer_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Team> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            trainer_id: Set(trainer_id),
            name: Set(name.to_string()),
            description: Set(description.map(str::to_string)),
            created_at: Set(time::OffsetDateTime::now_utc()),
        };

        let result = model.insert(db).await?;
        Ok(result.into())
    }

    /// List a trainer's teams, oldest first
    pub async fn list_by_trainer<C: ConnectionTrait>(
        db: &C,
        trainer_id: Uuid,
    ) -> AppResult<Vec<Team>> {
        let models = TeamEntity::find()
            .filter(Column::TrainerId.eq(trainer_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    /// Update name and/or description
    pub async fn update_details<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        input: &UpdateTeam,
    ) -> AppResult<Team> {
        let model = TeamEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Team".to_string()))?;

        if input.name.is_none() && input.description.is_none() {
            return Ok(model.into());
        }

        let mut active: ActiveModel = model.into();

        if let Some(name) = &input.name {
            active.name = Set(name.clone());
        }
        if let Some(description) = &input.description {
            active.description = Set(description.clone());
        }

        let result = active.update(db).await?;
        Ok(result.into())
    }

    /// Insert members at positions 1..=n in the given order
    pub async fn insert_members<C: ConnectionTrait>(
        db: &C,
        team_id: Uuid,
        entries: &[PokedexEntry],
    ) -> AppResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let members = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| MemberActiveModel {
                id: Set(Uuid::new_v4()),
                team_id: Set(team_id),
                pokedex_entry_id: Set(entry.id),
                position: Set(index as i32 + 1),
            });

        MemberEntity::insert_many(members).exec(db).await?;
        Ok(())
    }

    /// Remove every member of a team
    pub async fn delete_members<C: ConnectionTrait>(db: &C, team_id: Uuid) -> AppResult<u64> {
        let result = MemberEntity::delete_many()
            .filter(MemberColumn::TeamId.eq(team_id))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Remove the memberships that point at a Pokédex entry
    pub async fn delete_members_for_entry<C: ConnectionTrait>(
        db: &C,
        pokedex_entry_id: Uuid,
    ) -> AppResult<u64> {
        let result = MemberEntity::delete_many()
            .filter(MemberColumn::PokedexEntryId.eq(pokedex_entry_id))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Teams that have the entry as a member
    pub async fn team_ids_for_entry<C: ConnectionTrait>(
        db: &C,
        pokedex_entry_id: Uuid,
    ) -> AppResult<Vec<Uuid>> {
        let rows = MemberEntity::find()
            .filter(MemberColumn::PokedexEntryId.eq(pokedex_entry_id))
            .all(db)
            .await?;

        let mut team_ids: Vec<Uuid> = rows.into_iter().map(|row| row.team_id).collect();
        team_ids.sort_unstable();
        team_ids.dedup();
        Ok(team_ids)
    }

    /// Renumber a team's members 1..=n keeping their order; returns n
    pub async fn compact_positions<C: ConnectionTrait>(db: &C, team_id: Uuid) -> AppResult<usize> {
        let rows = MemberEntity::find()
            .filter(MemberColumn::TeamId.eq(team_id))
            .order_by_asc(MemberColumn::Position)
            .all(db)
            .await?;

        let count = rows.len();
        for (index, row) in rows.into_iter().enumerate() {
            let position = index as i32 + 1;
            if row.position == position {
                continue;
            }

            let mut active: MemberActiveModel = row.into();
            active.position = Set(position);
            active.update(db).await?;
        }

        Ok(count)
    }

    /// Members of a team joined with their entries, ordered by position
    pub async fn members<C: ConnectionTrait>(
        db: &C,
        team_id: Uuid,
    ) -> AppResult<Vec<TeamMemberView>> {
        let rows = MemberEntity::find()
            .filter(MemberColumn::TeamId.eq(team_id))
            .find_also_related(PokedexEntity)
            .order_by_asc(MemberColumn::Position)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(member, entry)| {
                entry.map(|entry| TeamMemberView {
                    id: member.id,
                    position: member.position,
                    pokedex_entry_id: entry.id,
                    pokemon_id: entry.pokemon_id,
                    pokemon_name: entry.pokemon_name,
                })
            })
            .collect())
    }
}

// Conversion from SeaORM model to our domain model
impl From<team::Model> for Team {
    fn from(m: team::Model) -> Self {
        Self {
            id: m.id,
            trainer_id: m.trainer_id,
            name: m.name,
            description: m.description,
            created_at: m.created_at,
        }
    }
}
