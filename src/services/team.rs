use std::collections::HashSet;

use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CreateTeam, PokedexEntry, Team, TeamWithMembers, UpdateTeam};
use crate::repositories::{PokedexRepository, Repository, TeamRepository};
use crate::services::export;

pub const MAX_TEAM_SIZE: usize = 6;

/// Team composition over a trainer's own Pokédex entries
pub struct TeamService;

impl TeamService {
    pub async fn create(
        db: &DatabaseConnection,
        trainer_id: Uuid,
        input: &CreateTeam,
    ) -> AppResult<TeamWithMembers> {
        let txn = db.begin().await?;

        let entries = Self::resolve_members(&txn, trainer_id, &input.pokemon_ids).await?;
        let team =
            TeamRepository::create(&txn, trainer_id, &input.name, input.description.as_deref())
                .await?;
        TeamRepository::insert_members(&txn, team.id, &entries).await?;
        let members = TeamRepository::members(&txn, team.id).await?;

        txn.commit().await?;

        tracing::info!(team_id = %team.id, members = members.len(), "Team created");
        Ok(TeamWithMembers { team, members })
    }

    /// The trainer's teams, oldest first
    pub async fn list(db: &DatabaseConnection, trainer_id: Uuid) -> AppResult<Vec<TeamWithMembers>> {
        let teams = TeamRepository::list_by_trainer(db, trainer_id).await?;

        let mut expanded = Vec::with_capacity(teams.len());
        for team in teams {
            let members = TeamRepository::members(db, team.id).await?;
            expanded.push(TeamWithMembers { team, members });
        }

        Ok(expanded)
    }

    pub async fn get(
        db: &DatabaseConnection,
        trainer_id: Uuid,
        team_id: Uuid,
    ) -> AppResult<TeamWithMembers> {
        let team = Self::owned_team(db, trainer_id, team_id).await?;
        let members = TeamRepository::members(db, team.id).await?;

        Ok(TeamWithMembers { team, members })
    }

    /// Update details and, when given, replace the whole member list
    pub async fn update(
        db: &DatabaseConnection,
        trainer_id: Uuid,
        team_id: Uuid,
        input: &UpdateTeam,
    ) -> AppResult<TeamWithMembers> {
        let txn = db.begin().await?;

        Self::owned_team(&txn, trainer_id, team_id).await?;

        if let Some(pokemon_ids) = &input.pokemon_ids {
            let entries = Self::resolve_members(&txn, trainer_id, pokemon_ids).await?;
            TeamRepository::delete_members(&txn, team_id).await?;
            TeamRepository::insert_members(&txn, team_id, &entries).await?;
        }

        let team = TeamRepository::update_details(&txn, team_id, input).await?;
        let members = TeamRepository::members(&txn, team_id).await?;

        txn.commit().await?;

        Ok(TeamWithMembers { team, members })
    }

    pub async fn delete(db: &DatabaseConnection, trainer_id: Uuid, team_id: Uuid) -> AppResult<()> {
        let txn = db.begin().await?;

        Self::owned_team(&txn, trainer_id, team_id).await?;
        TeamRepository::delete_members(&txn, team_id).await?;
        TeamRepository::delete(&txn, team_id).await?;

        txn.commit().await?;

        tracing::info!(team_id = %team_id, "Team deleted");
        Ok(())
    }

    /// Render the team as a PDF sheet
    pub async fn export(
        db: &DatabaseConnection,
        trainer_id: Uuid,
        team_id: Uuid,
    ) -> AppResult<(Team, Vec<u8>)> {
        let expanded = Self::get(db, trainer_id, team_id).await?;
        let pdf = export::team_pdf(&expanded)?;

        Ok((expanded.team, pdf))
    }

    async fn owned_team<C: ConnectionTrait>(
        db: &C,
        trainer_id: Uuid,
        team_id: Uuid,
    ) -> AppResult<Team> {
        let team = TeamRepository::find_by_id(db, team_id).await?;

        if team.trainer_id != trainer_id {
            return Err(AppError::Forbidden(
                "Not allowed to access this team".to_string(),
            ));
        }

        Ok(team)
    }

    /// Validate a member list and map each id to the trainer's entry, in order
    async fn resolve_members<C: ConnectionTrait>(
        db: &C,
        trainer_id: Uuid,
        pokemon_ids: &[i32],
    ) -> AppResult<Vec<PokedexEntry>> {
        validate_member_ids(pokemon_ids)?;

        let mut entries = Vec::with_capacity(pokemon_ids.len());
        for &pokemon_id in pokemon_ids {
            let entry = PokedexRepository::find_by_owner_and_pokemon(db, trainer_id, pokemon_id)
                .await?
                .ok_or(AppError::NotInCollection(pokemon_id))?;
            entries.push(entry);
        }

        Ok(entries)
    }
}

/// Size and uniqueness rules for a team's member list
pub fn validate_member_ids(pokemon_ids: &[i32]) -> AppResult<()> {
    if pokemon_ids.is_empty() {
        return Err(AppError::InvalidSize(
            "Team must have at least 1 Pokémon".to_string(),
        ));
    }
    if pokemon_ids.len() > MAX_TEAM_SIZE {
        return Err(AppError::InvalidSize(format!(
            "Team cannot have more than {} Pokémon",
            MAX_TEAM_SIZE
        )));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = pokemon_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(AppError::DuplicateMember(format!(
            "Pokemon with id {} is duplicated in the team",
            duplicate
        )));
    }

    Ok(())
}
