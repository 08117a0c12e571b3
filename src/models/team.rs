use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Team member joined with its Pokédex entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMemberView {
    pub id: Uuid,
    pub position: i32,
    pub pokedex_entry_id: Uuid,
    pub pokemon_id: i32,
    pub pokemon_name: String,
}

/// Team with its members ordered by position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamWithMembers {
    pub team: Team,
    pub members: Vec<TeamMemberView>,
}

#[derive(Debug, Clone)]
pub struct CreateTeam {
    pub name: String,
    pub description: Option<String>,
    pub pokemon_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTeam {
    pub name: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub pokemon_ids: Option<Vec<i32>>,
}
