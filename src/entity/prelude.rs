pub use super::pokedex_entry::Entity as PokedexEntry;
pub use super::team::Entity as Team;
pub use super::team_member::Entity as TeamMember;
pub use super::user::Entity as User;
