pub mod pokedex_entry;
pub mod team;
pub mod team_member;
pub mod user;

pub mod prelude;

pub use prelude::*;
