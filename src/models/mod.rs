pub mod pokedex;
pub mod pokemon;
pub mod team;
pub mod user;

pub use pokedex::*;
pub use pokemon::*;
pub use team::*;
pub use user::*;
