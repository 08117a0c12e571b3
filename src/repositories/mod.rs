pub mod pokedex;
pub mod team;
pub mod user;

pub use pokedex::PokedexRepository;
pub use team::TeamRepository;
pub use user::UserRepository;

use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::error::AppResult;

/// Base repository trait for lookups and deletes by primary key.
///
/// Generic over the connection so the same calls work inside a transaction.
#[async_trait]
pub trait Repository<T>
where
    T: Send + Sync,
{
    /// Find entity by ID
    async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<T>;

    /// Delete entity by ID
    async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()>;
}
