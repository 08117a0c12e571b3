use sea_orm::sea_query::Index;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    EntityTrait, Schema,
};

use crate::entity::{pokedex_entry, team, team_member, user};

/// Open the primary database connection.
///
/// An in-memory SQLite database lives inside one connection, which must
/// stay open for the lifetime of the pool.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    if database_url.contains(":memory:") {
        opt.max_connections(1).min_connections(1);
    } else if !database_url.starts_with("sqlite:") {
        opt.max_connections(100).min_connections(5);
    }
    opt.sqlx_logging(true);

    Database::connect(opt).await
}

/// Create all tables and indexes that do not exist yet
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();

    create_table(db, backend, user::Entity).await?;
    create_table(db, backend, pokedex_entry::Entity).await?;
    create_table(db, backend, team::Entity).await?;
    create_table(db, backend, team_member::Entity).await?;

    // A user can hold each Pokémon once
    let owner_pokemon = Index::create()
        .name("uq_pokedex_entries_owner_pokemon")
        .table(pokedex_entry::Entity)
        .col(pokedex_entry::Column::OwnerId)
        .col(pokedex_entry::Column::PokemonId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&owner_pokemon)).await?;

    let team_members = Index::create()
        .name("idx_team_members_team")
        .table(team_member::Entity)
        .col(team_member::Column::TeamId)
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&team_members)).await?;

    tracing::debug!(backend = ?backend, "Database schema ready");
    Ok(())
}

async fn create_table<E>(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    entity: E,
) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let schema = Schema::new(backend);
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}
