use time::OffsetDateTime;
use uuid::Uuid;

use pokedex_api::models::{CreatePokedexEntry, CreateUser, Patch, PokedexEntry, UpdatePokedexEntry, User};
use pokedex_api::repositories::{PokedexRepository, UserRepository};
use pokedex_api::services::AuthService;
use pokedex_api::state::AppState;

use super::catalog::name_of;

pub const TEST_PASSWORD: &str = "StrongPass1";

/// Authentication info for tests
#[allow(dead_code)]
pub struct TestAuth {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

impl TestAuth {
    /// Get the Authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Factory for creating test data
pub struct Factory<'a> {
    state: &'a AppState,
}

#[allow(dead_code)]
impl<'a> Factory<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Create a test user and return auth info
    pub async fn create_user(&self) -> TestAuth {
        let username = format!("trainer_{}", &Uuid::new_v4().simple().to_string()[..12]);
        let user = self.create_user_with_password(&username, TEST_PASSWORD).await;

        let token = AuthService::generate_token(&user.username, &self.state.config).unwrap();

        TestAuth {
            user_id: user.id,
            username: user.username,
            token,
        }
    }

    /// Create a test user with a specific username and password
    pub async fn create_user_with_password(&self, username: &str, password: &str) -> User {
        let input = CreateUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: password.to_string(),
        };

        let password_hash = AuthService::hash_password(password).unwrap();
        UserRepository::create(&self.state.db, &input, &password_hash)
            .await
            .unwrap()
    }

    pub async fn deactivate(&self, user_id: Uuid) -> User {
        UserRepository::set_active(&self.state.db, user_id, false)
            .await
            .unwrap()
    }

    /// Token for `username` that expired ten minutes ago
    pub fn expired_token(&self, username: &str) -> String {
        AuthService::issue_token(username, time::Duration::minutes(-10), &self.state.config)
            .unwrap()
    }

    /// Insert a Pokédex entry directly, bypassing the catalog lookup
    pub async fn add_entry(&self, owner_id: Uuid, pokemon_id: i32, is_captured: bool) -> PokedexEntry {
        self.add_entry_with(owner_id, pokemon_id, is_captured, false).await
    }

    pub async fn add_entry_with(
        &self,
        owner_id: Uuid,
        pokemon_id: i32,
        is_captured: bool,
        favorite: bool,
    ) -> PokedexEntry {
        let input = CreatePokedexEntry {
            pokemon_id,
            pokemon_name: name_of(pokemon_id).to_string(),
            pokemon_sprite: format!("https://example.com/sprites/{}.png", pokemon_id),
            is_captured,
            favorite,
            nickname: None,
            notes: None,
        };

        PokedexRepository::create(&self.state.db, owner_id, &input)
            .await
            .unwrap()
    }

    /// Overwrite an entry's capture date
    pub async fn set_capture_date(&self, entry_id: Uuid, at: OffsetDateTime) -> PokedexEntry {
        let input = UpdatePokedexEntry {
            capture_date: Patch::Value(at),
            ..Default::default()
        };

        PokedexRepository::update(&self.state.db, entry_id, &input)
            .await
            .unwrap()
    }
}
