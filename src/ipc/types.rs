use std::collections::HashMap;

use serde::Deserialize;

use crate::facade::Store;
use crate::model::{Id, InsertUser};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// What a login token resolves to. Cloned out of the session map so
/// handlers can keep it while mutating state.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Id,
    pub is_admin: bool,
}

pub struct AppState {
    pub store: Store,
    pub sessions: HashMap<String, Session>,
}

impl AppState {
    /// Fresh state with the seed admin already present. Every other user
    /// comes in later through the admin-only users.create call.
    pub fn new(admin: InsertUser) -> Self {
        let mut store = Store::new();
        let seeded = store.create_user(admin);
        tracing::info!(username = %seeded.username, "seeded admin user");
        Self {
            store,
            sessions: HashMap::new(),
        }
    }
}
