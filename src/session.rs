//! Remembers which collection each conversation picked. Selections are keyed
//! by user so one person switching hymnals never affects another, and they
//! live until the process restarts.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::models::{Collection, UserId};

#[derive(Debug, Default)]
pub struct SessionStore {
    selections: Mutex<HashMap<UserId, Collection>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the user's selection.
    pub fn select(&self, user: UserId, collection: Collection) {
        self.lock().insert(user, collection);
    }

    pub fn current(&self, user: UserId) -> Option<Collection> {
        self.lock().get(&user).copied()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, Collection>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.selections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
