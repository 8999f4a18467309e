//! In-memory store of running test sessions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use flashcard_core::{Category, QuestionType, TestSession};
use uuid::Uuid;

use crate::error::{ApiError, Result};

/// A test session plus what it was generated from.
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub category: Category,
    pub question_type: QuestionType,
    pub session: TestSession,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, StoredSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, stored: StoredSession) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(id, stored);
        id
    }

    pub fn get(&self, id: Uuid) -> Result<StoredSession> {
        self.lock().get(&id).cloned().ok_or_else(|| not_found(id))
    }

    /// Run `f` against the session under the store lock.
    pub fn update<T, F>(&self, id: Uuid, f: F) -> Result<T>
    where
        F: FnOnce(&mut StoredSession) -> Result<T>,
    {
        let mut sessions = self.lock();
        let stored = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        f(stored)
    }

    pub fn remove(&self, id: Uuid) -> Result<()> {
        self.lock()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, StoredSession>> {
        self.sessions.lock().expect("session store lock")
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("test session {id}"))
}
