use std::{fmt, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};

use super::{SessionError, SessionStore};

/// Handle to the current browser's session, valid for one request.
///
/// Inserted into the request extensions by [`session_layer`]; extract it with
/// `Extension<Session>`.
///
/// [`session_layer`]: super::session_layer
#[derive(Clone)]
pub struct Session {
    id: String,
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(id: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Session {
            id: id.into(),
            store,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        match self.store.get(&self.id, key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn insert<T: Serialize>(&self, key: &str, value: &T) -> Result<(), SessionError> {
        let value = serde_json::to_value(value)?;
        self.store.insert(&self.id, key, value).await
    }

    pub async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.store.remove(&self.id, key).await.map(|_| ())
    }

    pub async fn clear(&self) -> Result<(), SessionError> {
        self.store.clear(&self.id).await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish_non_exhaustive()
    }
}
