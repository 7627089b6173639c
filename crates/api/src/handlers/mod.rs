pub mod companycam;
pub mod health;
pub mod invites;
pub mod profiles;
pub mod projects;
pub mod rolodex;
pub mod threads;

use serde::{Deserialize, Serialize};
use sitelink_core::cache::CacheStamp;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// `?include_archived=true` on thread listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListThreadsParams {
    #[serde(default)]
    pub include_archived: bool,
}

/// Serialize `value`, cache it under `key` unless a write to one of the
/// stamped tags happened since the stamp, and return the JSON.
pub(crate) async fn remember<T: Serialize>(
    state: &AppState,
    key: String,
    stamp: CacheStamp,
    value: &T,
) -> AppResult<serde_json::Value> {
    let json =
        serde_json::to_value(value).map_err(|e| AppError::InternalError(e.to_string()))?;
    state.cache_insert(key, json.clone(), stamp).await;
    Ok(json)
}
