pub mod health;
pub mod integrations;
pub mod invites;
pub mod profiles;
pub mod projects;
pub mod rolodex;
pub mod threads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /profiles                                        create (POST)
/// /profiles/me                                     get, update (GET, PUT)
/// /profiles/trades                                 list trade profiles (GET)
///
/// /projects                                        list, create
/// /projects/{id}                                   get
/// /projects/{id}/attachments                       replace photos and files (PUT)
/// /projects/{id}/threads                           ensure + list threads (GET)
/// /projects/{id}/trades                            list, add trade (GET, POST)
///
/// /threads/direct                                  list, create direct threads
/// /threads/mine                                    trade's threads (GET)
/// /threads/{id}/messages                           list, send
/// /threads/{id}/read                               mark read (POST)
/// /threads/{id}/pin                                toggle pinned (POST)
/// /threads/{id}/archive                            toggle archived (POST)
/// /threads/{id}/move                               move direct thread (POST)
///
/// /rolodex                                         list, add (GET, POST)
///
/// /invites                                         list sent, create
/// /invites/{token}                                 preview (public)
/// /invites/{token}/accept                          accept (POST)
///
/// /integrations/companycam/sync                    sync all projects (POST)
/// /integrations/companycam/projects/{id}/photos/sync  sync photos (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/profiles", profiles::router())
        .nest("/projects", projects::router())
        .nest("/threads", threads::router())
        .nest("/rolodex", rolodex::router())
        .nest("/invites", invites::router())
        .nest("/integrations", integrations::router())
}
