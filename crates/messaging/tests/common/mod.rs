#![allow(dead_code)]

use sitelink_core::roles::ProfileRole;
use sitelink_core::types::DbId;
use sitelink_db::models::profile::{CreateProfile, Profile};
use sitelink_db::models::project::{CreateProject, Project};
use sitelink_db::{EntityStore, MemoryStore};

/// A GC, a trade and one project owned by the GC.
pub struct Fixture {
    pub store: MemoryStore,
    pub gc: Profile,
    pub trade: Profile,
    pub project: Project,
}

pub async fn create_profile(
    store: &dyn EntityStore,
    user_id: DbId,
    role: ProfileRole,
    company_name: &str,
) -> Profile {
    store
        .create_profile(&CreateProfile {
            user_id,
            role,
            company_name: company_name.to_string(),
            owner_name: format!("{company_name} owner"),
            email: None,
            phone: None,
            trade_category: (role == ProfileRole::Trade).then(|| "electrical".to_string()),
            trade_tags: Vec::new(),
        })
        .await
        .unwrap()
}

pub async fn create_project(store: &dyn EntityStore, owner_user_id: DbId, name: &str) -> Project {
    store
        .create_project(&CreateProject {
            name: name.to_string(),
            created_by: owner_user_id,
            status: None,
            project_type: None,
            budget: None,
            start_date: None,
            end_date: None,
            description: None,
        })
        .await
        .unwrap()
}

pub async fn fixture() -> Fixture {
    let store = MemoryStore::new();
    let gc = create_profile(&store, 100, ProfileRole::GeneralContractor, "Acme Builders").await;
    let trade = create_profile(&store, 200, ProfileRole::Trade, "Bright Sparks").await;
    let project = create_project(&store, gc.user_id, "Maple St remodel").await;
    Fixture {
        store,
        gc,
        trade,
        project,
    }
}
