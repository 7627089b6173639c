//! Draining paginated CompanyCam listings.

use std::future::Future;

use serde::Serialize;

use crate::api::{CompanyCamApi, CompanyCamError};
use crate::models::{Photo, Project, ProjectFilters};

/// Page size used by the sync operations.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Reported after every fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncProgress {
    /// 1-based number of the page just fetched.
    pub page: u32,
    /// Items on that page.
    pub page_items: usize,
    /// Items fetched so far, this page included.
    pub total_items: usize,
}

/// Fetch pages starting at 1 until a page shorter than `per_page` arrives.
///
/// `on_progress` runs after each page. Any error aborts the drain and the
/// items accumulated so far are dropped.
pub async fn drain_pages<T, F, Fut>(
    per_page: u32,
    mut fetch_page: F,
    mut on_progress: impl FnMut(SyncProgress),
) -> Result<Vec<T>, CompanyCamError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, CompanyCamError>>,
{
    let per_page = per_page.max(1);
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let batch = fetch_page(page).await?;
        let page_items = batch.len();
        items.extend(batch);
        on_progress(SyncProgress {
            page,
            page_items,
            total_items: items.len(),
        });
        if page_items < per_page as usize {
            break;
        }
        page += 1;
    }
    Ok(items)
}

impl CompanyCamApi {
    /// Fetch every project in the account.
    pub async fn sync_all_projects(
        &self,
        on_progress: impl FnMut(SyncProgress),
    ) -> Result<Vec<Project>, CompanyCamError> {
        self.sync_projects_matching(&ProjectFilters::default(), on_progress)
            .await
    }

    /// Fetch every project matching `filters`.
    pub async fn sync_projects_matching(
        &self,
        filters: &ProjectFilters,
        on_progress: impl FnMut(SyncProgress),
    ) -> Result<Vec<Project>, CompanyCamError> {
        let projects = drain_pages(
            DEFAULT_PER_PAGE,
            move |page| self.list_projects(page, DEFAULT_PER_PAGE, filters),
            on_progress,
        )
        .await?;
        tracing::info!(count = projects.len(), "Synced CompanyCam projects");
        Ok(projects)
    }

    /// Fetch every photo of one project.
    pub async fn sync_project_photos(
        &self,
        project_id: &str,
        on_progress: impl FnMut(SyncProgress),
    ) -> Result<Vec<Photo>, CompanyCamError> {
        let photos = drain_pages(
            DEFAULT_PER_PAGE,
            move |page| self.list_project_photos(project_id, page, DEFAULT_PER_PAGE),
            on_progress,
        )
        .await?;
        tracing::info!(project_id, count = photos.len(), "Synced CompanyCam photos");
        Ok(photos)
    }
}
