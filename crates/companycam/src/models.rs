//! CompanyCam payloads.
//!
//! Only the fields SiteLink reads are typed. CompanyCam ids are strings and
//! timestamps are Unix seconds.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street_address_1: Option<String>,
    #[serde(default)]
    pub street_address_2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub photo_count: Option<i64>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// Body of `POST /projects` and `PUT /projects/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// Optional filters for `GET /projects`, sent as extra query parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectFilters {
    /// Free-text match on project name or address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Only projects changed at or after this Unix timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_since: Option<i64>,
}

/// One rendition of a photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoUri {
    #[serde(rename = "type")]
    pub kind: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub captured_at: Option<i64>,
    #[serde(default)]
    pub uris: Vec<PhotoUri>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /projects/{id}/photos`.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoUpload {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `PUT /photos/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PhotoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub display_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
}
