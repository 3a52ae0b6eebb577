use serde::{Deserialize, Serialize};

use crate::entities::{Date, PostStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList<T> {
    pub total: u64,
    pub documents: Vec<T>,
}

/// system fields around a collection's own attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct Document<A> {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: Date,
    #[serde(rename = "$updatedAt")]
    pub updated_at: Date,
    #[serde(flatten)]
    pub data: A,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocument<'a, A> {
    pub document_id: &'a str,
    pub data: &'a A,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostModel {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub category: Option<String>,
    pub status: PostStatus,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkModel {
    pub user_id: String,
    pub post_id: String,
    pub created_at: Date,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileModel {
    pub user_id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub email_verified: bool,
    pub avatar_url: Option<String>,
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryModel {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountModel {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "emailVerification")]
    pub email_verification: bool,
    pub registration: Date,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileModel {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size_original: u64,
}
