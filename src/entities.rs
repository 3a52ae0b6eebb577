use core::fmt;

use serde::{Deserialize, Serialize};

pub type Date = ::chrono::DateTime<::chrono::Utc>;

macro_rules! id {
    ($($n:ident),* $(,)?) => {$(
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $n(pub String);

        impl $n {
            /// same shape as the backend's `ID.unique()`.
            pub fn unique() -> Self { Self(::uuid::Uuid::new_v4().simple().to_string()) }

            pub fn as_str(&self) -> &str { self.0.as_str() }
        }

        impl fmt::Display for $n {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl From<&str> for $n {
            fn from(s: &str) -> Self { Self(s.to_string()) }
        }

        impl From<String> for $n {
            fn from(s: String) -> Self { Self(s) }
        }

        impl ::core::str::FromStr for $n {
            type Err = ::core::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self(s.to_string())) }
        }
    )*};
}

id!(UserId, PostId, BookmarkId, FileId, CategoryId);

/// what the auth provider knows about the signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub registration: Date,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub email_verified: bool,
    pub avatar_url: Option<String>,
    pub provider: Provider,
    pub created_at: Date,
}

impl UserProfile {
    /// a profile built from the account alone.
    pub fn from_account(account: &Account, username: String, provider: Provider) -> Self {
        Self {
            user_id: account.id.clone(),
            username,
            full_name: account.name.clone(),
            email: account.email.clone(),
            email_verified: account.email_verified,
            avatar_url: None,
            provider,
            created_at: account.registration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Provider {
    Email,
    Google,
    Facebook,
    Github,
    Other(String),
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Provider::Email => "email",
            Provider::Google => "google",
            Provider::Facebook => "facebook",
            Provider::Github => "github",
            Provider::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl ::core::str::FromStr for Provider {
    type Err = ::core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "" | "email" => Provider::Email,
            "google" => Provider::Google,
            "facebook" => Provider::Facebook,
            "github" => Provider::Github,
            other => Provider::Other(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    /// HTML body produced by the editor.
    pub content: String,
    pub featured_image: Option<FileId>,
    pub category: Option<CategoryId>,
    pub status: PostStatus,
    pub user_id: UserId,
    pub created_at: Date,
    pub updated_at: Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Active,
    Inactive,
}

impl Default for PostStatus {
    fn default() -> Self { PostStatus::Active }
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Active => "active",
            PostStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl ::core::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PostStatus::Active),
            "inactive" => Ok(PostStatus::Inactive),
            s => Err(format!("unknown post status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub user_id: UserId,
    pub post_id: PostId,
    pub created_at: Date,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// an uploaded object in the bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub id: FileId,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}
