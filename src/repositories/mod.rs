use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Url;
use serde_json::Value;

use crate::entities::{
    Account, Bookmark, BookmarkId, Category, CategoryId, FileId, Post, PostId, PostStatus,
    Provider, StoredFile, UserId, UserProfile,
};

pub(crate) mod appwrite;
pub(crate) mod mock;

type StdResult<T, E> = ::std::result::Result<T, E>;
pub type Result<T> = ::std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait AccountRepository {
    async fn create(&self, id: UserId, email: &str, password: &str, name: &str) -> Result<Account>;
    async fn create_session(&self, email: &str, password: &str) -> Result<()>;
    async fn current(&self) -> Result<Account>;
    async fn delete_sessions(&self) -> Result<()>;

    async fn create_verification(&self, url: &Url) -> Result<()>;
    async fn update_verification(&self, user_id: &UserId, secret: &str) -> Result<()>;

    async fn create_recovery(&self, email: &str, url: &Url) -> Result<()>;
    async fn update_recovery(&self, user_id: &UserId, secret: &str, password: &str) -> Result<()>;

    async fn update_name(&self, name: &str) -> Result<Account>;
    async fn update_password(&self, password: &str, old_password: &str) -> Result<Account>;
    async fn block(&self) -> Result<()>;

    fn oauth_url(&self, provider: &Provider, success: &Url, failure: &Url) -> Result<Url>;
}

#[async_trait]
pub trait ProfileRepository {
    async fn insert(&self, item: UserProfile) -> Result<bool>;
    async fn find(&self, id: &UserId) -> Result<UserProfile>;
    async fn update(&self, id: &UserId, mutation: ProfileMutation) -> Result<UserProfile>;
    async fn delete(&self, id: &UserId) -> Result<()>;
}

#[async_trait]
pub trait PostRepository {
    async fn insert(&self, item: Post) -> Result<bool>;
    async fn find(&self, id: &PostId) -> Result<Post>;
    async fn finds(&self, query: ListQuery) -> Result<Listed<Post>>;
    async fn update(&self, id: &PostId, mutation: PostMutation) -> Result<Post>;
    async fn delete(&self, id: &PostId) -> Result<()>;
}

#[async_trait]
pub trait BookmarkRepository {
    async fn insert(&self, item: Bookmark) -> Result<bool>;
    async fn finds(&self, query: ListQuery) -> Result<Listed<Bookmark>>;
    async fn delete(&self, id: &BookmarkId) -> Result<()>;
}

#[async_trait]
pub trait CategoryRepository {
    async fn find(&self, id: &CategoryId) -> Result<Category>;
    async fn finds(&self, query: ListQuery) -> Result<Listed<Category>>;
}

#[async_trait]
pub trait FileRepository {
    async fn upload(&self, id: FileId, name: &str, bytes: Vec<u8>) -> Result<StoredFile>;
    async fn delete(&self, id: &FileId) -> Result<()>;

    fn preview_url(&self, id: &FileId, options: &PreviewOptions) -> Result<Url>;
}

/// one page of documents plus the backend's total count.
#[derive(Debug, Clone, PartialEq)]
pub struct Listed<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// predicate handed to the document store as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equal(String, Vec<Value>),
    NotEqual(String, Vec<Value>),
    Contains(String, Vec<Value>),
    Search(String, String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Filter::Equal(attribute.to_string(), vec![value.into()])
    }

    pub fn search(attribute: &str, term: &str) -> Self {
        Filter::Search(attribute.to_string(), term.to_string())
    }

    pub(crate) fn matches(&self, item: &impl Attributes) -> bool {
        match self {
            Filter::Equal(name, values) =>
                item.attribute(name).map(|v| values.contains(&v)).unwrap_or(false),
            Filter::NotEqual(name, values) =>
                item.attribute(name).map(|v| !values.contains(&v)).unwrap_or(true),
            Filter::Contains(name, values) => match item.attribute(name) {
                Some(Value::String(s)) => values
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|needle| s.contains(needle)),
                Some(Value::Array(a)) => values.iter().any(|v| a.contains(v)),
                _ => false,
            },
            Filter::Search(name, term) => match item.attribute(name) {
                Some(Value::String(s)) => {
                    let haystack = s.to_lowercase();
                    term.split_whitespace()
                        .any(|w| haystack.contains(&w.to_lowercase()))
                },
                _ => false,
            },
            Filter::And(fs) => fs.iter().all(|f| f.matches(item)),
            Filter::Or(fs) => fs.iter().any(|f| f.matches(item)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    Asc(String),
    Desc(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListQuery {
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// field lookup by the attribute names the document store uses.
pub(crate) trait Attributes {
    fn attribute(&self, name: &str) -> Option<Value>;
}

impl Attributes for Post {
    fn attribute(&self, name: &str) -> Option<Value> {
        let v: Value = match name {
            "$id" => self.id.as_str().into(),
            "$createdAt" => self.created_at.to_rfc3339_opts(SecondsFormat::Millis, false).into(),
            "$updatedAt" => self.updated_at.to_rfc3339_opts(SecondsFormat::Millis, false).into(),
            "title" => self.title.as_str().into(),
            "slug" => self.slug.as_str().into(),
            "content" => self.content.as_str().into(),
            "featuredImage" => self.featured_image.as_ref()?.as_str().into(),
            "category" => self.category.as_ref()?.as_str().into(),
            "status" => self.status.as_str().into(),
            "userId" => self.user_id.as_str().into(),
            _ => return None,
        };

        Some(v)
    }
}

impl Attributes for Bookmark {
    fn attribute(&self, name: &str) -> Option<Value> {
        let v: Value = match name {
            "$id" => self.id.as_str().into(),
            "$createdAt" | "createdAt" => self.created_at.to_rfc3339_opts(SecondsFormat::Millis, false).into(),
            "userId" => self.user_id.as_str().into(),
            "postId" => self.post_id.as_str().into(),
            _ => return None,
        };

        Some(v)
    }
}

impl Attributes for Category {
    fn attribute(&self, name: &str) -> Option<Value> {
        let v: Value = match name {
            "$id" => self.id.as_str().into(),
            "name" => self.name.as_str().into(),
            "slug" => self.slug.as_str().into(),
            _ => return None,
        };

        Some(v)
    }
}

#[derive(Debug)]
pub enum RepositoryError {
    NotFound,
    NoUnique { matched: u32 },
    Unauthorized,
    Conflict,
    Internal(anyhow::Error),
}

impl ::std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        match self {
            RepositoryError::NotFound => write!(f, "cannot find object."),
            RepositoryError::NoUnique { matched } => write!(
                f,
                "expected unique object, found non-unique objects (matched: {})",
                matched
            ),
            RepositoryError::Unauthorized => write!(f, "not permitted with current session."),
            RepositoryError::Conflict => write!(f, "object already exists."),
            RepositoryError::Internal(e) => write!(f, "internal error: {}", e),
        }
    }
}

impl ::std::error::Error for RepositoryError {}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileMutation {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email_verified: Option<bool>,
    pub avatar_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostMutation {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<Option<FileId>>,
    pub category: Option<Option<CategoryId>>,
    pub status: Option<PostStatus>,
}

impl PostMutation {
    pub fn is_empty(&self) -> bool { self == &Self::default() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    Center,
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Gravity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gravity::Center => "center",
            Gravity::TopLeft => "top-left",
            Gravity::Top => "top",
            Gravity::TopRight => "top-right",
            Gravity::Left => "left",
            Gravity::Right => "right",
            Gravity::BottomLeft => "bottom-left",
            Gravity::Bottom => "bottom",
            Gravity::BottomRight => "bottom-right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpg,
    Png,
    Webp,
    Gif,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
            ImageFormat::Gif => "gif",
        }
    }
}

/// resize / crop / compression applied by the storage service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub gravity: Option<Gravity>,
    /// 0..=100
    pub quality: Option<u8>,
    pub output: Option<ImageFormat>,
}

impl PreviewOptions {
    /// what post cards ask for.
    pub fn card() -> Self {
        Self {
            width: Some(800),
            height: Some(450),
            gravity: Some(Gravity::Center),
            quality: Some(80),
            output: Some(ImageFormat::Webp),
        }
    }

    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut v = vec![];

        if let Some(n) = self.width {
            v.push(("width", n.to_string()));
        }
        if let Some(n) = self.height {
            v.push(("height", n.to_string()));
        }
        if let Some(g) = self.gravity {
            v.push(("gravity", g.as_str().to_string()));
        }
        if let Some(q) = self.quality {
            v.push(("quality", q.min(100).to_string()));
        }
        if let Some(o) = self.output {
            v.push(("output", o.as_str().to_string()));
        }

        v
    }
}

pub(crate) fn try_remove_target_from_vec<T>(
    vec: &mut Vec<T>,
    is_target: impl Fn(&T) -> bool,
) -> StdResult<T, usize> {
    let mut indexes: Vec<_> = vec
        .iter()
        .enumerate()
        .filter_map(|(i, v)| match is_target(v) {
            true => Some(i),
            false => None,
        })
        .collect();

    match indexes.len() {
        1 => Ok(vec.remove(indexes.remove(0))),
        _ => Err(indexes.len()),
    }
}

/// content type sent with an upload, from the file extension.
pub(crate) fn guess_mime(name: &str) -> &'static str {
    match name.rsplit('.').next().map(|s| s.to_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn post(title: &str, user: &str) -> Post {
        Post {
            id: PostId::unique(),
            title: title.to_string(),
            slug: crate::utils::slugify(title),
            content: "<p>body</p>".to_string(),
            featured_image: None,
            category: Some("rust".into()),
            status: PostStatus::Active,
            user_id: user.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(guess_mime("cover.PNG"), "image/png");
        assert_eq!(guess_mime("a.b.jpeg"), "image/jpeg");
        assert_eq!(guess_mime("notes"), "application/octet-stream");
    }

    #[test]
    fn equal_and_or_compose() {
        let p = post("Ownership explained", "ada");

        assert!(Filter::equal("userId", "ada").matches(&p));
        assert!(!Filter::equal("userId", "bob").matches(&p));
        assert!(Filter::And(vec![
            Filter::equal("status", "active"),
            Filter::equal("category", "rust"),
        ])
        .matches(&p));
        assert!(Filter::Or(vec![
            Filter::equal("userId", "bob"),
            Filter::equal("category", "rust"),
        ])
        .matches(&p));
    }

    #[test]
    fn search_is_case_insensitive_per_word() {
        let p = post("Ownership explained", "ada");

        assert!(Filter::search("title", "OWNERSHIP").matches(&p));
        assert!(Filter::search("title", "lifetimes explained").matches(&p));
        assert!(!Filter::search("title", "borrowck").matches(&p));
    }

    #[test]
    fn missing_optional_attribute_never_equals() {
        let mut p = post("t", "ada");
        p.category = None;

        assert!(!Filter::equal("category", "rust").matches(&p));
        assert!(Filter::NotEqual("category".to_string(), vec![json!("rust")]).matches(&p));
    }

    #[test]
    fn quality_is_clamped() {
        let opt = PreviewOptions {
            quality: Some(250),
            ..Default::default()
        };

        assert_eq!(opt.to_pairs(), vec![("quality", "100".to_string())]);
    }

    #[test]
    fn removes_only_unique_target() {
        let mut v = vec![1, 2, 2, 3];

        assert_eq!(try_remove_target_from_vec(&mut v, |n| *n == 3), Ok(3));
        assert_eq!(try_remove_target_from_vec(&mut v, |n| *n == 2), Err(2));
        assert_eq!(try_remove_target_from_vec(&mut v, |n| *n == 9), Err(0));
    }
}
