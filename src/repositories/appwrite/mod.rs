use core::marker::PhantomData;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::{
    guess_mime, AccountRepository, BookmarkRepository, CategoryRepository, FileRepository, ListQuery,
    Listed, Order, PostMutation, PostRepository, PreviewOptions, ProfileMutation,
    ProfileRepository, RepositoryError, Result,
};
use crate::entities::{
    Account, Bookmark, BookmarkId, Category, CategoryId, FileId, Post, PostId, Provider,
    StoredFile, UserId, UserProfile,
};

mod client;
mod converters;
mod models;
mod type_convert;

pub use client::{ApiError, AppwriteClient};
use converters::{convert_repo_err, try_unique_check};
use models::{
    AccountModel, BookmarkModel, CategoryModel, CreateDocument, Document, DocumentList, FileModel,
    PostModel, ProfileModel,
};
use type_convert::to_queries;

/// typed access to one collection's documents.
pub struct AppwriteCollection<A> {
    client: Arc<AppwriteClient>,
    path: String,
    _model: PhantomData<fn() -> A>,
}

impl<A> AppwriteCollection<A>
where A: Serialize + DeserializeOwned + Send + Sync
{
    pub fn new(client: Arc<AppwriteClient>, database_id: &str, collection_id: &str) -> Self {
        Self {
            client,
            path: format!(
                "databases/{}/collections/{}/documents",
                database_id, collection_id
            ),
            _model: PhantomData,
        }
    }

    fn document_path(&self, id: &str) -> String { format!("{}/{}", self.path, id) }

    pub async fn create(&self, id: &str, data: &A) -> ::core::result::Result<Document<A>, ApiError> {
        let req = self
            .client
            .request(Method::POST, &self.path)?
            .json(&CreateDocument {
                document_id: id,
                data,
            });

        self.client.send(req).await
    }

    pub async fn get(&self, id: &str) -> ::core::result::Result<Document<A>, ApiError> {
        let req = self.client.request(Method::GET, &self.document_path(id))?;

        self.client.send(req).await
    }

    pub async fn update(&self, id: &str, data: Value) -> ::core::result::Result<Document<A>, ApiError> {
        let req = self
            .client
            .request(Method::PATCH, &self.document_path(id))?
            .json(&json!({ "data": data }));

        self.client.send(req).await
    }

    pub async fn delete(&self, id: &str) -> ::core::result::Result<(), ApiError> {
        let req = self.client.request(Method::DELETE, &self.document_path(id))?;

        self.client.send_empty(req).await
    }

    pub async fn list(
        &self,
        query: &ListQuery,
    ) -> ::core::result::Result<DocumentList<Document<A>>, ApiError> {
        let queries = to_queries(query)
            .into_iter()
            .map(|q| ("queries[]", q))
            .collect::<Vec<_>>();
        let req = self.client.request(Method::GET, &self.path)?.query(&queries);

        self.client.send(req).await
    }
}

fn listed<A, T>(list: DocumentList<Document<A>>) -> Listed<T>
where T: From<Document<A>> {
    let DocumentList { total, documents } = list;

    Listed {
        items: documents.into_iter().map(T::from).collect(),
        total,
    }
}

pub struct AppwriteAccountRepository {
    client: Arc<AppwriteClient>,
}

impl AppwriteAccountRepository {
    pub fn new_with(client: Arc<AppwriteClient>) -> Self { Self { client } }

    async fn account(&self, req: ::core::result::Result<reqwest::RequestBuilder, ApiError>) -> Result<Account> {
        let model: AccountModel = self
            .client
            .send(req.map_err(convert_repo_err)?)
            .await
            .map_err(convert_repo_err)?;

        Ok(model.into())
    }

    async fn empty(&self, req: ::core::result::Result<reqwest::RequestBuilder, ApiError>) -> Result<()> {
        let req = req.map_err(convert_repo_err)?;

        // some account endpoints answer with a body, some with 204
        self.client
            .send_empty(req)
            .await
            .map_err(convert_repo_err)
    }
}

#[async_trait]
impl AccountRepository for AppwriteAccountRepository {
    async fn create(&self, id: UserId, email: &str, password: &str, name: &str) -> Result<Account> {
        let req = self.client.request(Method::POST, "account").map(|r| {
            r.json(&json!({
                "userId": id.as_str(),
                "email": email,
                "password": password,
                "name": name
            }))
        });

        self.account(req).await
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<()> {
        let req = self
            .client
            .request(Method::POST, "account/sessions/email")
            .map(|r| r.json(&json!({ "email": email, "password": password })));

        self.empty(req).await
    }

    async fn current(&self) -> Result<Account> {
        self.account(self.client.request(Method::GET, "account")).await
    }

    async fn delete_sessions(&self) -> Result<()> {
        self.empty(self.client.request(Method::DELETE, "account/sessions"))
            .await
    }

    async fn create_verification(&self, url: &Url) -> Result<()> {
        let req = self
            .client
            .request(Method::POST, "account/verification")
            .map(|r| r.json(&json!({ "url": url.as_str() })));

        self.empty(req).await
    }

    async fn update_verification(&self, user_id: &UserId, secret: &str) -> Result<()> {
        let req = self
            .client
            .request(Method::PUT, "account/verification")
            .map(|r| r.json(&json!({ "userId": user_id.as_str(), "secret": secret })));

        self.empty(req).await
    }

    async fn create_recovery(&self, email: &str, url: &Url) -> Result<()> {
        let req = self
            .client
            .request(Method::POST, "account/recovery")
            .map(|r| r.json(&json!({ "email": email, "url": url.as_str() })));

        self.empty(req).await
    }

    async fn update_recovery(&self, user_id: &UserId, secret: &str, password: &str) -> Result<()> {
        let req = self
            .client
            .request(Method::PUT, "account/recovery")
            .map(|r| {
                r.json(&json!({
                    "userId": user_id.as_str(),
                    "secret": secret,
                    "password": password
                }))
            });

        self.empty(req).await
    }

    async fn update_name(&self, name: &str) -> Result<Account> {
        let req = self
            .client
            .request(Method::PATCH, "account/name")
            .map(|r| r.json(&json!({ "name": name })));

        self.account(req).await
    }

    async fn update_password(&self, password: &str, old_password: &str) -> Result<Account> {
        let req = self
            .client
            .request(Method::PATCH, "account/password")
            .map(|r| r.json(&json!({ "password": password, "oldPassword": old_password })));

        self.account(req).await
    }

    async fn block(&self) -> Result<()> {
        let req = self
            .client
            .request(Method::PATCH, "account/status")
            .map(|r| r.json(&json!({})));

        self.empty(req).await
    }

    fn oauth_url(&self, provider: &Provider, success: &Url, failure: &Url) -> Result<Url> {
        let mut url = self
            .client
            .url(&format!("account/sessions/oauth2/{}", provider))
            .map_err(convert_repo_err)?;
        url.query_pairs_mut()
            .append_pair("project", self.client.project_id())
            .append_pair("success", success.as_str())
            .append_pair("failure", failure.as_str());

        Ok(url)
    }
}

/// profile documents are keyed by the owner's user id.
pub struct AppwriteProfileRepository {
    coll: AppwriteCollection<ProfileModel>,
}

impl AppwriteProfileRepository {
    pub fn new_with(client: Arc<AppwriteClient>, database_id: &str, collection_id: &str) -> Self {
        Self {
            coll: AppwriteCollection::new(client, database_id, collection_id),
        }
    }
}

#[async_trait]
impl ProfileRepository for AppwriteProfileRepository {
    async fn insert(&self, item: UserProfile) -> Result<bool> {
        let model = ProfileModel::from(&item);

        try_unique_check(self.coll.create(item.user_id.as_str(), &model).await)
    }

    async fn find(&self, id: &UserId) -> Result<UserProfile> {
        let doc = self.coll.get(id.as_str()).await.map_err(convert_repo_err)?;

        Ok(doc.into())
    }

    async fn update(&self, id: &UserId, mutation: ProfileMutation) -> Result<UserProfile> {
        let doc = self
            .coll
            .update(id.as_str(), mutation.into())
            .await
            .map_err(convert_repo_err)?;

        Ok(doc.into())
    }

    async fn delete(&self, id: &UserId) -> Result<()> {
        self.coll.delete(id.as_str()).await.map_err(convert_repo_err)
    }
}

pub struct AppwritePostRepository {
    coll: AppwriteCollection<PostModel>,
}

impl AppwritePostRepository {
    pub fn new_with(client: Arc<AppwriteClient>, database_id: &str, collection_id: &str) -> Self {
        Self {
            coll: AppwriteCollection::new(client, database_id, collection_id),
        }
    }
}

#[async_trait]
impl PostRepository for AppwritePostRepository {
    async fn insert(&self, item: Post) -> Result<bool> {
        let model = PostModel::from(&item);

        try_unique_check(self.coll.create(item.id.as_str(), &model).await)
    }

    async fn find(&self, id: &PostId) -> Result<Post> {
        let doc = self.coll.get(id.as_str()).await.map_err(convert_repo_err)?;

        Ok(doc.into())
    }

    async fn finds(&self, query: ListQuery) -> Result<Listed<Post>> {
        let list = self.coll.list(&query).await.map_err(convert_repo_err)?;

        Ok(listed(list))
    }

    async fn update(&self, id: &PostId, mutation: PostMutation) -> Result<Post> {
        let doc = self
            .coll
            .update(id.as_str(), mutation.into())
            .await
            .map_err(convert_repo_err)?;

        Ok(doc.into())
    }

    async fn delete(&self, id: &PostId) -> Result<()> {
        self.coll.delete(id.as_str()).await.map_err(convert_repo_err)
    }
}

pub struct AppwriteBookmarkRepository {
    coll: AppwriteCollection<BookmarkModel>,
}

impl AppwriteBookmarkRepository {
    pub fn new_with(client: Arc<AppwriteClient>, database_id: &str, collection_id: &str) -> Self {
        Self {
            coll: AppwriteCollection::new(client, database_id, collection_id),
        }
    }
}

#[async_trait]
impl BookmarkRepository for AppwriteBookmarkRepository {
    async fn insert(&self, item: Bookmark) -> Result<bool> {
        let model = BookmarkModel::from(&item);

        try_unique_check(self.coll.create(item.id.as_str(), &model).await)
    }

    async fn finds(&self, query: ListQuery) -> Result<Listed<Bookmark>> {
        let list = self.coll.list(&query).await.map_err(convert_repo_err)?;

        Ok(listed(list))
    }

    async fn delete(&self, id: &BookmarkId) -> Result<()> {
        self.coll.delete(id.as_str()).await.map_err(convert_repo_err)
    }
}

pub struct AppwriteCategoryRepository {
    coll: AppwriteCollection<CategoryModel>,
}

impl AppwriteCategoryRepository {
    pub fn new_with(client: Arc<AppwriteClient>, database_id: &str, collection_id: &str) -> Self {
        Self {
            coll: AppwriteCollection::new(client, database_id, collection_id),
        }
    }
}

#[async_trait]
impl CategoryRepository for AppwriteCategoryRepository {
    async fn find(&self, id: &CategoryId) -> Result<Category> {
        let doc = self.coll.get(id.as_str()).await.map_err(convert_repo_err)?;

        Ok(doc.into())
    }

    async fn finds(&self, query: ListQuery) -> Result<Listed<Category>> {
        let query = match query.order.is_empty() {
            true => query.order(Order::Asc("name".to_string())),
            false => query,
        };
        let list = self.coll.list(&query).await.map_err(convert_repo_err)?;

        Ok(listed(list))
    }
}

pub struct AppwriteFileRepository {
    client: Arc<AppwriteClient>,
    path: String,
}

impl AppwriteFileRepository {
    pub fn new_with(client: Arc<AppwriteClient>, bucket_id: &str) -> Self {
        Self {
            client,
            path: format!("storage/buckets/{}/files", bucket_id),
        }
    }
}

#[async_trait]
impl FileRepository for AppwriteFileRepository {
    async fn upload(&self, id: FileId, name: &str, bytes: Vec<u8>) -> Result<StoredFile> {
        let part = Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(guess_mime(name))
            .map_err(|e| RepositoryError::Internal(anyhow!(e)))?;
        let form = Form::new().text("fileId", id.0).part("file", part);

        let req = self
            .client
            .request(Method::POST, &self.path)
            .map_err(convert_repo_err)?
            .multipart(form);
        let model: FileModel = self.client.send(req).await.map_err(convert_repo_err)?;

        Ok(model.into())
    }

    async fn delete(&self, id: &FileId) -> Result<()> {
        let req = self
            .client
            .request(Method::DELETE, &format!("{}/{}", self.path, id))
            .map_err(convert_repo_err)?;

        self.client.send_empty(req).await.map_err(convert_repo_err)
    }

    fn preview_url(&self, id: &FileId, options: &PreviewOptions) -> Result<Url> {
        let mut url = self
            .client
            .url(&format!("{}/{}/preview", self.path, id))
            .map_err(convert_repo_err)?;
        url.query_pairs_mut()
            .append_pair("project", self.client.project_id())
            .extend_pairs(options.to_pairs());

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Arc<AppwriteClient> {
        let endpoint = Url::parse("https://cloud.example.com/v1").unwrap();

        Arc::new(AppwriteClient::new(endpoint, "proj").unwrap())
    }

    #[test]
    fn preview_url_has_project_and_options() {
        let repo = AppwriteFileRepository::new_with(client(), "images");

        let url = repo
            .preview_url(&FileId::from("f1"), &PreviewOptions::card())
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://cloud.example.com/v1/storage/buckets/images/files/f1/preview\
             ?project=proj&width=800&height=450&gravity=center&quality=80&output=webp"
        );
    }

    #[test]
    fn oauth_url_points_back_to_frontend() {
        let repo = AppwriteAccountRepository::new_with(client());
        let ok = Url::parse("https://blog.example.com/auth/callback").unwrap();
        let ng = Url::parse("https://blog.example.com/sign-in").unwrap();

        let url = repo.oauth_url(&Provider::Google, &ok, &ng).unwrap();

        assert_eq!(url.path(), "/v1/account/sessions/oauth2/google");
        let pairs = url.query_pairs().into_owned().collect::<Vec<_>>();
        assert_eq!(pairs[0], ("project".to_string(), "proj".to_string()));
        assert_eq!(pairs[1].1, ok.as_str());
        assert_eq!(pairs[2].1, ng.as_str());
    }

    #[test]
    fn collection_paths_are_scoped_by_database() {
        let coll = AppwriteCollection::<PostModel>::new(client(), "blog", "posts");

        assert_eq!(coll.document_path("p1"), "databases/blog/collections/posts/documents/p1");
    }
}
