use core::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use tokio::sync::Mutex;

use super::{
    guess_mime, try_remove_target_from_vec, AccountRepository, BookmarkRepository, CategoryRepository,
    FileRepository, ListQuery, Listed, PostMutation, PostRepository, PreviewOptions,
    ProfileMutation, ProfileRepository, RepositoryError, Result,
};
use crate::entities::{
    Account, Bookmark, BookmarkId, Category, CategoryId, FileId, Post, PostId, Provider,
    StoredFile, UserId, UserProfile,
};

mod helpers;

use helpers::{apply_list, find_mut, find_ref};

pub struct InMemoryRepository<T>(Mutex<Vec<T>>);

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self { Self(Mutex::new(vec![])) }

    pub fn with(items: Vec<T>) -> Self { Self(Mutex::new(items)) }
}
impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository<UserProfile> {
    async fn insert(&self, item: UserProfile) -> Result<bool> {
        let mut guard = self.0.lock().await;

        match find_ref(&guard, |v| v.user_id == item.user_id) {
            Ok(_) => return Ok(false),
            Err(RepositoryError::NotFound) => (),
            Err(e) => return Err(e),
        }

        guard.push(item);
        Ok(true)
    }

    async fn find(&self, id: &UserId) -> Result<UserProfile> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |v| &v.user_id == id)?.clone())
    }

    async fn update(&self, id: &UserId, mutation: ProfileMutation) -> Result<UserProfile> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |v| &v.user_id == id)?;

        let ProfileMutation {
            username,
            full_name,
            email_verified,
            avatar_url,
        } = mutation;
        if let Some(val) = username {
            item.username = val;
        }
        if let Some(val) = full_name {
            item.full_name = val;
        }
        if let Some(val) = email_verified {
            item.email_verified = val;
        }
        if let Some(val) = avatar_url {
            item.avatar_url = val;
        }

        Ok(item.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<()> {
        let mut guard = self.0.lock().await;

        try_remove_target_from_vec(&mut guard, |v| &v.user_id == id)
            .map(|_| ())
            .map_err(|i| match i {
                0 => RepositoryError::NotFound,
                i => RepositoryError::NoUnique { matched: i as u32 },
            })
    }
}

#[async_trait]
impl PostRepository for InMemoryRepository<Post> {
    async fn insert(&self, item: Post) -> Result<bool> {
        let mut guard = self.0.lock().await;

        match find_ref(&guard, |v| v.id == item.id) {
            Ok(_) => return Ok(false),
            Err(RepositoryError::NotFound) => (),
            Err(e) => return Err(e),
        }

        guard.push(item);
        Ok(true)
    }

    async fn find(&self, id: &PostId) -> Result<Post> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |v| &v.id == id)?.clone())
    }

    async fn finds(&self, query: ListQuery) -> Result<Listed<Post>> {
        Ok(apply_list(&self.0.lock().await, &query))
    }

    async fn update(&self, id: &PostId, mutation: PostMutation) -> Result<Post> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |v| &v.id == id)?;

        let PostMutation {
            title,
            slug,
            content,
            featured_image,
            category,
            status,
        } = mutation;
        if let Some(val) = title {
            item.title = val;
        }
        if let Some(val) = slug {
            item.slug = val;
        }
        if let Some(val) = content {
            item.content = val;
        }
        if let Some(val) = featured_image {
            item.featured_image = val;
        }
        if let Some(val) = category {
            item.category = val;
        }
        if let Some(val) = status {
            item.status = val;
        }
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn delete(&self, id: &PostId) -> Result<()> {
        let mut guard = self.0.lock().await;

        try_remove_target_from_vec(&mut guard, |v| &v.id == id)
            .map(|_| ())
            .map_err(|i| match i {
                0 => RepositoryError::NotFound,
                i => RepositoryError::NoUnique { matched: i as u32 },
            })
    }
}

#[async_trait]
impl BookmarkRepository for InMemoryRepository<Bookmark> {
    async fn insert(&self, item: Bookmark) -> Result<bool> {
        let mut guard = self.0.lock().await;

        match find_ref(&guard, |v| v.id == item.id) {
            Ok(_) => return Ok(false),
            Err(RepositoryError::NotFound) => (),
            Err(e) => return Err(e),
        }

        // (user_id, post_id) is not a unique key here either
        guard.push(item);
        Ok(true)
    }

    async fn finds(&self, query: ListQuery) -> Result<Listed<Bookmark>> {
        Ok(apply_list(&self.0.lock().await, &query))
    }

    async fn delete(&self, id: &BookmarkId) -> Result<()> {
        let mut guard = self.0.lock().await;

        try_remove_target_from_vec(&mut guard, |v| &v.id == id)
            .map(|_| ())
            .map_err(|i| match i {
                0 => RepositoryError::NotFound,
                i => RepositoryError::NoUnique { matched: i as u32 },
            })
    }
}

#[async_trait]
impl CategoryRepository for InMemoryRepository<Category> {
    async fn find(&self, id: &CategoryId) -> Result<Category> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |v| &v.id == id)?.clone())
    }

    async fn finds(&self, query: ListQuery) -> Result<Listed<Category>> {
        Ok(apply_list(&self.0.lock().await, &query))
    }
}

pub struct InMemoryFileRepository {
    files: Mutex<Vec<StoredFile>>,
    base: Url,
    pub(crate) reject_deletes: AtomicBool,
}

impl InMemoryFileRepository {
    pub fn new(base: Url) -> Self {
        Self {
            files: Mutex::new(vec![]),
            base,
            reject_deletes: AtomicBool::new(false),
        }
    }

    pub async fn contains(&self, id: &FileId) -> bool {
        self.files.lock().await.iter().any(|f| &f.id == id)
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn upload(&self, id: FileId, name: &str, bytes: Vec<u8>) -> Result<StoredFile> {
        let mut guard = self.files.lock().await;

        if guard.iter().any(|f| f.id == id) {
            return Err(RepositoryError::Conflict);
        }

        let file = StoredFile {
            id,
            name: name.to_string(),
            mime_type: guess_mime(name).to_string(),
            size: bytes.len() as u64,
        };
        guard.push(file.clone());

        Ok(file)
    }

    async fn delete(&self, id: &FileId) -> Result<()> {
        if self.reject_deletes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Internal(anyhow!("storage unavailable")));
        }

        let mut guard = self.files.lock().await;

        try_remove_target_from_vec(&mut guard, |f| &f.id == id)
            .map(|_| ())
            .map_err(|_| RepositoryError::NotFound)
    }

    fn preview_url(&self, id: &FileId, options: &PreviewOptions) -> Result<Url> {
        let mut url = self
            .base
            .join(&format!("files/{}/preview", id))
            .map_err(|e| RepositoryError::Internal(anyhow!(e)))?;
        url.query_pairs_mut().extend_pairs(options.to_pairs());

        Ok(url)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MailKind {
    Verification,
    Recovery,
}

/// a mail the provider would have sent; the link carries `userId` and `secret`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mail {
    pub to: String,
    pub kind: MailKind,
    pub link: Url,
}

#[derive(Debug)]
struct StoredAccount {
    account: Account,
    password: String,
    blocked: bool,
    verification: Option<String>,
    recovery: Option<String>,
}

#[derive(Debug, Default)]
struct AccountState {
    accounts: Vec<StoredAccount>,
    session: Option<UserId>,
    outbox: Vec<Mail>,
}

pub struct InMemoryAccountRepository {
    state: Mutex<AccountState>,
    base: Url,
    pub(crate) unreachable: AtomicBool,
}

impl InMemoryAccountRepository {
    pub fn new(base: Url) -> Self {
        Self {
            state: Mutex::new(AccountState::default()),
            base,
            unreachable: AtomicBool::new(false),
        }
    }

    pub async fn outbox(&self) -> Vec<Mail> { self.state.lock().await.outbox.clone() }

    /// what the provider's redirect does: an account exists and a session is open.
    pub async fn accept_oauth(&self, email: &str, name: &str) -> UserId {
        let mut guard = self.state.lock().await;

        let id = match guard.accounts.iter().find(|a| a.account.email == email) {
            Some(a) => a.account.id.clone(),
            None => {
                let id = UserId::unique();
                guard.accounts.push(StoredAccount {
                    account: Account {
                        id: id.clone(),
                        name: name.to_string(),
                        email: email.to_string(),
                        email_verified: true,
                        registration: Utc::now(),
                    },
                    password: String::new(),
                    blocked: false,
                    verification: None,
                    recovery: None,
                });
                id
            },
        };

        guard.session = Some(id.clone());
        id
    }

    fn check_reachable(&self) -> Result<()> {
        match self.unreachable.load(Ordering::SeqCst) {
            true => Err(RepositoryError::Internal(anyhow!("network unreachable"))),
            false => Ok(()),
        }
    }
}

fn session_account<'a>(state: &'a mut AccountState) -> Result<&'a mut StoredAccount> {
    let id = state.session.clone().ok_or(RepositoryError::Unauthorized)?;

    find_mut(&mut state.accounts, |a| a.account.id == id)
}

fn secret_link(base: &Url, user_id: &UserId, secret: &str) -> Url {
    let mut link = base.clone();
    link.query_pairs_mut()
        .append_pair("userId", user_id.as_str())
        .append_pair("secret", secret);
    link
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, id: UserId, email: &str, password: &str, name: &str) -> Result<Account> {
        self.check_reachable()?;
        let mut guard = self.state.lock().await;

        if guard.accounts.iter().any(|a| a.account.email == email || a.account.id == id) {
            return Err(RepositoryError::Conflict);
        }
        if password.chars().count() < 8 {
            return Err(RepositoryError::Internal(anyhow!(
                "password must be at least 8 characters"
            )));
        }

        let account = Account {
            id,
            name: name.to_string(),
            email: email.to_string(),
            email_verified: false,
            registration: Utc::now(),
        };
        guard.accounts.push(StoredAccount {
            account: account.clone(),
            password: password.to_string(),
            blocked: false,
            verification: None,
            recovery: None,
        });

        Ok(account)
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<()> {
        self.check_reachable()?;
        let mut guard = self.state.lock().await;

        let id = guard
            .accounts
            .iter()
            .find(|a| a.account.email == email && a.password == password && !a.blocked)
            .map(|a| a.account.id.clone())
            .ok_or(RepositoryError::Unauthorized)?;
        guard.session = Some(id);

        Ok(())
    }

    async fn current(&self) -> Result<Account> {
        self.check_reachable()?;
        let mut guard = self.state.lock().await;

        Ok(session_account(&mut guard)?.account.clone())
    }

    async fn delete_sessions(&self) -> Result<()> {
        self.check_reachable()?;
        let mut guard = self.state.lock().await;

        match guard.session.take() {
            Some(_) => Ok(()),
            None => Err(RepositoryError::Unauthorized),
        }
    }

    async fn create_verification(&self, url: &Url) -> Result<()> {
        self.check_reachable()?;
        let mut guard = self.state.lock().await;

        let secret = ::uuid::Uuid::new_v4().simple().to_string();
        let stored = session_account(&mut guard)?;
        stored.verification = Some(secret.clone());

        let mail = Mail {
            to: stored.account.email.clone(),
            kind: MailKind::Verification,
            link: secret_link(url, &stored.account.id, &secret),
        };
        guard.outbox.push(mail);

        Ok(())
    }

    async fn update_verification(&self, user_id: &UserId, secret: &str) -> Result<()> {
        self.check_reachable()?;
        let mut guard = self.state.lock().await;
        let stored = find_mut(&mut guard.accounts, |a| &a.account.id == user_id)?;

        match stored.verification.as_deref() {
            Some(s) if s == secret => {
                stored.verification = None;
                stored.account.email_verified = true;
                Ok(())
            },
            _ => Err(RepositoryError::Unauthorized),
        }
    }

    async fn create_recovery(&self, email: &str, url: &Url) -> Result<()> {
        self.check_reachable()?;
        let mut guard = self.state.lock().await;

        let secret = ::uuid::Uuid::new_v4().simple().to_string();
        let stored = find_mut(&mut guard.accounts, |a| a.account.email == email)?;
        stored.recovery = Some(secret.clone());

        let mail = Mail {
            to: stored.account.email.clone(),
            kind: MailKind::Recovery,
            link: secret_link(url, &stored.account.id, &secret),
        };
        guard.outbox.push(mail);

        Ok(())
    }

    async fn update_recovery(&self, user_id: &UserId, secret: &str, password: &str) -> Result<()> {
        self.check_reachable()?;
        let mut guard = self.state.lock().await;
        let stored = find_mut(&mut guard.accounts, |a| &a.account.id == user_id)?;

        match stored.recovery.as_deref() {
            Some(s) if s == secret => {
                stored.recovery = None;
                stored.password = password.to_string();
                Ok(())
            },
            _ => Err(RepositoryError::Unauthorized),
        }
    }

    async fn update_name(&self, name: &str) -> Result<Account> {
        self.check_reachable()?;
        let mut guard = self.state.lock().await;
        let stored = session_account(&mut guard)?;

        stored.account.name = name.to_string();

        Ok(stored.account.clone())
    }

    async fn update_password(&self, password: &str, old_password: &str) -> Result<Account> {
        self.check_reachable()?;
        let mut guard = self.state.lock().await;
        let stored = session_account(&mut guard)?;

        if stored.password != old_password {
            return Err(RepositoryError::Unauthorized);
        }
        stored.password = password.to_string();

        Ok(stored.account.clone())
    }

    async fn block(&self) -> Result<()> {
        self.check_reachable()?;
        let mut guard = self.state.lock().await;

        session_account(&mut guard)?.blocked = true;
        guard.session = None;

        Ok(())
    }

    fn oauth_url(&self, provider: &Provider, success: &Url, failure: &Url) -> Result<Url> {
        let mut url = self
            .base
            .join(&format!("account/sessions/oauth2/{}", provider))
            .map_err(|e| RepositoryError::Internal(anyhow!(e)))?;
        url.query_pairs_mut()
            .append_pair("success", success.as_str())
            .append_pair("failure", failure.as_str());

        Ok(url)
    }
}
