use std::sync::Arc;

use anyhow::{anyhow, Result};
use reqwest::Url;

use crate::config::Config;
use crate::controllers::{AccountUsecases, ContentUsecases, Controller};
use crate::entities::{Bookmark, Category, Post, UserProfile};
use crate::interactors::account::*;
use crate::interactors::bookmark::*;
use crate::interactors::category::*;
use crate::interactors::media::*;
use crate::interactors::post::*;
use crate::interactors::profile::*;
use crate::repositories::appwrite::{
    AppwriteAccountRepository, AppwriteBookmarkRepository, AppwriteCategoryRepository,
    AppwriteClient, AppwriteFileRepository, AppwritePostRepository, AppwriteProfileRepository,
};
use crate::repositories::mock::{
    InMemoryAccountRepository, InMemoryFileRepository, InMemoryRepository,
};
use crate::repositories::{
    AccountRepository, BookmarkRepository, CategoryRepository, FileRepository, PostRepository,
    ProfileRepository,
};
use crate::session::SessionStore;
use crate::utils::LetChain;

struct Repositories {
    accounts: Arc<dyn AccountRepository + Sync + Send>,
    profiles: Arc<dyn ProfileRepository + Sync + Send>,
    posts: Arc<dyn PostRepository + Sync + Send>,
    bookmarks: Arc<dyn BookmarkRepository + Sync + Send>,
    categories: Arc<dyn CategoryRepository + Sync + Send>,
    files: Arc<dyn FileRepository + Sync + Send>,
}

/// everything kept in this process; links in "sent" mails point at `config.frontend_url`.
pub fn in_memory(config: Config) -> Controller { in_memory_with_accounts(config).0 }

pub(crate) fn in_memory_with_accounts(
    config: Config,
) -> (Controller, Arc<InMemoryAccountRepository>) {
    let accounts = Arc::new(InMemoryAccountRepository::new(config.endpoint.clone()));

    let files_base = format!(
        "{}/storage/buckets/{}/",
        config.endpoint.as_str().trim_end_matches('/'),
        config.bucket_id
    );
    let files = match Url::parse(&files_base) {
        Ok(base) => InMemoryFileRepository::new(base),
        Err(_) => InMemoryFileRepository::new(config.endpoint.clone()),
    };

    let repos = Repositories {
        accounts: accounts.clone(),
        profiles: Arc::new(InMemoryRepository::<UserProfile>::new()),
        posts: Arc::new(InMemoryRepository::<Post>::new()),
        bookmarks: Arc::new(InMemoryRepository::<Bookmark>::new()),
        categories: Arc::new(InMemoryRepository::<Category>::new()),
        files: Arc::new(files),
    };

    (controller(repos, config), accounts)
}

pub fn appwrite(config: Config) -> Result<Controller> {
    let client = AppwriteClient::new(config.endpoint.clone(), config.project_id.clone())
        .map_err(|e| anyhow!("cannot build http client: {}", e))?
        .let_(Arc::new);
    let db = config.database_id.as_str();

    let repos = Repositories {
        accounts: Arc::new(AppwriteAccountRepository::new_with(client.clone())),
        profiles: Arc::new(AppwriteProfileRepository::new_with(
            client.clone(),
            db,
            &config.profile_collection_id,
        )),
        posts: Arc::new(AppwritePostRepository::new_with(
            client.clone(),
            db,
            &config.post_collection_id,
        )),
        bookmarks: Arc::new(AppwriteBookmarkRepository::new_with(
            client.clone(),
            db,
            &config.bookmark_collection_id,
        )),
        categories: Arc::new(AppwriteCategoryRepository::new_with(
            client.clone(),
            db,
            &config.category_collection_id,
        )),
        files: Arc::new(AppwriteFileRepository::new_with(client, &config.bucket_id)),
    };

    Ok(controller(repos, config))
}

fn controller(r: Repositories, config: Config) -> Controller {
    let Repositories {
        accounts,
        profiles,
        posts,
        bookmarks,
        categories,
        files,
    } = r;
    let session = Arc::new(SessionStore::new());
    let config = Arc::new(config);

    let account = AccountUsecases {
        sign_up: Arc::new(AccountSignUpInteractor {
            account_repository: accounts.clone(),
            profile_repository: profiles.clone(),
            session: session.clone(),
            config: config.clone(),
        }),
        sign_in: Arc::new(AccountSignInInteractor {
            account_repository: accounts.clone(),
            profile_repository: profiles.clone(),
            session: session.clone(),
        }),
        sign_out: Arc::new(AccountSignOutInteractor {
            account_repository: accounts.clone(),
            session: session.clone(),
        }),
        check: Arc::new(AccountCheckInteractor {
            account_repository: accounts.clone(),
            profile_repository: profiles.clone(),
            session: session.clone(),
        }),
        request_verification: Arc::new(AccountRequestVerificationInteractor {
            account_repository: accounts.clone(),
            config: config.clone(),
        }),
        complete_verification: Arc::new(AccountCompleteVerificationInteractor {
            account_repository: accounts.clone(),
            profile_repository: profiles.clone(),
            session: session.clone(),
        }),
        request_recovery: Arc::new(AccountRequestRecoveryInteractor {
            account_repository: accounts.clone(),
            config: config.clone(),
        }),
        reset_password: Arc::new(AccountResetPasswordInteractor {
            account_repository: accounts.clone(),
        }),
        change_password: Arc::new(AccountChangePasswordInteractor {
            account_repository: accounts.clone(),
        }),
        update_name: Arc::new(AccountUpdateNameInteractor {
            account_repository: accounts.clone(),
            profile_repository: profiles.clone(),
            session: session.clone(),
        }),
        deactivate: Arc::new(AccountDeactivateInteractor {
            account_repository: accounts.clone(),
            session: session.clone(),
        }),
        oauth_url: Arc::new(AccountOAuthUrlInteractor {
            account_repository: accounts.clone(),
            config,
        }),
        complete_oauth: Arc::new(AccountCompleteOAuthInteractor {
            account_repository: accounts,
            profile_repository: profiles.clone(),
            session: session.clone(),
        }),
    };

    let content = ContentUsecases {
        post_get: Arc::new(PostGetInteractor {
            post_repository: posts.clone(),
            file_repository: files.clone(),
        }),
        post_create: Arc::new(PostCreateInteractor {
            post_repository: posts.clone(),
            file_repository: files.clone(),
            session: session.clone(),
        }),
        post_edit: Arc::new(PostEditInteractor {
            post_repository: posts.clone(),
            file_repository: files.clone(),
            session: session.clone(),
        }),
        post_delete: Arc::new(PostDeleteInteractor {
            post_repository: posts.clone(),
            file_repository: files.clone(),
            session: session.clone(),
        }),
        post_gets: Arc::new(PostGetsInteractor {
            post_repository: posts.clone(),
        }),

        bookmark_status: Arc::new(BookmarkStatusInteractor {
            bookmark_repository: bookmarks.clone(),
            session: session.clone(),
        }),
        bookmark_toggle: Arc::new(BookmarkToggleInteractor {
            bookmark_repository: bookmarks.clone(),
            post_repository: posts.clone(),
            session: session.clone(),
        }),
        bookmark_gets: Arc::new(BookmarkGetsInteractor {
            bookmark_repository: bookmarks.clone(),
            session: session.clone(),
        }),
        bookmark_posts: Arc::new(BookmarkPostsInteractor {
            bookmark_repository: bookmarks.clone(),
            post_repository: posts.clone(),
            session: session.clone(),
        }),

        profile_get: Arc::new(ProfileGetInteractor {
            profile_repository: profiles.clone(),
            session: session.clone(),
        }),
        profile_author: Arc::new(ProfileAuthorInteractor {
            profile_repository: profiles,
            post_repository: posts,
            bookmark_repository: bookmarks,
        }),

        category_gets: Arc::new(CategoryGetsInteractor {
            category_repository: categories,
        }),

        media_upload: Arc::new(MediaUploadInteractor {
            file_repository: files.clone(),
            session: session.clone(),
        }),
        media_preview: Arc::new(MediaPreviewInteractor {
            file_repository: files.clone(),
        }),
        media_delete: Arc::new(MediaDeleteInteractor {
            file_repository: files,
            session: session.clone(),
        }),
    };

    Controller {
        account,
        content,
        session,
    }
}
