pub mod account;
pub mod content;
pub mod shell;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};

use crate::cmds::{
    AccountMod, BookmarkMod, MediaMod, PostCreateCmd, PostEditCmd, PostMod, ProfileMod, RootMod,
    VerifyOp,
};
use crate::routes::{guard, Decision, Route};
use crate::session::{GuardState, SessionStore};
use crate::usecases::{self, bookmark, category, media, post, profile, Upload};
use crate::views;

pub struct AccountUsecases {
    pub sign_up: Arc<dyn usecases::account::sign_up::Usecase + Sync + Send>,
    pub sign_in: Arc<dyn usecases::account::sign_in::Usecase + Sync + Send>,
    pub sign_out: Arc<dyn usecases::account::sign_out::Usecase + Sync + Send>,
    pub check: Arc<dyn usecases::account::check::Usecase + Sync + Send>,
    pub request_verification: Arc<dyn usecases::account::request_verification::Usecase + Sync + Send>,
    pub complete_verification: Arc<dyn usecases::account::complete_verification::Usecase + Sync + Send>,
    pub request_recovery: Arc<dyn usecases::account::request_recovery::Usecase + Sync + Send>,
    pub reset_password: Arc<dyn usecases::account::reset_password::Usecase + Sync + Send>,
    pub change_password: Arc<dyn usecases::account::change_password::Usecase + Sync + Send>,
    pub update_name: Arc<dyn usecases::account::update_name::Usecase + Sync + Send>,
    pub deactivate: Arc<dyn usecases::account::deactivate::Usecase + Sync + Send>,
    pub oauth_url: Arc<dyn usecases::account::oauth_url::Usecase + Sync + Send>,
    pub complete_oauth: Arc<dyn usecases::account::complete_oauth::Usecase + Sync + Send>,
}

pub struct ContentUsecases {
    pub post_get: Arc<dyn post::get::Usecase + Sync + Send>,
    pub post_create: Arc<dyn post::create::Usecase + Sync + Send>,
    pub post_edit: Arc<dyn post::edit::Usecase + Sync + Send>,
    pub post_delete: Arc<dyn post::delete::Usecase + Sync + Send>,
    pub post_gets: Arc<dyn post::gets::Usecase + Sync + Send>,

    pub bookmark_status: Arc<dyn bookmark::status::Usecase + Sync + Send>,
    pub bookmark_toggle: Arc<dyn bookmark::toggle::Usecase + Sync + Send>,
    pub bookmark_gets: Arc<dyn bookmark::gets::Usecase + Sync + Send>,
    pub bookmark_posts: Arc<dyn bookmark::posts::Usecase + Sync + Send>,

    pub profile_get: Arc<dyn profile::get::Usecase + Sync + Send>,
    pub profile_author: Arc<dyn profile::author::Usecase + Sync + Send>,

    pub category_gets: Arc<dyn category::gets::Usecase + Sync + Send>,

    pub media_upload: Arc<dyn media::upload::Usecase + Sync + Send>,
    pub media_preview: Arc<dyn media::preview::Usecase + Sync + Send>,
    pub media_delete: Arc<dyn media::delete::Usecase + Sync + Send>,
}

/// turns commands into use case calls, behind the same guard the frontend routes use.
pub struct Controller {
    pub account: AccountUsecases,
    pub content: ContentUsecases,
    pub session: Arc<SessionStore>,
}

/// receives rendered views as they are produced.
pub type Emit<'a> = &'a mut (dyn FnMut(String) + Send);

impl Controller {
    pub async fn handle(&self, cmd: RootMod, emit: Emit<'_>) -> Result<()> {
        self.ensure_checked().await;

        if let RootMod::Open { path } = &cmd {
            let route = Route::parse(path);
            let decision = guard(self.session.guard_state(), &route);
            emit(views::decision(&route, &decision));

            return Ok(());
        }

        if let Some(route) = route_of(&cmd) {
            self.authorize(&route)?;
        }

        match cmd {
            RootMod::Account { cmd } => self.account(cmd, emit).await,
            RootMod::Post { cmd } => self.post(cmd, emit).await,
            RootMod::Bookmark { cmd } => self.bookmark(cmd, emit).await,
            RootMod::Profile { cmd } => self.profile(cmd, emit).await,
            RootMod::Media { cmd } => self.media(cmd, emit).await,
            RootMod::Categories => self.categories(emit).await,
            RootMod::Open { .. } => Ok(()),
        }
    }

    /// the first command of a process resolves the session, as mounting the app does.
    async fn ensure_checked(&self) {
        if self.session.guard_state() != GuardState::Unknown {
            return;
        }

        if let Err(e) = self
            .account
            .check
            .handle(usecases::account::check::Input {})
            .await
        {
            tracing::debug!("session check failed: {}", e);
        }
    }

    fn authorize(&self, route: &Route) -> Result<()> {
        match guard(self.session.guard_state(), route) {
            Decision::Render => Ok(()),
            Decision::Redirect(to) => bail!("cannot open {}: redirected to {}", route, to),
            Decision::Loading => bail!("session is still being checked. try again."),
        }
    }
}

/// the frontend page a command belongs to; `None` for commands no page gates.
fn route_of(cmd: &RootMod) -> Option<Route> {
    let route = match cmd {
        RootMod::Account { cmd } => match cmd {
            AccountMod::SignUp { .. } => Route::SignUp,
            AccountMod::SignIn { .. } | AccountMod::OauthUrl { .. } => Route::SignIn,
            AccountMod::SignOut | AccountMod::Check => return None,
            AccountMod::Verify { op } => match op {
                VerifyOp::Request => Route::VerifyEmail,
                VerifyOp::Complete { user_id, secret } => Route::VerifyEmailVerify {
                    user_id: user_id.clone(),
                    secret: secret.clone(),
                },
            },
            AccountMod::Recover { .. } => Route::ForgotPassword,
            AccountMod::Reset {
                user_id, secret, ..
            } => Route::ResetPassword {
                user_id: user_id.clone(),
                secret: secret.clone(),
            },
            AccountMod::ChangePassword { .. } => Route::ChangePassword,
            AccountMod::Rename { .. } | AccountMod::Deactivate => Route::Profile,
            AccountMod::OauthCallback { .. } => Route::AuthCallback,
        },

        RootMod::Post { cmd } => match cmd {
            PostMod::Get { post_id } => Route::Post(post_id.clone()),
            PostMod::Create(PostCreateCmd { .. }) => Route::CreatePost,
            PostMod::Edit(PostEditCmd { post_id, .. }) | PostMod::Delete { post_id } =>
                Route::EditPost(post_id.clone()),
            PostMod::List { .. } => Route::Home,
            PostMod::ByUser { user_id, .. } => Route::Author(user_id.clone()),
            PostMod::Search { term, .. } => Route::Search(term.clone()),
            PostMod::Category { category_id, .. } => Route::Category(category_id.clone()),
        },

        RootMod::Bookmark { cmd } => match cmd {
            BookmarkMod::Status { post_id } | BookmarkMod::Toggle { post_id } =>
                Route::Post(post_id.clone()),
            BookmarkMod::List { .. } | BookmarkMod::Posts { .. } => Route::Bookmarks,
        },

        RootMod::Profile { cmd } => match cmd {
            ProfileMod::Get { user_id: None } => Route::Profile,
            ProfileMod::Get { user_id: Some(u) } | ProfileMod::Author { user_id: u, .. } =>
                Route::Author(u.clone()),
        },

        RootMod::Media { cmd } => match cmd {
            MediaMod::Upload { .. } | MediaMod::Delete { .. } => Route::CreatePost,
            MediaMod::Preview { .. } => return None,
        },

        RootMod::Categories => Route::Home,
        RootMod::Open { .. } => return None,
    };

    Some(route)
}

async fn read_upload(path: &Path) -> Result<Upload> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("`{}` is not a file name.", path.display()))?
        .to_string();

    let bytes = ::tokio::fs::read(path)
        .await
        .map_err(|e| anyhow!("cannot read `{}`: {}", path.display(), e))?;

    Ok(Upload { name, bytes })
}


#[cfg(test)]
mod tests {
    use super::testing::run;
    use super::*;
    use crate::constructors::in_memory;

    #[test]
    fn commands_map_to_their_pages() {
        use super::testing::line;

        assert_eq!(route_of(&line("post create --title t --content c")), Some(Route::CreatePost));
        assert_eq!(route_of(&line("post get p1")), Some(Route::Post("p1".into())));
        assert_eq!(route_of(&line("bookmark posts")), Some(Route::Bookmarks));
        assert_eq!(route_of(&line("profile get")), Some(Route::Profile));
        assert_eq!(route_of(&line("profile get u1")), Some(Route::Author("u1".into())));
        assert_eq!(route_of(&line("account sign-out")), None);
    }

    #[tokio::test]
    async fn private_command_redirects_signed_out_user() {
        let c = in_memory(crate::config::test_config());

        let e = run(&c, "post create --title Hello --content '<p>hi</p>'")
            .await
            .unwrap_err();

        assert_eq!(e, "cannot open /create-post: redirected to /sign-in");
        assert_eq!(c.session.guard_state(), GuardState::Unauthenticated);
    }

    #[tokio::test]
    async fn open_shows_decision() {
        let c = in_memory(crate::config::test_config());

        let out = run(&c, "open /bookmarks").await.unwrap();
        assert_eq!(out, vec!["/bookmarks -> redirect to /sign-in".to_string()]);

        let out = run(&c, "open '/search?q=rust'").await.unwrap();
        assert_eq!(out, vec!["/search?q=rust -> render".to_string()]);
    }
}
