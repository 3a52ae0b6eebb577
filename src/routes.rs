use core::fmt;

use reqwest::Url;

use crate::entities::{CategoryId, PostId, UserId};
use crate::session::GuardState;

/// only there to let `Url` parse and encode bare paths.
const BASE: &str = "http://inkstand.local/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Post(PostId),
    Category(CategoryId),
    Search(String),

    SignIn,
    SignUp,
    ForgotPassword,
    ResetPassword {
        user_id: Option<UserId>,
        secret: Option<String>,
    },
    VerifyEmail,
    VerifyEmailVerify {
        user_id: Option<UserId>,
        secret: Option<String>,
    },
    AuthCallback,

    CreatePost,
    EditPost(PostId),
    Profile,
    Bookmarks,
    Author(UserId),
    ChangePassword,

    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// only for signed-out visitors.
    AuthOnly,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Render,
    Redirect(Route),
    Loading,
}

impl Route {
    /// parses a frontend path, query string included.
    pub fn parse(raw: &str) -> Route {
        let url = match Url::parse(BASE).and_then(|b| b.join(raw.trim())) {
            Ok(u) => u,
            Err(_) => return Route::NotFound(raw.to_string()),
        };
        let query = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        };
        let segments = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect::<Vec<_>>())
            .unwrap_or_default();

        match segments.as_slice() {
            [] => Route::Home,
            ["post", id] => Route::Post((*id).into()),
            ["category", id] => Route::Category((*id).into()),
            ["search"] => Route::Search(query("q").unwrap_or_default()),

            ["sign-in"] | ["login"] => Route::SignIn,
            ["sign-up"] => Route::SignUp,
            ["forgot-password"] => Route::ForgotPassword,
            ["reset-password"] => Route::ResetPassword {
                user_id: query("userId").map(Into::into),
                secret: query("secret"),
            },
            ["verify-email"] => Route::VerifyEmail,
            ["verify-email", "verify"] => Route::VerifyEmailVerify {
                user_id: query("userId").map(Into::into),
                secret: query("secret"),
            },
            ["auth", "callback"] => Route::AuthCallback,

            ["create-post"] => Route::CreatePost,
            ["edit-post", id] => Route::EditPost((*id).into()),
            ["profile"] => Route::Profile,
            ["bookmarks"] => Route::Bookmarks,
            ["author", id] => Route::Author((*id).into()),
            ["change-password"] => Route::ChangePassword,

            _ => Route::NotFound(url.path().to_string()),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Home
            | Route::Post(_)
            | Route::Category(_)
            | Route::Search(_)
            | Route::NotFound(_) => Access::Public,

            Route::SignIn
            | Route::SignUp
            | Route::ForgotPassword
            | Route::ResetPassword { .. }
            | Route::VerifyEmail
            | Route::VerifyEmailVerify { .. }
            | Route::AuthCallback => Access::AuthOnly,

            Route::CreatePost
            | Route::EditPost(_)
            | Route::Profile
            | Route::Bookmarks
            | Route::Author(_)
            | Route::ChangePassword => Access::Private,
        }
    }

    fn is_verify_email(&self) -> bool {
        matches!(self, Route::VerifyEmail | Route::VerifyEmailVerify { .. })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn with_query(f: &mut fmt::Formatter<'_>, path: &str, pairs: &[(&str, &str)]) -> fmt::Result {
            let mut url = Url::parse(BASE).map_err(|_| fmt::Error)?;
            url.query_pairs_mut().extend_pairs(pairs);

            write!(f, "{}?{}", path, url.query().unwrap_or_default())
        }

        fn with_secret(
            f: &mut fmt::Formatter<'_>,
            path: &str,
            user_id: &Option<UserId>,
            secret: &Option<String>,
        ) -> fmt::Result {
            match (user_id, secret) {
                (Some(u), Some(s)) => with_query(f, path, &[("userId", u.as_str()), ("secret", s.as_str())]),
                _ => f.write_str(path),
            }
        }

        match self {
            Route::Home => f.write_str("/"),
            Route::Post(id) => write!(f, "/post/{}", id),
            Route::Category(id) => write!(f, "/category/{}", id),
            Route::Search(q) => with_query(f, "/search", &[("q", q.as_str())]),
            Route::SignIn => f.write_str("/sign-in"),
            Route::SignUp => f.write_str("/sign-up"),
            Route::ForgotPassword => f.write_str("/forgot-password"),
            Route::ResetPassword { user_id, secret } =>
                with_secret(f, "/reset-password", user_id, secret),
            Route::VerifyEmail => f.write_str("/verify-email"),
            Route::VerifyEmailVerify { user_id, secret } =>
                with_secret(f, "/verify-email/verify", user_id, secret),
            Route::AuthCallback => f.write_str("/auth/callback"),
            Route::CreatePost => f.write_str("/create-post"),
            Route::EditPost(id) => write!(f, "/edit-post/{}", id),
            Route::Profile => f.write_str("/profile"),
            Route::Bookmarks => f.write_str("/bookmarks"),
            Route::Author(id) => write!(f, "/author/{}", id),
            Route::ChangePassword => f.write_str("/change-password"),
            Route::NotFound(p) => f.write_str(p),
        }
    }
}

/// decides whether `route` may render in `state`.
pub fn guard(state: GuardState, route: &Route) -> Decision {
    use GuardState::*;

    match (route.access(), state) {
        (Access::Public, _) => Decision::Render,
        (_, Unknown | Checking) => Decision::Loading,

        (Access::Private, Authenticated) => Decision::Render,
        (Access::Private, AuthenticatedUnverified) => Decision::Redirect(Route::VerifyEmail),
        (Access::Private, Unauthenticated) => Decision::Redirect(Route::SignIn),

        (Access::AuthOnly, Unauthenticated) => Decision::Render,
        (Access::AuthOnly, AuthenticatedUnverified) if route.is_verify_email() => Decision::Render,
        // the provider redirect arrives with its session already open
        (Access::AuthOnly, Authenticated | AuthenticatedUnverified)
            if *route == Route::AuthCallback =>
            Decision::Render,
        (Access::AuthOnly, _) => Decision::Redirect(Route::Home),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_params_and_queries() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/post/p1"), Route::Post("p1".into()));
        assert_eq!(
            Route::parse("/search?q=rust%20async"),
            Route::Search("rust async".to_string())
        );
        assert_eq!(
            Route::parse("/verify-email/verify?userId=u1&secret=s3"),
            Route::VerifyEmailVerify {
                user_id: Some("u1".into()),
                secret: Some("s3".to_string()),
            }
        );
        assert_eq!(Route::parse("/login"), Route::SignIn);
        assert_eq!(Route::parse("/admin/posts"), Route::NotFound("/admin/posts".to_string()));
    }

    #[test]
    fn display_parses_back() {
        for raw in [
            "/",
            "/edit-post/p9",
            "/author/u2",
            "/reset-password?userId=u1&secret=abc",
            "/auth/callback",
        ] {
            assert_eq!(Route::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn display_encodes_query_values() {
        let search = Route::Search("a&b=c d".to_string());
        assert_eq!(search.to_string(), "/search?q=a%26b%3Dc+d");
        assert_eq!(Route::parse(&search.to_string()), search);

        let reset = Route::ResetPassword {
            user_id: Some("u1".into()),
            secret: Some("s/+=&".to_string()),
        };
        assert_eq!(Route::parse(&reset.to_string()), reset);
    }

    #[test]
    fn private_route_waits_while_checking() {
        assert_eq!(guard(GuardState::Checking, &Route::Profile), Decision::Loading);
        assert_eq!(guard(GuardState::Unknown, &Route::SignIn), Decision::Loading);
        assert_eq!(guard(GuardState::Checking, &Route::Home), Decision::Render);
    }

    #[test]
    fn private_route_redirects() {
        assert_eq!(
            guard(GuardState::Unauthenticated, &Route::Bookmarks),
            Decision::Redirect(Route::SignIn)
        );
        assert_eq!(
            guard(GuardState::AuthenticatedUnverified, &Route::CreatePost),
            Decision::Redirect(Route::VerifyEmail)
        );
        assert_eq!(guard(GuardState::Authenticated, &Route::CreatePost), Decision::Render);
    }

    #[test]
    fn auth_only_route_sends_signed_in_users_home() {
        assert_eq!(
            guard(GuardState::Authenticated, &Route::SignUp),
            Decision::Redirect(Route::Home)
        );
        assert_eq!(guard(GuardState::Unauthenticated, &Route::SignUp), Decision::Render);
        assert_eq!(
            guard(GuardState::AuthenticatedUnverified, &Route::VerifyEmail),
            Decision::Render
        );
        assert_eq!(
            guard(GuardState::AuthenticatedUnverified, &Route::SignIn),
            Decision::Redirect(Route::Home)
        );
        assert_eq!(
            guard(GuardState::Authenticated, &Route::VerifyEmail),
            Decision::Redirect(Route::Home)
        );
    }

    #[test]
    fn oauth_callback_renders_with_provider_session() {
        for state in [
            GuardState::Authenticated,
            GuardState::AuthenticatedUnverified,
            GuardState::Unauthenticated,
        ] {
            assert_eq!(guard(state, &Route::AuthCallback), Decision::Render);
        }
        assert_eq!(guard(GuardState::Checking, &Route::AuthCallback), Decision::Loading);
    }
}
