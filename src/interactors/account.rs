use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use super::*;
use crate::config::Config;
use crate::entities::{Account, Provider, UserId, UserProfile};
use crate::repositories::{AccountRepository, ProfileMutation, ProfileRepository};
use crate::routes::Route;
use crate::session::SessionStore;
use crate::usecases::account::{
    change_password, check, complete_oauth, complete_verification, deactivate, oauth_url,
    request_recovery, request_verification, reset_password, sign_in, sign_out, sign_up,
    update_name, MIN_PASSWORD_LEN,
};
use crate::utils::{create_username, AlsoChain, LetChain};

/// the stored profile, or an account-only view (empty username) when it was never written.
/// nothing is stored here; verification always follows the account.
async fn load_profile(
    profiles: &(dyn ProfileRepository + Sync + Send),
    account: &Account,
    provider: Provider,
) -> Result<UserProfile> {
    let profile = match profiles.find(&account.id).await {
        Ok(p) => p,
        Err(RepositoryError::NotFound) => {
            tracing::debug!("no profile for {} yet", account.id);
            UserProfile::from_account(account, String::new(), provider)
        },
        Err(e) => return Err(user_err_fmt(e)),
    };

    Ok(UserProfile {
        email_verified: account.email_verified,
        ..profile
    })
}

fn link(config: &Config, route: Route) -> Result<::reqwest::Url> {
    config.frontend_link(&route.to_string())
}

fn check_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("password must be at least {} characters.", MIN_PASSWORD_LEN);
    }

    Ok(())
}

fn secret_pair(user_id: Option<UserId>, secret: Option<String>) -> Option<(UserId, String)> {
    match (user_id, secret) {
        (Some(u), Some(s)) if !u.as_str().is_empty() && !s.is_empty() => Some((u, s)),
        _ => None,
    }
}

pub struct AccountSignUpInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
    pub profile_repository: Arc<dyn ProfileRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
    pub config: Arc<Config>,
}
#[async_trait]
impl sign_up::Usecase for AccountSignUpInteractor {
    #[tracing::instrument(skip(self, data), fields(email = %data.email))]
    async fn handle(&self, data: sign_up::Input) -> Result<sign_up::Output> {
        let sign_up::Input {
            name,
            email,
            password,
        } = data;

        let name = name.trim().to_string();
        if name.is_empty() || email.trim().is_empty() {
            bail!("name and email are required.");
        }
        check_password(&password)?;

        let account = self
            .account_repository
            .create(UserId::unique(), email.trim(), &password, &name)
            .await
            .map_err(account_err_fmt)?;
        tracing::trace!("account - {:?}", account);

        self.account_repository
            .create_session(&account.email, &password)
            .await
            .map_err(account_err_fmt)?;

        let profile =
            UserProfile::from_account(&account, create_username(&name), Provider::Email);

        let can_insert = self
            .profile_repository
            .insert(profile.clone())
            .await
            .map_err(user_err_fmt)?;

        if !can_insert {
            bail!("profile already exists.");
        }

        let verify = link(&self.config, Route::VerifyEmailVerify {
            user_id: None,
            secret: None,
        })?;
        if let Err(e) = self.account_repository.create_verification(&verify).await {
            tracing::warn!("account created but verification mail failed: {}", e);
        }

        self.session.login(profile.clone());

        sign_up::Output { profile }.also_(|o| tracing::trace!("output - {:?}", o)).let_(Ok)
    }
}

pub struct AccountSignInInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
    pub profile_repository: Arc<dyn ProfileRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl sign_in::Usecase for AccountSignInInteractor {
    #[tracing::instrument(skip(self, data), fields(email = %data.email))]
    async fn handle(&self, data: sign_in::Input) -> Result<sign_in::Output> {
        let sign_in::Input { email, password } = data;

        self.account_repository
            .create_session(email.trim(), &password)
            .await
            .map_err(account_err_fmt)?;

        let account = self
            .account_repository
            .current()
            .await
            .map_err(account_err_fmt)?;

        let profile =
            load_profile(&*self.profile_repository, &account, Provider::Email).await?;

        self.session.login(profile.clone());

        sign_in::Output { profile }.also_(|o| tracing::trace!("output - {:?}", o)).let_(Ok)
    }
}

pub struct AccountSignOutInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl sign_out::Usecase for AccountSignOutInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: sign_out::Input) -> Result<sign_out::Output> {
        tracing::trace!("input - {:?}", data);

        if let Err(e) = self.account_repository.delete_sessions().await {
            tracing::warn!("cannot delete sessions, clearing locally: {}", e);
        }

        self.session.logout();

        Ok(sign_out::Output {})
    }
}

pub struct AccountCheckInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
    pub profile_repository: Arc<dyn ProfileRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl check::Usecase for AccountCheckInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: check::Input) -> Result<check::Output> {
        tracing::trace!("input - {:?}", data);

        let ticket = self.session.begin_check();

        let profile = match self.account_repository.current().await {
            Ok(account) =>
                match load_profile(&*self.profile_repository, &account, Provider::Email).await {
                    Ok(p) => Some(p),
                    Err(e) => {
                        tracing::debug!("profile unavailable: {}", e);
                        None
                    },
                },
            Err(e) => {
                tracing::debug!("no current user: {}", e);
                None
            },
        };

        self.session.resolve(ticket, profile);

        check::Output {
            state: self.session.guard_state(),
            profile: self.session.user(),
        }
        .also_(|o| tracing::trace!("output - {:?}", o))
        .let_(Ok)
    }
}

pub struct AccountRequestVerificationInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
    pub config: Arc<Config>,
}
#[async_trait]
impl request_verification::Usecase for AccountRequestVerificationInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(
        &self,
        data: request_verification::Input,
    ) -> Result<request_verification::Output> {
        tracing::trace!("input - {:?}", data);

        let account = self
            .account_repository
            .current()
            .await
            .map_err(account_err_fmt)?;

        if account.email_verified {
            bail!("email is already verified.");
        }

        let verify = link(&self.config, Route::VerifyEmailVerify {
            user_id: None,
            secret: None,
        })?;
        self.account_repository
            .create_verification(&verify)
            .await
            .map_err(account_err_fmt)?;

        Ok(request_verification::Output {
            email: account.email,
        })
    }
}

pub struct AccountCompleteVerificationInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
    pub profile_repository: Arc<dyn ProfileRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl complete_verification::Usecase for AccountCompleteVerificationInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(
        &self,
        data: complete_verification::Input,
    ) -> Result<complete_verification::Output> {
        let complete_verification::Input { user_id, secret } = data;

        let (user_id, secret) = match secret_pair(user_id, secret) {
            Some(p) => p,
            None => bail!("Invalid verification link."),
        };

        self.account_repository
            .update_verification(&user_id, &secret)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound | RepositoryError::Unauthorized =>
                    anyhow!("Invalid verification link."),
                e => account_err_fmt(e),
            })?;

        let profile = self
            .profile_repository
            .update(&user_id, ProfileMutation {
                email_verified: Some(true),
                ..Default::default()
            })
            .await
            .map_err(user_err_fmt)?;

        self.session.refresh_profile(profile.clone());

        complete_verification::Output { profile }
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct AccountRequestRecoveryInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
    pub config: Arc<Config>,
}
#[async_trait]
impl request_recovery::Usecase for AccountRequestRecoveryInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: request_recovery::Input) -> Result<request_recovery::Output> {
        let request_recovery::Input { email } = data;

        let reset = link(&self.config, Route::ResetPassword {
            user_id: None,
            secret: None,
        })?;
        self.account_repository
            .create_recovery(email.trim(), &reset)
            .await
            .map_err(account_err_fmt)?;

        Ok(request_recovery::Output {})
    }
}

pub struct AccountResetPasswordInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
}
#[async_trait]
impl reset_password::Usecase for AccountResetPasswordInteractor {
    #[tracing::instrument(skip(self, data), fields(user_id = ?data.user_id))]
    async fn handle(&self, data: reset_password::Input) -> Result<reset_password::Output> {
        let reset_password::Input {
            user_id,
            secret,
            password,
            confirm,
        } = data;

        let (user_id, secret) = match secret_pair(user_id, secret) {
            Some(p) => p,
            None => bail!("Invalid recovery link."),
        };

        if password != confirm {
            bail!("passwords do not match.");
        }
        check_password(&password)?;

        self.account_repository
            .update_recovery(&user_id, &secret, &password)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound | RepositoryError::Unauthorized =>
                    anyhow!("Invalid recovery link."),
                e => account_err_fmt(e),
            })?;

        Ok(reset_password::Output {})
    }
}

pub struct AccountChangePasswordInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
}
#[async_trait]
impl change_password::Usecase for AccountChangePasswordInteractor {
    #[tracing::instrument(skip(self, data))]
    async fn handle(&self, data: change_password::Input) -> Result<change_password::Output> {
        let change_password::Input {
            old_password,
            password,
        } = data;

        check_password(&password)?;

        self.account_repository
            .update_password(&password, &old_password)
            .await
            .map_err(account_err_fmt)?;

        Ok(change_password::Output {})
    }
}

pub struct AccountUpdateNameInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
    pub profile_repository: Arc<dyn ProfileRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl update_name::Usecase for AccountUpdateNameInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: update_name::Input) -> Result<update_name::Output> {
        let update_name::Input { name } = data;

        let name = name.trim();
        if name.is_empty() {
            bail!("name must not be empty.");
        }

        let account = self
            .account_repository
            .update_name(name)
            .await
            .map_err(account_err_fmt)?;

        let mutation = ProfileMutation {
            full_name: Some(account.name.clone()),
            ..Default::default()
        };
        let profile = match self.profile_repository.update(&account.id, mutation).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("account renamed but profile was not: {}", e);
                load_profile(&*self.profile_repository, &account, Provider::Email)
                    .await?
                    .also_(|p| p.full_name = account.name.clone())
            },
        };

        self.session.refresh_profile(profile.clone());

        update_name::Output { profile }
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct AccountDeactivateInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl deactivate::Usecase for AccountDeactivateInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: deactivate::Input) -> Result<deactivate::Output> {
        tracing::trace!("input - {:?}", data);

        self.account_repository
            .block()
            .await
            .map_err(account_err_fmt)?;

        self.session.logout();

        Ok(deactivate::Output {})
    }
}

pub struct AccountOAuthUrlInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
    pub config: Arc<Config>,
}
#[async_trait]
impl oauth_url::Usecase for AccountOAuthUrlInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: oauth_url::Input) -> Result<oauth_url::Output> {
        let oauth_url::Input { provider } = data;

        let success = link(&self.config, Route::AuthCallback)?;
        let failure = link(&self.config, Route::SignIn)?;

        self.account_repository
            .oauth_url(&provider, &success, &failure)
            .map_err(account_err_fmt)?
            .let_(|url| oauth_url::Output { url })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct AccountCompleteOAuthInteractor {
    pub account_repository: Arc<dyn AccountRepository + Sync + Send>,
    pub profile_repository: Arc<dyn ProfileRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl complete_oauth::Usecase for AccountCompleteOAuthInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: complete_oauth::Input) -> Result<complete_oauth::Output> {
        let complete_oauth::Input { provider } = data;

        let account = self
            .account_repository
            .current()
            .await
            .map_err(account_err_fmt)?;

        let (profile, created) = match self.profile_repository.find(&account.id).await {
            Ok(p) => (
                UserProfile {
                    email_verified: account.email_verified,
                    ..p
                },
                false,
            ),
            Err(RepositoryError::NotFound) => {
                let p = UserProfile::from_account(&account, create_username(&account.name), provider);

                if !self
                    .profile_repository
                    .insert(p.clone())
                    .await
                    .map_err(user_err_fmt)?
                {
                    tracing::warn!("profile for {} appeared concurrently", account.id);
                }

                (p, true)
            },
            Err(e) => return Err(user_err_fmt(e)),
        };

        self.session.login(profile.clone());

        complete_oauth::Output { profile, created }
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use regex::Regex;

    use super::super::testing::{fixture, Fixture};
    use super::*;
    use crate::repositories::mock::MailKind;
    use crate::session::GuardState;

    fn sign_up_with(f: &Fixture) -> AccountSignUpInteractor {
        AccountSignUpInteractor {
            account_repository: f.accounts.clone(),
            profile_repository: f.profiles.clone(),
            session: f.session.clone(),
            config: f.config.clone(),
        }
    }

    fn check_with(f: &Fixture) -> AccountCheckInteractor {
        AccountCheckInteractor {
            account_repository: f.accounts.clone(),
            profile_repository: f.profiles.clone(),
            session: f.session.clone(),
        }
    }

    async fn ada(f: &Fixture) -> UserProfile {
        sign_up::Usecase::handle(&sign_up_with(f), sign_up::Input {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "analytical".to_string(),
        })
        .await
        .unwrap()
        .profile
    }

    #[tokio::test]
    async fn sign_up_creates_unverified_profile_and_mails_link() {
        let f = fixture();

        let profile = ada(&f).await;

        assert!(Regex::new(r"^alovelace\d{4}$").unwrap().is_match(&profile.username));
        assert!(!profile.email_verified);
        assert_eq!(profile.provider, Provider::Email);
        assert_eq!(f.profiles.find(&profile.user_id).await.unwrap(), profile);
        assert_eq!(f.session.guard_state(), GuardState::AuthenticatedUnverified);

        let mail = f.accounts.outbox().await.remove(0);
        assert_eq!(mail.kind, MailKind::Verification);
        assert_eq!(mail.to, "ada@example.com");
        assert_eq!(mail.link.path(), "/app/verify-email/verify");
    }

    #[tokio::test]
    async fn short_password_is_rejected_before_the_backend() {
        let f = fixture();

        let e = sign_up::Usecase::handle(&sign_up_with(&f), sign_up::Input {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
        })
        .await
        .unwrap_err();

        assert_eq!(e.to_string(), "password must be at least 8 characters.");
        assert!(f.accounts.outbox().await.is_empty());
    }

    #[tokio::test]
    async fn verification_link_marks_profile_verified() {
        let f = fixture();
        let profile = ada(&f).await;
        let link = f.accounts.outbox().await.remove(0).link;

        let route = Route::parse(&format!("/verify-email/verify?{}", link.query().unwrap()));
        let (user_id, secret) = match route {
            Route::VerifyEmailVerify { user_id, secret } => (user_id, secret),
            r => panic!("unexpected route: {}", r),
        };
        assert_eq!(user_id.as_ref(), Some(&profile.user_id));

        let interactor = AccountCompleteVerificationInteractor {
            account_repository: f.accounts.clone(),
            profile_repository: f.profiles.clone(),
            session: f.session.clone(),
        };
        let out = complete_verification::Usecase::handle(&interactor, complete_verification::Input {
            user_id,
            secret,
        })
        .await
        .unwrap();

        assert!(out.profile.email_verified);
        assert_eq!(f.session.guard_state(), GuardState::Authenticated);
    }

    #[tokio::test]
    async fn incomplete_verification_link_is_invalid() {
        let f = fixture();
        let interactor = AccountCompleteVerificationInteractor {
            account_repository: f.accounts.clone(),
            profile_repository: f.profiles.clone(),
            session: f.session.clone(),
        };

        let e = complete_verification::Usecase::handle(&interactor, complete_verification::Input {
            user_id: Some("u1".into()),
            secret: None,
        })
        .await
        .unwrap_err();

        assert_eq!(e.to_string(), "Invalid verification link.");
    }

    #[tokio::test]
    async fn check_follows_backend_session() {
        let f = fixture();
        ada(&f).await;

        let out = check::Usecase::handle(&check_with(&f), check::Input {}).await.unwrap();
        assert_eq!(out.state, GuardState::AuthenticatedUnverified);

        f.accounts.unreachable.store(true, Ordering::SeqCst);
        let out = check::Usecase::handle(&check_with(&f), check::Input {}).await.unwrap();
        assert_eq!(out.state, GuardState::Unauthenticated);
        assert_eq!(out.profile, None);
    }

    #[tokio::test]
    async fn check_leaves_missing_profile_unwritten() {
        let f = fixture();
        let id = f.accounts.accept_oauth("grace@example.com", "Grace Hopper").await;

        for _ in 0..2 {
            let out = check::Usecase::handle(&check_with(&f), check::Input {}).await.unwrap();
            assert_eq!(out.state, GuardState::Authenticated);
            assert_eq!(out.profile.unwrap().username, "");
        }

        assert!(matches!(
            f.profiles.find(&id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn sign_out_clears_session_even_when_backend_fails() {
        let f = fixture();
        ada(&f).await;
        f.accounts.unreachable.store(true, Ordering::SeqCst);

        let interactor = AccountSignOutInteractor {
            account_repository: f.accounts.clone(),
            session: f.session.clone(),
        };
        sign_out::Usecase::handle(&interactor, sign_out::Input {}).await.unwrap();

        assert_eq!(f.session.guard_state(), GuardState::Unauthenticated);
    }

    #[tokio::test]
    async fn sign_in_after_sign_out() {
        let f = fixture();
        let profile = ada(&f).await;
        f.session.logout();

        let interactor = AccountSignInInteractor {
            account_repository: f.accounts.clone(),
            profile_repository: f.profiles.clone(),
            session: f.session.clone(),
        };
        let wrong = sign_in::Usecase::handle(&interactor, sign_in::Input {
            email: "ada@example.com".to_string(),
            password: "wrong-password".to_string(),
        })
        .await;
        assert!(wrong.is_err());

        let out = sign_in::Usecase::handle(&interactor, sign_in::Input {
            email: "ada@example.com".to_string(),
            password: "analytical".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(out.profile.username, profile.username);
        assert_eq!(f.session.user().map(|u| u.user_id), Some(profile.user_id));
    }

    #[tokio::test]
    async fn reset_password_checks_confirmation_and_length() {
        let f = fixture();
        let interactor = AccountResetPasswordInteractor {
            account_repository: f.accounts.clone(),
        };
        let input = |password: &str, confirm: &str| reset_password::Input {
            user_id: Some("u1".into()),
            secret: Some("s".to_string()),
            password: password.to_string(),
            confirm: confirm.to_string(),
        };

        let e = reset_password::Usecase::handle(&interactor, input("longenough", "different"))
            .await
            .unwrap_err();
        assert_eq!(e.to_string(), "passwords do not match.");

        let e = reset_password::Usecase::handle(&interactor, input("short", "short"))
            .await
            .unwrap_err();
        assert_eq!(e.to_string(), "password must be at least 8 characters.");
    }

    #[tokio::test]
    async fn recovery_mail_resets_password() {
        let f = fixture();
        ada(&f).await;

        let request = AccountRequestRecoveryInteractor {
            account_repository: f.accounts.clone(),
            config: f.config.clone(),
        };
        request_recovery::Usecase::handle(&request, request_recovery::Input {
            email: "ada@example.com".to_string(),
        })
        .await
        .unwrap();

        let link = f
            .accounts
            .outbox()
            .await
            .into_iter()
            .find(|m| m.kind == MailKind::Recovery)
            .unwrap()
            .link;
        assert_eq!(link.path(), "/app/reset-password");
        let pairs = link.query_pairs().into_owned().collect::<Vec<_>>();

        let reset = AccountResetPasswordInteractor {
            account_repository: f.accounts.clone(),
        };
        reset_password::Usecase::handle(&reset, reset_password::Input {
            user_id: Some(pairs[0].1.clone().into()),
            secret: Some(pairs[1].1.clone()),
            password: "difference-engine".to_string(),
            confirm: "difference-engine".to_string(),
        })
        .await
        .unwrap();

        f.accounts
            .create_session("ada@example.com", "difference-engine")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_name_renames_profile() {
        let f = fixture();
        let profile = ada(&f).await;

        let interactor = AccountUpdateNameInteractor {
            account_repository: f.accounts.clone(),
            profile_repository: f.profiles.clone(),
            session: f.session.clone(),
        };
        let out = update_name::Usecase::handle(&interactor, update_name::Input {
            name: "  Augusta Ada King ".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(out.profile.full_name, "Augusta Ada King");
        assert_eq!(out.profile.username, profile.username);
        assert_eq!(f.session.user().unwrap().full_name, "Augusta Ada King");
    }

    #[tokio::test]
    async fn deactivate_blocks_further_sign_in() {
        let f = fixture();
        ada(&f).await;

        let interactor = AccountDeactivateInteractor {
            account_repository: f.accounts.clone(),
            session: f.session.clone(),
        };
        deactivate::Usecase::handle(&interactor, deactivate::Input {}).await.unwrap();

        assert_eq!(f.session.guard_state(), GuardState::Unauthenticated);
        assert!(f
            .accounts
            .create_session("ada@example.com", "analytical")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn oauth_creates_profile_once() {
        let f = fixture();
        let interactor = AccountCompleteOAuthInteractor {
            account_repository: f.accounts.clone(),
            profile_repository: f.profiles.clone(),
            session: f.session.clone(),
        };

        let url = oauth_url::Usecase::handle(
            &AccountOAuthUrlInteractor {
                account_repository: f.accounts.clone(),
                config: f.config.clone(),
            },
            oauth_url::Input {
                provider: Provider::Github,
            },
        )
        .await
        .unwrap()
        .url;
        assert!(url.path().ends_with("/account/sessions/oauth2/github"));
        assert!(url
            .query_pairs()
            .any(|(k, v)| k == "success" && v == "https://blog.example.com/app/auth/callback"));

        f.accounts.accept_oauth("grace@example.com", "Grace Hopper").await;

        let first = complete_oauth::Usecase::handle(&interactor, complete_oauth::Input {
            provider: Provider::Github,
        })
        .await
        .unwrap();
        assert!(first.created);
        assert_eq!(first.profile.provider, Provider::Github);
        assert_eq!(f.session.guard_state(), GuardState::Authenticated);

        let again = complete_oauth::Usecase::handle(&interactor, complete_oauth::Input {
            provider: Provider::Github,
        })
        .await
        .unwrap();
        assert!(!again.created);
        assert_eq!(again.profile.username, first.profile.username);
    }
}
