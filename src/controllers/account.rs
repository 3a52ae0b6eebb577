use anyhow::Result;

use super::{Controller, Emit};
use crate::cmds::{AccountMod, VerifyOp};
use crate::flows;
use crate::routes::Route;
use crate::usecases::account::*;
use crate::views;

impl Controller {
    pub(super) async fn account(&self, cmd: AccountMod, emit: Emit<'_>) -> Result<()> {
        let u = &self.account;

        match cmd {
            AccountMod::SignUp {
                name,
                email,
                password,
            } => {
                let sign_up::Output { profile } = u
                    .sign_up
                    .handle(sign_up::Input {
                        name,
                        email,
                        password,
                    })
                    .await?;

                emit(views::profile(&profile));
                emit(format!("verification mail sent to {}.", profile.email));
                emit(views::redirect(&Route::VerifyEmail));
            },

            AccountMod::SignIn { email, password } => {
                let sign_in::Output { profile } = u
                    .sign_in
                    .handle(sign_in::Input { email, password })
                    .await?;

                emit(views::guard_state(self.session.guard_state(), Some(&profile)));
                emit(views::redirect(&Route::Home));
            },

            AccountMod::SignOut => {
                u.sign_out.handle(sign_out::Input {}).await?;

                emit(views::guard_state(self.session.guard_state(), None));
            },

            AccountMod::Check => {
                let check::Output { state, profile } = u.check.handle(check::Input {}).await?;

                emit(views::guard_state(state, profile.as_ref()));
            },

            AccountMod::Verify { op } => match op {
                VerifyOp::Request => {
                    let request_verification::Output { email } = u
                        .request_verification
                        .handle(request_verification::Input {})
                        .await?;

                    emit(format!("verification mail sent to {}.", email));
                },
                VerifyOp::Complete { user_id, secret } => {
                    let complete_verification::Output { profile } = u
                        .complete_verification
                        .handle(complete_verification::Input { user_id, secret })
                        .await?;

                    emit(format!("{} is verified.", profile.email));
                    let to = flows::countdown(flows::VERIFIED_COUNTDOWN, |n| {
                        emit(views::countdown(n))
                    })
                    .await;
                    emit(views::redirect(&to));
                },
            },

            AccountMod::Recover { email } => {
                u.request_recovery
                    .handle(request_recovery::Input {
                        email: email.clone(),
                    })
                    .await?;

                emit(format!("if {} has an account, a recovery mail is on its way.", email));
            },

            AccountMod::Reset {
                user_id,
                secret,
                password,
                confirm,
            } => {
                u.reset_password
                    .handle(reset_password::Input {
                        user_id,
                        secret,
                        password,
                        confirm,
                    })
                    .await?;

                emit("password updated. sign in with the new one.".to_string());
                emit(views::redirect(&Route::SignIn));
            },

            AccountMod::ChangePassword { old, new } => {
                u.change_password
                    .handle(change_password::Input {
                        old_password: old,
                        password: new,
                    })
                    .await?;

                emit("password changed.".to_string());
            },

            AccountMod::Rename { name } => {
                let update_name::Output { profile } =
                    u.update_name.handle(update_name::Input { name }).await?;

                emit(views::profile(&profile));
            },

            AccountMod::Deactivate => {
                u.deactivate.handle(deactivate::Input {}).await?;

                emit("account deactivated.".to_string());
                emit(views::redirect(&Route::Home));
            },

            AccountMod::OauthUrl { provider } => {
                let oauth_url::Output { url } =
                    u.oauth_url.handle(oauth_url::Input { provider }).await?;

                emit(url.to_string());
            },

            AccountMod::OauthCallback { provider } => {
                let res = u
                    .complete_oauth
                    .handle(complete_oauth::Input { provider })
                    .await;

                if let Ok(complete_oauth::Output { profile, created }) = &res {
                    if *created {
                        emit(format!("welcome, {}!", profile.full_name));
                    }
                    emit(views::guard_state(self.session.guard_state(), Some(profile)));
                }

                let to = flows::after_oauth(&res).await;
                emit(views::redirect(&to));

                res?;
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::run;
    use crate::constructors::in_memory;
    use crate::session::GuardState;

    #[tokio::test(start_paused = true)]
    async fn sign_up_then_verify_with_mailed_link() {
        let (c, accounts) = crate::constructors::in_memory_with_accounts(crate::config::test_config());

        let out = run(&c, "account sign-up --name 'Ada Lovelace' --email ada@example.com --password hunter2hunter2")
            .await
            .unwrap();
        assert!(out[0].starts_with("Ada Lovelace (@alovelace"));
        assert_eq!(out.last().unwrap(), "-> /verify-email");
        assert_eq!(c.session.guard_state(), GuardState::AuthenticatedUnverified);

        let e = run(&c, "post create --title t --content c").await.unwrap_err();
        assert_eq!(e, "cannot open /create-post: redirected to /verify-email");

        let link = accounts.outbox().await.pop().unwrap().link;
        let query = link
            .query_pairs()
            .map(|(k, v)| format!("--{} {}", if k == "userId" { "user-id".into() } else { k }, v))
            .collect::<Vec<_>>()
            .join(" ");
        let out = run(&c, &format!("account verify complete {}", query))
            .await
            .unwrap();

        assert_eq!(out, vec![
            "ada@example.com is verified.".to_string(),
            "redirecting to / in 3...".to_string(),
            "redirecting to / in 2...".to_string(),
            "redirecting to / in 1...".to_string(),
            "-> /".to_string(),
        ]);
        assert_eq!(c.session.guard_state(), GuardState::Authenticated);
    }

    #[tokio::test]
    async fn signed_in_user_is_sent_away_from_sign_in() {
        let c = in_memory(crate::config::test_config());

        run(&c, "account sign-up --name Bob --email bob@example.com --password correcthorse")
            .await
            .unwrap();
        run(&c, "account sign-out").await.unwrap();
        let out = run(&c, "account sign-in --email bob@example.com --password correcthorse")
            .await
            .unwrap();
        assert_eq!(out.last().unwrap(), "-> /");

        let e = run(&c, "account sign-in --email bob@example.com --password correcthorse")
            .await
            .unwrap_err();
        assert_eq!(e, "cannot open /sign-in: redirected to /");
    }

    #[tokio::test(start_paused = true)]
    async fn oauth_callback_stores_profile_for_provider_session() {
        let (c, accounts) = crate::constructors::in_memory_with_accounts(crate::config::test_config());
        let id = accounts.accept_oauth("grace@example.com", "Grace Hopper").await;

        let out = run(&c, "account oauth-callback github").await.unwrap();
        assert_eq!(out[0], "welcome, Grace Hopper!");
        assert!(out[1].starts_with("signed in as grace@example.com (@ghopper"));
        assert_eq!(out.last().unwrap(), "-> /");
        assert_eq!(c.session.guard_state(), GuardState::Authenticated);

        let out = run(&c, "profile get").await.unwrap();
        assert!(out[0].starts_with("Grace Hopper (@ghopper"));
        assert!(out[0].contains(&format!("id       : {}", id)));
        assert!(out[0].contains("provider : github"));

        let out = run(&c, "account oauth-callback github").await.unwrap();
        assert!(out[0].starts_with("signed in as"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_oauth_goes_back_to_sign_in() {
        let c = in_memory(crate::config::test_config());

        let mut out = vec![];
        let res = c
            .handle(super::super::testing::line("account oauth-callback github"), &mut |s: String| {
                out.push(s)
            })
            .await;

        assert!(res.is_err());
        assert_eq!(out, vec!["-> /sign-in".to_string()]);
    }
}
