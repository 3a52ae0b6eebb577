use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

use super::Controller;
use crate::cmds::{Line, LineMod, RootMod};
use crate::repositories::mock::{InMemoryAccountRepository, MailKind};

const PROMPT: &str = "inkstand> ";

/// prints what the offline account backend "sent" since the last look.
pub(crate) struct Outbox {
    accounts: Arc<InMemoryAccountRepository>,
    seen: usize,
}

impl Outbox {
    pub(crate) fn new(accounts: Arc<InMemoryAccountRepository>) -> Self {
        Self { accounts, seen: 0 }
    }

    async fn flush(&mut self) {
        let mails = self.accounts.outbox().await;

        for m in mails.iter().skip(self.seen) {
            let kind = match m.kind {
                MailKind::Verification => "verification",
                MailKind::Recovery => "recovery",
            };
            println!("[mail] {} to {}: {}", kind, m.to, m.link);
        }

        self.seen = mails.len();
    }

    async fn provider_redirect(&self, email: &str, name: &str) {
        let id = self.accounts.accept_oauth(email, name).await;
        println!("[oauth] session opened for {} ({}). run `account oauth-callback` next.", email, id);
    }
}

pub(crate) async fn once(c: &Controller, cmd: RootMod, mut outbox: Option<Outbox>) -> Result<()> {
    let res = c.handle(cmd, &mut |s: String| println!("{}", s)).await;

    if let Some(o) = outbox.as_mut() {
        o.flush().await;
    }

    res
}

fn parse_line(raw: &str) -> Result<Option<LineMod>> {
    let words = ::shell_words::split(raw).map_err(|e| anyhow!(e.to_string()))?;

    if words.is_empty() {
        return Ok(None);
    }

    use clap::Parser;

    Line::try_parse_from(words)
        .map(|l| Some(l.cmd))
        .map_err(|e| anyhow!(e.to_string()))
}

/// reads commands until `exit` or end of input; one session lives across lines.
pub(crate) async fn repl(c: &Controller, mut outbox: Option<Outbox>) -> Result<()> {
    let mut lines = BufReader::new(stdin()).lines();

    loop {
        print!("{}", PROMPT);
        ::std::io::stdout().flush()?;

        let raw = match lines.next_line().await? {
            Some(l) => l,
            None => break,
        };

        let cmd = match parse_line(&raw) {
            Ok(Some(LineMod::Root(cmd))) => cmd,
            Ok(Some(LineMod::OauthAccept { email, name })) => {
                match outbox.as_ref() {
                    Some(o) => o.provider_redirect(&email, &name).await,
                    None => eprintln!("`oauth-accept` only works with --offline."),
                }
                continue;
            },
            Ok(Some(LineMod::Exit)) => break,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            },
        };

        tracing::debug!("command - {:?}", cmd);
        if let Err(e) = c.handle(cmd, &mut |s: String| println!("{}", s)).await {
            eprintln!("error: {}", e);
        }

        if let Some(o) = outbox.as_mut() {
            o.flush().await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_exit_lines() {
        assert!(matches!(parse_line("   "), Ok(None)));
        assert!(matches!(parse_line("exit"), Ok(Some(LineMod::Exit))));
        assert!(matches!(parse_line("quit"), Ok(Some(LineMod::Exit))));
    }

    #[tokio::test(start_paused = true)]
    async fn offline_provider_redirect_then_callback() {
        use crate::repositories::AccountRepository;

        let (c, accounts) =
            crate::constructors::in_memory_with_accounts(crate::config::test_config());
        let outbox = Outbox::new(accounts.clone());

        match parse_line("oauth-accept grace@example.com --name 'Grace Hopper'") {
            Ok(Some(LineMod::OauthAccept { email, name })) =>
                outbox.provider_redirect(&email, &name).await,
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }

        assert!(accounts.current().await.is_ok());
        let mut out = vec![];
        let res = c
            .handle(
                crate::controllers::testing::line("account oauth-callback github"),
                &mut |s: String| out.push(s),
            )
            .await;
        assert!(res.is_ok(), "{:?}", res);
        assert_eq!(out[0], "welcome, Grace Hopper!");
    }

    #[test]
    fn quoted_words_stay_together() {
        match parse_line("post search 'async rust' 2") {
            Ok(Some(LineMod::Root(RootMod::Post {
                cmd: crate::cmds::PostMod::Search { term, page },
            }))) => {
                assert_eq!(term, "async rust");
                assert_eq!(page, 2);
            },
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn unbalanced_quote_is_an_error() {
        assert!(parse_line("post search 'oops").is_err());
        assert!(parse_line("post list 0").is_err());
    }
}
