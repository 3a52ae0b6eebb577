pub mod cmds;
pub mod config;
mod constructors;
pub mod controllers;
pub mod entities;
pub mod flows;
pub(crate) mod interactors;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod usecases;
pub(crate) mod utils;
pub mod views;

pub use constructors::*;
use reqwest::Url;

use crate::cmds::App;
use crate::config::Config;
use crate::controllers::shell::{self, Outbox};

/// where offline mail links point when no frontend is given.
const OFFLINE_FRONTEND: &str = "http://localhost:5173/";

/// runs one command, or the shell when none is given.
pub async fn start(app: App) -> ::anyhow::Result<()> {
    let App { backend, cmd } = app;

    let (controller, outbox) = match backend.offline {
        true => {
            let frontend = backend.frontend_url.as_deref().unwrap_or(OFFLINE_FRONTEND);
            let frontend = Url::parse(frontend)
                .map_err(|e| ::anyhow::anyhow!("`frontend_url` is not a valid url ({}): {}", frontend, e))?;

            let (c, accounts) = constructors::in_memory_with_accounts(Config::offline(frontend)?);
            (c, Some(Outbox::new(accounts)))
        },
        false => (appwrite(Config::load(backend.overrides())?)?, None),
    };

    match cmd {
        Some(cmd) => shell::once(&controller, cmd, outbox).await,
        None => shell::repl(&controller, outbox).await,
    }
}
