use std::env::var;

use anyhow::{anyhow, Result};
use reqwest::Url;

/// flag value -> runtime env -> env captured at build time.
#[macro_export]
macro_rules! try_get_value {
    ($a:expr; $n:literal, $bn:literal, $pn:literal) => {{
        match $a {
            Some(t) => Ok(t),
            None => match var($n) {
                Ok(t) => Ok(t),
                Err(e) => {
                    ::tracing::debug!("error on getting `{}`: {}", $n, e);
                    ::tracing::debug!("fallback to built-in `{}`...", $pn);

                    match option_env!($bn) {
                        Some(t) => Ok(t.to_string()),
                        None => Err(::anyhow::anyhow!("cannot get `{}`!", $pn)),
                    }
                },
            },
        }
    }};
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub endpoint: Url,
    pub project_id: String,
    pub database_id: String,
    pub post_collection_id: String,
    pub bookmark_collection_id: String,
    pub profile_collection_id: String,
    pub category_collection_id: String,
    pub bucket_id: String,
    /// base of the links put into verification / recovery / oauth emails.
    pub frontend_url: Url,
    /// only handed through to the editor; never sent to the backend.
    pub rte_api_key: Option<String>,
}

/// values given on the command line; anything left `None` is looked up.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub project_id: Option<String>,
    pub database_id: Option<String>,
    pub bucket_id: Option<String>,
    pub frontend_url: Option<String>,
}

impl Config {
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let ConfigOverrides {
            endpoint,
            project_id,
            database_id,
            bucket_id,
            frontend_url,
        } = overrides;

        let endpoint = crate::try_get_value!(endpoint; "INKSTAND_ENDPOINT", "BUILD_WITH_INKSTAND_ENDPOINT", "endpoint")?;
        let frontend_url = crate::try_get_value!(frontend_url; "INKSTAND_FRONTEND_URL", "BUILD_WITH_INKSTAND_FRONTEND_URL", "frontend_url")?;

        let config = Self {
            endpoint: parse_url(&endpoint, "endpoint")?,
            project_id: crate::try_get_value!(project_id; "INKSTAND_PROJECT_ID", "BUILD_WITH_INKSTAND_PROJECT_ID", "project_id")?,
            database_id: crate::try_get_value!(database_id; "INKSTAND_DATABASE_ID", "BUILD_WITH_INKSTAND_DATABASE_ID", "database_id")?,
            post_collection_id: crate::try_get_value!(None; "INKSTAND_POST_COLLECTION_ID", "BUILD_WITH_INKSTAND_POST_COLLECTION_ID", "post_collection_id")?,
            bookmark_collection_id: crate::try_get_value!(None; "INKSTAND_BOOKMARK_COLLECTION_ID", "BUILD_WITH_INKSTAND_BOOKMARK_COLLECTION_ID", "bookmark_collection_id")?,
            profile_collection_id: crate::try_get_value!(None; "INKSTAND_PROFILE_COLLECTION_ID", "BUILD_WITH_INKSTAND_PROFILE_COLLECTION_ID", "profile_collection_id")?,
            category_collection_id: crate::try_get_value!(None; "INKSTAND_CATEGORY_COLLECTION_ID", "BUILD_WITH_INKSTAND_CATEGORY_COLLECTION_ID", "category_collection_id")?,
            bucket_id: crate::try_get_value!(bucket_id; "INKSTAND_BUCKET_ID", "BUILD_WITH_INKSTAND_BUCKET_ID", "bucket_id")?,
            frontend_url: parse_url(&frontend_url, "frontend_url")?,
            rte_api_key: crate::try_get_value!(None::<String>; "INKSTAND_RTE_API_KEY", "BUILD_WITH_INKSTAND_RTE_API_KEY", "rte_api_key").ok(),
        };

        tracing::debug!("config - {:?}", config);

        Ok(config)
    }

    /// for the in-memory backend, where only the frontend links matter.
    pub fn offline(frontend_url: Url) -> Result<Self> {
        Ok(Self {
            endpoint: parse_url("http://localhost/v1", "endpoint")?,
            project_id: "offline".to_string(),
            database_id: "offline".to_string(),
            post_collection_id: "posts".to_string(),
            bookmark_collection_id: "bookmarks".to_string(),
            profile_collection_id: "profiles".to_string(),
            category_collection_id: "categories".to_string(),
            bucket_id: "images".to_string(),
            frontend_url,
            rte_api_key: None,
        })
    }

    /// `{frontend}/{path}`, keeping any base path the frontend is mounted under.
    pub fn frontend_link(&self, path: &str) -> Result<Url> {
        let mut base = self.frontend_url.clone();
        if !base.path().ends_with('/') {
            let p = format!("{}/", base.path());
            base.set_path(&p);
        }

        base.join(path.trim_start_matches('/'))
            .map_err(|e| anyhow!("cannot build link for `{}`: {}", path, e))
    }
}

fn parse_url(raw: &str, name: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| anyhow!("`{}` is not a valid url ({}): {}", name, raw, e))
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        endpoint: Url::parse("https://cloud.example.com/v1").unwrap(),
        project_id: "project".to_string(),
        database_id: "blog".to_string(),
        post_collection_id: "posts".to_string(),
        bookmark_collection_id: "bookmarks".to_string(),
        profile_collection_id: "profiles".to_string(),
        category_collection_id: "categories".to_string(),
        bucket_id: "images".to_string(),
        frontend_url: Url::parse("https://blog.example.com/app").unwrap(),
        rte_api_key: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_link_keeps_base_path() {
        let config = test_config();

        assert_eq!(
            config.frontend_link("/verify-email/verify").unwrap().as_str(),
            "https://blog.example.com/app/verify-email/verify"
        );
        assert_eq!(
            config.frontend_link("auth/callback").unwrap().as_str(),
            "https://blog.example.com/app/auth/callback"
        );
    }

    #[test]
    fn overrides_win_over_environment() {
        let got: Result<String> = crate::try_get_value!(
            Some("https://flag.example.com".to_string());
            "INKSTAND_TEST_NEVER_SET", "BUILD_WITH_INKSTAND_TEST_NEVER_SET", "test"
        );

        assert_eq!(got.unwrap(), "https://flag.example.com");
    }

    #[test]
    fn missing_value_is_an_error() {
        let got: Result<String> = crate::try_get_value!(
            None;
            "INKSTAND_TEST_NEVER_SET", "BUILD_WITH_INKSTAND_TEST_NEVER_SET", "test"
        );

        assert!(got.is_err());
    }
}
