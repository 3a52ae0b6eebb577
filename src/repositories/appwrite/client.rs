use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::Instrument;

/// what went wrong talking to the backend, before it is mapped for repositories.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status} ({kind}): {message}")]
    Server {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: String,
}

/// one HTTP client per backend project; the session lives in its cookie jar.
pub struct AppwriteClient {
    http: reqwest::Client,
    endpoint: Url,
    project_id: String,
}

impl AppwriteClient {
    pub fn new(mut endpoint: Url, project_id: impl Into<String>) -> Result<Self, ApiError> {
        if !endpoint.path().ends_with('/') {
            let p = format!("{}/", endpoint.path());
            endpoint.set_path(&p);
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(concat!("inkstand/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            project_id: project_id.into(),
        })
    }

    pub fn project_id(&self) -> &str { &self.project_id }

    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.endpoint
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Decode(format!("bad path `{}`: {}", path, e)))
    }

    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let req = self
            .http
            .request(method, self.url(path)?)
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Response-Format", "1.5.0");

        Ok(req)
    }

    pub async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let resp = self.execute(req).await?;

        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// for endpoints answering `204 No Content`.
    pub async fn send_empty(&self, req: RequestBuilder) -> Result<(), ApiError> {
        self.execute(req).await.map(|_| ())
    }

    async fn execute(&self, req: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let req = req.build()?;
        let span = tracing::trace_span!("appwrite", method = %req.method(), path = %req.url().path());

        let resp = self.http.execute(req).instrument(span).await?;
        let status = resp.status();
        tracing::trace!("status - {}", status);

        if status.is_success() {
            return Ok(resp);
        }

        Err(error_from(status, resp.text().await.unwrap_or_default()))
    }
}

fn error_from(status: StatusCode, body: String) -> ApiError {
    let (message, kind) = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody { message, kind }) => (message, kind),
        Err(_) => (body, String::new()),
    };

    ApiError::Server {
        status: status.as_u16(),
        kind,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_version_segment() {
        let client =
            AppwriteClient::new(Url::parse("https://cloud.example.com/v1").unwrap(), "p").unwrap();

        assert_eq!(
            client.url("/account/sessions/email").unwrap().as_str(),
            "https://cloud.example.com/v1/account/sessions/email"
        );
    }

    #[test]
    fn error_body_is_parsed() {
        let e = error_from(
            StatusCode::NOT_FOUND,
            r#"{"message":"Document not found","code":404,"type":"document_not_found"}"#
                .to_string(),
        );

        assert_eq!(e.status(), Some(404));
        assert_eq!(
            e.to_string(),
            "HTTP 404 (document_not_found): Document not found"
        );
    }

    #[test]
    fn non_json_error_body_is_kept() {
        let e = error_from(StatusCode::BAD_GATEWAY, "upstream down".to_string());

        match e {
            ApiError::Server { message, .. } => assert_eq!(message, "upstream down"),
            e => panic!("unexpected: {}", e),
        }
    }
}
