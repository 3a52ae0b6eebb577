use anyhow::anyhow;

use super::client::ApiError;
use crate::repositories::{RepositoryError, Result as RepoResult};

pub fn convert_repo_err(e: ApiError) -> RepositoryError {
    match e.status() {
        Some(404) => RepositoryError::NotFound,
        Some(401) => RepositoryError::Unauthorized,
        Some(409) => RepositoryError::Conflict,
        _ => RepositoryError::Internal(anyhow!(e)),
    }
}

/// `409` on create means the id is taken, which callers see as `false`.
pub fn try_unique_check<T>(result: Result<T, ApiError>) -> RepoResult<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(e) if e.status() == Some(409) => Ok(false),
        Err(e) => Err(convert_repo_err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(status: u16) -> ApiError {
        ApiError::Server {
            status,
            kind: String::new(),
            message: String::new(),
        }
    }

    #[test]
    fn status_maps_to_repository_error() {
        assert!(matches!(convert_repo_err(server(404)), RepositoryError::NotFound));
        assert!(matches!(convert_repo_err(server(401)), RepositoryError::Unauthorized));
        assert!(matches!(convert_repo_err(server(409)), RepositoryError::Conflict));
        assert!(matches!(convert_repo_err(server(500)), RepositoryError::Internal(_)));
    }

    #[test]
    fn conflict_on_create_is_false() {
        assert_eq!(try_unique_check::<()>(Ok(())).unwrap(), true);
        assert_eq!(try_unique_check::<()>(Err(server(409))).unwrap(), false);
        assert!(try_unique_check::<()>(Err(server(400))).is_err());
    }
}
