pub mod account;
pub mod bookmark;
pub mod category;
pub mod media;
pub mod post;
pub mod profile;

use anyhow::{anyhow, bail, Error, Result};

use crate::entities::UserProfile;
use crate::repositories::RepositoryError;
use crate::session::SessionStore;

fn account_err_fmt(e: RepositoryError) -> Error {
    match e {
        RepositoryError::NotFound => anyhow!("cannot find account."),
        RepositoryError::Unauthorized => anyhow!("invalid credentials or session expired."),
        RepositoryError::Conflict => anyhow!("an account with this email already exists."),
        e => anyhow!("repository error: {}", e),
    }
}

fn user_err_fmt(e: RepositoryError) -> Error {
    match e {
        RepositoryError::NotFound => anyhow!("cannot find user. not registered?"),
        e => anyhow!("repository error: {}", e),
    }
}

fn post_err_fmt(e: RepositoryError) -> Error {
    match e {
        RepositoryError::NotFound => anyhow!("cannot find post."),
        RepositoryError::Unauthorized => anyhow!("not permitted to touch this post."),
        e => anyhow!("repository error: {}", e),
    }
}

fn bookmark_err_fmt(e: RepositoryError) -> Error {
    match e {
        RepositoryError::NotFound => anyhow!("cannot find bookmark."),
        e => anyhow!("repository error: {}", e),
    }
}

fn category_err_fmt(e: RepositoryError) -> Error {
    match e {
        RepositoryError::NotFound => anyhow!("cannot find category."),
        e => anyhow!("repository error: {}", e),
    }
}

fn file_err_fmt(e: RepositoryError) -> Error {
    match e {
        RepositoryError::NotFound => anyhow!("cannot find file."),
        e => anyhow!("storage error: {}", e),
    }
}

/// `(limit, offset)` of a 1-based page.
fn calc_paging(items: u32, page: u32) -> Result<(u32, u32)> {
    if page == 0 {
        bail!("out of range (page starts from 1)");
    }

    match items.checked_mul(page - 1) {
        Some(offset) => Ok((items, offset)),
        None => bail!("out of range (page {} is too far)", page),
    }
}

/// numbers items by their position in the whole list, starting from 1.
fn numbered<T, C>(items: Vec<T>, offset: u32) -> C
where C: FromIterator<(u32, T)> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| (offset + i as u32 + 1, v))
        .collect()
}

fn signed_in(session: &SessionStore) -> Result<UserProfile> {
    match session.user() {
        Some(u) => Ok(u),
        None => bail!("sign in required."),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_is_one_based() {
        assert_eq!(calc_paging(10, 1).unwrap(), (10, 0));
        assert_eq!(calc_paging(10, 3).unwrap(), (10, 20));
        assert!(calc_paging(10, 0).is_err());
        assert!(calc_paging(10, u32::MAX).is_err());
    }

    #[test]
    fn numbering_continues_across_pages() {
        let v: Vec<(u32, char)> = numbered(vec!['a', 'b'], 10);

        assert_eq!(v, vec![(11, 'a'), (12, 'b')]);
    }
}
