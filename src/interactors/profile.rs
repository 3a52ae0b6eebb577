use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::*;
use crate::entities::PostStatus;
use crate::repositories::{
    BookmarkRepository, Filter, ListQuery, PostRepository, ProfileRepository,
};
use crate::usecases::post::{PostQuery, PAGE_SIZE};
use crate::usecases::profile::{author, get};
use crate::utils::{AlsoChain, LetChain};

pub struct ProfileGetInteractor {
    pub profile_repository: Arc<dyn ProfileRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl get::Usecase for ProfileGetInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: get::Input) -> Result<get::Output> {
        tracing::trace!("input - {:?}", data);

        let get::Input { user_id } = data;

        let user_id = match user_id {
            Some(u) => u,
            None => signed_in(&self.session)?.user_id,
        };

        self.profile_repository
            .find(&user_id)
            .await
            .map_err(user_err_fmt)?
            .let_(|profile| get::Output { profile })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

/// an author's public page: profile, their active posts and a couple of counts.
pub struct ProfileAuthorInteractor {
    pub profile_repository: Arc<dyn ProfileRepository + Sync + Send>,
    pub post_repository: Arc<dyn PostRepository + Sync + Send>,
    pub bookmark_repository: Arc<dyn BookmarkRepository + Sync + Send>,
}
#[async_trait]
impl author::Usecase for ProfileAuthorInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: author::Input) -> Result<author::Output> {
        tracing::trace!("input - {:?}", data);

        let author::Input { user_id, page } = data;

        let (limit, offset) = calc_paging(PAGE_SIZE, page)?;

        let profile = self
            .profile_repository
            .find(&user_id)
            .await
            .map_err(user_err_fmt)?;

        let query = PostQuery {
            status: Some(PostStatus::Active),
            ..PostQuery::by_user(user_id.clone())
        };
        let listed = self
            .post_repository
            .finds(query.to_list_query(limit, offset))
            .await
            .map_err(post_err_fmt)?;

        let bookmark_count = self
            .bookmark_repository
            .finds(
                ListQuery::default()
                    .filter(Filter::equal("userId", user_id.as_str()))
                    .page(1, 0),
            )
            .await
            .map_err(bookmark_err_fmt)?
            .total;

        author::Output {
            profile,
            posts: numbered(listed.items, offset),
            post_count: listed.total,
            bookmark_count,
            page,
        }
        .also_(|o| tracing::trace!("output - {:?}", o))
        .let_(Ok)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::super::testing::{fixture, post, sign_in_as};
    use super::*;
    use crate::entities::Bookmark;

    #[tokio::test]
    async fn get_defaults_to_signed_in_user() {
        let f = fixture();
        let interactor = ProfileGetInteractor {
            profile_repository: f.profiles.clone(),
            session: f.session.clone(),
        };

        assert!(get::Usecase::handle(&interactor, get::Input { user_id: None })
            .await
            .is_err());

        let me = sign_in_as(&f, "ada").await;
        let out = get::Usecase::handle(&interactor, get::Input { user_id: None })
            .await
            .unwrap();
        assert_eq!(out.profile, me);

        let e = get::Usecase::handle(&interactor, get::Input {
            user_id: Some("nobody".into()),
        })
        .await
        .unwrap_err();
        assert_eq!(e.to_string(), "cannot find user. not registered?");
    }

    #[tokio::test]
    async fn author_page_counts_active_posts_and_bookmarks() {
        let f = fixture();
        sign_in_as(&f, "ada").await;
        f.posts.insert(post("p1", "ada", "One")).await.unwrap();
        f.posts.insert(post("p2", "ada", "Two")).await.unwrap();
        let mut hidden = post("p3", "ada", "Hidden");
        hidden.status = PostStatus::Inactive;
        f.posts.insert(hidden).await.unwrap();
        f.posts.insert(post("p4", "bob", "Other")).await.unwrap();
        f.bookmarks
            .insert(Bookmark {
                id: "b1".into(),
                user_id: "ada".into(),
                post_id: "p4".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let interactor = ProfileAuthorInteractor {
            profile_repository: f.profiles.clone(),
            post_repository: f.posts.clone(),
            bookmark_repository: f.bookmarks.clone(),
        };
        let out = author::Usecase::handle(&interactor, author::Input {
            user_id: "ada".into(),
            page: 1,
        })
        .await
        .unwrap();

        assert_eq!(out.profile.user_id.as_str(), "ada");
        assert_eq!(out.post_count, 2);
        assert_eq!(out.posts.len(), 2);
        assert_eq!(out.bookmark_count, 1);
    }
}
