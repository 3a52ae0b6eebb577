use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use super::*;
use crate::entities::{Bookmark, BookmarkId, PostId, UserId};
use crate::repositories::{BookmarkRepository, Filter, ListQuery, Order, PostRepository};
use crate::usecases::bookmark::{gets, posts, status, toggle};
use crate::usecases::post::PAGE_SIZE;
use crate::utils::{AlsoChain, LetChain};

fn of(user_id: &UserId, post_id: Option<&PostId>) -> ListQuery {
    let q = ListQuery::default()
        .filter(Filter::equal("userId", user_id.as_str()))
        .order(Order::Desc("$createdAt".to_string()));

    match post_id {
        Some(p) => q.filter(Filter::equal("postId", p.as_str())),
        None => q,
    }
}

pub struct BookmarkStatusInteractor {
    pub bookmark_repository: Arc<dyn BookmarkRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl status::Usecase for BookmarkStatusInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: status::Input) -> Result<status::Output> {
        tracing::trace!("input - {:?}", data);

        let status::Input { post_id } = data;
        let user = signed_in(&self.session)?;

        self.bookmark_repository
            .finds(of(&user.user_id, Some(&post_id)))
            .await
            .map_err(bookmark_err_fmt)?
            .items
            .into_iter()
            .next()
            .let_(|bookmark| status::Output { bookmark })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

/// check-then-write; two toggles racing may leave two records behind.
pub struct BookmarkToggleInteractor {
    pub bookmark_repository: Arc<dyn BookmarkRepository + Sync + Send>,
    pub post_repository: Arc<dyn PostRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl toggle::Usecase for BookmarkToggleInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: toggle::Input) -> Result<toggle::Output> {
        tracing::trace!("input - {:?}", data);

        let toggle::Input { post_id } = data;
        let user = signed_in(&self.session)?;

        let existing = self
            .bookmark_repository
            .finds(of(&user.user_id, Some(&post_id)))
            .await
            .map_err(bookmark_err_fmt)?
            .items;

        if existing.len() > 1 {
            tracing::warn!(
                "{} bookmarks of {} on {}, removing all",
                existing.len(),
                user.user_id,
                post_id
            );
        }

        let bookmarked = match existing.is_empty() {
            false => {
                for b in existing {
                    self.bookmark_repository
                        .delete(&b.id)
                        .await
                        .map_err(bookmark_err_fmt)?;
                }

                false
            },
            true => {
                self.post_repository
                    .find(&post_id)
                    .await
                    .map_err(post_err_fmt)?;

                let can_insert = self
                    .bookmark_repository
                    .insert(Bookmark {
                        id: BookmarkId::unique(),
                        user_id: user.user_id,
                        post_id,
                        created_at: Utc::now(),
                    })
                    .await
                    .map_err(bookmark_err_fmt)?;

                if !can_insert {
                    tracing::warn!("bookmark id collided, nothing written");
                }

                can_insert
            },
        };

        toggle::Output { bookmarked }
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct BookmarkGetsInteractor {
    pub bookmark_repository: Arc<dyn BookmarkRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl gets::Usecase for BookmarkGetsInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: gets::Input) -> Result<gets::Output> {
        tracing::trace!("input - {:?}", data);

        let gets::Input { user_id, page } = data;

        let user_id = match user_id {
            Some(u) => u,
            None => signed_in(&self.session)?.user_id,
        };
        let (limit, offset) = calc_paging(PAGE_SIZE, page)?;

        let listed = self
            .bookmark_repository
            .finds(of(&user_id, None).page(limit, offset))
            .await
            .map_err(bookmark_err_fmt)?;

        gets::Output {
            bookmarks: numbered(listed.items, offset),
            page,
            total: listed.total,
        }
        .also_(|o| tracing::trace!("output - {:?}", o))
        .let_(Ok)
    }
}

pub struct BookmarkPostsInteractor {
    pub bookmark_repository: Arc<dyn BookmarkRepository + Sync + Send>,
    pub post_repository: Arc<dyn PostRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl posts::Usecase for BookmarkPostsInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: posts::Input) -> Result<posts::Output> {
        tracing::trace!("input - {:?}", data);

        let posts::Input { page } = data;
        let user = signed_in(&self.session)?;
        let (limit, offset) = calc_paging(PAGE_SIZE, page)?;

        let bookmarks = self
            .bookmark_repository
            .finds(of(&user.user_id, None).page(limit, offset))
            .await
            .map_err(bookmark_err_fmt)?
            .items;

        let mut posts = Vec::with_capacity(bookmarks.len());
        let mut skipped = 0;
        for b in bookmarks {
            match self.post_repository.find(&b.post_id).await {
                Ok(p) => posts.push(p),
                Err(RepositoryError::NotFound) => {
                    tracing::debug!("bookmarked post {} is gone", b.post_id);
                    skipped += 1;
                },
                Err(e) => return Err(post_err_fmt(e)),
            }
        }

        posts::Output {
            posts,
            skipped,
            page,
        }
        .also_(|o| tracing::trace!("output - {:?}", o))
        .let_(Ok)
    }
}
