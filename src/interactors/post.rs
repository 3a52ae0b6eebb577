use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;

use super::*;
use crate::entities::{FileId, Post, PostId};
use crate::repositories::{FileRepository, PostMutation, PostRepository, PreviewOptions};
use crate::usecases::post::{create, delete, edit, gets, get, PostDraft, PostEdit, PAGE_SIZE};
use crate::usecases::Upload;
use crate::utils::{slugify, AlsoChain, LetChain};

async fn upload_image(
    files: &(dyn FileRepository + Sync + Send),
    Upload { name, bytes }: Upload,
) -> Result<FileId> {
    if bytes.is_empty() {
        bail!("image `{}` is empty.", name);
    }

    let file = files
        .upload(FileId::unique(), &name, bytes)
        .await
        .map_err(file_err_fmt)?;
    tracing::trace!("uploaded - {:?}", file);

    Ok(file.id)
}

/// the post, if the signed-in user wrote it.
async fn authored(
    posts: &(dyn PostRepository + Sync + Send),
    session: &SessionStore,
    post_id: &PostId,
) -> Result<Post> {
    let user = signed_in(session)?;
    let post = posts.find(post_id).await.map_err(post_err_fmt)?;

    if post.user_id != user.user_id {
        bail!("only the author can change this post.");
    }

    Ok(post)
}

fn slug_or_title(slug: Option<&str>, title: &str) -> String {
    match slug.map(slugify).filter(|s| !s.is_empty()) {
        Some(s) => s,
        None => slugify(title),
    }
}

pub struct PostGetInteractor {
    pub post_repository: Arc<dyn PostRepository + Sync + Send>,
    pub file_repository: Arc<dyn FileRepository + Sync + Send>,
}
#[async_trait]
impl get::Usecase for PostGetInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: get::Input) -> Result<get::Output> {
        tracing::trace!("input - {:?}", data);

        let get::Input { post_id } = data;

        let post = self
            .post_repository
            .find(&post_id)
            .await
            .map_err(post_err_fmt)?;

        let image = post
            .featured_image
            .as_ref()
            .map(|id| self.file_repository.preview_url(id, &PreviewOptions::card()))
            .transpose()
            .map_err(file_err_fmt)?;

        get::Output { post, image }
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostCreateInteractor {
    pub post_repository: Arc<dyn PostRepository + Sync + Send>,
    pub file_repository: Arc<dyn FileRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl create::Usecase for PostCreateInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: create::Input) -> Result<create::Output> {
        tracing::trace!("input - {:?}", data);

        let create::Input {
            draft:
                PostDraft {
                    title,
                    slug,
                    content,
                    category,
                    status,
                    image,
                },
        } = data;

        let user = signed_in(&self.session)?;

        let title = title.trim().to_string();
        if title.is_empty() {
            bail!("title must not be empty.");
        }

        let featured_image = match image {
            Some(u) => Some(upload_image(&*self.file_repository, u).await?),
            None => None,
        };

        let now = Utc::now();
        let new_post = Post {
            id: PostId::unique(),
            slug: slug_or_title(slug.as_deref(), &title),
            title,
            content,
            featured_image,
            category,
            status,
            user_id: user.user_id,
            created_at: now,
            updated_at: now,
        };

        let can_insert = self
            .post_repository
            .insert(new_post.clone())
            .await
            .map_err(post_err_fmt)?;

        if !can_insert {
            if let Some(id) = &new_post.featured_image {
                tracing::warn!("post not created, image {} is left orphaned", id);
            }
            bail!("post id duplicated.");
        }

        create::Output { post: new_post }
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostEditInteractor {
    pub post_repository: Arc<dyn PostRepository + Sync + Send>,
    pub file_repository: Arc<dyn FileRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl edit::Usecase for PostEditInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: edit::Input) -> Result<edit::Output> {
        tracing::trace!("input - {:?}", data);

        let edit::Input {
            post_id,
            mutation:
                PostEdit {
                    title,
                    slug,
                    content,
                    category,
                    status,
                    image,
                    remove_image,
                },
        } = data;

        let post = authored(&*self.post_repository, &self.session, &post_id).await?;

        let title = title.map(|t| t.trim().to_string());
        if let Some("") = title.as_deref() {
            bail!("title must not be empty.");
        }

        let featured_image = match (image, remove_image) {
            (Some(u), _) => Some(Some(upload_image(&*self.file_repository, u).await?)),
            (None, true) => Some(None),
            (None, false) => None,
        };

        // the replaced image goes before the document is touched
        if let (Some(_), Some(old)) = (&featured_image, &post.featured_image) {
            if let Err(e) = self.file_repository.delete(old).await {
                tracing::warn!("cannot delete replaced image {}: {}", old, e);
            }
        }

        let mutation = PostMutation {
            slug: slug.map(|s| slug_or_title(Some(&s), title.as_deref().unwrap_or(&post.title))),
            title,
            content,
            featured_image,
            category,
            status,
        };

        if mutation.is_empty() {
            tracing::debug!("nothing to change");
            return Ok(edit::Output { post });
        }

        self.post_repository
            .update(&post_id, mutation)
            .await
            .map_err(post_err_fmt)?
            .let_(|post| edit::Output { post })
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }
}

pub struct PostDeleteInteractor {
    pub post_repository: Arc<dyn PostRepository + Sync + Send>,
    pub file_repository: Arc<dyn FileRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl delete::Usecase for PostDeleteInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: delete::Input) -> Result<delete::Output> {
        tracing::trace!("input - {:?}", data);

        let delete::Input { post_id } = data;

        let post = authored(&*self.post_repository, &self.session, &post_id).await?;

        self.post_repository
            .delete(&post_id)
            .await
            .map_err(post_err_fmt)?;

        let image_removed = match &post.featured_image {
            Some(id) => match self.file_repository.delete(id).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("post deleted, image {} is left orphaned: {}", id, e);
                    false
                },
            },
            None => true,
        };

        delete::Output {
            post,
            image_removed,
        }
        .also_(|o| tracing::trace!("output - {:?}", o))
        .let_(Ok)
    }
}

pub struct PostGetsInteractor {
    pub post_repository: Arc<dyn PostRepository + Sync + Send>,
}
#[async_trait]
impl gets::Usecase for PostGetsInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: gets::Input) -> Result<gets::Output> {
        tracing::trace!("input - {:?}", data);

        let gets::Input { query, page } = data;

        let (limit, offset) = calc_paging(PAGE_SIZE, page)?;

        let listed = self
            .post_repository
            .finds(query.to_list_query(limit, offset))
            .await
            .map_err(post_err_fmt)?;

        gets::Output {
            posts: numbered(listed.items, offset),
            page,
            total: listed.total,
        }
        .also_(|o| tracing::trace!("output - {:?}", o))
        .let_(Ok)
    }
}
