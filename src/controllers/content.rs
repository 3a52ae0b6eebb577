use anyhow::Result;

use super::{read_upload, Controller, Emit};
use crate::cmds::{BookmarkMod, MediaMod, PostCreateCmd, PostEditCmd, PostMod, ProfileMod};
use crate::entities::PostStatus;
use crate::repositories::PreviewOptions;
use crate::routes::Route;
use crate::usecases::post::{PostDraft, PostEdit, PostQuery, PAGE_SIZE};
use crate::usecases::{bookmark, category, media, post, profile};
use crate::views;

impl Controller {
    pub(super) async fn post(&self, cmd: PostMod, emit: Emit<'_>) -> Result<()> {
        let u = &self.content;

        let (query, page) = match cmd {
            PostMod::Get { post_id } => {
                let res = u.post_get.handle(post::get::Input { post_id }).await;

                return match res {
                    Ok(post::get::Output { post, image }) => {
                        emit(views::post(&post, image.as_ref()));
                        Ok(())
                    },
                    Err(e) => {
                        emit(views::redirect(&Route::Home));
                        Err(e)
                    },
                };
            },

            PostMod::Create(PostCreateCmd {
                title,
                content,
                slug,
                category,
                status,
                image,
            }) => {
                let image = match image {
                    Some(p) => Some(read_upload(&p).await?),
                    None => None,
                };

                let post::create::Output { post } = u
                    .post_create
                    .handle(post::create::Input {
                        draft: PostDraft {
                            title,
                            slug,
                            content,
                            category,
                            status,
                            image,
                        },
                    })
                    .await?;

                emit(views::post_line(1, &post));
                emit(views::redirect(&Route::Post(post.id)));
                return Ok(());
            },

            PostMod::Edit(PostEditCmd {
                post_id,
                title,
                content,
                slug,
                category,
                no_category,
                status,
                image,
                remove_image,
            }) => {
                let image = match image {
                    Some(p) => Some(read_upload(&p).await?),
                    None => None,
                };
                let category = match (category, no_category) {
                    (_, true) => Some(None),
                    (Some(c), false) => Some(Some(c)),
                    (None, false) => None,
                };

                let post::edit::Output { post } = u
                    .post_edit
                    .handle(post::edit::Input {
                        post_id,
                        mutation: PostEdit {
                            title,
                            slug,
                            content,
                            category,
                            status,
                            image,
                            remove_image,
                        },
                    })
                    .await?;

                emit(views::post(&post, None));
                return Ok(());
            },

            PostMod::Delete { post_id } => {
                let post::delete::Output {
                    post,
                    image_removed,
                } = u.post_delete.handle(post::delete::Input { post_id }).await?;

                emit(format!("deleted \"{}\".", post.title));
                if !image_removed {
                    emit("the featured image could not be removed and was left in storage.".to_string());
                }
                emit(views::redirect(&Route::Home));
                return Ok(());
            },

            PostMod::List {
                page,
                query,
                all,
                oldest_first,
            } => (
                PostQuery {
                    status: match all {
                        true => None,
                        false => Some(PostStatus::Active),
                    },
                    filter: query,
                    oldest_first,
                    ..Default::default()
                },
                page,
            ),
            PostMod::ByUser { user_id, page } => (PostQuery::by_user(user_id), page),
            PostMod::Search { term, page } => (PostQuery::search(term), page),
            PostMod::Category { category_id, page } => (PostQuery::in_category(category_id), page),
        };

        let post::gets::Output { posts, page, total } =
            u.post_gets.handle(post::gets::Input { query, page }).await?;

        for (n, p) in posts.iter() {
            emit(views::post_line(*n, p));
        }
        emit(views::page_footer(page, PAGE_SIZE, posts.len(), total));

        Ok(())
    }

    pub(super) async fn bookmark(&self, cmd: BookmarkMod, emit: Emit<'_>) -> Result<()> {
        let u = &self.content;

        match cmd {
            BookmarkMod::Status { post_id } => {
                let bookmark::status::Output { bookmark } = u
                    .bookmark_status
                    .handle(bookmark::status::Input {
                        post_id: post_id.clone(),
                    })
                    .await?;

                emit(match bookmark {
                    Some(b) => format!("{} is bookmarked (since {}).", post_id, b.created_at.format("%Y-%m-%d")),
                    None => format!("{} is not bookmarked.", post_id),
                });
            },

            BookmarkMod::Toggle { post_id } => {
                let bookmark::toggle::Output { bookmarked } = u
                    .bookmark_toggle
                    .handle(bookmark::toggle::Input {
                        post_id: post_id.clone(),
                    })
                    .await?;

                emit(match bookmarked {
                    true => format!("bookmarked {}.", post_id),
                    false => format!("removed bookmark on {}.", post_id),
                });
            },

            BookmarkMod::List { page, user_id } => {
                let bookmark::gets::Output {
                    bookmarks,
                    page,
                    total,
                } = u
                    .bookmark_gets
                    .handle(bookmark::gets::Input { user_id, page })
                    .await?;

                for (n, b) in bookmarks.iter() {
                    emit(views::bookmark_line(*n, b));
                }
                emit(views::page_footer(page, PAGE_SIZE, bookmarks.len(), total));
            },

            BookmarkMod::Posts { page } => {
                let bookmark::posts::Output {
                    posts,
                    skipped,
                    page,
                } = u
                    .bookmark_posts
                    .handle(bookmark::posts::Input { page })
                    .await?;

                let first = (page - 1) * PAGE_SIZE + 1;
                for (i, p) in posts.iter().enumerate() {
                    emit(views::post_line(first + i as u32, p));
                }
                if skipped > 0 {
                    emit(format!("({} bookmarked posts no longer exist)", skipped));
                }
                if posts.is_empty() && skipped == 0 {
                    emit(format!("page {} (nothing here)", page));
                }
            },
        }

        Ok(())
    }

    pub(super) async fn profile(&self, cmd: ProfileMod, emit: Emit<'_>) -> Result<()> {
        let u = &self.content;

        match cmd {
            ProfileMod::Get { user_id } => {
                let profile::get::Output { profile } = u
                    .profile_get
                    .handle(profile::get::Input { user_id })
                    .await?;

                emit(views::profile(&profile));
            },

            ProfileMod::Author { user_id, page } => {
                let profile::author::Output {
                    profile,
                    posts,
                    post_count,
                    bookmark_count,
                    page,
                } = u
                    .profile_author
                    .handle(profile::author::Input { user_id, page })
                    .await?;

                emit(views::profile(&profile));
                emit(format!("  posts    : {}\n  bookmarks: {}", post_count, bookmark_count));
                for (n, p) in posts.iter() {
                    emit(views::post_line(*n, p));
                }
                emit(views::page_footer(page, PAGE_SIZE, posts.len(), post_count));
            },
        }

        Ok(())
    }

    pub(super) async fn categories(&self, emit: Emit<'_>) -> Result<()> {
        let category::gets::Output { categories } = self
            .content
            .category_gets
            .handle(category::gets::Input {})
            .await?;

        for c in categories.iter() {
            emit(views::category(c));
        }

        Ok(())
    }

    pub(super) async fn media(&self, cmd: MediaMod, emit: Emit<'_>) -> Result<()> {
        let u = &self.content;

        match cmd {
            MediaMod::Upload { path } => {
                let file = read_upload(&path).await?;

                let media::upload::Output { file, preview } = u
                    .media_upload
                    .handle(media::upload::Input { file })
                    .await?;

                emit(views::stored_file(&file, &preview));
            },

            MediaMod::Preview {
                file_id,
                width,
                height,
                gravity,
                quality,
                output,
            } => {
                let media::preview::Output { url } = u
                    .media_preview
                    .handle(media::preview::Input {
                        file_id,
                        options: PreviewOptions {
                            width,
                            height,
                            gravity,
                            quality,
                            output,
                        },
                    })
                    .await?;

                emit(url.to_string());
            },

            MediaMod::Delete { file_id } => {
                u.media_delete
                    .handle(media::delete::Input {
                        file_id: file_id.clone(),
                    })
                    .await?;

                emit(format!("deleted file {}.", file_id));
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::run;
    use crate::constructors::in_memory;

    async fn signed_up() -> crate::controllers::Controller {
        let (c, accounts) = crate::constructors::in_memory_with_accounts(crate::config::test_config());

        run(&c, "account sign-up --name 'Ada Lovelace' --email ada@example.com --password hunter2hunter2")
            .await
            .unwrap();
        let link = accounts.outbox().await.pop().unwrap().link;
        let pairs = link.query_pairs().into_owned().collect::<Vec<_>>();
        c.account
            .complete_verification
            .handle(crate::usecases::account::complete_verification::Input {
                user_id: Some(pairs[0].1.as_str().into()),
                secret: Some(pairs[1].1.clone()),
            })
            .await
            .unwrap();

        c
    }

    #[tokio::test]
    async fn write_list_bookmark_and_delete() {
        let c = signed_up().await;

        let out = run(&c, "post create --title 'Hello, World!' --content '<p>first &amp; foremost</p>' --category rust")
            .await
            .unwrap();
        let id = out[1].trim_start_matches("-> /post/").to_string();

        let out = run(&c, "post list").await.unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].contains("Hello, World!"));
        assert!(out[0].ends_with("first & foremost"));
        assert_eq!(out[1], "page 1 (1..=1 of 1)");

        let out = run(&c, &format!("bookmark toggle {}", id)).await.unwrap();
        assert_eq!(out, vec![format!("bookmarked {}.", id)]);
        let out = run(&c, "bookmark posts").await.unwrap();
        assert!(out[0].contains("Hello, World!"));

        let out = run(&c, &format!("post delete {}", id)).await.unwrap();
        assert_eq!(out[0], "deleted \"Hello, World!\".");

        let out = run(&c, "bookmark posts").await.unwrap();
        assert_eq!(out, vec!["(1 bookmarked posts no longer exist)".to_string()]);
    }

    #[tokio::test]
    async fn missing_post_points_home() {
        let c = in_memory(crate::config::test_config());

        let mut out = vec![];
        let res = c
            .handle(super::super::testing::line("post get nope"), &mut |s: String| out.push(s))
            .await;

        assert_eq!(res.unwrap_err().to_string(), "cannot find post.");
        assert_eq!(out, vec!["-> /".to_string()]);
    }

    #[tokio::test]
    async fn categories_and_search_are_public() {
        let c = in_memory(crate::config::test_config());

        let out = run(&c, "categories").await.unwrap();
        assert!(out.is_empty());

        let out = run(&c, "post search tokio").await.unwrap();
        assert_eq!(out, vec!["page 1 (nothing here, 0 in total)".to_string()]);
    }
}
