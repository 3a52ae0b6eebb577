use smallvec::SmallVec;

use super::Upload;
use crate::entities::{CategoryId, PostStatus, UserId};
use crate::repositories::{Filter, ListQuery, Order};

pub const PAGE_SIZE: u32 = 10;

usecase! {
    get : {
        pub post_id: entities::PostId,
    } => {
        pub post: entities::Post,
        pub image: Option<::reqwest::Url>,
    }
}

usecase! {
    create : {
        pub draft: super::PostDraft,
    } => {
        pub post: entities::Post,
    }
}

usecase! {
    edit : {
        pub post_id: entities::PostId,
        pub mutation: super::PostEdit,
    } => {
        pub post: entities::Post,
    }
}

usecase! {
    delete : {
        pub post_id: entities::PostId,
    } => {
        pub post: entities::Post,
        /// false when the image could not be removed and was left behind.
        pub image_removed: bool,
    }
}

usecase! {
    gets : {
        pub query: super::PostQuery,
        pub page: u32,
    } => {
        pub posts: ::smallvec::SmallVec<[(u32, entities::Post); 10]>,
        pub page: u32,
        pub total: u64,
    }
}

#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    /// derived from the title when empty.
    pub slug: Option<String>,
    pub content: String,
    pub category: Option<CategoryId>,
    pub status: PostStatus,
    pub image: Option<Upload>,
}

#[derive(Debug, Clone, Default)]
pub struct PostEdit {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub category: Option<Option<CategoryId>>,
    pub status: Option<PostStatus>,
    pub image: Option<Upload>,
    pub remove_image: bool,
}

/// what a post list is narrowed by; `filter` is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostQuery {
    pub author: Option<UserId>,
    pub category: Option<CategoryId>,
    pub search: Option<String>,
    pub status: Option<PostStatus>,
    pub filter: Option<Filter>,
    pub oldest_first: bool,
}

impl PostQuery {
    /// the home feed.
    pub fn active() -> Self {
        Self {
            status: Some(PostStatus::Active),
            ..Default::default()
        }
    }

    pub fn by_user(user_id: UserId) -> Self {
        Self {
            author: Some(user_id),
            ..Default::default()
        }
    }

    pub fn in_category(category: CategoryId) -> Self {
        Self {
            category: Some(category),
            ..Self::active()
        }
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::active()
        }
    }

    pub fn to_list_query(&self, limit: u32, offset: u32) -> ListQuery {
        let PostQuery {
            author,
            category,
            search,
            status,
            filter,
            oldest_first,
        } = self;

        let mut filters = SmallVec::<[Filter; 5]>::new();

        if let Some(u) = author {
            filters.push(Filter::equal("userId", u.as_str()));
        }
        if let Some(c) = category {
            filters.push(Filter::equal("category", c.as_str()));
        }
        if let Some(t) = search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            filters.push(Filter::search("title", t));
        }
        if let Some(s) = status {
            filters.push(Filter::equal("status", s.as_str()));
        }
        if let Some(f) = filter {
            filters.push(f.clone());
        }

        let order = match oldest_first {
            true => Order::Asc("$createdAt".to_string()),
            false => Order::Desc("$createdAt".to_string()),
        };

        filters
            .into_iter()
            .fold(ListQuery::default(), ListQuery::filter)
            .order(order)
            .page(limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn search_query_keeps_active_posts_newest_first() {
        let q = PostQuery::search("  ownership ").to_list_query(PAGE_SIZE, 20);

        assert_eq!(q.filters, vec![
            Filter::search("title", "ownership"),
            Filter::equal("status", "active"),
        ]);
        assert_eq!(q.order, vec![Order::Desc("$createdAt".to_string())]);
        assert_eq!((q.limit, q.offset), (Some(10), Some(20)));
    }

    #[test]
    fn blank_search_is_ignored() {
        let q = PostQuery::search("   ").to_list_query(1, 0);

        assert_eq!(q.filters, vec![Filter::equal("status", "active")]);
    }

    #[test]
    fn raw_filter_is_passed_through() {
        let raw = Filter::Contains("content".to_string(), vec![json!("tokio")]);
        let q = PostQuery {
            filter: Some(raw.clone()),
            ..PostQuery::by_user("u1".into())
        }
        .to_list_query(5, 0);

        assert_eq!(q.filters, vec![Filter::equal("userId", "u1"), raw]);
    }
}
