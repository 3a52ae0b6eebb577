use serde_json::{json, Map, Value};

use super::models::{
    AccountModel, BookmarkModel, CategoryModel, Document, FileModel, PostModel, ProfileModel,
};
use crate::repositories::{Filter, ListQuery, Order, PostMutation, ProfileMutation};
use crate::entities::{Account, Bookmark, Category, Post, StoredFile, UserProfile};

impl From<Document<PostModel>> for Post {
    fn from(
        Document {
            id,
            created_at,
            updated_at,
            data,
        }: Document<PostModel>,
    ) -> Self {
        let PostModel {
            title,
            slug,
            content,
            featured_image,
            category,
            status,
            user_id,
        } = data;

        Post {
            id: id.into(),
            title,
            slug,
            content,
            featured_image: featured_image.filter(|s| !s.is_empty()).map(Into::into),
            category: category.filter(|s| !s.is_empty()).map(Into::into),
            status,
            user_id: user_id.into(),
            created_at,
            updated_at,
        }
    }
}

impl From<&Post> for PostModel {
    fn from(post: &Post) -> Self {
        PostModel {
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            featured_image: post.featured_image.as_ref().map(|i| i.0.clone()),
            category: post.category.as_ref().map(|i| i.0.clone()),
            status: post.status,
            user_id: post.user_id.0.clone(),
        }
    }
}

impl From<Document<BookmarkModel>> for Bookmark {
    fn from(Document { id, data, .. }: Document<BookmarkModel>) -> Self {
        Bookmark {
            id: id.into(),
            user_id: data.user_id.into(),
            post_id: data.post_id.into(),
            created_at: data.created_at,
        }
    }
}

impl From<&Bookmark> for BookmarkModel {
    fn from(b: &Bookmark) -> Self {
        BookmarkModel {
            user_id: b.user_id.0.clone(),
            post_id: b.post_id.0.clone(),
            created_at: b.created_at,
        }
    }
}

impl From<Document<ProfileModel>> for UserProfile {
    fn from(Document { created_at, data, .. }: Document<ProfileModel>) -> Self {
        let ProfileModel {
            user_id,
            username,
            full_name,
            email,
            email_verified,
            avatar_url,
            provider,
        } = data;

        UserProfile {
            user_id: user_id.into(),
            username,
            full_name,
            email,
            email_verified,
            avatar_url,
            provider: provider
                .parse()
                .unwrap_or_else(|e: ::core::convert::Infallible| match e {}),
            created_at,
        }
    }
}

impl From<&UserProfile> for ProfileModel {
    fn from(p: &UserProfile) -> Self {
        ProfileModel {
            user_id: p.user_id.0.clone(),
            username: p.username.clone(),
            full_name: p.full_name.clone(),
            email: p.email.clone(),
            email_verified: p.email_verified,
            avatar_url: p.avatar_url.clone(),
            provider: p.provider.to_string(),
        }
    }
}

impl From<Document<CategoryModel>> for Category {
    fn from(Document { id, data, .. }: Document<CategoryModel>) -> Self {
        Category {
            id: id.into(),
            name: data.name,
            slug: data.slug,
        }
    }
}

impl From<AccountModel> for Account {
    fn from(m: AccountModel) -> Self {
        Account {
            id: m.id.into(),
            name: m.name,
            email: m.email,
            email_verified: m.email_verification,
            registration: m.registration,
        }
    }
}

impl From<FileModel> for StoredFile {
    fn from(m: FileModel) -> Self {
        StoredFile {
            id: m.id.into(),
            name: m.name,
            mime_type: m.mime_type,
            size: m.size_original,
        }
    }
}

/// only the touched attributes; `Some(None)` clears one with `null`.
impl From<PostMutation> for Value {
    fn from(
        PostMutation {
            title,
            slug,
            content,
            featured_image,
            category,
            status,
        }: PostMutation,
    ) -> Self {
        let mut data = Map::new();

        if let Some(v) = title {
            data.insert("title".to_string(), v.into());
        }
        if let Some(v) = slug {
            data.insert("slug".to_string(), v.into());
        }
        if let Some(v) = content {
            data.insert("content".to_string(), v.into());
        }
        if let Some(v) = featured_image {
            data.insert(
                "featuredImage".to_string(),
                v.map(|i| Value::String(i.0)).unwrap_or(Value::Null),
            );
        }
        if let Some(v) = category {
            data.insert(
                "category".to_string(),
                v.map(|i| Value::String(i.0)).unwrap_or(Value::Null),
            );
        }
        if let Some(v) = status {
            data.insert("status".to_string(), v.as_str().into());
        }

        Value::Object(data)
    }
}

impl From<ProfileMutation> for Value {
    fn from(
        ProfileMutation {
            username,
            full_name,
            email_verified,
            avatar_url,
        }: ProfileMutation,
    ) -> Self {
        let mut data = Map::new();

        if let Some(v) = username {
            data.insert("username".to_string(), v.into());
        }
        if let Some(v) = full_name {
            data.insert("fullName".to_string(), v.into());
        }
        if let Some(v) = email_verified {
            data.insert("emailVerified".to_string(), v.into());
        }
        if let Some(v) = avatar_url {
            data.insert(
                "avatarUrl".to_string(),
                v.map(Value::String).unwrap_or(Value::Null),
            );
        }

        Value::Object(data)
    }
}

impl From<&Filter> for Value {
    fn from(f: &Filter) -> Self {
        match f {
            Filter::Equal(a, vs) => json!({ "method": "equal", "attribute": a, "values": vs }),
            Filter::NotEqual(a, vs) => json!({ "method": "notEqual", "attribute": a, "values": vs }),
            Filter::Contains(a, vs) => json!({ "method": "contains", "attribute": a, "values": vs }),
            Filter::Search(a, t) => json!({ "method": "search", "attribute": a, "values": [t] }),
            Filter::And(fs) => json!({
                "method": "and",
                "values": fs.iter().map(Value::from).collect::<Vec<_>>()
            }),
            Filter::Or(fs) => json!({
                "method": "or",
                "values": fs.iter().map(Value::from).collect::<Vec<_>>()
            }),
        }
    }
}

/// `queries[]` values, one serialized query each.
pub fn to_queries(
    ListQuery {
        filters,
        order,
        limit,
        offset,
    }: &ListQuery,
) -> Vec<String> {
    let mut v = filters.iter().map(Value::from).collect::<Vec<_>>();

    v.extend(order.iter().map(|o| match o {
        Order::Asc(a) => json!({ "method": "orderAsc", "attribute": a }),
        Order::Desc(a) => json!({ "method": "orderDesc", "attribute": a }),
    }));
    if let Some(n) = limit {
        v.push(json!({ "method": "limit", "values": [n] }));
    }
    if let Some(n) = offset {
        v.push(json!({ "method": "offset", "values": [n] }));
    }

    let queries = v.iter().map(Value::to_string).collect::<Vec<_>>();
    tracing::trace!("queries - {:?}", queries);

    queries
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::entities::{FileId, PostStatus};

    #[test]
    fn nested_filters_serialize_as_query_objects() {
        let q = ListQuery::default()
            .filter(Filter::Or(vec![
                Filter::equal("category", "rust"),
                Filter::search("title", "async"),
            ]))
            .order(Order::Desc("$createdAt".to_string()))
            .page(10, 20);

        let got = to_queries(&q)
            .iter()
            .map(|s| serde_json::from_str::<Value>(s).unwrap())
            .collect::<Vec<_>>();

        assert_eq!(got, vec![
            json!({
                "method": "or",
                "values": [
                    { "method": "equal", "attribute": "category", "values": ["rust"] },
                    { "method": "search", "attribute": "title", "values": ["async"] }
                ]
            }),
            json!({ "method": "orderDesc", "attribute": "$createdAt" }),
            json!({ "method": "limit", "values": [10] }),
            json!({ "method": "offset", "values": [20] }),
        ]);
    }

    #[test]
    fn mutation_only_sends_touched_fields() {
        let m = PostMutation {
            title: Some("New".to_string()),
            featured_image: Some(None),
            ..Default::default()
        };

        assert_eq!(
            Value::from(m),
            json!({ "title": "New", "featuredImage": null })
        );

        let m = PostMutation {
            featured_image: Some(Some(FileId::from("f2"))),
            status: Some(PostStatus::Inactive),
            ..Default::default()
        };

        assert_eq!(
            Value::from(m),
            json!({ "featuredImage": "f2", "status": "inactive" })
        );
    }

    #[test]
    fn post_document_decodes_with_system_fields() {
        let raw = json!({
            "$id": "p1",
            "$collectionId": "posts",
            "$databaseId": "blog",
            "$createdAt": "2024-05-01T10:00:00.000+00:00",
            "$updatedAt": "2024-05-02T10:00:00.000+00:00",
            "$permissions": [],
            "title": "Hello",
            "slug": "hello",
            "content": "<p>hi</p>",
            "featuredImage": "",
            "category": "rust",
            "status": "active",
            "userId": "u1"
        });

        let post: Post = serde_json::from_value::<Document<PostModel>>(raw)
            .unwrap()
            .into();

        assert_eq!(post.id.as_str(), "p1");
        assert_eq!(post.featured_image, None);
        assert_eq!(post.category.as_ref().map(|c| c.as_str()), Some("rust"));
        assert!(post.updated_at > post.created_at);
        assert!(post.created_at < Utc::now());
    }
}
