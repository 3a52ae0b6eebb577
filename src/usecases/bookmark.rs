usecase! {
    status : {
        pub post_id: entities::PostId,
    } => {
        pub bookmark: Option<entities::Bookmark>,
    }
}

usecase! {
    toggle : {
        pub post_id: entities::PostId,
    } => {
        pub bookmarked: bool,
    }
}

usecase! {
    gets : {
        pub user_id: Option<entities::UserId>,
        pub page: u32,
    } => {
        pub bookmarks: ::smallvec::SmallVec<[(u32, entities::Bookmark); 10]>,
        pub page: u32,
        pub total: u64,
    }
}

usecase! {
    posts : {
        pub page: u32,
    } => {
        pub posts: Vec<entities::Post>,
        /// bookmarks whose post no longer exists.
        pub skipped: u32,
        pub page: u32,
    }
}
