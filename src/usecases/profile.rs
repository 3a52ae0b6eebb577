usecase! {
    get : {
        pub user_id: Option<entities::UserId>,
    } => {
        pub profile: entities::UserProfile,
    }
}

usecase! {
    author : {
        pub user_id: entities::UserId,
        pub page: u32,
    } => {
        pub profile: entities::UserProfile,
        pub posts: ::smallvec::SmallVec<[(u32, entities::Post); 10]>,
        pub post_count: u64,
        pub bookmark_count: u64,
        pub page: u32,
    }
}
