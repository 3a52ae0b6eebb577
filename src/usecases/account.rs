usecase! {
    sign_up : {
        pub name: String,
        pub email: String,
        pub password: String,
    } => {
        pub profile: entities::UserProfile,
    }
}

usecase! {
    sign_in : {
        pub email: String,
        pub password: String,
    } => {
        pub profile: entities::UserProfile,
    }
}

usecase! {
    sign_out : {} => {}
}

usecase! {
    check : {} => {
        pub state: crate::session::GuardState,
        pub profile: Option<entities::UserProfile>,
    }
}

usecase! {
    request_verification : {} => {
        pub email: String,
    }
}

usecase! {
    complete_verification : {
        pub user_id: Option<entities::UserId>,
        pub secret: Option<String>,
    } => {
        pub profile: entities::UserProfile,
    }
}

usecase! {
    request_recovery : {
        pub email: String,
    } => {}
}

usecase! {
    reset_password : {
        pub user_id: Option<entities::UserId>,
        pub secret: Option<String>,
        pub password: String,
        pub confirm: String,
    } => {}
}

usecase! {
    change_password : {
        pub old_password: String,
        pub password: String,
    } => {}
}

usecase! {
    update_name : {
        pub name: String,
    } => {
        pub profile: entities::UserProfile,
    }
}

usecase! {
    deactivate : {} => {}
}

usecase! {
    oauth_url : {
        pub provider: entities::Provider,
    } => {
        pub url: ::reqwest::Url,
    }
}

usecase! {
    complete_oauth : {
        pub provider: entities::Provider,
    } => {
        pub profile: entities::UserProfile,
        pub created: bool,
    }
}

pub const MIN_PASSWORD_LEN: usize = 8;
