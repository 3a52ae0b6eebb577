usecase! {
    gets : {} => {
        pub categories: Vec<entities::Category>,
    }
}
