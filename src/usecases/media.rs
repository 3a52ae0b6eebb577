usecase! {
    upload : {
        pub file: super::super::Upload,
    } => {
        pub file: entities::StoredFile,
        pub preview: ::reqwest::Url,
    }
}

usecase! {
    preview : {
        pub file_id: entities::FileId,
        pub options: crate::repositories::PreviewOptions,
    } => {
        pub url: ::reqwest::Url,
    }
}

usecase! {
    delete : {
        pub file_id: entities::FileId,
    } => {}
}
