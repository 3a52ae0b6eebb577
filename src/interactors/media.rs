use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::*;
use crate::entities::FileId;
use crate::repositories::{FileRepository, PreviewOptions};
use crate::usecases::media::{delete, preview, upload};
use crate::utils::{AlsoChain, LetChain};

pub struct MediaUploadInteractor {
    pub file_repository: Arc<dyn FileRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl upload::Usecase for MediaUploadInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: upload::Input) -> Result<upload::Output> {
        tracing::trace!("input - {:?}", data);

        let upload::Input { file } = data;
        signed_in(&self.session)?;

        if file.bytes.is_empty() {
            bail!("file `{}` is empty.", file.name);
        }

        let stored = self
            .file_repository
            .upload(FileId::unique(), &file.name, file.bytes)
            .await
            .map_err(file_err_fmt)?;

        let preview = self
            .file_repository
            .preview_url(&stored.id, &PreviewOptions::card())
            .map_err(file_err_fmt)?;

        upload::Output {
            file: stored,
            preview,
        }
        .also_(|o| tracing::trace!("output - {:?}", o))
        .let_(Ok)
    }
}

pub struct MediaPreviewInteractor {
    pub file_repository: Arc<dyn FileRepository + Sync + Send>,
}
#[async_trait]
impl preview::Usecase for MediaPreviewInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: preview::Input) -> Result<preview::Output> {
        tracing::trace!("input - {:?}", data);

        let preview::Input { file_id, options } = data;

        self.file_repository
            .preview_url(&file_id, &options)
            .map_err(file_err_fmt)?
            .let_(|url| preview::Output { url })
            .let_(Ok)
    }
}

pub struct MediaDeleteInteractor {
    pub file_repository: Arc<dyn FileRepository + Sync + Send>,
    pub session: Arc<SessionStore>,
}
#[async_trait]
impl delete::Usecase for MediaDeleteInteractor {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, data: delete::Input) -> Result<delete::Output> {
        tracing::trace!("input - {:?}", data);

        let delete::Input { file_id } = data;
        signed_in(&self.session)?;

        self.file_repository
            .delete(&file_id)
            .await
            .map_err(file_err_fmt)?;

        Ok(delete::Output {})
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{fixture, sign_in_as};
    use super::*;
    use crate::repositories::{Gravity, ImageFormat};
    use crate::usecases::Upload;

    #[tokio::test]
    async fn upload_preview_delete() {
        let f = fixture();
        sign_in_as(&f, "ada").await;

        let out = upload::Usecase::handle(
            &MediaUploadInteractor {
                file_repository: f.files.clone(),
                session: f.session.clone(),
            },
            upload::Input {
                file: Upload {
                    name: "cover.JPG".to_string(),
                    bytes: vec![0xff, 0xd8, 0xff],
                },
            },
        )
        .await
        .unwrap();
        assert_eq!(out.file.mime_type, "image/jpeg");
        assert_eq!(out.file.size, 3);
        assert!(out.preview.query().unwrap().contains("width=800"));

        let url = preview::Usecase::handle(
            &MediaPreviewInteractor {
                file_repository: f.files.clone(),
            },
            preview::Input {
                file_id: out.file.id.clone(),
                options: PreviewOptions {
                    width: Some(320),
                    gravity: Some(Gravity::TopLeft),
                    output: Some(ImageFormat::Png),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap()
        .url;
        assert_eq!(url.query(), Some("width=320&gravity=top-left&output=png"));

        let deleter = MediaDeleteInteractor {
            file_repository: f.files.clone(),
            session: f.session.clone(),
        };
        delete::Usecase::handle(&deleter, delete::Input {
            file_id: out.file.id.clone(),
        })
        .await
        .unwrap();
        assert!(!f.files.contains(&out.file.id).await);

        let e = delete::Usecase::handle(&deleter, delete::Input {
            file_id: out.file.id,
        })
        .await
        .unwrap_err();
        assert_eq!(e.to_string(), "cannot find file.");
    }
}
