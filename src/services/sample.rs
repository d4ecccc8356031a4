//! Sample flows. Creating or re-imaging a sample is two calls: the image is
//! uploaded first and the returned URL is stored with the record. The pair is
//! not transactional; an upload whose record call fails is logged with its
//! URL so it can be cleaned up by hand.

use crate::domain::sample::{Sample, SampleStatus, UploadedFile};
use crate::forms::sample::{ImageUpload, SampleForm};
use crate::forms::{FormState, ResourceForm};
use crate::repository::errors::RepositoryError;
use crate::repository::{EntityReader, EntityWriter, SampleWriter};
use crate::services::entity::load_record;
use crate::services::{ServiceError, ServiceResult};

fn validate(form: &SampleForm, image: Option<&ImageUpload>) -> ServiceResult<()> {
    form.check_with_image(image)
        .map_err(|errors| ServiceError::Validation(FormState::new(form, errors)))
}

async fn upload<Repo>(repo: &Repo, image: Option<ImageUpload>) -> ServiceResult<Option<UploadedFile>>
where
    Repo: SampleWriter + ?Sized,
{
    let Some(image) = image else {
        return Ok(None);
    };
    let uploaded = repo
        .upload_image(&image.file_name, &image.content_type, image.bytes)
        .await
        .map_err(|err| {
            log::error!("Failed to upload {}: {err}", image.file_name);
            ServiceError::from(err)
        })?;
    Ok(Some(uploaded))
}

fn orphaned(uploaded: &Option<UploadedFile>, err: RepositoryError) -> ServiceError {
    match uploaded {
        Some(file) => log::error!("Sample was not saved, uploaded image {} is orphaned: {err}", file.url),
        None => log::error!("Failed to save sample: {err}"),
    }
    ServiceError::from(err)
}

pub async fn create_sample<Repo>(
    repo: &Repo,
    form: &SampleForm,
    image: Option<ImageUpload>,
) -> ServiceResult<Sample>
where
    Repo: EntityWriter<Sample> + SampleWriter + ?Sized,
{
    validate(form, image.as_ref())?;
    let mut payload = form
        .to_create()
        .map_err(|errors| ServiceError::Validation(FormState::new(form, errors)))?;

    let uploaded = upload(repo, image).await?;
    payload.image_url = uploaded.as_ref().map(|file| file.url.clone());

    repo.create(&payload)
        .await
        .map_err(|err| orphaned(&uploaded, err))
}

pub async fn update_sample<Repo>(
    repo: &Repo,
    raw_id: &str,
    form: &SampleForm,
    image: Option<ImageUpload>,
) -> ServiceResult<Sample>
where
    Repo: EntityReader<Sample> + EntityWriter<Sample> + SampleWriter + ?Sized,
{
    validate(form, image.as_ref())?;
    let current = load_record::<Sample, Repo>(repo, raw_id).await?;
    let mut payload = form
        .to_update(&current)
        .map_err(|errors| ServiceError::Validation(FormState::new(form, errors)))?;

    let uploaded = upload(repo, image).await?;
    if let Some(file) = &uploaded {
        payload.image_url = Some(file.url.clone());
    }

    repo.update(&current.id, &payload)
        .await
        .map_err(|err| orphaned(&uploaded, err))
}

/// Marks a pending sample as verified.
pub async fn verify_sample<Repo>(repo: &Repo, raw_id: &str) -> ServiceResult<()>
where
    Repo: EntityReader<Sample> + SampleWriter + ?Sized,
{
    let current = load_record::<Sample, Repo>(repo, raw_id).await?;
    if current.status == SampleStatus::Verified {
        return Err(ServiceError::InvalidTransition(format!(
            "sample {} is already verified",
            current.name
        )));
    }
    repo.verify(&current.id).await.map_err(|err| {
        log::error!("Failed to verify sample {}: {err}", current.id);
        ServiceError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::domain::entity::EntityRef;
    use crate::domain::types::EntityId;
    use crate::forms::sample::MAX_IMAGE_BYTES;
    use crate::repository::mock::MockSampleRepository;

    const ID: &str = "6f9619ff-8b86-d011-b42d-00c04fc964ff";
    const URL: &str = "https://cdn.example/uploads/swatch.png";

    fn form() -> SampleForm {
        SampleForm {
            name: "Indigo swatch".to_string(),
            fabric_id: "5a1f0c3e-2d4b-4f6a-8c9e-0b1d2e3f4a5b".to_string(),
            customer_id: "3f2504e0-4f89-11d3-9a0c-0305e82c3301".to_string(),
        }
    }

    fn png(len: usize) -> ImageUpload {
        ImageUpload {
            file_name: "swatch.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1; len],
        }
    }

    fn sample(status: SampleStatus) -> Sample {
        let reference = EntityRef {
            id: EntityId::new("3f2504e0-4f89-11d3-9a0c-0305e82c3301").unwrap(),
            name: "ref".to_string(),
        };
        Sample {
            id: EntityId::new(ID).unwrap(),
            name: "Indigo swatch".to_string(),
            fabric: reference.clone(),
            customer: reference,
            image_url: Some(URL.to_string()),
            status,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn uploads_then_creates_with_returned_url() {
        let mut repo = MockSampleRepository::new();
        repo.expect_upload_image()
            .times(1)
            .returning(|_, _, _| {
                Ok(UploadedFile {
                    url: URL.to_string(),
                })
            });
        repo.expect_create()
            .withf(|payload| payload.image_url.as_deref() == Some(URL))
            .times(1)
            .returning(|_| Ok(sample(SampleStatus::Pending)));

        create_sample(&repo, &form(), Some(png(64))).await.unwrap();
    }

    #[tokio::test]
    async fn oversized_image_is_rejected_before_upload() {
        let mut repo = MockSampleRepository::new();
        repo.expect_upload_image().times(0);
        repo.expect_create().times(0);

        let result = create_sample(&repo, &form(), Some(png(MAX_IMAGE_BYTES + 1))).await;
        match result {
            Err(ServiceError::Validation(state)) => assert!(state.errors.has("image")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_create_after_upload_is_reported() {
        let mut repo = MockSampleRepository::new();
        repo.expect_upload_image().times(1).returning(|_, _, _| {
            Ok(UploadedFile {
                url: URL.to_string(),
            })
        });
        repo.expect_create()
            .times(1)
            .returning(|_| Err(RepositoryError::BackendError("boom".to_string())));

        let result = create_sample(&repo, &form(), Some(png(64))).await;
        assert!(matches!(result, Err(ServiceError::Backend(_))));
    }

    #[tokio::test]
    async fn verify_only_pending_samples() {
        let mut pending = MockSampleRepository::new();
        pending
            .expect_get_by_id()
            .returning(|_| Ok(Arc::new(sample(SampleStatus::Pending))));
        pending.expect_verify().times(1).returning(|_| Ok(()));
        verify_sample(&pending, ID).await.unwrap();

        let mut verified = MockSampleRepository::new();
        verified
            .expect_get_by_id()
            .returning(|_| Ok(Arc::new(sample(SampleStatus::Verified))));
        verified.expect_verify().times(0);
        assert!(matches!(
            verify_sample(&verified, ID).await,
            Err(ServiceError::InvalidTransition(_))
        ));
    }
}
