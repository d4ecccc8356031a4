#[cfg(feature = "server")]
use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::sample::{NewSample, Sample};
use crate::domain::types::EntityName;
use crate::forms::{FieldErrors, ResourceForm};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const IMAGE_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
/// Text fields of the sample sheet. The image travels separately as an
/// [`ImageUpload`].
pub struct SampleForm {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
    pub fabric_id: String,
    pub customer_id: String,
}

/// Image file picked in the sample sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Size and MIME type checks run before the file is uploaded.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.bytes.len() > MAX_IMAGE_BYTES {
            errors.add("image", "Images must be 5 MiB or smaller");
        }
        if !IMAGE_TYPES.contains(&self.content_type.as_str()) {
            errors.add("image", "Upload a PNG, JPEG or WebP image");
        }
        errors
    }
}

impl SampleForm {
    fn payload(&self, image_url: Option<String>) -> Result<NewSample, FieldErrors> {
        let mut errors = FieldErrors::from_validation(self.validate());

        let name = errors.check("name", EntityName::new(&self.name), "Name is required");
        let fabric_id = errors.id("fabric_id", &self.fabric_id, "fabric");
        let customer_id = errors.id("customer_id", &self.customer_id, "customer");

        let (Some(name), Some(fabric_id), Some(customer_id)) = (name, fabric_id, customer_id)
        else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(NewSample {
            name,
            fabric_id,
            customer_id,
            image_url,
        })
    }

    /// Validates the text fields together with an optional image so a single
    /// re-render shows every problem.
    pub fn check_with_image(&self, image: Option<&ImageUpload>) -> Result<(), FieldErrors> {
        let mut errors = match self.payload(None) {
            Ok(_) => FieldErrors::new(),
            Err(errors) => errors,
        };
        if let Some(image) = image {
            errors.merge(image.validate());
        }
        errors.into_result()
    }
}

impl ResourceForm<Sample> for SampleForm {
    fn from_record(record: &Sample) -> Self {
        Self {
            name: record.name.clone(),
            fabric_id: record.fabric.id.to_string(),
            customer_id: record.customer.id.to_string(),
        }
    }

    fn to_create(&self) -> Result<NewSample, FieldErrors> {
        self.payload(None)
    }

    /// Keeps the current image; a new upload replaces it afterwards.
    fn to_update(&self, current: &Sample) -> Result<NewSample, FieldErrors> {
        self.payload(current.image_url.clone())
    }
}

#[cfg(feature = "server")]
#[derive(MultipartForm)]
/// Multipart body of the sample sheet.
pub struct SampleUploadForm {
    pub name: Option<Text<String>>,
    pub fabric_id: Option<Text<String>>,
    pub customer_id: Option<Text<String>>,
    #[multipart(limit = "6MB")]
    pub image: Option<TempFile>,
}

#[cfg(feature = "server")]
impl SampleUploadForm {
    /// Splits the body into its text form and the picked image. Browsers
    /// send an empty part when no file is chosen; that counts as no image.
    pub fn into_parts(self) -> std::io::Result<(SampleForm, Option<ImageUpload>)> {
        let text = |field: Option<Text<String>>| field.map(Text::into_inner).unwrap_or_default();
        let form = SampleForm {
            name: text(self.name),
            fabric_id: text(self.fabric_id),
            customer_id: text(self.customer_id),
        };

        let image = match self.image {
            Some(file) if file.size > 0 => Some(ImageUpload {
                file_name: file.file_name.clone().unwrap_or_else(|| "image".to_string()),
                content_type: file
                    .content_type
                    .as_ref()
                    .map(|mime| mime.essence_str().to_string())
                    .unwrap_or_default(),
                bytes: std::fs::read(file.file.path())?,
            }),
            _ => None,
        };

        Ok((form, image))
    }
}
