//! Property registration form: the draft, its schema, attached images and submission.

use std::{collections::BTreeSet, fmt, path::Path, sync::LazyLock, time::Duration};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use shared::{
    domain::{Amenity, PropertyId, PropertyType},
    protocol::{ImagePayload, PropertySubmission},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    validation::{FieldErrors, FieldSource, FieldValue, FileConstraint, FileFacts, Rule, Schema},
    with_timeout, ClientError, PropertySubmitter,
};

pub mod fields {
    pub const PROPERTY_NAME: &str = "propertyName";
    pub const ADDRESS: &str = "address";
    pub const BEDROOMS: &str = "bedrooms";
    pub const BATHROOMS: &str = "bathrooms";
    pub const PROPERTY_TYPE: &str = "propertyType";
    pub const AMENITIES: &str = "amenities";
    pub const DESCRIPTION: &str = "description";
    pub const PRICE: &str = "price";
    pub const CONTACT_EMAIL: &str = "contactEmail";
    pub const CONTACT_PHONE: &str = "contactPhone";
    pub const IMAGES: &str = "images";
}

pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
pub const MAX_IMAGES: usize = 5;
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

// Dot-separated atoms; the character before `@` may not be `'`.
const EMAIL_PATTERN: &str =
    r"^([A-Za-z0-9_'+\-]+\.)*[A-Za-z0-9_'+\-]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$";
const PHONE_PATTERN: &str = r"^\+?[1-9]\d{1,14}$";

const SUBMIT_FAILED_MESSAGE: &str = "Unable to register property. Please try again.";

static PROPERTY_SCHEMA: LazyLock<Schema> = LazyLock::new(property_schema);

pub fn property_schema() -> Schema {
    let email = Regex::new(EMAIL_PATTERN).expect("email pattern is valid");
    let phone = Regex::new(PHONE_PATTERN).expect("phone pattern is valid");

    Schema::new()
        .field(fields::PROPERTY_NAME, [Rule::required("Property name is required")])
        .field(fields::ADDRESS, [Rule::required("Address is required")])
        .field(
            fields::BEDROOMS,
            [
                Rule::at_least(1.0, "At least 1 bedroom is required"),
                Rule::at_most(f64::from(u32::MAX), "Too many bedrooms"),
                Rule::step(1.0, "Bedrooms must be a whole number"),
            ],
        )
        .field(
            fields::BATHROOMS,
            [
                Rule::at_least(0.5, "At least 0.5 bathroom is required"),
                Rule::step(0.5, "Bathrooms must be in half increments"),
            ],
        )
        .field(
            fields::PROPERTY_TYPE,
            [
                Rule::required("Property type is required"),
                Rule::one_of(&PropertyType::VALUES, "Invalid property type"),
            ],
        )
        .field(
            fields::DESCRIPTION,
            [Rule::min_length(10, "Description must be at least 10 characters")],
        )
        .field(
            fields::PRICE,
            [Rule::at_least(0.0, "Price must be a positive number")],
        )
        .field(fields::CONTACT_EMAIL, [Rule::pattern(email, "Invalid email address")])
        .field(fields::CONTACT_PHONE, [Rule::pattern(phone, "Invalid phone number")])
        .field(
            fields::IMAGES,
            [
                Rule::file(
                    FileConstraint::MaxCount(MAX_IMAGES),
                    "You can upload up to 5 images",
                ),
                Rule::file(
                    FileConstraint::MaxBytes(MAX_IMAGE_BYTES),
                    "Max file size is 5MB.",
                ),
                Rule::file(
                    FileConstraint::MimeType(ACCEPTED_IMAGE_TYPES),
                    ".jpg, .jpeg, .png and .webp files are accepted.",
                ),
            ],
        )
}

/// A file picked by the user, held as raw bytes until submission.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

impl Attachment {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::Attachment {
                path: path.display().to_string(),
                source,
            })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(filename, mime_type, bytes))
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn facts(&self) -> FileFacts<'_> {
        FileFacts {
            size_bytes: self.size_bytes(),
            mime_type: &self.mime_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone)]
struct AttachedImage {
    file: Attachment,
    preview: ImagePreview,
}

/// In-progress form values. Numeric fields are `None` while their input is empty or not a
/// number.
#[derive(Debug, Clone, Default)]
pub struct PropertyDraft {
    pub property_name: String,
    pub address: String,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub property_type: Option<String>,
    pub amenities: BTreeSet<Amenity>,
    pub description: String,
    pub price: Option<f64>,
    pub contact_email: String,
    pub contact_phone: String,
    images: Vec<AttachedImage>,
}

impl PropertyDraft {
    pub fn images(&self) -> impl Iterator<Item = &Attachment> {
        self.images.iter().map(|image| &image.file)
    }

    pub fn previews(&self) -> impl Iterator<Item = &ImagePreview> {
        self.images.iter().map(|image| &image.preview)
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

impl FieldSource for PropertyDraft {
    fn field_value(&self, field: &str) -> Option<FieldValue<'_>> {
        let value = match field {
            fields::PROPERTY_NAME => FieldValue::Text(&self.property_name),
            fields::ADDRESS => FieldValue::Text(&self.address),
            fields::BEDROOMS => FieldValue::Number(self.bedrooms),
            fields::BATHROOMS => FieldValue::Number(self.bathrooms),
            fields::PROPERTY_TYPE => FieldValue::Choice(self.property_type.as_deref()),
            fields::DESCRIPTION => FieldValue::Text(&self.description),
            fields::PRICE => FieldValue::Number(self.price),
            fields::CONTACT_EMAIL => FieldValue::Text(&self.contact_email),
            fields::CONTACT_PHONE => FieldValue::Text(&self.contact_phone),
            fields::IMAGES => {
                FieldValue::Files(self.images.iter().map(|image| image.file.facts()).collect())
            }
            _ => return None,
        };
        Some(value)
    }
}

/// A draft that passed validation, in the shape handed to the submission collaborator.
#[derive(Debug, Clone)]
pub struct PropertyListing {
    pub property_name: String,
    pub address: String,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub property_type: PropertyType,
    pub amenities: BTreeSet<Amenity>,
    pub description: String,
    pub price: f64,
    pub contact_email: String,
    pub contact_phone: String,
    pub images: Vec<Attachment>,
}

impl PropertyListing {
    fn from_draft(draft: &PropertyDraft) -> Option<Self> {
        Some(Self {
            property_name: draft.property_name.clone(),
            address: draft.address.clone(),
            bedrooms: draft
                .bedrooms
                .filter(|n| (0.0..=f64::from(u32::MAX)).contains(n))? as u32,
            bathrooms: draft.bathrooms?,
            property_type: draft.property_type.as_deref()?.parse().ok()?,
            amenities: draft.amenities.clone(),
            description: draft.description.clone(),
            price: draft.price?,
            contact_email: draft.contact_email.clone(),
            contact_phone: draft.contact_phone.clone(),
            images: draft.images().cloned().collect(),
        })
    }

    pub fn to_submission(&self) -> PropertySubmission {
        PropertySubmission {
            property_name: self.property_name.clone(),
            address: self.address.clone(),
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            property_type: self.property_type,
            amenities: self.amenities.iter().copied().collect(),
            description: self.description.clone(),
            price: self.price,
            contact_email: self.contact_email.clone(),
            contact_phone: self.contact_phone.clone(),
            images: self
                .images
                .iter()
                .map(|image| ImagePayload {
                    filename: image.filename.clone(),
                    mime_type: image.mime_type.clone(),
                    size_bytes: image.size_bytes(),
                    data_b64: STANDARD.encode(&image.bytes),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub description: &'static str,
}

pub const REGISTERED_NOTICE: Notice = Notice {
    title: "Property Registered",
    description: "Your property has been successfully registered.",
};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; the messages are also available from [`PropertyForm::errors`].
    Rejected(FieldErrors),
    Registered {
        property_id: PropertyId,
        notice: Notice,
    },
    /// The submission collaborator failed or timed out. The draft is kept.
    Failed { message: String },
}

/// Parses a numeric text input. Empty or unparseable input yields `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

pub struct PropertyForm {
    draft: PropertyDraft,
    errors: FieldErrors,
    submit_attempted: bool,
    timeout: Duration,
}

impl PropertyForm {
    pub fn new(timeout: Duration) -> Self {
        Self {
            draft: PropertyDraft::default(),
            errors: FieldErrors::default(),
            submit_attempted: false,
            timeout,
        }
    }

    pub fn draft(&self) -> &PropertyDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn set_property_name(&mut self, value: impl Into<String>) {
        self.draft.property_name = value.into();
        self.field_changed(fields::PROPERTY_NAME);
    }

    pub fn set_address(&mut self, value: impl Into<String>) {
        self.draft.address = value.into();
        self.field_changed(fields::ADDRESS);
    }

    pub fn set_bedrooms(&mut self, value: Option<f64>) {
        self.draft.bedrooms = value;
        self.field_changed(fields::BEDROOMS);
    }

    pub fn set_bedrooms_input(&mut self, raw: &str) {
        self.set_bedrooms(parse_number(raw));
    }

    pub fn set_bathrooms(&mut self, value: Option<f64>) {
        self.draft.bathrooms = value;
        self.field_changed(fields::BATHROOMS);
    }

    pub fn set_bathrooms_input(&mut self, raw: &str) {
        self.set_bathrooms(parse_number(raw));
    }

    pub fn set_property_type(&mut self, value: impl Into<String>) {
        self.draft.property_type = Some(value.into());
        self.field_changed(fields::PROPERTY_TYPE);
    }

    pub fn select_property_type(&mut self, kind: PropertyType) {
        self.set_property_type(kind.as_str());
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.draft.description = value.into();
        self.field_changed(fields::DESCRIPTION);
    }

    pub fn set_price(&mut self, value: Option<f64>) {
        self.draft.price = value;
        self.field_changed(fields::PRICE);
    }

    pub fn set_price_input(&mut self, raw: &str) {
        self.set_price(parse_number(raw));
    }

    pub fn set_contact_email(&mut self, value: impl Into<String>) {
        self.draft.contact_email = value.into();
        self.field_changed(fields::CONTACT_EMAIL);
    }

    pub fn set_contact_phone(&mut self, value: impl Into<String>) {
        self.draft.contact_phone = value.into();
        self.field_changed(fields::CONTACT_PHONE);
    }

    /// Checks or unchecks one amenity. Other amenities are untouched.
    pub fn set_amenity(&mut self, amenity: Amenity, checked: bool) {
        if checked {
            self.draft.amenities.insert(amenity);
        } else {
            self.draft.amenities.remove(&amenity);
        }
        self.field_changed(fields::AMENITIES);
    }

    /// Flips one amenity and returns whether it is now checked.
    pub fn toggle_amenity(&mut self, amenity: Amenity) -> bool {
        let checked = !self.draft.amenities.contains(&amenity);
        self.set_amenity(amenity, checked);
        checked
    }

    /// Appends a batch of files after the ones already attached, each with its own preview.
    ///
    /// Nothing is refused here: size, type and count are reported on the images field but only
    /// enforced when the draft is submitted.
    pub fn attach_images(&mut self, files: impl IntoIterator<Item = Attachment>) -> usize {
        let before = self.draft.images.len();
        self.draft
            .images
            .extend(files.into_iter().map(|file| AttachedImage {
                preview: ImagePreview {
                    url: format!("blob:{}", Uuid::new_v4()),
                    filename: file.filename.clone(),
                },
                file,
            }));
        self.revalidate(fields::IMAGES);
        self.draft.images.len() - before
    }

    /// Removes the file and preview at `index`. Later entries shift down by one.
    pub fn remove_image(&mut self, index: usize) -> Option<Attachment> {
        if index >= self.draft.images.len() {
            return None;
        }
        let removed = self.draft.images.remove(index);
        self.revalidate(fields::IMAGES);
        Some(removed.file)
    }

    pub fn previews(&self) -> Vec<&ImagePreview> {
        self.draft.previews().collect()
    }

    /// Runs every rule over the draft and replaces the current messages.
    pub fn validate(&mut self) -> bool {
        self.errors = PROPERTY_SCHEMA.validate(&self.draft);
        self.errors.is_empty()
    }

    /// Validates the draft and, when it is valid, hands it to `submitter`.
    ///
    /// The draft is reset only after the submitter accepts it.
    pub async fn submit(&mut self, submitter: &dyn PropertySubmitter) -> SubmitOutcome {
        self.submit_attempted = true;
        if !self.validate() {
            info!(invalid_fields = self.errors.len(), "property form rejected");
            return SubmitOutcome::Rejected(self.errors.clone());
        }
        let Some(listing) = PropertyListing::from_draft(&self.draft) else {
            warn!("validated property draft could not be converted");
            return SubmitOutcome::Failed {
                message: SUBMIT_FAILED_MESSAGE.to_string(),
            };
        };

        let submitted = with_timeout(
            "property submission",
            self.timeout,
            submitter.submit_property(&listing),
        )
        .await;

        match submitted {
            Ok(property_id) => {
                info!(property_id = property_id.0, "property submitted");
                self.reset();
                SubmitOutcome::Registered {
                    property_id,
                    notice: REGISTERED_NOTICE,
                }
            }
            Err(err) => {
                warn!("property submission failed: {err:#}");
                SubmitOutcome::Failed {
                    message: SUBMIT_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.draft = PropertyDraft::default();
        self.errors = FieldErrors::default();
        self.submit_attempted = false;
    }

    fn field_changed(&mut self, field: &'static str) {
        if self.submit_attempted {
            self.revalidate(field);
        }
    }

    fn revalidate(&mut self, field: &'static str) {
        PROPERTY_SCHEMA.revalidate_field(&self.draft, field, &mut self.errors);
    }
}

#[cfg(test)]
#[path = "tests/property_form_tests.rs"]
mod tests;
