use super::*;

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Default)]
struct RecordingSubmitter {
    received: Arc<Mutex<Vec<PropertyListing>>>,
    fail: bool,
    hang: bool,
}

impl RecordingSubmitter {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    async fn calls(&self) -> usize {
        self.received.lock().await.len()
    }
}

#[async_trait]
impl PropertySubmitter for RecordingSubmitter {
    async fn submit_property(&self, listing: &PropertyListing) -> anyhow::Result<PropertyId> {
        self.received.lock().await.push(listing.clone());
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(anyhow!("503 service unavailable"));
        }
        Ok(PropertyId(42))
    }
}

fn jpeg(name: &str) -> Attachment {
    Attachment::new(name, "image/jpeg", vec![0xff, 0xd8, 0xff])
}

fn filled_form() -> PropertyForm {
    let mut form = PropertyForm::new(Duration::from_secs(5));
    form.set_property_name("Sunset Apartments");
    form.set_address("123 Sunset Blvd, Mumbai");
    form.set_bedrooms_input("2");
    form.set_bathrooms_input("1.5");
    form.select_property_type(PropertyType::Apartment);
    form.set_description("Bright corner flat with sea breeze");
    form.set_price_input("1200");
    form.set_contact_email("owner@example.com");
    form.set_contact_phone("+919876543210");
    form
}

#[test]
fn filled_draft_is_valid() {
    let mut form = filled_form();
    assert!(form.validate(), "unexpected errors: {:?}", form.errors());
}

#[tokio::test]
async fn empty_name_is_rejected_without_calling_submitter() {
    let mut form = filled_form();
    form.set_property_name("");
    let submitter = RecordingSubmitter::default();

    let outcome = form.submit(&submitter).await;

    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    assert_eq!(
        form.error(fields::PROPERTY_NAME),
        Some("Property name is required")
    );
    assert_eq!(submitter.calls().await, 0);
}

#[tokio::test]
async fn zero_bathrooms_only_flags_bathrooms() {
    let mut form = filled_form();
    form.set_bathrooms(Some(0.0));
    let submitter = RecordingSubmitter::default();

    let SubmitOutcome::Rejected(errors) = form.submit(&submitter).await else {
        panic!("expected rejection");
    };

    assert_eq!(
        errors.get(fields::BATHROOMS),
        Some("At least 0.5 bathroom is required")
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(submitter.calls().await, 0);
}

#[test]
fn every_invalid_field_gets_its_own_message() {
    let mut form = PropertyForm::new(Duration::from_secs(5));
    form.set_contact_email("not-an-email");
    form.set_contact_phone("0123");
    form.set_description("short");
    form.set_price(Some(-1.0));
    form.set_property_type("villa");

    assert!(!form.validate());
    let errors = form.errors();
    assert_eq!(errors.get(fields::PROPERTY_NAME), Some("Property name is required"));
    assert_eq!(errors.get(fields::ADDRESS), Some("Address is required"));
    assert_eq!(errors.get(fields::BEDROOMS), Some("At least 1 bedroom is required"));
    assert_eq!(errors.get(fields::BATHROOMS), Some("At least 0.5 bathroom is required"));
    assert_eq!(errors.get(fields::PROPERTY_TYPE), Some("Invalid property type"));
    assert_eq!(
        errors.get(fields::DESCRIPTION),
        Some("Description must be at least 10 characters")
    );
    assert_eq!(errors.get(fields::PRICE), Some("Price must be a positive number"));
    assert_eq!(errors.get(fields::CONTACT_EMAIL), Some("Invalid email address"));
    assert_eq!(errors.get(fields::CONTACT_PHONE), Some("Invalid phone number"));
    assert!(!errors.contains(fields::IMAGES));
}

#[test]
fn numeric_inputs_reject_fractions_and_garbage() {
    let mut form = filled_form();
    form.set_bedrooms_input("2.5");
    form.set_bathrooms_input("1.25");
    form.set_price_input("cheap");
    assert!(!form.validate());
    assert_eq!(form.error(fields::BEDROOMS), Some("Bedrooms must be a whole number"));
    assert_eq!(
        form.error(fields::BATHROOMS),
        Some("Bathrooms must be in half increments")
    );
    assert_eq!(form.error(fields::PRICE), Some("Price must be a positive number"));
}

#[tokio::test]
async fn bedroom_counts_beyond_u32_are_rejected_not_truncated() {
    let mut form = filled_form();
    form.set_bedrooms_input("10000000000");
    let submitter = RecordingSubmitter::default();

    let SubmitOutcome::Rejected(errors) = form.submit(&submitter).await else {
        panic!("expected rejection");
    };

    assert_eq!(errors.get(fields::BEDROOMS), Some("Too many bedrooms"));
    assert_eq!(submitter.calls().await, 0);

    form.set_bedrooms_input("4294967295");
    assert!(matches!(
        form.submit(&submitter).await,
        SubmitOutcome::Registered { .. }
    ));
    let received = submitter.received.lock().await;
    assert_eq!(received[0].bedrooms, u32::MAX);
}

#[test]
fn malformed_email_local_parts_are_rejected() {
    let mut form = filled_form();
    for bad in [
        "a..b@example.com",
        "'@example.com",
        ".ab@example.com",
        "ab.@example.com",
        "ab'@example.com",
    ] {
        form.set_contact_email(bad);
        assert!(!form.validate(), "{bad} should be rejected");
        assert_eq!(form.error(fields::CONTACT_EMAIL), Some("Invalid email address"));
    }
    for good in ["a.b@example.com", "o'neil@example.co.in", "first+tag@mail.example.com"] {
        form.set_contact_email(good);
        assert!(form.validate(), "{good} should be accepted: {:?}", form.errors());
    }
}

#[tokio::test]
async fn six_images_keep_previews_but_fail_submission() {
    let mut form = filled_form();
    let attached = form.attach_images((1..=6).map(|i| jpeg(&format!("room-{i}.jpg"))));
    assert_eq!(attached, 6);
    assert_eq!(form.previews().len(), 6);
    assert_eq!(form.draft().image_count(), 6);

    let submitter = RecordingSubmitter::default();
    let outcome = form.submit(&submitter).await;

    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    assert_eq!(form.error(fields::IMAGES), Some("You can upload up to 5 images"));
    assert_eq!(form.previews().len(), 6);
    assert_eq!(submitter.calls().await, 0);
}

#[test]
fn oversized_or_wrong_type_files_are_previewed_and_flagged() {
    let mut form = filled_form();
    let big = Attachment::new(
        "huge.png",
        "image/png",
        vec![0; (MAX_IMAGE_BYTES + 1) as usize],
    );
    form.attach_images([jpeg("ok.jpg"), big]);
    assert_eq!(form.previews().len(), 2);
    assert_eq!(form.error(fields::IMAGES), Some("Max file size is 5MB."));

    form.remove_image(1);
    assert!(form.error(fields::IMAGES).is_none());

    form.attach_images([Attachment::new("anim.gif", "image/gif", vec![1, 2])]);
    assert_eq!(
        form.error(fields::IMAGES),
        Some(".jpg, .jpeg, .png and .webp files are accepted.")
    );
    assert_eq!(form.previews().len(), 2);
}

#[test]
fn batches_append_to_existing_attachments() {
    let mut form = filled_form();
    form.attach_images([jpeg("a.jpg")]);
    form.attach_images([jpeg("b.jpg"), jpeg("c.jpg")]);
    let names: Vec<_> = form.draft().images().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
}

#[test]
fn removing_index_one_shifts_later_entries_down() {
    let mut form = filled_form();
    form.attach_images([jpeg("a.jpg"), jpeg("b.jpg"), jpeg("c.jpg")]);
    let before: Vec<ImagePreview> = form.previews().into_iter().cloned().collect();

    let removed = form.remove_image(1).expect("index 1 exists");

    assert_eq!(removed.filename, "b.jpg");
    let after: Vec<ImagePreview> = form.previews().into_iter().cloned().collect();
    assert_eq!(after, vec![before[0].clone(), before[2].clone()]);
    let files: Vec<_> = form.draft().images().map(|f| f.filename.as_str()).collect();
    assert_eq!(files, vec!["a.jpg", "c.jpg"]);
    assert!(form.remove_image(2).is_none());
}

#[test]
fn previews_are_distinct_blob_urls() {
    let mut form = filled_form();
    form.attach_images([jpeg("a.jpg"), jpeg("a.jpg")]);
    let previews = form.previews();
    assert!(previews.iter().all(|p| p.url.starts_with("blob:")));
    assert_ne!(previews[0].url, previews[1].url);
}

#[test]
fn toggling_an_amenity_twice_restores_the_set() {
    let mut form = filled_form();
    form.set_amenity(Amenity::Parking, true);
    let before = form.draft().amenities.clone();

    assert!(form.toggle_amenity(Amenity::Gym));
    assert!(!form.toggle_amenity(Amenity::Gym));

    assert_eq!(form.draft().amenities, before);
}

#[test]
fn amenities_are_independent() {
    let mut form = filled_form();
    form.set_amenity(Amenity::WiFi, true);
    form.set_amenity(Amenity::Heating, true);
    form.set_amenity(Amenity::WiFi, false);
    assert_eq!(
        form.draft().amenities.iter().copied().collect::<Vec<_>>(),
        vec![Amenity::Heating]
    );
}

#[tokio::test]
async fn fields_revalidate_on_change_after_first_submit() {
    let mut form = filled_form();
    form.set_property_name("");
    assert!(form.error(fields::PROPERTY_NAME).is_none());

    form.submit(&RecordingSubmitter::default()).await;
    assert!(form.error(fields::PROPERTY_NAME).is_some());

    form.set_property_name("Greenview Homes");
    assert!(form.error(fields::PROPERTY_NAME).is_none());
    form.set_address("");
    assert_eq!(form.error(fields::ADDRESS), Some("Address is required"));
}

#[tokio::test]
async fn valid_draft_is_submitted_once_and_reset() {
    let mut form = filled_form();
    form.set_amenity(Amenity::WiFi, true);
    form.attach_images([jpeg("front.jpg")]);
    let submitter = RecordingSubmitter::default();

    let outcome = form.submit(&submitter).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Registered {
            property_id: PropertyId(42),
            notice: REGISTERED_NOTICE,
        }
    );
    let received = submitter.received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].bedrooms, 2);
    assert_eq!(received[0].property_type, PropertyType::Apartment);
    assert_eq!(received[0].images.len(), 1);
    assert!(received[0].amenities.contains(&Amenity::WiFi));

    assert!(form.draft().property_name.is_empty());
    assert_eq!(form.previews().len(), 0);
    assert!(form.errors().is_empty());
}

#[tokio::test]
async fn failed_submission_keeps_the_draft() {
    let mut form = filled_form();
    let outcome = form.submit(&RecordingSubmitter::failing()).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed {
            message: "Unable to register property. Please try again.".to_string()
        }
    );
    assert_eq!(form.draft().property_name, "Sunset Apartments");
    assert!(form.errors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn hung_submission_times_out() {
    let mut form = filled_form();
    let submitter = RecordingSubmitter::hanging();
    let outcome = form.submit(&submitter).await;
    assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
    assert_eq!(submitter.calls().await, 1);
}

#[test]
fn submission_payload_encodes_images() {
    let mut form = filled_form();
    form.attach_images([jpeg("front.jpg")]);
    let listing = PropertyListing::from_draft(form.draft()).expect("listing");
    let submission = listing.to_submission();
    assert_eq!(submission.images[0].data_b64, "/9j/");
    assert_eq!(submission.images[0].size_bytes, 3);
    assert_eq!(submission.images[0].mime_type, "image/jpeg");
}

#[tokio::test]
async fn attachment_from_path_guesses_mime_type() {
    let dir = std::env::temp_dir().join(format!("roomzy_attach_{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await.expect("mkdir");
    let path = dir.join("kitchen.webp");
    tokio::fs::write(&path, b"RIFF").await.expect("write");

    let attachment = Attachment::from_path(&path).await.expect("read");
    assert_eq!(attachment.filename, "kitchen.webp");
    assert_eq!(attachment.mime_type, "image/webp");
    assert_eq!(attachment.size_bytes(), 4);

    let missing = Attachment::from_path(dir.join("nope.png")).await;
    assert!(matches!(missing, Err(ClientError::Attachment { .. })));

    tokio::fs::remove_dir_all(dir).await.expect("cleanup");
}
