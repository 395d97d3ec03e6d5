//! Registration wizard data: the position handed between screens, the
//! in-memory draft, and the multipart payload built from both.

use std::path::{Path, PathBuf};

use super::models::Coordinate;

/// Immutable state carried from the position selector to the data form.
///
/// Only the position selector creates one, so a form can never exist
/// without a chosen position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WizardContext {
    position: Coordinate,
}

impl WizardContext {
    pub(crate) fn new(position: Coordinate) -> Self {
        Self { position }
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }
}

/// Reference to a picked image on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    path: PathBuf,
}

impl ImageHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

/// A not-yet-submitted orphanage.
///
/// Fields are independent and unvalidated; the API decides what it accepts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrphanageDraft {
    pub name: String,
    pub about: String,
    pub instructions: String,
    pub opening_hours: String,
    pub open_on_weekends: bool,
    images: Vec<ImageHandle>,
}

impl OrphanageDraft {
    /// Appends one picked image. Duplicates are kept, in pick order.
    pub fn add_image(&mut self, image: ImageHandle) {
        self.images.push(image);
    }

    pub fn images(&self) -> &[ImageHandle] {
        &self.images
    }

    pub fn to_submission(&self, context: &WizardContext) -> SubmissionForm {
        SubmissionForm::new(context, self)
    }
}

pub const IMAGE_FIELD: &str = "images";
pub const IMAGE_MIME: &str = "image/jpg";

/// One `images` file part of the create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePart {
    pub file_name: String,
    pub path: PathBuf,
}

/// The complete `POST /orphanages` payload, independent of any HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionForm {
    text_fields: Vec<(&'static str, String)>,
    images: Vec<ImagePart>,
}

impl SubmissionForm {
    pub fn new(context: &WizardContext, draft: &OrphanageDraft) -> Self {
        let position = context.position();
        let text_fields = vec![
            ("name", draft.name.clone()),
            ("latitude", position.latitude().to_string()),
            ("longitude", position.longitude().to_string()),
            ("about", draft.about.clone()),
            ("instructions", draft.instructions.clone()),
            ("opening_hours", draft.opening_hours.clone()),
            ("open_on_weekends", draft.open_on_weekends.to_string()),
        ];

        let images = draft
            .images
            .iter()
            .enumerate()
            .map(|(index, image)| ImagePart {
                file_name: format!("image_{}.jpg", index),
                path: image.path().to_path_buf(),
            })
            .collect();

        Self { text_fields, images }
    }

    pub fn text_fields(&self) -> &[(&'static str, String)] {
        &self.text_fields
    }

    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.text_fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn images(&self) -> &[ImagePart] {
        &self.images
    }
}
