//! Staged entries.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::{FileKind, ImageFormatHint};
use crate::preview::PreviewHandle;
use crate::rotation::Rotation;

/// Opaque identifier of an entry within one [`EntryList`](crate::collection::EntryList).
///
/// Identifiers are assigned at intake, never reused by the list that issued
/// them, and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u32);

impl EntryId {
    /// Raw value, for handing across FFI boundaries.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for EntryId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One user-supplied file staged for merging.
#[derive(Debug)]
pub struct Entry {
    id: EntryId,
    name: String,
    media_type: String,
    kind: FileKind,
    payload: Vec<u8>,
    rotation: Rotation,
    preview: Option<PreviewHandle>,
}

impl Entry {
    /// Create an entry, classifying it from `media_type`.
    ///
    /// The kind is fixed here and never recomputed.
    pub fn new(
        id: EntryId,
        name: impl Into<String>,
        media_type: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        let media_type = media_type.into();
        Self {
            id,
            name: name.into(),
            kind: FileKind::from_media_type(&media_type),
            media_type,
            payload,
            rotation: Rotation::None,
            preview: None,
        }
    }

    /// Set the initial rotation.
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Attach a preview handle.
    pub fn with_preview(mut self, preview: PreviewHandle) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Identifier.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Original file name, display only.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Kind assigned at intake.
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Raster sub-type implied by the declared media type.
    pub fn image_hint(&self) -> ImageFormatHint {
        ImageFormatHint::from_media_type(&self.media_type)
    }

    /// Raw bytes of the original file.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Current rotation.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub(crate) fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Preview handle, if one is attached.
    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    /// Drop the preview handle, releasing it.
    pub(crate) fn release_preview(&mut self) {
        self.preview = None;
    }

    /// Serializable summary for front ends.
    pub fn view(&self) -> EntryView {
        EntryView {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind,
            rotation: self.rotation,
            size: self.payload.len(),
            has_preview: self
                .preview
                .as_ref()
                .is_some_and(|preview| !preview.is_placeholder()),
        }
    }
}

/// Serializable summary of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    /// Identifier.
    pub id: EntryId,
    /// File name.
    pub name: String,
    /// Kind.
    pub kind: FileKind,
    /// Rotation in degrees.
    pub rotation: Rotation,
    /// Payload size in bytes.
    pub size: usize,
    /// Whether a rendered thumbnail (not a placeholder) is available.
    pub has_preview: bool,
}
