//! The ordered collection of staged entries.
//!
//! [`EntryList`] is the single owner of every staged entry. Its order is the
//! merge order. All operations address entries by [`EntryId`]; an id the
//! list does not know is silently ignored, so a stale id from a front end
//! can never corrupt the list.

use log::debug;

use crate::entry::{Entry, EntryId, EntryView};
use crate::error::MergeError;
use crate::io::IntakeFile;
use crate::merge::{MergeOutput, MergePipeline, MergeProgress};
use crate::preview::PreviewGenerator;
use crate::rotation::{RotateDirection, Rotation};

/// Entries required before a merge may be triggered.
pub const MIN_MERGE_ENTRIES: usize = 2;

/// Ordered, identifier-addressed list of staged entries.
#[derive(Debug, Default)]
pub struct EntryList {
    entries: Vec<Entry>,
    next_id: u32,
    previews: PreviewGenerator,
}

impl EntryList {
    /// Create an empty list with a default preview generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list using `previews` for thumbnails.
    pub fn with_previews(previews: PreviewGenerator) -> Self {
        Self {
            previews,
            ..Self::default()
        }
    }

    /// The preview generator.
    pub fn previews(&self) -> &PreviewGenerator {
        &self.previews
    }

    /// The preview generator, mutably (to install a rasterizer).
    pub fn previews_mut(&mut self) -> &mut PreviewGenerator {
        &mut self.previews
    }

    /// Stage a file at the end of the list.
    ///
    /// The kind is derived from `media_type` once, here. A preview is
    /// generated; preview failures never prevent staging.
    pub fn append(
        &mut self,
        name: impl Into<String>,
        media_type: impl Into<String>,
        payload: Vec<u8>,
    ) -> EntryId {
        let id = EntryId::from(self.next_id);
        self.next_id += 1;

        let entry = Entry::new(id, name, media_type, payload);
        let preview = self
            .previews
            .generate(entry.name(), entry.kind(), entry.payload());

        debug!("Staged {} {} ({})", entry.kind(), id, entry.name());
        self.entries.push(entry.with_preview(preview));
        id
    }

    /// Stage an intake file, applying the extension allow-list.
    ///
    /// Returns `None` and stages nothing when the file is not accepted.
    pub fn append_file(&mut self, file: IntakeFile) -> Option<EntryId> {
        if !file.is_accepted() {
            debug!("Skipping {}: extension not accepted", file.name);
            return None;
        }

        let media_type = file.declared_media_type()?.to_string();
        Some(self.append(file.name, media_type, file.bytes))
    }

    /// Current index of `id`.
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }

    /// Move one entry to `new_index`, keeping everyone else's relative
    /// order. Indices past the end clamp to the last position.
    ///
    /// Returns `false` for an unknown id.
    pub fn move_entry(&mut self, id: EntryId, new_index: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };

        let entry = self.entries.remove(from);
        let to = new_index.min(self.entries.len());
        self.entries.insert(to, entry);
        true
    }

    /// Rotate one entry a quarter turn.
    ///
    /// Returns the new rotation, or `None` for an unknown id.
    pub fn rotate(&mut self, id: EntryId, direction: RotateDirection) -> Option<Rotation> {
        let entry = self.entries.iter_mut().find(|entry| entry.id() == id)?;
        let rotation = entry.rotation().step(direction);
        entry.set_rotation(rotation);
        Some(rotation)
    }

    /// Set one entry's rotation directly.
    ///
    /// Returns `false` for an unknown id.
    pub fn set_rotation(&mut self, id: EntryId, rotation: Rotation) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id() == id) {
            Some(entry) => {
                entry.set_rotation(rotation);
                true
            }
            None => false,
        }
    }

    /// Remove one entry, releasing its preview first.
    ///
    /// Returns `false` for an unknown id.
    pub fn remove(&mut self, id: EntryId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.entries[index].release_preview();
        let entry = self.entries.remove(index);
        debug!("Removed {} ({})", id, entry.name());
        true
    }

    /// Remove every entry, releasing all previews.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in merge order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entry with `id`.
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Identifiers in merge order.
    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(Entry::id).collect()
    }

    /// Serializable views in merge order.
    pub fn views(&self) -> Vec<EntryView> {
        self.entries.iter().map(Entry::view).collect()
    }

    /// Number of staged entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether enough entries are staged to offer a merge.
    pub fn can_merge(&self) -> bool {
        self.len() >= MIN_MERGE_ENTRIES
    }

    /// Run `pipeline` over the current entries.
    ///
    /// The list is left unchanged whether the merge succeeds or fails.
    pub fn merge(&self, pipeline: &MergePipeline) -> Result<MergeOutput, MergeError> {
        pipeline.merge(&self.entries)
    }

    /// Like [`merge`](Self::merge), reporting progress per entry.
    pub fn merge_with_progress<F>(
        &self,
        pipeline: &MergePipeline,
        on_progress: F,
    ) -> Result<MergeOutput, MergeError>
    where
        F: FnMut(MergeProgress<'_>),
    {
        pipeline.merge_with_progress(&self.entries, on_progress)
    }
}
