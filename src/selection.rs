//! File selection adapter.
//!
//! Drop events and the file picker both end up here: the first file of the
//! interaction is taken, the rest are ignored, and anything that is not an
//! image is rejected before the upload flow sees it.

use crate::constants::IMAGE_MIME_PREFIX;
use crate::error::SnapError;

/// A file chosen by the user, with the browser handle needed to send it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile<F> {
    pub name: String,
    /// MIME type as reported by the browser, empty when unknown
    pub mime_type: String,
    pub size: u64,
    pub handle: F,
}

impl<F> SelectedFile<F> {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64, handle: F) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            handle,
        }
    }

    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime_type)
    }
}

/// Where a selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Drop,
    Picker,
}

/// Hover lifecycle of the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Enter,
    Over,
    Leave,
    Drop,
}

impl DragPhase {
    /// Every phase, in lifecycle order.
    pub const ALL: [DragPhase; 4] = [
        DragPhase::Enter,
        DragPhase::Over,
        DragPhase::Leave,
        DragPhase::Drop,
    ];

    /// DOM event name for this phase.
    pub fn event_type(&self) -> &'static str {
        match self {
            DragPhase::Enter => "dragenter",
            DragPhase::Over => "dragover",
            DragPhase::Leave => "dragleave",
            DragPhase::Drop => "drop",
        }
    }

    pub fn from_event_type(event_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.event_type() == event_type)
    }

    /// Whether the drop target is highlighted after this phase.
    pub fn highlights(&self) -> bool {
        matches!(self, DragPhase::Enter | DragPhase::Over)
    }
}

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type
        .get(..IMAGE_MIME_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(IMAGE_MIME_PREFIX))
}

/// Reduce an interaction's files to the single file to upload.
///
/// Returns `Ok(None)` when the interaction carried no file at all.
pub fn select_single<F>(
    source: SelectionSource,
    files: impl IntoIterator<Item = SelectedFile<F>>,
) -> Result<Option<SelectedFile<F>>, SnapError> {
    let mut files = files.into_iter();
    let Some(file) = files.next() else {
        log::debug!("{:?} carried no file", source);
        return Ok(None);
    };

    let ignored = files.count();
    if ignored > 0 {
        log::debug!("{:?}: ignoring {} additional file(s)", source, ignored);
    }

    if !file.is_image() {
        log::warn!(
            "Rejected '{}' from {:?}: MIME type '{}' is not an image",
            file.name,
            source,
            file.mime_type
        );
        return Err(SnapError::NotAnImage {
            mime_type: file.mime_type,
        });
    }

    Ok(Some(file))
}
