//! Session state held for the lifetime of the page.

use crate::error::Rejection;
use crate::selection::SelectedFile;

/// What the widget is doing right now.
///
/// Anything other than `Idle` holds the busy flag: no upload and no delete
/// can start until the phase returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Upload request in flight
    Uploading,
    /// Dissolve animation running
    Animating,
    /// Delete request in flight, animation finished
    Deleting,
}

/// The single piece of client state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState<F> {
    /// File of the upload in flight
    selected_file: Option<SelectedFile<F>>,
    /// Stored name of the image on display
    current_filename: Option<String>,
    phase: Phase,
}

impl<F> SessionState<F> {
    pub fn new() -> Self {
        Self {
            selected_file: None,
            current_filename: None,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_animating(&self) -> bool {
        self.phase == Phase::Animating
    }

    pub fn current_filename(&self) -> Option<&str> {
        self.current_filename.as_deref()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile<F>> {
        self.selected_file.as_ref()
    }

    fn ensure_idle(&self) -> Result<(), Rejection> {
        if self.is_busy() {
            return Err(Rejection::Busy(self.phase));
        }
        Ok(())
    }

    /// Take the busy flag for an upload of `file`.
    pub fn begin_upload(&mut self, file: SelectedFile<F>) -> Result<(), Rejection> {
        self.ensure_idle()?;
        self.selected_file = Some(file);
        self.phase = Phase::Uploading;
        Ok(())
    }

    /// Release the busy flag after an upload. `stored` is the server-side
    /// filename when the upload succeeded; on failure the displayed image,
    /// if any, stays bound.
    pub fn finish_upload(&mut self, stored: Option<String>) -> Option<SelectedFile<F>> {
        if self.phase != Phase::Uploading {
            log::warn!("Upload finished while {:?}", self.phase);
        }
        if let Some(filename) = stored {
            self.current_filename = Some(filename);
        }
        self.phase = Phase::Idle;
        self.selected_file.take()
    }

    /// Take the busy flag for the dissolve. Requires an image on display.
    pub fn begin_animation(&mut self) -> Result<(), Rejection> {
        self.ensure_idle()?;
        if self.current_filename.is_none() {
            return Err(Rejection::NothingDisplayed);
        }
        self.phase = Phase::Animating;
        Ok(())
    }

    /// Release the busy flag of a dissolve that cannot continue to a delete.
    pub fn abort_animation(&mut self) {
        if self.phase == Phase::Animating {
            self.phase = Phase::Idle;
        }
    }

    /// Move from the finished animation to the delete request, returning the
    /// filename to delete.
    pub fn begin_delete(&mut self) -> Result<String, Rejection> {
        if self.phase != Phase::Animating {
            self.ensure_idle()?;
        }
        let filename = self
            .current_filename
            .clone()
            .ok_or(Rejection::NothingDisplayed)?;
        self.phase = Phase::Deleting;
        Ok(filename)
    }

    /// Release the busy flag after a delete. The filename is cleared only
    /// when the server confirmed the deletion.
    pub fn finish_delete(&mut self, deleted: bool) {
        if self.phase != Phase::Deleting {
            log::warn!("Delete finished while {:?}", self.phase);
        }
        if deleted {
            self.current_filename = None;
        }
        self.phase = Phase::Idle;
    }
}

impl<F> Default for SessionState<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> SelectedFile<()> {
        SelectedFile::new("cat.png", "image/png", 10, ())
    }

    fn displaying(filename: &str) -> SessionState<()> {
        let mut state = SessionState::new();
        state.begin_upload(image()).unwrap();
        state.finish_upload(Some(filename.to_string()));
        state
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let state: SessionState<()> = SessionState::new();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.is_animating());
        assert_eq!(state.current_filename(), None);
        assert!(state.selected_file().is_none());
    }

    #[test]
    fn test_upload_binds_filename() {
        let mut state = SessionState::new();
        state.begin_upload(image()).unwrap();
        assert_eq!(state.phase(), Phase::Uploading);
        assert_eq!(state.selected_file().map(|f| f.name.as_str()), Some("cat.png"));

        let file = state.finish_upload(Some("abc123.png".to_string()));
        assert!(file.is_some());
        assert!(state.selected_file().is_none());
        assert_eq!(state.current_filename(), Some("abc123.png"));
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_failed_upload_keeps_previous_image() {
        let mut state = displaying("old.png");
        state.begin_upload(image()).unwrap();
        state.finish_upload(None);
        assert_eq!(state.current_filename(), Some("old.png"));
        assert!(!state.is_busy());
    }

    #[test]
    fn test_upload_rejected_while_busy() {
        let mut state = SessionState::new();
        state.begin_upload(image()).unwrap();
        assert_eq!(
            state.begin_upload(image()),
            Err(Rejection::Busy(Phase::Uploading))
        );

        let mut state = displaying("a.png");
        state.begin_animation().unwrap();
        assert_eq!(
            state.begin_upload(image()),
            Err(Rejection::Busy(Phase::Animating))
        );
    }

    #[test]
    fn test_animation_requires_image() {
        let mut state: SessionState<()> = SessionState::new();
        assert_eq!(state.begin_animation(), Err(Rejection::NothingDisplayed));
    }

    #[test]
    fn test_animation_is_exclusive() {
        let mut state = displaying("a.png");
        state.begin_animation().unwrap();
        assert!(state.is_animating());
        assert_eq!(
            state.begin_animation(),
            Err(Rejection::Busy(Phase::Animating))
        );
    }

    #[test]
    fn test_abort_animation_releases_flag() {
        let mut state = displaying("a.png");
        state.begin_animation().unwrap();
        state.abort_animation();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.current_filename(), Some("a.png"));
        assert!(state.begin_animation().is_ok());
    }

    #[test]
    fn test_abort_animation_leaves_other_phases() {
        let mut state = displaying("a.png");
        state.begin_upload(image()).unwrap();
        state.abort_animation();
        assert_eq!(state.phase(), Phase::Uploading);
    }

    #[test]
    fn test_delete_lifecycle() {
        let mut state = displaying("a.png");
        state.begin_animation().unwrap();
        assert_eq!(state.begin_delete(), Ok("a.png".to_string()));
        assert_eq!(state.phase(), Phase::Deleting);
        assert_eq!(
            state.begin_delete(),
            Err(Rejection::Busy(Phase::Deleting))
        );

        state.finish_delete(true);
        assert_eq!(state.current_filename(), None);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.begin_delete(), Err(Rejection::NothingDisplayed));
    }

    #[test]
    fn test_failed_delete_keeps_filename() {
        let mut state = displaying("a.png");
        state.begin_animation().unwrap();
        state.begin_delete().unwrap();
        state.finish_delete(false);
        assert_eq!(state.current_filename(), Some("a.png"));
        assert!(state.begin_animation().is_ok());
    }
}
