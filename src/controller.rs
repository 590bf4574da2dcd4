//! Upload/delete controller.
//!
//! The controller owns the [`SessionState`] and turns browser events into
//! [`Effect`]s. It never touches the page or the network itself: the widget
//! feeds it events (drops, clicks, frame timestamps, finished requests) and
//! carries out whatever effects come back. This keeps the whole state
//! machine testable without a browser.
//!
//! Lifecycle of one image:
//! 1. `on_files` validates the selection and emits `SendUpload`
//! 2. `on_upload_finished` binds the stored filename and shows the image
//! 3. `on_delete_clicked` starts the dissolve and asks for a frame
//! 4. `on_animation_frame` applies the timeline until it finishes, then
//!    emits `SendDelete`
//! 5. `on_delete_finished` resets the visuals and clears or keeps the image

use snap_fx::{noise_seed, DissolveTimeline, VisualParams};

use crate::api::{Endpoints, UploadedImage};
use crate::constants::messages;
use crate::error::{ErrorCategory, Rejection, SnapError};
use crate::selection::{self, DragPhase, SelectedFile, SelectionSource};
use crate::session::SessionState;
use crate::status::Status;

/// Something the host must do on the controller's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<F> {
    /// Replace the status line
    SetStatus(Status),
    /// Toggle the drop target highlight
    Highlight(bool),
    /// POST the file to the upload endpoint
    SendUpload { url: String, file: F },
    /// Point the image at `src` and make it visible
    ShowImage { src: String },
    HideImage,
    ShowDeleteButton,
    HideDeleteButton,
    /// Reseed the turbulence noise
    SetNoiseSeed(u32),
    /// Write displacement, transform and opacity
    ApplyVisuals(VisualParams),
    /// Call back `on_animation_frame` on the next display frame
    RequestFrame,
    /// DELETE the stored file
    SendDelete { url: String, filename: String },
}

/// State machine behind the widget.
#[derive(Debug)]
pub struct Controller<F> {
    state: SessionState<F>,
    endpoints: Endpoints,
    timeline: DissolveTimeline,
    /// Timestamp the running animation counts from
    animation_started_at: Option<f64>,
    /// Last visuals handed to the host
    visuals: VisualParams,
}

impl<F: Clone> Controller<F> {
    pub fn new(endpoints: Endpoints, timeline: DissolveTimeline) -> Self {
        Self {
            state: SessionState::new(),
            endpoints,
            timeline,
            animation_started_at: None,
            visuals: VisualParams::resting(),
        }
    }

    pub fn state(&self) -> &SessionState<F> {
        &self.state
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn visuals(&self) -> VisualParams {
        self.visuals
    }

    // ------------------------------------------------------------------------
    // Selection and upload
    // ------------------------------------------------------------------------

    pub fn on_drag(&self, phase: DragPhase) -> Vec<Effect<F>> {
        vec![Effect::Highlight(phase.highlights())]
    }

    /// Files arrived from a drop or the picker.
    pub fn on_files(
        &mut self,
        source: SelectionSource,
        files: Vec<SelectedFile<F>>,
    ) -> Vec<Effect<F>> {
        let file = match selection::select_single(source, files) {
            Ok(Some(file)) => file,
            Ok(None) => return Vec::new(),
            Err(e) => return vec![Effect::SetStatus(Status::upload_failed(&e))],
        };

        let handle = file.handle.clone();
        let name = file.name.clone();
        let size = file.size;
        if let Err(rejection) = self.state.begin_upload(file) {
            log::info!("Upload of '{}' refused: {}", name, rejection);
            return vec![Effect::SetStatus(Status::error(messages::BUSY))];
        }

        log::info!("Uploading '{}' ({} bytes)", name, size);
        vec![
            Effect::SetStatus(Status::pending(messages::UPLOADING)),
            Effect::SendUpload {
                url: self.endpoints.upload_url(),
                file: handle,
            },
        ]
    }

    /// The upload request settled.
    pub fn on_upload_finished(
        &mut self,
        result: Result<UploadedImage, SnapError>,
    ) -> Vec<Effect<F>> {
        match result {
            Ok(image) => {
                log::info!("Stored as '{}'", image.filename);
                self.state.finish_upload(Some(image.filename));
                self.visuals = VisualParams::resting();
                vec![
                    Effect::ShowImage { src: image.url },
                    Effect::ApplyVisuals(self.visuals),
                    Effect::ShowDeleteButton,
                    Effect::SetStatus(Status::success(messages::UPLOAD_SUCCEEDED)),
                ]
            }
            Err(e) => {
                log_failure("Upload", &e);
                self.state.finish_upload(None);
                vec![Effect::SetStatus(Status::upload_failed(&e))]
            }
        }
    }

    // ------------------------------------------------------------------------
    // Dissolve and delete
    // ------------------------------------------------------------------------

    /// Delete button pressed at `now_ms`. `seed_roll` is a uniform random
    /// number in `[0, 1)` used to vary the noise between runs.
    pub fn on_delete_clicked(&mut self, now_ms: f64, seed_roll: f64) -> Vec<Effect<F>> {
        match self.state.begin_animation() {
            Ok(()) => {}
            Err(rejection @ Rejection::Busy(_)) => {
                log::debug!("Delete refused: {}", rejection);
                return vec![Effect::SetStatus(Status::error(messages::BUSY))];
            }
            Err(rejection) => {
                log::debug!("Delete ignored: {}", rejection);
                return Vec::new();
            }
        }

        self.animation_started_at = Some(now_ms);
        log::debug!(
            "Dissolve started ({}ms, {})",
            self.timeline.settings().duration_ms,
            self.timeline.settings().easing.name()
        );
        vec![
            Effect::HideDeleteButton,
            Effect::SetNoiseSeed(noise_seed(seed_roll)),
            Effect::RequestFrame,
        ]
    }

    /// A display frame at `now_ms`.
    pub fn on_animation_frame(&mut self, now_ms: f64) -> Vec<Effect<F>> {
        let Some(started_at) = self.animation_started_at.filter(|_| self.state.is_animating())
        else {
            return Vec::new();
        };

        let frame = self.timeline.sample(now_ms - started_at);
        self.visuals = frame.params;
        let mut effects = vec![Effect::ApplyVisuals(frame.params)];

        if !frame.is_finished() {
            effects.push(Effect::RequestFrame);
            return effects;
        }

        self.animation_started_at = None;
        match self.dispatch_delete() {
            Ok(effect) => effects.push(effect),
            Err(rejection) => {
                log::error!("Dissolve finished but delete could not start: {}", rejection);
                self.state.abort_animation();
                self.visuals = VisualParams::resting();
                effects.push(Effect::ApplyVisuals(self.visuals));
                if self.state.current_filename().is_some() {
                    effects.push(Effect::ShowDeleteButton);
                }
            }
        }
        effects
    }

    /// Start the network phase of the delete.
    ///
    /// Rejected when another request is in flight or when no image is bound,
    /// so a second dispatch after a successful delete never reaches the
    /// network.
    pub fn dispatch_delete(&mut self) -> Result<Effect<F>, Rejection> {
        let filename = self.state.begin_delete()?;
        log::info!("Deleting '{}'", filename);
        Ok(Effect::SendDelete {
            url: self.endpoints.delete_url(&filename),
            filename,
        })
    }

    /// The delete request settled. Visuals return to rest either way; the
    /// image is only hidden once the server confirmed the deletion.
    pub fn on_delete_finished(&mut self, result: Result<(), SnapError>) -> Vec<Effect<F>> {
        self.visuals = VisualParams::resting();
        match result {
            Ok(()) => {
                if let Some(filename) = self.state.current_filename() {
                    log::info!("Deleted '{}'", filename);
                }
                self.state.finish_delete(true);
                vec![
                    Effect::HideImage,
                    Effect::ApplyVisuals(self.visuals),
                    Effect::SetStatus(Status::success(messages::DELETE_SUCCEEDED)),
                ]
            }
            Err(e) => {
                log_failure("Delete", &e);
                self.state.finish_delete(false);
                vec![
                    Effect::ApplyVisuals(self.visuals),
                    Effect::ShowDeleteButton,
                    Effect::SetStatus(Status::delete_failed(&e)),
                ]
            }
        }
    }
}

fn log_failure(operation: &str, error: &SnapError) {
    match error.category() {
        ErrorCategory::Validation => log::warn!("{} rejected: {}", operation, error),
        ErrorCategory::Transport => log::error!("{} request failed: {}", operation, error),
        ErrorCategory::Application => log::warn!("{} refused by server: {}", operation, error),
    }
}

#[cfg(test)]
mod tests {
    use snap_fx::DissolveSettings;

    use super::*;
    use crate::session::Phase;

    fn controller() -> Controller<u32> {
        Controller::new(
            Endpoints::same_origin(),
            DissolveTimeline::new(DissolveSettings::classic()).unwrap(),
        )
    }

    fn stored(filename: &str) -> UploadedImage {
        UploadedImage {
            filename: filename.to_string(),
            url: Endpoints::same_origin().image_url(filename),
        }
    }

    fn with_image(filename: &str) -> Controller<u32> {
        let mut controller = controller();
        controller.on_files(
            SelectionSource::Drop,
            vec![SelectedFile::new("cat.png", "image/png", 3, 7)],
        );
        controller.on_upload_finished(Ok(stored(filename)));
        controller
    }

    #[test]
    fn test_drag_highlight() {
        let controller = controller();
        assert_eq!(controller.on_drag(DragPhase::Enter), vec![Effect::Highlight(true)]);
        assert_eq!(controller.on_drag(DragPhase::Drop), vec![Effect::Highlight(false)]);
    }

    #[test]
    fn test_upload_status_precedes_request() {
        let mut controller = controller();
        let effects = controller.on_files(
            SelectionSource::Picker,
            vec![SelectedFile::new("cat.png", "image/png", 3, 7)],
        );
        assert_eq!(
            effects,
            vec![
                Effect::SetStatus(Status::pending(messages::UPLOADING)),
                Effect::SendUpload {
                    url: "/upload".to_string(),
                    file: 7
                },
            ]
        );
        assert_eq!(controller.state().phase(), Phase::Uploading);
    }

    #[test]
    fn test_second_upload_while_uploading_is_refused() {
        let mut controller = controller();
        let file = SelectedFile::new("cat.png", "image/png", 3, 7);
        controller.on_files(SelectionSource::Drop, vec![file.clone()]);
        let effects = controller.on_files(SelectionSource::Drop, vec![file]);
        assert_eq!(effects, vec![Effect::SetStatus(Status::error(messages::BUSY))]);
    }

    #[test]
    fn test_empty_drop_does_nothing() {
        let mut controller = controller();
        assert!(controller.on_files(SelectionSource::Drop, Vec::new()).is_empty());
        assert!(!controller.state().is_busy());
    }

    #[test]
    fn test_upload_failure_leaves_display_alone() {
        let mut controller = with_image("old.png");
        controller.on_files(
            SelectionSource::Drop,
            vec![SelectedFile::new("new.png", "image/png", 3, 8)],
        );
        let effects = controller.on_upload_finished(Err(SnapError::Transport(
            "Failed to fetch".to_string(),
        )));
        assert_eq!(
            effects,
            vec![Effect::SetStatus(Status::error("Upload failed: Failed to fetch"))]
        );
        assert_eq!(controller.state().current_filename(), Some("old.png"));
        assert!(!controller.state().is_busy());
    }

    #[test]
    fn test_delete_click_without_image_is_ignored() {
        let mut controller = controller();
        assert!(controller.on_delete_clicked(0.0, 0.5).is_empty());
    }

    #[test]
    fn test_delete_click_during_upload_reports_busy() {
        let mut controller = with_image("a.png");
        controller.on_files(
            SelectionSource::Picker,
            vec![SelectedFile::new("dog.png", "image/png", 3, 8)],
        );
        assert_eq!(
            controller.on_delete_clicked(0.0, 0.5),
            vec![Effect::SetStatus(Status::error(messages::BUSY))]
        );
        assert_eq!(controller.state().phase(), Phase::Uploading);
    }

    #[test]
    fn test_delete_click_starts_animation() {
        let mut controller = with_image("a.png");
        let effects = controller.on_delete_clicked(100.0, 0.25);
        assert_eq!(
            effects,
            vec![
                Effect::HideDeleteButton,
                Effect::SetNoiseSeed(250),
                Effect::RequestFrame,
            ]
        );
        assert!(controller.state().is_animating());
    }

    #[test]
    fn test_frames_before_the_end_request_more_frames() {
        let mut controller = with_image("a.png");
        controller.on_delete_clicked(100.0, 0.0);
        let effects = controller.on_animation_frame(600.0);
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[1], Effect::RequestFrame);
        assert!(controller.visuals().displacement > 0.0);
        assert!(controller.visuals().scale > 1.0);
    }

    #[test]
    fn test_frame_timestamp_before_click_is_clamped() {
        let mut controller = with_image("a.png");
        controller.on_delete_clicked(100.0, 0.0);
        let effects = controller.on_animation_frame(90.0);
        assert_eq!(effects[0], Effect::ApplyVisuals(VisualParams::resting()));
    }

    #[test]
    fn test_last_frame_sends_delete() {
        let mut controller = with_image("a.png");
        controller.on_delete_clicked(0.0, 0.0);
        let effects = controller.on_animation_frame(1000.0);
        assert_eq!(
            effects.last(),
            Some(&Effect::SendDelete {
                url: "/delete/a.png".to_string(),
                filename: "a.png".to_string()
            })
        );
        assert_eq!(controller.state().phase(), Phase::Deleting);
        assert!(controller.on_animation_frame(1016.0).is_empty());
    }

    #[test]
    fn test_frames_outside_animation_are_ignored() {
        let mut controller = with_image("a.png");
        assert!(controller.on_animation_frame(10.0).is_empty());
    }
}
