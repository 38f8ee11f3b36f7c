/// Edit session state machine
///
/// Governs the upload → processing → success/error lifecycle. Every
/// transition returns a fresh `SessionState` value instead of mutating in
/// place, so consumers can detect change by simple comparison.
///
/// Submissions are tagged with the generation of the original they target;
/// a result whose tag no longer matches (a newer upload or reset arrived
/// while the request was in flight) is discarded silently instead of being
/// applied to the wrong original.

use crate::encoding::EncodedImage;
use crate::presets::EditMode;

/// The whole observable session: original/processed images, in-flight
/// flag, last error, and active style.
///
/// Invariants held by the transitions:
/// - `processed` is never set while `original` is absent
/// - `in_flight` and `error` are mutually exclusive
/// - a failed edit leaves the previous `processed` untouched
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    original: Option<EncodedImage>,
    processed: Option<EncodedImage>,
    in_flight: bool,
    error: Option<String>,
    active_style: Option<EditMode>,
    /// Bumped on upload/reset; tags in-flight submissions
    generation: u64,
    /// Bumped whenever the (original, processed) pair changes identity
    pair: u64,
}

impl SessionState {
    /// A fresh, empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a new original image. Valid from any state.
    ///
    /// This is a hard reset: any processed result, error, or style
    /// selection belonging to a previous image is discarded.
    pub fn upload(&self, image: EncodedImage) -> Self {
        Self {
            original: Some(image),
            processed: None,
            in_flight: false,
            error: None,
            active_style: None,
            generation: self.generation + 1,
            pair: self.pair + 1,
        }
    }

    /// Enter the in-flight state for a submission.
    ///
    /// Only meaningful with an original present; without one the state is
    /// returned unchanged (the boundary never submits from `Empty`). Any
    /// prior processed image is kept so a failure can fall back to it.
    pub fn begin(&self, style: EditMode) -> Self {
        if self.original.is_none() {
            return self.clone();
        }

        Self {
            in_flight: true,
            error: None,
            active_style: Some(style),
            ..self.clone()
        }
    }

    /// Apply the outcome of a submission tagged with `tag`.
    ///
    /// A stale tag means the original it targeted is gone; the result is
    /// dropped and the state returned unchanged. Otherwise success stores
    /// the processed image and failure stores the error message, leaving
    /// any prior processed image as it was.
    pub fn finish(&self, tag: u64, outcome: Result<EncodedImage, String>) -> Self {
        if tag != self.generation {
            return self.clone();
        }

        match outcome {
            Ok(image) => Self {
                processed: Some(image),
                in_flight: false,
                error: None,
                pair: self.pair + 1,
                ..self.clone()
            },
            Err(message) => Self {
                in_flight: false,
                error: Some(message),
                ..self.clone()
            },
        }
    }

    /// Return to the empty state. Valid from any state.
    pub fn reset(&self) -> Self {
        Self {
            generation: self.generation + 1,
            pair: self.pair + 1,
            ..Self::default()
        }
    }

    /// The uploaded original, if any
    pub fn original(&self) -> Option<&EncodedImage> {
        self.original.as_ref()
    }

    /// The most recent processed result, if any
    pub fn processed(&self) -> Option<&EncodedImage> {
        self.processed.as_ref()
    }

    /// Whether a provider request is currently outstanding
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// The last submission error, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The style of the most recent submission
    pub fn active_style(&self) -> Option<EditMode> {
        self.active_style
    }

    /// Tag for the current original; attach to a submission and hand back
    /// to `finish`
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Identity token of the current comparison pair; the renderer resets
    /// its slider when this changes
    pub fn pair_token(&self) -> u64 {
        self.pair
    }

    /// No original loaded
    pub fn is_empty(&self) -> bool {
        self.original.is_none()
    }

    /// Both images exist and nothing is in flight, so the comparison
    /// slider is live
    pub fn has_comparison(&self) -> bool {
        self.processed.is_some() && !self.in_flight
    }
}

/// Equality is over the observable fields only; the generation/pair
/// counters are bookkeeping, so `reset()` compares equal to a pristine
/// session no matter the history.
impl PartialEq for SessionState {
    fn eq(&self, other: &Self) -> bool {
        self.original == other.original
            && self.processed == other.processed
            && self.in_flight == other.in_flight
            && self.error == other.error
            && self.active_style == other.active_style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::fixtures::tiny_png;

    fn processed_image() -> EncodedImage {
        // Distinct value is irrelevant for the machine; identity is enough
        tiny_png()
    }

    #[test]
    fn test_new_session_is_empty() {
        let state = SessionState::new();
        assert!(state.is_empty());
        assert!(state.processed().is_none());
        assert!(!state.in_flight());
        assert!(state.error().is_none());
        assert!(state.active_style().is_none());
    }

    #[test]
    fn test_upload_is_a_hard_reset() {
        let state = SessionState::new()
            .upload(tiny_png())
            .begin(EditMode::Quality)
            .finish(1, Err("boom".into()));

        let state = state.upload(tiny_png());

        assert!(state.original().is_some());
        assert!(state.processed().is_none());
        assert!(!state.in_flight());
        assert!(state.error().is_none());
        assert!(state.active_style().is_none());
    }

    #[test]
    fn test_begin_requires_an_original() {
        let empty = SessionState::new();
        let after = empty.begin(EditMode::Ghibli);
        assert_eq!(after, empty);
        assert!(!after.in_flight());
    }

    #[test]
    fn test_begin_sets_in_flight_and_clears_error() {
        let state = SessionState::new()
            .upload(tiny_png())
            .begin(EditMode::Quality)
            .finish(1, Err("transient".into()));
        assert!(state.error().is_some());

        let state = state.begin(EditMode::Ghibli);
        assert!(state.in_flight());
        assert!(state.error().is_none());
        assert_eq!(state.active_style(), Some(EditMode::Ghibli));
    }

    #[test]
    fn test_successful_submit() {
        // upload A → submit "Enhance" → provider returns B
        let state = SessionState::new()
            .upload(tiny_png())
            .begin(EditMode::Quality);
        let tag = state.generation();

        let state = state.finish(tag, Ok(processed_image()));

        assert!(state.original().is_some());
        assert!(state.processed().is_some());
        assert!(!state.in_flight());
        assert!(state.error().is_none());
        assert_eq!(state.active_style(), Some(EditMode::Quality));
        assert!(state.has_comparison());
    }

    #[test]
    fn test_failed_submit_keeps_prior_processed() {
        let state = SessionState::new()
            .upload(tiny_png())
            .begin(EditMode::Quality);
        let tag = state.generation();
        let state = state.finish(tag, Ok(processed_image()));

        let state = state.begin(EditMode::Batman);
        let state = state.finish(tag, Err("server exploded".into()));

        assert!(state.processed().is_some());
        assert!(!state.in_flight());
        assert_eq!(state.error(), Some("server exploded"));
    }

    #[test]
    fn test_no_image_failure_leaves_processed_absent() {
        let state = SessionState::new()
            .upload(tiny_png())
            .begin(EditMode::Potter);
        let tag = state.generation();

        let state = state.finish(tag, Err("the model declined to produce an image".into()));

        assert!(state.original().is_some());
        assert!(state.processed().is_none());
        assert!(!state.in_flight());
        assert!(state.error().is_some());
    }

    #[test]
    fn test_stale_result_after_new_upload_is_discarded() {
        let state = SessionState::new()
            .upload(tiny_png())
            .begin(EditMode::Quality);
        let stale_tag = state.generation();

        // A new original arrives while the request is in flight
        let state = state.upload(tiny_png());
        let after = state.finish(stale_tag, Ok(processed_image()));

        assert_eq!(after, state);
        assert!(after.processed().is_none());
        assert!(!after.in_flight());
    }

    #[test]
    fn test_stale_result_after_reset_is_discarded() {
        let state = SessionState::new()
            .upload(tiny_png())
            .begin(EditMode::Refine);
        let stale_tag = state.generation();

        let state = state.reset();
        let after = state.finish(stale_tag, Ok(processed_image()));

        assert!(after.is_empty());
        assert!(after.processed().is_none());
    }

    #[test]
    fn test_reset_from_any_state_is_the_empty_state() {
        let pristine = SessionState::new();

        let mid_flight = SessionState::new().upload(tiny_png()).begin(EditMode::Ghibli);
        assert_eq!(mid_flight.reset(), pristine);

        let failed = SessionState::new()
            .upload(tiny_png())
            .begin(EditMode::Quality)
            .finish(1, Err("boom".into()));
        assert_eq!(failed.reset(), pristine);

        assert_eq!(pristine.reset(), pristine);
    }

    #[test]
    fn test_pair_token_tracks_comparison_identity() {
        let state = SessionState::new().upload(tiny_png());
        let uploaded = state.pair_token();

        let state = state.begin(EditMode::Quality);
        assert_eq!(state.pair_token(), uploaded);

        let tag = state.generation();
        let failed = state.finish(tag, Err("nope".into()));
        assert_eq!(failed.pair_token(), uploaded);

        let succeeded = state.finish(tag, Ok(processed_image()));
        assert_ne!(succeeded.pair_token(), uploaded);

        // A fresh upload is a new pair as well
        assert_ne!(succeeded.upload(tiny_png()).pair_token(), succeeded.pair_token());
    }

    #[test]
    fn test_in_flight_and_error_are_mutually_exclusive() {
        let state = SessionState::new()
            .upload(tiny_png())
            .begin(EditMode::Quality);
        assert!(state.in_flight() && state.error().is_none());

        let state = state.finish(state.generation(), Err("bad".into()));
        assert!(!state.in_flight() && state.error().is_some());

        let state = state.begin(EditMode::Quality);
        assert!(state.in_flight() && state.error().is_none());
    }
}
