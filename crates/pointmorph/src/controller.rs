use std::time::Duration;

use tracing::{debug, warn};

use crate::easing::EasingCurve;

/// Transition length used when nothing else is configured.
pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_secs(4);

/// Shader inputs the controller rebinds while driving a transition.
///
/// Implemented by the render side; indices always refer to gallery entries.
pub trait BlendBindings {
    /// Binds the texture and coordinate buffer of `index` as the source inputs.
    fn bind_source(&mut self, index: usize);
    /// Binds the texture and coordinate buffer of `index` as the target inputs.
    fn bind_target(&mut self, index: usize);
    /// Writes the blend scalar uniform.
    fn set_blend(&mut self, blend: f32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlendState {
    Idle {
        source: usize,
    },
    Transitioning {
        source: usize,
        target: usize,
        elapsed: Duration,
        blend: f32,
    },
}

/// Flat view of the controller state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendSnapshot {
    pub source: usize,
    pub target: usize,
    pub in_progress: bool,
    pub blend: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionOutcome {
    /// Nothing in flight.
    Idle,
    /// Transition running; carries the blend written this tick.
    InProgress(f32),
    /// Transition finished; carries the new source index.
    Completed(usize),
}

/// Idle/transitioning state machine behind the blend uniform.
///
/// At most one transition is in flight: requests made while transitioning are
/// dropped, and the source index only changes when a transition completes.
#[derive(Debug, Clone)]
pub struct BlendController {
    state: BlendState,
    image_count: usize,
    duration: Duration,
    curve: EasingCurve,
}

impl BlendController {
    /// Creates an idle controller and binds `initial_source` as both inputs.
    pub fn new<B: BlendBindings + ?Sized>(
        image_count: usize,
        initial_source: usize,
        duration: Duration,
        curve: EasingCurve,
        bindings: &mut B,
    ) -> Self {
        let source = if initial_source < image_count {
            initial_source
        } else {
            warn!(
                initial_source,
                image_count, "initial image index out of range; starting from the first image"
            );
            0
        };
        bindings.bind_source(source);
        bindings.bind_target(source);
        bindings.set_blend(0.0);
        Self {
            state: BlendState::Idle { source },
            image_count,
            duration,
            curve,
        }
    }

    pub fn state(&self) -> BlendState {
        self.state
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn curve(&self) -> EasingCurve {
        self.curve
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, BlendState::Transitioning { .. })
    }

    /// The image currently shown at rest.
    pub fn source(&self) -> usize {
        match self.state {
            BlendState::Idle { source } | BlendState::Transitioning { source, .. } => source,
        }
    }

    pub fn snapshot(&self) -> BlendSnapshot {
        match self.state {
            BlendState::Idle { source } => BlendSnapshot {
                source,
                target: source,
                in_progress: false,
                blend: 0.0,
            },
            BlendState::Transitioning {
                source,
                target,
                blend,
                ..
            } => BlendSnapshot {
                source,
                target,
                in_progress: true,
                blend,
            },
        }
    }

    /// Starts a transition towards `target`.
    ///
    /// Returns `false` without touching the bindings when a transition is
    /// already running, when `target` is the current source, or when `target`
    /// is outside the gallery.
    pub fn request_transition<B: BlendBindings + ?Sized>(
        &mut self,
        target: usize,
        bindings: &mut B,
    ) -> bool {
        let source = match self.state {
            BlendState::Transitioning {
                target: in_flight, ..
            } => {
                debug!(requested = target, in_flight, "transition in flight; ignoring request");
                return false;
            }
            BlendState::Idle { source } => source,
        };

        if target >= self.image_count {
            warn!(
                target,
                image_count = self.image_count,
                "requested image index out of range; ignoring"
            );
            return false;
        }
        if target == source {
            debug!(target, "requested image is already shown");
            return false;
        }

        bindings.bind_target(target);
        bindings.set_blend(0.0);
        self.state = BlendState::Transitioning {
            source,
            target,
            elapsed: Duration::ZERO,
            blend: 0.0,
        };
        debug!(source, target, duration_ms = self.duration.as_millis() as u64, "transition started");
        true
    }

    /// Advances the running transition by `dt`.
    pub fn tick<B: BlendBindings + ?Sized>(
        &mut self,
        dt: Duration,
        bindings: &mut B,
    ) -> TransitionOutcome {
        let BlendState::Transitioning {
            source,
            target,
            elapsed,
            ..
        } = self.state
        else {
            return TransitionOutcome::Idle;
        };

        let elapsed = elapsed.saturating_add(dt);
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f32() / self.duration.as_secs_f32()
        };

        if progress >= 1.0 {
            // Rebinding the finished target as source at blend 0 shows the
            // same frame as blend 1 and leaves the source bound for the next
            // request.
            bindings.set_blend(1.0);
            bindings.bind_source(target);
            bindings.set_blend(0.0);
            self.state = BlendState::Idle { source: target };
            debug!(previous = source, source = target, "transition completed");
            return TransitionOutcome::Completed(target);
        }

        let blend = self.curve.sample(progress);
        bindings.set_blend(blend);
        self.state = BlendState::Transitioning {
            source,
            target,
            elapsed,
            blend,
        };
        TransitionOutcome::InProgress(blend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Source(usize),
        Target(usize),
        Blend(f32),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl BlendBindings for Recorder {
        fn bind_source(&mut self, index: usize) {
            self.calls.push(Call::Source(index));
        }

        fn bind_target(&mut self, index: usize) {
            self.calls.push(Call::Target(index));
        }

        fn set_blend(&mut self, blend: f32) {
            self.calls.push(Call::Blend(blend));
        }
    }

    fn controller(recorder: &mut Recorder) -> BlendController {
        let controller = BlendController::new(
            3,
            0,
            Duration::from_secs(4),
            EasingCurve::Linear,
            recorder,
        );
        recorder.calls.clear();
        controller
    }

    #[test]
    fn new_binds_initial_image_on_both_sides() {
        let mut recorder = Recorder::default();
        let controller =
            BlendController::new(2, 1, Duration::from_secs(1), EasingCurve::EaseOut, &mut recorder);
        assert_eq!(
            recorder.calls,
            vec![Call::Source(1), Call::Target(1), Call::Blend(0.0)]
        );
        assert_eq!(controller.state(), BlendState::Idle { source: 1 });
    }

    #[test]
    fn out_of_range_initial_source_falls_back_to_first() {
        let mut recorder = Recorder::default();
        let controller =
            BlendController::new(2, 9, Duration::from_secs(1), EasingCurve::EaseOut, &mut recorder);
        assert_eq!(controller.source(), 0);
    }

    #[test]
    fn request_binds_target_and_resets_blend() {
        let mut recorder = Recorder::default();
        let mut controller = controller(&mut recorder);
        assert!(controller.request_transition(2, &mut recorder));
        assert_eq!(recorder.calls, vec![Call::Target(2), Call::Blend(0.0)]);
        assert_eq!(
            controller.snapshot(),
            BlendSnapshot {
                source: 0,
                target: 2,
                in_progress: true,
                blend: 0.0
            }
        );
    }

    #[test]
    fn request_for_current_source_is_a_no_op() {
        let mut recorder = Recorder::default();
        let mut controller = controller(&mut recorder);
        assert!(!controller.request_transition(0, &mut recorder));
        assert!(recorder.calls.is_empty());
        assert_eq!(controller.state(), BlendState::Idle { source: 0 });
    }

    #[test]
    fn out_of_range_request_is_ignored() {
        let mut recorder = Recorder::default();
        let mut controller = controller(&mut recorder);
        assert!(!controller.request_transition(3, &mut recorder));
        assert!(recorder.calls.is_empty());
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn requests_during_transition_leave_it_untouched() {
        let mut recorder = Recorder::default();
        let mut controller = controller(&mut recorder);
        controller.request_transition(1, &mut recorder);
        controller.tick(Duration::from_secs(1), &mut recorder);
        let before = controller.snapshot();
        recorder.calls.clear();

        for target in [0, 1, 2, 2, 0] {
            assert!(!controller.request_transition(target, &mut recorder));
        }
        assert!(recorder.calls.is_empty());
        assert_eq!(controller.snapshot(), before);
        assert_eq!(before.target, 1);
        assert!((before.blend - 0.25).abs() < 1e-6);
    }

    #[test]
    fn tick_follows_the_curve() {
        let mut recorder = Recorder::default();
        let mut controller = BlendController::new(
            2,
            0,
            Duration::from_secs(4),
            EasingCurve::EaseOut,
            &mut recorder,
        );
        controller.request_transition(1, &mut recorder);
        match controller.tick(Duration::from_secs(2), &mut recorder) {
            TransitionOutcome::InProgress(blend) => assert!((blend - 0.875).abs() < 1e-6),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn completion_commits_target_and_rebinds_source() {
        let mut recorder = Recorder::default();
        let mut controller = controller(&mut recorder);
        controller.request_transition(1, &mut recorder);
        assert!(matches!(
            controller.tick(Duration::from_secs(3), &mut recorder),
            TransitionOutcome::InProgress(_)
        ));
        recorder.calls.clear();

        let outcome = controller.tick(Duration::from_secs(2), &mut recorder);
        assert_eq!(outcome, TransitionOutcome::Completed(1));
        assert_eq!(
            recorder.calls,
            vec![Call::Blend(1.0), Call::Source(1), Call::Blend(0.0)]
        );
        assert_eq!(controller.state(), BlendState::Idle { source: 1 });
        assert_eq!(
            controller.tick(Duration::from_secs(1), &mut recorder),
            TransitionOutcome::Idle
        );
    }

    #[test]
    fn next_request_after_completion_starts_from_zero() {
        let mut recorder = Recorder::default();
        let mut controller = controller(&mut recorder);
        controller.request_transition(1, &mut recorder);
        controller.tick(Duration::from_secs(5), &mut recorder);
        assert_eq!(controller.source(), 1);

        assert!(controller.request_transition(2, &mut recorder));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.source, 1);
        assert_eq!(snapshot.target, 2);
        assert_eq!(snapshot.blend, 0.0);
        assert!(snapshot.in_progress);
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let mut recorder = Recorder::default();
        let mut controller =
            BlendController::new(2, 0, Duration::ZERO, EasingCurve::Linear, &mut recorder);
        controller.request_transition(1, &mut recorder);
        assert_eq!(
            controller.tick(Duration::ZERO, &mut recorder),
            TransitionOutcome::Completed(1)
        );
    }
}
