//! Staggered reveal-and-fade animation for the arcs
//!
//! All arcs share one master timeline. Arc `i` starts drawing `i * stagger`
//! seconds into each cycle, eases its draw range from nothing to the full
//! path, holds, fades out, and is reset before the next cycle begins.

use crate::arc::Arc;
use crate::tween::{Ease, Tween};
use glam::Vec3;

/// Timing parameters of the master timeline, in seconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineParams {
    /// Wait before the very first cycle
    pub start_delay: f32,
    /// Offset between the starts of successive arcs
    pub stagger: f32,
    pub reveal_duration: f32,
    pub reveal_ease: Ease,
    /// Pause between fully drawn and fading
    pub hold: f32,
    pub fade_duration: f32,
    pub fade_ease: Ease,
    pub base_opacity: f32,
    /// Gap between the end of one cycle and the start of the next
    pub repeat_delay: f32,
}

impl Default for TimelineParams {
    fn default() -> Self {
        Self {
            start_delay: 1.0,
            stagger: 0.1,
            reveal_duration: 1.5,
            reveal_ease: Ease::Power1InOut,
            hold: 0.2,
            fade_duration: 0.5,
            fade_ease: Ease::Linear,
            base_opacity: 0.7,
            repeat_delay: 1.0,
        }
    }
}

impl TimelineParams {
    /// Cycle-relative time at which arc `index` starts revealing
    pub fn offset(&self, index: usize) -> f32 {
        index as f32 * self.stagger
    }

    /// Length of one master cycle for `arc_count` arcs, including the repeat gap.
    /// Never shorter than the last arc's fade, so no arc is cut off mid-cycle.
    pub fn period(&self, arc_count: usize) -> f32 {
        let span = self.offset(arc_count.saturating_sub(1)) + self.reveal_duration;
        let with_fade = span + self.hold + self.fade_duration;
        (span + self.repeat_delay).max(with_fade).max(f32::EPSILON)
    }

    fn reveal_tween(&self, total: usize) -> Tween {
        Tween::new(0.0, total as f32, self.reveal_duration).with_ease(self.reveal_ease)
    }

    fn fade_tween(&self) -> Tween {
        Tween::new(self.base_opacity, 0.0, self.fade_duration)
            .with_delay(self.reveal_duration + self.hold)
            .with_ease(self.fade_ease)
    }
}

/// Where an arc is in its reveal cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    Revealing,
    FullyDrawn,
    FadingOut,
}

/// Mutable draw state of one arc
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcAnimation {
    pub phase: Phase,
    /// Leading sampled points currently drawn
    pub visible_count: usize,
    pub opacity: f32,
}

impl ArcAnimation {
    pub fn hidden(base_opacity: f32) -> Self {
        Self { phase: Phase::Hidden, visible_count: 0, opacity: base_opacity }
    }

    pub fn is_visible(&self) -> bool {
        self.visible_count > 1 && self.opacity > 0.0
    }
}

/// State of arc `index` with `total` sampled points, `cycle_time` seconds into
/// the current cycle.
pub fn arc_state(params: &TimelineParams, index: usize, total: usize, cycle_time: f32) -> ArcAnimation {
    let local = cycle_time - params.offset(index);
    let hidden = ArcAnimation::hidden(params.base_opacity);
    if local < 0.0 {
        return hidden;
    }

    let fade = params.fade_tween();
    if local < params.reveal_duration {
        let drawn = params.reveal_tween(total).value_at(local).floor().max(0.0) as usize;
        let visible_count = drawn.min(total);
        let phase = if visible_count == total { Phase::FullyDrawn } else { Phase::Revealing };
        ArcAnimation { phase, visible_count, opacity: params.base_opacity }
    } else if local < fade.delay {
        ArcAnimation { phase: Phase::FullyDrawn, visible_count: total, opacity: params.base_opacity }
    } else if local < fade.end_time() {
        ArcAnimation {
            phase: Phase::FadingOut,
            visible_count: total,
            opacity: fade.value_at(local).clamp(0.0, 1.0),
        }
    } else {
        hidden
    }
}

/// Drives every arc's [`ArcAnimation`] from one shared clock
pub struct RevealAnimator {
    params: TimelineParams,
    totals: Vec<usize>,
    states: Vec<ArcAnimation>,
    elapsed: f64,
}

impl RevealAnimator {
    /// One animation slot per entry of `totals`, the sampled point count of each arc
    pub fn new(params: TimelineParams, totals: Vec<usize>) -> Self {
        let states = vec![ArcAnimation::hidden(params.base_opacity); totals.len()];
        Self { params, totals, states, elapsed: 0.0 }
    }

    pub fn for_arcs(params: TimelineParams, arcs: &[Arc]) -> Self {
        Self::new(params, arcs.iter().map(Arc::len).collect())
    }

    pub fn states(&self) -> &[ArcAnimation] {
        &self.states
    }

    pub fn period(&self) -> f32 {
        self.params.period(self.totals.len())
    }

    /// Advance the master clock by `dt` seconds and refresh every arc
    pub fn tick(&mut self, dt: f64) {
        self.elapsed += dt.max(0.0);
        self.refresh();
    }

    /// Jump the master clock to `time` seconds
    pub fn seek(&mut self, time: f64) {
        self.elapsed = time.max(0.0);
        self.refresh();
    }

    /// Time into the current cycle, or `None` during the start delay
    pub fn cycle_time(&self) -> Option<f32> {
        let since_start = self.elapsed - self.params.start_delay as f64;
        if since_start < 0.0 {
            return None;
        }
        Some(since_start.rem_euclid(self.period() as f64) as f32)
    }

    fn refresh(&mut self) {
        let cycle_time = self.cycle_time();
        for (index, (state, &total)) in self.states.iter_mut().zip(&self.totals).enumerate() {
            *state = match cycle_time {
                Some(t) => arc_state(&self.params, index, total, t),
                None => ArcAnimation::hidden(self.params.base_opacity),
            };
        }
    }
}

/// The drawn prefix of an arc's path
pub fn visible_points<'a>(arc: &'a Arc, state: &ArcAnimation) -> &'a [Vec3] {
    &arc.points[..state.visible_count.min(arc.points.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc::ARC_SEGMENTS;

    const N: usize = ARC_SEGMENTS + 1;

    fn animator(arcs: usize) -> RevealAnimator {
        RevealAnimator::new(TimelineParams::default(), vec![N; arcs])
    }

    #[test]
    fn everything_hidden_during_start_delay() {
        let mut anim = animator(5);
        anim.seek(0.99);
        assert!(anim.states().iter().all(|s| *s == ArcAnimation::hidden(0.7)));
        assert_eq!(anim.cycle_time(), None);
    }

    #[test]
    fn arc_three_starts_at_its_stagger_offset() {
        let mut anim = animator(15);
        assert!((TimelineParams::default().offset(3) - 0.3).abs() < 1e-6);

        anim.seek(1.29);
        assert_eq!(anim.states()[3].phase, Phase::Hidden);
        assert_eq!(anim.states()[2].phase, Phase::Revealing);

        anim.seek(1.32);
        assert_eq!(anim.states()[3].phase, Phase::Revealing);
        assert_eq!(anim.states()[4].phase, Phase::Hidden);
    }

    #[test]
    fn reveal_is_bounded_and_non_decreasing() {
        let mut anim = animator(4);
        let mut prev = vec![0usize; 4];
        let mut saw_full = [false; 4];

        // 60 fps through the first reveal of every arc
        for _ in 0..200 {
            anim.tick(1.0 / 60.0);
            for (i, s) in anim.states().iter().enumerate() {
                assert!(s.visible_count <= N);
                if matches!(s.phase, Phase::Revealing | Phase::FullyDrawn) {
                    assert!(s.visible_count >= prev[i], "arc {} shrank", i);
                }
                if s.phase == Phase::FullyDrawn {
                    saw_full[i] = true;
                }
                prev[i] = s.visible_count;
            }
        }
        assert!(saw_full.iter().all(|&f| f));
    }

    #[test]
    fn reveal_eases_in() {
        let p = TimelineParams::default();
        let early = arc_state(&p, 0, N, 0.15);
        let mid = arc_state(&p, 0, N, 0.75);
        // linear would be 5 points after a tenth of the duration
        assert!(early.visible_count < 5);
        assert_eq!(mid.visible_count, N / 2);
    }

    #[test]
    fn hold_then_fade_then_reset() {
        let p = TimelineParams::default();

        let held = arc_state(&p, 0, N, 1.6);
        assert_eq!(held.phase, Phase::FullyDrawn);
        assert_eq!(held.visible_count, N);
        assert_eq!(held.opacity, 0.7);

        let fading = arc_state(&p, 0, N, 1.95);
        assert_eq!(fading.phase, Phase::FadingOut);
        assert!((fading.opacity - 0.35).abs() < 1e-4);

        let reset = arc_state(&p, 0, N, 2.25);
        assert_eq!(reset, ArcAnimation::hidden(0.7));
    }

    #[test]
    fn full_cycle_returns_to_start_state() {
        let mut anim = animator(6);
        let period = anim.period() as f64;
        // just before a cycle boundary every arc is parked
        anim.seek(1.0 + period - 0.01);
        let start: Vec<ArcAnimation> = anim.states().to_vec();
        assert!(start.iter().all(|s| *s == ArcAnimation::hidden(0.7)));

        let mut visited_fade = false;
        let steps = 500;
        for _ in 0..steps {
            anim.tick(period / steps as f64);
            visited_fade |= anim.states().iter().any(|s| s.phase == Phase::FadingOut);
        }
        assert!(visited_fade);
        assert_eq!(anim.states(), start.as_slice());
    }

    #[test]
    fn cycles_repeat_identically() {
        let mut anim = animator(15);
        let period = anim.period() as f64;

        anim.seek(1.0 + 0.85);
        let first: Vec<ArcAnimation> = anim.states().to_vec();
        anim.seek(1.0 + 0.85 + period * 3.0);
        let later: Vec<ArcAnimation> = anim.states().to_vec();

        for (a, b) in first.iter().zip(&later) {
            assert_eq!(a.phase, b.phase);
            assert!((a.visible_count as i64 - b.visible_count as i64).abs() <= 1);
        }
    }

    #[test]
    fn period_covers_last_fade() {
        let p = TimelineParams::default();
        // 14 * 0.1 + 1.5 + 1.0
        assert!((p.period(15) - 3.9).abs() < 1e-5);

        let tight = TimelineParams { repeat_delay: 0.0, ..p };
        assert!((tight.period(15) - (1.4 + 1.5 + 0.2 + 0.5)).abs() < 1e-5);
    }

    #[test]
    fn visible_points_follow_count() {
        use crate::arc::build_arc;
        let arc = build_arc(Vec3::X, Vec3::Z, 1.0, ARC_SEGMENTS);
        let state = ArcAnimation { phase: Phase::Revealing, visible_count: 10, opacity: 0.7 };
        assert_eq!(visible_points(&arc, &state).len(), 10);
        assert_eq!(visible_points(&arc, &ArcAnimation::hidden(0.7)).len(), 0);
    }
}
