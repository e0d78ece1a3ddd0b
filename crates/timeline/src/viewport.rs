use serde::Serialize;

use crate::playback::format_clock;
use crate::Seconds;

/// Candidate ruler intervals, finest first.
const RULER_STEPS: [Seconds; 10] = [0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0];

const MAX_RULER_TICKS: usize = 1000;

/// Horizontal pixel/time mapping for the timeline surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom_px_per_sec: f64,
    zoom_min: f64,
    zoom_max: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RulerTick {
    pub time: Seconds,
    pub x: f64,
    pub label: String,
}

impl Viewport {
    pub fn new(zoom: f64, zoom_min: f64, zoom_max: f64) -> Self {
        let mut viewport = Self {
            zoom_px_per_sec: zoom_min,
            zoom_min,
            zoom_max,
        };
        viewport.set_zoom(zoom);
        viewport
    }

    pub fn zoom(&self) -> f64 {
        self.zoom_px_per_sec
    }

    /// Clamp into the configured range. Non-finite input is ignored.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            self.zoom_px_per_sec = zoom.clamp(self.zoom_min, self.zoom_max);
        }
        self.zoom_px_per_sec
    }

    pub fn zoom_by(&mut self, factor: f64) -> f64 {
        self.set_zoom(self.zoom_px_per_sec * factor)
    }

    /// Zoom so `content_duration` spans `viewport_width_px`.
    pub fn fit(&mut self, viewport_width_px: f64, content_duration: Seconds) -> f64 {
        if content_duration <= 0.0 || !content_duration.is_finite() {
            return self.zoom_px_per_sec;
        }
        self.set_zoom(viewport_width_px / content_duration)
    }

    pub fn time_to_px(&self, time: Seconds) -> f64 {
        time * self.zoom_px_per_sec
    }

    pub fn px_to_time(&self, px: f64) -> Seconds {
        px / self.zoom_px_per_sec
    }

    /// Ruler marks from 0 through `total`, spaced at least `min_spacing_px` apart.
    /// Very long timelines widen the step to keep at most `MAX_RULER_TICKS` intervals.
    pub fn ruler(&self, total: Seconds, min_spacing_px: f64) -> Vec<RulerTick> {
        if !(total.is_finite() && total >= 0.0) {
            return Vec::new();
        }
        let mut step = RULER_STEPS
            .iter()
            .copied()
            .find(|step| self.time_to_px(*step) >= min_spacing_px)
            .unwrap_or(RULER_STEPS[RULER_STEPS.len() - 1]);
        while total / step > MAX_RULER_TICKS as f64 {
            step *= 2.0;
        }
        let count = (total / step).floor() as usize;
        (0..=count)
            .map(|i| {
                let time = i as f64 * step;
                RulerTick {
                    time,
                    x: self.time_to_px(time),
                    label: format_clock(time),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(50.0, 20.0, 200.0)
    }

    #[test]
    fn zoom_stays_in_bounds() {
        let mut vp = viewport();
        assert_eq!(vp.set_zoom(1_000_000.0), 200.0);
        assert_eq!(vp.set_zoom(-5.0), 20.0);
        assert_eq!(vp.set_zoom(0.0), 20.0);
        assert_eq!(vp.set_zoom(f64::NAN), 20.0);
        assert_eq!(vp.set_zoom(f64::INFINITY), 20.0);
        assert_eq!(vp.set_zoom(75.0), 75.0);
    }

    #[test]
    fn zoom_by_multiplies_and_clamps() {
        let mut vp = viewport();
        assert_eq!(vp.zoom_by(2.0), 100.0);
        assert_eq!(vp.zoom_by(4.0), 200.0);
        assert_eq!(vp.zoom_by(0.01), 20.0);
    }

    #[test]
    fn fit_lands_on_lower_bound() {
        let mut vp = viewport();
        assert_eq!(vp.fit(800.0, 40.0), 20.0);
    }

    #[test]
    fn fit_clamps_both_ways() {
        let mut vp = viewport();
        assert_eq!(vp.fit(100.0, 40.0), 20.0);
        assert_eq!(vp.fit(10_000.0, 10.0), 200.0);
        assert_eq!(vp.fit(1200.0, 12.0), 100.0);
    }

    #[test]
    fn pixel_round_trip() {
        let vp = Viewport::new(37.0, 20.0, 200.0);
        for time in [0.0, 0.5, 3.0, 12.5, 99.5] {
            let px = vp.time_to_px(time);
            assert!((vp.px_to_time(px) - time).abs() < 1e-9);
        }
    }

    #[test]
    fn ruler_spacing_follows_zoom() {
        let vp = Viewport::new(20.0, 20.0, 200.0);
        let ticks = vp.ruler(30.0, 60.0);
        assert_eq!(ticks[1].time, 5.0);
        assert_eq!(ticks.len(), 7);
        assert_eq!(ticks[6].label, "0:30");

        let vp = Viewport::new(200.0, 20.0, 200.0);
        let ticks = vp.ruler(2.0, 60.0);
        assert_eq!(ticks[1].time, 0.5);
        assert_eq!(ticks[1].x, 100.0);
    }

    #[test]
    fn ruler_tick_count_is_bounded() {
        let vp = Viewport::new(20.0, 20.0, 200.0);
        for total in [1.0e7, 1.0e12] {
            let ticks = vp.ruler(total, 60.0);
            assert!(ticks.len() <= MAX_RULER_TICKS + 1);
            assert!(ticks.len() > MAX_RULER_TICKS / 2);
            assert!(ticks.last().unwrap().time <= total);
        }
        assert!(vp.ruler(f64::INFINITY, 60.0).is_empty());
        assert!(vp.ruler(f64::NAN, 60.0).is_empty());
    }
}
