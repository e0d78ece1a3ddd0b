use crate::Seconds;

/// Playhead position plus the tick-driven playback clock.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlaybackClock {
    time: Seconds,
    playing: bool,
    scrubbing: bool,
}

impl PlaybackClock {
    pub fn time(&self) -> Seconds {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    pub fn seek_to(&mut self, time: Seconds, total: Seconds) -> Seconds {
        if time.is_finite() {
            self.time = time.clamp(0.0, total.max(0.0));
        }
        self.time
    }

    /// Keep the playhead inside a (possibly shrunk) timeline.
    pub fn reclamp(&mut self, total: Seconds) {
        self.time = self.time.clamp(0.0, total.max(0.0));
    }

    pub fn play(&mut self, total: Seconds) {
        if self.time >= total {
            self.time = 0.0;
        }
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self, total: Seconds) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.play(total);
        }
        self.playing
    }

    /// Advance one animation tick. Reaching the end stops playback and rewinds to 0.
    pub fn tick(&mut self, step: Seconds, total: Seconds) -> Seconds {
        if !self.playing {
            return self.time;
        }
        let next = self.time + step;
        if next >= total {
            self.playing = false;
            self.time = 0.0;
        } else {
            self.time = next;
        }
        self.time
    }

    pub fn begin_scrub(&mut self) {
        self.scrubbing = true;
    }

    pub fn end_scrub(&mut self) {
        self.scrubbing = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// `m:ss`, truncating fractional seconds.
pub fn format_clock(seconds: Seconds) -> String {
    let whole = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// `m:ss.mmm`
pub fn format_precise(seconds: Seconds) -> String {
    let millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let whole = millis / 1000;
    format!("{}:{:02}.{:03}", whole / 60, whole % 60, millis % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_is_clamped() {
        let mut clock = PlaybackClock::default();
        assert_eq!(clock.seek_to(-3.0, 20.0), 0.0);
        assert_eq!(clock.seek_to(25.0, 20.0), 20.0);
        assert_eq!(clock.seek_to(f64::NAN, 20.0), 20.0);
        assert_eq!(clock.seek_to(7.25, 20.0), 7.25);
    }

    #[test]
    fn tick_crossing_end_stops_and_rewinds() {
        let mut clock = PlaybackClock::default();
        clock.seek_to(20.0 - 0.01, 20.0);
        clock.play(20.0);
        assert!(clock.is_playing());
        let time = clock.tick(1.0 / 60.0, 20.0);
        assert_eq!(time, 0.0);
        assert!(!clock.is_playing());
    }

    #[test]
    fn tick_while_paused_is_noop() {
        let mut clock = PlaybackClock::default();
        clock.seek_to(3.0, 20.0);
        assert_eq!(clock.tick(1.0 / 60.0, 20.0), 3.0);
    }

    #[test]
    fn play_from_end_restarts() {
        let mut clock = PlaybackClock::default();
        clock.seek_to(20.0, 20.0);
        assert!(clock.toggle(20.0));
        assert_eq!(clock.time(), 0.0);
        assert!(!clock.toggle(20.0));
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(59.9), "0:59");
        assert_eq!(format_clock(125.0), "2:05");
        assert_eq!(format_precise(65.5), "1:05.500");
    }
}
