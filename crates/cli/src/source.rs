use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use timeline::{ClipSource, MatchedClip};

const SHOT_NAMES: [&str; 8] = [
    "Opening Wide",
    "Street Crossing",
    "Close Up",
    "Crowd Pan",
    "Sunset Drive",
    "Studio Interview",
    "Drone Orbit",
    "Closing Shot",
];

/// Matched clips read from a JSON array on disk.
pub struct JsonClipSource {
    clips: Vec<MatchedClip>,
}

impl JsonClipSource {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading clips from {}", path.display()))?;
        let clips: Vec<MatchedClip> = serde_json::from_str(&text)
            .with_context(|| format!("parsing clips in {}", path.display()))?;
        Ok(Self { clips })
    }
}

impl ClipSource for JsonClipSource {
    fn matched_clips(&self) -> Vec<MatchedClip> {
        self.clips.clone()
    }
}

/// Stand-in for the matching stage: reproducible clips from a seed.
pub struct MockClipSource {
    count: usize,
    seed: u64,
}

impl MockClipSource {
    pub fn new(count: usize, seed: u64) -> Self {
        Self { count, seed }
    }
}

impl ClipSource for MockClipSource {
    fn matched_clips(&self) -> Vec<MatchedClip> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.count)
            .map(|i| {
                let clip_id = format!("clip-{:03}", i + 1);
                // Half-second steps between 2 and 15 seconds.
                let duration = rng.gen_range(4u32..=30) as f64 * 0.5;
                let transition = (i + 1 < self.count && rng.gen_bool(0.3))
                    .then(|| format!("transition-{:03}", i + 1));
                MatchedClip {
                    name: SHOT_NAMES[i % SHOT_NAMES.len()].to_string(),
                    duration,
                    thumbnail: Some(format!("thumbnails/{clip_id}.jpg")),
                    transition,
                    clip_id,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mock_source_is_reproducible() {
        let a = MockClipSource::new(6, 42).matched_clips();
        let b = MockClipSource::new(6, 42).matched_clips();
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert!(a.iter().all(|c| (2.0..=15.0).contains(&c.duration)));
        assert!(a.last().unwrap().transition.is_none());
    }

    #[test]
    fn json_source_reads_clip_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{ "clip_id": "c1", "name": "First", "duration": 4.5 }},
                {{ "clip_id": "c2", "name": "Second", "duration": 3.0, "transition": "t1" }}]"#
        )
        .unwrap();
        let clips = JsonClipSource::load(file.path()).unwrap().matched_clips();
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].thumbnail, None);
        assert_eq!(clips[1].transition.as_deref(), Some("t1"));
    }

    #[test]
    fn json_source_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonClipSource::load(&dir.path().join("nope.json"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("reading clips"));
    }
}
