//! Duration-weighted timeline for highlighting segments inside their source video.

use super::Segment;
use serde::Serialize;

/// Position of one segment on its video's timeline bar, in percent of the bar.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineMark {
    pub segment_id: String,
    pub timestamp: u64,
    pub left_percent: f64,
    pub width_percent: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Timeline {
    /// Length of the source video as far as the segments reveal it.
    pub total_seconds: f64,
    pub marks: Vec<TimelineMark>,
}

impl Timeline {
    /// Lay out `segments` over the span they cover.
    ///
    /// The source video's length isn't in the index, so it is taken as the
    /// furthest segment end. Zero-length spans produce no marks.
    pub fn for_segments(segments: &[Segment]) -> Self {
        let total_seconds = segments
            .iter()
            .map(|s| s.timestamp as f64 + s.duration_seconds())
            .fold(0.0f64, f64::max);

        if total_seconds <= 0.0 {
            return Self::default();
        }

        let marks = segments
            .iter()
            .map(|s| {
                let left = (s.timestamp as f64 / total_seconds * 100.0).clamp(0.0, 100.0);
                let width = (s.duration_seconds() / total_seconds * 100.0).clamp(0.0, 100.0 - left);
                TimelineMark {
                    segment_id: s.id.clone(),
                    timestamp: s.timestamp,
                    left_percent: left,
                    width_percent: width,
                }
            })
            .collect();

        Self {
            total_seconds,
            marks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: &str, timestamp: u64, duration: &str) -> Segment {
        Segment {
            id: id.to_string(),
            title: String::new(),
            video_name: "v.mp4".to_string(),
            timestamp,
            duration: duration.to_string(),
            uri: String::new(),
            snippet: String::new(),
            persons: vec![],
            organizations: vec![],
            hash_tags: vec![],
            relevance_score: None,
            transcript_uri: None,
        }
    }

    #[test]
    fn test_marks_are_proportional() {
        let segments = vec![segment("a", 0, "15s"), segment("b", 45, "15s")];
        let timeline = Timeline::for_segments(&segments);

        assert_eq!(timeline.total_seconds, 60.0);
        assert_eq!(timeline.marks.len(), 2);
        assert_eq!(timeline.marks[0].left_percent, 0.0);
        assert_eq!(timeline.marks[0].width_percent, 25.0);
        assert_eq!(timeline.marks[1].left_percent, 75.0);
        assert_eq!(timeline.marks[1].width_percent, 25.0);
    }

    #[test]
    fn test_zero_span_has_no_marks() {
        let timeline = Timeline::for_segments(&[segment("a", 0, "0s")]);
        assert!(timeline.is_empty());
        assert_eq!(timeline.total_seconds, 0.0);

        assert!(Timeline::for_segments(&[]).is_empty());
    }

    #[test]
    fn test_unknown_duration_still_positions_start() {
        let segments = vec![segment("a", 30, "15s"), segment("b", 10, "?")];
        let timeline = Timeline::for_segments(&segments);

        assert_eq!(timeline.total_seconds, 45.0);
        let b = &timeline.marks[1];
        assert!((b.left_percent - 22.222).abs() < 0.01);
        assert_eq!(b.width_percent, 0.0);
    }
}
