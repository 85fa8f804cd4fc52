//! Candidate time segments.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A contiguous time window of the source video, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimeSegment {
    /// Start timestamp in seconds
    pub start: f64,

    /// End timestamp in seconds (exclusive)
    pub end: f64,
}

/// Segment bounds violation.
///
/// Invariant: `0 <= start < end <= video_duration`.
#[derive(Debug, Clone, Error)]
#[error("segment {start:.3}s..{end:.3}s violates bounds 0..{video_duration:.3}s")]
pub struct SegmentBoundsError {
    pub start: f64,
    pub end: f64,
    pub video_duration: f64,
}

impl TimeSegment {
    /// Create a new time segment.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Duration of this segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Temporal midpoint, used for representative frame sampling.
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Relative position of the segment start within the video (0 = start, 1 = end).
    pub fn position_ratio(&self, video_duration: f64) -> f64 {
        if video_duration > 0.0 {
            self.start / video_duration
        } else {
            0.0
        }
    }

    /// Check the bounds invariant against the source duration.
    pub fn validate(&self, video_duration: f64) -> Result<(), SegmentBoundsError> {
        if self.start >= 0.0 && self.start < self.end && self.end <= video_duration {
            Ok(())
        } else {
            Err(SegmentBoundsError {
                start: self.start,
                end: self.end,
                video_duration,
            })
        }
    }

    /// Whether two segments overlap in time.
    pub fn overlaps(&self, other: &TimeSegment) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_and_midpoint() {
        let seg = TimeSegment::new(2.0, 7.0);
        assert_eq!(seg.duration(), 5.0);
        assert_eq!(seg.midpoint(), 4.5);
    }

    #[test]
    fn test_position_ratio() {
        let seg = TimeSegment::new(30.0, 35.0);
        assert!((seg.position_ratio(100.0) - 0.3).abs() < 1e-9);
        assert_eq!(seg.position_ratio(0.0), 0.0);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(TimeSegment::new(0.0, 5.0).validate(10.0).is_ok());
        assert!(TimeSegment::new(5.0, 10.0).validate(10.0).is_ok());
        assert!(TimeSegment::new(-1.0, 5.0).validate(10.0).is_err());
        assert!(TimeSegment::new(5.0, 5.0).validate(10.0).is_err());
        assert!(TimeSegment::new(5.0, 11.0).validate(10.0).is_err());
    }

    #[test]
    fn test_overlaps() {
        let a = TimeSegment::new(0.0, 5.0);
        let b = TimeSegment::new(4.0, 8.0);
        let c = TimeSegment::new(5.0, 8.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c), "touching segments do not overlap");
    }
}
