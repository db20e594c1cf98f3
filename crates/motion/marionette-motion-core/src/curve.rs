//! Curve segments and motion curves.
//!
//! Model:
//! - A curve is an ordered chain of segments; segment i ends exactly where
//!   segment i+1 starts.
//! - Linear and bezier segments interpolate over their time span; stepped
//!   holds the first value, inverse stepped holds the second.
//! - Outside the chain the curve holds its first/last value.

use serde::{Deserialize, Serialize};

use crate::binding::{ParameterHandle, PartHandle};
use crate::error::{MotionError, Result};
use crate::interp::lerp_f32;

const KIND_LINEAR: u8 = 0;
const KIND_BEZIER: u8 = 1;
const KIND_STEPPED: u8 = 2;
const KIND_INVERSE_STEPPED: u8 = 3;

/// A control point: time in seconds and value.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionPoint {
    pub time: f32,
    pub value: f32,
}

impl MotionPoint {
    #[inline]
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }

    /// Component-wise lerp of time and value.
    #[inline]
    pub fn lerp(self, other: MotionPoint, t: f32) -> MotionPoint {
        MotionPoint {
            time: lerp_f32(self.time, other.time, t),
            value: lerp_f32(self.value, other.value, t),
        }
    }
}

/// One piece of a curve.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Segment {
    Linear([MotionPoint; 2]),
    /// Cubic bezier: start, two control points, end.
    Bezier([MotionPoint; 4]),
    Stepped([MotionPoint; 2]),
    InverseStepped([MotionPoint; 2]),
}

/// Normalized position of `time` between `a` and `b`, clamped to [0, 1].
/// A zero-length span counts as already finished.
#[inline]
fn normalized(time: f32, a: MotionPoint, b: MotionPoint) -> f32 {
    let span = b.time - a.time;
    if span <= 0.0 {
        return 1.0;
    }
    ((time - a.time) / span).clamp(0.0, 1.0)
}

impl Segment {
    #[inline]
    pub fn points(&self) -> &[MotionPoint] {
        match self {
            Segment::Linear(p) | Segment::Stepped(p) | Segment::InverseStepped(p) => p,
            Segment::Bezier(p) => p,
        }
    }

    #[inline]
    pub fn first_point(&self) -> MotionPoint {
        self.points()[0]
    }

    #[inline]
    pub fn last_point(&self) -> MotionPoint {
        match self {
            Segment::Linear(p) | Segment::Stepped(p) | Segment::InverseStepped(p) => p[1],
            Segment::Bezier(p) => p[3],
        }
    }

    /// Value of the segment at `time` (expected inside the segment span).
    pub fn evaluate(&self, time: f32) -> f32 {
        match self {
            Segment::Linear([p0, p1]) => {
                let t = normalized(time, *p0, *p1);
                lerp_f32(p0.value, p1.value, t)
            }
            Segment::Bezier([p0, p1, p2, p3]) => {
                let t = normalized(time, *p0, *p3);
                // De Casteljau reduction.
                let p01 = p0.lerp(*p1, t);
                let p12 = p1.lerp(*p2, t);
                let p23 = p2.lerp(*p3, t);
                let p012 = p01.lerp(p12, t);
                let p123 = p12.lerp(p23, t);
                p012.lerp(p123, t).value
            }
            Segment::Stepped([p0, _]) => p0.value,
            Segment::InverseStepped([_, p1]) => p1.value,
        }
    }
}

/// What a curve writes to.
#[derive(Clone, Debug, PartialEq)]
pub enum CurveTarget {
    Parameter(ParameterHandle),
    PartOpacity(PartHandle),
    /// Named effect channel; produces a coefficient instead of a store write.
    Effect(String),
}

/// An ordered chain of segments targeting one animatable quantity.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionCurve {
    pub target: CurveTarget,
    pub segments: Vec<Segment>,
    /// Per-curve fade-in override; `None` defers to the motion's global fade.
    pub fade_in_seconds: Option<f32>,
    /// Per-curve fade-out override; `None` defers to the motion's global fade.
    pub fade_out_seconds: Option<f32>,
}

impl MotionCurve {
    pub fn new(target: CurveTarget, segments: Vec<Segment>) -> Self {
        Self {
            target,
            segments,
            fade_in_seconds: None,
            fade_out_seconds: None,
        }
    }

    /// Whether either fade override is present.
    #[inline]
    pub fn has_fade_override(&self) -> bool {
        self.fade_in_seconds.is_some() || self.fade_out_seconds.is_some()
    }

    /// Value of the curve at `time`, holding the first/last value outside the chain.
    pub fn evaluate(&self, time: f32) -> f32 {
        for segment in &self.segments {
            let last = segment.last_point();
            if time <= last.time {
                let first = segment.first_point();
                if first.time <= time {
                    return segment.evaluate(time);
                }
                // Before the segment starts: hold its first value.
                return first.value;
            }
        }
        self.segments
            .last()
            .map(|s| s.last_point().value)
            .unwrap_or(0.0)
    }

    /// Time of the last control point (0 for an empty curve).
    pub fn end_time(&self) -> f32 {
        self.segments
            .last()
            .map(|s| s.last_point().time)
            .unwrap_or(0.0)
    }
}

/// Decode the flat segment encoding of [`crate::data::CurveData`].
///
/// A curve with only a start point decodes to a single constant segment.
pub fn decode_segments(curve: &str, flat: &[f32]) -> Result<Vec<Segment>> {
    let malformed = |reason: String| MotionError::MalformedSegments {
        curve: curve.to_string(),
        reason,
    };
    if flat.len() < 2 {
        return Err(malformed(format!(
            "expected at least a start point, got {} numbers",
            flat.len()
        )));
    }

    let mut last = MotionPoint::new(flat[0], flat[1]);
    let mut segments = Vec::new();
    let mut i = 2;
    while i < flat.len() {
        let tag = flat[i];
        let kind = tag as u8;
        if tag.fract() != 0.0 || tag < 0.0 || kind > KIND_INVERSE_STEPPED {
            return Err(MotionError::UnknownSegmentKind {
                curve: curve.to_string(),
                kind: tag,
            });
        }
        let point_count = if kind == KIND_BEZIER { 3 } else { 1 };
        let end = i + 1 + point_count * 2;
        if end > flat.len() {
            return Err(malformed(format!("segment at offset {i} is truncated")));
        }
        let read = |k: usize| MotionPoint::new(flat[i + 1 + k * 2], flat[i + 2 + k * 2]);
        let segment = match kind {
            KIND_LINEAR => Segment::Linear([last, read(0)]),
            KIND_BEZIER => Segment::Bezier([last, read(0), read(1), read(2)]),
            KIND_STEPPED => Segment::Stepped([last, read(0)]),
            _ => Segment::InverseStepped([last, read(0)]),
        };
        let next = segment.last_point();
        if next.time < last.time {
            return Err(malformed(format!(
                "segment at offset {i} ends at {} before it starts at {}",
                next.time, last.time
            )));
        }
        segments.push(segment);
        last = next;
        i = end;
    }

    if segments.is_empty() {
        segments.push(Segment::Stepped([last, last]));
    }
    Ok(segments)
}
