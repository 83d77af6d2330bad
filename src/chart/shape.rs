//! Annotation shapes drawn on the price pane.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Retracement levels drawn between the two anchors of a Fibonacci shape
pub const FIB_LEVELS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// A point in data space: fractional bar index and price.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Anchor {
    pub idx: f64,
    pub price: f64,
}

impl Anchor {
    pub fn new(idx: f64, price: f64) -> Self {
        Self { idx, price }
    }

    pub fn translated(self, d_idx: f64, d_price: f64) -> Self {
        Self::new(self.idx + d_idx, self.price + d_price)
    }
}

/// Geometry of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeKind {
    HLine { price: f64 },
    Trend { a: Anchor, b: Anchor },
    Fib { a: Anchor, b: Anchor },
}

/// Part of a shape grabbed by the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    /// The whole shape
    Line,
    A,
    B,
}

impl ShapeKind {
    /// The two anchors of a trend or fib shape
    pub fn anchors(&self) -> Option<(Anchor, Anchor)> {
        match *self {
            ShapeKind::HLine { .. } => None,
            ShapeKind::Trend { a, b } | ShapeKind::Fib { a, b } => Some((a, b)),
        }
    }

    /// Move the whole shape; trend and fib anchors keep their offset.
    pub fn translated(&self, d_idx: f64, d_price: f64) -> Self {
        match *self {
            ShapeKind::HLine { price } => ShapeKind::HLine {
                price: price + d_price,
            },
            ShapeKind::Trend { a, b } => ShapeKind::Trend {
                a: a.translated(d_idx, d_price),
                b: b.translated(d_idx, d_price),
            },
            ShapeKind::Fib { a, b } => ShapeKind::Fib {
                a: a.translated(d_idx, d_price),
                b: b.translated(d_idx, d_price),
            },
        }
    }

    /// Replace one anchor. Handles a shape does not have leave it unchanged.
    pub fn with_anchor(&self, handle: Handle, anchor: Anchor) -> Self {
        match (*self, handle) {
            (ShapeKind::Trend { b, .. }, Handle::A) => ShapeKind::Trend { a: anchor, b },
            (ShapeKind::Trend { a, .. }, Handle::B) => ShapeKind::Trend { a, b: anchor },
            (ShapeKind::Fib { b, .. }, Handle::A) => ShapeKind::Fib { a: anchor, b },
            (ShapeKind::Fib { a, .. }, Handle::B) => ShapeKind::Fib { a, b: anchor },
            (kind, _) => kind,
        }
    }

    /// Same shape with anchor `b` set
    pub fn completed(&self, b: Anchor) -> Self {
        self.with_anchor(Handle::B, b)
    }

    /// Prices of each retracement level, level 0 at `b` and 1 at `a`
    pub fn fib_levels(&self) -> Vec<(f64, f64)> {
        match *self {
            ShapeKind::Fib { a, b } => FIB_LEVELS
                .iter()
                .map(|&level| (level, b.price - (b.price - a.price) * level))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A user annotation.
///
/// `draft` marks a two-click shape whose second anchor is still pending;
/// drafts never reach the persisted collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: Uuid,
    pub kind: ShapeKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub draft: bool,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            created_at: now,
            updated_at: now,
            draft: false,
        }
    }

    pub fn draft(kind: ShapeKind) -> Self {
        Self {
            draft: true,
            ..Self::new(kind)
        }
    }

    /// Copy with new geometry and a fresh `updated_at`
    pub fn with_kind(&self, kind: ShapeKind) -> Self {
        Self {
            kind,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}
