//! Event strip correlating external events with bar positions.

use chrono::{DateTime, Utc};
use egui::{Align2, Color32, Pos2, Rect, Stroke};
use serde::{Deserialize, Serialize};

use super::base::{ALERT_COLOR, BOOKMARK_COLOR, GREY_COLOR, NOTE_COLOR, PEN_WIDTH, WHITE_COLOR};
use super::canvas::Canvas;
use super::manager::BarManager;
use super::viewport::Viewport;

/// Pointer distance that still hits a marker
pub const MARKER_HIT_RADIUS: f32 = 5.0;

const MARKER_RADIUS: f32 = 3.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Alert,
    Bookmark,
    Note,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Alert => "Alert",
            EventKind::Bookmark => "Bookmark",
            EventKind::Note => "Note",
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            EventKind::Alert => ALERT_COLOR,
            EventKind::Bookmark => BOOKMARK_COLOR,
            EventKind::Note => NOTE_COLOR,
        }
    }

    pub fn all() -> &'static [EventKind] {
        &[EventKind::Alert, EventKind::Bookmark, EventKind::Note]
    }
}

/// An externally supplied event to mark on the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEvent {
    pub t: DateTime<Utc>,
    pub kind: EventKind,
    #[serde(default)]
    pub label: String,
}

impl ChartEvent {
    pub fn new(t: DateTime<Utc>, kind: EventKind, label: impl Into<String>) -> Self {
        Self {
            t,
            kind,
            label: label.into(),
        }
    }
}

/// Which event kinds the strip shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineFilter {
    pub alerts: bool,
    pub bookmarks: bool,
    pub notes: bool,
}

impl Default for TimelineFilter {
    fn default() -> Self {
        Self {
            alerts: true,
            bookmarks: true,
            notes: true,
        }
    }
}

impl TimelineFilter {
    pub fn allows(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Alert => self.alerts,
            EventKind::Bookmark => self.bookmarks,
            EventKind::Note => self.notes,
        }
    }

    pub fn toggle(&mut self, kind: EventKind) {
        match kind {
            EventKind::Alert => self.alerts = !self.alerts,
            EventKind::Bookmark => self.bookmarks = !self.bookmarks,
            EventKind::Note => self.notes = !self.notes,
        }
    }
}

/// A visible event placed on a bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Position in the event list
    pub event: usize,
    pub bar: usize,
    pub x: f32,
}

/// Event list plus its display filter.
#[derive(Debug, Default)]
pub struct Timeline {
    events: Vec<ChartEvent>,
    filter: TimelineFilter,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_events(&mut self, events: Vec<ChartEvent>) {
        self.events = events;
    }

    pub fn events(&self) -> &[ChartEvent] {
        &self.events
    }

    pub fn filter(&self) -> TimelineFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: TimelineFilter) {
        self.filter = filter;
    }

    /// Markers of the filtered events that land inside `view`, laid out
    /// over the x range of `rect`.
    pub fn markers(&self, bars: &BarManager, rect: Rect, view: Viewport) -> Vec<Marker> {
        if view.is_empty() {
            return Vec::new();
        }
        let slot = rect.width() / view.len() as f32;
        self.events
            .iter()
            .enumerate()
            .filter(|(_, event)| self.filter.allows(event.kind))
            .filter_map(|(ix, event)| {
                let bar = bars.nearest_index(event.t)?;
                if bar < view.start || bar >= view.end {
                    return None;
                }
                Some(Marker {
                    event: ix,
                    bar,
                    x: rect.left() + ((bar - view.start) as f32 + 0.5) * slot,
                })
            })
            .collect()
    }

    /// Event whose marker is closest to `pos`, within the hit radius
    pub fn hit(&self, pos: Pos2, bars: &BarManager, rect: Rect, view: Viewport) -> Option<&ChartEvent> {
        if pos.y < rect.top() - MARKER_HIT_RADIUS || pos.y > rect.bottom() + MARKER_HIT_RADIUS {
            return None;
        }
        self.markers(bars, rect, view)
            .into_iter()
            .map(|marker| (marker, (marker.x - pos.x).abs()))
            .filter(|(_, dx)| *dx <= MARKER_HIT_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .and_then(|(marker, _)| self.events.get(marker.event))
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, rect: Rect, bars: &BarManager, view: Viewport) {
        canvas.segment(
            Pos2::new(rect.left(), rect.center().y),
            Pos2::new(rect.right(), rect.center().y),
            Stroke::new(PEN_WIDTH, GREY_COLOR),
        );
        for marker in self.markers(bars, rect, view) {
            let event = &self.events[marker.event];
            let center = Pos2::new(marker.x, rect.center().y);
            canvas.dot(center, MARKER_RADIUS, event.kind.color());
            if !event.label.is_empty() && rect.width() / view.len() as f32 > 24.0 {
                canvas.label(
                    Pos2::new(marker.x + MARKER_RADIUS + 2.0, center.y),
                    Align2::LEFT_CENTER,
                    &event.label,
                    9.0,
                    WHITE_COLOR,
                );
            }
        }
    }
}
