//! Draw-tool state machine: tool mode, shape creation, selection and drag
//! editing.
//!
//! The container owns the authoritative shape collection. The manager keeps
//! a mirror that is re-synchronised with [`DrawingManager::sync`] every
//! frame, and reports each mutation as a brand new collection through the
//! change callback.

use egui::Pos2;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::object::Bar;

use super::geometry::{distance, distance_to_segment, snap_price_to_ohlc};
use super::shape::{Anchor, Handle, Shape, ShapeKind};
use super::viewport::ChartTransform;

/// Pixel tolerance for hit-testing handles and line bodies
pub const HIT_TOLERANCE: f32 = 6.0;

/// Active drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DrawTool {
    /// Select and move shapes
    #[default]
    Cursor,
    HLine,
    Trend,
    Fib,
}

impl DrawTool {
    pub fn name(&self) -> &'static str {
        match self {
            DrawTool::Cursor => "Cursor",
            DrawTool::HLine => "H-Line",
            DrawTool::Trend => "Trend",
            DrawTool::Fib => "Fib",
        }
    }

    pub fn all() -> &'static [DrawTool] {
        &[DrawTool::Cursor, DrawTool::HLine, DrawTool::Trend, DrawTool::Fib]
    }

    /// Whether a draft belongs to this tool
    fn owns(&self, kind: &ShapeKind) -> bool {
        matches!(
            (self, kind),
            (DrawTool::Trend, ShapeKind::Trend { .. }) | (DrawTool::Fib, ShapeKind::Fib { .. })
        )
    }
}

/// Shape drag in progress, from pointer-down to pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub shape_id: Uuid,
    pub handle: Handle,
    /// Pointer position at drag start
    pub origin: Pos2,
    /// Shape geometry at drag start
    pub start: ShapeKind,
}

/// Receives the full shape collection after every mutation.
pub type ShapeCallback = Box<dyn FnMut(Vec<Shape>)>;

/// Owns tool mode, draft, selection and drag state.
#[derive(Default)]
pub struct DrawingManager {
    tool: DrawTool,
    snap: bool,
    shapes: Vec<Shape>,
    draft: Option<Shape>,
    selected: Option<Uuid>,
    drag: Option<DragState>,
    on_change: Option<ShapeCallback>,
}

impl DrawingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the collection change callback
    pub fn set_on_change(&mut self, callback: impl FnMut(Vec<Shape>) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn tool(&self) -> DrawTool {
        self.tool
    }

    /// Switch tool. Any pending draft is discarded.
    pub fn set_tool(&mut self, tool: DrawTool) {
        if self.tool == tool {
            return;
        }
        debug!(from = self.tool.name(), to = tool.name(), "draw tool changed");
        self.tool = tool;
        self.draft = None;
        self.drag = None;
        if tool != DrawTool::Cursor {
            self.selected = None;
        }
    }

    pub fn snap(&self) -> bool {
        self.snap
    }

    pub fn set_snap(&mut self, snap: bool) {
        self.snap = snap;
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn draft(&self) -> Option<&Shape> {
        self.draft.as_ref()
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Replace the mirror with the container's current collection.
    ///
    /// Selection and drag referring to shapes that no longer exist are
    /// dropped.
    pub fn sync(&mut self, shapes: &[Shape]) {
        self.shapes = shapes.iter().filter(|s| !s.draft).cloned().collect();
        if let Some(id) = self.selected {
            if !self.shapes.iter().any(|s| s.id == id) {
                self.selected = None;
            }
        }
        if let Some(drag) = &self.drag {
            if !self.shapes.iter().any(|s| s.id == drag.shape_id) {
                self.drag = None;
            }
        }
    }

    fn commit(&mut self, shapes: Vec<Shape>) {
        self.shapes = shapes.clone();
        if let Some(callback) = self.on_change.as_mut() {
            callback(shapes);
        }
    }

    /// Topmost shape part under `pos`: handles of every shape are tested
    /// before any line body.
    pub fn hit_test(&self, pos: Pos2, tf: &ChartTransform) -> Option<(Uuid, Handle)> {
        for shape in self.shapes.iter().rev() {
            if let Some((a, b)) = shape.kind.anchors() {
                if distance(pos, tf.to_screen(a)) <= HIT_TOLERANCE {
                    return Some((shape.id, Handle::A));
                }
                if distance(pos, tf.to_screen(b)) <= HIT_TOLERANCE {
                    return Some((shape.id, Handle::B));
                }
            }
        }
        self.shapes
            .iter()
            .rev()
            .find(|shape| body_distance(&shape.kind, pos, tf) <= HIT_TOLERANCE)
            .map(|shape| (shape.id, Handle::Line))
    }

    /// Handle a primary button press on the plot. Returns true when the
    /// press changed drawing state.
    pub fn pointer_down(&mut self, pos: Pos2, tf: &ChartTransform) -> bool {
        let point = tf.to_data(pos);
        match self.tool {
            DrawTool::Cursor => match self.hit_test(pos, tf) {
                Some((id, handle)) => {
                    let Some(start) = self.shapes.iter().find(|s| s.id == id).map(|s| s.kind) else {
                        return false;
                    };
                    debug!(%id, ?handle, "shape drag started");
                    self.selected = Some(id);
                    self.drag = Some(DragState {
                        shape_id: id,
                        handle,
                        origin: pos,
                        start,
                    });
                    true
                }
                None => self.selected.take().is_some(),
            },
            DrawTool::HLine => {
                let mut next = self.shapes.clone();
                next.push(Shape::new(ShapeKind::HLine { price: point.price }));
                self.commit(next);
                true
            }
            DrawTool::Trend | DrawTool::Fib => {
                match self.draft.take() {
                    Some(draft) if self.tool.owns(&draft.kind) => self.complete_draft(draft, point),
                    _ => self.start_draft(point),
                }
                true
            }
        }
    }

    fn start_draft(&mut self, a: Anchor) {
        let kind = match self.tool {
            DrawTool::Fib => ShapeKind::Fib { a, b: a },
            _ => ShapeKind::Trend { a, b: a },
        };
        debug!(tool = self.tool.name(), "draft started");
        self.draft = Some(Shape::draft(kind));
    }

    fn complete_draft(&mut self, draft: Shape, b: Anchor) {
        let mut shape = draft.with_kind(draft.kind.completed(b));
        shape.draft = false;
        debug!(id = %shape.id, "draft completed");
        let mut next = self.shapes.clone();
        next.push(shape);
        self.commit(next);
    }

    /// Apply pointer motion to the active drag. Returns true when a shape
    /// moved.
    pub fn pointer_move(&mut self, pos: Pos2, tf: &ChartTransform, bars: &[Bar]) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let kind = dragged_kind(&drag, pos, tf, bars, self.snap);

        let mut changed = false;
        let next: Vec<Shape> = self
            .shapes
            .iter()
            .map(|shape| {
                if shape.id == drag.shape_id && shape.kind != kind {
                    changed = true;
                    shape.with_kind(kind)
                } else {
                    shape.clone()
                }
            })
            .collect();
        if changed {
            self.commit(next);
        }
        changed
    }

    /// End of any gesture
    pub fn pointer_up(&mut self) {
        if let Some(drag) = self.drag.take() {
            debug!(id = %drag.shape_id, "shape drag finished");
        }
    }

    /// Drop the pending draft, if any
    pub fn cancel_draft(&mut self) {
        self.draft = None;
    }

    /// Remove the selected shape from the collection
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected.take() else {
            return false;
        };
        self.drag = None;
        let next: Vec<Shape> = self.shapes.iter().filter(|s| s.id != id).cloned().collect();
        self.commit(next);
        true
    }
}

/// Pixel distance from `pos` to the drawn body of a shape.
fn body_distance(kind: &ShapeKind, pos: Pos2, tf: &ChartTransform) -> f32 {
    match *kind {
        ShapeKind::HLine { price } => (pos.y - tf.pixel_y(price)).abs(),
        ShapeKind::Trend { a, b } => distance_to_segment(pos, tf.to_screen(a), tf.to_screen(b)),
        ShapeKind::Fib { a, b } => {
            let left = tf.pixel_x(a.idx.min(b.idx));
            let right = tf.pixel_x(a.idx.max(b.idx));
            kind.fib_levels()
                .into_iter()
                .map(|(_, price)| {
                    let y = tf.pixel_y(price);
                    distance_to_segment(pos, Pos2::new(left, y), Pos2::new(right, y))
                })
                .fold(
                    distance_to_segment(pos, tf.to_screen(a), tf.to_screen(b)),
                    f32::min,
                )
        }
    }
}

/// Geometry of the dragged shape for the pointer now at `pos`.
fn dragged_kind(drag: &DragState, pos: Pos2, tf: &ChartTransform, bars: &[Bar], snap: bool) -> ShapeKind {
    let d_idx = tf.index_delta(pos.x - drag.origin.x);
    let d_price = tf.price_delta(pos.y - drag.origin.y);

    match (drag.start, drag.handle) {
        (ShapeKind::HLine { price }, _) => {
            let mut price = price + d_price;
            if snap {
                price = snap_price_to_ohlc(tf.bar_at(pos.x) as i64, price, bars);
            }
            ShapeKind::HLine { price }
        }
        (kind, Handle::Line) => {
            let moved = kind.translated(d_idx, d_price);
            match moved.anchors() {
                // snap the leading anchor and carry the other along
                Some((a, _)) if snap => {
                    let snapped = snap_price_to_ohlc(a.idx.floor() as i64, a.price, bars);
                    moved.translated(0.0, snapped - a.price)
                }
                _ => moved,
            }
        }
        (kind, handle) => {
            let Some((a, b)) = kind.anchors() else {
                return kind;
            };
            let base = if handle == Handle::A { a } else { b };
            let mut anchor = base.translated(d_idx, d_price);
            if snap {
                anchor.price = snap_price_to_ohlc(anchor.idx.floor() as i64, anchor.price, bars);
            }
            kind.with_anchor(handle, anchor)
        }
    }
}
