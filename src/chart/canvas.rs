//! Drawing surface abstraction.
//!
//! Chart items paint through [`Canvas`] so the render loop does not depend
//! on a particular backend. egui's [`Painter`] is the production
//! implementation.

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, StrokeKind};

/// Render stages, in the order the chart paints them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    Grid,
    Bars,
    Indicators,
    Shapes,
    SelectedShape,
    ReplayCursor,
    Crosshair,
    Message,
}

/// Immediate-mode drawing primitives used by the chart.
pub trait Canvas {
    /// Marks the start of a render stage
    fn begin_layer(&mut self, _layer: Layer) {}

    fn fill_rect(&mut self, rect: Rect, color: Color32);

    fn outline_rect(&mut self, rect: Rect, stroke: Stroke);

    fn segment(&mut self, a: Pos2, b: Pos2, stroke: Stroke);

    /// Connected line through `points`
    fn polyline(&mut self, points: Vec<Pos2>, stroke: Stroke);

    fn dot(&mut self, center: Pos2, radius: f32, color: Color32);

    fn label(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32);
}

impl Canvas for Painter {
    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        Painter::rect_filled(self, rect, 0.0, color);
    }

    fn outline_rect(&mut self, rect: Rect, stroke: Stroke) {
        Painter::rect_stroke(self, rect, 0.0, stroke, StrokeKind::Inside);
    }

    fn segment(&mut self, a: Pos2, b: Pos2, stroke: Stroke) {
        Painter::line_segment(self, [a, b], stroke);
    }

    fn polyline(&mut self, points: Vec<Pos2>, stroke: Stroke) {
        if points.len() >= 2 {
            Painter::add(self, Shape::line(points, stroke));
        }
    }

    fn dot(&mut self, center: Pos2, radius: f32, color: Color32) {
        Painter::circle_filled(self, center, radius, color);
    }

    fn label(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32) {
        Painter::text(self, pos, anchor, text, FontId::proportional(size), color);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// One recorded primitive
    #[derive(Debug, Clone, PartialEq)]
    pub enum Op {
        Layer(Layer),
        FillRect(Rect, Color32),
        OutlineRect(Rect),
        Segment(Pos2, Pos2, Color32),
        Polyline(Vec<Pos2>, Color32),
        Dot(Pos2),
        Label(String),
    }

    /// Canvas that remembers what was drawn
    #[derive(Debug, Default)]
    pub struct RecordingCanvas {
        pub ops: Vec<Op>,
    }

    impl RecordingCanvas {
        pub fn layers(&self) -> Vec<Layer> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Layer(layer) => Some(*layer),
                    _ => None,
                })
                .collect()
        }

        /// Primitives drawn inside `layer`
        pub fn ops_in(&self, layer: Layer) -> Vec<Op> {
            let mut inside = false;
            let mut out = Vec::new();
            for op in &self.ops {
                match op {
                    Op::Layer(l) => inside = *l == layer,
                    other if inside => out.push(other.clone()),
                    _ => {}
                }
            }
            out
        }

        pub fn labels(&self) -> Vec<String> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Label(text) => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Canvas for RecordingCanvas {
        fn begin_layer(&mut self, layer: Layer) {
            self.ops.push(Op::Layer(layer));
        }

        fn fill_rect(&mut self, rect: Rect, color: Color32) {
            self.ops.push(Op::FillRect(rect, color));
        }

        fn outline_rect(&mut self, rect: Rect, _stroke: Stroke) {
            self.ops.push(Op::OutlineRect(rect));
        }

        fn segment(&mut self, a: Pos2, b: Pos2, stroke: Stroke) {
            self.ops.push(Op::Segment(a, b, stroke.color));
        }

        fn polyline(&mut self, points: Vec<Pos2>, stroke: Stroke) {
            self.ops.push(Op::Polyline(points, stroke.color));
        }

        fn dot(&mut self, center: Pos2, _radius: f32, _color: Color32) {
            self.ops.push(Op::Dot(center));
        }

        fn label(&mut self, _pos: Pos2, _anchor: Align2, text: &str, _size: f32, _color: Color32) {
            self.ops.push(Op::Label(text.to_string()));
        }
    }
}
