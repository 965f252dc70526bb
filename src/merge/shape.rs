use super::{MergeWindow, ObjectKind};
use crate::error::AnnotrackError;
use crate::geometry::shape_similarity;
use crate::ir::Shape;

/// Standalone shapes match by geometric similarity on their own frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShapeKind;

impl ObjectKind for ShapeKind {
    type Object = Shape;

    fn name(&self) -> &'static str {
        "shape"
    }

    fn cost_threshold(&self) -> f64 {
        0.25
    }

    fn frame(&self, shape: &Shape) -> u64 {
        shape.frame
    }

    fn existing_group(&self, shape: &Shape, window: &MergeWindow) -> Option<u64> {
        (shape.frame >= window.start_frame).then_some(shape.frame)
    }

    fn incoming_group(&self, shape: &Shape, _window: &MergeWindow) -> Option<u64> {
        Some(shape.frame)
    }

    fn similarity(
        &self,
        a: &Shape,
        b: &Shape,
        window: &MergeWindow,
    ) -> Result<f64, AnnotrackError> {
        Ok(shape_similarity(a, b, window.dimension))
    }

    fn unite(&self, incoming: Shape, existing: &mut Shape) {
        if incoming.frame < existing.frame {
            *existing = incoming;
        }
    }

    fn close_out(&self, _shape: &mut Shape, _boundary: u64) {}
}
