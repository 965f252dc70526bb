use super::{MergeWindow, ObjectKind};
use crate::error::AnnotrackError;
use crate::ir::Tag;

/// Tags match when they carry the same label on the same frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct TagKind;

impl ObjectKind for TagKind {
    type Object = Tag;

    fn name(&self) -> &'static str {
        "tag"
    }

    fn cost_threshold(&self) -> f64 {
        0.25
    }

    fn frame(&self, tag: &Tag) -> u64 {
        tag.frame
    }

    fn existing_group(&self, tag: &Tag, window: &MergeWindow) -> Option<u64> {
        (tag.frame >= window.start_frame).then_some(tag.frame)
    }

    fn incoming_group(&self, tag: &Tag, _window: &MergeWindow) -> Option<u64> {
        Some(tag.frame)
    }

    fn similarity(&self, a: &Tag, b: &Tag, _window: &MergeWindow) -> Result<f64, AnnotrackError> {
        Ok(if a.label_id == b.label_id { 1.0 } else { 0.0 })
    }

    fn unite(&self, incoming: Tag, existing: &mut Tag) {
        if incoming.frame < existing.frame {
            *existing = incoming;
        }
    }

    fn close_out(&self, _tag: &mut Tag, _boundary: u64) {}
}
