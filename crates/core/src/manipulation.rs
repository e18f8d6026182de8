//! Drag manipulation of selected features
//!
//! A [`DragState`] is created when the user presses on a selected feature and
//! tracks the pointer until release. The feature keeps its offset from the
//! pointer, so grabbing a shape off-centre does not make it jump.

use crate::document::{DocumentError, DocumentResult, ShapeDocument};
use crate::geometry::ImagePoint;
use crate::selection::Selection;

/// State of an in-progress drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    /// Feature being dragged
    pub selection: Selection,

    /// Anchor position of the feature when the drag started
    pub anchor_start: ImagePoint,

    /// Pointer position when the drag started
    pub drag_start: ImagePoint,

    /// Latest pointer position
    pub current_position: ImagePoint,
}

impl DragState {
    /// Start dragging `selection`, grabbed at `grab_point`
    pub fn begin(
        document: &ShapeDocument,
        selection: Selection,
        grab_point: ImagePoint,
    ) -> DocumentResult<Self> {
        if selection.is_empty() {
            return Err(DocumentError::EmptySelection);
        }
        let anchor_start = document.anchor_of(selection)?;
        log::debug!("begin drag of {:?} at {:?}", selection, grab_point);

        Ok(Self {
            selection,
            anchor_start,
            drag_start: grab_point,
            current_position: grab_point,
        })
    }

    /// Where the feature's anchor should be for the current pointer position
    pub fn target_position(&self) -> ImagePoint {
        self.anchor_start + (self.current_position - self.drag_start)
    }

    /// Move the pointer and apply the drag to the document
    pub fn update(&mut self, document: &mut ShapeDocument, position: ImagePoint) -> DocumentResult<()> {
        self.current_position = position;
        document.drag_to(self.selection, self.target_position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{PendingShape, ShapeKind};
    use crate::geometry::LabelRect;
    use crate::measurement::Measurement;
    use crate::shape::{Label, ShapeId};

    fn p(x: f64, y: f64) -> ImagePoint {
        ImagePoint::new(x, y)
    }

    fn document_with_rectangle() -> (ShapeDocument, ShapeId) {
        let mut pending = PendingShape::new(ShapeKind::Rectangle);
        pending.push(p(0.0, 0.0));
        pending.push(p(100.0, 50.0));
        let mut document = ShapeDocument::new();
        let id = document.insert(pending.finish());
        (document, id)
    }

    #[test]
    fn test_drag_vertex_keeps_grab_offset() {
        let (mut document, id) = document_with_rectangle();
        let selection = Selection::Vertex { shape: id, index: 2 };

        // Grabbed 3px away from the (100, 50) corner
        let mut drag = DragState::begin(&document, selection, p(103.0, 52.0)).expect("vertex exists");
        drag.update(&mut document, p(153.0, 102.0)).expect("vertex exists");

        let shape = document.get(id).expect("shape exists");
        assert_eq!(shape.points()[2], p(150.0, 100.0));
        assert_eq!(shape.measurement(), Measurement::Area(15000.0));
    }

    #[test]
    fn test_drag_whole_shape() {
        let (mut document, id) = document_with_rectangle();
        let selection = Selection::Shape { shape: id };

        let mut drag = DragState::begin(&document, selection, p(50.0, 25.0)).expect("shape exists");
        drag.update(&mut document, p(60.0, 20.0)).expect("shape exists");
        drag.update(&mut document, p(70.0, 35.0)).expect("shape exists");

        let shape = document.get(id).expect("shape exists");
        assert_eq!(shape.points()[0], p(20.0, 10.0));
        assert_eq!(shape.points()[2], p(120.0, 60.0));
        assert_eq!(shape.measurement(), Measurement::Area(5000.0));
    }

    #[test]
    fn test_drag_label() {
        let (mut document, id) = document_with_rectangle();
        document
            .set_label(id, Some(Label::new("5000 px²", LabelRect::new(40.0, 20.0, 30.0, 10.0))))
            .expect("shape exists");
        let selection = Selection::Label { shape: id };

        let mut drag = DragState::begin(&document, selection, p(45.0, 25.0)).expect("label exists");
        drag.update(&mut document, p(145.0, 225.0)).expect("label exists");

        let label = document.get(id).and_then(|s| s.label()).map(|l| l.bounds);
        assert_eq!(label, Some(LabelRect::new(140.0, 220.0, 30.0, 10.0)));
        // Geometry is untouched
        assert_eq!(document.get(id).map(|s| s.points()[0]), Some(p(0.0, 0.0)));
    }

    #[test]
    fn test_begin_rejects_empty_or_stale_selection() {
        let (mut document, id) = document_with_rectangle();

        assert_eq!(
            DragState::begin(&document, Selection::Empty, p(0.0, 0.0)),
            Err(DocumentError::EmptySelection)
        );
        assert_eq!(
            DragState::begin(&document, Selection::Label { shape: id }, p(0.0, 0.0)),
            Err(DocumentError::NoLabel(id))
        );

        document.remove(id);
        assert_eq!(
            DragState::begin(&document, Selection::Shape { shape: id }, p(0.0, 0.0)),
            Err(DocumentError::ShapeNotFound(id))
        );
    }

    #[test]
    fn test_update_after_shape_removed() {
        let (mut document, id) = document_with_rectangle();
        let mut drag = DragState::begin(&document, Selection::Shape { shape: id }, p(0.0, 0.0))
            .expect("shape exists");
        document.remove(id);

        assert_eq!(
            drag.update(&mut document, p(5.0, 5.0)),
            Err(DocumentError::ShapeNotFound(id))
        );
        assert_eq!(drag.current_position, p(5.0, 5.0));
    }
}
