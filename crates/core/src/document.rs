//! Shape document: the collection of shapes on one image
//!
//! Shapes live in an arena keyed by [`ShapeId`] with a separate z-order list.
//! Selections refer to shapes by ID only. All geometry edits after
//! construction go through [`ShapeDocument::drag_to`].

use crate::geometry::ImagePoint;
use crate::selection::{Selection, SelectionConfig, SelectionResolver};
use crate::shape::{Label, Shape, ShapeId};
use std::collections::HashMap;

/// Errors from document lookups and edits
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error("shape not found: {0}")]
    ShapeNotFound(ShapeId),

    #[error("vertex {index} out of range for shape {shape}")]
    VertexOutOfRange { shape: ShapeId, index: usize },

    #[error("shape {0} has no label")]
    NoLabel(ShapeId),

    #[error("nothing is selected")]
    EmptySelection,
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// All shapes drawn over one image
#[derive(Debug, Clone, Default)]
pub struct ShapeDocument {
    /// All shapes indexed by ID
    shapes: HashMap<ShapeId, Shape>,
    /// Z-order, bottom to top (insertion order)
    order: Vec<ShapeId>,
}

impl ShapeDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape on top of the others
    ///
    /// A shape whose ID is already present replaces the old one in place.
    pub fn insert(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        if self.shapes.insert(id, shape).is_none() {
            self.order.push(id);
        }
        id
    }

    /// Get a shape by ID
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    /// Remove a shape; selections pointing at it become stale
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let shape = self.shapes.remove(&id)?;
        self.order.retain(|&sid| sid != id);
        Some(shape)
    }

    /// Remove all shapes
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Shapes bottom to top
    pub fn shapes(&self) -> impl DoubleEndedIterator<Item = &Shape> + '_ {
        self.order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Attach, replace or remove a shape's label
    pub fn set_label(&mut self, id: ShapeId, label: Option<Label>) -> DocumentResult<()> {
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(DocumentError::ShapeNotFound(id))?;
        shape.set_label(label);
        Ok(())
    }

    /// Find the feature under the cursor
    ///
    /// Tests every vertex, then every label, then every body, topmost shape
    /// first within each pass, so on equal scores the more specific feature
    /// of the upper shape wins.
    pub fn resolve_selection(&self, cursor: ImagePoint, config: &SelectionConfig) -> Selection {
        let mut resolver = SelectionResolver::with_config(cursor, config.clone());

        for shape in self.shapes().rev() {
            for (index, vertex) in shape.vertices().iter().enumerate() {
                resolver.test_vertex(*vertex, shape.id(), index);
            }
        }

        for shape in self.shapes().rev() {
            if let Some(label) = shape.label() {
                resolver.test_label(&label.bounds, shape.id());
            }
        }

        for shape in self.shapes().rev() {
            let outline = shape.outline();
            if shape.kind().measures_area() {
                resolver.test_polygon(&outline, shape.id());
            } else {
                resolver.test_polyline(&outline, shape.id());
            }
        }

        let selection = resolver.best_selection();
        log::debug!(
            "resolved selection at ({:.1}, {:.1}): {:?} (score {:.2})",
            cursor.x,
            cursor.y,
            selection,
            resolver.best_score()
        );
        selection
    }

    /// Check that a selection still points at something that exists
    ///
    /// Returns the selection unchanged when valid, [`Selection::Empty`]
    /// otherwise.
    pub fn revalidate(&self, selection: Selection) -> Selection {
        let valid = match selection {
            Selection::Empty => true,
            Selection::Shape { shape } => self.contains(shape),
            Selection::Vertex { shape, index } => self
                .get(shape)
                .is_some_and(|s| index < s.vertices().len()),
            Selection::Label { shape } => self.get(shape).is_some_and(|s| s.label().is_some()),
        };

        if valid {
            selection
        } else {
            log::warn!("clearing stale selection {:?}", selection);
            Selection::Empty
        }
    }

    /// Position that a drag of the selected feature moves
    ///
    /// Vertex: the vertex itself. Label: its top-left corner. Whole shape:
    /// its first vertex.
    pub fn anchor_of(&self, selection: Selection) -> DocumentResult<ImagePoint> {
        match selection {
            Selection::Empty => Err(DocumentError::EmptySelection),
            Selection::Shape { shape } => {
                let s = self.shape(shape)?;
                Ok(s.points().first().copied().unwrap_or_default())
            }
            Selection::Vertex { shape, index } => self
                .shape(shape)?
                .vertices()
                .get(index)
                .copied()
                .ok_or(DocumentError::VertexOutOfRange { shape, index }),
            Selection::Label { shape } => self
                .shape(shape)?
                .label()
                .map(|label| label.bounds.top_left())
                .ok_or(DocumentError::NoLabel(shape)),
        }
    }

    /// Move the selected feature's anchor to `point`
    ///
    /// The only way to edit a finished shape's geometry. Measurement and
    /// validity are derived on read, so they follow the edit.
    ///
    /// # Arguments
    /// * `selection` - Feature to move (vertex, label or whole shape)
    /// * `point` - New anchor position, see [`ShapeDocument::anchor_of`]
    ///
    /// # Errors
    /// * `EmptySelection` if nothing is selected
    /// * `ShapeNotFound` if the shape was removed
    /// * `VertexOutOfRange` or `NoLabel` if the selected feature is gone
    pub fn drag_to(&mut self, selection: Selection, point: ImagePoint) -> DocumentResult<()> {
        let id = selection.shape_id().ok_or(DocumentError::EmptySelection)?;
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(DocumentError::ShapeNotFound(id))?;

        match selection {
            Selection::Empty => return Err(DocumentError::EmptySelection),
            Selection::Vertex { index, .. } => {
                if !shape.set_vertex(index, point) {
                    return Err(DocumentError::VertexOutOfRange { shape: id, index });
                }
            }
            Selection::Label { .. } => {
                if !shape.move_label(point) {
                    return Err(DocumentError::NoLabel(id));
                }
            }
            Selection::Shape { .. } => {
                if let Some(first) = shape.points().first().copied() {
                    shape.translate(point.x - first.x, point.y - first.y);
                }
            }
        }

        log::debug!(
            "dragged {:?} to ({:.1}, {:.1}); now {:?}",
            selection,
            point.x,
            point.y,
            shape.measurement()
        );
        Ok(())
    }

    fn shape(&self, id: ShapeId) -> DocumentResult<&Shape> {
        self.get(id).ok_or(DocumentError::ShapeNotFound(id))
    }
}
