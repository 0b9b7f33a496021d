//! Side tables for memory-resident recordings.
//!
//! Tables only grow. An index handed out by a `push_*` call stays valid
//! for the lifetime of the recording.

use quill_core::{Brush, Image, Pen, Pixmap};

use crate::command::Resource;
use crate::error::{ReplayError, ResourceKind};

/// Pens, brushes, images and pixmaps referenced by index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceTables {
    pens: Vec<Pen>,
    brushes: Vec<Brush>,
    images: Vec<Image>,
    pixmaps: Vec<Pixmap>,
}

fn push<T>(list: &mut Vec<T>, value: T) -> i32 {
    list.push(value);
    // Indices are stored as i32 on the wire.
    i32::try_from(list.len() - 1).unwrap_or(i32::MAX)
}

fn resolve<T>(list: &[T], kind: ResourceKind, index: i32) -> Result<&T, ReplayError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| list.get(i))
        .ok_or(ReplayError::ResourceIndexOutOfRange {
            kind,
            index,
            len: list.len(),
        })
}

impl ResourceTables {
    /// Empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when every table is empty.
    pub fn is_empty(&self) -> bool {
        self.pens.is_empty()
            && self.brushes.is_empty()
            && self.images.is_empty()
            && self.pixmaps.is_empty()
    }

    /// Append a pen, returning its index.
    pub fn push_pen(&mut self, pen: Pen) -> i32 {
        push(&mut self.pens, pen)
    }

    /// Append a brush, returning its index.
    pub fn push_brush(&mut self, brush: Brush) -> i32 {
        push(&mut self.brushes, brush)
    }

    /// Append an image, returning its index.
    pub fn push_image(&mut self, image: Image) -> i32 {
        push(&mut self.images, image)
    }

    /// Append a pixmap, returning its index.
    pub fn push_pixmap(&mut self, pixmap: Pixmap) -> i32 {
        push(&mut self.pixmaps, pixmap)
    }

    /// Look up a pen.
    pub fn resolve_pen(&self, index: i32) -> Result<&Pen, ReplayError> {
        resolve(&self.pens, ResourceKind::Pen, index)
    }

    /// Look up a brush.
    pub fn resolve_brush(&self, index: i32) -> Result<&Brush, ReplayError> {
        resolve(&self.brushes, ResourceKind::Brush, index)
    }

    /// Look up an image.
    pub fn resolve_image(&self, index: i32) -> Result<&Image, ReplayError> {
        resolve(&self.images, ResourceKind::Image, index)
    }

    /// Look up a pixmap.
    pub fn resolve_pixmap(&self, index: i32) -> Result<&Pixmap, ReplayError> {
        resolve(&self.pixmaps, ResourceKind::Pixmap, index)
    }

    /// Every pen, in insertion order.
    pub fn pens(&self) -> &[Pen] {
        &self.pens
    }

    /// Every brush, in insertion order.
    pub fn brushes(&self) -> &[Brush] {
        &self.brushes
    }

    /// Every image, in insertion order.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Every pixmap, in insertion order.
    pub fn pixmaps(&self) -> &[Pixmap] {
        &self.pixmaps
    }
}

/// Resolve a [`Resource`] against a table lookup, borrowing either the
/// inline value or the table entry.
pub(crate) fn materialize<'a, T>(
    res: &'a Resource<T>,
    lookup: impl FnOnce(i32) -> Result<&'a T, ReplayError>,
) -> Result<&'a T, ReplayError> {
    match res {
        Resource::Inline(v) => Ok(v),
        Resource::Indexed(i) => lookup(*i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::Color;

    #[test]
    fn push_returns_sequential_indices() {
        let mut t = ResourceTables::new();
        assert!(t.is_empty());
        assert_eq!(t.push_pen(Pen::default()), 0);
        assert_eq!(t.push_pen(Pen::solid(Color::WHITE, 2.0)), 1);
        assert_eq!(t.push_brush(Brush::solid(Color::BLACK)), 0);
        assert_eq!(t.resolve_pen(1).unwrap().width, 2.0);
        assert!(!t.is_empty());
    }

    #[test]
    fn out_of_range_and_negative_indices_fail() {
        let mut t = ResourceTables::new();
        t.push_pixmap(Pixmap::new(1, 1, vec![0]));
        for index in [1, -1, i32::MAX] {
            match t.resolve_pixmap(index) {
                Err(ReplayError::ResourceIndexOutOfRange { kind, index: i, len }) => {
                    assert_eq!((kind, i, len), (ResourceKind::Pixmap, index, 1));
                }
                other => panic!("expected out-of-range error, got {other:?}"),
            }
        }
        assert!(t.resolve_image(0).is_err());
    }

    #[test]
    fn materialize_prefers_inline() {
        let t = ResourceTables::new();
        let inline = Resource::Inline(Brush::solid(Color::WHITE));
        assert_eq!(
            materialize(&inline, |i| t.resolve_brush(i)).unwrap().color,
            Color::WHITE
        );
        let indexed: Resource<Brush> = Resource::Indexed(0);
        assert!(materialize(&indexed, |i| t.resolve_brush(i)).is_err());
    }
}
