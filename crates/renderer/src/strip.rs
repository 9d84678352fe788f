//! Thumbnail strip geometry along the bottom edge of the window.

const MARGIN: f32 = 8.0;
const MAX_EDGE: f32 = 96.0;
const MIN_EDGE: f32 = 12.0;
/// Largest share of the window height the strip may cover.
const MAX_HEIGHT_FRACTION: f32 = 0.15;

/// Pixel rectangle of one thumbnail, origin at the top-left of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailSlot {
    pub index: usize,
    pub left: f32,
    pub top: f32,
    pub edge: f32,
}

impl ThumbnailSlot {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.left + self.edge && y >= self.top && y < self.top + self.edge
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StripLayout {
    width: u32,
    height: u32,
    slots: Vec<ThumbnailSlot>,
}

impl StripLayout {
    /// Lays `count` square thumbnails out centred along the bottom edge.
    ///
    /// The strip is empty when the window is too small to fit them.
    pub fn new(count: usize, width: u32, height: u32) -> Self {
        let mut layout = Self {
            width,
            height,
            slots: Vec::new(),
        };
        if count == 0 || width == 0 || height == 0 {
            return layout;
        }

        let (w, h) = (width as f32, height as f32);
        let n = count as f32;
        let edge = MAX_EDGE
            .min(h * MAX_HEIGHT_FRACTION)
            .min((w - MARGIN * (n + 1.0)) / n)
            .floor();
        if edge < MIN_EDGE {
            return layout;
        }

        let total = n * edge + (n - 1.0) * MARGIN;
        let start = ((w - total) * 0.5).floor();
        let top = h - MARGIN - edge;
        layout.slots = (0..count)
            .map(|index| ThumbnailSlot {
                index,
                left: start + index as f32 * (edge + MARGIN),
                top,
                edge,
            })
            .collect();
        layout
    }

    pub fn slots(&self) -> &[ThumbnailSlot] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Gallery index of the thumbnail under a pixel position.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<usize> {
        self.slots
            .iter()
            .find(|slot| slot.contains(x, y))
            .map(|slot| slot.index)
    }

    /// `(left, top, right, bottom)` of a slot in normalised device coordinates.
    pub fn ndc_rect(&self, index: usize) -> Option<[f32; 4]> {
        let slot = self.slots.get(index)?;
        let (w, h) = (self.width.max(1) as f32, self.height.max(1) as f32);
        let to_x = |px: f32| px / w * 2.0 - 1.0;
        let to_y = |py: f32| 1.0 - py / h * 2.0;
        Some([
            to_x(slot.left),
            to_y(slot.top),
            to_x(slot.left + slot.edge),
            to_y(slot.top + slot.edge),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_centred_and_bottom_aligned() {
        let layout = StripLayout::new(3, 1000, 800);
        let slots = layout.slots();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].edge, 96.0);
        let right = slots[2].left + slots[2].edge;
        assert!(((slots[0].left) - (1000.0 - right)).abs() <= 1.0);
        assert_eq!(slots[0].top + slots[0].edge + MARGIN, 800.0);
    }

    #[test]
    fn edge_shrinks_with_window() {
        let layout = StripLayout::new(10, 400, 800);
        let edge = layout.slots()[0].edge;
        assert!(edge < MAX_EDGE);
        let right = layout.slots()[9].left + edge;
        assert!(right <= 400.0);
    }

    #[test]
    fn tiny_windows_have_no_strip() {
        assert!(StripLayout::new(50, 200, 200).is_empty());
        assert!(StripLayout::new(3, 0, 0).is_empty());
        assert!(StripLayout::new(0, 800, 600).is_empty());
    }

    #[test]
    fn hit_test_finds_thumbnail_under_pointer() {
        let layout = StripLayout::new(3, 1000, 800);
        let second = layout.slots()[1];
        let (cx, cy) = (second.left + second.edge / 2.0, second.top + second.edge / 2.0);
        assert_eq!(layout.hit_test(cx, cy), Some(1));
        assert_eq!(layout.hit_test(cx, 10.0), None);
        assert_eq!(layout.hit_test(second.left - MARGIN / 2.0, cy), None);
    }

    #[test]
    fn ndc_rect_spans_slot() {
        let layout = StripLayout::new(1, 200, 200);
        let slot = layout.slots()[0];
        let [left, top, right, bottom] = layout.ndc_rect(0).unwrap();
        assert!(left < right);
        assert!(top > bottom);
        assert!((bottom - (1.0 - (slot.top + slot.edge) / 100.0)).abs() < 1e-6);
        assert!(layout.ndc_rect(1).is_none());
    }
}
