use winit::keyboard::{Key, NamedKey};

/// Pointer travel, in pixels, after which a press becomes a drag.
const DRAG_THRESHOLD: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyAction {
    /// Jump to a zero-based gallery index.
    Select(usize),
    Next,
    Previous,
    Quit,
}

pub(crate) fn key_action(key: &Key) -> Option<KeyAction> {
    match key {
        Key::Named(NamedKey::ArrowRight) | Key::Named(NamedKey::Space) => Some(KeyAction::Next),
        Key::Named(NamedKey::ArrowLeft) => Some(KeyAction::Previous),
        Key::Named(NamedKey::Escape) => Some(KeyAction::Quit),
        Key::Character(value) => match value.as_str() {
            " " => Some(KeyAction::Next),
            digit => {
                let mut chars = digit.chars();
                let number = chars.next()?.to_digit(10)?;
                if chars.next().is_some() || number == 0 {
                    return None;
                }
                Some(KeyAction::Select(number as usize - 1))
            }
        },
        _ => None,
    }
}

/// Neighbouring gallery index, wrapping at both ends.
pub(crate) fn step_index(current: usize, count: usize, forward: bool) -> usize {
    if count == 0 {
        return 0;
    }
    if forward {
        (current + 1) % count
    } else {
        (current + count - 1) % count
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    anchor: (f64, f64),
    dragging: bool,
}

/// Separates clicks from orbit drags for the left mouse button.
#[derive(Debug, Default)]
pub(crate) struct PointerTracker {
    position: Option<(f64, f64)>,
    press: Option<Press>,
}

impl PointerTracker {
    /// Records a cursor move; returns the drag delta once the press became a drag.
    pub(crate) fn moved(&mut self, x: f64, y: f64) -> Option<(f32, f32)> {
        let previous = self.position.replace((x, y));
        let press = self.press.as_mut()?;
        if !press.dragging {
            let (ax, ay) = press.anchor;
            if (x - ax).hypot(y - ay) < DRAG_THRESHOLD {
                return None;
            }
            press.dragging = true;
        }
        let (px, py) = previous?;
        Some(((x - px) as f32, (y - py) as f32))
    }

    pub(crate) fn pressed(&mut self) {
        if let Some(anchor) = self.position {
            self.press = Some(Press {
                anchor,
                dragging: false,
            });
        }
    }

    /// Ends the press; returns the click position unless it turned into a drag.
    pub(crate) fn released(&mut self) -> Option<(f64, f64)> {
        let press = self.press.take()?;
        if press.dragging {
            None
        } else {
            self.position
        }
    }
}
