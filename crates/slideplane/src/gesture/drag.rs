use crate::geometry::Vector2;

/// Modifier-armed drag gesture.
///
/// `context` is what the drag moves: `()` for the camera, a slide id when
/// repositioning a slide.
#[derive(Debug, Clone, PartialEq)]
pub enum DragMachine<C> {
    Idle,
    /// The modifier is held; the next primary press starts a drag.
    ModifierArmed,
    Dragging { last_position: Vector2, context: C },
}

impl<C> Default for DragMachine<C> {
    fn default() -> Self {
        DragMachine::Idle
    }
}

impl<C> DragMachine<C> {
    /// Track the modifier key. Releasing it cancels any drag in progress.
    pub fn set_modifier(&mut self, held: bool) {
        if !held {
            *self = DragMachine::Idle;
        } else if matches!(self, DragMachine::Idle) {
            *self = DragMachine::ModifierArmed;
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, DragMachine::ModifierArmed)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragMachine::Dragging { .. })
    }

    pub fn begin(&mut self, position: Vector2, context: C) {
        *self = DragMachine::Dragging {
            last_position: position,
            context,
        };
    }

    /// Record the new pointer position and return the delta from the previous one,
    /// together with the drag context.
    pub fn advance(&mut self, position: Vector2) -> Option<(Vector2, &C)> {
        match self {
            DragMachine::Dragging {
                last_position,
                context,
            } => {
                let delta = position - *last_position;
                *last_position = position;
                Some((delta, &*context))
            }
            _ => None,
        }
    }

    /// Button released: stay armed so the next press drags again.
    pub fn release(&mut self) {
        if self.is_dragging() {
            *self = DragMachine::ModifierArmed;
        }
    }
}
