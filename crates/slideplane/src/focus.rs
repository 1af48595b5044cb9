use uuid::Uuid;

use crate::camera::Camera;
use crate::slide::SlideId;

/// A stop on the scripted path through the deck.
///
/// The `id` is generated at construction and only distinguishes focuses within one
/// run; it is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Focus {
    pub id: Uuid,
    pub kind: FocusKind,
    /// Shown in the hint panel while the focus is selected.
    pub hint: Option<String>,
}

/// Payload of a focus.
#[derive(Debug, Clone, PartialEq)]
pub enum FocusKind {
    /// A directly authored camera pose.
    FixedPose(Camera),
    /// One or more slides whose combined bounds frame the camera. Compared by the
    /// ordered list of ids. Must not be empty.
    SlideSet(Vec<SlideId>),
}

impl Focus {
    pub fn new(kind: FocusKind, hint: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            hint,
        }
    }

    #[cfg(test)]
    pub fn fixed(camera: Camera) -> Self {
        Self::new(FocusKind::FixedPose(camera), None)
    }

    #[cfg(test)]
    pub fn slides<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SlideId>,
    {
        Self::new(
            FocusKind::SlideSet(ids.into_iter().map(Into::into).collect()),
            None,
        )
    }

    #[cfg(test)]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// The slide of a one-member slide set, the only kind of focus a slide may
    /// intercept "next" presses for.
    pub fn single_slide(&self) -> Option<&SlideId> {
        match &self.kind {
            FocusKind::SlideSet(ids) if ids.len() == 1 => ids.first(),
            _ => None,
        }
    }

    /// Short human-readable description used in logs and `check` output.
    pub fn describe(&self) -> String {
        match &self.kind {
            FocusKind::FixedPose(camera) => format!(
                "camera ({:.3}, {:.3}) x{:.3}",
                camera.offset.dx, camera.offset.dy, camera.scale
            ),
            FocusKind::SlideSet(ids) => {
                let names: Vec<&str> = ids.iter().map(SlideId::as_str).collect();
                format!("slides [{}]", names.join(", "))
            }
        }
    }
}
