//! Focus resolution: turn a focus stop into a concrete camera pose and hint text.

use uuid::Uuid;

use crate::camera::Camera;
use crate::focus::{Focus, FocusKind};
use crate::geometry::Bounds;
use crate::slide::{SlideDescriptor, SlideId, SlideRegistry};

/// Separator placed between hint fragments.
pub const HINT_SEPARATOR: &str = "\n\n--\n\n";

/// Margin subtracted from the fitted scale of a multi-slide focus so edge slides
/// are not clipped.
pub const MULTI_SLIDE_MARGIN: f64 = 0.01;

/// A focus resolved against the current slide positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub camera: Camera,
    pub hint: String,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FocusError {
    #[error("focus {focus} references no slides")]
    EmptySlideSet { focus: Uuid },
    #[error("focus {focus} references unknown slide '{slide}'")]
    UnknownSlide { focus: Uuid, slide: SlideId },
}

/// Resolve `focuses[index]`.
///
/// Returns `Ok(None)` when `index` lies outside the focus list. That is the
/// "outside the planned path" state, not an error.
pub fn resolve(
    focuses: &[Focus],
    index: isize,
    registry: &SlideRegistry,
) -> Result<Option<Resolved>, FocusError> {
    let Some(focus) = usize::try_from(index).ok().and_then(|i| focuses.get(i)) else {
        return Ok(None);
    };
    resolve_focus(focus, registry).map(Some)
}

/// Resolve a single focus.
pub fn resolve_focus(focus: &Focus, registry: &SlideRegistry) -> Result<Resolved, FocusError> {
    let ids = match &focus.kind {
        FocusKind::FixedPose(camera) => {
            return Ok(Resolved {
                camera: *camera,
                hint: focus.hint.clone().unwrap_or_default(),
            });
        }
        FocusKind::SlideSet(ids) => ids,
    };

    let slides = ids
        .iter()
        .map(|id| {
            registry.get(id).ok_or_else(|| FocusError::UnknownSlide {
                focus: focus.id,
                slide: id.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let resolved = match slides.as_slice() {
        [slide] => single_slide(slide),
        many => match Bounds::of_points(many.iter().map(|s| s.offset)) {
            Some(bounds) => multi_slide(many, bounds),
            None => return Err(FocusError::EmptySlideSet { focus: focus.id }),
        },
    };

    Ok(Resolved {
        hint: with_focus_hint(focus.hint.as_deref(), resolved.hint),
        ..resolved
    })
}

/// Camera pose for one slide on its own.
pub fn single_slide(slide: &SlideDescriptor) -> Resolved {
    Resolved {
        camera: Camera::new(slide.offset, slide.single_focus_scale),
        hint: slide.hint.clone().unwrap_or_default(),
    }
}

fn multi_slide(slides: &[&SlideDescriptor], bounds: Bounds) -> Resolved {
    let span = bounds.span();
    let width = 1.0 / (span.dx + 1.0);
    let height = 1.0 / (span.dy + 1.0);

    let hint = slides
        .iter()
        .filter_map(|slide| {
            slide
                .hint
                .as_ref()
                .map(|hint| format!("**{}:**\n{hint}", slide.id))
        })
        .collect::<Vec<_>>()
        .join(HINT_SEPARATOR);

    Resolved {
        camera: Camera::new(bounds.center(), width.min(height) - MULTI_SLIDE_MARGIN),
        hint,
    }
}

fn with_focus_hint(focus_hint: Option<&str>, hint: String) -> String {
    match focus_hint {
        Some(prefix) => format!("{prefix}{HINT_SEPARATOR}{hint}"),
        None => hint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector2;
    use crate::geometry::tests::{approx_eq, vec_approx_eq};
    use crate::slide::NoCapture;

    fn registry(slides: Vec<SlideDescriptor>) -> SlideRegistry {
        let mut registry = SlideRegistry::new();
        for slide in slides {
            registry.register(slide, Box::new(NoCapture)).unwrap();
        }
        registry
    }

    fn abc() -> SlideRegistry {
        registry(vec![
            SlideDescriptor::new("A", Vector2::new(0.0, 0.0)),
            SlideDescriptor::new("B", Vector2::new(-0.5, 0.0)),
            SlideDescriptor::new("C", Vector2::new(0.5, 0.5)),
        ])
    }

    #[test]
    fn test_out_of_range_is_none() {
        let reg = abc();
        let focuses = vec![Focus::slides(["A"])];
        assert_eq!(resolve(&focuses, -1, &reg), Ok(None));
        assert_eq!(resolve(&focuses, 1, &reg), Ok(None));
        assert_eq!(resolve(&[], 0, &reg), Ok(None));
    }

    #[test]
    fn test_fixed_pose() {
        let reg = abc();
        let camera = Camera::new(Vector2::new(2.0, -1.0), 0.3);
        let focuses = vec![
            Focus::fixed(camera),
            Focus::fixed(camera).with_hint("Overview"),
        ];
        let plain = resolve(&focuses, 0, &reg).unwrap().unwrap();
        assert_eq!(plain.camera, camera);
        assert_eq!(plain.hint, "");
        let hinted = resolve(&focuses, 1, &reg).unwrap().unwrap();
        assert_eq!(hinted.hint, "Overview");
    }

    #[test]
    fn test_single_slide_uses_slide_pose() {
        let reg = registry(vec![
            SlideDescriptor::new("Zoomed", Vector2::new(1.5, -2.0)).with_single_focus_scale(0.5),
        ]);
        let resolved = resolve(&[Focus::slides(["Zoomed"])], 0, &reg)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.camera.offset, Vector2::new(1.5, -2.0));
        assert_eq!(resolved.camera.scale, 0.5);
    }

    #[test]
    fn test_single_slide_hints() {
        let reg = registry(vec![
            SlideDescriptor::new("A", Vector2::ZERO).with_hint("Slide notes"),
            SlideDescriptor::new("B", Vector2::ZERO),
        ]);
        let focuses = vec![
            Focus::slides(["A"]),
            Focus::slides(["A"]).with_hint("Focus notes"),
            Focus::slides(["B"]).with_hint("Only focus"),
            Focus::slides(["B"]),
        ];
        let hint = |i| resolve(&focuses, i, &reg).unwrap().unwrap().hint;
        assert_eq!(hint(0), "Slide notes");
        assert_eq!(hint(1), "Focus notes\n\n--\n\nSlide notes");
        assert_eq!(hint(2), "Only focus\n\n--\n\n");
        assert_eq!(hint(3), "");
    }

    #[test]
    fn test_multi_slide_example_deck() {
        let reg = abc();
        let focuses = vec![Focus::slides(["A"]), Focus::slides(["B", "C"])];
        let resolved = resolve(&focuses, 1, &reg).unwrap().unwrap();
        assert!(vec_approx_eq(resolved.camera.offset, Vector2::new(0.0, 0.25)));
        let expected = (1.0_f64 / 2.0).min(1.0 / 1.5) - 0.01;
        assert!(approx_eq(resolved.camera.scale, expected));
    }

    #[test]
    fn test_multi_slide_scale_formula() {
        let reg = registry(vec![
            SlideDescriptor::new("A", Vector2::new(-1.0, 2.0)),
            SlideDescriptor::new("B", Vector2::new(3.0, 0.0)),
            SlideDescriptor::new("C", Vector2::new(0.0, -1.0)),
        ]);
        let resolved = resolve(&[Focus::slides(["A", "B", "C"])], 0, &reg)
            .unwrap()
            .unwrap();
        let (sx, sy) = (4.0_f64, 3.0_f64);
        assert!(approx_eq(
            resolved.camera.scale,
            (1.0 / (sx + 1.0)).min(1.0 / (sy + 1.0)) - 0.01
        ));
        assert!(vec_approx_eq(resolved.camera.offset, Vector2::new(1.0, 0.5)));
    }

    #[test]
    fn test_multi_slide_hint_joins_hinted_slides() {
        let reg = registry(vec![
            SlideDescriptor::new("A", Vector2::ZERO).with_hint("first"),
            SlideDescriptor::new("B", Vector2::new(1.0, 0.0)),
            SlideDescriptor::new("C", Vector2::new(2.0, 0.0)).with_hint("third"),
        ]);
        let focuses = vec![
            Focus::slides(["A", "B", "C"]),
            Focus::slides(["A", "C"]).with_hint("Both"),
            Focus::slides(["B", "B"]),
        ];
        let hint = |i| resolve(&focuses, i, &reg).unwrap().unwrap().hint;
        assert_eq!(hint(0), "**A:**\nfirst\n\n--\n\n**C:**\nthird");
        assert_eq!(
            hint(1),
            "Both\n\n--\n\n**A:**\nfirst\n\n--\n\n**C:**\nthird"
        );
        assert_eq!(hint(2), "");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let reg = abc();
        let focuses = vec![Focus::slides(["A", "B", "C"]).with_hint("all")];
        let first = resolve(&focuses, 0, &reg).unwrap().unwrap();
        let second = resolve(&focuses, 0, &reg).unwrap().unwrap();
        assert_eq!(first.camera.offset.dx.to_bits(), second.camera.offset.dx.to_bits());
        assert_eq!(first.camera.offset.dy.to_bits(), second.camera.offset.dy.to_bits());
        assert_eq!(first.camera.scale.to_bits(), second.camera.scale.to_bits());
        assert_eq!(first.hint, second.hint);
    }

    #[test]
    fn test_empty_slide_set_is_an_error() {
        let reg = abc();
        let focus = Focus::slides(Vec::<SlideId>::new());
        let id = focus.id;
        assert_eq!(
            resolve(&[focus], 0, &reg),
            Err(FocusError::EmptySlideSet { focus: id })
        );
    }

    #[test]
    fn test_unknown_slide_is_an_error() {
        let reg = abc();
        let focus = Focus::slides(["A", "Ghost"]);
        let id = focus.id;
        assert_eq!(
            resolve(&[focus], 0, &reg),
            Err(FocusError::UnknownSlide {
                focus: id,
                slide: SlideId::from("Ghost"),
            })
        );
    }
}
