//! YAML deck files: slide layout plus the focus path through it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::camera::Camera;
use crate::focus::{Focus, FocusKind};
use crate::geometry::Vector2;
use crate::slide::{
    DEFAULT_SINGLE_FOCUS_SCALE, ForwardCapture, NoCapture, SlideDescriptor, SlideError, SlideId,
    SlideRegistry, StepCapture,
};

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("failed to read deck {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid deck YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Slide(#[from] SlideError),
    #[error("focus #{index} lists no slides")]
    EmptySlideSet { index: usize },
    #[error("focus #{index} references unknown slide '{slide}'")]
    UnknownSlide { index: usize, slide: SlideId },
    #[error("focus #{index} must have exactly one of `slides` or `camera`")]
    AmbiguousFocus { index: usize },
    #[error("slide '{id}' has an invalid scale {scale}")]
    InvalidScale { id: SlideId, scale: f64 },
    #[error("focus #{index} has an invalid camera pose {camera:?}")]
    InvalidCamera { index: usize, camera: Camera },
}

/// Scales must be finite and strictly positive; the plane mapping divides by them.
fn valid_scale(scale: f64) -> bool {
    scale > 0.0 && scale.is_finite()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeckFile {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slides: Vec<SlideEntry>,
    #[serde(default)]
    focuses: Vec<FocusEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SlideEntry {
    id: String,
    #[serde(default)]
    offset: Vector2,
    #[serde(default = "default_scale")]
    scale: f64,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    steps: u32,
}

fn default_scale() -> f64 {
    DEFAULT_SINGLE_FOCUS_SCALE
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FocusEntry {
    #[serde(default)]
    slides: Option<Vec<String>>,
    #[serde(default)]
    camera: Option<Camera>,
    #[serde(default)]
    hint: Option<String>,
}

/// A loaded deck, ready to be presented.
#[derive(Debug)]
pub struct Deck {
    pub title: Option<String>,
    pub registry: SlideRegistry,
    pub focuses: Vec<Focus>,
}

impl Deck {
    pub fn load(path: &Path) -> Result<Self, DeckError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DeckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let deck = Self::parse(&contents)?;
        info!(
            path = %path.display(),
            slides = deck.registry.len(),
            focuses = deck.focuses.len(),
            "Deck loaded"
        );
        Ok(deck)
    }

    pub fn parse(contents: &str) -> Result<Self, DeckError> {
        let file: DeckFile = serde_yaml::from_str(contents)?;

        let mut registry = SlideRegistry::new();
        for entry in file.slides {
            if !valid_scale(entry.scale) {
                return Err(DeckError::InvalidScale {
                    id: SlideId::new(entry.id),
                    scale: entry.scale,
                });
            }
            let capture: Box<dyn ForwardCapture> = if entry.steps > 0 {
                Box::new(StepCapture { steps: entry.steps })
            } else {
                Box::new(NoCapture)
            };
            let mut slide = SlideDescriptor::new(entry.id, entry.offset)
                .with_single_focus_scale(entry.scale);
            slide.hint = entry.hint;
            slide.title = entry.title;
            slide.body = entry.body;
            debug!(slide = %slide.id, steps = entry.steps, "Registering slide");
            registry.register(slide, capture)?;
        }

        let known: HashSet<&SlideId> = registry.iter().map(|s| &s.id).collect();
        let focuses = file
            .focuses
            .into_iter()
            .enumerate()
            .map(|(index, entry)| focus_from_entry(index, entry, &known))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            title: file.title,
            registry,
            focuses,
        })
    }
}

fn focus_from_entry(
    index: usize,
    entry: FocusEntry,
    known: &HashSet<&SlideId>,
) -> Result<Focus, DeckError> {
    let kind = match (entry.slides, entry.camera) {
        (Some(ids), None) => {
            if ids.is_empty() {
                return Err(DeckError::EmptySlideSet { index });
            }
            let ids: Vec<SlideId> = ids.into_iter().map(SlideId::new).collect();
            if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
                return Err(DeckError::UnknownSlide {
                    index,
                    slide: missing.clone(),
                });
            }
            FocusKind::SlideSet(ids)
        }
        (None, Some(camera)) => {
            let offset_finite = camera.offset.dx.is_finite() && camera.offset.dy.is_finite();
            if !offset_finite || !valid_scale(camera.scale) {
                return Err(DeckError::InvalidCamera { index, camera });
            }
            FocusKind::FixedPose(camera)
        }
        _ => return Err(DeckError::AmbiguousFocus { index }),
    };
    Ok(Focus::new(kind, entry.hint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver;

    const EXAMPLE: &str = r#"
title: Plane tour
slides:
  - id: A
    offset: [0.0, 0.0]
    hint: Start here
    steps: 2
  - id: B
    offset: [-0.5, 0.0]
    scale: 0.8
  - id: C
    offset: [0.5, 0.5]
    title: Card
    body: Some text
focuses:
  - slides: [A]
  - slides: [B, C]
    hint: Both
  - camera: { offset: [0.5, 0.0], scale: 0.5 }
"#;

    #[test]
    fn test_parse_example_deck() {
        let deck = Deck::parse(EXAMPLE).unwrap();
        assert_eq!(deck.title.as_deref(), Some("Plane tour"));
        assert_eq!(deck.registry.len(), 3);
        assert_eq!(deck.focuses.len(), 3);

        let b = deck.registry.get(&SlideId::from("B")).unwrap();
        assert_eq!(b.single_focus_scale, 0.8);
        let a = deck.registry.get(&SlideId::from("A")).unwrap();
        assert_eq!(a.single_focus_scale, DEFAULT_SINGLE_FOCUS_SCALE);
        let c = deck.registry.get(&SlideId::from("C")).unwrap();
        assert_eq!(c.title.as_deref(), Some("Card"));

        assert_eq!(deck.focuses[1].hint.as_deref(), Some("Both"));
        assert_eq!(
            deck.focuses[2].kind,
            FocusKind::FixedPose(Camera::new(Vector2::new(0.5, 0.0), 0.5))
        );
    }

    #[test]
    fn test_every_focus_resolves() {
        let deck = Deck::parse(EXAMPLE).unwrap();
        for focus in &deck.focuses {
            resolver::resolve_focus(focus, &deck.registry).unwrap();
        }
    }

    #[test]
    fn test_steps_become_forward_capture() {
        let mut deck = Deck::parse(EXAMPLE).unwrap();
        let a = SlideId::from("A");
        assert!(deck.registry.capture_forward_event(&a, 0));
        assert!(deck.registry.capture_forward_event(&a, 1));
        assert!(!deck.registry.capture_forward_event(&a, 2));
        assert!(!deck.registry.capture_forward_event(&SlideId::from("B"), 0));
    }

    #[test]
    fn test_empty_deck() {
        let deck = Deck::parse("{}").unwrap();
        assert!(deck.registry.is_empty());
        assert!(deck.focuses.is_empty());
    }

    #[test]
    fn test_duplicate_slide_id() {
        let yaml = "slides:\n  - id: A\n  - id: A\n";
        let err = Deck::parse(yaml).unwrap_err();
        assert!(matches!(err, DeckError::Slide(SlideError::DuplicateId(_))));
    }

    #[test]
    fn test_empty_slide_set() {
        let yaml = "slides:\n  - id: A\nfocuses:\n  - slides: []\n";
        let err = Deck::parse(yaml).unwrap_err();
        assert!(matches!(err, DeckError::EmptySlideSet { index: 0 }));
    }

    #[test]
    fn test_unknown_slide_reference() {
        let yaml = "slides:\n  - id: A\nfocuses:\n  - slides: [A]\n  - slides: [A, Z]\n";
        let err = Deck::parse(yaml).unwrap_err();
        match err {
            DeckError::UnknownSlide { index, slide } => {
                assert_eq!(index, 1);
                assert_eq!(slide.as_str(), "Z");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_focus_needs_exactly_one_target() {
        let both = "slides:\n  - id: A\nfocuses:\n  - slides: [A]\n    camera: { offset: [0, 0], scale: 1 }\n";
        assert!(matches!(
            Deck::parse(both).unwrap_err(),
            DeckError::AmbiguousFocus { index: 0 }
        ));

        let neither = "focuses:\n  - hint: lonely\n";
        assert!(matches!(
            Deck::parse(neither).unwrap_err(),
            DeckError::AmbiguousFocus { index: 0 }
        ));
    }

    #[test]
    fn test_non_positive_scale() {
        let yaml = "slides:\n  - id: A\n    scale: 0\n";
        assert!(matches!(
            Deck::parse(yaml).unwrap_err(),
            DeckError::InvalidScale { .. }
        ));
    }

    #[test]
    fn test_non_finite_slide_scale() {
        for scale in [".nan", ".inf"] {
            let yaml = format!("slides:\n  - id: A\n    scale: {scale}\n");
            assert!(matches!(
                Deck::parse(&yaml).unwrap_err(),
                DeckError::InvalidScale { .. }
            ));
        }
    }

    #[test]
    fn test_invalid_camera_focus() {
        for camera in [
            "{ offset: [0, 0], scale: 0 }",
            "{ offset: [0, 0], scale: -1 }",
            "{ offset: [0, 0], scale: .nan }",
            "{ offset: [.inf, 0], scale: 1 }",
        ] {
            let yaml = format!("focuses:\n  - camera: {camera}\n");
            assert!(
                matches!(
                    Deck::parse(&yaml).unwrap_err(),
                    DeckError::InvalidCamera { index: 0, .. }
                ),
                "{camera} should be rejected"
            );
        }
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            Deck::parse("slides: [").unwrap_err(),
            DeckError::Yaml(_)
        ));
        assert!(matches!(
            Deck::parse("slides:\n  - id: A\n    colour: red\n").unwrap_err(),
            DeckError::Yaml(_)
        ));
    }

    #[test]
    fn test_demo_deck() {
        let deck = Deck::parse(include_str!("../../../demos/plane-tour.yaml")).unwrap();
        assert_eq!(deck.registry.len(), 4);
        for focus in &deck.focuses {
            resolver::resolve_focus(focus, &deck.registry).unwrap();
        }
    }

    #[test]
    fn test_missing_file() {
        let err = Deck::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, DeckError::Io { .. }));
    }
}
