use eframe::egui::Color32;

/// Surface colors plus card text sizes, the latter as fractions of card height.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Color32,
    pub card: Color32,
    pub card_border: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub muted: Color32,
    pub title_ratio: f32,
    pub body_ratio: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Color32::from_rgb(0x12, 0x12, 0x14),
            card: Color32::from_rgb(0x1E, 0x1E, 0x1E),
            card_border: Color32::from_rgb(0x3A, 0x3A, 0x3A),
            foreground: Color32::from_rgb(0xC8, 0xC8, 0xC8),
            heading_color: Color32::WHITE,
            accent: Color32::from_rgb(0x52, 0x94, 0xE2),
            muted: Color32::from_rgb(0x80, 0x80, 0x80),
            title_ratio: 0.09,
            body_ratio: 0.045,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            background: Color32::from_rgb(0xE8, 0xE8, 0xEC),
            card: Color32::WHITE,
            card_border: Color32::from_rgb(0xC8, 0xC8, 0xD0),
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading_color: Color32::from_rgb(0x16, 0x21, 0x3E),
            accent: Color32::from_rgb(0x0F, 0x34, 0x60),
            muted: Color32::from_rgb(0x70, 0x70, 0x78),
            title_ratio: 0.09,
            body_ratio: 0.045,
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }
}
