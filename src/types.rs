//! Slide record and partial updates.
//!
//! A [`Slide`] is never replaced wholesale. Every change, whether it comes from
//! the transform controller (position, scale) or a style editor (caption,
//! colors), arrives as a [`SlideUpdate`] whose present fields are merged by
//! [`Slide::apply`]. Serialized updates only carry the fields that changed:
//!
//! ```json
//! { "image_position": { "x": 10.0, "y": 0.0 } }
//! ```
//!
//! Deserialization is forgiving about older data: a missing `image_position`
//! or `scale` becomes centered / `1`, and the camelCase names used by earlier
//! exports (`imageUrl`, `imagePosition`, ...) are accepted as aliases.

use crate::aspect::AspectRatio;
use crate::config::SlideDefaults;
use crate::geometry::{Position, sanitize_scale};
use serde::{Deserialize, Serialize};

/// Horizontal caption anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl std::str::FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Alignment::Left),
            "center" | "centre" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            other => Err(format!("unknown alignment '{other}' (expected left, center or right)")),
        }
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        })
    }
}

/// One photo slide: source image, caption styling, and crop transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Opaque identifier, assigned at creation. Names the export file.
    pub id: String,
    /// Path of the source image. A new upload means a new slide.
    #[serde(alias = "imageUrl", alias = "imageSource")]
    pub image_source: String,
    #[serde(default)]
    pub caption: String,
    /// Font family key (`inter`, `playfair`, ...).
    #[serde(default = "default_font_family", alias = "fontFamily")]
    pub font_family: String,
    /// CSS-style hex color.
    #[serde(default = "default_text_color", alias = "textColor")]
    pub text_color: String,
    #[serde(default)]
    pub alignment: Alignment,
    /// On-screen font size in px. Clamped to 12–48 when rendered.
    #[serde(default = "default_font_size", alias = "fontSize")]
    pub font_size: f32,
    /// Opacity of the bottom shadow, 0–1. Clamped when rendered.
    #[serde(default = "default_gradient_intensity", alias = "gradientIntensity")]
    pub gradient_intensity: f32,
    /// Ratio string keyed into [`AspectRatio`], e.g. `"4 / 5"`.
    #[serde(default = "default_aspect_ratio", alias = "aspectRatio")]
    pub aspect_ratio: String,
    #[serde(default, alias = "imagePosition")]
    pub image_position: Position,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_font_family() -> String {
    SlideDefaults::default().font_family
}

fn default_text_color() -> String {
    SlideDefaults::default().text_color
}

fn default_font_size() -> f32 {
    SlideDefaults::default().font_size
}

fn default_gradient_intensity() -> f32 {
    SlideDefaults::default().gradient_intensity
}

fn default_aspect_ratio() -> String {
    AspectRatio::default().as_ratio_str().to_string()
}

fn default_scale() -> f64 {
    1.0
}

impl Slide {
    /// Create a slide for a freshly added image: centered, unzoomed, styled
    /// with the configured defaults.
    pub fn new(
        id: impl Into<String>,
        image_source: impl Into<String>,
        defaults: &SlideDefaults,
    ) -> Self {
        Self {
            id: id.into(),
            image_source: image_source.into(),
            caption: defaults.caption.clone(),
            font_family: defaults.font_family.clone(),
            text_color: defaults.text_color.clone(),
            alignment: defaults.alignment,
            font_size: defaults.font_size,
            gradient_intensity: defaults.gradient_intensity,
            aspect_ratio: defaults.aspect_ratio.clone(),
            image_position: Position::CENTER,
            scale: 1.0,
        }
    }

    /// The table entry for this slide's ratio string (1:1 if malformed).
    pub fn aspect(&self) -> AspectRatio {
        AspectRatio::resolve(&self.aspect_ratio)
    }

    /// Scale with invalid values replaced by 1.
    pub fn effective_scale(&self) -> f64 {
        sanitize_scale(self.scale)
    }

    /// Position with non-finite components replaced by 0.
    pub fn effective_position(&self) -> Position {
        self.image_position.sanitized()
    }

    /// Merge the fields present in `update`.
    pub fn apply(&mut self, update: SlideUpdate) {
        let SlideUpdate {
            caption,
            font_family,
            text_color,
            alignment,
            font_size,
            gradient_intensity,
            aspect_ratio,
            image_position,
            scale,
        } = update;

        if let Some(v) = caption {
            self.caption = v;
        }
        if let Some(v) = font_family {
            self.font_family = v;
        }
        if let Some(v) = text_color {
            self.text_color = v;
        }
        if let Some(v) = alignment {
            self.alignment = v;
        }
        if let Some(v) = font_size {
            self.font_size = v;
        }
        if let Some(v) = gradient_intensity {
            self.gradient_intensity = v;
        }
        if let Some(v) = aspect_ratio {
            self.aspect_ratio = v;
        }
        if let Some(v) = image_position {
            self.image_position = v;
        }
        if let Some(v) = scale {
            self.scale = v;
        }
    }
}

/// A partial change to a [`Slide`]. `id` and `image_source` are immutable
/// and therefore absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_intensity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl SlideUpdate {
    pub fn position(position: Position) -> Self {
        Self {
            image_position: Some(position),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fold `other` into `self`; fields present in `other` win.
    pub fn merge(mut self, other: SlideUpdate) -> Self {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            caption,
            font_family,
            text_color,
            alignment,
            font_size,
            gradient_intensity,
            aspect_ratio,
            image_position,
            scale
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide() -> Slide {
        Slide::new("abc", "photos/dawn.jpg", &SlideDefaults::default())
    }

    #[test]
    fn new_slide_is_centered_and_unzoomed() {
        let s = slide();
        assert_eq!(s.image_position, Position::CENTER);
        assert_eq!(s.scale, 1.0);
        assert_eq!(s.aspect(), AspectRatio::Square);
        assert_eq!(s.alignment, Alignment::Center);
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut s = slide();
        s.apply(SlideUpdate {
            caption: Some("Golden hour".into()),
            scale: Some(1.5),
            ..SlideUpdate::default()
        });
        assert_eq!(s.caption, "Golden hour");
        assert_eq!(s.scale, 1.5);
        assert_eq!(s.font_family, SlideDefaults::default().font_family);
        assert_eq!(s.id, "abc");
    }

    #[test]
    fn update_serializes_only_changed_fields() {
        let update = SlideUpdate::position(Position::new(10.0, 0.0));
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "image_position": { "x": 10.0, "y": 0.0 } }));
    }

    #[test]
    fn merge_prefers_later_fields() {
        let a = SlideUpdate {
            scale: Some(2.0),
            image_position: Some(Position::new(5.0, 5.0)),
            ..SlideUpdate::default()
        };
        let b = SlideUpdate::position(Position::new(1.0, 1.0));
        let merged = a.merge(b);
        assert_eq!(merged.scale, Some(2.0));
        assert_eq!(merged.image_position, Some(Position::new(1.0, 1.0)));
        assert!(SlideUpdate::default().is_empty());
    }

    #[test]
    fn missing_transform_fields_get_defaults() {
        let json = r#"{ "id": "s1", "image_source": "a.jpg", "caption": "hi" }"#;
        let s: Slide = serde_json::from_str(json).unwrap();
        assert_eq!(s.image_position, Position::CENTER);
        assert_eq!(s.scale, 1.0);
        assert_eq!(s.aspect_ratio, "1 / 1");
    }

    #[test]
    fn legacy_camel_case_fields_are_accepted() {
        let json = r##"{
            "id": "s2",
            "imageUrl": "b.jpg",
            "caption": "",
            "fontFamily": "font-oswald",
            "textColor": "#FCD34D",
            "alignment": "right",
            "fontSize": 24,
            "gradientIntensity": 0.5,
            "aspectRatio": "9 / 16",
            "imagePosition": { "x": -4.0, "y": 2.5 }
        }"##;
        let s: Slide = serde_json::from_str(json).unwrap();
        assert_eq!(s.image_source, "b.jpg");
        assert_eq!(s.alignment, Alignment::Right);
        assert_eq!(s.aspect(), AspectRatio::Story);
        assert_eq!(s.image_position, Position::new(-4.0, 2.5));
        assert_eq!(s.scale, 1.0);
    }

    #[test]
    fn effective_scale_rejects_invalid_values() {
        let mut s = slide();
        s.scale = 0.0;
        assert_eq!(s.effective_scale(), 1.0);
        s.scale = 2.5;
        assert_eq!(s.effective_scale(), 2.5);
    }

    #[test]
    fn alignment_parses_case_insensitively() {
        assert_eq!("LEFT".parse::<Alignment>(), Ok(Alignment::Left));
        assert!("justify".parse::<Alignment>().is_err());
    }
}
