//! Declarative clock face
//!
//! A scene is a JSON document listing the elements of the face in paint order.
//! The time binding is the [`HmsSink`] impl on [`ClockScene`]: every update
//! from the backend replaces the displayed time.

use crate::clock::{Hms, HmsSink};
use crate::error::{Error, Result};
use crate::resources;
use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};
use serde::Deserialize;
use std::f32::consts::TAU;
use tracing::debug;

/// Colour written as `#RRGGBB` or `#AARRGGBB`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color(pub Color32);

impl Color {
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor(text.to_string());
        let hex = text.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

        match hex.len() {
            6 => Ok(Self(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?))),
            8 => Ok(Self(Color32::from_rgba_unmultiplied(
                byte(2)?,
                byte(4)?,
                byte(6)?,
                byte(0)?,
            ))),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

/// Which field of the time a hand follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSource {
    Hours,
    Minutes,
    Seconds,
}

impl HandSource {
    /// Clockwise angle from 12 o'clock, in degrees
    pub fn angle_degrees(self, hms: Hms) -> f32 {
        let h = hms.hours as f32;
        let m = hms.minutes as f32;
        let s = hms.seconds as f32;
        match self {
            HandSource::Hours => (h % 12.0) * 30.0 + m * 0.5 + s / 120.0,
            HandSource::Minutes => m * 6.0 + s / 10.0,
            HandSource::Seconds => s * 6.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Dial {
        radius: f32,
        fill: Color,
        #[serde(default)]
        stroke_width: f32,
        #[serde(default)]
        stroke: Color,
    },
    Ticks {
        count: u32,
        #[serde(default)]
        major_every: u32,
        outer: f32,
        major_length: f32,
        minor_length: f32,
        width: f32,
        color: Color,
    },
    Hand {
        source: HandSource,
        length: f32,
        #[serde(default)]
        tail: f32,
        width: f32,
        color: Color,
    },
    Cap {
        radius: f32,
        color: Color,
    },
    Text {
        format: String,
        #[serde(default)]
        offset: [f32; 2],
        size: f32,
        color: Color,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub background: Color,
    pub elements: Vec<Element>,
}

impl Scene {
    /// Load and validate a scene from a resource path
    pub fn load(path: &str) -> Result<Self> {
        let source = resources::load(path)?;
        let scene: Scene = serde_json::from_str(&source).map_err(|e| Error::SceneParse {
            path: path.to_string(),
            source: e,
        })?;
        scene.validate()?;
        debug!(
            path,
            width = scene.width,
            height = scene.height,
            elements = scene.elements.len(),
            "Scene loaded"
        );
        Ok(scene)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.width) || !positive(self.height) {
            return Err(Error::InvalidScene(format!(
                "size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.elements.is_empty() {
            return Err(Error::InvalidScene("scene has no elements".into()));
        }
        for element in &self.elements {
            if let Element::Ticks { count: 0, .. } = element {
                return Err(Error::InvalidScene("ticks need a non-zero count".into()));
            }
            if let Element::Text { size, .. } = element {
                if !positive(*size) {
                    return Err(Error::InvalidScene("text size must be positive".into()));
                }
            }
        }
        Ok(())
    }

    pub fn size(&self) -> Vec2 {
        egui::vec2(self.width, self.height)
    }
}

/// Expand `{h} {hh} {m} {mm} {s} {ss}` placeholders
pub fn format_readout(format: &str, hms: Hms) -> String {
    format
        .replace("{hh}", &format!("{:02}", hms.hours))
        .replace("{mm}", &format!("{:02}", hms.minutes))
        .replace("{ss}", &format!("{:02}", hms.seconds))
        .replace("{h}", &hms.hours.to_string())
        .replace("{m}", &hms.minutes.to_string())
        .replace("{s}", &hms.seconds.to_string())
}

/// Unit vector pointing at `degrees` clockwise from 12 o'clock (y grows down)
fn direction(degrees: f32) -> Vec2 {
    let rad = degrees / 360.0 * TAU;
    egui::vec2(rad.sin(), -rad.cos())
}

/// A loaded scene bound to the time signal
pub struct ClockScene {
    scene: Scene,
    time: Option<Hms>,
    updates: u64,
}

impl ClockScene {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            time: None,
            updates: 0,
        }
    }

    pub fn load(path: &str) -> Result<Self> {
        Scene::load(path).map(Self::new)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn time(&self) -> Option<Hms> {
        self.time
    }

    #[cfg(test)]
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Paint the face scaled uniformly to fit `rect`
    pub fn paint(&self, painter: &egui::Painter, rect: Rect) {
        let scale = (rect.width() / self.scene.width).min(rect.height() / self.scene.height);
        let center = rect.center();

        if self.scene.background.0 != Color32::TRANSPARENT {
            painter.rect_filled(rect, 0.0, self.scene.background.0);
        }

        for element in &self.scene.elements {
            self.paint_element(painter, center, scale, element);
        }
    }

    fn paint_element(&self, painter: &egui::Painter, center: Pos2, scale: f32, element: &Element) {
        match element {
            Element::Dial {
                radius,
                fill,
                stroke_width,
                stroke,
            } => {
                painter.circle(
                    center,
                    radius * scale,
                    fill.0,
                    Stroke::new(stroke_width * scale, stroke.0),
                );
            }
            Element::Ticks {
                count,
                major_every,
                outer,
                major_length,
                minor_length,
                width,
                color,
            } => {
                for i in 0..*count {
                    let major = *major_every > 0 && i % major_every == 0;
                    let length = if major { *major_length } else { *minor_length };
                    let dir = direction(i as f32 * 360.0 / *count as f32);
                    painter.line_segment(
                        [
                            center + dir * (outer - length) * scale,
                            center + dir * *outer * scale,
                        ],
                        Stroke::new(width * scale, color.0),
                    );
                }
            }
            Element::Hand {
                source,
                length,
                tail,
                width,
                color,
            } => {
                // Hands and readouts stay hidden until the first update arrives
                let Some(hms) = self.time else { return };
                let dir = direction(source.angle_degrees(hms));
                painter.line_segment(
                    [center - dir * *tail * scale, center + dir * *length * scale],
                    Stroke::new(width * scale, color.0),
                );
            }
            Element::Cap { radius, color } => {
                painter.circle_filled(center, radius * scale, color.0);
            }
            Element::Text {
                format,
                offset,
                size,
                color,
            } => {
                let Some(hms) = self.time else { return };
                painter.text(
                    center + egui::vec2(offset[0], offset[1]) * scale,
                    Align2::CENTER_CENTER,
                    format_readout(format, hms),
                    FontId::monospace(size * scale),
                    color.0,
                );
            }
        }
    }
}

impl HmsSink for ClockScene {
    fn on_hms(&mut self, hms: Hms) {
        self.time = Some(hms);
        self.updates += 1;
    }
}
