// src/skyplot.rs
//! Celestial sphere plot: projects satellites onto a disk and emits draw commands
//!
//! The renderer is a pure function of (observations, filter, viewport). Display
//! front ends paint the returned [`DrawCommand`]s with whatever surface they own.

use crate::{
    error::{Result, SkyviewError},
    filter::VisibilityFilter,
    gnss::{Constellation, SatelliteObservation},
};

/// Share of the half-extent used by the horizon ring
pub const RADIUS_FRACTION: f32 = 0.9;
pub const RING_STROKE_WIDTH: f32 = 5.0;
pub const MARKER_RADIUS: f32 = 10.0;
pub const LABEL_OFFSET: f32 = 10.0;
pub const LABEL_SIZE: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Colors the sky plot paints with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkyColor {
    Blue,
    Red,
    Yellow,
    Green,
    Gray,
}

impl SkyColor {
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            SkyColor::Blue => (0, 0, 255),
            SkyColor::Red => (255, 0, 0),
            SkyColor::Yellow => (255, 255, 0),
            SkyColor::Green => (0, 255, 0),
            SkyColor::Gray => (136, 136, 136),
        }
    }

    pub fn for_constellation(constellation: Constellation) -> Self {
        match constellation {
            Constellation::Gps => SkyColor::Red,
            Constellation::Glonass => SkyColor::Yellow,
            Constellation::Galileo => SkyColor::Green,
            Constellation::Other => SkyColor::Gray,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// `stroke_width: None` means filled
    Circle {
        center: Point,
        radius: f32,
        color: SkyColor,
        stroke_width: Option<f32>,
    },
    Line {
        from: Point,
        to: Point,
        color: SkyColor,
        width: f32,
    },
    Text {
        position: Point,
        text: String,
        color: SkyColor,
        size: f32,
    },
}

/// Size of the drawing surface and the horizon radius derived from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportGeometry {
    width: f32,
    height: f32,
    radius: f32,
}

impl ViewportGeometry {
    /// Geometry for the current view bounds, radius = 0.9 * min(w, h) / 2
    pub fn new(width: f32, height: f32) -> Result<Self> {
        Self::with_radius(width, height, RADIUS_FRACTION * width.min(height) / 2.0)
    }

    pub fn with_radius(width: f32, height: f32, radius: f32) -> Result<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) || !valid(radius) {
            return Err(SkyviewError::Config(format!(
                "invalid sky plot viewport {}x{} (radius {})",
                width, height, radius
            )));
        }
        Ok(Self { width, height, radius })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Plot-space (north up, y grows upward) to screen space
    pub fn to_screen(&self, x: f32, y: f32) -> Point {
        Point::new(x + self.width / 2.0, -y + self.height / 2.0)
    }

    /// Orthographic projection of azimuth/elevation onto the disk.
    ///
    /// Zenith lands on the center and the horizon on the ring of `radius`.
    pub fn project(&self, azimuth_degrees: f32, elevation_degrees: f32) -> Point {
        let azimuth = azimuth_degrees.to_radians();
        let elevation = elevation_degrees.to_radians();
        let x = self.radius * elevation.cos() * azimuth.sin();
        let y = self.radius * elevation.cos() * azimuth.cos();
        self.to_screen(x, y)
    }
}

/// Stateless sky plot renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct SkyPlotRenderer;

impl SkyPlotRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Background, then every satellite the filter admits.
    ///
    /// `None` means no status has arrived yet; only the background is drawn.
    pub fn render(
        &self,
        observations: Option<&[SatelliteObservation]>,
        filter: &VisibilityFilter,
        viewport: &ViewportGeometry,
    ) -> Vec<DrawCommand> {
        let mut commands = self.background(viewport);
        if let Some(observations) = observations {
            for sat in observations.iter().filter(|sat| filter.admits(sat)) {
                commands.extend(self.satellite(sat, viewport));
            }
        }
        commands
    }

    /// Horizon, 45° and 60° rings plus the two cardinal axes
    pub fn background(&self, viewport: &ViewportGeometry) -> Vec<DrawCommand> {
        let center = viewport.center();
        let r = viewport.radius();

        let ring = |radius: f32| DrawCommand::Circle {
            center,
            radius,
            color: SkyColor::Blue,
            stroke_width: Some(RING_STROKE_WIDTH),
        };
        let axis = |from: Point, to: Point| DrawCommand::Line {
            from,
            to,
            color: SkyColor::Blue,
            width: RING_STROKE_WIDTH,
        };

        vec![
            ring(r),
            ring(r * 45f32.to_radians().cos()),
            ring(r * 60f32.to_radians().cos()),
            axis(viewport.to_screen(0.0, -r), viewport.to_screen(0.0, r)),
            axis(viewport.to_screen(-r, 0.0), viewport.to_screen(r, 0.0)),
        ]
    }

    fn satellite(
        &self,
        sat: &SatelliteObservation,
        viewport: &ViewportGeometry,
    ) -> [DrawCommand; 2] {
        let color = SkyColor::for_constellation(sat.constellation);
        let center = viewport.project(sat.azimuth_degrees, sat.elevation_degrees);
        [
            DrawCommand::Circle {
                center,
                radius: MARKER_RADIUS,
                color,
                stroke_width: None,
            },
            DrawCommand::Text {
                position: Point::new(center.x + LABEL_OFFSET, center.y + LABEL_OFFSET),
                text: satellite_label(sat),
                color,
                size: LABEL_SIZE,
            },
        ]
    }
}

/// Satellite id plus a fix-usage indicator
pub fn satellite_label(sat: &SatelliteObservation) -> String {
    format!("{} - {}", sat.id, if sat.used_in_fix { "used" } else { "unused" })
}
