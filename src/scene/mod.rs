//! Background scene: a camera orbiting a starfield and three floating
//! wireframe solids, all tinted with the palette's primary color.
//!
//! This module holds the frame math. `gl` turns it into WebGL2 draw calls.

pub mod geometry;
#[cfg(target_arch = "wasm32")]
pub mod gl;

use glam::{Mat4, Quat, Vec3};
use thiserror::Error;

use crate::content::SceneOptions;
use crate::theme::ThemeMode;

pub const CAMERA_DISTANCE: f32 = 8.0;
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1_000.0;

const FLOAT_SPEED: f32 = 4.0;
const FLOAT_ROTATION_INTENSITY: f32 = 2.0;
const FLOAT_INTENSITY: f32 = 2.0;

pub const STAR_TWINKLE_SPEED: f32 = 2.0;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("WebGL2 is not available")]
    ContextUnavailable,
    #[error("shader failed to compile: {0}")]
    ShaderCompile(String),
    #[error("program failed to link: {0}")]
    ProgramLink(String),
    #[error("{0}")]
    Js(String),
}

/// Linear RGB triple in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub const WHITE: Self = Self([1.0, 1.0, 1.0]);

    /// Parses `#rgb` or `#rrggbb`.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();

        let (r, g, b) = match hex.len() {
            6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
            3 => {
                let expand = |index: usize| channel(&hex[index..=index]).map(|v| v * 17);
                (expand(0)?, expand(1)?, expand(2)?)
            }
            _ => return None,
        };

        Some(Self([r, g, b].map(|c| f32::from(c) / 255.0)))
    }

}

/// Everything a frame needs from the theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneParams {
    pub mode: ThemeMode,
    pub tint: Rgb,
    pub fog_color: Rgb,
    pub fog_density: f32,
    pub spot_intensity: f32,
    pub point_intensity: f32,
    pub ambient_intensity: f32,
    pub star_opacity: f32,
    pub auto_rotate_speed: f32,
}

impl SceneParams {
    pub fn for_mode(mode: ThemeMode, options: &SceneOptions) -> Self {
        let palette = mode.palette();
        let tint = Rgb::from_hex(palette.primary).unwrap_or(Rgb::WHITE);
        let fog_color = Rgb::from_hex(palette.background).unwrap_or(Rgb([0.0; 3]));
        let dark = mode.is_dark();

        Self {
            mode,
            tint,
            fog_color,
            fog_density: if dark { 0.05 } else { 0.03 },
            spot_intensity: if dark { 2.0 } else { 1.5 },
            point_intensity: if dark { 1.0 } else { 0.8 },
            ambient_intensity: if dark { 0.5 } else { 0.7 },
            star_opacity: if dark { 1.0 } else { 0.5 },
            auto_rotate_speed: options.auto_rotate_speed as f32,
        }
    }

    /// Camera yaw after `elapsed` seconds. Speed 1 is one clockwise turn
    /// (seen from above) per 60 seconds.
    pub fn camera_yaw(&self, elapsed: f32) -> f32 {
        -std::f32::consts::TAU / 60.0 * self.auto_rotate_speed * elapsed
    }

    pub fn camera_eye(&self, elapsed: f32) -> Vec3 {
        let yaw = self.camera_yaw(elapsed);
        Vec3::new(yaw.sin(), 0.0, yaw.cos()) * CAMERA_DISTANCE
    }

    pub fn view(&self, elapsed: f32) -> Mat4 {
        Mat4::look_at_rh(self.camera_eye(elapsed), Vec3::ZERO, Vec3::Y)
    }
}

pub fn projection(width: f32, height: f32) -> Mat4 {
    let aspect = if height > 0.0 { width / height } else { 1.0 };
    Mat4::perspective_rh_gl(
        CAMERA_FOV_DEGREES.to_radians(),
        aspect,
        CAMERA_NEAR,
        CAMERA_FAR,
    )
}

/// Gentle bob and sway applied to the group of solids.
pub fn float_transform(elapsed: f32) -> Mat4 {
    let phase = elapsed / 4.0 * FLOAT_SPEED;
    let rotation = Quat::from_euler(
        glam::EulerRot::XYZ,
        phase.cos() / 8.0 * FLOAT_ROTATION_INTENSITY,
        phase.sin() / 8.0 * FLOAT_ROTATION_INTENSITY,
        phase.sin() / 20.0 * FLOAT_ROTATION_INTENSITY,
    );
    let lift = phase.sin() / 10.0 * FLOAT_INTENSITY;

    Mat4::from_rotation_translation(rotation, Vec3::new(0.0, lift, 0.0))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Dodecahedron,
    Icosahedron,
    TorusKnot,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Solid {
    pub shape: Shape,
    pub position: Vec3,
    pub opacity: f32,
    pub shininess: f32,
}

pub const SOLIDS: [Solid; 3] = [
    Solid {
        shape: Shape::Dodecahedron,
        position: Vec3::new(-4.0, 2.0, -5.0),
        opacity: 0.3,
        shininess: 0.0,
    },
    Solid {
        shape: Shape::Icosahedron,
        position: Vec3::new(4.0, -2.0, -5.0),
        opacity: 0.3,
        shininess: 0.0,
    },
    Solid {
        shape: Shape::TorusKnot,
        position: Vec3::ZERO,
        opacity: 0.2,
        shininess: 100.0,
    },
];

pub const SPOT_LIGHT_POSITION: Vec3 = Vec3::new(10.0, 10.0, 10.0);
pub const SPOT_LIGHT_ANGLE: f32 = 0.3;
pub const SPOT_LIGHT_PENUMBRA: f32 = 1.0;
pub const SPOT_LIGHT_DISTANCE: f32 = 50.0;
pub const POINT_LIGHT_POSITION: Vec3 = Vec3::new(-10.0, -10.0, -10.0);

impl Solid {
    pub fn model(&self, elapsed: f32) -> Mat4 {
        float_transform(elapsed) * Mat4::from_translation(self.position)
    }
}
