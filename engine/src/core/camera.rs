//! Camera component
//!
//! The editor's own viewpoint is a camera entity tagged with
//! [`EditorCamera`]; it is persisted in the scene's `config.json` rather
//! than next to the other nodes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera lens and clipping parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    /// Vertical field of view in radians (perspective only)
    pub fov: f32,
    /// Near clipping plane distance
    pub min_z: f32,
    /// Far clipping plane distance
    pub max_z: f32,
    #[serde(flatten)]
    pub mode: CameraMode,
    /// Point an orbiting camera turns around
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec3>,
    /// Movement speed of the camera controls
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_speed() -> f32 {
    1.0
}

/// How the camera projects the scene
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum CameraMode {
    Perspective,
    #[serde(rename_all = "camelCase")]
    Orthographic { ortho_half_height: f32 },
}

/// Marker for the camera the editor viewport renders through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorCamera;

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(45.0, 0.1, 1000.0)
    }
}

impl Camera {
    /// Create a perspective camera from a vertical field of view in degrees
    pub fn perspective(fov_degrees: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            fov: fov_degrees.to_radians(),
            min_z,
            max_z,
            mode: CameraMode::Perspective,
            target: None,
            speed: default_speed(),
        }
    }

    /// Create an orthographic camera showing `half_height` units above and
    /// below its center
    pub fn orthographic(half_height: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            mode: CameraMode::Orthographic {
                ortho_half_height: half_height,
            },
            ..Self::perspective(0.0, min_z, max_z)
        }
    }

    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = Some(target);
        self
    }

    pub fn is_finite(&self) -> bool {
        let mode_finite = match self.mode {
            CameraMode::Perspective => true,
            CameraMode::Orthographic { ortho_half_height } => ortho_half_height.is_finite(),
        };
        mode_finite
            && self.fov.is_finite()
            && self.min_z.is_finite()
            && self.max_z.is_finite()
            && self.speed.is_finite()
            && self.target.map_or(true, |target| target.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perspective_uses_radians() {
        let camera = Camera::perspective(90.0, 0.1, 100.0);
        assert!((camera.fov - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(camera.mode, CameraMode::Perspective);
    }

    #[test]
    fn test_json_shape() {
        let camera = Camera::orthographic(4.0, 0.1, 10.0);
        let json = serde_json::to_value(camera).unwrap();
        assert_eq!(json["mode"], "orthographic");
        assert_eq!(json["orthoHalfHeight"], 4.0);
        assert_eq!(json["maxZ"], 10.0);
        assert!(json.get("target").is_none());

        let orbit = Camera::default().with_target(Vec3::new(1.0, 2.0, 3.0));
        let json = serde_json::to_value(orbit).unwrap();
        assert_eq!(json["mode"], "perspective");
        assert_eq!(json["target"], serde_json::json!([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_missing_speed_defaults() {
        let camera: Camera = serde_json::from_str(
            r#"{"fov":0.8,"minZ":0.1,"maxZ":50.0,"mode":"perspective"}"#,
        )
        .unwrap();
        assert_eq!(camera.speed, 1.0);
        assert_eq!(camera.target, None);
    }
}
