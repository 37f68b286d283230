use glam::{Mat4, Quat, Vec3};
use relief_core::config::CameraParams;

use crate::pick::Ray;

/// Perspective camera orbiting a target point, trackball style: `up` turns
/// with the camera, so it is part of the persisted viewpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub up: Vec3,
    pub target: Vec3,
    pub fov_y_rad: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Camera {
    pub fn new(params: &CameraParams, aspect: f32) -> Self {
        Self {
            position: Vec3::from(params.position),
            up: Vec3::from(params.up),
            target: Vec3::from(params.target),
            fov_y_rad: params.fov_y_degrees.to_radians(),
            aspect,
            near: params.near,
            far: params.far,
            min_distance: params.min_distance,
            max_distance: params.max_distance,
        }
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Up vector actually used for the view. When `up` is parallel to the
    /// view direction (looking straight down the default up axis) a
    /// perpendicular axis is substituted.
    fn screen_up(&self) -> Vec3 {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(self.up);
        if right.length_squared() > 1e-8 {
            return right.cross(forward).normalize();
        }
        let fallback = if forward.z.abs() < 0.9 { Vec3::NEG_Z } else { Vec3::Y };
        let right = forward.cross(fallback).normalize_or_zero();
        right.cross(forward).normalize_or_zero()
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.screen_up())
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_rad, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Orientation of the camera in world space.
    pub fn quaternion(&self) -> Quat {
        Quat::from_mat4(&self.view().inverse()).normalize()
    }

    /// Re-orient the camera around the target, keeping its distance.
    pub fn set_quaternion(&mut self, orientation: Quat) {
        let distance = self.distance();
        let orientation = orientation.normalize();
        self.position = self.target + orientation * Vec3::Z * distance;
        self.up = orientation * Vec3::Y;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Ray from the eye through a point given in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let on_near_plane = self
            .view_proj()
            .inverse()
            .project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        Ray::new(self.position, on_near_plane - self.position)
    }

    /// Turn the camera around the target by `yaw` about the screen-up axis
    /// and `pitch` about the screen-right axis, both in radians.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let up = self.screen_up();
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(up).normalize_or_zero();
        let rotation = Quat::from_axis_angle(up, -yaw) * Quat::from_axis_angle(right, -pitch);

        self.position = self.target + rotation * (self.position - self.target);
        self.up = (rotation * up).normalize();
    }

    /// Scale the distance to the target by `factor`, within the allowed range.
    pub fn zoom(&mut self, factor: f32) {
        let offset = self.position - self.target;
        let distance = (offset.length() * factor).clamp(self.min_distance, self.max_distance);
        self.position = self.target + offset.normalize_or_zero() * distance;
    }
}
