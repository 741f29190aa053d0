use glam::{Mat4, Quat, Vec3};

use crate::config::{CameraTuning, MAX_PITCH, MIN_PITCH};
use crate::sampler::Ground;
use crate::tank::TankPose;

/// Third-person camera trailing the tank.
///
/// The eye orbits `focus_point` at `distance`, `pitch` degrees above the
/// horizon and `yaw_offset` degrees around from directly behind the tank.
pub struct ChaseCamera {
    pub focus_point: Vec3,
    pub eye: Vec3,
    pub yaw_offset: f32,
    pub pitch: f32,
    pub distance: f32,
    tuning: CameraTuning,
}

impl ChaseCamera {
    pub fn new(tuning: CameraTuning, pose: &TankPose) -> Self {
        let mut camera = Self {
            focus_point: Vec3::ZERO,
            eye: Vec3::ZERO,
            yaw_offset: 0.0,
            pitch: tuning.pitch,
            distance: tuning.distance,
            tuning,
        };
        camera.focus_point = camera.focus_for(pose);
        camera.eye = camera.ideal_eye(pose);
        camera
    }

    pub fn orbit(&mut self, yaw_degrees: f32, pitch_degrees: f32) {
        self.yaw_offset = (self.yaw_offset + yaw_degrees) % 360.0;
        self.pitch = (self.pitch + pitch_degrees).clamp(MIN_PITCH, MAX_PITCH);
    }

    pub fn zoom(&mut self, delta: f32) {
        // Must not panic on an inverted range; `clamp` would.
        self.distance = (self.distance + delta)
            .min(self.tuning.max_distance)
            .max(self.tuning.min_distance);
    }

    /// Eases toward the ideal eye for `pose`; `scale` is the number of
    /// reference frames since the last call. The eye never dips below
    /// `min_terrain_clearance` over the ground beneath it.
    pub fn follow<G: Ground + ?Sized>(&mut self, pose: &TankPose, ground: &G, scale: f32) {
        self.focus_point = self.focus_for(pose);
        let ideal = self.ideal_eye(pose);
        let blend = 1.0 - (1.0 - self.tuning.smoothing).powf(scale);
        self.eye = self.eye.lerp(ideal, blend);

        let floor = ground.height_at(self.eye.x, self.eye.z) + self.tuning.min_terrain_clearance;
        self.eye.y = self.eye.y.max(floor);
    }

    pub fn build_view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.focus_point, Vec3::Y)
    }

    fn focus_for(&self, pose: &TankPose) -> Vec3 {
        pose.position + Vec3::Y * self.tuning.look_height
    }

    fn ideal_eye(&self, pose: &TankPose) -> Vec3 {
        let yaw = pose.yaw + self.yaw_offset.to_radians();
        let rotation = Quat::from_rotation_y(yaw) * Quat::from_rotation_x(self.pitch.to_radians());
        self.focus_for(pose) + rotation * Vec3::new(0.0, 0.0, -self.distance)
    }
}

pub struct Projection {
    aspect: f32,
    fovy: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, tuning: &CameraTuning) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: tuning.fovy.to_radians(),
            znear: tuning.znear,
            zfar: tuning.zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn build_projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }
}
