//! Terrain-following locomotion for the player tank.
//!
//! Each tick the tank moves in the plane from its intents, then rides on the
//! highest of five footprint samples, easing toward that height instead of
//! snapping to it. A height jump larger than `recovery_threshold` switches to
//! recovery: half the smoothing rate and half the step cap, until
//! `recovery_ticks` consecutive ticks pass without another jump.
//!
//! Orientation is yaw composed with a tilt that eases toward the blended
//! ground normal. Slopes too steep for `min_alignment_up` ease back to level
//! instead, so the tank never rolls over on a cliff face.

use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec3};

use crate::config::{TankTuning, WeaponTable};
use crate::input::{ControlSnapshot, WeaponMode};
use crate::sampler::{sanitize_normal, Ground};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub position: Vec3,
    /// Radians about +Y; zero faces +Z.
    pub yaw: f32,
    pub tilt: Quat,
    pub prev_normal: Vec3,
    /// Target height of the previous tick, used to detect jumps.
    pub prev_height: f32,
    pub stable_ticks: u32,
    pub recovering: bool,
}

impl VehicleState {
    pub fn orientation(&self) -> Quat {
        self.tilt * Quat::from_rotation_y(self.yaw)
    }

    pub fn pose(&self) -> TankPose {
        TankPose {
            position: self.position,
            yaw: self.yaw,
            orientation: self.orientation(),
        }
    }
}

/// Finalized transform emitted after every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankPose {
    pub position: Vec3,
    pub yaw: f32,
    pub orientation: Quat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRequest {
    pub position: Vec3,
    pub direction: Vec3,
    pub weapon: WeaponMode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankUpdate {
    pub pose: TankPose,
    pub shot: Option<ShotRequest>,
    /// The tank was put back at its spawn point this tick.
    pub reset: bool,
}

/// Gates fire requests to one per cooldown interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireControl {
    since_last: f32,
}

impl Default for FireControl {
    fn default() -> Self {
        Self { since_last: f32::INFINITY }
    }
}

impl FireControl {
    pub fn tick(&mut self, dt: f32) {
        self.since_last += dt;
    }

    pub fn try_fire(&mut self, cooldown: f32) -> bool {
        if self.since_last >= cooldown {
            self.since_last = 0.0;
            true
        } else {
            false
        }
    }
}

/// Times how long the tank has been somewhere it should not be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneWatch {
    entered_at: Option<f32>,
    timeout: f32,
}

impl ZoneWatch {
    pub fn new(timeout: f32) -> Self {
        Self { entered_at: None, timeout }
    }

    pub fn entered_at(&self) -> Option<f32> {
        self.entered_at
    }

    /// Returns true exactly once per stay that outlasts the timeout.
    pub fn update(&mut self, now: f32, in_invalid_zone: bool) -> bool {
        if !in_invalid_zone {
            self.entered_at = None;
            return false;
        }
        let entered = *self.entered_at.get_or_insert(now);
        if now - entered >= self.timeout {
            self.entered_at = None;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tank {
    state: VehicleState,
    tuning: TankTuning,
    fire: FireControl,
    zone: ZoneWatch,
    clock: f32,
}

impl Tank {
    pub fn spawn<G: Ground + ?Sized>(ground: &G, tuning: TankTuning) -> Self {
        let state = spawn_state(ground, &tuning);
        log::debug!("tank spawned at {:?}", state.position);
        let zone = ZoneWatch::new(tuning.reset_after);
        Self {
            state,
            tuning,
            fire: FireControl::default(),
            zone,
            clock: 0.0,
        }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn tuning(&self) -> &TankTuning {
        &self.tuning
    }

    pub fn pose(&self) -> TankPose {
        self.state.pose()
    }

    /// Simulation time accumulated from sanitized tick deltas, in seconds.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn advance<G: Ground + ?Sized>(
        &mut self,
        ground: &G,
        controls: &ControlSnapshot,
        weapons: &WeaponTable,
        dt: f32,
    ) -> TankUpdate {
        let dt = sanitize_dt(dt);
        let scale = frame_scale(dt, &self.tuning);
        self.clock += dt;
        self.fire.tick(dt);

        let (forward, right) = heading(self.state.yaw);
        let step = self.tuning.move_speed * scale;
        let mut candidate = self.state.position
            + (forward * controls.drive_axis() + right * controls.strafe_axis()) * step;

        let target = footprint_height(ground, candidate, forward, right, &self.tuning)
            + self.tuning.ground_clearance;
        self.track_stability(target);
        candidate.y = self.settle_height(target, scale);

        let turn = controls.turn_axis() * self.tuning.rotation_speed * scale;
        self.state.yaw = wrap_angle(self.state.yaw + turn);

        let normal = self.smoothed_normal(ground, candidate, forward, right, scale);
        self.ease_tilt(normal, scale);
        self.state.position = candidate;

        let reset = self
            .zone
            .update(self.clock, !ground.contains(candidate.x, candidate.z));
        if reset {
            log::debug!(
                "tank left the terrain for {:.1}s, returning to spawn",
                self.tuning.reset_after
            );
            self.state = spawn_state(ground, &self.tuning);
        }

        let shot = if controls.fire && self.fire.try_fire(controls.weapon.spec(weapons).cooldown) {
            let shot = self.muzzle(controls.weapon);
            log::debug!("{:?} fired from {:?}", shot.weapon, shot.position);
            Some(shot)
        } else {
            None
        };

        TankUpdate {
            pose: self.state.pose(),
            shot,
            reset,
        }
    }

    fn track_stability(&mut self, target: f32) {
        let jump = (target - self.state.prev_height).abs();
        self.state.prev_height = target;

        if jump > self.tuning.recovery_threshold {
            if !self.state.recovering {
                log::debug!("height jump of {jump:.2}, entering recovery");
            }
            self.state.recovering = true;
            self.state.stable_ticks = 0;
        } else if self.state.recovering {
            self.state.stable_ticks += 1;
            if self.state.stable_ticks >= self.tuning.recovery_ticks {
                log::debug!("stable for {} ticks, leaving recovery", self.state.stable_ticks);
                self.state.recovering = false;
                self.state.stable_ticks = 0;
            }
        }
    }

    fn settle_height(&self, target: f32, scale: f32) -> f32 {
        let current = self.state.position.y;
        let gap = target - current;
        if gap.abs() <= self.tuning.settle_epsilon {
            return target;
        }

        let (rate, cap) = self.height_rates();
        let factor = 1.0 - (1.0 - rate).powf(scale);
        let cap = cap * scale;
        current + (gap * factor).clamp(-cap, cap)
    }

    /// Smoothing rate and per-reference-frame step cap for the current mode.
    pub fn height_rates(&self) -> (f32, f32) {
        let t = &self.tuning;
        if self.state.recovering {
            (t.height_smoothing * 0.5, t.max_height_step * 0.5)
        } else {
            (t.height_smoothing, t.max_height_step)
        }
    }

    fn smoothed_normal<G: Ground + ?Sized>(
        &mut self,
        ground: &G,
        center: Vec3,
        forward: Vec3,
        right: Vec3,
        scale: f32,
    ) -> Vec3 {
        let t = &self.tuning;
        let mut blended =
            sanitize_normal(ground.normal_at(center.x, center.z)) * t.center_normal_weight;
        for p in footprint_offsets(center, forward, right, t.footprint_sample_distance) {
            blended += sanitize_normal(ground.normal_at(p.x, p.z)) * t.offset_normal_weight;
        }
        let blended = sanitize_normal(blended);

        let keep = t.normal_history_weight.powf(scale);
        let smoothed = sanitize_normal(self.state.prev_normal.lerp(blended, 1.0 - keep));
        self.state.prev_normal = smoothed;
        smoothed
    }

    fn ease_tilt(&mut self, normal: Vec3, scale: f32) {
        let t = &self.tuning;
        let target = if normal.y > t.min_alignment_up {
            Quat::from_rotation_arc(Vec3::Y, normal)
        } else {
            Quat::IDENTITY
        };

        let mut rate = 1.0 - (1.0 - t.tilt_rate).powf(scale);
        if self.state.recovering {
            rate *= 0.5;
        }
        let rate = rate.min(t.max_tilt_rate);
        self.state.tilt = self.state.tilt.slerp(target, rate).normalize();
    }

    fn muzzle(&self, weapon: WeaponMode) -> ShotRequest {
        let orientation = self.state.orientation();
        let offset = Vec3::new(0.0, self.tuning.muzzle_height, self.tuning.muzzle_forward);
        ShotRequest {
            position: self.state.position + orientation * offset,
            direction: (orientation * Vec3::Z).normalize(),
            weapon,
        }
    }
}

fn spawn_state<G: Ground + ?Sized>(ground: &G, tuning: &TankTuning) -> VehicleState {
    let base = Vec3::new(tuning.spawn_x, 0.0, tuning.spawn_z);
    let (forward, right) = heading(0.0);
    let height = footprint_height(ground, base, forward, right, tuning) + tuning.ground_clearance;
    let normal = sanitize_normal(ground.normal_at(base.x, base.z));
    let tilt = if normal.y > tuning.min_alignment_up {
        Quat::from_rotation_arc(Vec3::Y, normal)
    } else {
        Quat::IDENTITY
    };

    VehicleState {
        position: Vec3::new(base.x, height, base.z),
        yaw: 0.0,
        tilt,
        prev_normal: normal,
        prev_height: height,
        stable_ticks: 0,
        recovering: false,
    }
}

/// Unit forward and right vectors in the ground plane for `yaw`.
pub fn heading(yaw: f32) -> (Vec3, Vec3) {
    let (sin, cos) = yaw.sin_cos();
    (Vec3::new(sin, 0.0, cos), Vec3::new(cos, 0.0, -sin))
}

fn footprint_offsets(center: Vec3, forward: Vec3, right: Vec3, distance: f32) -> [Vec3; 4] {
    [
        center + forward * distance,
        center - forward * distance,
        center - right * distance,
        center + right * distance,
    ]
}

fn footprint_height<G: Ground + ?Sized>(
    ground: &G,
    center: Vec3,
    forward: Vec3,
    right: Vec3,
    tuning: &TankTuning,
) -> f32 {
    footprint_offsets(center, forward, right, tuning.footprint_sample_distance)
        .iter()
        .map(|p| ground.height_at(p.x, p.z))
        .fold(ground.height_at(center.x, center.z), f32::max)
}

/// Non-finite and negative deltas count as no time passing.
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt >= 0.0 { dt } else { 0.0 }
}

/// Reference frames covered by a tick, after clamping the delta.
pub fn frame_scale(dt: f32, tuning: &TankTuning) -> f32 {
    dt.clamp(0.0, tuning.max_delta_time) * tuning.reference_frame_rate
}

fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::HeightGrid;
    use crate::sampler::HeightSampler;

    const FRAME: f32 = 1.0 / 60.0;

    struct Flat(f32);

    impl Ground for Flat {
        fn height_at(&self, _x: f32, _z: f32) -> f32 {
            self.0
        }
        fn world_size(&self) -> f32 {
            1000.0
        }
    }

    /// Ground that rises by `slope` per unit of x.
    struct Ramp(f32);

    impl Ground for Ramp {
        fn height_at(&self, x: f32, _z: f32) -> f32 {
            (x * self.0).max(0.0) + 100.0
        }
        fn world_size(&self) -> f32 {
            1000.0
        }
    }

    /// Flat ground with a wall of `height` for x > 0.
    struct Cliff(f32);

    impl Ground for Cliff {
        fn height_at(&self, x: f32, _z: f32) -> f32 {
            if x > 0.0 { self.0 } else { 0.0 }
        }
        fn world_size(&self) -> f32 {
            1000.0
        }
    }

    struct BrokenNormals;

    impl Ground for BrokenNormals {
        fn height_at(&self, _x: f32, _z: f32) -> f32 {
            1.0
        }
        fn world_size(&self) -> f32 {
            1000.0
        }
        fn normal_at(&self, x: f32, _z: f32) -> Vec3 {
            if x > 0.0 { Vec3::NAN } else { Vec3::ZERO }
        }
    }

    fn tuning_at(x: f32, z: f32) -> TankTuning {
        TankTuning { spawn_x: x, spawn_z: z, ..TankTuning::default() }
    }

    fn drive(tank: &mut Tank, ground: &impl Ground, controls: ControlSnapshot, ticks: usize) {
        let weapons = WeaponTable::default();
        for _ in 0..ticks {
            tank.advance(ground, &controls, &weapons, FRAME);
        }
    }

    #[test]
    fn spawns_on_the_ground() {
        let tank = Tank::spawn(&Flat(3.0), TankTuning::default());
        assert!(tank.pose().position.abs_diff_eq(Vec3::new(0.0, 3.1, 0.0), 1e-6));
        assert_eq!(tank.pose().orientation, Quat::IDENTITY);
    }

    #[test]
    fn idle_tank_does_not_drift() {
        let grid = HeightGrid::generate(&crate::config::TerrainConfig {
            world_size: 200.0,
            resolution: 65,
            max_height: 20.0,
            plateau_step: 0.0,
            ..Default::default()
        })
        .unwrap();
        let sampler = HeightSampler::new(&grid);
        let mut tank = Tank::spawn(&sampler, tuning_at(13.0, -21.0));
        let weapons = WeaponTable::default();
        let eps = tank.tuning().settle_epsilon;

        for _ in 0..300 {
            let before = tank.pose().position;
            let after =
                tank.advance(&sampler, &ControlSnapshot::idle(), &weapons, FRAME).pose.position;
            assert!((after - before).length() <= eps, "drifted {before:?} -> {after:?}");
        }
    }

    #[test]
    fn idle_tank_settles_onto_new_ground_without_drifting() {
        let weapons = WeaponTable::default();
        for (spawn_height, ground_height) in [(5.0, 3.0), (1.0, 1.6)] {
            let mut tank = Tank::spawn(&Flat(spawn_height), TankTuning::default());
            let ground = Flat(ground_height);
            let target = ground_height + tank.tuning().ground_clearance;
            let cap = tank.tuning().max_height_step + 1e-4;
            let start = tank.pose().position;
            let mut last_gap = (start.y - target).abs();
            assert!(last_gap > tank.tuning().settle_epsilon);

            for tick in 0..600 {
                let p =
                    tank.advance(&ground, &ControlSnapshot::idle(), &weapons, FRAME).pose.position;
                assert_eq!((p.x, p.z), (start.x, start.z), "tick {tick}: slid sideways");
                let gap = (p.y - target).abs();
                assert!(gap <= last_gap + 1e-6, "tick {tick}: moved away from the ground");
                assert!(last_gap - gap <= cap, "tick {tick}: stepped {}", last_gap - gap);
                last_gap = gap;
            }
            assert_eq!(tank.pose().position.y, target);

            let settled = tank.pose().position;
            drive(&mut tank, &ground, ControlSnapshot::idle(), 60);
            assert_eq!(tank.pose().position, settled);
        }
    }

    #[test]
    fn drives_along_heading() {
        let mut tank = Tank::spawn(&Flat(0.0), TankTuning::default());
        let forward = ControlSnapshot { forward: true, ..ControlSnapshot::idle() };
        drive(&mut tank, &Flat(0.0), forward, 10);
        let p = tank.pose().position;
        assert!((p.z - 1.0).abs() < 1e-4, "{p:?}");
        assert!(p.x.abs() < 1e-6);

        let right = ControlSnapshot { strafe_right: true, ..ControlSnapshot::idle() };
        drive(&mut tank, &Flat(0.0), right, 10);
        assert!((tank.pose().position.x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_turns_the_heading() {
        let mut tank = Tank::spawn(&Flat(0.0), TankTuning::default());
        let turn = ControlSnapshot { rotate_left: true, ..ControlSnapshot::idle() };
        drive(&mut tank, &Flat(0.0), turn, 50);
        assert!((tank.pose().yaw - 1.0).abs() < 1e-4);

        let turn = ControlSnapshot { rotate_right: true, ..ControlSnapshot::idle() };
        drive(&mut tank, &Flat(0.0), turn, 100);
        assert!((tank.pose().yaw + 1.0).abs() < 1e-4);
    }

    #[test]
    fn movement_is_frame_rate_independent() {
        let forward = ControlSnapshot { forward: true, ..ControlSnapshot::idle() };
        let weapons = WeaponTable::default();

        let mut coarse = Tank::spawn(&Flat(0.0), TankTuning::default());
        coarse.advance(&Flat(0.0), &forward, &weapons, 1.0 / 30.0);

        let mut fine = Tank::spawn(&Flat(0.0), TankTuning::default());
        for _ in 0..4 {
            fine.advance(&Flat(0.0), &forward, &weapons, 1.0 / 120.0);
        }

        assert!((coarse.pose().position.z - fine.pose().position.z).abs() < 1e-5);
    }

    #[test]
    fn long_stalls_are_clamped() {
        let mut tank = Tank::spawn(&Flat(0.0), TankTuning::default());
        let forward = ControlSnapshot { forward: true, ..ControlSnapshot::idle() };
        tank.advance(&Flat(0.0), &forward, &WeaponTable::default(), 30.0);
        let t = tank.tuning();
        let max = t.move_speed * t.max_delta_time * t.reference_frame_rate;
        assert!(tank.pose().position.z <= max + 1e-5);
    }

    #[test]
    fn invalid_deltas_freeze_the_tank() {
        let mut tank = Tank::spawn(&Flat(0.0), TankTuning::default());
        let forward = ControlSnapshot { forward: true, ..ControlSnapshot::idle() };
        let start = tank.pose();
        for dt in [-1.0, f32::NAN, f32::INFINITY] {
            tank.advance(&Flat(0.0), &forward, &WeaponTable::default(), dt);
        }
        assert_eq!(tank.pose(), start);
        assert_eq!(tank.clock(), 0.0);
    }

    #[test]
    fn cliff_is_climbed_in_capped_steps() {
        let cliff = Cliff(6.0);
        let mut tank = Tank::spawn(&cliff, tuning_at(-3.0, 0.0));
        let weapons = WeaponTable::default();
        let right = ControlSnapshot { strafe_right: true, ..ControlSnapshot::idle() };
        let normal_cap = tank.tuning().max_height_step;
        let recovery_cap = normal_cap * 0.5;
        let mut entered_recovery = false;

        for _ in 0..120 {
            let before = tank.pose().position.y;
            let was_recovering = tank.state().recovering;
            tank.advance(&cliff, &right, &weapons, FRAME);
            let dy = (tank.pose().position.y - before).abs();

            if tank.state().recovering {
                if !was_recovering {
                    entered_recovery = true;
                }
                assert!(dy <= recovery_cap + 1e-5, "recovery step {dy}");
            }
            assert!(dy <= normal_cap + 1e-5, "step {dy}");
        }

        assert!(entered_recovery);
        assert!((tank.pose().position.y - 6.1).abs() < 1e-3);
    }

    #[test]
    fn recovery_needs_a_stable_window() {
        let cliff = Cliff(6.0);
        // The right-hand footprint sample crosses the wall on the first tick.
        let mut tank = Tank::spawn(&cliff, tuning_at(-1.55, 0.0));
        let right = ControlSnapshot { strafe_right: true, ..ControlSnapshot::idle() };
        drive(&mut tank, &cliff, right, 1);
        assert!(tank.state().recovering);

        let window = tank.tuning().recovery_ticks as usize;
        drive(&mut tank, &cliff, ControlSnapshot::idle(), window - 1);
        assert!(tank.state().recovering);
        drive(&mut tank, &cliff, ControlSnapshot::idle(), 1);
        assert!(!tank.state().recovering);
    }

    #[test]
    fn aligns_with_gentle_slopes() {
        let ramp = Ramp(0.3);
        let mut tank = Tank::spawn(&ramp, tuning_at(10.0, 0.0));
        drive(&mut tank, &ramp, ControlSnapshot::idle(), 200);
        let up = tank.pose().orientation * Vec3::Y;
        let expected = Vec3::new(-0.3, 1.0, 0.0).normalize();
        assert!(up.abs_diff_eq(expected, 1e-3), "{up:?}");
    }

    #[test]
    fn stays_level_on_steep_slopes() {
        let ramp = Ramp(3.0);
        let mut tank = Tank::spawn(&ramp, tuning_at(10.0, 0.0));
        let turn = ControlSnapshot { rotate_left: true, ..ControlSnapshot::idle() };
        drive(&mut tank, &ramp, turn, 30);
        let pose = tank.pose();
        assert!(pose.orientation.abs_diff_eq(Quat::from_rotation_y(pose.yaw), 1e-5));
    }

    #[test]
    fn degenerate_normals_fall_back_to_up() {
        let mut tank = Tank::spawn(&BrokenNormals, TankTuning::default());
        let right = ControlSnapshot { strafe_right: true, ..ControlSnapshot::idle() };
        drive(&mut tank, &BrokenNormals, right, 20);
        let pose = tank.pose();
        assert!(pose.orientation.is_finite());
        assert!(pose.position.is_finite());
        assert_eq!(tank.state().prev_normal, Vec3::Y);
    }

    #[test]
    fn fire_respects_cooldown() {
        let mut tank = Tank::spawn(&Flat(0.0), TankTuning::default());
        let weapons = WeaponTable::default();
        let fire = ControlSnapshot { fire: true, ..ControlSnapshot::idle() };
        let idle = ControlSnapshot::idle();

        assert!(tank.advance(&Flat(0.0), &fire, &weapons, FRAME).shot.is_some());
        for _ in 0..5 {
            tank.advance(&Flat(0.0), &idle, &weapons, 0.02);
        }
        assert!(tank.advance(&Flat(0.0), &fire, &weapons, FRAME).shot.is_none());
        for _ in 0..20 {
            tank.advance(&Flat(0.0), &idle, &weapons, 0.02);
        }
        assert!(tank.advance(&Flat(0.0), &fire, &weapons, FRAME).shot.is_some());
    }

    #[test]
    fn machine_gun_fires_faster() {
        let mut tank = Tank::spawn(&Flat(0.0), TankTuning::default());
        let weapons = WeaponTable::default();
        let fire = ControlSnapshot {
            fire: true,
            weapon: WeaponMode::MachineGun,
            ..ControlSnapshot::idle()
        };
        let shots = (0..60)
            .filter(|_| tank.advance(&Flat(0.0), &fire, &weapons, FRAME).shot.is_some())
            .count();
        // One second at a 0.1s cooldown.
        assert!((9..=11).contains(&shots), "{shots} shots");
    }

    #[test]
    fn shot_leaves_the_muzzle_along_the_heading() {
        let mut tank = Tank::spawn(&Flat(0.0), TankTuning::default());
        let fire = ControlSnapshot { fire: true, ..ControlSnapshot::idle() };
        let update = tank.advance(&Flat(0.0), &fire, &WeaponTable::default(), FRAME);
        let shot = update.shot.unwrap();
        assert!(shot.direction.abs_diff_eq(Vec3::Z, 1e-6));
        let expected = update.pose.position + Vec3::new(0.0, 1.25, 3.3);
        assert!(shot.position.abs_diff_eq(expected, 1e-5));
        assert_eq!(shot.weapon, WeaponMode::Cannon);
    }

    #[test]
    fn returns_to_spawn_after_leaving_the_terrain() {
        let grid = HeightGrid::flat(5, 20.0, 1.0).unwrap();
        let sampler = HeightSampler::new(&grid);
        let mut tank = Tank::spawn(&sampler, tuning_at(9.5, 0.0));
        let weapons = WeaponTable::default();
        let right = ControlSnapshot { strafe_right: true, ..ControlSnapshot::idle() };

        let mut reset_seen = false;
        for _ in 0..60 * 5 {
            let update = tank.advance(&sampler, &right, &weapons, FRAME);
            if update.reset {
                reset_seen = true;
                assert_eq!(update.pose.position.x, 9.5);
                break;
            }
        }
        assert!(reset_seen);
    }

    #[test]
    fn zone_watch_times_out_once() {
        let mut watch = ZoneWatch::new(2.0);
        assert!(!watch.update(0.0, true));
        assert_eq!(watch.entered_at(), Some(0.0));
        assert!(!watch.update(1.9, true));
        assert!(watch.update(2.0, true));
        assert_eq!(watch.entered_at(), None);

        assert!(!watch.update(3.0, true));
        assert!(!watch.update(4.0, false));
        assert!(!watch.update(5.5, true));
        assert!(!watch.update(7.0, true));
    }

    #[test]
    fn angles_wrap() {
        let wrapped = wrap_angle(3.0 * PI);
        assert!((wrapped - PI).abs() < 1e-5 || (wrapped + PI).abs() < 1e-5);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(-0.5 - TAU) + 0.5).abs() < 1e-5);
    }
}
