use glam::Vec3;

use crate::config::{GameConfig, TankTuning, WeaponTable};
use crate::error::ConfigResult;
use crate::heightfield::Terrain;
use crate::input::ControlSnapshot;
use crate::projectile::{Projectile, ProjectileEvent, ProjectileId, ProjectileSet, RemovalReason};
use crate::sampler::HeightSampler;
use crate::tank::{frame_scale, sanitize_dt, Tank, TankPose};

/// Receives what happened during a tick. Every method defaults to a no-op.
pub trait SimObserver {
    fn tank_moved(&mut self, _pose: &TankPose) {}

    fn tank_reset(&mut self, _pose: &TankPose) {}

    fn projectile_fired(&mut self, _projectile: &Projectile) {}

    fn projectile_impact(&mut self, _id: ProjectileId, _position: Vec3) {}

    fn projectile_removed(&mut self, _id: ProjectileId, _reason: RemovalReason) {}
}

impl SimObserver for () {}

/// Owns the terrain and everything that moves over it.
#[derive(Debug, Clone)]
pub struct Simulation {
    terrain: Terrain,
    tank: Tank,
    projectiles: ProjectileSet,
    weapons: WeaponTable,
    ticks: u64,
}

impl Simulation {
    pub fn new(config: &GameConfig) -> ConfigResult<Self> {
        config.validate()?;
        let terrain = Terrain::generate(&config.terrain)?;
        Ok(Self::with_terrain(terrain, config.tank.clone(), config.weapons))
    }

    pub fn with_terrain(terrain: Terrain, tuning: TankTuning, weapons: WeaponTable) -> Self {
        let tank = Tank::spawn(&terrain.sampler(), tuning);
        Self {
            terrain,
            tank,
            projectiles: ProjectileSet::new(),
            weapons,
            ticks: 0,
        }
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn sampler(&self) -> HeightSampler<'_> {
        self.terrain.sampler()
    }

    pub fn tank(&self) -> &Tank {
        &self.tank
    }

    pub fn projectiles(&self) -> &ProjectileSet {
        &self.projectiles
    }

    pub fn weapons(&self) -> &WeaponTable {
        &self.weapons
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs one tick: the tank first, then every projectile already in
    /// flight, then any shell fired this tick joins the active set.
    pub fn advance<O>(&mut self, controls: &ControlSnapshot, dt: f32, observer: &mut O) -> TankPose
    where
        O: SimObserver + ?Sized,
    {
        if sanitize_dt(dt) != dt {
            log::warn!("tick {} got invalid delta {dt}, treating it as zero", self.ticks);
        }
        self.ticks += 1;

        let sampler = self.terrain.sampler();
        let update = self.tank.advance(&sampler, controls, &self.weapons, dt);
        if update.reset {
            observer.tank_reset(&update.pose);
        }
        observer.tank_moved(&update.pose);

        let dt = sanitize_dt(dt);
        let scale = frame_scale(dt, self.tank.tuning());
        self.projectiles.advance(&sampler, dt, scale, |event| match event {
            ProjectileEvent::Impact { id, position } => observer.projectile_impact(id, position),
            ProjectileEvent::Removed { id, reason } => observer.projectile_removed(id, reason),
        });

        if let Some(shot) = update.shot {
            let id = self.projectiles.spawn(&shot, shot.weapon.spec(&self.weapons));
            if let Some(projectile) = self.projectiles.get(id) {
                observer.projectile_fired(projectile);
            }
        }

        log::trace!("tick {} pose {:?}", self.ticks, update.pose.position);
        update.pose
    }
}
