use glam::Vec3;

use crate::config::WeaponSpec;
use crate::input::WeaponMode;
use crate::sampler::Ground;
use crate::tank::ShotRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// Lifetime ran out before (or while) anything else happened.
    Expired,
    /// The impact animation finished.
    Exploded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileEvent {
    Impact { id: ProjectileId, position: Vec3 },
    Removed { id: ProjectileId, reason: RemovalReason },
}

/// Outcome of one projectile tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProjectileStep {
    pub impact: Option<Vec3>,
    /// Set on the first tick a removal becomes due, never again afterwards.
    pub removal: Option<RemovalReason>,
}

/// A straight-flying shell. No gravity, no drag.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    id: ProjectileId,
    position: Vec3,
    direction: Vec3,
    speed: f32,
    weapon: WeaponMode,
    age: f32,
    lifetime: f32,
    explosion_duration: f32,
    exploded_at: Option<f32>,
    removal_requested: bool,
}

impl Projectile {
    pub fn new(id: ProjectileId, shot: &ShotRequest, spec: &WeaponSpec) -> Self {
        Self {
            id,
            position: shot.position,
            direction: shot.direction.normalize_or_zero(),
            speed: spec.speed,
            weapon: shot.weapon,
            age: 0.0,
            lifetime: spec.lifetime,
            explosion_duration: spec.explosion_duration,
            exploded_at: None,
            removal_requested: false,
        }
    }

    pub fn id(&self) -> ProjectileId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn weapon(&self) -> WeaponMode {
        self.weapon
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn is_exploding(&self) -> bool {
        self.exploded_at.is_some()
    }

    /// Seconds since impact, if it has hit the ground.
    pub fn explosion_age(&self) -> Option<f32> {
        self.exploded_at.map(|at| self.age - at)
    }

    /// Moves `speed * scale` along the direction, then checks the ground.
    /// `dt` drives lifetime and explosion timers; `scale` is the number of
    /// reference frames the tick covers.
    pub fn advance<G: Ground + ?Sized>(
        &mut self,
        ground: &G,
        dt: f32,
        scale: f32,
    ) -> ProjectileStep {
        self.age += dt;
        let mut step = ProjectileStep::default();

        if self.exploded_at.is_none() {
            self.position += self.direction * self.speed * scale;
            let floor = ground.height_at(self.position.x, self.position.z);
            if self.position.y <= floor {
                self.position.y = floor;
                self.exploded_at = Some(self.age);
                step.impact = Some(self.position);
            }
        }

        let due = match self.explosion_age() {
            Some(since) if since >= self.explosion_duration => Some(RemovalReason::Exploded),
            _ if self.age >= self.lifetime => Some(RemovalReason::Expired),
            _ => None,
        };
        if due.is_some() && !self.removal_requested {
            self.removal_requested = true;
            step.removal = due;
        }
        step
    }
}

/// Active projectiles keyed by monotonically increasing ids.
#[derive(Debug, Clone, Default)]
pub struct ProjectileSet {
    next_id: u64,
    active: Vec<Projectile>,
    pending_removal: Vec<(ProjectileId, RemovalReason)>,
}

impl ProjectileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, shot: &ShotRequest, spec: &WeaponSpec) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;
        self.active.push(Projectile::new(id, shot, spec));
        id
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.active.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.active.iter()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Removes `id` if it is still active. Repeated calls are harmless and
    /// return false.
    pub fn remove(&mut self, id: ProjectileId) -> bool {
        match self.active.iter().position(|p| p.id == id) {
            Some(index) => {
                self.active.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub fn advance<G, F>(&mut self, ground: &G, dt: f32, scale: f32, mut emit: F)
    where
        G: Ground + ?Sized,
        F: FnMut(ProjectileEvent),
    {
        self.pending_removal.clear();
        for projectile in &mut self.active {
            let step = projectile.advance(ground, dt, scale);
            if let Some(position) = step.impact {
                log::debug!("projectile {} hit the ground at {position:?}", projectile.id.0);
                emit(ProjectileEvent::Impact { id: projectile.id, position });
            }
            if let Some(reason) = step.removal {
                self.pending_removal.push((projectile.id, reason));
            }
        }

        let mut pending = std::mem::take(&mut self.pending_removal);
        for (id, reason) in pending.drain(..) {
            if self.remove(id) {
                log::debug!("projectile {} removed ({reason:?})", id.0);
                emit(ProjectileEvent::Removed { id, reason });
            }
        }
        self.pending_removal = pending;
    }
}
