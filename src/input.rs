use crate::config::{WeaponSpec, WeaponTable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WeaponMode {
    #[default]
    Cannon,
    MachineGun,
}

impl WeaponMode {
    pub fn toggled(self) -> Self {
        match self {
            WeaponMode::Cannon => WeaponMode::MachineGun,
            WeaponMode::MachineGun => WeaponMode::Cannon,
        }
    }

    pub fn spec(self, table: &WeaponTable) -> &WeaponSpec {
        match self {
            WeaponMode::Cannon => &table.cannon,
            WeaponMode::MachineGun => &table.machine_gun,
        }
    }
}

/// Intents held during one tick. Every flag is independent; opposing flags
/// cancel out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlSnapshot {
    pub forward: bool,
    pub backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub fire: bool,
    pub weapon: WeaponMode,
}

impl ControlSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    /// `+1` forward, `-1` backward.
    pub fn drive_axis(&self) -> f32 {
        axis(self.forward, self.backward)
    }

    /// `+1` right, `-1` left.
    pub fn strafe_axis(&self) -> f32 {
        axis(self.strafe_right, self.strafe_left)
    }

    /// `+1` counter-clockwise seen from above (yaw increases).
    pub fn turn_axis(&self) -> f32 {
        axis(self.rotate_left, self.rotate_right)
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_intents_cancel() {
        let controls = ControlSnapshot {
            forward: true,
            backward: true,
            strafe_left: true,
            rotate_right: true,
            ..ControlSnapshot::idle()
        };
        assert_eq!(controls.drive_axis(), 0.0);
        assert_eq!(controls.strafe_axis(), -1.0);
        assert_eq!(controls.turn_axis(), -1.0);
    }

    #[test]
    fn weapon_toggle_round_trips() {
        assert_eq!(WeaponMode::Cannon.toggled(), WeaponMode::MachineGun);
        assert_eq!(WeaponMode::Cannon.toggled().toggled(), WeaponMode::Cannon);
    }

    #[test]
    fn weapon_spec_lookup() {
        let table = WeaponTable::default();
        assert_eq!(WeaponMode::MachineGun.spec(&table), &table.machine_gun);
    }
}
