use tankfield::camera::ChaseCamera;
use tankfield::input::{ControlSnapshot, WeaponMode};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keyboard and mouse state collected between frames.
#[derive(Default)]
pub struct Controls {
    held: ControlSnapshot,
    weapon: WeaponMode,

    orbit_left: bool,
    orbit_right: bool,
    orbit_up: bool,
    orbit_down: bool,
    is_middle_mouse_pressed: bool,

    orbit_speed: f32,
    mouse_sensitivity: f32,

    mouse_delta_x: f32,
    mouse_delta_y: f32,
    zoom_delta: f32,
}

impl Controls {
    pub fn new(orbit_speed: f32, mouse_sensitivity: f32) -> Self {
        Self {
            orbit_speed,
            mouse_sensitivity,
            ..Default::default()
        }
    }

    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => match key_event.physical_key {
                PhysicalKey::Code(code) => {
                    self.key(code, key_event.state == ElementState::Pressed, key_event.repeat)
                }
                PhysicalKey::Unidentified(_) => false,
            },
            WindowEvent::MouseWheel { delta, .. } => {
                self.zoom_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => -*y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * -0.1,
                };
                true
            }
            WindowEvent::MouseInput { state, button: MouseButton::Middle, .. } => {
                self.is_middle_mouse_pressed = *state == ElementState::Pressed;
                true
            }
            WindowEvent::Focused(false) => {
                // Keys released while unfocused never arrive.
                *self = Self {
                    weapon: self.weapon,
                    ..Self::new(self.orbit_speed, self.mouse_sensitivity)
                };
                false
            }
            _ => false,
        }
    }

    /// Returns whether `code` is bound.
    pub fn key(&mut self, code: KeyCode, pressed: bool, repeat: bool) -> bool {
        let slot = match code {
            KeyCode::KeyW => &mut self.held.forward,
            KeyCode::KeyS => &mut self.held.backward,
            KeyCode::KeyA => &mut self.held.strafe_left,
            KeyCode::KeyD => &mut self.held.strafe_right,
            KeyCode::KeyQ => &mut self.held.rotate_left,
            KeyCode::KeyE => &mut self.held.rotate_right,
            KeyCode::Space => &mut self.held.fire,
            KeyCode::ArrowLeft => &mut self.orbit_left,
            KeyCode::ArrowRight => &mut self.orbit_right,
            KeyCode::ArrowUp => &mut self.orbit_up,
            KeyCode::ArrowDown => &mut self.orbit_down,
            KeyCode::KeyF => {
                if pressed && !repeat {
                    self.weapon = self.weapon.toggled();
                    log::info!("weapon switched to {:?}", self.weapon);
                }
                return true;
            }
            _ => return false,
        };
        *slot = pressed;
        true
    }

    pub fn process_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        self.mouse_delta_x += delta_x as f32;
        self.mouse_delta_y += delta_y as f32;
    }

    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot { weapon: self.weapon, ..self.held }
    }

    /// Applies accumulated orbit and zoom, then clears the accumulators.
    /// `scale` is the number of reference frames covered.
    pub fn update_camera(&mut self, camera: &mut ChaseCamera, scale: f32) {
        let zoom_sensitivity = 0.5;
        let step = self.orbit_speed * scale;

        let mut yaw = 0.0;
        let mut pitch = 0.0;
        if self.orbit_left {
            yaw -= step;
        }
        if self.orbit_right {
            yaw += step;
        }
        if self.orbit_up {
            pitch += step;
        }
        if self.orbit_down {
            pitch -= step;
        }
        if self.is_middle_mouse_pressed {
            yaw += self.mouse_delta_x * self.mouse_sensitivity;
            pitch -= self.mouse_delta_y * self.mouse_sensitivity;
        }
        camera.orbit(yaw, pitch);
        camera.zoom(self.zoom_delta * zoom_sensitivity);

        self.zoom_delta = 0.0;
        self.mouse_delta_x = 0.0;
        self.mouse_delta_y = 0.0;
    }
}
