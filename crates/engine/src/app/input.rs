use winit::event::ElementState;
use winit::keyboard::PhysicalKey;

pub use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPhase {
    Down,
    Up,
}

/// A discrete key transition as seen by scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputEvent {
    pub code: KeyCode,
    pub phase: KeyPhase,
}

impl InputEvent {
    pub const fn down(code: KeyCode) -> Self {
        Self {
            code,
            phase: KeyPhase::Down,
        }
    }

    pub const fn up(code: KeyCode) -> Self {
        Self {
            code,
            phase: KeyPhase::Up,
        }
    }
}

/// Buffers window key events between frames; the loop drains it once at the
/// start of every frame.
#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    quit_requested: bool,
    pending: Vec<InputEvent>,
}

impl InputCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    /// OS key repeat arrives as further presses, so a held key keeps
    /// dispatching its command.
    pub(crate) fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        self.handle_physical_key(key_event.physical_key, key_event.state);
    }

    pub(crate) fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        if code == KeyCode::Escape && state == ElementState::Pressed {
            self.mark_quit_requested();
            return;
        }
        let phase = match state {
            ElementState::Pressed => KeyPhase::Down,
            ElementState::Released => KeyPhase::Up,
        };
        self.pending.push(InputEvent { code, phase });
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, event: InputEvent) {
        self.pending.push(event);
    }

    pub(crate) fn drain(&mut self) -> DrainedInput {
        DrainedInput {
            events: std::mem::take(&mut self.pending),
            quit_requested: std::mem::take(&mut self.quit_requested),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct DrainedInput {
    pub(crate) events: Vec<InputEvent>,
    pub(crate) quit_requested: bool,
}
