//! Key bindings for the discrete movement commands.

use winit::keyboard::KeyCode;

use crate::config::MovementConfig;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StepForward,
    StepBackward,
    /// Counter-clockwise on screen (heading decreases).
    TurnLeft,
    /// Clockwise on screen (heading increases).
    TurnRight,
}

impl Command {
    /// W/S move, A/D turn. Other keys map to nothing.
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::KeyW => Some(Self::StepForward),
            KeyCode::KeyS => Some(Self::StepBackward),
            KeyCode::KeyA => Some(Self::TurnLeft),
            KeyCode::KeyD => Some(Self::TurnRight),
            _ => None,
        }
    }

    pub fn apply(self, player: &mut Player, movement: &MovementConfig) {
        match self {
            Self::StepForward => player.step_forward(movement.step_len),
            Self::StepBackward => player.step_backward(movement.step_len),
            Self::TurnLeft => player.turn(-movement.turn_step()),
            Self::TurnRight => player.turn(movement.turn_step()),
        }
    }
}
