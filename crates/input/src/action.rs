use std::fmt;
use std::str::FromStr;
use townview_camera::CameraMovement;

/// A high-level action produced by a key binding.
///
/// The viewer consumes actions, never raw platform key codes, so the desktop
/// app and scripted headless runs drive the camera through the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move the camera while the key is held.
    Move(CameraMovement),
    /// Switch between perspective and orthographic projection.
    ToggleProjection,
    /// Close the viewer.
    Exit,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown action: {0:?}")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "w" => Self::Move(CameraMovement::Forward),
            "backward" | "s" => Self::Move(CameraMovement::Backward),
            "left" | "a" => Self::Move(CameraMovement::Left),
            "right" | "d" => Self::Move(CameraMovement::Right),
            "up" | "q" => Self::Move(CameraMovement::Up),
            "down" | "e" => Self::Move(CameraMovement::Down),
            "toggle-projection" | "p" => Self::ToggleProjection,
            "exit" | "escape" => Self::Exit,
            other => return Err(ParseActionError(other.to_string())),
        };
        Ok(action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(CameraMovement::Forward) => f.write_str("forward"),
            Self::Move(CameraMovement::Backward) => f.write_str("backward"),
            Self::Move(CameraMovement::Left) => f.write_str("left"),
            Self::Move(CameraMovement::Right) => f.write_str("right"),
            Self::Move(CameraMovement::Up) => f.write_str("up"),
            Self::Move(CameraMovement::Down) => f.write_str("down"),
            Self::ToggleProjection => f.write_str("toggle-projection"),
            Self::Exit => f.write_str("exit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_key_letters() {
        assert_eq!(
            "forward".parse::<Action>().unwrap(),
            Action::Move(CameraMovement::Forward)
        );
        assert_eq!("Q".parse::<Action>().unwrap(), Action::Move(CameraMovement::Up));
        assert_eq!("p".parse::<Action>().unwrap(), Action::ToggleProjection);
        assert_eq!(" Escape ".parse::<Action>().unwrap(), Action::Exit);
    }

    #[test]
    fn display_parses_back() {
        for action in [
            Action::Move(CameraMovement::Left),
            Action::Move(CameraMovement::Down),
            Action::ToggleProjection,
            Action::Exit,
        ] {
            assert_eq!(action.to_string().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn rejects_unknown() {
        let err = "jump".parse::<Action>().unwrap_err();
        assert_eq!(err.to_string(), "unknown action: \"jump\"");
    }
}
