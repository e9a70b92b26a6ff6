use townview_camera::CameraMovement;
use townview_input::Action;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::KeyCode;

/// Physical key bindings. Unbound keys return `None`.
pub fn action_for_key(key: KeyCode) -> Option<Action> {
    let action = match key {
        KeyCode::KeyW => Action::Move(CameraMovement::Forward),
        KeyCode::KeyS => Action::Move(CameraMovement::Backward),
        KeyCode::KeyA => Action::Move(CameraMovement::Left),
        KeyCode::KeyD => Action::Move(CameraMovement::Right),
        KeyCode::KeyQ => Action::Move(CameraMovement::Up),
        KeyCode::KeyE => Action::Move(CameraMovement::Down),
        KeyCode::KeyP => Action::ToggleProjection,
        KeyCode::Escape => Action::Exit,
        _ => return None,
    };
    Some(action)
}

/// Key releases reach input even when the overlay consumed the event, so a
/// key pressed before the overlay took focus is never left held.
pub fn is_key_release(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Released
    )
}

/// One-line binding summary for the HUD.
pub const HELP: &str = "WASD: move | Q/E: up/down | Mouse: look | Wheel: zoom | P: projection | Esc: quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_bind_all_six_directions() {
        let bound: Vec<_> = [
            KeyCode::KeyW,
            KeyCode::KeyS,
            KeyCode::KeyA,
            KeyCode::KeyD,
            KeyCode::KeyQ,
            KeyCode::KeyE,
        ]
        .into_iter()
        .filter_map(action_for_key)
        .collect();
        assert_eq!(
            bound,
            [
                Action::Move(CameraMovement::Forward),
                Action::Move(CameraMovement::Backward),
                Action::Move(CameraMovement::Left),
                Action::Move(CameraMovement::Right),
                Action::Move(CameraMovement::Up),
                Action::Move(CameraMovement::Down),
            ]
        );
    }

    #[test]
    fn bindings_match_action_key_letters() {
        for (key, letter) in [
            (KeyCode::KeyW, "w"),
            (KeyCode::KeyQ, "q"),
            (KeyCode::KeyE, "e"),
            (KeyCode::KeyP, "p"),
            (KeyCode::Escape, "escape"),
        ] {
            assert_eq!(action_for_key(key), letter.parse().ok());
        }
    }

    #[test]
    fn only_keyboard_releases_pass_the_overlay() {
        assert!(!is_key_release(&WindowEvent::Focused(true)));
        assert!(!is_key_release(&WindowEvent::Focused(false)));
        assert!(!is_key_release(&WindowEvent::CloseRequested));
    }

    #[test]
    fn other_keys_are_unbound() {
        assert_eq!(action_for_key(KeyCode::KeyZ), None);
        assert_eq!(action_for_key(KeyCode::Space), None);
    }
}
