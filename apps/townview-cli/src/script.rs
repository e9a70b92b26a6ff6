use anyhow::{Context, Result, bail};
use townview_input::{Action, InputState};

/// One scripted input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptEvent {
    Press(Action),
    Release(Action),
    /// Press and release before the frame runs.
    Tap(Action),
    Cursor { x: f32, y: f32 },
    Scroll(f32),
    FocusLost,
}

/// An event delivered just before frame `frame` runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptStep {
    pub frame: u32,
    pub event: ScriptEvent,
}

/// Parse a `;`-separated list of `FRAME:EVENT` steps.
///
/// Events: `+KEY` press, `-KEY` release, `KEY` tap, `cursor=X,Y`,
/// `scroll=Y`, `focus-lost`. KEY is an action name or its key letter.
pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for raw in text.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (frame, event) = raw
            .split_once(':')
            .with_context(|| format!("step {raw:?} is missing a frame number"))?;
        let frame: u32 = frame
            .trim()
            .parse()
            .with_context(|| format!("bad frame number in {raw:?}"))?;
        steps.push(ScriptStep {
            frame,
            event: parse_event(event.trim())?,
        });
    }
    steps.sort_by_key(|step| step.frame);
    Ok(steps)
}

fn parse_event(text: &str) -> Result<ScriptEvent> {
    if text == "focus-lost" {
        return Ok(ScriptEvent::FocusLost);
    }
    if let Some(coords) = text.strip_prefix("cursor=") {
        let Some((x, y)) = coords.split_once(',') else {
            bail!("cursor needs X,Y: {text:?}");
        };
        return Ok(ScriptEvent::Cursor {
            x: x.trim().parse().context("cursor x")?,
            y: y.trim().parse().context("cursor y")?,
        });
    }
    if let Some(amount) = text.strip_prefix("scroll=") {
        return Ok(ScriptEvent::Scroll(amount.trim().parse().context("scroll amount")?));
    }
    if let Some(key) = text.strip_prefix('+') {
        return Ok(ScriptEvent::Press(key.parse()?));
    }
    if let Some(key) = text.strip_prefix('-') {
        return Ok(ScriptEvent::Release(key.parse()?));
    }
    Ok(ScriptEvent::Tap(text.parse()?))
}

/// Feed every step scheduled for `frame` into `input`, in script order.
pub fn deliver(steps: &[ScriptStep], frame: u32, input: &mut InputState) {
    for step in steps.iter().filter(|step| step.frame == frame) {
        match step.event {
            ScriptEvent::Press(action) => input.handle_action(action, true),
            ScriptEvent::Release(action) => input.handle_action(action, false),
            ScriptEvent::Tap(action) => {
                input.handle_action(action, true);
                input.handle_action(action, false);
            }
            ScriptEvent::Cursor { x, y } => input.cursor_moved(x, y),
            ScriptEvent::Scroll(y) => input.scrolled(y),
            ScriptEvent::FocusLost => input.focus_lost(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use townview_camera::{Camera, CameraMovement};

    #[test]
    fn parses_every_event_kind() {
        let steps =
            parse_script("0:+w; 0:cursor=400,300; 1:scroll=-2; 2:p; 3:-forward; 4:focus-lost")
                .unwrap();
        let events: Vec<_> = steps.iter().map(|s| s.event).collect();
        assert_eq!(
            events,
            [
                ScriptEvent::Press(Action::Move(CameraMovement::Forward)),
                ScriptEvent::Cursor { x: 400.0, y: 300.0 },
                ScriptEvent::Scroll(-2.0),
                ScriptEvent::Tap(Action::ToggleProjection),
                ScriptEvent::Release(Action::Move(CameraMovement::Forward)),
                ScriptEvent::FocusLost,
            ]
        );
    }

    #[test]
    fn steps_are_ordered_by_frame_stably() {
        let steps = parse_script("2:+a;0:+w;2:-a").unwrap();
        let frames: Vec<_> = steps.iter().map(|s| s.frame).collect();
        assert_eq!(frames, [0, 2, 2]);
        assert_eq!(
            steps[1].event,
            ScriptEvent::Press(Action::Move(CameraMovement::Left))
        );
    }

    #[test]
    fn empty_script_is_empty() {
        assert!(parse_script("").unwrap().is_empty());
        assert!(parse_script(" ; ").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_steps() {
        assert!(parse_script("w").is_err());
        assert!(parse_script("x:w").is_err());
        assert!(parse_script("0:jump").is_err());
        assert!(parse_script("0:cursor=10").is_err());
        assert!(parse_script("0:scroll=lots").is_err());
    }

    #[test]
    fn delivers_only_the_requested_frame() {
        let steps = parse_script("0:cursor=100,100;1:cursor=110,100").unwrap();
        let mut input = InputState::new();
        let mut camera = Camera::default();

        deliver(&steps, 0, &mut input);
        input.apply(&mut camera, 0.0);
        assert_eq!(camera.yaw(), -90.0);

        deliver(&steps, 1, &mut input);
        input.apply(&mut camera, 0.0);
        assert!((camera.yaw() - (-89.0)).abs() < 1e-4);
    }
}
