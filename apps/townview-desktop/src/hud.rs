use crate::keymap;
use egui::Context as EguiContext;
use townview_viewer::AppState;

/// Read-only overlay: camera pose, lens and bindings.
pub fn draw(ctx: &EguiContext, state: &AppState, show: bool) {
    if !show {
        return;
    }

    let camera = state.camera();
    let position = camera.position();
    let viewport = state.viewport();

    egui::Window::new("Townview")
        .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            ui.label(format!(
                "Position: ({:.2}, {:.2}, {:.2})",
                position.x, position.y, position.z
            ));
            ui.label(format!(
                "Yaw: {:.1}  Pitch: {:.1}",
                camera.yaw(),
                camera.pitch()
            ));
            ui.label(format!("Zoom: {:.1} deg", camera.zoom()));
            ui.label(format!("Projection: {}", state.projection()));
            ui.label(format!(
                "Viewport: {}x{}  Objects: {}",
                viewport.width,
                viewport.height,
                state.objects().len()
            ));
            ui.separator();
            ui.small(keymap::HELP);
            ui.small("F1: toggle this panel");
        });
}
