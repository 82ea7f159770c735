use crate::params::{ColorParam, IrisParams, Rgb, ScalarParam, PANEL_STEP};

/// Side panel bound to the iris parameters through their get/set adapters.
///
/// `shrink_readout` is the latest value pushed by a running animation; it is
/// shown read-only next to the editable slider.
pub fn iris_control_panel(ctx: &egui::Context, params: &mut IrisParams, shrink_readout: f32) {
    egui::SidePanel::right("iris_controls")
        .default_width(280.0)
        .show(ctx, |ui| {
            ui.heading("Iris");
            ui.separator();

            for param in ScalarParam::ALL {
                let mut value = param.get(params);
                let slider = egui::Slider::new(&mut value, param.range())
                    .step_by(PANEL_STEP as f64)
                    .text(param.label());
                if ui.add(slider).changed() {
                    param.set(params, value);
                }
            }

            ui.horizontal(|ui| {
                ui.label("Animated shrink");
                let mut live = shrink_readout;
                ui.add_enabled(false, egui::DragValue::new(&mut live).speed(0.0));
            });

            ui.separator();

            egui::CollapsingHeader::new("Colors")
                .default_open(true)
                .show(ui, |ui| {
                    for param in ColorParam::ALL {
                        ui.horizontal(|ui| {
                            ui.label(param.label());
                            let mut color = param.get(params);
                            if color_edit_rgb(ui, &mut color) {
                                param.set(params, color);
                            }
                        });
                    }
                    ui.checkbox(&mut params.cat_eye, "Cat eye");
                });

            ui.separator();

            if ui.button("Reset").clicked() {
                *params = IrisParams::default();
            }
        });
}

fn color_edit_rgb(ui: &mut egui::Ui, color: &mut Rgb) -> bool {
    let [r, g, b] = color.to_rgb8();
    let mut rgba = egui::Color32::from_rgb(r, g, b);
    if ui.color_edit_button_srgba(&mut rgba).changed() {
        *color = Rgb::from_rgb8([rgba.r(), rgba.g(), rgba.b()]);
        return true;
    }
    false
}
