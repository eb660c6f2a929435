use egui::{Color32, Context, RichText};

use crate::ui::{UiComponent, UiContext, UiEvent};

#[derive(Default)]
pub struct SidePanel;

impl UiComponent for SidePanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext<'_>) {
        egui::SidePanel::left("side_panel")
            .default_width(320.0)
            .show(ctx, |ui| {
                ui.heading("PARAMETERS");
                ui.separator();

                for (key, param) in ui_ctx.session.parameters().iter() {
                    ui.label(RichText::new(&param.label).strong());
                    ui.horizontal(|ui| {
                        let mut value = param.value;

                        // The slider keeps to the range, typed values are taken as-is.
                        let slider = ui.add(
                            egui::Slider::new(&mut value, param.min..=param.max)
                                .step_by(param.step)
                                .clamping(egui::SliderClamping::Edits)
                                .show_value(false),
                        );
                        let field = ui.add(egui::DragValue::new(&mut value).speed(param.step));

                        if (slider.changed() || field.changed()) && value != param.value {
                            ui_ctx.send_event(UiEvent::SetParameter {
                                key: key.to_string(),
                                value,
                            });
                        }
                    });
                    ui.add_space(4.0);
                }

                ui.separator();
                ui.heading("LOGS");
                ui.separator();

                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for entry in ui_ctx.session.log().entries() {
                            ui.horizontal_wrapped(|ui| {
                                ui.label(
                                    RichText::new(format!("{}:", entry.time_label()))
                                        .monospace()
                                        .color(Color32::GRAY),
                                );
                                ui.label(&entry.message);
                            });
                        }
                    });
            });
    }
}
