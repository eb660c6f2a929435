use egui::{Color32, Context, RichText};

use crate::ui::{UiComponent, UiContext};

#[derive(Default)]
pub struct TopPanel;

impl UiComponent for TopPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext<'_>) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("edgedrop");
                ui.separator();

                if let Some(greeting) = &ui_ctx.page.greeting {
                    ui.label(greeting);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(username) = &ui_ctx.page.username {
                        ui.label(RichText::new(format!("👤 {}", username)).strong());
                        ui.separator();
                    }

                    let pending = ui_ctx.session.pending().len();
                    if pending > 0 {
                        ui.label(
                            RichText::new(format!("{} pending", pending)).color(Color32::LIGHT_BLUE),
                        );
                        if ui_ctx.polling {
                            ui.spinner();
                        }
                    }
                });
            });
        });
    }
}
