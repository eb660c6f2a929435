use std::collections::HashMap;

use ed_core::{Overlay, OverlayId, OverlayState, Point, Session};
use egui::{Color32, Context, Pos2, Rect, RichText, Sense, Stroke, TextureHandle, Vec2};

use crate::ui::{UiComponent, UiContext, UiEvent};

struct CachedTexture {
    revision: u64,
    texture: Option<TextureHandle>,
}

/// The drop canvas with one textured quad per overlay.
#[derive(Default)]
pub struct CentralPanel {
    textures: HashMap<OverlayId, CachedTexture>,
}

impl CentralPanel {
    fn sync_textures(&mut self, ctx: &Context, session: &Session) {
        self.textures.retain(|id, _| session.overlay(*id).is_some());

        for overlay in session.overlays() {
            let stale = self
                .textures
                .get(&overlay.id)
                .is_none_or(|cached| cached.revision != overlay.revision());

            if stale {
                self.textures.insert(
                    overlay.id,
                    CachedTexture {
                        revision: overlay.revision(),
                        texture: load_texture(ctx, overlay),
                    },
                );
            }
        }
    }
}

fn load_texture(ctx: &Context, overlay: &Overlay) -> Option<TextureHandle> {
    let image = match image::load_from_memory(&overlay.content()) {
        Ok(image) => image.to_rgba8(),
        Err(e) => {
            log::warn!("Cannot display {}: {}", overlay.name, e);
            return None;
        }
    };

    let size = [image.width() as usize, image.height() as usize];
    let pixels = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());

    Some(ctx.load_texture(
        format!("overlay-{}-{}", overlay.id.0, overlay.revision()),
        pixels,
        egui::TextureOptions::LINEAR,
    ))
}

fn to_point(canvas: Rect, pos: Pos2) -> Point {
    let local = pos - canvas.min;
    Point::new(local.x, local.y)
}

impl UiComponent for CentralPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext<'_>) {
        self.sync_textures(ctx, ui_ctx.session);

        egui::CentralPanel::default().show(ctx, |ui| {
            let browse = ui
                .horizontal(|ui| {
                    ui.heading(RichText::new("DROP IMAGES BELOW TO START ⬇").strong());
                    ui.button("Browse…").clicked()
                })
                .inner;
            ui.separator();

            let (canvas, _) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
            let painter = ui.painter_at(canvas);
            painter.rect_filled(canvas, 4.0, Color32::from_gray(24));

            if browse {
                ui_ctx.send_event(UiEvent::BrowseImages {
                    position: to_point(canvas, canvas.center()),
                });
            }

            for overlay in ui_ctx.session.overlays() {
                let rect = Rect::from_min_size(
                    canvas.min + Vec2::new(overlay.position.x, overlay.position.y),
                    Vec2::new(overlay.size.width, overlay.size.height),
                );
                let alpha = (overlay.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;

                match self.textures.get(&overlay.id).and_then(|c| c.texture.as_ref()) {
                    Some(texture) => painter.image(
                        texture.id(),
                        rect,
                        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                        Color32::from_white_alpha(alpha),
                    ),
                    None => painter.rect_filled(rect, 0.0, Color32::from_gray(80).gamma_multiply(overlay.opacity)),
                };

                let response = ui.interact(rect, ui.id().with(("overlay", overlay.id.0)), Sense::click_and_drag());

                if response.dragged() {
                    let delta = response.drag_delta();
                    if delta != Vec2::ZERO {
                        ui_ctx.send_event(UiEvent::MoveOverlay {
                            id: overlay.id,
                            dx: delta.x,
                            dy: delta.y,
                        });
                    }
                }

                if response.double_clicked() {
                    ui_ctx.send_event(UiEvent::DeleteOverlay(overlay.id));
                }

                if response.hovered() {
                    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::LIGHT_BLUE), egui::StrokeKind::Outside);
                }

                response
                    .on_hover_text(format!("{} ({})", overlay.name, overlay.state.label()))
                    .context_menu(|ui| {
                        if overlay.state == OverlayState::Unsubmitted && ui.button("Resubmit").clicked() {
                            ui_ctx.send_event(UiEvent::Resubmit(overlay.id));
                            ui.close();
                        }
                        if ui.button("Remove").clicked() {
                            ui_ctx.send_event(UiEvent::DeleteOverlay(overlay.id));
                            ui.close();
                        }
                    });
            }

            let hovering_files = ctx.input(|i| !i.raw.hovered_files.is_empty());
            if hovering_files {
                painter.rect_stroke(canvas, 4.0, Stroke::new(2.0, Color32::LIGHT_BLUE), egui::StrokeKind::Inside);
            }

            let dropped = ctx.input(|i| i.raw.dropped_files.clone());
            if !dropped.is_empty() {
                let paths: Vec<_> = dropped.into_iter().filter_map(|file| file.path).collect();
                let at = ctx
                    .input(|i| i.pointer.latest_pos())
                    .filter(|pos| canvas.contains(*pos))
                    .unwrap_or(canvas.center());

                if !paths.is_empty() {
                    ui_ctx.send_event(UiEvent::DropFiles {
                        paths,
                        position: to_point(canvas, at),
                    });
                }
            }
        });
    }
}
