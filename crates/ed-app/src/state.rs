use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ed_app::annotator::client::HttpJobClient;
use ed_app::{Annotator, AppConfig, DroppedImage, SessionEvent};
use ed_core::{ParameterSet, Point, Session};
use egui_wgpu::wgpu;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoopProxy;
use winit::window::Window;

use crate::events::EdEvent;
use crate::gfx::GfxState;
use crate::ui;
use crate::ui::{UiEvent, UiState};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

pub struct AppState {
    pub(crate) window: Arc<Window>,

    pub gfx: GfxState,
    pub ui: UiState,

    pub annotator: Annotator,
    pub config: AppConfig,

    /// When egui asked to be repainted next, if it did.
    pub repaint_at: Option<Instant>,
}

impl AppState {
    pub async fn new(
        window: Arc<Window>,
        event_loop_proxy: Arc<EventLoopProxy<EdEvent>>,
        config: AppConfig,
    ) -> anyhow::Result<Self> {
        let client = Arc::new(HttpJobClient::new(&config)?);
        let session = Session::new(ParameterSet::detection_defaults()).with_max_dimension(config.max_dimension);

        let (events, session_events) = unbounded_channel();
        tokio::spawn(forward_session_events(session_events, event_loop_proxy.clone()));
        let annotator = Annotator::new(session, client, config.poll_interval, events);

        let gfx = GfxState::new(window.clone()).await?;
        let mut ui_state = UiState::new(&gfx, &window, event_loop_proxy);

        ui_state.add_component(Box::new(ui::TopPanel));
        ui_state.add_component(Box::new(ui::SidePanel));
        ui_state.add_component(Box::new(ui::CentralPanel::default()));

        Ok(Self {
            window,
            gfx,
            ui: ui_state,
            annotator,
            config,
            repaint_at: None,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gfx.resize(new_size);
    }

    pub fn render(&mut self) -> anyhow::Result<()> {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let output = match self.gfx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gfx.reconfigure();
                self.window.request_redraw();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.gfx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        let full_output = self.ui.draw(
            &self.window,
            self.annotator.session(),
            &self.config.page,
            self.annotator.is_polling(),
        );

        self.ui
            .egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let paint_jobs = self.ui.egui_ctx.tessellate(full_output.shapes, pixels_per_point);
        let screen_desc = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.ui
                .egui_renderer
                .update_texture(&self.gfx.device, &self.gfx.queue, *id, delta);
        }

        let prepared = self.ui.egui_renderer.update_buffers(
            &self.gfx.device,
            &self.gfx.queue,
            &mut encoder,
            &paint_jobs,
            &screen_desc,
        );

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.1, g: 0.1, b: 0.1, a: 1.0 }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            self.ui
                .egui_renderer
                .render(&mut rpass.forget_lifetime(), &paint_jobs, &screen_desc);
        }

        for id in &full_output.textures_delta.free {
            self.ui.egui_renderer.free_texture(id);
        }

        self.gfx
            .queue
            .submit(prepared.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        let repaint_delay = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .map_or(Duration::MAX, |viewport| viewport.repaint_delay);
        self.repaint_at = if repaint_delay.is_zero() {
            self.window.request_redraw();
            None
        } else {
            Instant::now().checked_add(repaint_delay)
        };

        Ok(())
    }

    pub fn on_ui_event(&mut self, event: UiEvent) -> anyhow::Result<()> {
        match event {
            UiEvent::DropFiles { paths, position } => self.drop_paths(paths, position),
            UiEvent::BrowseImages { position } => {
                let picked = rfd::FileDialog::new()
                    .set_title("Choose images")
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_files();

                if let Some(paths) = picked {
                    self.drop_paths(paths, position);
                }
            }
            UiEvent::SetParameter { key, value } => self.annotator.set_parameter(&key, value)?,
            UiEvent::MoveOverlay { id, dx, dy } => self.annotator.move_overlay(id, dx, dy)?,
            UiEvent::DeleteOverlay(id) => self.annotator.delete(id)?,
            UiEvent::Resubmit(id) => self.annotator.submit(id)?,
        }

        Ok(())
    }

    pub fn on_session_event(&mut self, event: SessionEvent) {
        self.annotator.handle_event(event);
    }

    fn drop_paths(&mut self, paths: Vec<PathBuf>, position: Point) {
        let mut files = Vec::with_capacity(paths.len());

        for path in paths {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            match std::fs::read(&path) {
                Ok(bytes) => files.push(DroppedImage { name, bytes }),
                Err(e) => self.annotator.record(format!("Could not read {}: {}", name, e)),
            }
        }

        self.annotator.drop_files(files, position);
    }
}

/// Hand network completions over to the event loop thread.
async fn forward_session_events(
    mut events: UnboundedReceiver<SessionEvent>,
    event_loop_proxy: Arc<EventLoopProxy<EdEvent>>,
) {
    while let Some(event) = events.recv().await {
        if event_loop_proxy.send_event(EdEvent::Session(event)).is_err() {
            break;
        }
    }
}
