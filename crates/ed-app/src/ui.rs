mod central_panel;
mod side_panel;
mod top_panel;

pub use central_panel::CentralPanel;
pub use side_panel::SidePanel;
pub use top_panel::TopPanel;

use std::path::PathBuf;
use std::sync::Arc;

use ed_app::PageConfig;
use ed_core::{OverlayId, Point, Session};
use egui::Context;
use winit::event_loop::EventLoopProxy;
use winit::window::Window;

use crate::events::EdEvent;
use crate::gfx::GfxState;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Files dropped from the OS, with the drop point in canvas coordinates.
    DropFiles {
        paths: Vec<PathBuf>,
        position: Point,
    },
    BrowseImages {
        position: Point,
    },
    SetParameter {
        key: String,
        value: f64,
    },
    MoveOverlay {
        id: OverlayId,
        dx: f32,
        dy: f32,
    },
    DeleteOverlay(OverlayId),
    Resubmit(OverlayId),
}

/// What the panels get to see for one frame.
pub struct UiContext<'a> {
    pub session: &'a Session,
    pub page: &'a PageConfig,
    pub polling: bool,
    event_loop_proxy: &'a EventLoopProxy<EdEvent>,
}

impl UiContext<'_> {
    pub fn send_event(&self, event: UiEvent) {
        if self.event_loop_proxy.send_event(EdEvent::Ui(event)).is_err() {
            log::warn!("Event loop closed, dropping UI event");
        }
    }
}

pub struct UiState {
    pub(crate) egui_state: egui_winit::State,
    pub(crate) egui_ctx: egui::Context,
    pub(crate) egui_renderer: egui_wgpu::Renderer,

    components: Vec<Box<dyn UiComponent>>,
    event_loop_proxy: Arc<EventLoopProxy<EdEvent>>,
}

impl UiState {
    pub fn new(gfx: &GfxState, window: &Window, event_loop_proxy: Arc<EventLoopProxy<EdEvent>>) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gfx.device,
            gfx.config.format,
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            egui_state,
            egui_ctx,
            egui_renderer,
            components: Vec::new(),
            event_loop_proxy,
        }
    }

    pub fn draw(
        &mut self,
        window: &Window,
        session: &Session,
        page: &PageConfig,
        polling: bool,
    ) -> egui::FullOutput {
        let raw_input = self.egui_state.take_egui_input(window);
        let ui_ctx = UiContext {
            session,
            page,
            polling,
            event_loop_proxy: &self.event_loop_proxy,
        };

        self.egui_ctx.run(raw_input, |ctx| {
            for component in self.components.iter_mut() {
                component.show(ctx, &ui_ctx);
            }
        })
    }

    /// Components are shown in insertion order; the central panel has to come last.
    pub fn add_component(&mut self, component: Box<dyn UiComponent>) {
        self.components.push(component);
    }
}

pub trait UiComponent {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext<'_>);
}
