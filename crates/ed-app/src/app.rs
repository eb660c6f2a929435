use std::sync::Arc;
use std::time::Instant;

use ed_app::AppConfig;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{WindowAttributes, WindowId};

use crate::events::EdEvent;
use crate::state::AppState;

pub struct App {
    event_loop_proxy: Arc<EventLoopProxy<EdEvent>>,
    config: AppConfig,
    state: Option<AppState>,
}

impl App {
    pub fn new(event_loop: &EventLoop<EdEvent>, config: AppConfig) -> Self {
        Self {
            event_loop_proxy: Arc::new(event_loop.create_proxy()),
            config,
            state: None,
        }
    }
}

impl ApplicationHandler<EdEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attributes = WindowAttributes::default()
            .with_title("edgedrop")
            .with_inner_size(LogicalSize::new(1400.0, 900.0));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let state = pollster::block_on(AppState::new(
            window.clone(),
            self.event_loop_proxy.clone(),
            self.config.clone(),
        ));

        match state {
            Ok(state) => {
                window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Could not start: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: EdEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            EdEvent::Ui(e) => {
                if let Err(e) = state.on_ui_event(e) {
                    log::warn!("{:#}", e);
                }
            }
            EdEvent::Session(e) => state.on_session_event(e),
        }

        state.window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        if state.window.id() != window_id {
            return;
        }

        let response = state.ui.egui_state.on_window_event(&state.window, &event);
        if response.repaint {
            state.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.resize(size);
                state.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = state.render() {
                    log::warn!("Render failed: {:#}", e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };

        match state.repaint_at {
            Some(at) if at <= Instant::now() => {
                state.repaint_at = None;
                state.window.request_redraw();
                event_loop.set_control_flow(ControlFlow::Wait);
            }
            Some(at) => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
