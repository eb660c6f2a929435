mod app;
mod events;
mod gfx;
mod state;
mod ui;

use ed_app::AppConfig;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::events::EdEvent;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load()?;
    log::info!("Job server at {}", config.job_url());

    let event_loop: EventLoop<EdEvent> = EventLoop::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = app::App::new(&event_loop, config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
