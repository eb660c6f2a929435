pub mod annotator;
pub mod error;

pub use annotator::config::{AppConfig, PageConfig};
pub use annotator::{Annotator, DroppedImage, SessionEvent};
pub use error::AppError;
