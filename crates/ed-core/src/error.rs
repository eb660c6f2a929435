use thiserror::Error;

use crate::overlay::OverlayId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not decode image {name}: {source}")]
    ImageDecode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Overlay {0} is not on the canvas")]
    OverlayNotFound(OverlayId),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Overlay {id} cannot be submitted while {state}")]
    InvalidState { id: OverlayId, state: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
