use std::fmt;
use std::sync::Arc;

use crate::job::JobId;

/// Opacity of an overlay that has no annotated result yet.
pub const PENDING_OPACITY: f32 = 0.5;
/// Opacity of an overlay showing its annotated result.
pub const RESOLVED_OPACITY: f32 = 1.0;
/// Longer side of a freshly dropped overlay, in canvas units.
pub const DEFAULT_MAX_DIMENSION: f32 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayId(pub u64);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Scale `width` x `height` so the longer side equals `max`, keeping the aspect ratio.
    pub fn fit_within(width: u32, height: u32, max: f32) -> Self {
        if width == 0 || height == 0 {
            return Self::default();
        }

        let (width, height) = (width as f32, height as f32);
        let ratio = if width > height { width / max } else { height / max };

        Self {
            width: width / ratio,
            height: height / ratio,
        }
    }
}

/// Where an overlay is in its job lifecycle. Deleted overlays are simply gone from the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayState {
    Unsubmitted,
    /// Still unsubmitted, but a submit request is in flight.
    Submitting,
    Pending(JobId),
    Resolved,
}

impl OverlayState {
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Self::Pending(id) => Some(id),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unsubmitted => "unsubmitted",
            Self::Submitting => "submitting",
            Self::Pending(_) => "pending",
            Self::Resolved => "resolved",
        }
    }
}

/// One dropped image on the canvas.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub id: OverlayId,
    pub name: String,
    /// Top-left corner in canvas space.
    pub position: Point,
    pub size: Size,
    pub opacity: f32,
    pub state: OverlayState,
    source: Arc<[u8]>,
    content: Arc<[u8]>,
    revision: u64,
}

impl Overlay {
    pub(crate) fn new(id: OverlayId, name: String, centre: Point, size: Size, bytes: Arc<[u8]>) -> Self {
        Self {
            id,
            name,
            position: Point::new(centre.x - size.width / 2.0, centre.y - size.height / 2.0),
            size,
            opacity: PENDING_OPACITY,
            state: OverlayState::Unsubmitted,
            source: bytes.clone(),
            content: bytes,
            revision: 0,
        }
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.state.job_id()
    }

    /// The dropped file's bytes, as submitted to the job server.
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Encoded image currently shown for this overlay.
    pub fn content(&self) -> Arc<[u8]> {
        self.content.clone()
    }

    /// Bumped every time `content` changes, so renderers know to re-upload.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn resolve(&mut self, result: Vec<u8>) {
        self.content = result.into();
        self.revision += 1;
        self.opacity = RESOLVED_OPACITY;
        self.state = OverlayState::Resolved;
    }

    pub(crate) fn reset(&mut self) {
        self.opacity = PENDING_OPACITY;
        self.state = OverlayState::Unsubmitted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_landscape() {
        let size = Size::fit_within(1200, 800, 600.0);
        assert_eq!(size, Size { width: 600.0, height: 400.0 });
    }

    #[test]
    fn test_fit_portrait_upscales() {
        let size = Size::fit_within(150, 300, 600.0);
        assert_eq!(size, Size { width: 300.0, height: 600.0 });
    }

    #[test]
    fn test_fit_square_uses_height() {
        let size = Size::fit_within(1000, 1000, 600.0);
        assert_eq!(size, Size { width: 600.0, height: 600.0 });
    }

    #[test]
    fn test_overlay_centred_on_drop() {
        let overlay = Overlay::new(
            OverlayId(1),
            "a.png".into(),
            Point::new(400.0, 300.0),
            Size { width: 600.0, height: 400.0 },
            Arc::from(vec![1u8, 2, 3]),
        );

        assert_eq!(overlay.position, Point::new(100.0, 100.0));
        assert_eq!(overlay.opacity, PENDING_OPACITY);
        assert!(overlay.job_id().is_none());
    }
}
