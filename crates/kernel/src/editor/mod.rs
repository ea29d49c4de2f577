//! Editor-side controller: state machine, media frames, and transport seam.

pub mod controller;
pub mod frames;
pub mod transport;

pub use controller::{EditorController, EditorHost, EditorMode, NullEditorHost, UiEvent};
pub use frames::{MediaFrame, MediaFrames};
pub use transport::{DirectTransport, Transport, TransportError};
