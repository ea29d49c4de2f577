//! Media picker frame registry.
//!
//! One picker frame per target identifier: constructed on first open with
//! the current image preselected, reopened (never rebuilt) thereafter. The
//! registry is explicit state handed to the controller's constructor; there
//! are no ambient globals.

use std::collections::HashMap;

use uuid::Uuid;

/// A media picker dialog for one section or block.
#[derive(Debug, Clone)]
pub struct MediaFrame {
    /// Composed frame identifier.
    pub key: String,
    /// Image preselected when the frame opens.
    pub selected: Option<Uuid>,
    /// How many times the frame has been opened.
    pub opens: u32,
}

/// Registry of media frames keyed by target identifier.
#[derive(Debug, Default)]
pub struct MediaFrames {
    frames: HashMap<String, MediaFrame>,
}

impl MediaFrames {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_for(target_id: Uuid) -> String {
        format!("background-select-{target_id}")
    }

    /// Open the frame for a target, creating it on first use.
    ///
    /// The first open preselects `current`; later opens keep whatever the
    /// frame last remembered.
    pub fn open(&mut self, target_id: Uuid, current: Option<Uuid>) -> &MediaFrame {
        let key = Self::key_for(target_id);
        let frame = self.frames.entry(key.clone()).or_insert(MediaFrame {
            key,
            selected: current,
            opens: 0,
        });
        frame.opens += 1;
        frame
    }

    /// Remember a selection so the next open preselects it.
    pub fn record_selection(&mut self, target_id: Uuid, image_id: Option<Uuid>) {
        if let Some(frame) = self.frames.get_mut(&Self::key_for(target_id)) {
            frame.selected = image_id;
        }
    }

    pub fn get(&self, target_id: Uuid) -> Option<&MediaFrame> {
        self.frames.get(&Self::key_for(target_id))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
