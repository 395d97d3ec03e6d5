use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

pub trait Clipboard: Send {
    fn copy_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard.
///
/// The handle is opened on the first copy and kept for the rest of the
/// session. On X11 and Wayland copied text only stays available while the
/// handle that set it is alive.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn is_open(&self) -> bool {
        self.handle.lock().map(|h| h.is_some()).unwrap_or(false)
    }
}

impl Clipboard for SystemClipboard {
    fn copy_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut handle = self
            .handle
            .lock()
            .map_err(|_| ClipboardError::Unavailable("clipboard lock poisoned".to_string()))?;
        if handle.is_none() {
            let opened =
                arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            tracing::debug!("system clipboard opened");
            *handle = Some(opened);
        }
        let clipboard = match handle.as_mut() {
            Some(clipboard) => clipboard,
            None => return Err(ClipboardError::Unavailable("clipboard not open".to_string())),
        };
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clipboard_opens_lazily() {
        let clipboard = SystemClipboard::new();
        assert!(!clipboard.is_open());
    }

    #[test]
    fn test_system_clipboard_keeps_its_handle() {
        let clipboard = SystemClipboard::new();
        // Headless machines have no clipboard to open.
        if clipboard.copy_text("first").is_ok() {
            assert!(clipboard.is_open());
            assert!(clipboard.copy_text("second").is_ok());
            assert!(clipboard.is_open());
        }
    }
}
