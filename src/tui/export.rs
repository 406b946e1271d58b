use anyhow::{Context, Result};
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

use super::state::UiState;

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Save the current document into the working directory and report on the info line.
pub fn save_and_show_path(state: &mut UiState) {
    if state.conversation.document().is_empty() {
        state.info = "No YAML to save yet.".into();
        return;
    }
    let result = std::env::current_dir()
        .context("get current directory")
        .and_then(|dir| crate::export::save_timestamped(&dir, state.conversation.document()));
    match result {
        Ok(path) => {
            tracing::info!(path = %path.display(), "saved yaml");
            state.info = format!("Saved: {}", path.display());
            state.last_saved_path = Some(path);
        }
        Err(e) => {
            state.info = format!("Save failed: {e:#}");
        }
    }
}

/// Copy the current document to the clipboard and report on the info line.
pub fn copy_document(state: &mut UiState) {
    if state.conversation.document().is_empty() {
        state.info = "No YAML to copy yet.".into();
        return;
    }
    match copy_to_clipboard(state.conversation.document()) {
        Ok(()) => state.info = "✓ YAML copied to clipboard".into(),
        Err(e) => state.info = format!("Clipboard copy failed: {e:#}"),
    }
}

/// Initialize the clipboard manager thread if not already initialized.
/// Each clipboard instance is kept alive for a while so clipboard managers on Linux
/// can read the contents before it is dropped.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                match Clipboard::new() {
                    Ok(mut clipboard) => {
                        if clipboard.set_text(&text).is_ok() {
                            std::thread::sleep(Duration::from_secs(2));
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "clipboard unavailable"),
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue `text` for the clipboard thread without blocking the UI loop.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}
