// clipboard.rs - System Clipboard Access

use arboard::Clipboard;
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Clipboard unavailable: {0}")]
pub struct ClipboardError(#[from] arboard::Error);

/// Put `text` on the system clipboard.
///
/// Opens a fresh connection per call rather than holding one on the event
/// loop.
pub fn copy_text(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    info!("Copied {} chars to clipboard", text.chars().count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires a session clipboard"]
    fn copies_and_reads_back() {
        copy_text("shotscan clipboard check").unwrap();

        let mut clipboard = Clipboard::new().unwrap();
        assert_eq!(clipboard.get_text().unwrap(), "shotscan clipboard check");
    }
}
