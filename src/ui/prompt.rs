// ui/prompt.rs - Terminal Settings Dialog
//
// A line-based editor for the settings file, reached through the `settings`
// subcommand. Each field is prompted in turn: a blank line keeps the current
// value, a lone space clears it, anything else is validated and re-prompted
// until it passes.

use std::io::{self, Write as _};

use crate::decode;
use crate::settings::{self, Settings};

/// What the user typed for one field.
#[derive(Debug, PartialEq, Eq)]
enum Entry {
    Keep,
    Clear,
    Value(String),
}

/// Run the interactive dialog and persist the result.
pub fn run_settings_dialog() -> io::Result<()> {
    let mut settings = Settings::load();

    println!("Current settings:");
    print_settings(&settings);
    println!();

    if confirm("Restore defaults? (y/N): ")? {
        settings = Settings::default();
        println!("Defaults restored:");
        print_settings(&settings);
    }

    println!();
    println!("Enter settings. Leave blank to skip and enter one space to clear.");
    edit_capture_hotkey(&mut settings)?;
    edit_exit_hotkey(&mut settings)?;
    edit_tesseract_path(&mut settings)?;
    edit_languages(&mut settings)?;

    println!();
    println!("Saved settings:");
    print_settings(&settings);
    settings.save();
    Ok(())
}

fn print_settings(settings: &Settings) {
    let shown = |value: &str| {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    };
    println!("    capture hotkey: {}", shown(&settings.capture_hotkey));
    println!("    exit hotkey:    {}", shown(&settings.exit_hotkey));
    println!("    languages:      {}", shown(&settings.languages));
    println!("    tesseract path: {}", shown(&settings.tesseract_path));
}

fn edit_capture_hotkey(settings: &mut Settings) -> io::Result<()> {
    loop {
        match field_entry(&format!("capture hotkey [{}]: ", settings.capture_hotkey))? {
            Entry::Keep => return Ok(()),
            Entry::Clear => {
                // The capture hotkey is the app's only entry point, so
                // clearing it means going back to the default binding.
                settings.capture_hotkey = Settings::default().capture_hotkey;
                println!("Capture hotkey reset to \"{}\".", settings.capture_hotkey);
                return Ok(());
            }
            Entry::Value(value) => match settings::normalize_capture_hotkey(&value) {
                Ok(binding) => {
                    settings.capture_hotkey = binding;
                    return Ok(());
                }
                Err(e) => println!("{e}"),
            },
        }
    }
}

fn edit_exit_hotkey(settings: &mut Settings) -> io::Result<()> {
    loop {
        match field_entry(&format!("exit hotkey [{}]: ", settings.exit_hotkey))? {
            Entry::Keep => return Ok(()),
            Entry::Clear => {
                settings.exit_hotkey = String::new();
                println!("Exit hotkey unbound.");
                return Ok(());
            }
            Entry::Value(value) => match settings::normalize_exit_hotkey(&value) {
                Ok(binding) => {
                    settings.exit_hotkey = binding;
                    return Ok(());
                }
                Err(e) => println!("{e}"),
            },
        }
    }
}

fn edit_tesseract_path(settings: &mut Settings) -> io::Result<()> {
    loop {
        match field_entry(&format!("tesseract path [{}]: ", settings.tesseract_path))? {
            Entry::Keep => return Ok(()),
            Entry::Clear => {
                settings.tesseract_path = String::new();
                println!("Tesseract path cleared; PATH lookup will be used.");
                return Ok(());
            }
            Entry::Value(value) => {
                let path = value.trim();
                match decode::tesseract_version(path) {
                    Ok(version) => {
                        println!("Tesseract version: {version}");
                        settings.tesseract_path = path.to_string();
                        return Ok(());
                    }
                    Err(e) => println!("{e}"),
                }
            }
        }
    }
}

fn edit_languages(settings: &mut Settings) -> io::Result<()> {
    // Validate against the install chosen above when possible; probing can
    // fail (no tesseract yet), in which case the stock list applies.
    let binary = if settings.tesseract_path.is_empty() {
        "tesseract"
    } else {
        settings.tesseract_path.as_str()
    };
    let known = decode::tesseract_languages(binary).ok();

    loop {
        match field_entry(&format!("languages [{}]: ", settings.languages))? {
            Entry::Keep => return Ok(()),
            Entry::Clear => {
                settings.languages = Settings::default().languages;
                println!("Languages reset to \"{}\".", settings.languages);
                return Ok(());
            }
            Entry::Value(value) => match settings::normalize_languages(&value, known.as_ref()) {
                Ok(languages) => {
                    settings.languages = languages;
                    return Ok(());
                }
                Err(e) => println!("{e}"),
            },
        }
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    let answer = ask(prompt)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn field_entry(prompt: &str) -> io::Result<Entry> {
    Ok(classify(&ask(prompt)?))
}

fn classify(line: &str) -> Entry {
    if line.is_empty() {
        Entry::Keep
    } else if line.trim().is_empty() {
        Entry::Clear
    } else {
        Entry::Value(line.to_string())
    }
}

/// One line of input with the trailing newline removed but inner whitespace
/// kept, so a lone space stays distinguishable from an empty line.
fn ask(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stdin closed during settings dialog",
        ));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keeps_space_clears_text_edits() {
        assert_eq!(classify(""), Entry::Keep);
        assert_eq!(classify(" "), Entry::Clear);
        assert_eq!(classify("   "), Entry::Clear);
        assert_eq!(classify("alt+x"), Entry::Value("alt+x".to_string()));
        assert_eq!(classify(" eng+tur "), Entry::Value(" eng+tur ".to_string()));
    }
}
