// settings.rs - Persisted User Settings
//
// Four plain-string fields stored as pretty JSON in the platform config
// directory. Loading never fails: a missing or corrupted file falls back to
// defaults, and individually invalid stored values are replaced per field so
// one bad entry cannot take the rest down with it.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use lazy_static::lazy_static;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::hotkeys;
use crate::hotkey::{self, HotkeyError};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    InvalidHotkey(#[from] HotkeyError),

    #[error("\"{0}\" is not a known tesseract language")]
    UnknownLanguage(String),

    #[error("At least one OCR language is required")]
    NoLanguages,
}

fn default_capture_hotkey() -> String {
    hotkeys::DEFAULT_CAPTURE.to_string()
}

fn default_exit_hotkey() -> String {
    hotkeys::DEFAULT_EXIT.to_string()
}

fn default_languages() -> String {
    "eng".to_string()
}

/// The stock installer location on Windows; empty elsewhere, which defers
/// to PATH lookup at probe time.
fn default_tesseract_path() -> String {
    if cfg!(windows) {
        "C:/Program Files/Tesseract-OCR/tesseract.exe".to_string()
    } else {
        String::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Global hotkey that starts a capture, e.g. `alt+s`.
    #[serde(default = "default_capture_hotkey")]
    pub capture_hotkey: String,

    /// Global hotkey that exits the app. Empty means unbound.
    #[serde(default = "default_exit_hotkey")]
    pub exit_hotkey: String,

    /// `+`-joined tesseract language codes, e.g. `eng+deu`.
    #[serde(default = "default_languages")]
    pub languages: String,

    /// Tesseract binary to use. Empty means plain PATH lookup.
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            capture_hotkey: default_capture_hotkey(),
            exit_hotkey: default_exit_hotkey(),
            languages: default_languages(),
            tesseract_path: default_tesseract_path(),
        }
    }
}

impl Settings {
    fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shotscan");
        let _ = fs::create_dir_all(&config_dir);
        config_dir.join("settings.json")
    }

    pub fn load() -> Self {
        let path = Self::config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                Ok(settings) => {
                    info!("Settings loaded from {:?}", path);
                    settings.sanitized()
                }
                Err(e) => {
                    error!("Settings file is corrupted ({e}); using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!("No settings file at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        let path = Self::config_path();
        match serde_json::to_string_pretty(self) {
            Ok(json) => match fs::write(&path, json) {
                Ok(()) => info!("Settings saved to {:?}", path),
                Err(e) => error!("Failed to write settings: {e}"),
            },
            Err(e) => error!("Failed to serialize settings: {e}"),
        }
    }

    /// Replace stored values that no longer pass validation.
    ///
    /// The tesseract path is only trimmed here; whether it actually runs is
    /// checked against the binary itself, not at load time.
    fn sanitized(mut self) -> Self {
        match normalize_capture_hotkey(&self.capture_hotkey) {
            Ok(binding) => self.capture_hotkey = binding,
            Err(e) => {
                warn!("Stored capture hotkey rejected: {e}; using \"{}\"", hotkeys::DEFAULT_CAPTURE);
                self.capture_hotkey = default_capture_hotkey();
            }
        }
        match normalize_exit_hotkey(&self.exit_hotkey) {
            Ok(binding) => self.exit_hotkey = binding,
            Err(e) => {
                warn!("Stored exit hotkey rejected: {e}; using \"{}\"", hotkeys::DEFAULT_EXIT);
                self.exit_hotkey = default_exit_hotkey();
            }
        }
        match normalize_languages(&self.languages, None) {
            Ok(languages) => self.languages = languages,
            Err(e) => {
                warn!("Stored languages rejected: {e}; using \"eng\"");
                self.languages = default_languages();
            }
        }
        self.tesseract_path = self.tesseract_path.trim().to_string();
        self
    }
}

/// Trim and lowercase a capture binding, rejecting anything that does not
/// parse as a hotkey.
pub fn normalize_capture_hotkey(input: &str) -> Result<String, SettingsError> {
    let binding = input.trim().to_lowercase();
    hotkey::validate_binding(&binding)?;
    Ok(binding)
}

/// Like [`normalize_capture_hotkey`], but empty input is allowed and means
/// the exit hotkey is unbound.
pub fn normalize_exit_hotkey(input: &str) -> Result<String, SettingsError> {
    let binding = input.trim().to_lowercase();
    if binding.is_empty() {
        return Ok(binding);
    }
    hotkey::validate_binding(&binding)?;
    Ok(binding)
}

/// Normalize a language list into `+`-joined lowercase codes.
///
/// Tokens are `[a-z0-9_]` runs, so `eng+tur`, `eng tur` and `eng,tur` all
/// parse the same. Every code must appear in `known` (the probed install
/// list) or, when no probe is available, in the upstream traineddata list.
pub fn normalize_languages(
    input: &str,
    known: Option<&BTreeSet<String>>,
) -> Result<String, SettingsError> {
    let mut codes: Vec<String> = Vec::new();
    for token in input
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
    {
        if token.is_empty() {
            continue;
        }
        let recognized = match known {
            Some(set) => set.contains(token),
            None => FALLBACK_LANGUAGES.contains(token),
        };
        if !recognized {
            return Err(SettingsError::UnknownLanguage(token.to_string()));
        }
        codes.push(token.to_string());
    }
    if codes.is_empty() {
        return Err(SettingsError::NoLanguages);
    }
    Ok(codes.join("+"))
}

lazy_static! {
    /// Traineddata codes shipped by upstream tesseract. Language validation
    /// falls back to this list when a live install cannot be probed.
    pub static ref FALLBACK_LANGUAGES: BTreeSet<&'static str> = [
        "afr", "amh", "ara", "asm", "aze", "aze_cyrl", "bel", "ben", "bod", "bos",
        "bre", "bul", "cat", "ceb", "ces", "chi_sim", "chi_tra", "chr", "cos", "cym",
        "dan", "deu", "div", "dzo", "ell", "eng", "enm", "epo", "equ", "est",
        "eus", "fao", "fas", "fil", "fin", "fra", "frk", "frm", "fry", "gla",
        "gle", "glg", "grc", "guj", "hat", "heb", "hin", "hrv", "hun", "hye",
        "iku", "ind", "isl", "ita", "ita_old", "jav", "jpn", "jpn_vert", "kan", "kat",
        "kat_old", "kaz", "khm", "kir", "kmr", "kor", "kor_vert", "lao", "lat", "lav",
        "lit", "ltz", "mal", "mar", "mkd", "mlt", "mon", "mri", "msa", "mya",
        "nep", "nld", "nor", "oci", "ori", "osd", "pan", "pol", "por", "pus",
        "que", "ron", "rus", "san", "sin", "slk", "slv", "snd", "spa", "spa_old",
        "sqi", "srp", "srp_latn", "sun", "swa", "swe", "syr", "tam", "tat", "tel",
        "tgk", "tha", "tir", "ton", "tur", "uig", "ukr", "urd", "uzb", "uzb_cyrl",
        "vie", "yid", "yor",
    ]
    .into_iter()
    .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_their_own_validation() {
        let settings = Settings::default();
        normalize_capture_hotkey(&settings.capture_hotkey).unwrap();
        normalize_exit_hotkey(&settings.exit_hotkey).unwrap();
        assert_eq!(normalize_languages(&settings.languages, None).unwrap(), "eng");
    }

    #[test]
    fn hotkeys_are_trimmed_and_lowercased() {
        assert_eq!(normalize_capture_hotkey("  ALT+S ").unwrap(), "alt+s");
        assert_eq!(normalize_exit_hotkey("Shift+Escape").unwrap(), "shift+escape");
    }

    #[test]
    fn empty_exit_hotkey_means_unbound() {
        assert_eq!(normalize_exit_hotkey("   ").unwrap(), "");
        assert!(normalize_capture_hotkey("   ").is_err());
    }

    #[test]
    fn languages_are_normalized_against_the_fallback_list() {
        assert_eq!(normalize_languages("ENG", None).unwrap(), "eng");
        assert_eq!(normalize_languages(" eng + tur ", None).unwrap(), "eng+tur");
        assert_eq!(normalize_languages("+eng+", None).unwrap(), "eng");
        // Any separator tokenizes the same way, and underscores stay inside codes.
        assert_eq!(normalize_languages("eng, chi_sim", None).unwrap(), "eng+chi_sim");

        assert!(matches!(
            normalize_languages("eng+klingon", None),
            Err(SettingsError::UnknownLanguage(code)) if code == "klingon"
        ));
        assert!(matches!(
            normalize_languages("  ", None),
            Err(SettingsError::NoLanguages)
        ));
    }

    #[test]
    fn probed_language_list_overrides_the_fallback() {
        let known: BTreeSet<String> = ["eng", "jpn"].iter().map(|s| s.to_string()).collect();

        assert_eq!(normalize_languages("jpn", Some(&known)).unwrap(), "jpn");
        // In the fallback list, but not installed.
        assert!(normalize_languages("tur", Some(&known)).is_err());
    }

    #[test]
    fn sanitizing_replaces_only_the_bad_fields() {
        let settings = Settings {
            capture_hotkey: "not a chord!!".to_string(),
            exit_hotkey: "ctrl+q".to_string(),
            languages: "martian".to_string(),
            tesseract_path: "  /usr/bin/tesseract ".to_string(),
        };

        let clean = settings.sanitized();
        assert_eq!(clean.capture_hotkey, hotkeys::DEFAULT_CAPTURE);
        assert_eq!(clean.exit_hotkey, "ctrl+q");
        assert_eq!(clean.languages, "eng");
        assert_eq!(clean.tesseract_path, "/usr/bin/tesseract");
    }

    #[test]
    fn partial_settings_files_fill_in_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "languages": "tur" }"#).unwrap();

        assert_eq!(settings.languages, "tur");
        assert_eq!(settings.capture_hotkey, hotkeys::DEFAULT_CAPTURE);
        assert_eq!(settings.exit_hotkey, hotkeys::DEFAULT_EXIT);
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = Settings {
            capture_hotkey: "ctrl+shift+x".to_string(),
            exit_hotkey: String::new(),
            languages: "eng+deu".to_string(),
            tesseract_path: "/opt/tesseract/bin/tesseract".to_string(),
        };

        let json = serde_json::to_string_pretty(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
