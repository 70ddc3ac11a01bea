// decode.rs - Barcode and OCR Text Extraction
//
// A captured selection is decoded in two stages: first a barcode scan over
// the whole image, and only if no symbol is found does the slower OCR pass
// run. Both stages work on a grayscale copy.
//
// OCR goes through the tesseract binary, which also answers the probe
// commands used to validate a configured install (`--version`,
// `--list-langs`).

use std::collections::{BTreeSet, HashMap};
use std::env;
use std::path::Path;
use std::process::Command;

use image::{imageops, DynamicImage, GrayImage, RgbaImage};
use log::{debug, info, warn};
use rxing::common::HybridBinarizer;
use rxing::{BinaryBitmap, Luma8LuminanceSource, MultiFormatReader, Reader};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("Could not run tesseract at \"{path}\": {source}")]
    TesseractUnavailable {
        path: String,
        source: std::io::Error,
    },

    #[error("Unexpected tesseract output: {0}")]
    TesseractOutput(String),

    #[error("No barcode or readable text in the selection")]
    NothingRecognized,
}

/// Text recovered from a selection, tagged with how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub source: TextSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    /// A barcode or QR symbol; carries the format name for logging.
    Barcode(String),
    Ocr,
}

/// Decode a captured selection into text.
///
/// `languages` is a `+`-joined tesseract language string such as `eng+deu`.
/// Whitespace around the OCR result is stripped; a result that is empty
/// after stripping reports [`DecodeError::NothingRecognized`] so the caller
/// can leave the clipboard alone.
pub fn decode_image(image: &RgbaImage, languages: &str) -> Result<DecodedText, DecodeError> {
    let gray = imageops::grayscale(image);

    if let Some(found) = scan_barcode(&gray) {
        if let TextSource::Barcode(format) = &found.source {
            info!("Decoded {} symbol ({} chars)", format, found.text.len());
        }
        return Ok(found);
    }

    let text = ocr(&gray, languages)?.trim().to_string();
    if text.is_empty() {
        return Err(DecodeError::NothingRecognized);
    }
    info!("Recognized {} chars of text via OCR", text.len());
    Ok(DecodedText {
        text,
        source: TextSource::Ocr,
    })
}

/// Try every supported barcode format over the image. `None` means no
/// symbol, not a failure.
fn scan_barcode(gray: &GrayImage) -> Option<DecodedText> {
    let (width, height) = gray.dimensions();
    let source = Luma8LuminanceSource::new(gray.as_raw().clone(), width, height);
    let mut bitmap = BinaryBitmap::new(HybridBinarizer::new(source));

    match MultiFormatReader::default().decode(&mut bitmap) {
        Ok(found) => {
            let text = found.getText().to_string();
            if text.is_empty() {
                return None;
            }
            let format = format!("{:?}", found.getBarcodeFormat());
            Some(DecodedText {
                text,
                source: TextSource::Barcode(format),
            })
        }
        Err(e) => {
            debug!("No barcode in selection: {e}");
            None
        }
    }
}

fn ocr(gray: &GrayImage, languages: &str) -> Result<String, DecodeError> {
    let args = rusty_tesseract::Args {
        lang: languages.to_string(),
        config_variables: HashMap::new(),
        dpi: None,
        psm: None,
        oem: None,
    };
    let image = rusty_tesseract::Image::from_dynamic_image(&DynamicImage::ImageLuma8(gray.clone()))
        .map_err(|e| DecodeError::Ocr(e.to_string()))?;
    rusty_tesseract::image_to_string(&image, &args).map_err(|e| DecodeError::Ocr(e.to_string()))
}

/// Version reported by the tesseract binary at `binary`, e.g. `5.3.4`.
///
/// Doubles as the install probe: an error here means the path does not point
/// at a working tesseract.
pub fn tesseract_version(binary: &str) -> Result<String, DecodeError> {
    let output = run_tesseract(binary, "--version")?;
    parse_version(&output).ok_or_else(|| {
        DecodeError::TesseractOutput(output.lines().next().unwrap_or_default().to_string())
    })
}

/// Language codes the tesseract install at `binary` can OCR.
pub fn tesseract_languages(binary: &str) -> Result<BTreeSet<String>, DecodeError> {
    let output = run_tesseract(binary, "--list-langs")?;
    let langs = parse_languages(&output);
    if langs.is_empty() {
        return Err(DecodeError::TesseractOutput(
            "no languages reported".to_string(),
        ));
    }
    Ok(langs)
}

/// Put a custom tesseract binary's directory at the front of PATH.
///
/// The OCR crate always invokes plain `tesseract`, so a binary configured
/// under a non-standard prefix has to be made visible this way. A bare
/// command name with no directory is left to normal PATH lookup.
pub fn expose_tesseract_binary(binary: &str) {
    let Some(dir) = Path::new(binary)
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
    else {
        return;
    };

    let mut paths = vec![dir.to_path_buf()];
    if let Some(current) = env::var_os("PATH") {
        paths.extend(env::split_paths(&current));
    }
    match env::join_paths(paths) {
        Ok(joined) => {
            debug!("Prepended {} to PATH for tesseract", dir.display());
            env::set_var("PATH", joined);
        }
        Err(e) => warn!("Could not extend PATH for tesseract: {e}"),
    }
}

fn run_tesseract(binary: &str, flag: &str) -> Result<String, DecodeError> {
    // Bare command names resolve through PATH; explicit paths are checked
    // for an executable at that location.
    let resolved = which::which(binary).map_err(|e| DecodeError::TesseractUnavailable {
        path: binary.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e),
    })?;
    let output = Command::new(&resolved).arg(flag).output().map_err(|source| {
        DecodeError::TesseractUnavailable {
            path: binary.to_string(),
            source,
        }
    })?;

    // Old tesseract releases print version and language info to stderr.
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    if text.trim().is_empty() {
        text = String::from_utf8_lossy(&output.stderr).into_owned();
    }
    if !output.status.success() {
        return Err(DecodeError::TesseractOutput(
            text.lines().next().unwrap_or_default().to_string(),
        ));
    }
    Ok(text)
}

/// First line is `tesseract <version>`, with anything after it ignored.
fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
}

/// Every non-empty line except the `List of available languages (N):` header.
fn parse_languages(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.ends_with(':'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};
    use rxing::{BarcodeFormat, MultiFormatWriter, Writer};

    fn qr_image(contents: &str, size: i32) -> RgbaImage {
        let matrix = MultiFormatWriter
            .encode(contents, &BarcodeFormat::QR_CODE, size, size)
            .unwrap();
        let mut image = RgbaImage::from_pixel(
            size as u32,
            size as u32,
            Rgba([255, 255, 255, 255]),
        );
        for y in 0..size as u32 {
            for x in 0..size as u32 {
                if matrix.get(x, y) {
                    image.put_pixel(x, y, Rgba([0, 0, 0, 255]));
                }
            }
        }
        image
    }

    #[test]
    fn decodes_a_qr_symbol_before_trying_ocr() {
        let image = qr_image("https://example.com/ticket/42", 240);

        let found = decode_image(&image, "eng").unwrap();
        assert_eq!(found.text, "https://example.com/ticket/42");
        assert_eq!(found.source, TextSource::Barcode("QR_CODE".to_string()));
    }

    #[test]
    fn blank_image_has_no_barcode() {
        let gray = GrayImage::from_pixel(64, 64, Luma([255]));
        assert!(scan_barcode(&gray).is_none());
    }

    #[test]
    fn parses_linux_style_version_output() {
        let output = "tesseract 5.3.4\n  libgif 5.2.1 : libjpeg 8d\n";
        assert_eq!(parse_version(output).unwrap(), "5.3.4");
    }

    #[test]
    fn parses_windows_style_version_output() {
        let output = "tesseract v4.1.1.20191030\r\n leptonica-1.78.0\r\n";
        assert_eq!(parse_version(output).unwrap(), "v4.1.1.20191030");
    }

    #[test]
    fn version_output_without_a_number_is_rejected() {
        assert_eq!(parse_version("command not found"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn parses_language_listing_and_drops_the_header() {
        let output = "List of available languages (3):\neng\nosd\ntur\n";
        let langs = parse_languages(output);
        assert_eq!(langs.len(), 3);
        assert!(langs.contains("eng"));
        assert!(langs.contains("tur"));
        assert!(!langs.iter().any(|l| l.starts_with("List")));
    }

    #[test]
    fn path_prepending_skips_bare_command_names() {
        let before = env::var_os("PATH");
        expose_tesseract_binary("tesseract");
        assert_eq!(env::var_os("PATH"), before);

        expose_tesseract_binary("/opt/tesseract/bin/tesseract");
        let path = env::var("PATH").unwrap();
        assert!(path.starts_with("/opt/tesseract/bin"));
    }

    #[test]
    #[ignore = "requires a tesseract install on PATH"]
    fn probes_a_real_tesseract_install() {
        let version = tesseract_version("tesseract").unwrap();
        assert!(!version.is_empty());

        let langs = tesseract_languages("tesseract").unwrap();
        assert!(langs.contains("eng"));
    }
}
