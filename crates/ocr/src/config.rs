use std::{env, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};

use crate::preprocess::PreprocessOptions;

/// Everything the OCR lambda reads from its environment, resolved once at
/// cold start.
#[derive(Clone, Debug, PartialEq)]
pub struct OcrConfig {
    pub tesseract_cmd: PathBuf,
    pub library_path: Option<String>,
    pub tessdata_prefix: Option<String>,
    pub language: String,
    /// OCR engine mode; 3 selects the LSTM recognizer.
    pub oem: u8,
    /// Page segmentation mode; 6 assumes a single uniform block of text.
    pub psm: u8,
    pub preprocess: PreprocessOptions,
}

impl OcrConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PreprocessOptions::default();

        let preprocess = PreprocessOptions {
            enabled: parse_or(&lookup, "OCR_PREPROCESS", defaults.enabled)?,
            contrast: parse_toggle(&lookup, "OCR_CONTRAST", defaults.contrast, |f: &f32| *f > 0.0)?,
            threshold_radius: parse_toggle(&lookup, "OCR_THRESHOLD_RADIUS", defaults.threshold_radius, |r: &u32| *r > 0)?,
            upscale: parse_toggle(&lookup, "OCR_UPSCALE", defaults.upscale, |f: &u32| *f > 1)?,
            blur_radius: parse_toggle(&lookup, "OCR_BLUR_RADIUS", defaults.blur_radius, |r: &f32| *r > 0.0)?,
        };

        Ok(Self {
            tesseract_cmd: lookup("TESSERACT_CMD")
                .unwrap_or("/opt/bin/tesseract".to_string())
                .into(),
            library_path: optional_path(&lookup, "TESSERACT_LIBRARY_PATH", "/opt/lib"),
            tessdata_prefix: optional_path(&lookup, "TESSDATA_PREFIX", "/opt/lib/tessdata"),
            language: non_empty(lookup("OCR_LANGUAGE")).unwrap_or("eng".to_string()),
            oem: parse_or(&lookup, "OCR_OEM", 3)?,
            psm: parse_or(&lookup, "OCR_PSM", 6)?,
            preprocess,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Unset keeps the layer default; an empty value or `off`/`none` leaves the
/// variable out of the engine's environment entirely.
fn optional_path<F>(lookup: &F, key: &str, default: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Some(default.to_string()),
        Some(raw) => {
            let raw = raw.trim();
            if raw.is_empty() || ["off", "none"].contains(&raw.to_ascii_lowercase().as_str()) {
                None
            } else {
                Some(raw.to_string())
            }
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(lookup(key)) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

/// Stage setting: unset keeps the default, `off`/`false`/`none` or a value
/// failing `active` disables the stage.
fn parse_toggle<F, T, P>(lookup: &F, key: &str, default: Option<T>, active: P) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    P: Fn(&T) -> bool,
{
    let Some(raw) = non_empty(lookup(key)) else {
        return Ok(default);
    };

    let raw = raw.trim();
    if ["off", "false", "none"].contains(&raw.to_ascii_lowercase().as_str()) {
        return Ok(None);
    }

    let value: T = raw
        .parse()
        .with_context(|| format!("Invalid value for {}: {:?}", key, raw))?;
    Ok(Some(value).filter(|v| active(v)))
}
