use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use domain::Error;
use image::GrayImage;
use tokio::process::Command;
use ulid::Ulid;

use crate::{config::OcrConfig, preprocess::encode_png};

/// Anything that can turn a processed image into plain text.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &GrayImage) -> Result<String, Error>;
}

/// The Tesseract command-line engine shipped in the Lambda layer.
#[derive(Clone, Debug)]
pub struct Tesseract {
    cmd: PathBuf,
    library_path: Option<String>,
    tessdata_prefix: Option<String>,
    language: String,
    oem: u8,
    psm: u8,
}

impl Tesseract {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            cmd: config.tesseract_cmd.clone(),
            library_path: config.library_path.clone(),
            tessdata_prefix: config.tessdata_prefix.clone(),
            language: config.language.clone(),
            oem: config.oem,
            psm: config.psm,
        }
    }

    fn args(&self, input: &Path) -> Vec<OsString> {
        vec![
            input.as_os_str().to_owned(),
            "stdout".into(),
            "--oem".into(),
            self.oem.to_string().into(),
            "--psm".into(),
            self.psm.to_string().into(),
            "-l".into(),
            self.language.clone().into(),
        ]
    }

    fn command(&self, input: &Path) -> Command {
        let mut command = Command::new(&self.cmd);
        command
            .args(self.args(input))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Scoped to the child; the lambda's own environment is left untouched.
        if let Some(path) = &self.library_path {
            command.env("LD_LIBRARY_PATH", path);
        }
        if let Some(prefix) = &self.tessdata_prefix {
            command.env("TESSDATA_PREFIX", prefix);
        }
        command
    }
}

#[async_trait]
impl TextRecognizer for Tesseract {
    async fn recognize(&self, image: &GrayImage) -> Result<String, Error> {
        let png = encode_png(image)?;

        let input = std::env::temp_dir().join(format!("ocr-{}.png", Ulid::new()));
        tokio::fs::write(&input, &png)
            .await
            .map_err(|e| Error::engine(format!("Failed to stage image for OCR: {}", e)))?;

        tracing::info!(
            "Running {} on {}x{} image",
            self.cmd.display(),
            image.width(),
            image.height()
        );
        let output = self.command(&input).output().await;

        if let Err(e) = tokio::fs::remove_file(&input).await {
            tracing::warn!("Failed to remove {}: {}", input.display(), e);
        }

        let output = output.map_err(|e| {
            Error::engine(format!("Failed to execute {}: {}", self.cmd.display(), e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::engine(format!(
                "{} exited with {}: {}",
                self.cmd.display(),
                output.status,
                tail(stderr.trim(), 512)
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn tail(s: &str, max_chars: usize) -> &str {
    let count = s.chars().count();
    if count <= max_chars {
        return s;
    }
    let start = s
        .char_indices()
        .nth(count - max_chars)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &s[start..]
}
