// Model download helper for the NER models.
//
// Each model lives in its own subdirectory of the model directory
// (~/.local/share/biblioscope/models/ner-small on Linux) and needs three
// files from the HuggingFace ONNX export: the quantized model, the tokenizer
// and config.json for the label map.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::model::EntityModel;

pub const MODEL_FILE: &str = "onnx/model_quantized.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const CONFIG_FILE: &str = "config.json";

/// Returns the default directory for storing model files.
/// Uses the platform data directory: ~/.local/share/biblioscope/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("biblioscope")
        .join("models")
}

/// Check whether all files for `model` exist under `base`.
pub fn model_files_present(base: &Path, model: EntityModel) -> bool {
    let dir = model.dir(base);
    [MODEL_FILE, TOKENIZER_FILE, CONFIG_FILE]
        .iter()
        .all(|f| dir.join(f).exists())
}

/// Download one NER model into `base`.
///
/// Skips files that already exist. The model file gets a progress bar.
pub async fn download_model(base: &Path, model: EntityModel) -> Result<()> {
    let dir = model.dir(base);
    std::fs::create_dir_all(dir.join("onnx"))
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    let repo_url = format!("https://huggingface.co/{}/resolve/main", model.hf_repo());
    println!("\nEntity model '{}' ({}):", model, model.hf_repo());

    for (file, large) in [(CONFIG_FILE, false), (TOKENIZER_FILE, false), (MODEL_FILE, true)] {
        let dest = dir.join(file);
        if dest.exists() {
            info!(file, "Model file already exists, skipping");
            println!("  {file} (already exists)");
            continue;
        }
        println!("  Downloading {file}...");
        download_file(&format!("{repo_url}/{file}"), &dest, large).await?;
    }

    Ok(())
}

/// Download a single file from a URL to a local path.
/// If `show_progress` is true, display a progress bar.
async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {url}"))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let pb = show_progress.then(|| match response.content_length() {
        Some(size) => {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .expect("valid template")
                    .progress_chars("=> "),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("    {spinner} {bytes}")
                    .expect("valid template"),
            );
            pb
        }
    });

    let bytes = response
        .bytes()
        .await
        .context("Failed to read response body")?;

    if let Some(ref pb) = pb {
        pb.set_position(bytes.len() as u64);
    }

    std::fs::write(dest, &bytes).with_context(|| format!("Failed to write {}", dest.display()))?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!(url, dest = %dest.display(), "Downloaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_dir_is_under_biblioscope() {
        let dir = default_model_dir();
        let path_str = dir.to_string_lossy();
        assert!(
            path_str.contains("biblioscope") && path_str.contains("models"),
            "Expected path containing biblioscope/models, got: {path_str}"
        );
    }

    #[test]
    fn test_model_files_present_false_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!model_files_present(dir.path(), EntityModel::Small));
    }

    #[test]
    fn test_model_files_present_per_model() {
        let base = tempfile::tempdir().unwrap();
        let dir = EntityModel::Small.dir(base.path());
        std::fs::create_dir_all(dir.join("onnx")).unwrap();
        for file in [MODEL_FILE, TOKENIZER_FILE, CONFIG_FILE] {
            std::fs::write(dir.join(file), b"fake").unwrap();
        }

        assert!(model_files_present(base.path(), EntityModel::Small));
        assert!(!model_files_present(base.path(), EntityModel::Large));
    }
}
