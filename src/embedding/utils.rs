use std::io;
use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};

/// Resolves `tokenizer.json` from a model directory or an explicit file path.
pub fn tokenizer_path(model_path: &Path) -> io::Result<std::path::PathBuf> {
    if model_path
        .file_name()
        .is_some_and(|name| name == std::ffi::OsStr::new("tokenizer.json"))
    {
        return Ok(model_path.to_path_buf());
    }
    if model_path.is_dir() {
        return Ok(model_path.join("tokenizer.json"));
    }
    Ok(model_path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Model path has no parent"))?
        .join("tokenizer.json"))
}

/// Loads a tokenizer that truncates to `max_len` tokens.
///
/// Both the bi-encoder and the cross-encoder have fixed position tables; longer inputs
/// would index past them.
pub fn load_tokenizer_with_truncation(model_path: &Path, max_len: usize) -> io::Result<Tokenizer> {
    let path = tokenizer_path(model_path)?;
    let mut tokenizer = Tokenizer::from_file(&path).map_err(io::Error::other)?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    Ok(tokenizer)
}

/// Checks that a model directory carries the files the BERT loaders need.
pub fn check_model_dir(model_dir: &Path) -> Result<(), String> {
    if !model_dir.exists() {
        return Err(format!("model path not found: {}", model_dir.display()));
    }
    for file in ["config.json", "model.safetensors", "tokenizer.json"] {
        if !model_dir.join(file).exists() {
            return Err(format!("missing {} in {}", file, model_dir.display()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tokenizer_path_from_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            tokenizer_path(dir.path()).unwrap(),
            dir.path().join("tokenizer.json")
        );
    }

    #[test]
    fn test_tokenizer_path_explicit_file() {
        let path = Path::new("/models/bge/tokenizer.json");
        assert_eq!(tokenizer_path(path).unwrap(), path.to_path_buf());
    }

    #[test]
    fn test_check_model_dir_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();

        let err = check_model_dir(dir.path()).unwrap_err();
        assert!(err.contains("model.safetensors"));
    }

    #[test]
    fn test_check_model_dir_missing_path() {
        let err = check_model_dir(Path::new("/nonexistent/model")).unwrap_err();
        assert!(err.contains("not found"));
    }
}
