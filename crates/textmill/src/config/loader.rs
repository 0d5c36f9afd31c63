use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.worker_count == 0 {
        return Err(ConfigError::Validation {
            message: "worker_count must be at least 1".to_string(),
        });
    }

    if config.pages.text_workers == 0 || config.pages.ocr_workers == 0 {
        return Err(ConfigError::Validation {
            message: "page pool sizes must be at least 1".to_string(),
        });
    }

    if config.ocr.language.is_empty() {
        return Err(ConfigError::Validation {
            message: "ocr.language must not be empty".to_string(),
        });
    }

    if config.ocr.dpi == 0 {
        return Err(ConfigError::Validation {
            message: "ocr.dpi must be positive".to_string(),
        });
    }

    if config.ocr.page_seg_mode > 13 {
        return Err(ConfigError::Validation {
            message: format!(
                "ocr.page_seg_mode must be 0-13, got {}",
                config.ocr.page_seg_mode
            ),
        });
    }

    if config.ocr.engine_mode > 3 {
        return Err(ConfigError::Validation {
            message: format!("ocr.engine_mode must be 0-3, got {}", config.ocr.engine_mode),
        });
    }

    Ok(())
}
