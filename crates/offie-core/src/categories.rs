use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::CategoryTag;
use crate::ConfigError;

/// Place types searched when no categories file is present.
const DEFAULT_CATEGORY_TAGS: [&str; 4] = [
    "convenience_store",
    "gas_station",
    "liquor_store",
    "supermarket",
];

#[must_use]
pub fn default_categories() -> Vec<CategoryTag> {
    DEFAULT_CATEGORY_TAGS
        .iter()
        .map(|t| CategoryTag::new(*t))
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesFile {
    #[serde(default)]
    pub categories: Vec<CategoryTag>,
}

/// Load and validate the category tag list from a YAML file.
///
/// A missing file falls back to [`default_categories`]. An empty list is
/// valid and yields searches that complete immediately with no results.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_categories(path: &Path) -> Result<Vec<CategoryTag>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(default_categories());
        }
        Err(e) => {
            return Err(ConfigError::CategoriesFileIo {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    parse_categories(&content)
}

fn parse_categories(content: &str) -> Result<Vec<CategoryTag>, ConfigError> {
    let file: CategoriesFile = serde_yaml::from_str(content)?;
    validate_categories(&file.categories)?;
    Ok(file.categories)
}

fn validate_categories(categories: &[CategoryTag]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for tag in categories {
        let raw = tag.as_str();
        if raw.is_empty() {
            return Err(ConfigError::Validation(
                "category tag must be non-empty".to_string(),
            ));
        }

        if !raw
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "category tag '{raw}' must be lowercase snake_case"
            )));
        }

        if !seen.insert(raw) {
            return Err(ConfigError::Validation(format!(
                "duplicate category tag: '{raw}'"
            )));
        }
    }

    Ok(())
}
