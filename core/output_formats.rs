use crate::error::{AppError, Result};
use serde::Serialize;
use std::str::FromStr;

/// Formats the run summary can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl FromStr for SummaryFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(SummaryFormat::Text),
            "json" => Ok(SummaryFormat::Json),
            "yaml" | "yml" => Ok(SummaryFormat::Yaml),
            other => Err(AppError::InvalidArgument(format!(
                "Unsupported summary format '{}'. Use text, json or yaml.",
                other
            ))),
        }
    }
}

pub fn serialize_to_json<T: Serialize>(data: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(data).map_err(AppError::JsonSerialize)
    } else {
        serde_json::to_string(data).map_err(AppError::JsonSerialize)
    }
}

pub fn serialize_to_yaml<T: Serialize>(data: &T) -> Result<String> {
    serde_yml::to_string(data).map_err(AppError::YamlError)
}
