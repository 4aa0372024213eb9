// Command implementations

pub mod generate;
pub mod run;

use anyhow::Result;
use apitest_core::PipelineConfig;
use std::path::Path;

/// The file given with `--config`, or defaults
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path),
        None => Ok(PipelineConfig::default()),
    }
}
