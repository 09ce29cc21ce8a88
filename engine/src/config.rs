//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use thiserror::Error;
use uuid::Uuid;

/// Catalog used when the configuration names none
pub const DEFAULT_CATALOG_PATH: &str = "engine/catalog.yaml";

/// Save file used when the configuration names none
pub const DEFAULT_SAVE_PATH: &str = "engine/world.json";

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file",
        default_value = "engine/config.yaml"
    )]
    pub config_file: String,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file",
        default_value = "engine/.env"
    )]
    pub env_file: Option<String>,

    #[arg(short = 's', long = "save", help = "Path to save file, overrides configuration")]
    pub save_file: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: "config.yaml".to_string(),
            env_file: Some(".env".to_string()),
            save_file: None,
            command: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// List every placed part with its subparts and missing value
    Inspect,
    /// Place a fresh, fully stocked part of the given kind
    Make { kind: String },
    /// Split a subpart off a placed composite part
    Split { owner: Uuid, part: Uuid },
    /// Include a placed part in a placed composite part
    Add { owner: Uuid, item: Uuid },
    /// Destroy a placed part and everything it includes
    Destroy { part: Uuid },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub saves: SaveConfig,
}

impl Configuration {
    pub fn load(path: &str) -> Result<Configuration, ConfigError> {
        let conf = serde_yaml::from_reader(std::fs::File::open(path)?)?;
        Ok(conf)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path of the YAML part catalog
    pub path: EnvField<String>,
}

impl CatalogConfig {
    pub fn path(&self) -> &str {
        non_empty_or(&self.path, DEFAULT_CATALOG_PATH)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SaveConfig {
    /// Path of the JSON save file
    pub path: EnvField<String>,
}

impl SaveConfig {
    pub fn path(&self) -> &str {
        non_empty_or(&self.path, DEFAULT_SAVE_PATH)
    }
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() { default } else { value }
}
