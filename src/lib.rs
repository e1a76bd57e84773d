pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::http::{HttpClient, HttpSettings, RetryPolicy};
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{
    endpoints::Endpoints,
    ergast::{EngineSettings, ErgastService, SeasonRaceQuery, SeasonRange},
    etl::EtlEngine,
    pipeline::{ErgastPipeline, Query},
};
pub use utils::error::{EtlError, Result};
