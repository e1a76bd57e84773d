pub mod endpoints;
pub mod ergast;
pub mod etl;
pub mod export;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::{ChampionRecord, Dataset, Race, TransformResult};
pub use crate::domain::ports::{ApiRequest, ConfigProvider, Pipeline, RequestExecutor, Storage};
pub use crate::utils::error::Result;
