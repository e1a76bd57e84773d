use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load in order; returns the output location.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting ETL process");

        let dataset = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} records", dataset.len());

        let transformed = self.pipeline.transform(dataset).await?;
        tracing::info!("🔄 Rendered {} records", transformed.record_count);

        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("📁 Output saved to: {}", output_path);

        Ok(output_path)
    }
}
