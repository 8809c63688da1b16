use crate::adapters::{CsvSink, CsvSource, XlsxSource};
use crate::config::{InputFormat, RunConfig};
use crate::core::pipeline::ShufflePipeline;
use crate::domain::model::RunSummary;
use crate::domain::ports::{Pipeline, RowSource};
use crate::utils::error::{EtlError, Result};
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();

        // Extract
        let data = self.pipeline.extract()?;
        tracing::info!(
            "Extracted {} rows ({:?})",
            data.rows.len(),
            started.elapsed()
        );

        // Transform
        let phase = Instant::now();
        let projected = self.pipeline.transform(data)?;
        tracing::info!(
            "Projected {} rows onto columns {:?} ({:?})",
            projected.rows.len(),
            projected.indexes,
            phase.elapsed()
        );

        // Load
        let phase = Instant::now();
        let summary = self.pipeline.load(projected)?;
        tracing::info!(
            "Wrote {} rows to {} ({:?})",
            summary.rows_written,
            summary.output_file_path.display(),
            phase.elapsed()
        );

        tracing::debug!("Run finished in {:?}", started.elapsed());
        Ok(summary)
    }
}

fn open_source(config: &RunConfig) -> Result<Box<dyn RowSource>> {
    match config.input_format {
        InputFormat::Csv => Ok(Box::new(CsvSource::new(
            &config.input_file_path,
            config.codec()?,
        ))),
        InputFormat::Xlsx => {
            let sheet = config.input_sheet_name.as_deref().ok_or_else(|| {
                EtlError::config(
                    "data_files.input_sheet_name must be defined when data_files.input_file_extension is xlsx",
                )
            })?;
            Ok(Box::new(XlsxSource::new(&config.input_file_path, sheet)))
        }
    }
}

/// 依驗證後的設定執行一次完整的讀取、轉換、寫出
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    tracing::info!(
        "Shuffling {} ({}) into {}",
        config.input_file_path.display(),
        config.input_format,
        config.output_file_path.display()
    );

    let source = open_source(config)?;
    let sink = CsvSink::new(&config.output_file_path, config.codec()?);
    let pipeline = ShufflePipeline::new(source, sink, config.columns.clone());

    EtlEngine::new(pipeline).run()
}
