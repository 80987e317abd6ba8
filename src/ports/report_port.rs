//! Report generation port trait.

use crate::domain::error::VoltraderError;
use crate::domain::metrics::Metrics;
use crate::domain::pipeline::PipelineTable;

/// Port for writing pipeline results.
pub trait ReportPort {
    fn write(
        &self,
        table: &PipelineTable,
        metrics: &Metrics,
        output_path: &str,
    ) -> Result<(), VoltraderError>;
}
