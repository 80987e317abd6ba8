//! Data access port trait.

use crate::domain::error::VoltraderError;
use crate::domain::ohlc::Bar;
use chrono::NaiveDateTime;

pub trait DataPort {
    /// Load the full bar series, sorted by timestamp.
    fn load_bars(&self) -> Result<Vec<Bar>, VoltraderError>;

    /// First timestamp, last timestamp, and bar count of the series, or
    /// `None` when the source is empty.
    fn data_range(&self) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, VoltraderError> {
        let bars = self.load_bars()?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.time, last.time, bars.len())),
            _ => None,
        })
    }
}
