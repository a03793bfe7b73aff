//! Bar acquisition port trait.

use crate::domain::error::SigscanError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

/// Source of daily bars. Implementations return bars in the order the source
/// holds them; ordering and completeness are checked by the engine.
///
/// `Send + Sync` so one source can serve a parallel multi-symbol scan.
pub trait DataPort: Send + Sync {
    /// Bars for `code` with dates inside the inclusive `[start, end]` range.
    /// An open bound does not filter on that side.
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, SigscanError>;

    fn list_symbols(&self) -> Result<Vec<String>, SigscanError>;
}
