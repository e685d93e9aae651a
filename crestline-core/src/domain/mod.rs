//! Domain types: bars, series, records, evaluations, positions, trades,
//! portfolio.

pub mod bar;
pub mod evaluation;
pub mod portfolio;
pub mod position;
pub mod records;
pub mod series;
pub mod trade;

pub use bar::{resample_weekly, PriceBar};
pub use evaluation::SignalEvaluation;
pub use portfolio::{EquityPoint, Portfolio};
pub use position::{Position, PositionStatus};
pub use records::{EarningsRecord, FundamentalRecord, RelativeStrengthRecord};
pub use series::{DateSeries, Dated, SeriesError};
pub use trade::{ExitReason, Trade};
