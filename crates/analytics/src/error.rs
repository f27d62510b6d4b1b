use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Equity curve is not in chronological order at point {0}")]
    UnorderedEquityCurve(usize),

    #[error("Failed to read equity curve export: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to open equity curve export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record on line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("Monthly result for {year}-{month:02} ({value}) has no f64 representation")]
    UnrepresentableMonth { year: i32, month: u32, value: rust_decimal::Decimal },
}
