pub mod money;
pub mod percent;
pub mod period;
pub mod record;

pub use money::Money;
pub use percent::{count_percent, percent, whole_percent, PERCENT_DP};
pub use period::{DateRange, Granularity, YearMonth};
pub use record::{AgeGroup, Gender, PaymentMethod, RecordError, RecordField, TransactionRecord};
