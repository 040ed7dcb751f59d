pub mod category;
pub mod cohort;
pub mod error;
pub mod filter;
pub mod histogram;
pub mod kpi;
pub mod matrix;
pub mod pareto;
pub mod quality;
pub mod segment;
pub mod trend;
pub mod view;

#[cfg(test)]
pub(crate) mod fixtures;

pub use category::{
    category_aov, category_breakdown, category_growth, category_trends, growth_window,
    CategoryAov, CategoryGrowth, CategoryShare, CategoryTrendPoint, CategoryTrends,
};
pub use cohort::{cohort_retention, first_purchase_months, new_vs_returning, BuyerMix, CohortRow};
pub use error::AnalyticsError;
pub use filter::{apply_filters, FilterCriteria};
pub use histogram::{age_distribution, order_value_distribution, BinSpec, HistogramBin};
pub use kpi::{kpi_summary, KpiSummary};
pub use matrix::{cross_tab, Matrix, MatrixCell};
pub use pareto::{buyer_pareto, ParetoCurve, ParetoPoint};
pub use quality::{audit, check_invariants, QualityReport};
pub use segment::{age_segments, gender_segments, payment_segments, Segment};
pub use trend::{daily_activity, trend_series, TrendPoint, TrendSeries};
pub use view::{assemble, AggregationKind, Page, PageView, Version, ViewOptions};
