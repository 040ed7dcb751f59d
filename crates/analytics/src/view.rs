//! Per-page view assembly.
//!
//! A (page, version) pair selects a fixed set of aggregations; only those
//! run. The aggregations themselves never branch on the version.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use storelens_core::{DateRange, TransactionRecord, YearMonth};

use crate::category::{self, CategoryAov, CategoryGrowth, CategoryShare, CategoryTrends};
use crate::cohort::{self, BuyerMix, CohortRow};
use crate::error::AnalyticsError;
use crate::filter::{apply_filters, FilterCriteria};
use crate::histogram::{self, BinSpec, HistogramBin};
use crate::kpi::{kpi_summary, KpiSummary};
use crate::matrix::{cross_tab, Matrix};
use crate::pareto::{buyer_pareto, ParetoCurve};
use crate::quality::check_invariants;
use crate::segment::{self, Segment};
use crate::trend::{daily_activity, trend_series, TrendPoint, TrendSeries};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    #[default]
    V1,
    V2,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::V1 => write!(f, "v1"),
            Version::V2 => write!(f, "v2"),
        }
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v1" => Ok(Version::V1),
            "v2" => Ok(Version::V2),
            other => Err(format!("Unknown version: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Page {
    Dashboard,
    CategoryInsights,
    UserSegments,
    Cohorts,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Dashboard => write!(f, "dashboard"),
            Page::CategoryInsights => write!(f, "categoryInsights"),
            Page::UserSegments => write!(f, "userSegments"),
            Page::Cohorts => write!(f, "cohorts"),
        }
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "dashboard" => Ok(Page::Dashboard),
            "categoryinsights" | "categories" => Ok(Page::CategoryInsights),
            "usersegments" | "segments" => Ok(Page::UserSegments),
            "cohorts" | "cohortanalysis" => Ok(Page::Cohorts),
            other => Err(format!("Unknown page: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregationKind {
    Kpis,
    Trend,
    CategoryBreakdown,
    CategoryPaymentMatrix,
    Calendar,
    AgeDistribution,
    NewVsReturning,
    OrderValueDistribution,
    Pareto,
    CategoryGrowth,
    CategoryTrends,
    CategoryAov,
    GenderSegments,
    AgeSegments,
    PaymentSegments,
    AgePaymentMatrix,
    AgeCategoryMatrix,
    Cohorts,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::Dashboard,
        Page::CategoryInsights,
        Page::UserSegments,
        Page::Cohorts,
    ];

    pub fn aggregations(self, version: Version) -> &'static [AggregationKind] {
        use AggregationKind::*;
        match (self, version) {
            (Page::Dashboard, Version::V1) => &[
                Kpis,
                Trend,
                CategoryBreakdown,
                CategoryPaymentMatrix,
                Calendar,
                AgeDistribution,
            ],
            (Page::Dashboard, Version::V2) => &[
                Kpis,
                Trend,
                NewVsReturning,
                OrderValueDistribution,
                Pareto,
                CategoryGrowth,
            ],
            (Page::CategoryInsights, _) => &[CategoryTrends, CategoryGrowth, CategoryAov],
            (Page::UserSegments, _) => &[
                GenderSegments,
                AgeSegments,
                PaymentSegments,
                AgePaymentMatrix,
                AgeCategoryMatrix,
            ],
            (Page::Cohorts, _) => &[Cohorts],
        }
    }
}

/// Tunables that are not part of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub bins: BinSpec,
    pub growth_window_days: u32,
    pub cohort_horizon: Option<YearMonth>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            bins: BinSpec::default(),
            growth_window_days: category::DEFAULT_GROWTH_WINDOW_DAYS,
            cohort_horizon: None,
        }
    }
}

/// Everything one page needs, with only the selected aggregations filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub page: Page,
    pub version: Version,
    pub record_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpis: Option<KpiSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_breakdown: Option<Vec<CategoryShare>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_payment_matrix: Option<Matrix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<Vec<TrendPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_distribution: Option<Vec<HistogramBin>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_vs_returning: Option<Vec<BuyerMix>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_value_distribution: Option<Vec<HistogramBin>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pareto: Option<ParetoCurve>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_growth: Option<Vec<CategoryGrowth>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_trends: Option<CategoryTrends>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_aov: Option<Vec<CategoryAov>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender_segments: Option<Vec<Segment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_segments: Option<Vec<Segment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_segments: Option<Vec<Segment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_payment_matrix: Option<Matrix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_category_matrix: Option<Matrix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cohorts: Option<Vec<CohortRow>>,
}

impl PageView {
    fn empty(page: Page, version: Version, record_count: usize) -> Self {
        PageView {
            page,
            version,
            record_count,
            kpis: None,
            trend: None,
            category_breakdown: None,
            category_payment_matrix: None,
            calendar: None,
            age_distribution: None,
            new_vs_returning: None,
            order_value_distribution: None,
            pareto: None,
            category_growth: None,
            category_trends: None,
            category_aov: None,
            gender_segments: None,
            age_segments: None,
            payment_segments: None,
            age_payment_matrix: None,
            age_category_matrix: None,
            cohorts: None,
        }
    }
}

fn growth(
    history: &[TransactionRecord],
    criteria: &FilterCriteria,
    range: Option<DateRange>,
    options: &ViewOptions,
) -> Vec<CategoryGrowth> {
    let base = apply_filters(history, &criteria.without_date_range());
    match category::growth_window(&base, range, options.growth_window_days) {
        Some(window) => category::category_growth(&base, window),
        None => Vec::new(),
    }
}

/// Filters `history` by `criteria` and runs the aggregations `page` shows
/// in `version`.
///
/// Fails only when the collection breaks a value invariant or a cohort
/// starts after the configured horizon.
pub fn assemble(
    page: Page,
    version: Version,
    history: &[TransactionRecord],
    criteria: &FilterCriteria,
    options: &ViewOptions,
) -> Result<PageView, AnalyticsError> {
    check_invariants(history)?;

    let filtered = apply_filters(history, criteria);
    let range = criteria.date_range;
    let mut view = PageView::empty(page, version, filtered.len());

    for kind in page.aggregations(version) {
        match kind {
            AggregationKind::Kpis => view.kpis = Some(kpi_summary(&filtered)),
            AggregationKind::Trend => view.trend = Some(trend_series(&filtered, range)),
            AggregationKind::CategoryBreakdown => {
                view.category_breakdown = Some(category::category_breakdown(&filtered))
            }
            AggregationKind::CategoryPaymentMatrix => {
                view.category_payment_matrix = Some(cross_tab(
                    &filtered,
                    |r| r.category.clone(),
                    |r| r.payment_method.clone(),
                ))
            }
            AggregationKind::Calendar => view.calendar = Some(daily_activity(&filtered, range)),
            AggregationKind::AgeDistribution => {
                view.age_distribution = Some(histogram::age_distribution(&filtered))
            }
            AggregationKind::NewVsReturning => {
                view.new_vs_returning = Some(cohort::new_vs_returning(history, &filtered))
            }
            AggregationKind::OrderValueDistribution => {
                view.order_value_distribution =
                    Some(histogram::order_value_distribution(&filtered, options.bins))
            }
            AggregationKind::Pareto => view.pareto = Some(buyer_pareto(&filtered)),
            AggregationKind::CategoryGrowth => {
                view.category_growth = Some(growth(history, criteria, range, options))
            }
            AggregationKind::CategoryTrends => {
                view.category_trends = Some(category::category_trends(&filtered, range))
            }
            AggregationKind::CategoryAov => {
                view.category_aov = Some(category::category_aov(&filtered))
            }
            AggregationKind::GenderSegments => {
                view.gender_segments = Some(segment::gender_segments(&filtered))
            }
            AggregationKind::AgeSegments => {
                view.age_segments = Some(segment::age_segments(&filtered))
            }
            AggregationKind::PaymentSegments => {
                view.payment_segments = Some(segment::payment_segments(&filtered))
            }
            AggregationKind::AgePaymentMatrix => {
                view.age_payment_matrix = Some(cross_tab(
                    &filtered,
                    |r| r.age_group.clone(),
                    |r| r.payment_method.clone(),
                ))
            }
            AggregationKind::AgeCategoryMatrix => {
                view.age_category_matrix = Some(cross_tab(
                    &filtered,
                    |r| r.age_group.clone(),
                    |r| r.category.clone(),
                ))
            }
            AggregationKind::Cohorts => {
                view.cohorts = Some(cohort::cohort_retention(
                    history,
                    &filtered,
                    options.cohort_horizon,
                )?)
            }
        }
    }

    tracing::debug!(%page, %version, records = view.record_count, "page view assembled");
    Ok(view)
}
