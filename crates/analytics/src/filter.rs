use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use storelens_core::{AgeGroup, DateRange, Gender, PaymentMethod, TransactionRecord};

/// The active filter set of a page. Empty selections match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub date_range: Option<DateRange>,
    pub categories: BTreeSet<String>,
    pub payment_methods: BTreeSet<PaymentMethod>,
    pub gender: Option<Gender>,
    pub age_groups: BTreeSet<AgeGroup>,
}

impl FilterCriteria {
    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        self.date_range = range;
    }

    pub fn set_categories<I, S>(&mut self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
    }

    pub fn set_payment_methods<I: IntoIterator<Item = PaymentMethod>>(&mut self, methods: I) {
        self.payment_methods = methods.into_iter().collect();
    }

    pub fn set_gender(&mut self, gender: Option<Gender>) {
        self.gender = gender;
    }

    pub fn set_age_groups<I: IntoIterator<Item = AgeGroup>>(&mut self, groups: I) {
        self.age_groups = groups.into_iter().collect();
    }

    pub fn clear(&mut self) {
        *self = FilterCriteria::default();
    }

    pub fn has_active_filters(&self) -> bool {
        self.date_range.is_some()
            || !self.categories.is_empty()
            || !self.payment_methods.is_empty()
            || self.gender.is_some()
            || !self.age_groups.is_empty()
    }

    /// Same selection on every dimension except time.
    pub fn without_date_range(&self) -> Self {
        FilterCriteria {
            date_range: None,
            ..self.clone()
        }
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        if let Some(range) = self.date_range {
            if !record.date.is_some_and(|d| range.contains(d)) {
                return false;
            }
        }
        if !selected(&self.categories, record.category.as_ref()) {
            return false;
        }
        if !selected(&self.payment_methods, record.payment_method.as_ref()) {
            return false;
        }
        if let Some(gender) = &self.gender {
            if record.gender.as_ref() != Some(gender) {
                return false;
            }
        }
        selected(&self.age_groups, record.age_group.as_ref())
    }
}

/// An empty selection passes everything; otherwise the value must be present
/// and selected.
fn selected<T: Ord>(selection: &BTreeSet<T>, value: Option<&T>) -> bool {
    selection.is_empty() || value.is_some_and(|v| selection.contains(v))
}

/// Records matching every active criterion, in their original order.
pub fn apply_filters(
    records: &[TransactionRecord],
    criteria: &FilterCriteria,
) -> Vec<TransactionRecord> {
    if !criteria.has_active_filters() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, rec, scenario};
    use crate::kpi::kpi_summary;
    use storelens_core::Money;

    #[test]
    fn default_criteria_is_identity() {
        let records = scenario();
        let criteria = FilterCriteria::default();
        assert!(!criteria.has_active_filters());
        assert_eq!(apply_filters(&records, &criteria), records);
    }

    #[test]
    fn category_filter_keeps_only_grocery() {
        let records = scenario();
        let mut criteria = FilterCriteria::default();
        criteria.set_categories(["grocery"]);

        let filtered = apply_filters(&records, &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].buyer_id.as_deref(), Some("B"));

        let kpis = kpi_summary(&filtered);
        assert_eq!(kpis.gmv, Money::from_major(30));
        assert_eq!(kpis.order_count, 1);
    }

    #[test]
    fn multi_value_selection_is_or_and_dimensions_are_and() {
        let records = scenario();
        let mut criteria = FilterCriteria::default();
        criteria.set_categories(["grocery", "electronics"]);
        assert_eq!(apply_filters(&records, &criteria).len(), 3);

        criteria.set_payment_methods([PaymentMethod::Alipay]);
        let filtered = apply_filters(&records, &criteria);
        assert_eq!(filtered.len(), 2);
        assert!(filtered
            .iter()
            .all(|r| r.payment_method == Some(PaymentMethod::Alipay)));

        criteria.set_gender(Some(Gender::Female));
        let filtered = apply_filters(&records, &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].buyer_id.as_deref(), Some("B"));
    }

    #[test]
    fn date_range_is_inclusive() {
        let records = scenario();
        let mut criteria = FilterCriteria::default();
        criteria.set_date_range(Some(DateRange::new(date(2024, 1, 5), date(2024, 1, 20))));
        let filtered = apply_filters(&records, &criteria);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].date, Some(date(2024, 1, 5)));
        assert_eq!(filtered[1].date, Some(date(2024, 1, 20)));
    }

    #[test]
    fn undated_record_excluded_only_when_range_active() {
        let mut undated = rec(date(2024, 1, 1), "C", "books", 10, 1);
        undated.date = None;
        let records = vec![undated];

        assert_eq!(apply_filters(&records, &FilterCriteria::default()).len(), 1);

        let mut criteria = FilterCriteria::default();
        criteria.set_categories(["books"]);
        assert_eq!(apply_filters(&records, &criteria).len(), 1);

        criteria.set_date_range(Some(DateRange::new(date(2000, 1, 1), date(2100, 1, 1))));
        assert!(apply_filters(&records, &criteria).is_empty());
    }

    #[test]
    fn unknown_values_pass_when_dimension_unset() {
        let r = rec(date(2024, 3, 1), "D", "never-offered", 5, 1)
            .with_payment_method(PaymentMethod::Other("Barter".into()))
            .with_demographics(Gender::Other("n/a".into()), AgeGroup::Other("unknown".into()));
        let mut criteria = FilterCriteria::default();
        criteria.set_categories(Vec::<String>::new());
        criteria.set_age_groups([]);
        assert_eq!(apply_filters(&[r.clone()], &criteria), vec![r.clone()]);

        criteria.set_age_groups([AgeGroup::From18To24]);
        assert!(apply_filters(&[r], &criteria).is_empty());
    }

    #[test]
    fn filtering_is_idempotent_and_stable() {
        let records = scenario();
        let mut criteria = FilterCriteria::default();
        criteria.set_payment_methods([PaymentMethod::Alipay, PaymentMethod::CreditCard]);
        criteria.set_age_groups([AgeGroup::From25To34, AgeGroup::From35To44]);

        let once = apply_filters(&records, &criteria);
        let twice = apply_filters(&once, &criteria);
        assert_eq!(once, twice);
        // Input order preserved: A(Jan), A(Feb), B(Jan).
        let dates: Vec<_> = once.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![Some(date(2024, 1, 5)), Some(date(2024, 2, 10)), Some(date(2024, 1, 20))]
        );
    }

    #[test]
    fn clear_and_without_date_range() {
        let mut criteria = FilterCriteria::default();
        criteria.set_date_range(Some(DateRange::new(date(2024, 1, 1), date(2024, 1, 31))));
        criteria.set_categories(["books"]);

        let undated = criteria.without_date_range();
        assert_eq!(undated.date_range, None);
        assert!(undated.categories.contains("books"));

        criteria.clear();
        assert_eq!(criteria, FilterCriteria::default());
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let mut criteria = FilterCriteria::default();
        criteria.set_gender(Some(Gender::Male));
        assert!(apply_filters(&[], &criteria).is_empty());
    }
}
