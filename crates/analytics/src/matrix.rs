use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use storelens_core::{Money, TransactionRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixCell {
    pub row: String,
    pub column: String,
    pub orders: usize,
    pub gmv: Money,
}

/// A dense cross tabulation for heatmaps: every (row, column) pair that
/// occurs on either axis has a cell, zero when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Matrix {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: Vec<MatrixCell>,
}

impl Matrix {
    pub fn cell(&self, row: &str, column: &str) -> Option<&MatrixCell> {
        self.cells
            .iter()
            .find(|c| c.row == row && c.column == column)
    }
}

/// Order count and gmv per pair of attributes. Axes are sorted by the key's
/// own ordering; records missing either attribute are skipped.
pub fn cross_tab<R, C, FR, FC>(records: &[TransactionRecord], row_key: FR, column_key: FC) -> Matrix
where
    R: Ord + Display,
    C: Ord + Display,
    FR: Fn(&TransactionRecord) -> Option<R>,
    FC: Fn(&TransactionRecord) -> Option<C>,
{
    let mut rows = BTreeSet::new();
    let mut columns = BTreeSet::new();
    let mut totals: BTreeMap<(usize, usize), (usize, Money)> = BTreeMap::new();
    let mut pairs = Vec::new();
    let mut skipped = 0usize;

    for r in records {
        match (row_key(r), column_key(r)) {
            (Some(row), Some(column)) => pairs.push((row, column, r.amount.unwrap_or_default())),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "matrix: records missing an axis attribute");
    }

    for (row, column, _) in &pairs {
        rows.insert(row);
        columns.insert(column);
    }
    let rows: Vec<&R> = rows.into_iter().collect();
    let columns: Vec<&C> = columns.into_iter().collect();

    for (row, column, amount) in &pairs {
        // Both keys were inserted above.
        let (Ok(ri), Ok(ci)) = (rows.binary_search(&row), columns.binary_search(&column)) else {
            continue;
        };
        let slot = totals.entry((ri, ci)).or_insert((0, Money::zero()));
        slot.0 += 1;
        slot.1 += *amount;
    }

    let mut cells = Vec::with_capacity(rows.len() * columns.len());
    for (ri, row) in rows.iter().enumerate() {
        for (ci, column) in columns.iter().enumerate() {
            let (orders, gmv) = totals.get(&(ri, ci)).copied().unwrap_or((0, Money::zero()));
            cells.push(MatrixCell {
                row: row.to_string(),
                column: column.to_string(),
                orders,
                gmv,
            });
        }
    }

    Matrix {
        rows: rows.iter().map(|r| r.to_string()).collect(),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::scenario;

    #[test]
    fn dense_grid_with_zero_cells() {
        let m = cross_tab(&scenario(), |r| r.category.clone(), |r| r.payment_method.clone());
        assert_eq!(m.rows, vec!["electronics", "grocery"]);
        assert_eq!(m.columns, vec!["Credit Card", "Alipay"]);
        assert_eq!(m.cells.len(), 4);

        let cell = m.cell("electronics", "Alipay").unwrap();
        assert_eq!(cell.orders, 1);
        assert_eq!(cell.gmv, Money::from_major(50));

        let empty = m.cell("grocery", "Credit Card").unwrap();
        assert_eq!(empty.orders, 0);
        assert!(empty.gmv.is_zero());
    }

    #[test]
    fn records_missing_an_axis_are_skipped() {
        let mut records = scenario();
        records[2].payment_method = None;
        let m = cross_tab(&records, |r| r.category.clone(), |r| r.payment_method.clone());
        let total: usize = m.cells.iter().map(|c| c.orders).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn empty_input_gives_empty_matrix() {
        let m = cross_tab(&[], |r| r.age_group.clone(), |r| r.category.clone());
        assert_eq!(m, Matrix::default());
    }
}
