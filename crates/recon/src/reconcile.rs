//! Per-row, per-contractor ranking of effective unit rates.
//!
//! Each data row is reduced to one effective value per contractor slot: the
//! rate if it parses, otherwise the amount divided by the shared quantity.
//! Rows where no contractor has a value are skipped entirely.

use crate::model::{
    CellAnnotation, CellTag, Classification, ColumnRoles, ContractorSlot, Grid, RowOutcome,
    SheetReport, SheetSummary, SlotOutcome,
};
use crate::normalize::to_number;

/// Everything produced for one reconciled sheet.
#[derive(Debug, Clone)]
pub struct SheetComparison {
    pub report: SheetReport,
    pub summary: SheetSummary,
    pub annotations: Vec<CellAnnotation>,
}

/// Effective comparable value and whether it came straight from the rate.
///
/// A missing rate falls back to `amount / qty`, or to the bare amount when
/// the quantity is missing or zero.
pub fn effective_value(rate: Option<f64>, amount: Option<f64>, qty: Option<f64>) -> (Option<f64>, bool) {
    if let Some(r) = rate {
        return (Some(r), true);
    }
    match (amount, qty) {
        (Some(a), Some(q)) if q != 0.0 => (Some(a / q), false),
        (Some(a), _) => (Some(a), false),
        (None, _) => (None, false),
    }
}

/// Collect the contractor slots for one 0-indexed grid row.
pub fn contractor_slots(grid: &Grid, row: usize, roles: &ColumnRoles) -> (Option<f64>, Vec<ContractorSlot>) {
    let cell = |col: usize| to_number(grid.get(row, col - 1));

    let qty = roles.qty_col.and_then(cell);
    let slots = roles
        .rate_cols
        .iter()
        .enumerate()
        .map(|(j, &rate_col)| {
            let amount_col = roles.amount_for(j);
            let (effective, rate_valid) =
                effective_value(cell(rate_col), amount_col.and_then(cell), qty);
            ContractorSlot { rate_col, amount_col, effective, rate_valid }
        })
        .collect();
    (qty, slots)
}

/// Rank the slots of one row. `None` when no slot has a value.
///
/// LOWEST is tested before HIGHEST. When every present value is equal, each
/// of them is LOWEST. Otherwise only the first slot at the minimum (in column
/// order) is LOWEST and later ties are NEITHER, while every slot at the
/// maximum is HIGHEST.
pub fn classify_slots(slots: &[ContractorSlot]) -> Option<Vec<Classification>> {
    let present: Vec<f64> = slots.iter().filter_map(|s| s.effective).collect();
    if present.is_empty() {
        return None;
    }
    let mn = present.iter().copied().fold(f64::INFINITY, f64::min);
    let mx = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let all_equal = mn == mx;

    let mut lowest_taken = false;
    let classes = slots
        .iter()
        .map(|s| match s.effective {
            None => Classification::Missing,
            Some(v) if v == mn => {
                if lowest_taken && !all_equal {
                    Classification::Neither
                } else {
                    lowest_taken = true;
                    Classification::Lowest
                }
            }
            Some(v) if v == mx => Classification::Highest,
            Some(_) => Classification::Neither,
        })
        .collect();
    Some(classes)
}

/// Reconcile one data row. `None` when the row has nothing to compare.
pub fn reconcile_row(grid: &Grid, row: usize, roles: &ColumnRoles) -> Option<RowOutcome> {
    let (quantity, slots) = contractor_slots(grid, row, roles);
    let classes = classify_slots(&slots)?;
    Some(RowOutcome {
        row: row + 1,
        quantity,
        slots: slots
            .into_iter()
            .zip(classes)
            .map(|(slot, classification)| SlotOutcome { slot, classification })
            .collect(),
    })
}

/// Cell tags for one ranked slot: `(rate cell, amount cell)`.
///
/// A derived value (no usable rate) marks the rate cell for attention and
/// leaves the ranking colour to the amount cell.
pub fn slot_tags(outcome: &SlotOutcome) -> (CellTag, Option<CellTag>) {
    let rank_tag = match outcome.classification {
        Classification::Missing => CellTag::Missing,
        Classification::Lowest => CellTag::Lowest,
        Classification::Highest => CellTag::Highest,
        Classification::Neither => CellTag::None,
    };
    let rate_tag = if outcome.classification != Classification::Missing && !outcome.slot.rate_valid {
        CellTag::Attention
    } else {
        rank_tag
    };
    (rate_tag, outcome.slot.amount_col.map(|_| rank_tag))
}

/// Reconcile every row below `header_row` (0-indexed).
pub fn reconcile_sheet(sheet: &str, grid: &Grid, header_row: usize, roles: &ColumnRoles) -> SheetComparison {
    let mut summary = SheetSummary {
        sheet: sheet.to_string(),
        ..Default::default()
    };
    let mut rows = Vec::new();
    let mut annotations = Vec::new();

    for r in (header_row + 1)..grid.row_count() {
        let Some(outcome) = reconcile_row(grid, r, roles) else {
            continue;
        };

        for slot in &outcome.slots {
            match slot.classification {
                Classification::Lowest => summary.lowest += 1,
                Classification::Highest => summary.highest += 1,
                Classification::Missing => summary.missing += 1,
                Classification::Neither => {}
            }

            let (rate_tag, amount_tag) = slot_tags(slot);
            annotations.push(CellAnnotation {
                sheet: sheet.to_string(),
                row: outcome.row,
                col: slot.slot.rate_col,
                tag: rate_tag,
            });
            if let (Some(col), Some(tag)) = (slot.slot.amount_col, amount_tag) {
                annotations.push(CellAnnotation {
                    sheet: sheet.to_string(),
                    row: outcome.row,
                    col,
                    tag,
                });
            }
        }
        rows.push(outcome);
    }

    SheetComparison {
        report: SheetReport {
            sheet: sheet.to_string(),
            header_row: header_row + 1,
            frozen_row: header_row + 2,
            roles: roles.clone(),
            rows,
        },
        summary,
        annotations,
    }
}
