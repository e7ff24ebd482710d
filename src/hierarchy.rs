//! Interprets a normalized P&L table using the macro / micro / sub-area
//! hierarchy rules and cross-checks the sheet's own NET INCOME row.
//!
//! The sheet is laid out vertically: the first column holds labels, every
//! remaining column holds one period's values. Macro lines are a fixed set
//! of four top-level categories, micro lines are ALL-CAPS subtotal buckets
//! inside a macro, and sub-areas are plain-text leaf rows holding raw
//! inputs. Subtotals are recomputed from the leaves so that data-entry
//! errors in the sheet's own formulas show up as discrepancies instead of
//! being trusted.

use crate::table::{CellValue, NormalizedTable};
use serde::{Deserialize, Serialize};

/// Default absolute tolerance for the NET INCOME cross-check, in currency
/// units.
pub const DEFAULT_TOLERANCE: f64 = 1.0;

const NET_INCOME_LABEL: &str = "net income";

/// The closed set of top-level P&L categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacroKind {
    Revenue,
    CostOfGoodsSold,
    Expenses,
    InterestIncome,
}

impl MacroKind {
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("revenue") {
            Some(MacroKind::Revenue)
        } else if label.eq_ignore_ascii_case("cost of goods sold") {
            Some(MacroKind::CostOfGoodsSold)
        } else if label.eq_ignore_ascii_case("expenses") {
            Some(MacroKind::Expenses)
        } else if label.eq_ignore_ascii_case("interest income") {
            Some(MacroKind::InterestIncome)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MacroKind::Revenue => "Revenue",
            MacroKind::CostOfGoodsSold => "Cost of Goods Sold",
            MacroKind::Expenses => "Expenses",
            MacroKind::InterestIncome => "Interest Income",
        }
    }
}

/// Leaf row: a department/category holding raw input values, one per
/// period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubArea {
    pub label: String,
    pub values: Vec<f64>,
}

/// ALL-CAPS subtotal bucket inside a macro line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroLine {
    pub label: String,
    /// Values on the micro row itself. Used as the total only when the
    /// micro has no sub-area children (a direct value row).
    pub own_values: Vec<f64>,
    pub sub_areas: Vec<SubArea>,
}

impl MicroLine {
    /// Per-period total: sum of sub-areas, or the row's own values when it
    /// has none.
    pub fn totals(&self) -> Vec<f64> {
        if self.sub_areas.is_empty() {
            return self.own_values.clone();
        }
        let mut totals = vec![0.0; self.own_values.len()];
        for sub in &self.sub_areas {
            for (total, value) in totals.iter_mut().zip(&sub.values) {
                *total += value;
            }
        }
        totals
    }
}

/// Top-level category line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroLine {
    pub kind: MacroKind,
    pub label: String,
    /// Values on the macro row itself. Used as the total only when the
    /// macro has no children at all (Interest Income carries its values
    /// directly).
    pub own_values: Vec<f64>,
    pub micro_lines: Vec<MicroLine>,
    /// Plain-text rows sitting directly under the macro with no micro line
    /// open.
    pub direct_rows: Vec<SubArea>,
}

impl MacroLine {
    pub fn totals(&self) -> Vec<f64> {
        if self.micro_lines.is_empty() && self.direct_rows.is_empty() {
            return self.own_values.clone();
        }
        let mut totals = vec![0.0; self.own_values.len()];
        for micro in &self.micro_lines {
            for (total, value) in totals.iter_mut().zip(micro.totals()) {
                *total += value;
            }
        }
        for row in &self.direct_rows {
            for (total, value) in totals.iter_mut().zip(&row.values) {
                *total += value;
            }
        }
        totals
    }
}

/// Consistency verdict for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodCheck {
    pub period: String,
    /// NET INCOME recomputed as the sum of the four macro totals.
    pub computed: f64,
    /// The sheet's own NET INCOME value, when the row is present.
    pub reported: Option<f64>,
    /// Signed difference `reported - computed` (0 when no row is present):
    /// positive when the sheet's own bottom line exceeds the recomputed
    /// one.
    pub discrepancy: f64,
    pub consistent: bool,
}

/// Full rollup of one table plus its validation verdicts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HierarchyReport {
    pub periods: Vec<String>,
    pub macros: Vec<MacroLine>,
    pub checks: Vec<PeriodCheck>,
    /// Labels of rows encountered before any macro line was open. These are
    /// usually header/title rows and contribute nothing to any total.
    pub skipped: Vec<String>,
    /// Structural anomalies in the source data, reported as data rather
    /// than aborting the aggregation.
    pub structural: Vec<String>,
}

/// A label is a micro line when, ignoring whitespace and punctuation, it
/// contains at least one alphabetic character and every alphabetic
/// character is upper-case.
fn is_micro_label(label: &str) -> bool {
    let mut has_alpha = false;
    for ch in label.chars() {
        if ch.is_alphabetic() {
            if !ch.is_uppercase() {
                return false;
            }
            has_alpha = true;
        }
    }
    has_alpha
}

fn period_values(row: &[CellValue]) -> Vec<f64> {
    row.iter().skip(1).map(CellValue::amount).collect()
}

/// Aggregates with the default NET INCOME tolerance.
pub fn aggregate(table: &NormalizedTable) -> HierarchyReport {
    aggregate_with_tolerance(table, DEFAULT_TOLERANCE)
}

/// Builds the macro → micro → sub-area rollup in a single pass over the
/// table and cross-checks each period's NET INCOME within `tolerance`.
///
/// Blank or unparseable cells contribute zero. The pass never fails:
/// unexpected structure is collected into the report's `skipped` and
/// `structural` lists instead.
pub fn aggregate_with_tolerance(table: &NormalizedTable, tolerance: f64) -> HierarchyReport {
    let mut report = HierarchyReport::default();
    if table.columns.is_empty() {
        return report;
    }
    report.periods = table.columns[1..].to_vec();

    let mut reported_net_income: Option<Vec<f64>> = None;
    // Index of the micro line currently open within the last macro.
    let mut current_micro: Option<usize> = None;

    for row in &table.rows {
        let label = match row.first() {
            Some(cell) => cell.as_text().trim().to_string(),
            None => continue,
        };
        let values = period_values(row);

        if label.eq_ignore_ascii_case(NET_INCOME_LABEL) {
            reported_net_income = Some(values);
            continue;
        }

        if let Some(kind) = MacroKind::from_label(&label) {
            if report.periods.is_empty() {
                report.structural.push(format!(
                    "macro line '{}' appears before any period columns exist",
                    label
                ));
                continue;
            }
            report.macros.push(MacroLine {
                kind,
                label,
                own_values: values,
                micro_lines: Vec::new(),
                direct_rows: Vec::new(),
            });
            current_micro = None;
            continue;
        }

        let current_macro = match report.macros.last_mut() {
            Some(m) => m,
            None => {
                // Header/title region before the data starts.
                report.skipped.push(label);
                continue;
            }
        };

        if is_micro_label(&label) {
            current_macro.micro_lines.push(MicroLine {
                label,
                own_values: values,
                sub_areas: Vec::new(),
            });
            current_micro = Some(current_macro.micro_lines.len() - 1);
            continue;
        }

        let sub = SubArea { label, values };
        match current_micro {
            Some(idx) => current_macro.micro_lines[idx].sub_areas.push(sub),
            None => current_macro.direct_rows.push(sub),
        }
    }

    let checks = build_checks(&report, reported_net_income.as_deref(), tolerance);
    report.checks = checks;
    report
}

fn build_checks(
    report: &HierarchyReport,
    reported: Option<&[f64]>,
    tolerance: f64,
) -> Vec<PeriodCheck> {
    let mut computed = vec![0.0; report.periods.len()];
    for macro_line in &report.macros {
        for (total, value) in computed.iter_mut().zip(macro_line.totals()) {
            *total += value;
        }
    }

    report
        .periods
        .iter()
        .enumerate()
        .map(|(idx, period)| {
            let computed = computed[idx];
            let reported = reported.and_then(|values| values.get(idx).copied());
            let discrepancy = match reported {
                Some(value) => value - computed,
                None => 0.0,
            };
            PeriodCheck {
                period: period.clone(),
                computed,
                reported,
                discrepancy,
                consistent: discrepancy.abs() <= tolerance,
            }
        })
        .collect()
}
