//! Feature-presence matrix for side-by-side package comparison.

use std::collections::HashSet;

use serde::{Serialize, Serializer};

use summit_core::Entity;

use crate::package::{Package, PackageId};
use crate::selection::SelectionSet;

/// Distinct benefit labels across *all* packages, in first-seen order.
///
/// The row axis depends only on the catalog, never on the current selection,
/// so labels stay put while the user toggles packages.
pub fn benefit_rows(packages: &[Package]) -> Vec<String> {
    let mut seen = HashSet::new();
    packages
        .iter()
        .flat_map(|p| p.benefits.iter())
        .filter(|label| seen.insert(label.as_str()))
        .cloned()
        .collect()
}

/// Presence of one benefit in one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Present,
    Absent,
}

impl Cell {
    pub fn from_presence(present: bool) -> Self {
        if present { Cell::Present } else { Cell::Absent }
    }

    pub fn is_present(self) -> bool {
        self == Cell::Present
    }

    pub fn glyph(self) -> char {
        match self {
            Cell::Present => '✓',
            Cell::Absent => '✗',
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_present())
    }
}

/// One row of the matrix: a benefit label and a cell per selected package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenefitRow {
    pub label: String,
    pub cells: Vec<Cell>,
}

/// Comparison table: one column per selected package, one row per benefit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonMatrix {
    pub columns: Vec<PackageId>,
    pub rows: Vec<BenefitRow>,
}

impl ComparisonMatrix {
    /// Build the matrix for `selection` over the full catalog.
    ///
    /// Selected ids that are not in `packages` get no column.
    pub fn build(packages: &[Package], selection: &SelectionSet) -> Self {
        let selected: Vec<&Package> = selection
            .iter()
            .filter_map(|id| packages.iter().find(|p| p.has_id(id)))
            .collect();

        let rows = benefit_rows(packages)
            .into_iter()
            .map(|label| {
                let cells = selected
                    .iter()
                    .map(|p| Cell::from_presence(p.has_benefit(&label)))
                    .collect();
                BenefitRow { label, cells }
            })
            .collect();

        Self {
            columns: selected.iter().map(|p| p.id().clone()).collect(),
            rows,
        }
    }

    pub fn cell(&self, package: &PackageId, label: &str) -> Option<Cell> {
        let col = self.columns.iter().position(|c| c == package)?;
        let row = self.rows.iter().find(|r| r.label == label)?;
        row.cells.get(col).copied()
    }

    pub fn row_labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.label.as_str())
    }

    /// Plain-text rendering, one line per benefit, used in logs and tests.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("Benefit");
        for col in &self.columns {
            out.push('\t');
            out.push_str(col.as_str());
        }
        for row in &self.rows {
            out.push('\n');
            out.push_str(&row.label);
            for cell in &row.cells {
                out.push('\t');
                out.push(cell.glyph());
            }
        }
        out
    }
}
