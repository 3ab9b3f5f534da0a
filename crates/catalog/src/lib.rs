//! Sponsorship package catalog.
//!
//! Typed packages (validated at the storage boundary), the bounded comparison
//! selection and the derived feature matrix. Pure domain logic: no IO.

pub mod comparison;
pub mod package;
pub mod selection;

pub use comparison::{benefit_rows, BenefitRow, Cell, ComparisonMatrix};
pub use package::{Package, PackageId, PackageRow, RowRejected};
pub use selection::{SelectionSet, Toggle, MAX_SELECTED};
