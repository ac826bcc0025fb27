/// Data layer: core table types, completeness filtering, and in-memory interop.
///
/// Architecture:
/// ```text
///  JSON records / arrow RecordBatch
///        │
///        ▼
///   ┌──────────┐
///   │ convert  │  records / batch → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table   │  column names, rows of CellValue
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  drop rows missing a required cell
///   └──────────┘
/// ```

pub mod convert;
pub mod filter;
pub mod model;
