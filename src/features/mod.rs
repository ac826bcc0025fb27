/// Feature layer: reshape, energy ordering, and derived comparison columns.
///
/// ```text
///   Table (long) ──filter──▶ Table (complete rows)
///        │
///        ▼
///   ┌──────────┐
///   │   wide   │  pivot → one row per subject, (field, condition) columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐   ┌──────────┐
///   │ deriver  │◀──│  energy  │  mono conditions sorted by keV
///   └──────────┘   └──────────┘
///        │
///        ▼
///   Table (wide features)
/// ```

pub mod deriver;
pub mod energy;
pub mod stats;
pub mod wide;
