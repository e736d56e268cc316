/// Data layer: table model, loading, trimming and derived signals.
///
/// Architecture:
/// ```text
///  Experiment_N.csv / Test_N.txt / .parquet / store.h5
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  slice    │  drop rows before the start offset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ derived   │  quaternions → yaw / pitch / roll
///   └──────────┘
/// ```

pub mod clean;
pub mod derived;
#[cfg(feature = "hdf5")]
pub mod h5;
pub mod loader;
pub mod model;
pub mod slice;

pub use derived::{compute_all, DerivedSignals};
pub use loader::{load_file, save_csv};
pub use model::{Column, ColumnMap, ColumnReference, Dataset};
pub use slice::{rezero_time, slice_from};
