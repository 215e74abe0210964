//! WASM bindings for the lake phosphorus model.
//!
//! `WasmLakeModel` wraps one parameter set for rate plots and fixed point
//! queries. `WasmBifurcationRunner` steps through a loading sweep in batches,
//! and `analyze` runs everything in one call.

mod analysis;
mod bifurcation;
mod system;

pub use analysis::{analyze, default_config};
pub use bifurcation::WasmBifurcationRunner;
pub use system::WasmLakeModel;

