//! Patterns sub-module: the two Singleton variants and the once-cells
//! behind them.

pub mod double_checked;
pub mod singleton;
pub mod unsync_cell;
pub mod unsync_singleton;
