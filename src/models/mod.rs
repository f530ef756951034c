pub mod interval;
pub mod report;

pub use interval::*;
pub use report::*;
