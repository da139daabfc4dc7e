pub mod analyze;
pub mod model;

pub use analyze::{analyze, Edge, EdgeKind, Report};
pub use model::{load_raw_bin, Image};
