pub mod error;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod params;
pub mod scene;
pub mod shape;
pub mod tessellation;

pub use error::{ParaboxError, Result};
