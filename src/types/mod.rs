pub mod colour;
pub mod draw_order;
pub mod geometry;
pub mod instance;

pub use colour::*;
pub use draw_order::*;
pub use geometry::*;
pub use instance::*;
