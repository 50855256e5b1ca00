#![forbid(unsafe_code)]

pub mod model;
pub mod normalize;
pub mod render;
pub mod time;

pub use normalize::normalize;
pub use time::Clock;
