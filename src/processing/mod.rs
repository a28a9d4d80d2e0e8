//! Signal conditioning for the platform sensor streams

pub mod smoother;
pub mod throttle;

pub use smoother::PositionSmoother;
pub use throttle::Throttle;
