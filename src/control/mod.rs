pub mod estimator;
pub mod reading;

pub use estimator::CaptureChannel;
pub use reading::ReadingCell;
