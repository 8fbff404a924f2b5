pub mod capture;
pub mod pins;
pub mod pwm;

pub use capture::CaptureEvent;
pub use capture::CaptureTimer;
pub use pins::BoardPins;
pub use pwm::PwmTimer;
