mod accountant;
mod active;
mod clock;
mod ticker;

pub use accountant::SessionAccountant;
pub use active::{ActiveTimer, TimerOutcome};
pub use clock::{
    adjust_by_wheel, format_clock, parse_clock_input, ClockMode, ClockState, SessionClock,
    MAX_CLOCK_SECS, WHEEL_STEP_SECS,
};
pub use ticker::Ticker;
