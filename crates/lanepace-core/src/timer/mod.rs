mod bank;
mod clock;
mod lane;
mod mode;
mod scheduler;

pub use bank::{BankTick, LaneTimerBank, DEFAULT_LANE_COUNT, DEFAULT_PRE_WARNING};
pub use clock::{Clock, DeltaTracker, ManualClock, SystemClock};
pub use lane::{LaneState, LaneTimer, PaceStatus, DEFAULT_PACE_TOLERANCE};
pub use mode::TimerMode;
pub use scheduler::{TickScheduler, DEFAULT_TICK_INTERVAL, FAST_TICK_INTERVAL};
