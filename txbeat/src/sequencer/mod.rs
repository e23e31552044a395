pub mod scheduler;
pub mod timing;
pub mod transport;

pub use scheduler::{ClockScheduler, Scheduler, TimerHandle, VirtualScheduler};
pub use timing::Tempo;
pub use transport::Transport;
