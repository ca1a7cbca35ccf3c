pub mod poll_loop;

pub use poll_loop::{batches, system_clock, CycleReport, PollLoop};
