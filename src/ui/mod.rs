pub mod outline;
pub mod preview_diff;
