mod controller;
mod types;

#[cfg(test)]
mod tests;

pub use controller::SessionController;
pub use types::{ScannerState, StopReason};
