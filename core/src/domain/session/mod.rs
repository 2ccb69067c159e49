pub mod ports;
pub mod services;

pub use ports::*;
pub use services::ClientSession;
