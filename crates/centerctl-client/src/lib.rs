pub mod client;
pub mod connection;
pub mod control_center;
pub mod information_center;

pub use client::ServiceClient;
pub use connection::Connection;
pub use control_center::ControlCenterClient;
pub use information_center::InformationCenterClient;
