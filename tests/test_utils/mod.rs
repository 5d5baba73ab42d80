pub mod collectors;

pub use collectors::{TcpCollector, UdpCollector};
