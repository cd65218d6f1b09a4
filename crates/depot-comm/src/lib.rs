pub mod dispatch;
pub mod receiver;
pub mod session;
pub mod tcp;
pub mod transport;

pub use dispatch::*;
pub use receiver::*;
pub use session::*;
pub use tcp::TcpTransport;
pub use transport::*;
