pub mod actions;
pub mod command;
pub mod config;
pub mod endpoint;
pub mod message;
pub mod navigation;
pub mod reducer;
pub mod replies;
pub mod requests;
pub mod state;
pub mod view;

pub use actions::*;
pub use command::*;
pub use config::*;
pub use endpoint::*;
pub use message::*;
pub use navigation::*;
pub use reducer::*;
pub use replies::*;
pub use requests::*;
pub use state::*;
pub use view::*;
