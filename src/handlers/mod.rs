//! Command handlers and event dispatch.

mod core;
mod dispatch;
pub mod publish;
mod quote;
mod recall;
mod register;
mod utility;

pub use self::core::Registry;
pub use dispatch::Dispatcher;
