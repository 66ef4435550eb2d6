pub mod client;
pub mod message;
pub mod poller;
pub mod validator;
