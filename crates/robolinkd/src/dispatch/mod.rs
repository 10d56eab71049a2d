//! Request dispatch for robot control sessions.
//!
//! A framed request is a JSON object whose `requestid` names the operation:
//!
//! ```json
//! {"requestid":"robot_command","robotid":"r1","commandid":"move","command_params":[1,2]}
//! ```
//!
//! The dispatcher looks the identifier up in a [`HandlerRegistry`], runs the
//! handler against the shared [`crate::master::Master`] and wraps the outcome
//! in an [`Envelope`]:
//!
//! ```json
//! {"result":{"robotid":"r1","commandid":"move","arguments":[1,2],"sequence":1},"requestid":"robot_command"}
//! {"error":"robot_not_found","message":"unknown robot 'r9'"}
//! ```
//!
//! Failures are reported per request and never end the session.

mod dispatcher;
mod envelope;
mod errors;
mod handlers;
mod registry;
mod request;

pub use self::dispatcher::RequestDispatcher;
pub use self::envelope::Envelope;
pub use self::errors::CommandError;
pub use self::registry::{Handler, HandlerRegistry, HandlerRegistryBuilder};
pub use self::request::{Request, RequestParams, decode_frame};
