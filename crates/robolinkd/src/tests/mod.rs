//! Behavioural suites for the robolink daemon.

mod session_behaviour;
mod support;
