//! End-to-end tests of the widget state machine.
//!
//! These drive a [`Controller`](crate::controller::Controller) the way the
//! browser binding does, with a scripted storage service answering the
//! requests it emits.
