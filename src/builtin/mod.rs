//! Built-in functionality for tagwm.
//!
//! The code in this module is built using the APIs available to users and provides the
//! stock layouts along with actions for key and mouse bindings.
pub mod actions;
pub mod layout;
