// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Fan curve control daemon.
//!
//! Maps a sensed CPU temperature to a fan speed percentage through a
//! user-defined curve and delivers the result to a microcontroller over
//! serial or HTTP. A small JSON API lets the browser frontend edit and
//! visualize the curve while the delivery loop runs in the background.

pub mod actuator;
pub mod config;
pub mod curve;
pub mod delivery;
pub mod sensor;
pub mod server;
pub mod store;
