//! Multimodal journey planner.
//!
//! Answers "leaving from here at this time, how do I best get to each of
//! these places?" by combining street walking with a connection-scan
//! profile search over a timetable.

pub mod domain;
pub mod network;
pub mod planner;
pub mod profile;
pub mod walk;
pub mod web;
