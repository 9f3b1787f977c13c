//! HTTP handlers

pub mod features;
pub mod health;
pub mod observation;
pub mod predict;
