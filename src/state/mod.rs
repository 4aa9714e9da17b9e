/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Result sets and the six display slots (results.rs)
/// - The upload/render state machine (controller.rs)

pub mod controller;
pub mod data;
pub mod results;
