//! Domain records exchanged with the backend API.

pub mod catalog;
pub mod entity;
pub mod order;
pub mod partner;
pub mod sample;
pub mod types;
