// src/handlers/mod.rs

pub mod chat;
pub mod lead;
pub mod quiz;
pub mod report;
