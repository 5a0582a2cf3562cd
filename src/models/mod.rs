// src/models/mod.rs

pub mod answer;
pub mod chat;
pub mod lead;
pub mod question;
pub mod report;
pub mod session;
