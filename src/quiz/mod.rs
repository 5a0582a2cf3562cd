// src/quiz/mod.rs

pub mod catalog;
pub mod flow;
pub mod ranking;
pub mod rest;
pub mod session;

pub use flow::{AutoAdvance, FlowError, QuizFlow, Step};
pub use session::{QuizSession, SessionStore};
