pub mod fare;
pub mod lifecycle;
pub mod matching;
pub mod queue;
