pub mod opinions;
pub mod roster;
pub mod seating;
pub mod strategy;
