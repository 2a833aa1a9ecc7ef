pub mod assistant;
pub mod calendar;
pub mod clock;
pub mod conversation;
pub mod store;
