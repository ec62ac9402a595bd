pub mod invoke;
pub mod item;
pub mod token;
