pub mod dispatch;
pub mod generate;
pub mod index;
pub mod pack;
pub mod retrieve;
