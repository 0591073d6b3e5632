pub mod echo;
pub mod print;
