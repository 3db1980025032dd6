pub mod checker;
pub mod resolver;
