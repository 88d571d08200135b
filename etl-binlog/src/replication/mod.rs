pub mod resolver;
pub mod scanner;
