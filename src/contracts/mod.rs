pub mod strategy;
pub mod wnative;
