pub mod harvest;
pub mod unwrap;

pub use harvest::HarvestJob;
pub use unwrap::UnwrapJob;
