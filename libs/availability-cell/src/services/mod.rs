pub mod availability;
pub mod conflicts;
pub mod generator;
pub mod normalize;
pub mod overrides;

pub use availability::AvailabilityService;
