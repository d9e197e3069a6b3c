pub mod availability;
pub mod booking;
pub mod date_range;
pub mod equipment;
pub mod pricing;
pub mod resource;
