pub mod allocation;
pub mod allocator;
pub mod controller;

pub use allocation::{AllocationDegeneracy, AllocationMatrix};
pub use allocator::{ControlAllocator, ControlGains};
pub use controller::{Controller, FixedCommand};
