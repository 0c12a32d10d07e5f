pub mod lattice;
pub mod offsets;
pub mod region;
pub mod spin;

pub use lattice::Lattice;
pub use offsets::square;
pub use region::Region;
pub use spin::Spin;
