pub mod profile;

pub use profile::{Availability, OpenTo, Profile, Tier};
