pub(crate) mod error;
pub(crate) mod image;
pub(crate) mod math;
pub(crate) mod rng;
