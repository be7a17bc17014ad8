pub mod coerce;
pub mod document;
pub mod normalize;
pub mod record;
