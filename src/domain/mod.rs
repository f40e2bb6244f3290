pub mod properties;
pub mod ticket;
