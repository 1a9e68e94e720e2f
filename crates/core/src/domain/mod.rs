pub mod quote;
pub mod shipment;
pub mod tracking;
