pub mod quote;
pub mod swap;
pub mod trade;
