pub mod gas;
pub mod path;
pub mod providers;
pub mod router;
pub mod signer;
