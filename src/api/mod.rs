pub mod attendance;
pub mod fingerprint;
pub mod reports;
pub mod staff;
