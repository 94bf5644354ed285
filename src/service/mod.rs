pub mod attendance;
pub mod fingerprint;
pub mod report;
