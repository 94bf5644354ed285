pub mod fingerprint_cache;
