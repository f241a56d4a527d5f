pub mod ip;

pub use ip::{client_identity, is_valid_ip};
