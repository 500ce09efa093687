//! Outbound network helpers.

pub mod private_ip;

pub use private_ip::{
    generate_private_ip, generate_private_ip_with, get_ip, range_of, PrivateIpRange,
    PRIVATE_IP_RANGES,
};
