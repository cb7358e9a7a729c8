use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[derive(Debug)]
pub struct Config {
    /// address for the HTTP server to listen on.
    ///  if not set then 0.0.0.0:8080 will be used
    pub listen_addr: Option<SocketAddr>,

    /// seed a demo storage tree and share on startup,
    ///  logging its /qr/{id} link
    pub seed_demo: bool,

    // misc
    pub log_level: tracing::Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8080)),
            seed_demo: false,
            log_level: tracing::Level::INFO,
        }
    }
}
