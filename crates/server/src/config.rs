#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    pub port: u16,
}
