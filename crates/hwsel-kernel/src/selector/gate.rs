/// Decides whether a named driver/permission connection is in place.
///
/// The PCI matcher consults this for every `snap-connections` entry of a
/// requirement. Implementations that talk to the host live outside the
/// kernel.
pub trait ConnectionGate {
    fn is_connected(&self, connection: &str) -> Result<bool, std::io::Error>;
}

/// Treats every connection as present. Used for offline scoring and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllConnected;

impl ConnectionGate for AllConnected {
    fn is_connected(&self, _connection: &str) -> Result<bool, std::io::Error> {
        Ok(true)
    }
}

impl<F> ConnectionGate for F
where
    F: Fn(&str) -> Result<bool, std::io::Error>,
{
    fn is_connected(&self, connection: &str) -> Result<bool, std::io::Error> {
        self(connection)
    }
}
