// sensor -> backend datagrams, postcard encoded
pub const MAGIC: &str = "PLNT";

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Header {
    magic: String,
    pub location: String,
}

impl Header {
    pub fn with_location(location: &str) -> Self {
        Self {
            magic: MAGIC.to_string(),
            location: location.to_string(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Packet {
    pub header: Header,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Payload {
    Reading(Reading),
    /// The sensor gave up after its bounded retries.
    SensorFault { sensor: String, attempts: u8 },
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Reading {
    pub timestamp_ms: Option<u64>, // ms since epoch, None = stamp on receipt
    pub temperature: Option<f64>,   // °C
    pub humidity: Option<f64>,      // percent
    pub soil_moisture: Option<f64>, // percent
}
