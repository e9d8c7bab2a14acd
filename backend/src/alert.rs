use log::warn;

/// Receives notable sensor events.
pub trait Alert: Send + Sync {
    fn moisture_low(&self, location: &str, soil_moisture: f64, timestamp: &str);

    fn sensor_fault(&self, location: &str, sensor: &str, attempts: u8);
}

/// Alerts that only go to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlert;

impl Alert for LogAlert {
    fn moisture_low(&self, location: &str, soil_moisture: f64, timestamp: &str) {
        warn!("soil moisture at {location} dropped to {soil_moisture}% ({timestamp}), consider watering");
    }

    fn sensor_fault(&self, location: &str, sensor: &str, attempts: u8) {
        warn!("sensor {sensor} at {location} failed after {attempts} attempts");
    }
}
