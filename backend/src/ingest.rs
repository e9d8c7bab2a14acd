use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDateTime};
use common::packet::{Packet, Payload, Reading};
use log::{debug, info, warn};
use tokio::{net::UdpSocket, signal};

use crate::{
    alert::Alert,
    db::{Db, NewReading},
    utils,
};

pub fn decode(datagram: &[u8]) -> Result<Packet> {
    let packet: Packet = postcard::from_bytes(datagram)?;
    if !packet.header.is_valid() {
        return Err(anyhow!("unexpected packet magic"));
    }
    Ok(packet)
}

/// Stores a reading or raises a fault, alerting on dry soil.
pub fn handle_packet(
    db: &mut Db,
    alert: &dyn Alert,
    moisture_threshold: f64,
    packet: Packet,
    received: NaiveDateTime,
) -> Result<()> {
    let location = packet.header.location;

    match packet.payload {
        Payload::Reading(reading) => {
            let new_reading = to_new_reading(&reading, &location, received);
            db.insert_reading(&new_reading)?;
            info!(
                "[{}] logged {location}: temp={:?}C hum={:?}% moisture={:?}%",
                new_reading.timestamp, reading.temperature, reading.humidity, reading.soil_moisture
            );

            if let Some(moisture) = reading.soil_moisture {
                if moisture < moisture_threshold {
                    alert.moisture_low(&location, moisture, &new_reading.timestamp);
                }
            }
        }
        Payload::SensorFault { sensor, attempts } => {
            alert.sensor_fault(&location, &sensor, attempts);
        }
    }

    Ok(())
}

fn to_new_reading(reading: &Reading, location: &str, received: NaiveDateTime) -> NewReading {
    let taken = reading
        .timestamp_ms
        .and_then(utils::local_from_millis)
        .unwrap_or(received);

    NewReading {
        timestamp: utils::stored_timestamp(taken),
        temperature: reading.temperature,
        humidity: reading.humidity,
        soil_moisture: reading.soil_moisture,
        sensor_location: Some(location.to_owned()),
    }
}

/// Receives sensor datagrams until ctrl-c.
pub async fn listen(
    sock: UdpSocket,
    db: Arc<Mutex<Db>>,
    alert: Arc<dyn Alert>,
    moisture_threshold: f64,
) {
    let mut buf = [0; 1024];
    info!("listening for sensors on {:?}", sock.local_addr());
    loop {
        tokio::select! {
            res = sock.recv_from(&mut buf) => {
                let (len, addr) = match res {
                    Ok(received) => received,
                    Err(e) => {
                        warn!("receive failed: {e}");
                        continue;
                    }
                };
                let packet = match decode(&buf[0..len]) {
                    Ok(packet) => packet,
                    Err(e) => {
                        warn!("dropped datagram from {addr}: {e}");
                        continue;
                    }
                };
                debug!("packet from {addr}: {packet:?}");

                let received = Local::now().naive_local();
                let mut store = match db.lock() {
                    Ok(store) => store,
                    Err(_) => {
                        warn!("database lock poisoned, dropped packet from {addr}");
                        continue;
                    }
                };
                if let Err(e) = handle_packet(&mut store, alert.as_ref(), moisture_threshold, packet, received) {
                    warn!("could not store packet from {addr}: {e:#}");
                }
            }
            Ok(()) = signal::ctrl_c() => { break; }
        }
    }
}
