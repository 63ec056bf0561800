use std::io::{ErrorKind, Read};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};

use crate::drivers::{ByteSource, SensorError};

const READ_CHUNK_BYTES: usize = 1024;

/// Line-oriented sensor on a serial port (Arduino + MPR pressure sensor and friends).
pub struct SerialSource {
    port_name: String,
    port: Option<Box<dyn SerialPort>>,
    timeout: Duration,
}

impl SerialSource {
    /// Opens the port. Failure here is fatal to the session and is never retried.
    pub fn open(port_name: &str, baud_rate: u32, timeout: Duration) -> Result<Self, SensorError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(timeout)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .open()
            .map_err(|e| SensorError::SourceUnavailable(format!("{port_name}: {e}")))?;
        log::info!("opened {port_name} at {baud_rate} baud");
        Ok(Self {
            port_name: port_name.to_string(),
            port: Some(port),
            timeout,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>, SensorError> {
        self.port
            .as_mut()
            .ok_or_else(|| SensorError::SourceUnavailable(format!("{} is closed", self.port_name)))
    }
}

impl ByteSource for SerialSource {
    fn read(&mut self, timeout: Duration) -> Result<Vec<u8>, SensorError> {
        let current = self.timeout;
        let port = self.port_mut()?;
        if current != timeout {
            port.set_timeout(timeout)?;
        }
        self.timeout = timeout;
        let port = self.port_mut()?;
        let mut buf = [0u8; READ_CHUNK_BYTES];
        match port.read(&mut buf) {
            Ok(n) => Ok(buf[..n].to_vec()),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => Ok(Vec::new()),
            Err(e) => Err(SensorError::SourceUnavailable(format!("{}: {e}", self.port_name))),
        }
    }

    fn flush_output(&mut self) -> Result<(), SensorError> {
        self.port_mut()?.clear(ClearBuffer::Output)?;
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            log::info!("closed {}", self.port_name);
        }
    }
}

impl Drop for SerialSource {
    fn drop(&mut self) {
        self.close();
    }
}
