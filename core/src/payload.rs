//! Outbound push request formatting
//!
//! The collector expects a bare HTTP/1.1 POST with a JSON body. Numbers use
//! six fixed decimals; the body layout, including its spacing, is what the
//! collector has always received.

use core::fmt::Write;

use heapless::String;

use crate::error::PayloadError;
use crate::frame::SensorReading;

/// Collector path receiving samples
pub const PUSH_PATH: &str = "/api/info/receive";

/// Fits five worst-case `f32` values with six decimals plus the keys
pub const BODY_CAPACITY: usize = 384;

/// Body plus request line and headers
pub const REQUEST_CAPACITY: usize = 640;

/// JSON body for one reading
pub fn format_body(reading: &SensorReading) -> Result<String<BODY_CAPACITY>, PayloadError> {
    let mut body = String::new();
    write!(
        body,
        "{{ \"AirTemperature\": {:.6}, \"AirHumidity\": {:.6}, \"WaterHumidity\": {:.6},  \"AirDewpoint\": {:.6},  \"AirDewpointFast\": {:.6} }}",
        reading.air_temperature,
        reading.air_humidity,
        reading.water_humidity,
        reading.air_dewpoint,
        reading.air_dewpoint_fast,
    )
    .map_err(|_| PayloadError::Overflow)?;
    Ok(body)
}

/// Complete push request for one reading
pub fn format_request(
    host: &str,
    reading: &SensorReading,
) -> Result<String<REQUEST_CAPACITY>, PayloadError> {
    let body = format_body(reading)?;
    let mut request = String::new();
    write!(
        request,
        "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        PUSH_PATH,
        host,
        body.len(),
        body
    )
    .map_err(|_| PayloadError::Overflow)?;
    Ok(request)
}
