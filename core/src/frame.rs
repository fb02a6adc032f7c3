//! Serial frame codec
//!
//! A frame is one sensor sample as sent by the sensor module, 24 bytes with
//! no sync bytes and no checksum:
//!
//! | offset | size | field                       |
//! |--------|------|-----------------------------|
//! | 0      | 4    | result code, `i32` LE       |
//! | 4      | 4    | air temperature, `f32` LE   |
//! | 8      | 4    | air humidity, `f32` LE      |
//! | 12     | 4    | water humidity, `f32` LE    |
//! | 16     | 4    | air dewpoint, `f32` LE      |
//! | 20     | 4    | fast air dewpoint, `f32` LE |
//!
//! Fields are decoded one by one from the byte buffer, so the wire layout
//! does not depend on struct layout, alignment or host endianness. No value
//! validation happens here: both ends must agree on this table.

use crate::error::FrameError;

/// Size of one frame on the wire
pub const FRAME_LEN: usize = 4 + 5 * 4;

/// Result code reported by the sensor module for a valid sample
pub const CODE_SUCCESS: i32 = 0;

/// One environmental sample
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorReading {
    pub air_temperature: f32,
    pub air_humidity: f32,
    pub water_humidity: f32,
    pub air_dewpoint: f32,
    pub air_dewpoint_fast: f32,
}

/// Result code plus the reading it qualifies
///
/// The reading is only exposed when the code is [`CODE_SUCCESS`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputResult {
    code: i32,
    reading: SensorReading,
}

impl InputResult {
    /// Successful sample
    pub const fn ok(reading: SensorReading) -> Self {
        Self {
            code: CODE_SUCCESS,
            reading,
        }
    }

    /// Sensor or link failure reported by the module
    pub const fn failed(code: i32) -> Self {
        Self {
            code,
            reading: SensorReading {
                air_temperature: 0.0,
                air_humidity: 0.0,
                water_humidity: 0.0,
                air_dewpoint: 0.0,
                air_dewpoint_fast: 0.0,
            },
        }
    }

    pub const fn code(&self) -> i32 {
        self.code
    }

    pub const fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }

    /// The reading, if the code says it is meaningful
    pub fn reading(&self) -> Option<&SensorReading> {
        self.is_success().then_some(&self.reading)
    }
}

/// Decode exactly one frame
pub fn decode(bytes: &[u8; FRAME_LEN]) -> InputResult {
    let word = |i: usize| -> [u8; 4] {
        let start = 4 * i;
        [
            bytes[start],
            bytes[start + 1],
            bytes[start + 2],
            bytes[start + 3],
        ]
    };
    let float = |i: usize| f32::from_le_bytes(word(i));

    InputResult {
        code: i32::from_le_bytes(word(0)),
        reading: SensorReading {
            air_temperature: float(1),
            air_humidity: float(2),
            water_humidity: float(3),
            air_dewpoint: float(4),
            air_dewpoint_fast: float(5),
        },
    }
}

/// Decode a frame from a slice that must be exactly [`FRAME_LEN`] long
pub fn decode_slice(bytes: &[u8]) -> Result<InputResult, FrameError> {
    let frame: &[u8; FRAME_LEN] = bytes.try_into().map_err(|_| FrameError::Length {
        expected: FRAME_LEN,
        actual: bytes.len(),
    })?;
    Ok(decode(frame))
}

/// Encode a result in the sensor module's wire layout
pub fn encode(result: &InputResult) -> [u8; FRAME_LEN] {
    let r = &result.reading;
    let words = [
        result.code.to_le_bytes(),
        r.air_temperature.to_le_bytes(),
        r.air_humidity.to_le_bytes(),
        r.water_humidity.to_le_bytes(),
        r.air_dewpoint.to_le_bytes(),
        r.air_dewpoint_fast.to_le_bytes(),
    ];

    let mut out = [0u8; FRAME_LEN];
    for (chunk, word) in out.chunks_exact_mut(4).zip(words.iter()) {
        chunk.copy_from_slice(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: SensorReading = SensorReading {
        air_temperature: 20.5,
        air_humidity: 55.0,
        water_humidity: 40.0,
        air_dewpoint: 10.2,
        air_dewpoint_fast: 10.0,
    };

    #[test]
    fn test_round_trip_is_exact() {
        let decoded = decode(&encode(&InputResult::ok(SAMPLE)));
        assert_eq!(decoded.code(), CODE_SUCCESS);
        assert_eq!(decoded.reading(), Some(&SAMPLE));
    }

    #[test]
    fn test_field_order_on_the_wire() {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[0..4].copy_from_slice(&7i32.to_le_bytes());
        bytes[4..8].copy_from_slice(&1.0f32.to_le_bytes());
        bytes[8..12].copy_from_slice(&2.0f32.to_le_bytes());
        bytes[12..16].copy_from_slice(&3.0f32.to_le_bytes());
        bytes[16..20].copy_from_slice(&4.0f32.to_le_bytes());
        bytes[20..24].copy_from_slice(&5.0f32.to_le_bytes());

        let result = decode(&bytes);
        assert_eq!(result.code(), 7);
        assert_eq!(result.reading, SensorReading {
            air_temperature: 1.0,
            air_humidity: 2.0,
            water_humidity: 3.0,
            air_dewpoint: 4.0,
            air_dewpoint_fast: 5.0,
        });
    }

    #[test]
    fn test_error_code_hides_reading() {
        let mut bytes = encode(&InputResult::ok(SAMPLE));
        bytes[0..4].copy_from_slice(&(-3i32).to_le_bytes());

        let result = decode(&bytes);
        assert!(!result.is_success());
        assert_eq!(result.code(), -3);
        assert!(result.reading().is_none());
    }

    #[test]
    fn test_decode_slice_rejects_wrong_length() {
        let bytes = encode(&InputResult::ok(SAMPLE));
        assert_eq!(
            decode_slice(&bytes[..FRAME_LEN - 1]),
            Err(FrameError::Length {
                expected: FRAME_LEN,
                actual: FRAME_LEN - 1
            })
        );
        assert!(decode_slice(&bytes).is_ok());
    }
}
