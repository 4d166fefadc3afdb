use crate::error::FrameError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Desired attitude correction in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Setpoint {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// One attitude field as it appears on the wire.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Field {
    Number(f64),
    Text(String),
    Flag(bool),
    Null,
}

#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(default, deserialize_with = "present")]
    r: Option<Field>,
    #[serde(default, deserialize_with = "present")]
    p: Option<Field>,
    #[serde(default, deserialize_with = "present")]
    y: Option<Field>,
}

/// Keeps an explicit `null` apart from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Field>, D::Error>
where
    D: Deserializer<'de>,
{
    Field::deserialize(deserializer).map(Some)
}

fn degrees(field: Option<Field>, name: &str) -> Result<f64, FrameError> {
    let Some(field) = field else {
        return Ok(0.);
    };

    let value = match field {
        Field::Number(n) => n,
        Field::Flag(b) => f64::from(u8::from(b)),
        Field::Text(s) => s.trim().parse::<f64>().map_err(|_| {
            FrameError::Processing(format!("field `{}` is not numeric: {:?}", name, s))
        })?,
        Field::Null => {
            return Err(FrameError::Processing(format!("field `{}` is null", name)))
        }
    };

    if !value.is_finite() {
        return Err(FrameError::Processing(format!(
            "field `{}` is not finite: {}",
            name, value
        )));
    }

    Ok(value)
}

impl Setpoint {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Decode one inbound frame.
    ///
    /// Missing `r`, `p` or `y` fields are zero. Numbers, numeric strings and
    /// booleans are accepted for each field, other fields are ignored.
    ///
    /// ```
    /// use flight_link::Setpoint;
    ///
    /// let setpoint = Setpoint::decode(r#"{"r": 10, "p": "-2.5"}"#).unwrap();
    /// assert_eq!(setpoint, Setpoint::new(10., -2.5, 0.));
    /// ```
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| FrameError::Decode(e.to_string()))?;

        // Structs also deserialize from sequences, only objects are frames
        if !value.is_object() {
            return Err(FrameError::Processing(format!(
                "expected an object, got {}",
                value
            )));
        }

        let frame: Frame = serde_json::from_value(value)
            .map_err(|e| FrameError::Processing(format!("unexpected frame layout: {}", e)))?;

        Ok(Self {
            roll: degrees(frame.r, "r")?,
            pitch: degrees(frame.p, "p")?,
            yaw: degrees(frame.y, "y")?,
        })
    }

    /// Decode a binary frame holding UTF-8 JSON.
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        let text = std::str::from_utf8(bytes).map_err(|e| FrameError::Decode(e.to_string()))?;
        Self::decode(text)
    }

    /// Encode as a wire frame.
    pub fn encode(&self) -> String {
        serde_json::json!({ "r": self.roll, "p": self.pitch, "y": self.yaw }).to_string()
    }
}
