//! Per-type encode/decode.
//!
//! [`TypeCodec`] is the only place that knows the byte layout of each
//! [`WireType`]. It validates a value completely against its wire type before
//! the value's bytes are kept: if anything fails halfway through (an array
//! element out of range, say), the cursor is rolled back to where the field
//! started.

use crate::compress::{deflate, inflate};
use crate::obfuscate::scramble;
use crate::{
    ByteCursor, ByteReader, CodecConfig, Color3, DecodeError, ValidationError,
    Value, Vector2, Vector3, WireType,
};

/// Largest length a 3-byte prefix can carry.
const MAX_U24: usize = 0xFF_FFFF;

/// Encodes and decodes single values according to their wire type.
///
/// Holds only configuration, so one codec can be shared freely between
/// threads.
#[derive(Debug, Clone, Default)]
pub struct TypeCodec {
    config: CodecConfig,
}

impl TypeCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Appends `value` encoded as `wire` and returns the number of bytes
    /// written.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] if the value's type, range or size
    /// doesn't fit `wire`. The cursor is left exactly as it was.
    pub fn encode(
        &self,
        cursor: &mut ByteCursor,
        value: &Value,
        wire: &WireType,
    ) -> Result<usize, ValidationError> {
        let start = cursor.len();
        match self.write_value(cursor, value, wire) {
            Ok(()) => Ok(cursor.len() - start),
            Err(e) => {
                cursor.truncate(start);
                Err(e)
            }
        }
    }

    /// Decodes one `wire` value starting at `offset`.
    ///
    /// Returns the value and the number of bytes it occupied.
    pub fn decode(
        &self,
        bytes: &[u8],
        offset: usize,
        wire: &WireType,
    ) -> Result<(Value, usize), DecodeError> {
        let mut reader = ByteReader::at(bytes, offset);
        let value = self.read_value(&mut reader, wire)?;
        Ok((value, reader.position() - offset))
    }

    /// Decodes one `wire` value at the reader's position, advancing it.
    pub fn read_value(
        &self,
        reader: &mut ByteReader<'_>,
        wire: &WireType,
    ) -> Result<Value, DecodeError> {
        let value = match wire {
            WireType::Array(element) => {
                let count = usize::from(reader.read_u16_be()?);
                // Don't trust the count for the allocation; each element is
                // at least one byte.
                let mut items = Vec::with_capacity(count.min(reader.remaining()));
                for _ in 0..count {
                    items.push(self.read_value(reader, element)?);
                }
                Value::Array(items)
            }
            WireType::Boolean => Value::Bool(reader.read_u8()? != 0),
            WireType::UInt8 => Value::Int(reader.read_u8()?.into()),
            WireType::UInt16 => Value::Int(reader.read_u16()?.into()),
            WireType::UInt24 => Value::Int(reader.read_u24()?.into()),
            WireType::UInt32 => Value::Int(reader.read_u32()?.into()),
            WireType::Int8 => Value::Int(reader.read_i8()?.into()),
            WireType::Int16 => Value::Int(reader.read_i16()?.into()),
            WireType::Int32 => Value::Int(reader.read_i32()?.into()),
            WireType::Float32 => Value::Float(reader.read_f32()?.into()),
            WireType::Float64 => Value::Float(reader.read_f64()?),
            WireType::Vector2 => Value::Vector2(Vector2::new(
                reader.read_f32()?,
                reader.read_f32()?,
            )),
            WireType::Vector2Int16 => Value::Vector2(Vector2::new(
                reader.read_i16()?.into(),
                reader.read_i16()?.into(),
            )),
            WireType::Vector3 => Value::Vector3(Vector3::new(
                reader.read_f32()?,
                reader.read_f32()?,
                reader.read_f32()?,
            )),
            WireType::Vector3Int16 => Value::Vector3(Vector3::new(
                reader.read_i16()?.into(),
                reader.read_i16()?.into(),
                reader.read_i16()?.into(),
            )),
            WireType::Color3 => {
                let [r, g, b] = [reader.read_u8()?, reader.read_u8()?, reader.read_u8()?];
                Value::Color3(Color3::from_rgb(r, g, b))
            }
            WireType::ObjectId => Value::Str(hex::encode(reader.read_bytes(12)?)),
            WireType::Byte => Value::Bytes(vec![reader.read_u8()?]),
            WireType::String8 => read_fixed_string(reader, wire, 8)?,
            WireType::String16 => read_fixed_string(reader, wire, 16)?,
            WireType::String32 => read_fixed_string(reader, wire, 32)?,
            WireType::String64 => read_fixed_string(reader, wire, 64)?,
            WireType::DynamicString8 => {
                let start = reader.position();
                let len = usize::from(reader.read_u8()?);
                let raw = reader.read_bytes(len)?;
                Value::Str(utf8(raw.to_vec(), wire, start)?)
            }
            WireType::LongString => {
                let start = reader.position();
                let raw = read_prefixed(reader)?;
                Value::Str(utf8(scramble(raw), wire, start)?)
            }
            WireType::ZLibCompressedString => {
                let start = reader.position();
                let raw = read_prefixed(reader)?;
                let inflated = inflate(raw, self.config.max_message_size)?;
                Value::Str(utf8(scramble(&inflated), wire, start)?)
            }
            WireType::JsonObject => {
                let raw = read_prefixed(reader)?;
                let inflated = inflate(raw, self.config.max_message_size)?;
                let json: serde_json::Value = serde_json::from_slice(&scramble(&inflated))?;
                if !(json.is_object() || json.is_array()) {
                    return Err(DecodeError::NotAJsonContainer(json_kind(&json)));
                }
                Value::Json(json)
            }
        };
        Ok(value)
    }

    fn write_value(
        &self,
        cursor: &mut ByteCursor,
        value: &Value,
        wire: &WireType,
    ) -> Result<(), ValidationError> {
        match wire {
            WireType::Array(element) => {
                let Value::Array(items) = value else {
                    return Err(mismatch(wire, "array", value));
                };
                let count = u16::try_from(items.len()).map_err(|_| {
                    ValidationError::TooLong {
                        wire: wire.clone(),
                        len: items.len(),
                        max: usize::from(u16::MAX),
                    }
                })?;
                cursor.write_u16_be(count);
                for item in items {
                    self.write_value(cursor, item, element)?;
                }
            }
            WireType::Boolean => {
                let flag = value.as_bool().ok_or_else(|| mismatch(wire, "boolean", value))?;
                cursor.write_u8(u8::from(flag));
            }
            WireType::UInt8 => cursor.write_u8(integer(wire, value, 0, 0xFF)? as u8),
            WireType::UInt16 => cursor.write_u16(integer(wire, value, 0, 0xFFFF)? as u16),
            WireType::UInt24 => cursor.write_u24(integer(wire, value, 0, 0xFF_FFFF)? as u32),
            WireType::UInt32 => {
                cursor.write_u32(integer(wire, value, 0, i64::from(u32::MAX))? as u32);
            }
            WireType::Int8 => cursor.write_i8(integer(wire, value, -128, 127)? as i8),
            WireType::Int16 => {
                cursor.write_i16(integer(wire, value, i16::MIN.into(), i16::MAX.into())? as i16);
            }
            WireType::Int32 => {
                cursor.write_i32(integer(wire, value, i32::MIN.into(), i32::MAX.into())? as i32);
            }
            WireType::Float32 => {
                let number = value.as_f64().ok_or_else(|| mismatch(wire, "number", value))?;
                cursor.write_f32(number as f32);
            }
            WireType::Float64 => {
                let number = value.as_f64().ok_or_else(|| mismatch(wire, "number", value))?;
                cursor.write_f64(number);
            }
            WireType::Vector2 => {
                let Value::Vector2(v) = value else {
                    return Err(mismatch(wire, "Vector2", value));
                };
                cursor.write_f32(v.x);
                cursor.write_f32(v.y);
            }
            WireType::Vector2Int16 => {
                let Value::Vector2(v) = value else {
                    return Err(mismatch(wire, "Vector2", value));
                };
                let [x, y] = [floored_i16(wire, v.x)?, floored_i16(wire, v.y)?];
                cursor.write_i16(x);
                cursor.write_i16(y);
            }
            WireType::Vector3 => {
                let Value::Vector3(v) = value else {
                    return Err(mismatch(wire, "Vector3", value));
                };
                cursor.write_f32(v.x);
                cursor.write_f32(v.y);
                cursor.write_f32(v.z);
            }
            WireType::Vector3Int16 => {
                let Value::Vector3(v) = value else {
                    return Err(mismatch(wire, "Vector3", value));
                };
                let [x, y, z] = [
                    floored_i16(wire, v.x)?,
                    floored_i16(wire, v.y)?,
                    floored_i16(wire, v.z)?,
                ];
                cursor.write_i16(x);
                cursor.write_i16(y);
                cursor.write_i16(z);
            }
            WireType::Color3 => {
                let Value::Color3(c) = value else {
                    return Err(mismatch(wire, "Color3", value));
                };
                let channels = [channel(wire, c.r)?, channel(wire, c.g)?, channel(wire, c.b)?];
                cursor.write_bytes(&channels);
            }
            WireType::ObjectId => {
                let text = value.as_str().ok_or_else(|| mismatch(wire, "string", value))?;
                let raw = match hex::decode(text) {
                    Ok(raw) if raw.len() == 12 => raw,
                    _ => return Err(ValidationError::InvalidObjectId(text.to_owned())),
                };
                cursor.write_bytes(&raw);
            }
            WireType::Byte => {
                let raw = match value {
                    Value::Bytes(raw) => raw.as_slice(),
                    Value::Str(s) => s.as_bytes(),
                    other => return Err(mismatch(wire, "single byte", other)),
                };
                let [byte] = raw else {
                    return Err(ValidationError::NotASingleByte(raw.len()));
                };
                cursor.write_u8(*byte);
            }
            WireType::String8 => write_fixed_string(cursor, wire, value, 8)?,
            WireType::String16 => write_fixed_string(cursor, wire, value, 16)?,
            WireType::String32 => write_fixed_string(cursor, wire, value, 32)?,
            WireType::String64 => write_fixed_string(cursor, wire, value, 64)?,
            WireType::DynamicString8 => {
                let text = value.as_str().ok_or_else(|| mismatch(wire, "string", value))?;
                let len = u8::try_from(text.len()).map_err(|_| ValidationError::TooLong {
                    wire: wire.clone(),
                    len: text.len(),
                    max: usize::from(u8::MAX),
                })?;
                cursor.write_u8(len);
                cursor.write_bytes(text.as_bytes());
            }
            WireType::LongString => {
                let text = value.as_str().ok_or_else(|| mismatch(wire, "string", value))?;
                write_prefixed(cursor, wire, &scramble(text.as_bytes()))?;
            }
            WireType::ZLibCompressedString => {
                let text = value.as_str().ok_or_else(|| mismatch(wire, "string", value))?;
                let packed = deflate(&scramble(text.as_bytes()), self.config.compression_level)?;
                write_prefixed(cursor, wire, &packed)?;
            }
            WireType::JsonObject => {
                let Value::Json(json) = value else {
                    return Err(mismatch(wire, "JSON", value));
                };
                if !(json.is_object() || json.is_array()) {
                    return Err(ValidationError::NotAJsonContainer(json_kind(json)));
                }
                let text = serde_json::to_vec(json)?;
                let packed = deflate(&scramble(&text), self.config.compression_level)?;
                write_prefixed(cursor, wire, &packed)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn mismatch(wire: &WireType, expected: &'static str, found: &Value) -> ValidationError {
    ValidationError::TypeMismatch {
        wire: wire.clone(),
        expected,
        found: found.type_name(),
    }
}

/// Accepts `Int`, or a finite `Float` with no fractional part.
fn integer(wire: &WireType, value: &Value, min: i64, max: i64) -> Result<i64, ValidationError> {
    let out_of_range = |value: f64| ValidationError::OutOfRange {
        wire: wire.clone(),
        value,
        min: min as f64,
        max: max as f64,
    };
    match *value {
        Value::Int(n) if (min..=max).contains(&n) => Ok(n),
        Value::Int(n) => Err(out_of_range(n as f64)),
        Value::Float(f) if f.is_finite() && f.fract() == 0.0 => {
            if (min as f64..=max as f64).contains(&f) {
                Ok(f as i64)
            } else {
                Err(out_of_range(f))
            }
        }
        _ => Err(mismatch(wire, "integer", value)),
    }
}

/// Floors toward negative infinity, then range-checks against `i16`.
fn floored_i16(wire: &WireType, component: f32) -> Result<i16, ValidationError> {
    let floored = f64::from(component).floor();
    let (min, max) = (f64::from(i16::MIN), f64::from(i16::MAX));
    // NaN fails `contains` as well.
    if !(min..=max).contains(&floored) {
        return Err(ValidationError::OutOfRange {
            wire: wire.clone(),
            value: f64::from(component),
            min,
            max,
        });
    }
    Ok(floored as i16)
}

/// Quantizes a `0.0..=1.0` channel to a byte.
fn channel(wire: &WireType, component: f32) -> Result<u8, ValidationError> {
    if !(0.0..=1.0).contains(&component) {
        return Err(ValidationError::OutOfRange {
            wire: wire.clone(),
            value: f64::from(component),
            min: 0.0,
            max: 1.0,
        });
    }
    Ok((component * 255.0).floor() as u8)
}

fn write_fixed_string(
    cursor: &mut ByteCursor,
    wire: &WireType,
    value: &Value,
    width: usize,
) -> Result<(), ValidationError> {
    let text = value.as_str().ok_or_else(|| mismatch(wire, "string", value))?;
    // Cut on a char boundary so the stored prefix stays valid UTF-8.
    let mut end = text.len().min(width);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    cursor.write_padded(&text.as_bytes()[..end], width);
    Ok(())
}

fn read_fixed_string(
    reader: &mut ByteReader<'_>,
    wire: &WireType,
    width: usize,
) -> Result<Value, DecodeError> {
    let start = reader.position();
    let raw: Vec<u8> = reader
        .read_bytes(width)?
        .iter()
        .copied()
        .filter(|&b| b != 0)
        .collect();
    Ok(Value::Str(utf8(raw, wire, start)?))
}

fn write_prefixed(
    cursor: &mut ByteCursor,
    wire: &WireType,
    payload: &[u8],
) -> Result<(), ValidationError> {
    if payload.len() > MAX_U24 {
        return Err(ValidationError::TooLong {
            wire: wire.clone(),
            len: payload.len(),
            max: MAX_U24,
        });
    }
    cursor.write_u24(payload.len() as u32);
    cursor.write_bytes(payload);
    Ok(())
}

fn read_prefixed<'a>(reader: &mut ByteReader<'a>) -> Result<&'a [u8], DecodeError> {
    let len = reader.read_u24()? as usize;
    reader.read_bytes(len)
}

fn utf8(raw: Vec<u8>, wire: &WireType, offset: usize) -> Result<String, DecodeError> {
    String::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8 {
        wire: wire.clone(),
        offset,
    })
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
