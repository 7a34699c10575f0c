//! Send prop value decoding and encoding.
//!
//! Each value is read according to its definition's type and flags. Encoding
//! is the exact inverse for every value the decoder can produce.

use bitstream::{bits_needed, BitReader, BitResult, BitWriter};
use schema::{SendPropDefinition, SendPropFlags, SendPropType};

use crate::error::{CodecError, CodecResult, EncodingReason, LimitKind};
use crate::limits::CodecLimits;
use crate::types::{SendPropValue, Vector, VectorXY};

const COORD_INTEGER_BITS: usize = 14;
const COORD_FRACTIONAL_BITS: usize = 5;
const COORD_DENOMINATOR: f64 = (1 << COORD_FRACTIONAL_BITS) as f64;

const COORD_INTEGER_BITS_MP: usize = 11;
const COORD_FRACTIONAL_BITS_MP_LOW_PRECISION: usize = 3;
const COORD_DENOMINATOR_LOW_PRECISION: f64 = (1 << COORD_FRACTIONAL_BITS_MP_LOW_PRECISION) as f64;

const NORMAL_FRACTIONAL_BITS: usize = 11;
const NORMAL_DENOMINATOR: f64 = ((1 << NORMAL_FRACTIONAL_BITS) - 1) as f64;

/// Width of the byte length prefix of string props.
pub const STRING_LENGTH_BITS: usize = 9;

/// Decodes one value of `def` from `reader`.
pub fn decode_prop_value(
    def: &SendPropDefinition,
    reader: &mut BitReader<'_>,
    limits: &CodecLimits,
) -> CodecResult<SendPropValue> {
    Ok(match def.prop_type {
        SendPropType::Int => SendPropValue::Integer(read_int(def, reader)?),
        SendPropType::Float => SendPropValue::Float(FloatEncoding::of(def)?.read(reader)?),
        SendPropType::Vector => SendPropValue::Vector(read_vector(def, reader)?),
        SendPropType::VectorXY => {
            let encoding = FloatEncoding::of(def)?;
            let x = encoding.read(reader)?;
            let y = encoding.read(reader)?;
            SendPropValue::VectorXY(VectorXY::new(x, y))
        }
        SendPropType::String => {
            let len = reader.read_bits(STRING_LENGTH_BITS)? as usize;
            SendPropValue::String(reader.read_string(Some(len))?)
        }
        SendPropType::Array => SendPropValue::Array(read_array(def, reader, limits)?),
        SendPropType::DataTable => return Err(invalid(def, EncodingReason::DataTable)),
    })
}

/// Encodes `value` as a value of `def`.
pub fn encode_prop_value(
    value: &SendPropValue,
    def: &SendPropDefinition,
    writer: &mut BitWriter,
) -> CodecResult<()> {
    match (def.prop_type, value) {
        (SendPropType::Int, SendPropValue::Integer(value)) => write_int(*value, def, writer),
        (SendPropType::Float, SendPropValue::Float(value)) => FloatEncoding::of(def)?
            .write(*value, writer)
            .map_err(|_| out_of_range(def)),
        (SendPropType::Vector, SendPropValue::Vector(value)) => write_vector(value, def, writer),
        (SendPropType::VectorXY, SendPropValue::VectorXY(value)) => {
            let encoding = FloatEncoding::of(def)?;
            encoding
                .write(value.x, writer)
                .and_then(|()| encoding.write(value.y, writer))
                .map_err(|_| out_of_range(def))
        }
        (SendPropType::String, SendPropValue::String(text)) => {
            if text.contains('\0') {
                return Err(invalid(def, EncodingReason::EmbeddedNul));
            }
            writer
                .write_bits(text.len() as u64, STRING_LENGTH_BITS)
                .map_err(|_| out_of_range(def))?;
            writer.write_bytes(text.as_bytes());
            Ok(())
        }
        (SendPropType::Array, SendPropValue::Array(values)) => write_array(values, def, writer),
        (SendPropType::DataTable, _) => Err(invalid(def, EncodingReason::DataTable)),
        (expected, _) => Err(invalid(def, EncodingReason::TypeMismatch { expected })),
    }
}

fn invalid(def: &SendPropDefinition, reason: EncodingReason) -> CodecError {
    CodecError::InvalidPropEncoding {
        prop: def.name.clone(),
        reason,
    }
}

fn out_of_range(def: &SendPropDefinition) -> CodecError {
    invalid(def, EncodingReason::OutOfRange)
}

fn int_bits(def: &SendPropDefinition) -> CodecResult<usize> {
    if def.bit_count > 64 {
        return Err(invalid(
            def,
            EncodingReason::BitCount {
                bits: def.bit_count,
            },
        ));
    }
    Ok(def.bit_count as usize)
}

fn read_int(def: &SendPropDefinition, reader: &mut BitReader<'_>) -> CodecResult<i64> {
    let unsigned = def.has_flag(SendPropFlags::UNSIGNED);
    if def.has_flag(SendPropFlags::VARINT) {
        return Ok(if unsigned {
            i64::from(reader.read_var_int()?)
        } else {
            i64::from(reader.read_var_int_signed()?)
        });
    }

    let bits = int_bits(def)?;
    Ok(if unsigned {
        // 64-bit unsigned values above i64::MAX wrap
        reader.read_bits(bits)? as i64
    } else {
        reader.read_signed_bits(bits)?
    })
}

fn write_int(value: i64, def: &SendPropDefinition, writer: &mut BitWriter) -> CodecResult<()> {
    let unsigned = def.has_flag(SendPropFlags::UNSIGNED);
    if def.has_flag(SendPropFlags::VARINT) {
        if unsigned {
            writer.write_var_int(u32::try_from(value).map_err(|_| out_of_range(def))?);
        } else {
            writer.write_var_int_signed(i32::try_from(value).map_err(|_| out_of_range(def))?);
        }
        return Ok(());
    }

    let bits = int_bits(def)?;
    let written = if unsigned {
        let raw = if bits == 64 {
            value as u64
        } else {
            u64::try_from(value).map_err(|_| out_of_range(def))?
        };
        writer.write_bits(raw, bits)
    } else {
        writer.write_signed_bits(value, bits)
    };
    written.map_err(|_| out_of_range(def))
}

fn read_vector(def: &SendPropDefinition, reader: &mut BitReader<'_>) -> CodecResult<Vector> {
    let encoding = FloatEncoding::of(def)?;
    let x = encoding.read(reader)?;
    let y = encoding.read(reader)?;
    let z = if def.has_flag(SendPropFlags::NORMAL) {
        let negative = reader.read_bool()?;
        let sum = x * x + y * y;
        let z = if sum < 1.0 { (1.0 - sum).sqrt() } else { 0.0 };
        if negative {
            -z
        } else {
            z
        }
    } else {
        encoding.read(reader)?
    };
    Ok(Vector::new(x, y, z))
}

fn write_vector(value: &Vector, def: &SendPropDefinition, writer: &mut BitWriter) -> CodecResult<()> {
    let encoding = FloatEncoding::of(def)?;
    let written = encoding
        .write(value.x, writer)
        .and_then(|()| encoding.write(value.y, writer))
        .and_then(|()| {
            if def.has_flag(SendPropFlags::NORMAL) {
                writer.write_bool(value.z.is_sign_negative());
                Ok(())
            } else {
                encoding.write(value.z, writer)
            }
        });
    written.map_err(|_| out_of_range(def))
}

fn array_element(def: &SendPropDefinition) -> CodecResult<&SendPropDefinition> {
    def.element
        .as_deref()
        .ok_or_else(|| invalid(def, EncodingReason::MissingArrayElement))
}

fn read_array(
    def: &SendPropDefinition,
    reader: &mut BitReader<'_>,
    limits: &CodecLimits,
) -> CodecResult<Vec<SendPropValue>> {
    let element = array_element(def)?;
    let count = reader.read_bits(bits_needed(def.num_elements))? as usize;
    if count > limits.max_array_elements {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::ArrayElements,
            limit: limits.max_array_elements,
            actual: count,
        });
    }
    (0..count)
        .map(|_| decode_prop_value(element, reader, limits))
        .collect()
}

fn write_array(
    values: &[SendPropValue],
    def: &SendPropDefinition,
    writer: &mut BitWriter,
) -> CodecResult<()> {
    let element = array_element(def)?;
    writer
        .write_bits(values.len() as u64, bits_needed(def.num_elements))
        .map_err(|_| out_of_range(def))?;
    values
        .iter()
        .try_for_each(|value| encode_prop_value(value, element, writer))
}

/// Wire encoding of a float, selected by flags in priority order.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FloatEncoding {
    Coord,
    CoordMp(CoordMp),
    NoScale,
    Normal,
    Quantized(Quantization),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoordMp {
    Full,
    LowPrecision,
    Integral,
}

impl CoordMp {
    const fn fraction(self) -> (usize, f64) {
        match self {
            Self::LowPrecision => (
                COORD_FRACTIONAL_BITS_MP_LOW_PRECISION,
                COORD_DENOMINATOR_LOW_PRECISION,
            ),
            Self::Full | Self::Integral => (COORD_FRACTIONAL_BITS, COORD_DENOMINATOR),
        }
    }
}

impl FloatEncoding {
    fn of(def: &SendPropDefinition) -> CodecResult<Self> {
        Ok(if def.has_flag(SendPropFlags::COORD) {
            Self::Coord
        } else if def.has_flag(SendPropFlags::COORD_MP) {
            Self::CoordMp(CoordMp::Full)
        } else if def.has_flag(SendPropFlags::COORD_MP_LOW_PRECISION) {
            Self::CoordMp(CoordMp::LowPrecision)
        } else if def.has_flag(SendPropFlags::COORD_MP_INTEGRAL) {
            Self::CoordMp(CoordMp::Integral)
        } else if def.has_flag(SendPropFlags::NO_SCALE) {
            Self::NoScale
        } else if def.has_flag(SendPropFlags::NORMAL) {
            Self::Normal
        } else {
            Self::Quantized(Quantization::new(def)?)
        })
    }

    fn read(self, reader: &mut BitReader<'_>) -> BitResult<f32> {
        match self {
            Self::Coord => read_bit_coord(reader),
            Self::CoordMp(mode) => read_bit_coord_mp(reader, mode),
            Self::NoScale => reader.read_f32(),
            Self::Normal => read_bit_normal(reader),
            Self::Quantized(quantization) => Ok(quantization.decode(reader.read_bits(quantization.bits)?)),
        }
    }

    fn write(self, value: f32, writer: &mut BitWriter) -> BitResult<()> {
        match self {
            Self::Coord => write_bit_coord(value, writer),
            Self::CoordMp(mode) => write_bit_coord_mp(value, writer, mode),
            Self::NoScale => {
                writer.write_f32(value);
                Ok(())
            }
            Self::Normal => write_bit_normal(value, writer),
            Self::Quantized(quantization) => {
                writer.write_bits(quantization.encode(value), quantization.bits)
            }
        }
    }
}

/// Linear quantization of `[low, high]` onto `bits` bits.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Quantization {
    bits: usize,
    low: f64,
    high: f64,
}

impl Quantization {
    fn new(def: &SendPropDefinition) -> CodecResult<Self> {
        if def.bit_count == 0 || def.bit_count > 32 {
            return Err(invalid(
                def,
                EncodingReason::BitCount {
                    bits: def.bit_count,
                },
            ));
        }
        let round_down = def.has_flag(SendPropFlags::ROUND_DOWN);
        let round_up = def.has_flag(SendPropFlags::ROUND_UP);
        if round_down && round_up {
            return Err(invalid(def, EncodingReason::RoundUpAndDown));
        }

        let bits = def.bit_count as usize;
        let mut low = f64::from(def.low_value);
        let mut high = f64::from(def.high_value);
        let step = (high - low) / (1u64 << bits) as f64;
        if round_down {
            high -= step;
        } else if round_up {
            low += step;
        }
        Ok(Self { bits, low, high })
    }

    fn max_raw(self) -> u64 {
        (1u64 << self.bits) - 1
    }

    fn decode(self, raw: u64) -> f32 {
        (self.low + (self.high - self.low) * raw as f64 / self.max_raw() as f64) as f32
    }

    fn encode(self, value: f32) -> u64 {
        let range = self.high - self.low;
        if range.abs() < f64::MIN_POSITIVE {
            return 0;
        }
        let max = self.max_raw() as f64;
        ((f64::from(value) - self.low) / range * max)
            .round()
            .clamp(0.0, max) as u64
    }
}

fn signed(magnitude: f64, negative: bool) -> f32 {
    let value = magnitude as f32;
    if negative {
        -value
    } else {
        value
    }
}

fn read_bit_coord(reader: &mut BitReader<'_>) -> BitResult<f32> {
    let has_int = reader.read_bool()?;
    let has_fract = reader.read_bool()?;
    if !has_int && !has_fract {
        return Ok(0.0);
    }
    let negative = reader.read_bool()?;
    let int = if has_int {
        reader.read_bits(COORD_INTEGER_BITS)? + 1
    } else {
        0
    };
    let fract = if has_fract {
        reader.read_bits(COORD_FRACTIONAL_BITS)?
    } else {
        0
    };
    Ok(signed(int as f64 + fract as f64 / COORD_DENOMINATOR, negative))
}

fn write_bit_coord(value: f32, writer: &mut BitWriter) -> BitResult<()> {
    let magnitude = f64::from(value.abs());
    let int = magnitude.trunc() as u64;
    let fract = (magnitude * COORD_DENOMINATOR) as u64 & ((1 << COORD_FRACTIONAL_BITS) - 1);

    writer.write_bool(int != 0);
    writer.write_bool(fract != 0);
    if int != 0 || fract != 0 {
        writer.write_bool(value.is_sign_negative());
        if int != 0 {
            writer.write_bits(int - 1, COORD_INTEGER_BITS)?;
        }
        if fract != 0 {
            writer.write_bits(fract, COORD_FRACTIONAL_BITS)?;
        }
    }
    Ok(())
}

fn read_bit_coord_mp(reader: &mut BitReader<'_>, mode: CoordMp) -> BitResult<f32> {
    let in_bounds = reader.read_bool()?;
    let int_bits = if in_bounds {
        COORD_INTEGER_BITS_MP
    } else {
        COORD_INTEGER_BITS
    };

    if mode == CoordMp::Integral {
        if !reader.read_bool()? {
            return Ok(0.0);
        }
        let negative = reader.read_bool()?;
        let int = reader.read_bits(int_bits)? + 1;
        return Ok(signed(int as f64, negative));
    }

    let has_int = reader.read_bool()?;
    let negative = reader.read_bool()?;
    let int = if has_int {
        reader.read_bits(int_bits)? + 1
    } else {
        0
    };
    let (fract_bits, denominator) = mode.fraction();
    let fract = reader.read_bits(fract_bits)?;
    Ok(signed(int as f64 + fract as f64 / denominator, negative))
}

fn write_bit_coord_mp(value: f32, writer: &mut BitWriter, mode: CoordMp) -> BitResult<()> {
    let magnitude = f64::from(value.abs());
    let int = magnitude.trunc() as u64;
    let in_bounds = int <= 1 << COORD_INTEGER_BITS_MP;
    let int_bits = if in_bounds {
        COORD_INTEGER_BITS_MP
    } else {
        COORD_INTEGER_BITS
    };
    writer.write_bool(in_bounds);

    if mode == CoordMp::Integral {
        writer.write_bool(int != 0);
        if int != 0 {
            writer.write_bool(value.is_sign_negative());
            writer.write_bits(int - 1, int_bits)?;
        }
        return Ok(());
    }

    writer.write_bool(int != 0);
    writer.write_bool(value.is_sign_negative());
    if int != 0 {
        writer.write_bits(int - 1, int_bits)?;
    }
    let (fract_bits, denominator) = mode.fraction();
    let fract = (magnitude * denominator) as u64 & ((1 << fract_bits) - 1);
    writer.write_bits(fract, fract_bits)
}

fn read_bit_normal(reader: &mut BitReader<'_>) -> BitResult<f32> {
    let negative = reader.read_bool()?;
    let fract = reader.read_bits(NORMAL_FRACTIONAL_BITS)?;
    Ok(signed(fract as f64 / NORMAL_DENOMINATOR, negative))
}

fn write_bit_normal(value: f32, writer: &mut BitWriter) -> BitResult<()> {
    writer.write_bool(value.is_sign_negative());
    let fract = (f64::from(value.abs()) * NORMAL_DENOMINATOR)
        .round()
        .min(NORMAL_DENOMINATOR) as u64;
    writer.write_bits(fract, NORMAL_FRACTIONAL_BITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> CodecLimits {
        CodecLimits::for_testing()
    }

    fn roundtrip(def: &SendPropDefinition, value: &SendPropValue) -> (SendPropValue, usize) {
        let mut writer = BitWriter::new();
        encode_prop_value(value, def, &mut writer).unwrap();
        let bits = writer.bits_written();
        let mut reader = writer.reader();
        let decoded = decode_prop_value(def, &mut reader, &limits()).unwrap();
        assert!(reader.is_empty(), "decoder left {} bits", reader.bits_remaining());
        (decoded, bits)
    }

    #[test]
    fn signed_int_sign_extends() {
        let def = SendPropDefinition::int("m_iTeamNum", 4);
        let bytes = [0b0000_1110];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(
            decode_prop_value(&def, &mut reader, &limits()).unwrap(),
            SendPropValue::Integer(-2)
        );

        let unsigned = def.clone().with_flags(SendPropFlags::UNSIGNED);
        let mut reader = BitReader::new(&bytes);
        assert_eq!(
            decode_prop_value(&unsigned, &mut reader, &limits()).unwrap(),
            SendPropValue::Integer(14)
        );
    }

    #[test]
    fn varint_ints_use_zigzag_unless_unsigned() {
        let signed_def = SendPropDefinition::int("m_nTick", 0).with_flags(SendPropFlags::VARINT);
        let (value, bits) = roundtrip(&signed_def, &SendPropValue::Integer(-64));
        assert_eq!(value, SendPropValue::Integer(-64));
        assert_eq!(bits, 8);

        let unsigned_def = signed_def.with_flags(SendPropFlags::UNSIGNED);
        let (value, bits) = roundtrip(&unsigned_def, &SendPropValue::Integer(300));
        assert_eq!(value, SendPropValue::Integer(300));
        assert_eq!(bits, 16);
    }

    #[test]
    fn int_out_of_range_fails() {
        let def = SendPropDefinition::int("m_iHealth", 8).with_flags(SendPropFlags::UNSIGNED);
        let err = encode_prop_value(&SendPropValue::Integer(256), &def, &mut BitWriter::new())
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidPropEncoding {
                reason: EncodingReason::OutOfRange,
                ..
            }
        ));
    }

    #[test]
    fn coord_values() {
        let def = SendPropDefinition::float("m_flX", 0, 0.0, 0.0).with_flags(SendPropFlags::COORD);
        for value in [0.0f32, 1.0, -3.5, 100.03125, -0.5, 16384.96875] {
            let (decoded, _) = roundtrip(&def, &SendPropValue::Float(value));
            assert_eq!(decoded, SendPropValue::Float(value), "coord {value}");
        }
        let (_, bits) = roundtrip(&def, &SendPropValue::Float(0.0));
        assert_eq!(bits, 2);
    }

    #[test]
    fn coord_known_bits() {
        // has_int, has_fract, negative, int - 1 = 2 (14 bits), fract = 16 (5 bits)
        let mut writer = BitWriter::new();
        writer.write_bool(true);
        writer.write_bool(true);
        writer.write_bool(true);
        writer.write_bits(2, 14).unwrap();
        writer.write_bits(16, 5).unwrap();

        let def = SendPropDefinition::float("m_flX", 0, 0.0, 0.0).with_flags(SendPropFlags::COORD);
        let value = decode_prop_value(&def, &mut writer.reader(), &limits()).unwrap();
        assert_eq!(value, SendPropValue::Float(-3.5));
    }

    #[test]
    fn coord_mp_variants() {
        let full = SendPropDefinition::float("a", 0, 0.0, 0.0).with_flags(SendPropFlags::COORD_MP);
        let (value, bits) = roundtrip(&full, &SendPropValue::Float(-12.25));
        assert_eq!(value, SendPropValue::Float(-12.25));
        assert_eq!(bits, 3 + 11 + 5);

        let (value, bits) = roundtrip(&full, &SendPropValue::Float(3000.5));
        assert_eq!(value, SendPropValue::Float(3000.5));
        assert_eq!(bits, 3 + 14 + 5);

        let low = SendPropDefinition::float("b", 0, 0.0, 0.0)
            .with_flags(SendPropFlags::COORD_MP_LOW_PRECISION);
        let (value, bits) = roundtrip(&low, &SendPropValue::Float(7.625));
        assert_eq!(value, SendPropValue::Float(7.625));
        assert_eq!(bits, 3 + 11 + 3);

        let integral = SendPropDefinition::float("c", 0, 0.0, 0.0)
            .with_flags(SendPropFlags::COORD_MP_INTEGRAL);
        let (value, bits) = roundtrip(&integral, &SendPropValue::Float(-42.0));
        assert_eq!(value, SendPropValue::Float(-42.0));
        assert_eq!(bits, 3 + 11);
        let (_, bits) = roundtrip(&integral, &SendPropValue::Float(0.0));
        assert_eq!(bits, 2);
    }

    #[test]
    fn no_scale_keeps_ieee_bits() {
        let def = SendPropDefinition::float("m_flSimulationTime", 0, 0.0, 0.0)
            .with_flags(SendPropFlags::NO_SCALE);
        let (value, bits) = roundtrip(&def, &SendPropValue::Float(1234.567));
        assert_eq!(value, SendPropValue::Float(1234.567));
        assert_eq!(bits, 32);
    }

    #[test]
    fn normal_float() {
        let def = SendPropDefinition::float("m_flNormal", 0, 0.0, 0.0).with_flags(SendPropFlags::NORMAL);
        let mut writer = BitWriter::new();
        writer.write_bool(true);
        writer.write_bits(2047, 11).unwrap();
        let value = decode_prop_value(&def, &mut writer.reader(), &limits()).unwrap();
        assert_eq!(value, SendPropValue::Float(-1.0));

        let half = (1023.0f64 / 2047.0) as f32;
        let (value, bits) = roundtrip(&def, &SendPropValue::Float(half));
        assert_eq!(value, SendPropValue::Float(half));
        assert_eq!(bits, 12);
    }

    #[test]
    fn quantized_float_endpoints() {
        let def = SendPropDefinition::float("m_flCycle", 8, 0.0, 1.0);
        let mut writer = BitWriter::new();
        writer.write_bits(255, 8).unwrap();
        writer.write_bits(0, 8).unwrap();
        let mut reader = writer.reader();
        assert_eq!(
            decode_prop_value(&def, &mut reader, &limits()).unwrap(),
            SendPropValue::Float(1.0)
        );
        assert_eq!(
            decode_prop_value(&def, &mut reader, &limits()).unwrap(),
            SendPropValue::Float(0.0)
        );
    }

    #[test]
    fn quantized_round_down_lowers_high() {
        let def = SendPropDefinition::float("m_flCycle", 2, 0.0, 4.0).with_flags(SendPropFlags::ROUND_DOWN);
        let mut writer = BitWriter::new();
        writer.write_bits(3, 2).unwrap();
        let value = decode_prop_value(&def, &mut writer.reader(), &limits()).unwrap();
        assert_eq!(value, SendPropValue::Float(3.0));

        let def = SendPropDefinition::float("m_flCycle", 2, 0.0, 4.0).with_flags(SendPropFlags::ROUND_UP);
        let mut writer = BitWriter::new();
        writer.write_bits(0, 2).unwrap();
        let value = decode_prop_value(&def, &mut writer.reader(), &limits()).unwrap();
        assert_eq!(value, SendPropValue::Float(1.0));
    }

    #[test]
    fn quantized_invalid_encodings() {
        let both = SendPropDefinition::float("a", 8, 0.0, 1.0)
            .with_flags(SendPropFlags::ROUND_DOWN | SendPropFlags::ROUND_UP);
        let err = decode_prop_value(&both, &mut BitReader::new(&[0]), &limits()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidPropEncoding {
                reason: EncodingReason::RoundUpAndDown,
                ..
            }
        ));

        let wide = SendPropDefinition::float("b", 33, 0.0, 1.0);
        let err = decode_prop_value(&wide, &mut BitReader::new(&[0; 8]), &limits()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidPropEncoding {
                reason: EncodingReason::BitCount { bits: 33 },
                ..
            }
        ));
    }

    #[test]
    fn normal_vector_derives_z() {
        let def = SendPropDefinition::vector("m_vecNormal", 0, 0.0, 0.0).with_flags(SendPropFlags::NORMAL);
        let mut writer = BitWriter::new();
        // x = 0, y = 0, z sign negative
        writer.write_bool(false);
        writer.write_bits(0, 11).unwrap();
        writer.write_bool(false);
        writer.write_bits(0, 11).unwrap();
        writer.write_bool(true);
        let value = decode_prop_value(&def, &mut writer.reader(), &limits()).unwrap();
        assert_eq!(value, SendPropValue::Vector(Vector::new(0.0, 0.0, -1.0)));

        let (decoded, bits) = roundtrip(&def, &value);
        assert_eq!(decoded, value);
        assert_eq!(bits, 25);
    }

    #[test]
    fn vector_xy_and_full_vector() {
        let def = SendPropDefinition::vector("m_vecOrigin", 0, 0.0, 0.0).with_flags(SendPropFlags::COORD);
        let value = SendPropValue::Vector(Vector::new(1.5, -2.0, 300.25));
        assert_eq!(roundtrip(&def, &value).0, value);

        let def = SendPropDefinition::vector_xy("m_vecVelocity", 0, 0.0, 0.0)
            .with_flags(SendPropFlags::NO_SCALE);
        let value = SendPropValue::VectorXY(VectorXY::new(0.25, -8.0));
        assert_eq!(roundtrip(&def, &value), (value, 64));
    }

    #[test]
    fn string_value() {
        let def = SendPropDefinition::string("m_iszName");
        let value = SendPropValue::String("player".to_string());
        assert_eq!(roundtrip(&def, &value), (value, 9 + 6 * 8));

        let long = SendPropValue::String("x".repeat(512));
        assert!(encode_prop_value(&long, &def, &mut BitWriter::new()).is_err());
    }

    #[test]
    fn string_with_nul_is_rejected() {
        let def = SendPropDefinition::string("m_iszName");
        let value = SendPropValue::String("pla\0yer".to_string());
        let mut writer = BitWriter::new();
        assert_eq!(
            encode_prop_value(&value, &def, &mut writer).unwrap_err(),
            CodecError::InvalidPropEncoding {
                prop: "m_iszName".to_string(),
                reason: EncodingReason::EmbeddedNul,
            }
        );
        assert_eq!(writer.bits_written(), 0);
    }

    #[test]
    fn array_value() {
        let def = SendPropDefinition::array(
            "m_iAmmo",
            32,
            SendPropDefinition::int("000", 10).with_flags(SendPropFlags::UNSIGNED),
        );
        let value = SendPropValue::Array(vec![
            SendPropValue::Integer(30),
            SendPropValue::Integer(90),
            SendPropValue::Integer(0),
        ]);
        // count uses bits_needed(32) = 6 bits
        assert_eq!(roundtrip(&def, &value), (value, 6 + 3 * 10));
    }

    #[test]
    fn array_count_limit() {
        let def = SendPropDefinition::array("m_big", 255, SendPropDefinition::int("000", 1));
        let mut writer = BitWriter::new();
        writer.write_bits(200, 8).unwrap();
        let err = decode_prop_value(&def, &mut writer.reader(), &limits()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LimitsExceeded {
                kind: LimitKind::ArrayElements,
                limit: 64,
                actual: 200
            }
        ));
    }

    #[test]
    fn data_table_and_mismatch_fail() {
        let def = SendPropDefinition::data_table("baseclass", "DT_Base");
        let err = decode_prop_value(&def, &mut BitReader::new(&[0]), &limits()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidPropEncoding {
                reason: EncodingReason::DataTable,
                ..
            }
        ));

        let def = SendPropDefinition::int("m_iHealth", 8);
        let err = encode_prop_value(&SendPropValue::Float(1.0), &def, &mut BitWriter::new())
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidPropEncoding {
                reason: EncodingReason::TypeMismatch {
                    expected: SendPropType::Int
                },
                ..
            }
        ));
    }
}
