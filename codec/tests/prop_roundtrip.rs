use bitstream::BitWriter;
use codec::{
    decode_prop_value, encode_prop_value, read_prop_updates, write_prop_updates, CodecLimits,
    PropMap, SendPropValue, Vector, VectorXY,
};
use proptest::prelude::*;
use schema::{SendPropDefinition, SendPropFlags, SendTable};

/// One prop of every wire encoding, in table order.
fn table() -> SendTable {
    SendTable::builder("DT_Everything")
        .prop(SendPropDefinition::int("signed", 12))
        .prop(SendPropDefinition::int("unsigned", 20).with_flags(SendPropFlags::UNSIGNED))
        .prop(SendPropDefinition::int("varint", 0).with_flags(SendPropFlags::VARINT))
        .prop(
            SendPropDefinition::int("uvarint", 0)
                .with_flags(SendPropFlags::VARINT | SendPropFlags::UNSIGNED),
        )
        .prop(SendPropDefinition::float("coord", 0, 0.0, 0.0).with_flags(SendPropFlags::COORD))
        .prop(SendPropDefinition::float("coord_mp", 0, 0.0, 0.0).with_flags(SendPropFlags::COORD_MP))
        .prop(
            SendPropDefinition::float("coord_mp_low", 0, 0.0, 0.0)
                .with_flags(SendPropFlags::COORD_MP_LOW_PRECISION),
        )
        .prop(
            SendPropDefinition::float("coord_mp_integral", 0, 0.0, 0.0)
                .with_flags(SendPropFlags::COORD_MP_INTEGRAL),
        )
        .prop(SendPropDefinition::float("no_scale", 0, 0.0, 0.0).with_flags(SendPropFlags::NO_SCALE))
        .prop(SendPropDefinition::float("normal", 0, 0.0, 0.0).with_flags(SendPropFlags::NORMAL))
        .prop(SendPropDefinition::float("quantized", 12, -100.0, 100.0))
        .prop(SendPropDefinition::vector("vector", 0, 0.0, 0.0).with_flags(SendPropFlags::COORD))
        .prop(SendPropDefinition::vector_xy("vector_xy", 0, 0.0, 0.0).with_flags(SendPropFlags::NO_SCALE))
        .prop(SendPropDefinition::string("string"))
        .prop(SendPropDefinition::array(
            "array",
            16,
            SendPropDefinition::int("element", 6).with_flags(SendPropFlags::UNSIGNED),
        ))
        .build()
        .unwrap()
}

fn coord() -> impl Strategy<Value = f32> {
    (any::<bool>(), 0u32..16384, 0u32..32).prop_map(|(negative, int, fract)| {
        let value = int as f32 + fract as f32 / 32.0;
        if negative {
            -value
        } else {
            value
        }
    })
}

fn coord_mp_low() -> impl Strategy<Value = f32> {
    (any::<bool>(), 0u32..4096, 0u32..8).prop_map(|(negative, int, fract)| {
        let value = int as f32 + fract as f32 / 8.0;
        if negative {
            -value
        } else {
            value
        }
    })
}

fn integral() -> impl Strategy<Value = f32> {
    (-4096i32..4096).prop_map(|value| value as f32)
}

fn normal() -> impl Strategy<Value = f32> {
    (any::<bool>(), 0u32..2048).prop_map(|(negative, fract)| {
        let value = (f64::from(fract) / 2047.0) as f32;
        if negative {
            -value
        } else {
            value
        }
    })
}

fn quantized() -> impl Strategy<Value = f32> {
    (0u64..4096).prop_map(|raw| (-100.0 + 200.0 * raw as f64 / 4095.0) as f32)
}

fn finite() -> impl Strategy<Value = f32> {
    any::<u32>().prop_map(f32::from_bits).prop_filter("finite", |value| value.is_finite())
}

fn value_for(index: u16) -> BoxedStrategy<SendPropValue> {
    match index {
        0 => (-2048i64..2048).prop_map(SendPropValue::Integer).boxed(),
        1 => (0i64..(1 << 20)).prop_map(SendPropValue::Integer).boxed(),
        2 => any::<i32>().prop_map(|v| SendPropValue::Integer(v.into())).boxed(),
        3 => any::<u32>().prop_map(|v| SendPropValue::Integer(v.into())).boxed(),
        4 | 5 => coord().prop_map(SendPropValue::Float).boxed(),
        6 => coord_mp_low().prop_map(SendPropValue::Float).boxed(),
        7 => integral().prop_map(SendPropValue::Float).boxed(),
        8 => finite().prop_map(SendPropValue::Float).boxed(),
        9 => normal().prop_map(SendPropValue::Float).boxed(),
        10 => quantized().prop_map(SendPropValue::Float).boxed(),
        11 => (coord(), coord(), coord())
            .prop_map(|(x, y, z)| SendPropValue::Vector(Vector::new(x, y, z)))
            .boxed(),
        12 => (finite(), finite())
            .prop_map(|(x, y)| SendPropValue::VectorXY(VectorXY::new(x, y)))
            .boxed(),
        13 => "[a-zA-Z0-9_ ]{0,40}".prop_map(SendPropValue::String).boxed(),
        _ => prop::collection::vec((0i64..64).prop_map(SendPropValue::Integer), 0..=16)
            .prop_map(SendPropValue::Array)
            .boxed(),
    }
}

fn prop_map() -> impl Strategy<Value = PropMap> {
    prop::collection::btree_set(0u16..15, 0..15).prop_flat_map(|indices| {
        indices
            .into_iter()
            .map(|index| value_for(index).prop_map(move |value| (index, value)))
            .collect::<Vec<_>>()
            .prop_map(|pairs| pairs.into_iter().collect::<PropMap>())
    })
}

proptest! {
    #[test]
    fn prop_update_list_roundtrip(props in prop_map()) {
        let table = table();
        let mut writer = BitWriter::new();
        write_prop_updates(&props, &table, &mut writer).unwrap();

        let mut decoded = PropMap::new();
        let mut reader = writer.reader();
        read_prop_updates(&mut decoded, &table, &mut reader, &CodecLimits::default()).unwrap();

        prop_assert!(reader.is_empty());
        prop_assert_eq!(decoded, props);
    }

    #[test]
    fn canonical_bits_are_stable(props in prop_map()) {
        let table = table();
        let mut first = BitWriter::new();
        write_prop_updates(&props, &table, &mut first).unwrap();

        let mut decoded = PropMap::new();
        read_prop_updates(&mut decoded, &table, &mut first.reader(), &CodecLimits::default()).unwrap();
        let mut second = BitWriter::new();
        write_prop_updates(&decoded, &table, &mut second).unwrap();

        prop_assert_eq!(first.finish(), second.finish());
    }

    #[test]
    fn single_value_roundtrip(index in 0u16..15, seed in any::<u64>()) {
        let table = table();
        let def = table.prop(usize::from(index)).unwrap();
        let value = match index {
            0 => SendPropValue::Integer((seed % 4096) as i64 - 2048),
            3 => SendPropValue::Integer(i64::from(seed as u32)),
            13 => SendPropValue::String(format!("{seed:x}")),
            _ => return Ok(()),
        };
        let mut writer = BitWriter::new();
        encode_prop_value(&value, def, &mut writer).unwrap();
        let decoded = decode_prop_value(def, &mut writer.reader(), &CodecLimits::default()).unwrap();
        prop_assert_eq!(decoded, value);
    }
}
