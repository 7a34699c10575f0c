#![no_main]

use bitstream::BitReader;
use codec::{ClassRegistry, CodecLimits, PacketKind, Session, WireLimits};
use libfuzzer_sys::fuzz_target;
use schema::{SendPropDefinition, SendPropFlags, SendTable, ServerClass};

fn registry() -> Option<ClassRegistry> {
    let table = SendTable::builder("DT_Fuzz")
        .prop(SendPropDefinition::int("m_iHealth", 8).with_flags(SendPropFlags::UNSIGNED))
        .prop(SendPropDefinition::vector("m_vecOrigin", 0, 0.0, 0.0).with_flags(SendPropFlags::COORD))
        .prop(SendPropDefinition::string("m_szName"))
        .prop(SendPropDefinition::array(
            "m_iAmmo",
            8,
            SendPropDefinition::int("element", 4).with_flags(SendPropFlags::UNSIGNED),
        ))
        .build()
        .ok()?;
    ClassRegistry::new(
        vec![
            ServerClass::new(0, "CWorld", "DT_Fuzz"),
            ServerClass::new(1, "CPlayer", "DT_Fuzz"),
            ServerClass::new(2, "CRocket", "DT_Fuzz"),
        ],
        vec![table],
    )
    .ok()
}

fuzz_target!(|data: &[u8]| {
    let Some(registry) = registry() else {
        return;
    };
    let mut session = Session::with_limits(registry, CodecLimits::default(), WireLimits::default());

    // Each frame is a kind selector, a length byte, then the payload.
    let mut idx = 0usize;
    while idx + 2 <= data.len() && idx < 4096 {
        let kind = match data[idx] % 3 {
            0 => PacketKind::PacketEntities,
            1 => PacketKind::CreateStringTable,
            _ => PacketKind::GameEventList,
        };
        let len = usize::from(data[idx + 1]);
        idx += 2;
        let end = (idx + len).min(data.len());
        let frame = &data[idx..end];
        idx = end;

        let _ = session.decode_packet(kind, &mut BitReader::new(frame));
    }
});
