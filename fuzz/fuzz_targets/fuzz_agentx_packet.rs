#![no_main]

use libfuzzer_sys::fuzz_target;

use bird_bgp_agentx::agentx::{HEADER_LEN, Header, Packet};

fuzz_target!(|data: &[u8]| {
    // Whole frame: header plus body
    let _ = Packet::from_bytes(data);

    // Body alone under a fuzzed header, the path taken after framing
    if data.len() >= HEADER_LEN {
        if let Ok(header) = Header::decode(&data[..HEADER_LEN]) {
            let payload = bytes::Bytes::copy_from_slice(&data[HEADER_LEN..]);
            if let Ok(packet) = Packet::decode(header, payload) {
                // anything decoded must encode again
                let _ = packet.encode();
            }
        }
    }
});
