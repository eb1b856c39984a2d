#![no_main]

use chrono::Utc;
use libfuzzer_sys::fuzz_target;

use bird_bgp_agentx::bird::{parse_protocols_in, parse_status};
use bird_bgp_agentx::mib;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let status = parse_status(text);
    if let Ok(sessions) = parse_protocols_in(text, &Utc) {
        // whatever parses must lay out into a walkable store
        let store = mib::build_store(&status, &sessions, Utc::now());
        assert!(store.len() >= 3);
    }
});
