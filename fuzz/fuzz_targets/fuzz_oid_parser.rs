#![no_main]

use libfuzzer_sys::fuzz_target;

use bird_bgp_agentx::oid::Oid;

fuzz_target!(|data: &[u8]| {
    // Dotted string notation (if data is valid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(oid) = Oid::parse(s) {
            // Display output must parse back to the same OID
            assert_eq!(Oid::parse(&oid.to_string()).ok(), Some(oid));
        }
    }
});
