#![no_main]
use libfuzzer_sys::fuzz_target;
use pointpack::Packet;

// The parser is the only place untrusted file bytes become typed
// records: arbitrary input must produce Ok or Err, never a panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(packet) = Packet::parse(data) {
        // Accessors on an accepted packet must stay in bounds too.
        match packet {
            Packet::Data(data) => {
                for i in 0..data.bytestream_count() {
                    let _ = data.bytestream(i);
                }
            }
            Packet::Index(index) => {
                let _ = index.entries().count();
            }
            Packet::Empty(_) => {}
        }
    }
});
