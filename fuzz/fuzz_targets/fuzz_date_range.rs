#![no_main]
use libfuzzer_sys::fuzz_target;
use scoovio_engine::domain::date_range::DateRange;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let (start, end) = text.split_once('/').unwrap_or((text, ""));
        if let Ok(range) = DateRange::parse(start, end) {
            assert!(range.days() > 0);
            assert!(range.overlaps(&range));
        }
    }
});
