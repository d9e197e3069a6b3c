#![no_main]
use libfuzzer_sys::fuzz_target;
use scoovio_engine::domain::resource::RentalResource;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(resource) = serde_json::from_str::<RentalResource>(text) {
            let _ = resource.validate();
        }
    }
});
