#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<(String, i32)>, String)| {
    let mut registry = path_registry::PathRegistry::new();

    for (template, value) in data.0 {
        let before = registry.len();
        if !registry.insert(&template, value) {
            assert_eq!(registry.len(), before);
        }
    }

    if let Some(value) = registry.search(&data.1) {
        let matched = registry.at(&data.1).unwrap();
        assert_eq!(matched.value, value);
    }
});
