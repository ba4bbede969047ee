#![no_main]

use folio_core::AppConfig;
use folio_core::element::ElementId;
use folio_web::PageRunner;
use libfuzzer_sys::fuzz_target;
use web_time::Duration;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut runner) = PageRunner::new(AppConfig::default()) else {
        return;
    };
    runner.resize(1280.0, 800.0);
    let _ = runner.mount_rotator(ElementId(1));
    runner.mount_reveal(ElementId(2), runner.reveal_options());
    runner.mount_cursor(ElementId(3), ElementId(4));

    for line in json.lines().take(64) {
        let _ = runner.push_encoded_input(line);
        let _ = runner.step(Duration::from_millis(16));
    }
    let _ = runner.take_patches_json();
    runner.dispose();
    assert_eq!(runner.pending_timers(), 0);
});
