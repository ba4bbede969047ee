#![no_main]

use arbitrary::Arbitrary;
use folio_core::AppConfig;
use folio_core::element::ElementId;
use folio_core::geometry::Rect;
use folio_web::PageRunner;
use libfuzzer_sys::fuzz_target;
use web_time::Duration;

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Resize { width: u16, height: u16 },
    Scroll { x: i16, y: i32 },
    Layout { element: u8, x: i16, y: i32, width: u16, height: u16 },
    RemoveLayout { element: u8 },
    MountReveal { element: u8 },
    MountRotator { element: u8 },
    MountCursor { ring: u8, dot: u8 },
    MountImageFade { element: u8 },
    Unmount { element: u8 },
    PointerMove { x: i16, y: i16 },
    PointerDown,
    Hover(bool),
    Step { ms: u16 },
}

fuzz_target!(|ops: Vec<FuzzOp>| {
    let Ok(mut runner) = PageRunner::new(AppConfig::default()) else {
        return;
    };
    for op in ops.into_iter().take(256) {
        match op {
            FuzzOp::Resize { width, height } => runner.resize(f64::from(width), f64::from(height)),
            FuzzOp::Scroll { x, y } => runner.scroll_to(f64::from(x), f64::from(y)),
            FuzzOp::Layout {
                element,
                x,
                y,
                width,
                height,
            } => runner.set_element_rect(
                ElementId(u32::from(element)),
                Rect::new(f64::from(x), f64::from(y), f64::from(width), f64::from(height)),
            ),
            FuzzOp::RemoveLayout { element } => {
                runner.remove_element_rect(ElementId(u32::from(element)));
            }
            FuzzOp::MountReveal { element } => {
                runner.mount_reveal(ElementId(u32::from(element)), runner.reveal_options());
            }
            FuzzOp::MountRotator { element } => {
                let _ = runner.mount_rotator(ElementId(u32::from(element)));
            }
            FuzzOp::MountCursor { ring, dot } => {
                runner.mount_cursor(ElementId(u32::from(ring)), ElementId(u32::from(dot)));
            }
            FuzzOp::MountImageFade { element } => {
                runner.mount_image_fade(ElementId(u32::from(element)));
            }
            FuzzOp::Unmount { element } => {
                runner.unmount(ElementId(u32::from(element)));
            }
            FuzzOp::PointerMove { x, y } => runner.pointer_move(f64::from(x), f64::from(y)),
            FuzzOp::PointerDown => runner.pointer_down(),
            FuzzOp::Hover(hovering) => runner.pointer_hover(hovering),
            FuzzOp::Step { ms } => {
                runner.step(Duration::from_millis(u64::from(ms)));
            }
        }
    }
    runner.dispose();
    assert_eq!(runner.pending_timers(), 0);
    assert_eq!(runner.observed_count(), 0);
    let result = runner.step(Duration::from_secs(10));
    assert!(!result.running);
    assert_eq!(result.timers_fired, 0);
});
