use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tui_match3::core::{GameConfig, GameSnapshot, GameState};
use tui_match3::term::{FrameBuffer, GameView, Viewport};
use tui_match3::types::Position;

struct CountingAlloc;

static COUNT_ENABLED: AtomicBool = AtomicBool::new(false);
static ALLOC_COUNT: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.realloc(ptr, layout, new_size)
    }
}

fn with_alloc_counting<F: FnOnce()>(f: F) -> usize {
    ALLOC_COUNT.store(0, Ordering::Relaxed);
    COUNT_ENABLED.store(true, Ordering::Relaxed);
    f();
    COUNT_ENABLED.store(false, Ordering::Relaxed);
    ALLOC_COUNT.load(Ordering::Relaxed)
}

#[test]
fn snapshot_and_render_are_allocation_free_after_warmup() {
    let view = GameView::default();
    let viewport = Viewport::new(80, 24);
    let mut fb = FrameBuffer::new(viewport.width, viewport.height);

    let mut game = GameState::new(GameConfig::instant(1)).unwrap();
    game.activate(Position::new(3, 3));

    let mut snap = GameSnapshot::default();
    // Warm-up sizes the tile buffer.
    game.snapshot_into(&mut snap);
    view.render_into(&snap, Some(Position::new(3, 3)), viewport, &mut fb);

    let allocs = with_alloc_counting(|| {
        for i in 0..200u16 {
            game.snapshot_into(&mut snap);
            let cursor = Position::new(i % 9, i % 8);
            view.render_into(&snap, Some(cursor), viewport, &mut fb);
        }
    });

    assert_eq!(allocs, 0);
}
