//! Skyburst entry point
//!
//! The browser build is driven through `skyburst::web::WebSession`. The
//! native binary is a headless driver: it plays a scripted pointer path
//! against a session, rebuilds the session whenever a crash asks for a
//! restart, and prints the final frame as JSON.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::Cell;
    use std::rc::Rc;

    use skyburst::sim::Snapshot;
    use skyburst::{QualityPreset, Session, Settings, Viewport};

    env_logger::init();
    log::info!("Skyburst (native) starting...");

    let settings = std::env::args()
        .nth(1)
        .and_then(|arg| QualityPreset::from_str(&arg))
        .map(Settings::from_preset)
        .unwrap_or_default();
    let seed: u64 = std::env::var("SKYBURST_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed);

    let viewport = Viewport::new(960.0, 540.0);
    let frame_ms = 1000.0 / 60.0;
    let total_frames = 60 * 90;

    let restart_requested = Rc::new(Cell::new(false));
    let new_session = |seed: u64| {
        let flag = restart_requested.clone();
        Session::new(
            viewport,
            seed,
            settings.clone(),
            Box::new(move || flag.set(true)),
        )
    };

    let mut run = 0u64;
    let mut session = new_session(seed);
    session.start(0.0);

    let mut last: Option<Snapshot> = None;
    let mut sink = |snapshot: &Snapshot| last = Some(snapshot.clone());

    for frame in 1..=total_frames {
        let now = frame as f64 * frame_ms;
        let t = now as f32 / 1000.0;

        // Sweep the pointer across the sky, tapping every couple of seconds
        let x = viewport.width * (0.5 + 0.4 * (t * 0.7).sin());
        let y = viewport.height * (0.45 + 0.25 * (t * 1.3).cos());
        session.on_pointer_move(x, y);
        if frame % 120 == 0 {
            session.on_activate(x, y);
        }

        session.frame(now, &mut sink);

        if restart_requested.replace(false) {
            run += 1;
            log::info!("Restart #{} at {:.1}s", run, t);
            session = new_session(seed.wrapping_add(run));
            session.start(now);
        }
    }
    session.stop();

    match last.as_ref().map(serde_json::to_string_pretty) {
        Some(Ok(json)) => println!("{}", json),
        Some(Err(e)) => log::error!("Failed to encode snapshot: {}", e),
        None => log::warn!("No frame was rendered"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_start, this is just to satisfy the compiler
}
