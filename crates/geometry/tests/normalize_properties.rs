use displaykit_common::config::GeometrySettings;
use displaykit_geometry::{
    dpi, query_screen, DpiBounds, GeometryNormalizer, MonitorCollector, RawScreen,
};
use displaykit_platform_core::{RawMonitor, Rect, StaticDisplay};
use proptest::prelude::*;

fn single_monitor_display(width_mm: i32, height_mm: i32) -> StaticDisplay {
    StaticDisplay::new(1920, 1080, width_mm, height_mm)
        .with_monitor(RawMonitor::new(Rect::full(1920, 1080), width_mm, height_mm))
}

#[test]
fn full_hd_at_508mm_needs_no_fallback() {
    let screen = query_screen(
        &single_monitor_display(508, 286),
        &GeometrySettings::default(),
        1.0,
        1.0,
    );
    assert_eq!(screen.dpi_x, 96);
    assert_eq!(screen.dpi_y, 96);
    assert_eq!((screen.width_mm, screen.height_mm), (508, 286));
}

#[test]
fn zero_physical_size_lands_inside_default_bounds() {
    let screen = query_screen(
        &single_monitor_display(0, 0),
        &GeometrySettings::default(),
        1.0,
        1.0,
    );
    assert!(screen.dpi_x > 10 && screen.dpi_x < 500);
    assert!(screen.dpi_y > 10 && screen.dpi_y < 500);
}

#[test]
fn invalid_global_workarea_becomes_full_screen() {
    let display = single_monitor_display(508, 286).with_workarea(Rect::new(-10, 0, 1920, 1080));
    let screen = query_screen(&display, &GeometrySettings::default(), 1.0, 1.0);
    assert_eq!(screen.workarea, Rect::full(1920, 1080));
}

#[test]
fn configured_bounds_flow_from_settings() {
    let mut settings = GeometrySettings::default();
    settings.set_dpi_bounds(120, 200).unwrap();
    let screen = query_screen(&single_monitor_display(508, 286), &settings, 1.0, 1.0);
    assert_eq!((screen.dpi_x, screen.dpi_y), (120, 120));
}

fn arb_monitor() -> impl Strategy<Value = RawMonitor> {
    (
        -4000i32..4000,
        -4000i32..4000,
        1i32..8000,
        1i32..8000,
        -100i32..2000,
        -100i32..2000,
    )
        .prop_map(|(x, y, w, h, wmm, hmm)| RawMonitor::new(Rect::new(x, y, w, h), wmm, hmm))
}

fn arb_display() -> impl Strategy<Value = StaticDisplay> {
    (
        -10i32..40000,
        -10i32..40000,
        -100i32..5000,
        -100i32..5000,
        prop::collection::vec(arb_monitor(), 0..4),
        prop::option::of((-100i32..5000, -100i32..5000, 0i32..5000, 0i32..5000)),
    )
        .prop_map(|(w, h, wmm, hmm, monitors, workarea)| {
            let mut display = StaticDisplay::new(w, h, wmm, hmm);
            display.monitors = monitors;
            display.workarea = workarea.map(|(x, y, ww, wh)| Rect::new(x, y, ww, wh));
            display
        })
}

fn arb_bounds() -> impl Strategy<Value = DpiBounds> {
    (1i32..400, 1i32..400).prop_map(|(min, span)| DpiBounds::new(min, min + span).unwrap())
}

proptest! {
    #[test]
    fn output_dpi_is_always_in_bounds(
        display in arb_display(),
        bounds in arb_bounds(),
        scale in 0.5f64..3.0,
    ) {
        let monitors = MonitorCollector::default().collect(&display, scale, scale);
        let screen = GeometryNormalizer::new(bounds)
            .with_scale(scale, scale)
            .normalize(&monitors, &RawScreen::from_source(&display));

        prop_assert!(bounds.contains(screen.dpi_x), "dpi_x {} outside {:?}", screen.dpi_x, bounds);
        prop_assert!(bounds.contains(screen.dpi_y), "dpi_y {} outside {:?}", screen.dpi_y, bounds);
    }

    #[test]
    fn workarea_always_fits_the_screen(display in arb_display(), scale in 0.5f64..3.0) {
        let monitors = MonitorCollector::default().collect(&display, scale, scale);
        let screen = GeometryNormalizer::default()
            .with_scale(scale, scale)
            .normalize(&monitors, &RawScreen::from_source(&display));

        prop_assert!(screen.workarea.is_within(&Rect::full(screen.width, screen.height)));
    }

    #[test]
    fn monitor_workareas_stay_inside_their_monitor(
        monitor in arb_monitor(),
        wa in (-4000i32..8000, -4000i32..8000, 0i32..8000, 0i32..8000),
    ) {
        let mut monitor = monitor;
        let workarea = Rect::new(wa.0, wa.1, wa.2, wa.3);
        monitor.workarea = Some(workarea);
        let geometry = monitor.geometry;
        let display = StaticDisplay::new(8000, 8000, 0, 0).with_monitor(monitor);

        let collected = MonitorCollector::default().collect(&display, 1.0, 1.0);
        if workarea.is_within(&geometry) {
            prop_assert_eq!(collected[0].workarea, Some(workarea));
        } else {
            prop_assert_eq!(collected[0].workarea, None);
        }
    }

    #[test]
    fn normalize_is_idempotent(display in arb_display()) {
        let monitors = MonitorCollector::default().collect(&display, 1.0, 1.0);
        let raw = RawScreen::from_source(&display);
        let normalizer = GeometryNormalizer::default();

        let first = serde_json::to_vec(&normalizer.normalize(&monitors, &raw)).unwrap();
        let second = serde_json::to_vec(&normalizer.normalize(&monitors, &raw)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn dpi_of_zero_mm_is_zero(pixels in 0i32..40000) {
        prop_assert_eq!(dpi(pixels, 0.0), 0);
    }
}
