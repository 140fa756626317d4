//! High-velocity probe: when the raw pointer outruns the per-tick
//! eligibility query, sample interior points along the step so a small
//! target crossed mid-step is still found.

use gp_core::traits::{AccessibilityInspector, OverlayDetector};
use gp_core::types::{Point, Rect};

use crate::filter::EligibilityFilter;
use crate::geometry::frames_equivalent;

const TOUCH_PROBE_DISTANCE: f64 = 12.0;
const GLIDE_PROBE_DISTANCE: f64 = 18.0;

/// Whether this tick's raw step is long enough to have skipped an element.
pub fn needs_probe(previous_raw: Point, raw: Point, gliding: bool) -> bool {
    let distance = previous_raw.distance_to(raw);
    if gliding {
        distance >= GLIDE_PROBE_DISTANCE
    } else {
        distance >= TOUCH_PROBE_DISTANCE
    }
}

/// Samples up to 8 interior points between `previous_raw` and `raw` and
/// returns the first qualifying candidate with the sample that found it.
pub fn probe_step(
    inspector: &mut dyn AccessibilityInspector,
    overlay: &mut dyn OverlayDetector,
    filter: &EligibilityFilter,
    previous_raw: Point,
    raw: Point,
    current_frame: Option<Rect>,
) -> Option<(Rect, Point)> {
    let travel = raw - previous_raw;
    let distance = travel.magnitude();
    let samples = ((distance / 35.0).ceil() as usize).clamp(3, 8);

    for i in 1..=samples {
        let t = i as f64 / (samples + 1) as f64;
        let sample = previous_raw + travel * t;

        if overlay.is_known_overlay_topmost(sample) {
            continue;
        }
        let element = match inspector.element_info_at(sample) {
            Ok(Some(element)) => element,
            _ => continue,
        };
        if element.is_file_picker_panel {
            continue;
        }
        if current_frame.is_some_and(|c| frames_equivalent(&element.frame, &c)) {
            continue;
        }
        if let Some(frame) = filter.check(&element, sample) {
            return Some((frame, sample));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterRules;
    use gp_core::error::Result;
    use gp_core::types::ElementInfo;

    struct OneButtonInspector {
        frame: Rect,
    }

    impl AccessibilityInspector for OneButtonInspector {
        fn element_info_at(&mut self, p: Point) -> Result<Option<ElementInfo>> {
            if self.frame.contains(p) {
                Ok(Some(ElementInfo {
                    frame: self.frame,
                    role: Some("AXButton".to_string()),
                    actions: vec!["AXPress".to_string()],
                    url: None,
                    bundle_id: None,
                    is_file_picker_panel: false,
                }))
            } else {
                Ok(None)
            }
        }
    }

    struct NoOverlay;

    impl OverlayDetector for NoOverlay {
        fn is_known_overlay_topmost(&mut self, _p: Point) -> bool {
            false
        }
    }

    struct EverywhereOverlay;

    impl OverlayDetector for EverywhereOverlay {
        fn is_known_overlay_topmost(&mut self, _p: Point) -> bool {
            true
        }
    }

    #[test]
    fn test_needs_probe_thresholds() {
        let a = Point::new(0.0, 0.0);
        assert!(!needs_probe(a, Point::new(11.0, 0.0), false));
        assert!(needs_probe(a, Point::new(12.0, 0.0), false));
        assert!(!needs_probe(a, Point::new(15.0, 0.0), true));
        assert!(needs_probe(a, Point::new(18.0, 0.0), true));
    }

    #[test]
    fn test_probe_finds_skipped_button() {
        let frame = Rect::new(200.0, 90.0, 60.0, 40.0);
        let mut inspector = OneButtonInspector { frame };
        let mut overlay = NoOverlay;
        let filter = EligibilityFilter::new(FilterRules::default());

        // A 400 px step straight across the button.
        let found = probe_step(
            &mut inspector,
            &mut overlay,
            &filter,
            Point::new(0.0, 100.0),
            Point::new(400.0, 100.0),
            None,
        );
        let (hit, sample) = found.expect("probe should find the crossed button");
        assert_eq!(hit, frame);
        assert!(frame.contains(sample));
    }

    #[test]
    fn test_probe_skips_current_frame() {
        let frame = Rect::new(200.0, 90.0, 60.0, 40.0);
        let mut inspector = OneButtonInspector { frame };
        let mut overlay = NoOverlay;
        let filter = EligibilityFilter::new(FilterRules::default());

        let found = probe_step(
            &mut inspector,
            &mut overlay,
            &filter,
            Point::new(0.0, 100.0),
            Point::new(400.0, 100.0),
            Some(frame),
        );
        assert!(found.is_none());
    }

    #[test]
    fn test_probe_skips_foreign_overlay_samples() {
        let frame = Rect::new(200.0, 90.0, 60.0, 40.0);
        let mut inspector = OneButtonInspector { frame };
        let mut overlay = EverywhereOverlay;
        let filter = EligibilityFilter::new(FilterRules::default());

        let found = probe_step(
            &mut inspector,
            &mut overlay,
            &filter,
            Point::new(0.0, 100.0),
            Point::new(400.0, 100.0),
            None,
        );
        assert!(found.is_none());
    }
}
