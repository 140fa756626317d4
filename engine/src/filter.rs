//! Target eligibility filter: decides whether the element under the raw
//! pointer deserves magnetism. Role, action, area, shape, and app-specific
//! rules short-circuit in order; a short linger window masks accessibility
//! flicker.

use std::time::{Duration, Instant};

use gp_core::types::{ElementInfo, Point, Rect};

/// Rule tables, cloned out of the configuration at startup.
#[derive(Debug, Clone)]
pub struct FilterRules {
    pub magnetic_roles: Vec<String>,
    pub press_actions: Vec<String>,
    pub ignored_actions: Vec<String>,
    pub file_panel_bundle_id: String,
    pub file_browser_bundle_id: String,
    pub mail_bundle_id: String,
    pub linger: Duration,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            magnetic_roles: [
                "AXButton",
                "AXPopUpButton",
                "AXLink",
                "AXCheckBox",
                "AXRadioButton",
                "AXMenuItem",
                "AXMenuBarItem",
                "AXMenuButton",
                "AXComboBox",
                "AXTextField",
                "AXSegmentedControl",
                "AXTabButton",
                "AXDisclosureTriangle",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            press_actions: ["AXPress", "AXConfirm", "AXPick", "AXShowMenu"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ignored_actions: vec!["AXScrollToVisible".to_string()],
            file_panel_bundle_id: "com.apple.appkit.xpc.openAndSavePanelService".to_string(),
            file_browser_bundle_id: "com.apple.finder".to_string(),
            mail_bundle_id: "com.apple.mail".to_string(),
            linger: Duration::from_millis(60),
        }
    }
}

const ROW_LIKE_ROLES: &[&str] = &["AXRow", "AXCell", "AXOutlineRow"];
const LIST_CONTAINER_ROLES: &[&str] = &[
    "AXRow",
    "AXOutline",
    "AXOutlineRow",
    "AXImage",
    "AXStaticText",
    "AXGroup",
    "AXCell",
];

#[derive(Debug, Clone, Copy)]
struct LingerMemory {
    frame: Rect,
    seen_at: Instant,
}

pub struct EligibilityFilter {
    rules: FilterRules,
    linger: Option<LingerMemory>,
}

impl EligibilityFilter {
    pub fn new(rules: FilterRules) -> Self {
        Self {
            rules,
            linger: None,
        }
    }

    /// Per-tick evaluation; updates the linger memory.
    pub fn evaluate(
        &mut self,
        element: Option<&ElementInfo>,
        raw: Point,
        now: Instant,
    ) -> Option<Rect> {
        let Some(element) = element else {
            return self.linger_result(raw, now);
        };

        // File picker panels never attract, and forget any linger.
        if element.is_file_picker_panel
            || element.bundle_id.as_deref() == Some(self.rules.file_panel_bundle_id.as_str())
        {
            self.linger = None;
            return None;
        }

        match self.check(element, raw) {
            Some(frame) => {
                self.linger = Some(LingerMemory {
                    frame,
                    seen_at: now,
                });
                Some(frame)
            }
            None => self.linger_result(raw, now),
        }
    }

    /// Pure candidacy test without linger side effects; the high-velocity
    /// probe evaluates samples through this.
    pub fn check(&self, element: &ElementInfo, raw: Point) -> Option<Rect> {
        if element.is_file_picker_panel
            || element.bundle_id.as_deref() == Some(self.rules.file_panel_bundle_id.as_str())
        {
            return None;
        }

        if element
            .actions
            .iter()
            .any(|a| self.rules.ignored_actions.iter().any(|i| i == a))
        {
            return None;
        }

        let frame = element.frame;
        let role = element.role.as_deref();

        // App-specific list suppression.
        if let Some(bundle) = element.bundle_id.as_deref() {
            if bundle == self.rules.file_browser_bundle_id {
                if role.is_some_and(|r| LIST_CONTAINER_ROLES.contains(&r)) {
                    return None;
                }
            } else if bundle == self.rules.mail_bundle_id {
                let aspect_wh = frame.w / frame.h.max(1.0);
                if role.is_some_and(|r| LIST_CONTAINER_ROLES.contains(&r))
                    && frame.w < 100.0
                    && frame.h < 100.0
                    && aspect_wh > 0.5
                    && aspect_wh < 2.0
                {
                    return None;
                }
            }
        }

        let qualifies_by_role =
            role.is_some_and(|r| self.rules.magnetic_roles.iter().any(|m| m == r));
        let has_press_action = element
            .actions
            .iter()
            .any(|a| self.rules.press_actions.iter().any(|p| p == a));
        let has_link = element.url.is_some();
        let qualifies_by_actions_or_url = has_press_action || has_link;

        let area = frame.area();
        let max_area = match role {
            Some("AXLink") => 30_000.0,
            Some("AXTextArea") => 12_000.0,
            Some("AXGroup") => 10_500.0,
            Some("AXStaticText") => 13_500.0,
            _ => 15_000.0,
        };

        let qualifies_implicitly =
            role.is_none() && qualifies_by_actions_or_url && area > 100.0 && area <= 15_000.0;

        let base = ((qualifies_by_role || qualifies_by_actions_or_url) && area <= max_area)
            || qualifies_implicitly;
        if !base {
            return None;
        }

        // Extreme shapes never attract.
        let aspect = frame.aspect_ratio();
        if aspect > 8.0 && frame.h < 25.0 {
            return None;
        }
        let is_row_like = role.is_some_and(|r| ROW_LIKE_ROLES.contains(&r));
        if is_row_like && aspect > 1.5 && frame.w > 120.0 {
            return None;
        }
        if role.is_some_and(|r| matches!(r, "AXStaticText" | "AXGroup" | "AXButton"))
            && aspect > 1.8
            && frame.w > 140.0
            && frame.h < 50.0
        {
            return None;
        }
        if aspect > 2.2 && frame.w > 160.0 && frame.h < 45.0 && area < 12_000.0 {
            return None;
        }

        // Proximity gate: the pointer must plausibly be aiming at it.
        if !qualifies_implicitly {
            let inset_x = (frame.w * 0.2).clamp(8.0, 32.0);
            let inset_y = (frame.h * 0.6).clamp(8.0, 36.0);
            let near_rect = frame.inset(-inset_x, -inset_y).contains(raw);
            let near_center =
                raw.distance_to(frame.center()) <= (frame.h * 1.35).max(180.0);
            if !near_rect && !near_center {
                return None;
            }
        }

        Some(frame)
    }

    fn linger_result(&mut self, raw: Point, now: Instant) -> Option<Rect> {
        if let Some(memory) = self.linger {
            if now.duration_since(memory.seen_at) < self.rules.linger
                && memory.frame.inset(-12.0, -12.0).contains(raw)
            {
                return Some(memory.frame);
            }
        }
        self.linger = None;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(frame: Rect) -> ElementInfo {
        ElementInfo {
            frame,
            role: Some("AXButton".to_string()),
            actions: vec!["AXPress".to_string()],
            url: None,
            bundle_id: Some("com.example.app".to_string()),
            is_file_picker_panel: false,
        }
    }

    fn filter() -> EligibilityFilter {
        EligibilityFilter::new(FilterRules::default())
    }

    #[test]
    fn test_button_qualifies() {
        let mut f = filter();
        let el = button(Rect::new(100.0, 100.0, 60.0, 40.0));
        let raw = Point::new(120.0, 110.0);
        assert_eq!(f.evaluate(Some(&el), raw, Instant::now()), Some(el.frame));
    }

    #[test]
    fn test_file_picker_panel_rejected_and_resets_linger() {
        let mut f = filter();
        let el = button(Rect::new(100.0, 100.0, 60.0, 40.0));
        let raw = Point::new(120.0, 110.0);
        let now = Instant::now();
        assert!(f.evaluate(Some(&el), raw, now).is_some());

        let mut panel = button(Rect::new(100.0, 100.0, 60.0, 40.0));
        panel.is_file_picker_panel = true;
        assert!(f.evaluate(Some(&panel), raw, now).is_none());
        // Linger was cleared, so a query gap yields nothing.
        assert!(f.evaluate(None, raw, now).is_none());
    }

    #[test]
    fn test_ignored_action_rejects() {
        let mut f = filter();
        let mut el = button(Rect::new(100.0, 100.0, 60.0, 40.0));
        el.actions.push("AXScrollToVisible".to_string());
        assert!(f
            .evaluate(Some(&el), Point::new(120.0, 110.0), Instant::now())
            .is_none());
    }

    #[test]
    fn test_file_browser_rows_excluded_buttons_kept() {
        let mut f = filter();
        let raw = Point::new(120.0, 110.0);
        let now = Instant::now();

        let mut row = button(Rect::new(100.0, 100.0, 80.0, 40.0));
        row.bundle_id = Some("com.apple.finder".to_string());
        row.role = Some("AXRow".to_string());
        assert!(f.evaluate(Some(&row), raw, now).is_none());

        let mut btn = button(Rect::new(100.0, 100.0, 80.0, 40.0));
        btn.bundle_id = Some("com.apple.finder".to_string());
        assert!(f.evaluate(Some(&btn), raw, now).is_some());
    }

    #[test]
    fn test_mail_small_list_cells_excluded() {
        let mut f = filter();
        let mut cell = button(Rect::new(100.0, 100.0, 60.0, 40.0));
        cell.bundle_id = Some("com.apple.mail".to_string());
        cell.role = Some("AXCell".to_string());
        assert!(f
            .evaluate(Some(&cell), Point::new(120.0, 110.0), Instant::now())
            .is_none());
    }

    #[test]
    fn test_role_area_cap() {
        let mut f = filter();
        // 200x100 = 20000 > 15000 default cap
        let el = button(Rect::new(100.0, 100.0, 200.0, 100.0));
        assert!(f
            .evaluate(Some(&el), Point::new(150.0, 150.0), Instant::now())
            .is_none());

        // Links get a bigger allowance
        let mut link = button(Rect::new(100.0, 100.0, 200.0, 100.0));
        link.role = Some("AXLink".to_string());
        link.url = Some("https://example.net".to_string());
        assert!(f
            .evaluate(Some(&link), Point::new(150.0, 150.0), Instant::now())
            .is_some());
    }

    #[test]
    fn test_implicit_qualification_without_role() {
        let mut f = filter();
        let el = ElementInfo {
            frame: Rect::new(100.0, 100.0, 60.0, 40.0),
            role: None,
            actions: vec!["AXPress".to_string()],
            url: None,
            bundle_id: None,
            is_file_picker_panel: false,
        };
        assert!(f
            .evaluate(Some(&el), Point::new(120.0, 110.0), Instant::now())
            .is_some());

        // Tiny frames do not qualify implicitly.
        let mut tiny = el.clone();
        tiny.frame = Rect::new(100.0, 100.0, 10.0, 10.0);
        assert!(f
            .evaluate(Some(&tiny), Point::new(102.0, 102.0), Instant::now())
            .is_none());
    }

    #[test]
    fn test_extreme_shapes_rejected() {
        let mut f = filter();
        let now = Instant::now();

        // aspect > 8 and short
        let sliver = button(Rect::new(100.0, 100.0, 300.0, 20.0));
        assert!(f.evaluate(Some(&sliver), Point::new(150.0, 110.0), now).is_none());

        // Wide row
        let mut row = button(Rect::new(100.0, 100.0, 200.0, 60.0));
        row.role = Some("AXRow".to_string());
        assert!(f.evaluate(Some(&row), Point::new(150.0, 120.0), now).is_none());

        // Sidebar-shaped wide button
        let bar = button(Rect::new(100.0, 100.0, 180.0, 40.0));
        assert!(f.evaluate(Some(&bar), Point::new(150.0, 120.0), now).is_none());
    }

    #[test]
    fn test_proximity_gate() {
        let mut f = filter();
        let el = button(Rect::new(100.0, 100.0, 60.0, 40.0));
        // Far away: rejected despite qualifying by role.
        assert!(f
            .evaluate(Some(&el), Point::new(900.0, 900.0), Instant::now())
            .is_none());
        // Within the center allowance: accepted.
        assert!(f
            .evaluate(Some(&el), Point::new(250.0, 120.0), Instant::now())
            .is_some());
    }

    #[test]
    fn test_linger_reemits_within_window() {
        let mut f = filter();
        let el = button(Rect::new(100.0, 100.0, 60.0, 40.0));
        let raw = Point::new(120.0, 110.0);
        let t0 = Instant::now();
        assert!(f.evaluate(Some(&el), raw, t0).is_some());

        // Accessibility stutters for a tick; the frame survives.
        let t1 = t0 + Duration::from_millis(30);
        assert_eq!(f.evaluate(None, raw, t1), Some(el.frame));

        // Past the window it is gone.
        let t2 = t0 + Duration::from_millis(80);
        assert!(f.evaluate(None, raw, t2).is_none());
    }

    #[test]
    fn test_linger_requires_pointer_inside_frame() {
        let mut f = filter();
        let el = button(Rect::new(100.0, 100.0, 60.0, 40.0));
        let t0 = Instant::now();
        assert!(f.evaluate(Some(&el), Point::new(120.0, 110.0), t0).is_some());

        let far = Point::new(400.0, 400.0);
        assert!(f
            .evaluate(None, far, t0 + Duration::from_millis(10))
            .is_none());
    }
}
