//! Scroll-linked transforms and the motion presets used by the views.
//!
//! Everything here is a pure function of its inputs so the view layer only
//! has to sample the viewport and paint the result.

/// Piecewise-linear map from sorted input stops to output stops.
///
/// Inputs outside the first/last stop clamp to the boundary outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    input: &'static [f64],
    output: &'static [f64],
}

impl Transform {
    pub const fn new(input: &'static [f64], output: &'static [f64]) -> Self {
        assert!(input.len() == output.len() && !input.is_empty());
        Self { input, output }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let last = self.input.len() - 1;

        if !value.is_finite() || value <= self.input[0] {
            return self.output[0];
        }
        if value >= self.input[last] {
            return self.output[last];
        }

        let segment = self
            .input
            .windows(2)
            .position(|pair| value <= pair[1])
            .unwrap_or(last - 1);
        let (from, to) = (self.input[segment], self.input[segment + 1]);
        let span = to - from;
        if span <= f64::EPSILON {
            return self.output[segment + 1];
        }

        let t = (value - from) / span;
        self.output[segment] + (self.output[segment + 1] - self.output[segment]) * t
    }
}

pub const HERO_SCALE: Transform = Transform::new(&[0.0, 0.2], &[1.0, 0.8]);
pub const HERO_OPACITY: Transform = Transform::new(&[0.0, 0.2], &[1.0, 0.3]);
pub const HERO_LIFT_PX: Transform = Transform::new(&[0.0, 1.0], &[0.0, -50.0]);

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if !numerator.is_finite() || !denominator.is_finite() || denominator <= 0.0 {
        return 0.0;
    }
    (numerator / denominator).clamp(0.0, 1.0)
}

/// One reading of the page's vertical scroll position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollSample {
    pub offset: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollSample {
    pub fn new(offset: f64, viewport_height: f64, document_height: f64) -> Self {
        Self {
            offset,
            viewport_height,
            document_height,
        }
    }

    /// How much of the first viewport height has been scrolled, in [0, 1].
    pub fn viewport_progress(&self) -> f64 {
        ratio(self.offset, self.viewport_height)
    }

    /// How far through the scrollable document the viewport is, in [0, 1].
    pub fn document_progress(&self) -> f64 {
        ratio(self.offset, self.document_height - self.viewport_height)
    }

    /// The scroll-down button stays until a full viewport height is scrolled.
    pub fn affordance_visible(&self) -> bool {
        self.viewport_progress() < 1.0
    }

    pub fn hero_params(&self) -> DerivedVisualParams {
        DerivedVisualParams::at(self.document_progress())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedVisualParams {
    pub scale: f64,
    pub opacity: f64,
    pub vertical_offset: f64,
}

impl DerivedVisualParams {
    pub fn at(progress: f64) -> Self {
        Self {
            scale: HERO_SCALE.apply(progress),
            opacity: HERO_OPACITY.apply(progress),
            vertical_offset: HERO_LIFT_PX.apply(progress),
        }
    }

    pub fn css(&self) -> String {
        format!(
            "transform: translateY({:.2}px) scale({:.4}); opacity: {:.4};",
            self.vertical_offset, self.scale, self.opacity
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    EaseOut,
    EaseIn,
    EaseInOut,
    /// Approximates a spring with stiffness 100 and damping 20.
    Spring,
}

impl Easing {
    pub fn css(self) -> &'static str {
        match self {
            Self::EaseOut => "ease-out",
            Self::EaseIn => "ease-in",
            Self::EaseInOut => "ease-in-out",
            Self::Spring => "cubic-bezier(0.22, 1.2, 0.36, 1)",
        }
    }
}

/// A resting pose for an animated element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionFrame {
    pub opacity: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl MotionFrame {
    pub const REST: Self = Self {
        opacity: 1.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn css(&self) -> String {
        format!(
            "opacity: {}; transform: translateY({}px) scale({});",
            self.opacity, self.translate_y, self.scale
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Variant {
    pub frame: MotionFrame,
    pub duration_ms: u32,
    pub easing: Easing,
}

impl Variant {
    pub fn css(&self) -> String {
        format!(
            "{} transition: opacity {ms}ms {ease}, transform {ms}ms {ease};",
            self.frame.css(),
            ms = self.duration_ms,
            ease = self.easing.css()
        )
    }
}

pub const MENU_HIDDEN: MotionFrame = MotionFrame {
    opacity: 0.0,
    translate_y: -20.0,
    scale: 0.95,
};

pub const MENU_VISIBLE: Variant = Variant {
    frame: MotionFrame::REST,
    duration_ms: 200,
    easing: Easing::EaseOut,
};

pub const MENU_EXIT: Variant = Variant {
    frame: MotionFrame {
        opacity: 0.0,
        translate_y: -10.0,
        scale: 0.95,
    },
    duration_ms: 150,
    easing: Easing::EaseIn,
};

pub const HERO_ENTRANCE: Variant = Variant {
    frame: MotionFrame {
        opacity: 0.0,
        translate_y: 50.0,
        scale: 1.0,
    },
    duration_ms: 1_000,
    easing: Easing::EaseOut,
};

/// Pose of a section child before its section scrolls into view.
pub const REVEAL_HIDDEN: MotionFrame = MotionFrame {
    opacity: 0.0,
    translate_y: 50.0,
    scale: 1.0,
};

pub const REVEAL_ITEM: Variant = Variant {
    frame: MotionFrame::REST,
    duration_ms: 800,
    easing: Easing::Spring,
};

/// Children leaving the viewport ease back to the hidden pose together.
pub const REVEAL_EXIT: Variant = Variant {
    frame: REVEAL_HIDDEN,
    duration_ms: 300,
    easing: Easing::EaseInOut,
};

pub const REVEAL_STAGGER_MS: u32 = 200;

/// Style for the `index`-th child of a revealed section.
pub fn reveal_style(index: usize, visible: bool) -> String {
    if !visible {
        return REVEAL_EXIT.css();
    }

    let delay = REVEAL_STAGGER_MS.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
    format!("{} transition-delay: {delay}ms;", REVEAL_ITEM.css())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn hero_params_at_the_table_edges() {
        let start = DerivedVisualParams::at(0.0);
        assert_eq!(start, DerivedVisualParams { scale: 1.0, opacity: 1.0, vertical_offset: 0.0 });

        let shrunk = DerivedVisualParams::at(0.2);
        assert!(approx(shrunk.scale, 0.8));
        assert!(approx(shrunk.opacity, 0.3));
        assert!(approx(shrunk.vertical_offset, -10.0));

        let end = DerivedVisualParams::at(1.0);
        assert!(approx(end.vertical_offset, -50.0));
    }

    #[test]
    fn hero_params_clamp_outside_domain() {
        assert_eq!(DerivedVisualParams::at(-3.0), DerivedVisualParams::at(0.0));

        let past = DerivedVisualParams::at(0.7);
        assert!(approx(past.scale, 0.8));
        assert!(approx(past.opacity, 0.3));
    }

    #[test]
    fn midpoint_interpolates_linearly() {
        assert!(approx(HERO_SCALE.apply(0.1), 0.9));
        assert!(approx(HERO_OPACITY.apply(0.05), 0.825));
    }

    #[test]
    fn multi_stop_transform_picks_the_right_segment() {
        const BUMP: Transform = Transform::new(&[0.0, 0.5, 1.0], &[0.0, 10.0, 0.0]);

        assert!(approx(BUMP.apply(0.25), 5.0));
        assert!(approx(BUMP.apply(0.5), 10.0));
        assert!(approx(BUMP.apply(0.75), 5.0));
    }

    #[test]
    fn non_finite_input_maps_to_first_output() {
        assert_eq!(HERO_SCALE.apply(f64::NAN), 1.0);
    }

    #[test]
    fn degenerate_heights_yield_zero_progress() {
        let short_page = ScrollSample::new(40.0, 800.0, 600.0);
        assert_eq!(short_page.document_progress(), 0.0);

        let no_viewport = ScrollSample::new(40.0, 0.0, 600.0);
        assert_eq!(no_viewport.viewport_progress(), 0.0);
    }

    #[test]
    fn affordance_hides_after_first_viewport() {
        assert!(ScrollSample::new(0.0, 800.0, 4000.0).affordance_visible());
        assert!(ScrollSample::new(799.0, 800.0, 4000.0).affordance_visible());
        assert!(!ScrollSample::new(800.0, 800.0, 4000.0).affordance_visible());
        assert!(!ScrollSample::new(2400.0, 800.0, 4000.0).affordance_visible());
    }

    #[test]
    fn document_progress_reaches_one_at_the_bottom() {
        let bottom = ScrollSample::new(3200.0, 800.0, 4000.0);
        assert_eq!(bottom.document_progress(), 1.0);
        assert!(approx(bottom.hero_params().vertical_offset, -50.0));
    }

    #[test]
    fn reveal_style_staggers_by_index() {
        assert!(reveal_style(0, true).contains("transition-delay: 0ms"));
        assert!(reveal_style(3, true).contains("transition-delay: 600ms"));
        assert!(reveal_style(3, false).contains("translateY(50px)"));
    }

    #[test]
    fn hiding_animates_back_instead_of_snapping() {
        let hidden = reveal_style(2, false);

        assert!(hidden.contains("opacity: 0;"));
        assert!(hidden.contains("transition: opacity 300ms ease-in-out"));
        assert!(!hidden.contains("transition: none"));
        assert!(!hidden.contains("transition-delay"));
    }

    #[test]
    fn menu_variants_use_expected_timings() {
        assert!(MENU_VISIBLE.css().contains("200ms ease-out"));
        assert!(MENU_EXIT.css().contains("150ms ease-in"));
    }

    proptest! {
        #[test]
        fn progress_is_clamped(offset in -1e6f64..1e6, viewport in 0.0f64..5e3, document in 0.0f64..5e4) {
            let sample = ScrollSample::new(offset, viewport, document);
            prop_assert!((0.0..=1.0).contains(&sample.viewport_progress()));
            prop_assert!((0.0..=1.0).contains(&sample.document_progress()));
        }

        #[test]
        fn progress_is_monotonic_in_offset(a in 0.0f64..1e5, b in 0.0f64..1e5, viewport in 1.0f64..5e3, extra in 1.0f64..5e4) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let document = viewport + extra;
            let low = ScrollSample::new(low, viewport, document);
            let high = ScrollSample::new(high, viewport, document);
            prop_assert!(low.document_progress() <= high.document_progress());
            prop_assert!(low.viewport_progress() <= high.viewport_progress());
        }

        #[test]
        fn hero_scale_stays_within_outputs(progress in -10.0f64..10.0) {
            let params = DerivedVisualParams::at(progress);
            prop_assert!((0.8..=1.0).contains(&params.scale));
            prop_assert!((0.3..=1.0).contains(&params.opacity));
            prop_assert!((-50.0..=0.0).contains(&params.vertical_offset));
        }
    }
}
