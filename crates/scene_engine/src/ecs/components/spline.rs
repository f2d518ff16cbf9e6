//! Cubic Bézier splines

use serde::{Serialize, Deserialize};

use crate::ecs::component::{Component, ComponentBase, ComponentKind, ComponentType};
use crate::editor::{self, EditorKind, Property, PropertyEntry, PropertyValue};
use crate::foundation::math::{utils, Vec3};
use crate::scene::{Scene, SceneError};
use crate::spatial::BoundingBox;

/// Default samples per segment, not counting the start point
pub const DEFAULT_SECTIONS: u32 = 10;

/// One cubic Bézier segment with control points `a..d`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierCurve {
    /// Start point
    pub a: Vec3,
    /// First control point
    pub b: Vec3,
    /// Second control point
    pub c: Vec3,
    /// End point
    pub d: Vec3,
}

impl BezierCurve {
    /// Create a segment
    pub fn new(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Self { a, b, c, d }
    }

    /// Point at `t` in `[0, 1]` by de Casteljau subdivision
    pub fn point(&self, t: f32) -> Vec3 {
        let e = utils::lerp_vec3(&self.a, &self.b, t);
        let f = utils::lerp_vec3(&self.b, &self.c, t);
        let g = utils::lerp_vec3(&self.c, &self.d, t);
        let h = utils::lerp_vec3(&e, &f, t);
        let j = utils::lerp_vec3(&f, &g, t);
        utils::lerp_vec3(&h, &j, t)
    }
}

/// Chain of Bézier segments in the entity's local space
#[derive(Debug, Clone)]
pub struct Spline {
    base: ComponentBase,
    sections: u32,
    segments: Vec<BezierCurve>,
}

impl Default for Spline {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            sections: DEFAULT_SECTIONS,
            segments: Vec::new(),
        }
    }
}

const PROPERTIES: &[Property<Spline>] = &[Property {
    name: "sections",
    editor: EditorKind::Number { min: Some(1.0), max: Some(1024.0) },
    get: |s| PropertyValue::Number(s.sections as f32),
    set: |s, v| v.as_number().map(|n| s.set_sections(n.round() as u32)).is_some(),
}];

impl Spline {
    /// Append a segment
    pub fn add_segment(&mut self, segment: BezierCurve) {
        self.segments.push(segment);
    }

    /// Segments in order
    pub fn segments(&self) -> &[BezierCurve] {
        &self.segments
    }

    /// Samples per segment, not counting the start point
    pub fn sections(&self) -> u32 {
        self.sections
    }

    /// Change the sampling density, at least one section
    pub fn set_sections(&mut self, sections: u32) {
        self.sections = sections.max(1);
    }

    /// Number of sampled points
    pub fn len(&self) -> usize {
        self.segments.len() * (self.sections as usize + 1)
    }

    /// Whether the spline has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sampled points, `sections + 1` per segment, in local space
    pub fn points(&self) -> Vec<Vec3> {
        let sections = self.sections as f32;
        self.segments
            .iter()
            .flat_map(|segment| (0..=self.sections).map(move |i| segment.point(i as f32 / sections)))
            .collect()
    }

    /// Bounds of the sampled points
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points())
    }

    /// Local point at `t` in `[0, 1]` over the whole spline
    pub fn point(&self, t: f32) -> Option<Vec3> {
        let count = self.segments.len();
        if count == 0 {
            return None;
        }
        let scaled = t.clamp(0.0, 1.0) * count as f32;
        let index = (scaled.floor() as usize).min(count - 1);
        Some(self.segments[index].point(scaled - index as f32))
    }

    /// Point at `t` offset by the entity's world position
    pub fn world_point(&self, scene: &Scene, t: f32) -> Option<Vec3> {
        let offset = scene.world_position(self.base.owner()).unwrap_or_else(Vec3::zeros);
        self.point(t).map(|point| point + offset)
    }
}

impl Component for Spline {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Spline
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn properties(&self) -> Vec<PropertyEntry> {
        editor::describe(PROPERTIES, self)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), SceneError> {
        editor::assign(PROPERTIES, ComponentKind::Spline, self, name, value)
    }
}

impl ComponentType for Spline {
    const KIND: ComponentKind = ComponentKind::Spline;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arch() -> BezierCurve {
        BezierCurve::new(
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        )
    }

    #[test]
    fn test_curve_endpoints_and_midpoint() {
        let curve = arch();
        assert_relative_eq!(curve.point(0.0), Vec3::zeros());
        assert_relative_eq!(curve.point(1.0), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(curve.point(0.5), Vec3::new(0.5, 0.75, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_samples_per_segment() {
        let mut spline = Spline::default();
        spline.add_segment(arch());
        spline.add_segment(arch());
        assert_eq!(spline.len(), 22);
        assert_eq!(spline.points().len(), 22);

        let bounds = spline.bounding_box();
        assert_relative_eq!(bounds.max.y, 0.75, epsilon = 1e-6);
        assert_relative_eq!(bounds.min.x, 0.0);
    }

    #[test]
    fn test_point_spans_all_segments() {
        let mut spline = Spline::default();
        assert!(spline.point(0.5).is_none());
        spline.add_segment(arch());
        spline.add_segment(BezierCurve::new(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        ));
        assert_relative_eq!(spline.point(0.25).unwrap(), Vec3::new(0.5, 0.75, 0.0), epsilon = 1e-6);
        assert_relative_eq!(spline.point(1.0).unwrap(), Vec3::new(3.0, 0.0, 0.0));
    }
}
