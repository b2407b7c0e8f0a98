//! Class toggle binding: adds CSS classes to elements while the scene is
//! active and removes them when it leaves.

use crate::dom::{Dom, ElementTarget};
use crate::log_level::LogLevel;
use crate::scene::Scene;
use crate::state::SceneState;

#[derive(Debug, Clone)]
pub(crate) struct ClassToggle<N> {
    pub elements: Vec<N>,
    /// Space-separated.
    pub classes: String,
}

impl<D: Dom> Scene<D> {
    /// Toggles `classes` on every element of `target` on enter/leave.
    /// Replaces an existing toggle. Returns `false` (and logs) when nothing
    /// resolves or no class is given.
    pub fn set_class_toggle(&mut self, target: ElementTarget<D::Node>, classes: &str) -> bool {
        let elements = target.resolve_all(&self.dom);
        if elements.is_empty() {
            self.log(
                LogLevel::Error,
                format_args!(
                    "ERROR calling method 'setClassToggle()': Invalid element argument supplied."
                ),
            );
            return false;
        }
        let classes = classes.split_whitespace().collect::<Vec<_>>().join(" ");
        if classes.is_empty() {
            self.log(
                LogLevel::Error,
                format_args!(
                    "ERROR calling method 'setClassToggle()': Invalid classes argument supplied."
                ),
            );
            return false;
        }
        if self.class_toggle.is_some() {
            self.remove_class_toggle(false);
        }
        self.class_toggle = Some(ClassToggle { elements, classes });
        self.log(LogLevel::Debug, format_args!("added class toggle"));
        if self.state == SceneState::During {
            self.apply_class_toggle(true);
        }
        true
    }

    /// With `reset` the classes are stripped from the elements.
    pub fn remove_class_toggle(&mut self, reset: bool) {
        let Some(toggle) = self.class_toggle.take() else {
            return;
        };
        if reset {
            for element in &toggle.elements {
                self.dom.remove_class(element, &toggle.classes);
            }
        }
        self.log(
            LogLevel::Debug,
            format_args!("removed class toggle (reset: {reset})"),
        );
    }

    pub fn has_class_toggle(&self) -> bool {
        self.class_toggle.is_some()
    }

    pub(crate) fn apply_class_toggle(&self, entering: bool) {
        let Some(toggle) = &self.class_toggle else {
            return;
        };
        for element in &toggle.elements {
            if entering {
                self.dom.add_class(element, &toggle.classes);
            } else {
                self.dom.remove_class(element, &toggle.classes);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::Dom;
    use crate::mock::MockDom;
    use crate::options::SceneOptions;
    use crate::scene::Scene;
    use crate::Duration;

    #[test]
    fn classes_follow_enter_and_leave() {
        let dom = MockDom::default();
        let a = dom.append(dom.body_node(), "li", None);
        let b = dom.append(dom.body_node(), "li", None);
        dom.add_class(&a, "item");
        dom.add_class(&b, "item");
        let mut scene = Scene::new(
            dom.clone(),
            SceneOptions::default().duration(Duration::Fixed(100.0)),
        )
        .unwrap();
        assert!(scene.set_class_toggle(".item".into(), "  active  lit "));
        scene.set_progress(0.5);
        assert!(dom.has_class(a, "active") && dom.has_class(b, "lit"));
        scene.set_progress(1.0);
        assert!(!dom.has_class(a, "active"));
        assert_eq!(dom.classes(b), vec!["item".to_string()]);
    }

    #[test]
    fn invalid_toggles_are_rejected() {
        let dom = MockDom::default();
        dom.append(dom.body_node(), "p", Some("x"));
        let mut scene = Scene::new(dom, SceneOptions::default()).unwrap();
        assert!(!scene.set_class_toggle(".missing".into(), "on"));
        assert!(!scene.set_class_toggle("#x".into(), "   "));
        assert!(!scene.has_class_toggle());
    }

    #[test]
    fn reset_strips_classes() {
        let dom = MockDom::default();
        let el = dom.append(dom.body_node(), "p", Some("x"));
        let mut scene = Scene::new(
            dom.clone(),
            SceneOptions::default().duration(Duration::Fixed(10.0)),
        )
        .unwrap();
        scene.set_class_toggle("#x".into(), "on");
        scene.set_progress(0.2);
        scene.remove_class_toggle(false);
        assert!(dom.has_class(el, "on"));
        scene.set_class_toggle("#x".into(), "on");
        scene.remove_class_toggle(true);
        assert!(!dom.has_class(el, "on"));
    }
}
