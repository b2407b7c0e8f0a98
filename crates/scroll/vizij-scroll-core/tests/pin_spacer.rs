use vizij_scroll_core::mock::{MockDom, MockNode, Rect};
use vizij_scroll_core::{
    Container, ContainerEvent, Controller, ControllerOptions, Dom, Duration, PinSettings, Scene,
    SceneId, SceneOptions, SceneState, WindowEvent, PIN_SPACER_ATTRIBUTE,
};

struct Page {
    dom: MockDom,
    ctrl: Controller<MockDom>,
    pin: MockNode,
    id: SceneId,
}

/// `before`, `#pin` (400x100 at 200) and `after` in the body, with a scene
/// of duration 300 starting at scroll position 200.
fn page(vertical: bool, settings: PinSettings) -> Page {
    let dom = MockDom::default();
    let body = dom.body_node();
    dom.append(body, "div", Some("before"));
    let pin = dom.append(body, "div", Some("pin"));
    dom.append(body, "div", Some("after"));
    let rect = if vertical {
        Rect::new(200.0, 0.0, 400.0, 100.0)
    } else {
        Rect::new(0.0, 200.0, 400.0, 100.0)
    };
    dom.set_rect(pin, rect);
    dom.set_style(&pin, "width", "400px");

    let options = ControllerOptions {
        vertical,
        ..ControllerOptions::default()
    };
    let mut ctrl = Controller::new(dom.clone(), Container::Window, options).unwrap();
    let mut scene = Scene::new(
        dom.clone(),
        SceneOptions::default()
            .offset(200.0)
            .trigger_hook(0.0)
            .duration(Duration::Fixed(300.0)),
    )
    .unwrap();
    assert!(scene.set_pin("#pin".into(), settings));
    let id = ctrl.add_scene(scene);
    ctrl.on_animation_frame();
    Page { dom, ctrl, pin, id }
}

impl Page {
    fn scroll(&mut self, pos: f64) {
        let vertical = self.ctrl.vertical();
        self.dom.set_scroll_pos(&Container::Window, vertical, pos);
        self.ctrl.handle_container_event(ContainerEvent::Scroll);
        self.ctrl.on_animation_frame();
    }

    fn spacer(&self) -> MockNode {
        *self.ctrl.scene(self.id).unwrap().pin_spacer().unwrap()
    }
}

/// `#item` (`width` x 100 at 300) pinned inside the 400x500 element
/// container `#scroller`, scrolled to 350 so the pin is fixed.
fn pinned_in_scroller(
    dom: &MockDom,
    width: f64,
    css_width: Option<&str>,
) -> (Controller<MockDom>, MockNode, MockNode) {
    let container = dom.append(dom.body_node(), "div", Some("scroller"));
    dom.set_rect(container, Rect::new(0.0, 0.0, 400.0, 500.0));
    let item = dom.append(container, "div", Some("item"));
    dom.set_rect(item, Rect::new(300.0, 0.0, width, 100.0));
    if let Some(css) = css_width {
        dom.set_computed(item, "width", css);
    }
    let mut ctrl = Controller::from_options(
        dom.clone(),
        ControllerOptions {
            container: Some("#scroller".into()),
            ..ControllerOptions::default()
        },
    )
    .unwrap();
    let mut scene = Scene::new(
        dom.clone(),
        SceneOptions::default()
            .trigger_element("#item")
            .trigger_hook(0.0)
            .duration(Duration::Fixed(200.0)),
    )
    .unwrap();
    assert!(scene.set_pin("#item".into(), PinSettings::default()));
    ctrl.add_scene(scene);
    dom.set_scroll_pos(&Container::Element(container), true, 350.0);
    ctrl.handle_container_event(ContainerEvent::Scroll);
    ctrl.on_animation_frame();
    assert_eq!(dom.style(item, "position"), "fixed");
    (ctrl, container, item)
}

/// it should split the duration into spacer padding around a fixed pin
#[test]
fn spacer_padding_tracks_progress() {
    let mut page = page(true, PinSettings::default());
    let spacer = page.spacer();
    assert_eq!(page.dom.attribute(spacer, PIN_SPACER_ATTRIBUTE).as_deref(), Some(""));
    assert_eq!(page.dom.style(spacer, "padding-top"), "0px");
    assert_eq!(page.dom.style(spacer, "padding-bottom"), "300px");

    page.scroll(320.0);
    let scene = page.ctrl.scene(page.id).unwrap();
    assert_eq!(scene.progress(), 0.4);
    assert_eq!(scene.state(), SceneState::During);
    assert_eq!(page.dom.style(page.pin, "position"), "fixed");
    assert_eq!(page.dom.style(page.pin, "top"), "0px");
    assert_eq!(page.dom.style(spacer, "padding-top"), "120px");
    assert_eq!(page.dom.style(spacer, "padding-bottom"), "180px");
    assert_eq!(page.dom.style(spacer, "width"), "400px");
    assert_eq!(page.dom.style(spacer, "min-height"), "100px");
}

/// it should reserve the whole duration before the pin after scrolling past it in one jump
#[test]
fn jump_past_pin_moves_padding_before() {
    let mut page = page(true, PinSettings::default());
    page.scroll(900.0);
    let spacer = page.spacer();
    assert_eq!(page.ctrl.scene(page.id).unwrap().state(), SceneState::After);
    assert_eq!(page.dom.style(page.pin, "position"), "relative");
    assert_eq!(page.dom.style(spacer, "padding-top"), "300px");
    assert_eq!(page.dom.style(spacer, "padding-bottom"), "0px");
    assert_eq!(page.dom.style(spacer, "height"), "auto");

    page.scroll(0.0);
    assert_eq!(page.dom.style(spacer, "padding-top"), "0px");
    assert_eq!(page.dom.style(spacer, "padding-bottom"), "300px");
}

/// it should offset the element inside the spacer when followers are not pushed
#[test]
fn without_push_followers_the_element_moves() {
    let mut page = page(
        true,
        PinSettings {
            push_followers: Some(false),
            ..PinSettings::default()
        },
    );
    let spacer = page.spacer();
    assert_eq!(page.dom.style(spacer, "padding-top"), "");
    page.scroll(900.0);
    assert_eq!(page.dom.style(page.pin, "position"), "relative");
    assert_eq!(page.dom.style(page.pin, "top"), "300px");
    page.scroll(0.0);
    assert_eq!(page.dom.style(page.pin, "top"), "0px");
}

/// it should use left padding and the left edge in horizontal controllers
#[test]
fn horizontal_pin_pads_left_and_right() {
    let mut page = page(false, PinSettings::default());
    page.scroll(275.0);
    let spacer = page.spacer();
    assert_eq!(page.dom.style(page.pin, "position"), "fixed");
    assert_eq!(page.dom.style(page.pin, "left"), "0px");
    assert_eq!(page.dom.style(spacer, "padding-left"), "75px");
    assert_eq!(page.dom.style(spacer, "padding-right"), "225px");
    assert_eq!(page.dom.style(spacer, "padding-top"), "");
}

/// it should unpin but keep the spacer when removed without reset, and ignore a second call
#[test]
fn remove_pin_without_reset_is_idempotent() {
    let mut page = page(true, PinSettings::default());
    page.scroll(275.0);
    let spacer = page.spacer();
    {
        let mut scene = page.ctrl.scene_mut(page.id).unwrap();
        scene.remove_pin(false);
        scene.remove_pin(false);
        assert!(!scene.has_pin());
    }
    assert_eq!(page.dom.style(page.pin, "position"), "relative");
    assert_eq!(page.dom.parent(&page.pin), Some(spacer));

    page.scroll(400.0);
    assert_eq!(page.dom.style(page.pin, "position"), "relative");
    assert_eq!(page.dom.style(page.pin, "top"), "0px");
}

/// it should restore parent, index and inline style when removed with reset mid-pin
#[test]
fn remove_pin_with_reset_restores_the_element() {
    let mut page = page(true, PinSettings::default());
    page.scroll(275.0);
    let spacer = page.spacer();
    let body = page.dom.body_node();

    page.ctrl.scene_mut(page.id).unwrap().remove_pin(true);
    assert_eq!(page.dom.parent(&page.pin), Some(body));
    assert_eq!(page.dom.index_in_parent(page.pin), Some(1));
    assert_eq!(page.dom.children(body).len(), 3);
    assert_eq!(page.dom.parent(&spacer), None);
    assert_eq!(
        page.dom.inline_styles(page.pin),
        vec![("width".to_string(), "400px".to_string())]
    );
    assert_eq!(
        page.dom.attribute(page.pin, "data-scrollmagic-orig-style"),
        None
    );
}

/// it should leave a custom spacer class on the spacer
#[test]
fn custom_spacer_class() {
    let page = page(
        true,
        PinSettings {
            spacer_class: "hero-spacer".into(),
            ..PinSettings::default()
        },
    );
    let spacer = page.spacer();
    assert!(page.dom.has_class(spacer, "hero-spacer"));
    assert_eq!(page.dom.tag(spacer), "div");
}

/// it should move a fixed pin with the page when the window scrolls over an element container
#[test]
fn window_scroll_refixes_pin_in_element_container() {
    let dom = MockDom::default();
    let (mut ctrl, _, item) = pinned_in_scroller(&dom, 400.0, None);
    assert_eq!(dom.style(item, "top"), "0px");

    dom.set_scroll_pos(&Container::Window, true, 100.0);
    ctrl.handle_window_event(WindowEvent::Scroll);
    assert_eq!(dom.style(item, "top"), "-100px");
    assert_eq!(dom.style(item, "left"), "0px");
}

/// it should re-measure a percentage-width pin when the window resizes
#[test]
fn window_resize_relayouts_relative_pin() {
    let dom = MockDom::default();
    let (mut ctrl, container, item) = pinned_in_scroller(&dom, 200.0, Some("50%"));
    assert_eq!(dom.style(item, "width"), "200px");

    // narrower window, container and pin after layout
    dom.set_window_size(800.0, 768.0);
    dom.set_rect(container, Rect::new(0.0, 0.0, 300.0, 500.0));
    dom.set_rect(item, Rect::new(300.0, 0.0, 150.0, 100.0));
    assert_eq!(dom.style(item, "width"), "200px");
    ctrl.handle_window_event(WindowEvent::Resize);
    assert_eq!(dom.style(item, "width"), "150px");
}

/// it should hold a forward-only pin at its rounded progress when scrolled back
#[test]
fn forward_only_pin_holds_rounded_position() {
    let mut page = page(true, PinSettings::default());
    page.ctrl.scene_mut(page.id).unwrap().set_reverse(false);
    page.scroll(320.04);
    assert_eq!(page.ctrl.scene(page.id).unwrap().state(), SceneState::During);

    page.scroll(260.0);
    let scene = page.ctrl.scene(page.id).unwrap();
    assert_eq!(scene.state(), SceneState::During);
    assert!((scene.progress() - 0.4).abs() < 0.001);
    assert_eq!(page.dom.style(page.pin, "position"), "fixed");
    // spacer at -60 in the viewport plus 120.0 of the 120.04 scrolled
    assert_eq!(page.dom.style(page.pin, "top"), "60px");
}
