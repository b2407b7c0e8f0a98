use std::cell::RefCell;
use std::rc::Rc;

use vizij_scroll_core::mock::{MockDom, MockNode, Rect};
use vizij_scroll_core::{
    Container, ContainerEvent, Controller, ControllerOptions, Dom, Duration, EventPayload, Scene,
    SceneEventKind, SceneId, SceneOptions, SceneState, ScrollDirection, ScrollTarget,
    ShiftReason,
};

fn controller(dom: &MockDom) -> Controller<MockDom> {
    Controller::new(dom.clone(), Container::Window, ControllerOptions::default()).unwrap()
}

fn scroll_window(ctrl: &mut Controller<MockDom>, dom: &MockDom, pos: f64) {
    dom.set_scroll_pos(&Container::Window, true, pos);
    ctrl.handle_container_event(ContainerEvent::Scroll);
    ctrl.on_animation_frame();
}

fn scene_at(dom: &MockDom, offset: f64, duration: f64) -> Scene<MockDom> {
    Scene::new(
        dom.clone(),
        SceneOptions::default()
            .offset(offset)
            .duration(Duration::Fixed(duration)),
    )
    .unwrap()
}

/// Element container `#scroller` at the top of the document, 400x500.
fn scroller(dom: &MockDom) -> MockNode {
    let el = dom.append(dom.body_node(), "div", Some("scroller"));
    dom.set_rect(el, Rect::new(0.0, 0.0, 400.0, 500.0));
    el
}

/// it should update scenes in start order forward and in reverse order backward
#[test]
fn update_order_follows_scroll_direction() {
    let dom = MockDom::default();
    let mut ctrl = controller(&dom);
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut ids = Vec::new();
    for offset in [300.0, 100.0, 200.0] {
        let mut scene = scene_at(&dom, offset, 1000.0);
        let sink = order.clone();
        scene.on(SceneEventKind::Update, move |e| sink.borrow_mut().push(e.scene));
        ids.push(ctrl.add_scene(scene));
    }
    let (c, a, b) = (ids[0], ids[1], ids[2]);
    ctrl.on_animation_frame();
    order.borrow_mut().clear();

    scroll_window(&mut ctrl, &dom, 50.0);
    assert_eq!(*order.borrow(), vec![a, b, c]);
    assert_eq!(ctrl.info().scroll_direction, ScrollDirection::Forward);

    order.borrow_mut().clear();
    scroll_window(&mut ctrl, &dom, 10.0);
    assert_eq!(*order.borrow(), vec![c, b, a]);
    assert_eq!(ctrl.info().scroll_direction, ScrollDirection::Reverse);
}

/// it should collapse several scroll events into a single update cycle
#[test]
fn scroll_events_coalesce() {
    let dom = MockDom::default();
    let mut ctrl = controller(&dom);
    let count = Rc::new(RefCell::new(0));
    let mut scene = scene_at(&dom, 0.0, 100.0);
    let sink = count.clone();
    scene.on(SceneEventKind::Update, move |_| *sink.borrow_mut() += 1);
    ctrl.add_scene(scene);
    ctrl.on_animation_frame();
    *count.borrow_mut() = 0;

    for pos in [10.0, 20.0, 30.0] {
        dom.set_scroll_pos(&Container::Window, true, pos);
        ctrl.handle_container_event(ContainerEvent::Scroll);
    }
    assert!(ctrl.needs_frame());
    ctrl.on_animation_frame();
    assert_eq!(*count.borrow(), 1);
    assert!(!ctrl.needs_frame());
}

/// it should pause the scroll direction on resize
#[test]
fn resize_pauses_direction_and_shifts_hooked_scenes() {
    let dom = MockDom::default();
    let trigger = dom.append(dom.body_node(), "div", Some("t"));
    dom.set_rect(trigger, Rect::new(1000.0, 0.0, 100.0, 100.0));
    let mut ctrl = controller(&dom);
    let mut scene = Scene::new(
        dom.clone(),
        SceneOptions::default().trigger_element("#t"),
    )
    .unwrap();
    let reasons = Rc::new(RefCell::new(Vec::new()));
    let sink = reasons.clone();
    scene.on(SceneEventKind::Shift, move |e| {
        if let EventPayload::Shift { reason } = e.payload {
            sink.borrow_mut().push(reason);
        }
    });
    let id = ctrl.add_scene(scene);
    scroll_window(&mut ctrl, &dom, 100.0);
    assert_eq!(ctrl.info().scroll_direction, ScrollDirection::Forward);
    assert_eq!(ctrl.scene(id).unwrap().scroll_offset().start, 1000.0 - 384.0);

    dom.set_window_size(1024.0, 568.0);
    ctrl.handle_container_event(ContainerEvent::Resize);
    assert_eq!(ctrl.info().scroll_direction, ScrollDirection::Paused);
    assert_eq!(*reasons.borrow(), vec![ShiftReason::ContainerResize]);
    assert_eq!(ctrl.scene(id).unwrap().scroll_offset().start, 1000.0 - 284.0);
}

/// it should scroll to numbers, owned scenes and elements, and reject foreign scenes
#[test]
fn scroll_to_targets() {
    let dom = MockDom::default();
    let item = dom.append(dom.body_node(), "div", Some("item"));
    dom.set_rect(item, Rect::new(1400.0, 0.0, 100.0, 100.0));
    let mut ctrl = controller(&dom);
    let id = ctrl.add_scene(scene_at(&dom, 640.0, 100.0));

    assert!(ctrl.scroll_to(250.0));
    assert_eq!(dom.scroll_pos(&Container::Window, true), 250.0);
    assert!(ctrl.scroll_to(id));
    assert_eq!(dom.scroll_pos(&Container::Window, true), 640.0);
    assert!(ctrl.scroll_to("#item"));
    assert_eq!(dom.scroll_pos(&Container::Window, true), 1400.0);

    let mut other = controller(&dom);
    let foreign = other.add_scene(scene_at(&dom, 10.0, 0.0));
    assert!(!ctrl.scroll_to(foreign));
    assert_eq!(dom.scroll_pos(&Container::Window, true), 1400.0);
}

/// it should measure element targets relative to a scrolled element container
#[test]
fn scroll_to_inside_element_container() {
    let dom = MockDom::default();
    let container = dom.append(dom.body_node(), "div", Some("scroller"));
    dom.set_rect(container, Rect::new(100.0, 0.0, 400.0, 500.0));
    let item = dom.append(container, "div", Some("item"));
    dom.set_rect(item, Rect::new(900.0, 0.0, 100.0, 100.0));
    let mut ctrl = Controller::from_options(
        dom.clone(),
        ControllerOptions {
            container: Some("#scroller".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(!ctrl.is_document());
    assert_eq!(ctrl.info().size, 500.0);

    let scrolled = Container::Element(container);
    dom.set_scroll_pos(&scrolled, true, 200.0);
    assert!(ctrl.scroll_to("#item"));
    assert_eq!(dom.scroll_pos(&scrolled, true), 800.0);
}

/// it should route scrolls through a handler once one is supplied
#[test]
fn scroll_handler_replaces_setter() {
    let dom = MockDom::default();
    let mut ctrl = controller(&dom);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    assert!(ctrl.scroll_to(ScrollTarget::Handler(Box::new(move |pos: f64| {
        sink.borrow_mut().push(pos)
    }))));
    ctrl.scroll_to(120.0);
    ctrl.scroll_to(30.0);
    assert_eq!(*seen.borrow(), vec![120.0, 30.0]);
    assert_eq!(dom.scroll_pos(&Container::Window, true), 0.0);
}

/// it should read the scroll position from an override when one is set
#[test]
fn scroll_pos_override() {
    let dom = MockDom::default();
    let mut ctrl = controller(&dom);
    let id = ctrl.add_scene(scene_at(&dom, 700.0, 100.0));
    ctrl.set_scroll_pos_fn(Some(Box::new(|| 750.0)));
    assert_eq!(ctrl.scroll_pos(), 750.0);
    ctrl.handle_container_event(ContainerEvent::Scroll);
    ctrl.on_animation_frame();
    assert_eq!(ctrl.info().scroll_pos, 750.0);
    assert_eq!(ctrl.scene(id).unwrap().progress(), 0.5);

    ctrl.set_scroll_pos_fn(None);
    assert_eq!(ctrl.scroll_pos(), 0.0);
}

/// it should detach removed scenes so another controller can adopt them
#[test]
fn removed_scene_moves_between_controllers() {
    let dom = MockDom::default();
    let mut first = controller(&dom);
    let mut second = controller(&dom);
    let mut scene = scene_at(&dom, 0.0, 100.0);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    scene.on_named("add remove", move |e| sink.borrow_mut().push(e.payload.clone()));

    let id = first.add_scene(scene);
    let scene = first.remove_scene(id).unwrap();
    assert!(!scene.is_attached());
    assert_eq!(first.scene_count(), 0);
    assert!(first.remove_scene(id).is_none());

    second.add_scene(scene);
    assert_eq!(second.scene(id).unwrap().controller_id(), Some(second.id()));
    assert_eq!(
        *events.borrow(),
        vec![
            EventPayload::Add {
                controller: first.id()
            },
            EventPayload::Remove,
            EventPayload::Add {
                controller: second.id()
            },
        ]
    );
}

/// it should drop scenes destroyed through the guard
#[test]
fn destroying_through_scene_mut_removes_the_scene() {
    let dom = MockDom::default();
    let mut ctrl = controller(&dom);
    let a = ctrl.add_scene(scene_at(&dom, 0.0, 100.0));
    let b = ctrl.add_scene(scene_at(&dom, 50.0, 100.0));
    ctrl.scene_mut(a).unwrap().destroy(false);
    assert_eq!(ctrl.scene_ids(), vec![b]);
    assert!(ctrl.destroy_scene(b, true));
    assert!(!ctrl.destroy_scene(b, true));
    assert_eq!(ctrl.scene_count(), 0);
}

/// it should destroy scenes last to first and tolerate a second destroy
#[test]
fn controller_destroy_is_idempotent() {
    let dom = MockDom::default();
    let el = dom.append(dom.body_node(), "div", Some("pin"));
    let mut ctrl = controller(&dom);
    let destroyed = Rc::new(RefCell::new(Vec::new()));
    let mut ids = Vec::new();
    for offset in [0.0, 100.0] {
        let mut scene = scene_at(&dom, offset, 100.0);
        let sink = destroyed.clone();
        scene.on(SceneEventKind::Destroy, move |e| sink.borrow_mut().push(e.scene));
        ids.push(ctrl.add_scene(scene));
    }
    ctrl.scene_mut(ids[0])
        .unwrap()
        .set_pin("#pin".into(), Default::default());
    assert_ne!(dom.parent(&el), Some(dom.body_node()));

    ctrl.destroy(true);
    ctrl.destroy(true);
    assert_eq!(*destroyed.borrow(), vec![ids[1], ids[0]]);
    assert_eq!(dom.parent(&el), Some(dom.body_node()));
    assert!(ctrl.is_destroyed());
    assert!(!ctrl.needs_frame());
    assert_eq!(ctrl.refresh_interval(), None);
}

/// it should apply global scene options to every added scene
#[test]
fn global_scene_options_from_fixture() {
    let dom = MockDom::default();
    let options: ControllerOptions =
        vizij_test_fixtures::controllers::load("global-options").unwrap();
    let mut ctrl = Controller::from_options(dom.clone(), options).unwrap();
    assert_eq!(ctrl.refresh_interval(), Some(250.0));
    let id = ctrl.add_scene(scene_at(&dom, 0.0, 100.0));
    let scene = ctrl.scene(id).unwrap();
    assert_eq!(scene.trigger_hook(), 0.0);
    assert!(!scene.reverse());
}

/// it should mount indicators inside an element container when asked to
#[test]
fn add_indicators_in_element_container() {
    let dom = MockDom::default();
    let container = scroller(&dom);
    let options: ControllerOptions =
        vizij_test_fixtures::controllers::load("element-container").unwrap();
    let mut ctrl = Controller::from_options(dom.clone(), options).unwrap();
    assert_eq!(ctrl.refresh_interval(), None);

    let scene = Scene::new(
        dom.clone(),
        SceneOptions::default()
            .name("s1")
            .offset(50.0)
            .duration(Duration::Fixed(100.0)),
    )
    .unwrap();
    let id = ctrl.add_scene(scene);
    let (start, end, trigger) = ctrl.scene(id).unwrap().indicator_nodes().unwrap();
    let bounds = dom.parent(&start).unwrap();
    assert_eq!(dom.parent(&bounds), Some(container));
    assert_eq!(dom.style(container, "position"), "relative");
    assert_eq!(dom.text(start), "start s1");
    assert_eq!(dom.text(trigger), "trigger s1");
    assert_eq!(dom.style(bounds, "top"), "300px");
    assert_eq!(dom.style(end, "top"), "100px");
    assert_eq!(dom.style(trigger, "top"), "250px");

    ctrl.scene_mut(id).unwrap().set_duration(Duration::Fixed(0.0)).unwrap();
    assert_eq!(dom.style(end, "display"), "none");

    assert!(ctrl.destroy_scene(id, false));
    assert!(!dom.is_attached(&start));
    assert!(!dom.is_attached(&trigger));
}

/// it should update every scene immediately when toggled back on
#[test]
fn controller_enable_toggle() {
    let dom = MockDom::default();
    let mut ctrl = controller(&dom);
    let id = ctrl.add_scene(scene_at(&dom, 100.0, 100.0));
    ctrl.on_animation_frame();
    ctrl.set_enabled(false);
    scroll_window(&mut ctrl, &dom, 150.0);
    assert_eq!(ctrl.scene(id).unwrap().state(), SceneState::Before);
    assert!(!ctrl.info().enabled);

    ctrl.set_enabled(true);
    assert!(ctrl.needs_frame());
    ctrl.on_animation_frame();
    assert_eq!(ctrl.scene(id).unwrap().progress(), 0.5);
}

/// it should scroll the container instead of the window for wheel input over a pin
#[test]
fn wheel_over_pin_scrolls_container() {
    let dom = MockDom::default();
    let container = scroller(&dom);
    let item = dom.append(container, "div", Some("item"));
    dom.set_rect(item, Rect::new(300.0, 0.0, 400.0, 100.0));
    let other = dom.append(container, "p", None);
    let mut ctrl = Controller::from_options(
        dom.clone(),
        ControllerOptions {
            container: Some("#scroller".into()),
            ..Default::default()
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
    scene.set_pin("#item".into(), Default::default());
    let id: SceneId = ctrl.add_scene(scene);

    let scrolled = Container::Element(container);
    dom.set_scroll_pos(&scrolled, true, 350.0);
    ctrl.handle_container_event(ContainerEvent::Scroll);
    ctrl.on_animation_frame();
    assert_eq!(ctrl.scene(id).unwrap().state(), SceneState::During);
    assert_eq!(dom.style(item, "position"), "fixed");

    assert!(ctrl.handle_pin_wheel(&item, 30.0));
    assert_eq!(dom.scroll_pos(&scrolled, true), 380.0);
    assert!(!ctrl.handle_pin_wheel(&other, 30.0));
}

/// it should add up several wheel deltas that arrive before the next frame
#[test]
fn wheel_deltas_accumulate_within_a_frame() {
    let dom = MockDom::default();
    let container = scroller(&dom);
    let item = dom.append(container, "div", Some("item"));
    dom.set_rect(item, Rect::new(300.0, 0.0, 400.0, 100.0));
    let mut ctrl = Controller::from_options(
        dom.clone(),
        ControllerOptions {
            container: Some("#scroller".into()),
            ..Default::default()
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
    scene.set_pin("#item".into(), Default::default());
    ctrl.add_scene(scene);

    let scrolled = Container::Element(container);
    dom.set_scroll_pos(&scrolled, true, 350.0);
    ctrl.handle_container_event(ContainerEvent::Scroll);
    ctrl.on_animation_frame();

    for _ in 0..3 {
        assert!(ctrl.handle_pin_wheel(&item, 30.0));
    }
    assert_eq!(dom.scroll_pos(&scrolled, true), 440.0);
}
