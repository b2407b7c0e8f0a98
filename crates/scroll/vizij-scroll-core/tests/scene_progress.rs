use std::cell::RefCell;
use std::rc::Rc;

use vizij_scroll_core::mock::{MockDom, MockNode, Rect};
use vizij_scroll_core::{
    Container, ContainerEvent, Controller, ControllerOptions, Dom, Duration, EventPayload, Scene,
    SceneEventKind, SceneId, SceneOptions, SceneState, ScrollOffset,
};

type Log = Rc<RefCell<Vec<SceneEventKind>>>;

fn controller(dom: &MockDom) -> Controller<MockDom> {
    Controller::new(dom.clone(), Container::Window, ControllerOptions::default()).unwrap()
}

fn scroll(ctrl: &mut Controller<MockDom>, dom: &MockDom, pos: f64) {
    dom.set_scroll_pos(&Container::Window, true, pos);
    ctrl.handle_container_event(ContainerEvent::Scroll);
    ctrl.on_animation_frame();
}

fn recorded(scene: &mut Scene<MockDom>) -> Log {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    scene.on_named("enter leave start end progress", move |e| {
        sink.borrow_mut().push(e.kind)
    });
    log
}

fn trigger_at(dom: &MockDom, id: &str, top: f64) -> MockNode {
    let el = dom.append(dom.body_node(), "section", Some(id));
    dom.set_rect(el, Rect::new(top, 0.0, 800.0, 100.0));
    el
}

fn add_offset_scene(
    ctrl: &mut Controller<MockDom>,
    dom: &MockDom,
    options: SceneOptions<MockNode>,
) -> (SceneId, Log) {
    let mut scene = Scene::new(dom.clone(), options).unwrap();
    let log = recorded(&mut scene);
    let id = ctrl.add_scene(scene);
    ctrl.on_animation_frame();
    (id, log)
}

/// it should fire enter, start, progress..., end, leave when scrolling forward
#[test]
fn forward_traversal_event_order() {
    use SceneEventKind::*;
    let dom = MockDom::default();
    let mut ctrl = controller(&dom);
    let (id, log) = add_offset_scene(
        &mut ctrl,
        &dom,
        SceneOptions::default()
            .offset(100.0)
            .duration(Duration::Fixed(100.0)),
    );
    assert!(log.borrow().is_empty());

    for pos in [150.0, 180.0, 250.0] {
        scroll(&mut ctrl, &dom, pos);
    }
    assert_eq!(
        *log.borrow(),
        vec![Enter, Start, Progress, Progress, Progress, End, Leave]
    );
    let scene = ctrl.scene(id).unwrap();
    assert_eq!(scene.state(), SceneState::After);
    assert_eq!(scene.progress(), 1.0);
}

/// it should fire enter, end, progress..., start, leave when scrolling back
#[test]
fn reverse_traversal_event_order() {
    use SceneEventKind::*;
    let dom = MockDom::default();
    let mut ctrl = controller(&dom);
    let (id, log) = add_offset_scene(
        &mut ctrl,
        &dom,
        SceneOptions::default()
            .offset(100.0)
            .duration(Duration::Fixed(100.0)),
    );
    scroll(&mut ctrl, &dom, 300.0);
    log.borrow_mut().clear();

    for pos in [180.0, 120.0, 0.0] {
        scroll(&mut ctrl, &dom, pos);
    }
    assert_eq!(
        *log.borrow(),
        vec![Enter, End, Progress, Progress, Progress, Start, Leave]
    );
    assert_eq!(ctrl.scene(id).unwrap().state(), SceneState::Before);
}

/// it should map a zero-duration scene to progress 0 -> 1 -> 0 without an end event
#[test]
fn zero_duration_toggles_without_end() {
    let dom = MockDom::default();
    trigger_at(&dom, "trigger", 400.0);
    let mut ctrl = controller(&dom);
    let mut scene = Scene::new(
        dom.clone(),
        SceneOptions::default()
            .trigger_element("#trigger")
            .trigger_hook(0.0),
    )
    .unwrap();
    let kinds = recorded(&mut scene);
    let states = Rc::new(RefCell::new(Vec::new()));
    let sink = states.clone();
    scene.on(SceneEventKind::Progress, move |e| {
        if let EventPayload::Progress {
            progress, state, ..
        } = &e.payload
        {
            sink.borrow_mut().push((*progress, *state));
        }
    });
    let id = ctrl.add_scene(scene);
    ctrl.on_animation_frame();
    assert_eq!(ctrl.scene(id).unwrap().trigger_position(), 400.0);
    assert_eq!(ctrl.scene(id).unwrap().scroll_offset().start, 400.0);
    assert_eq!(ctrl.scene(id).unwrap().progress(), 0.0);

    scroll(&mut ctrl, &dom, 401.0);
    scroll(&mut ctrl, &dom, 0.0);
    assert_eq!(
        *states.borrow(),
        vec![(1.0, SceneState::During), (0.0, SceneState::Before)]
    );
    assert!(!kinds.borrow().contains(&SceneEventKind::End));
}

/// it should place start at trigger position minus hook * viewport
#[test]
fn hook_and_viewport_define_the_start() {
    let dom = MockDom::new(800.0, 1000.0);
    trigger_at(&dom, "trigger", 2000.0);
    let mut ctrl = controller(&dom);
    let (id, _) = add_offset_scene(
        &mut ctrl,
        &dom,
        SceneOptions::default()
            .trigger_element("#trigger")
            .trigger_hook(0.5)
            .duration(Duration::Fixed(500.0)),
    );
    assert_eq!(
        ctrl.scene(id).unwrap().scroll_offset(),
        ScrollOffset {
            start: 1500.0,
            end: 2000.0
        }
    );
    scroll(&mut ctrl, &dom, 1750.0);
    let scene = ctrl.scene(id).unwrap();
    assert_eq!(scene.progress(), 0.5);
    assert_eq!(scene.state(), SceneState::During);
}

/// it should keep end equal to start plus duration after every shift
#[test]
fn end_tracks_start_plus_duration() {
    let dom = MockDom::default();
    trigger_at(&dom, "trigger", 900.0);
    let mut ctrl = controller(&dom);
    let (id, _) = add_offset_scene(
        &mut ctrl,
        &dom,
        SceneOptions::default()
            .trigger_element("#trigger")
            .duration(Duration::Fixed(200.0)),
    );
    {
        let mut scene = ctrl.scene_mut(id).unwrap();
        scene.set_duration(Duration::Fixed(350.0)).unwrap();
        scene.set_offset(-40.0).unwrap();
        scene.set_trigger_hook("onEnter").unwrap();
    }
    let offset = ctrl.scene(id).unwrap().scroll_offset();
    assert_eq!(offset.start, 900.0 - 40.0 - 768.0);
    assert_eq!(offset.end, offset.start + 350.0);
}

/// it should hold progress when scrolling back with reverse disabled
#[test]
fn reverse_disabled_holds_progress() {
    let dom = MockDom::default();
    let mut ctrl = controller(&dom);
    let (id, log) = add_offset_scene(
        &mut ctrl,
        &dom,
        SceneOptions::default()
            .offset(100.0)
            .duration(Duration::Fixed(100.0))
            .reverse(false),
    );
    scroll(&mut ctrl, &dom, 150.0);
    scroll(&mut ctrl, &dom, 120.0);
    scroll(&mut ctrl, &dom, 0.0);
    assert_eq!(ctrl.scene(id).unwrap().progress(), 0.5);
    assert_eq!(ctrl.scene(id).unwrap().state(), SceneState::During);

    scroll(&mut ctrl, &dom, 400.0);
    assert_eq!(ctrl.scene(id).unwrap().state(), SceneState::After);
    assert_eq!(log.borrow().last(), Some(&SceneEventKind::Leave));
}

/// it should fire update on every cycle even when progress does not change
#[test]
fn update_fires_without_progress_change() {
    let dom = MockDom::default();
    let mut ctrl = controller(&dom);
    let mut scene = Scene::new(
        dom.clone(),
        SceneOptions::default()
            .offset(500.0)
            .duration(Duration::Fixed(100.0)),
    )
    .unwrap();
    let updates = Rc::new(RefCell::new(Vec::new()));
    let sink = updates.clone();
    scene.on(SceneEventKind::Update, move |e| {
        if let EventPayload::Update { scroll_pos, .. } = e.payload {
            sink.borrow_mut().push(scroll_pos);
        }
    });
    ctrl.add_scene(scene);
    ctrl.on_animation_frame();
    scroll(&mut ctrl, &dom, 10.0);
    assert_eq!(*updates.borrow(), vec![0.0, 10.0]);
}

/// it should skip progress for disabled scenes and resume when re-enabled
#[test]
fn disabled_scene_skips_updates() {
    let dom = MockDom::default();
    let mut ctrl = controller(&dom);
    let (id, log) = add_offset_scene(
        &mut ctrl,
        &dom,
        SceneOptions::default()
            .offset(100.0)
            .duration(Duration::Fixed(100.0))
            .enabled(false),
    );
    scroll(&mut ctrl, &dom, 150.0);
    assert!(log.borrow().is_empty());
    ctrl.scene_mut(id).unwrap().set_enabled(true);
    assert_eq!(ctrl.scene(id).unwrap().progress(), 0.5);
}

/// it should re-resolve percentage durations after a resize and refresh
#[test]
fn percentage_duration_follows_viewport() {
    let dom = MockDom::new(1024.0, 800.0);
    let mut ctrl = controller(&dom);
    let (id, _) = add_offset_scene(
        &mut ctrl,
        &dom,
        SceneOptions::default().duration(Duration::Percentage(0.5)),
    );
    assert_eq!(ctrl.scene(id).unwrap().duration(), 400.0);

    dom.set_window_size(1024.0, 600.0);
    ctrl.handle_container_event(ContainerEvent::Resize);
    ctrl.refresh();
    assert_eq!(ctrl.info().size, 600.0);
    assert_eq!(ctrl.scene(id).unwrap().duration(), 300.0);
    assert_eq!(ctrl.scene(id).unwrap().scroll_offset().end, 300.0);
}

/// it should drive the state machine directly through set_progress
#[test]
fn set_progress_clamps_to_states() {
    let mut scene = Scene::new(
        MockDom::default(),
        SceneOptions::default().duration(Duration::Fixed(100.0)),
    )
    .unwrap();
    scene.set_progress(0.3);
    assert_eq!(scene.state(), SceneState::During);
    scene.set_progress(7.0);
    assert_eq!((scene.progress(), scene.state()), (1.0, SceneState::After));
    scene.set_progress(-2.0);
    assert_eq!((scene.progress(), scene.state()), (0.0, SceneState::Before));
}

/// it should clear a trigger element that left the document
#[test]
fn removed_trigger_element_is_cleared() {
    let dom = MockDom::default();
    let el = trigger_at(&dom, "trigger", 600.0);
    let mut ctrl = controller(&dom);
    let (id, _) = add_offset_scene(
        &mut ctrl,
        &dom,
        SceneOptions::default().trigger_element("#trigger"),
    );
    dom.detach(el);
    ctrl.refresh();
    let scene = ctrl.scene(id).unwrap();
    assert!(scene.trigger_element().is_none());
    assert_eq!(scene.trigger_position(), 0.0);
}
