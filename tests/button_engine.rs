//! End-to-end behaviour of buttons against fake transports, displays and fetchers.

use panel_buttons::button::{CredentialPrompt, DisplayFrame, DisplaySink};
use panel_buttons::jobs::{JobKind, RangeAnimation};
use panel_buttons::network::{CommandValue, ProtocolCommand, RemoteFetch, Transport};
use panel_buttons::{
    Address, AnimationTiming, BitmapLayer, Bindings, Button, ButtonDefinition, ButtonError,
    ButtonGeometry, ButtonHandle, ButtonType, Direction, EngineConfig, Feedback, LevelFunction,
    LevelRange, Rect, RemoteSource, Services,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Default)]
struct RecordingTransport(Mutex<Vec<ProtocolCommand>>);

impl RecordingTransport {
    fn sent(&self) -> Vec<ProtocolCommand> {
        self.0.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn send_command(&self, command: ProtocolCommand) -> panel_buttons::Result<()> {
        self.0.lock().unwrap().push(command);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingDisplay(Mutex<Vec<DisplayFrame>>);

impl RecordingDisplay {
    fn frames(&self) -> Vec<DisplayFrame> {
        self.0.lock().unwrap().clone()
    }
}

impl DisplaySink for RecordingDisplay {
    fn display(&self, frame: DisplayFrame) {
        self.0.lock().unwrap().push(frame);
    }
}

#[derive(Default)]
struct RecordingPrompt(Mutex<Vec<(ButtonHandle, u8)>>);

impl CredentialPrompt for RecordingPrompt {
    fn request_password(&self, handle: ButtonHandle, level: u8) {
        self.0.lock().unwrap().push((handle, level));
    }
}

/// Serves one PNG (or fails) and counts every request
struct CountingFetcher {
    calls: AtomicUsize,
    body: Option<Vec<u8>>,
}

impl CountingFetcher {
    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            body: None,
        }
    }

    fn serving(body: Vec<u8>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            body: Some(body),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RemoteFetch for CountingFetcher {
    fn fetch(&self, _url: &str, _user: Option<&str>, _password: Option<&str>) -> panel_buttons::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.body
            .clone()
            .ok_or_else(|| ButtonError::Fetch("camera offline".into()))
    }
}

struct Harness {
    transport: Arc<RecordingTransport>,
    display: Arc<RecordingDisplay>,
    services: Services,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    fn with_config(mut config: EngineConfig) -> Self {
        config.stop_poll_interval = Duration::from_millis(2);
        config.stop_timeout = Duration::from_secs(2);
        let transport = Arc::new(RecordingTransport::default());
        let display = Arc::new(RecordingDisplay::default());
        let services = Services::headless(config)
            .with_transport(transport.clone())
            .with_display(display.clone());
        Self {
            transport,
            display,
            services,
        }
    }

    fn button(&self, definition: ButtonDefinition) -> Button {
        Button::initialize(definition, self.services.clone()).unwrap()
    }
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    done()
}

fn opaque_general(feedback: Feedback, channel: Address) -> ButtonDefinition {
    let geometry = ButtonGeometry {
        handle: ButtonHandle::new(1, 7),
        rect: Rect::new(10, 20, 80, 40),
        bindings: Bindings {
            channel,
            ..Default::default()
        },
        feedback,
        ..Default::default()
    };
    let mut definition = ButtonDefinition::with_instances(geometry, 2);
    definition.instances[0].fill = 0xFF202020;
    definition.instances[1].fill = 0xFF20C020;
    definition
}

/// Serves a fixed body per URL
struct UrlFetcher(Vec<(&'static str, Vec<u8>)>);

impl RemoteFetch for UrlFetcher {
    fn fetch(&self, url: &str, _user: Option<&str>, _password: Option<&str>) -> panel_buttons::Result<Vec<u8>> {
        self.0
            .iter()
            .find(|(u, _)| *u == url)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| ButtonError::Fetch(format!("no such image {}", url)))
    }
}

fn red_png() -> Vec<u8> {
    solid_png([255, 0, 0, 255])
}

fn solid_png(rgba: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(8, 8, image::Rgba(rgba));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn test_set_text_renders_into_one_instance() {
    let h = Harness::new();
    let button = h.button(ButtonDefinition::with_instances(ButtonGeometry::default(), 3));

    button.set_text(2, "Lights").unwrap();
    assert_eq!(button.render(Some(2)).unwrap().text, "Lights");
    assert_eq!(button.render(Some(0)).unwrap().text, "");
    assert_eq!(button.instance(1).unwrap().text, "");
}

#[test]
fn test_momentary_press_release() {
    let h = Harness::new();
    let channel = Address::new(1, 5);
    let button = h.button(opaque_general(Feedback::Momentary, channel));
    button.show().unwrap();

    let mut seen = Vec::new();
    assert!(button.click(40, 20, true));
    assert!(button.is_pressed());
    seen.push(button.active_instance());
    assert!(button.click(40, 20, false));
    seen.push(button.active_instance());
    assert_eq!(seen, vec![1, 0]);

    let sent = h.transport.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].is_push());
    assert!(sent[1].is_release());
    assert_eq!((sent[0].port, sent[0].channel), (1, 5));

    let frames = h.display.frames();
    assert_eq!(frames.last().unwrap().raster.get(40, 20), 0xFF202020);
    assert_eq!((frames[0].left, frames[0].top), (10, 20));
    assert_eq!(frames[0].parent, 1 << 16);
}

#[test]
fn test_always_on_and_inverted_feedback() {
    let h = Harness::new();
    let button = h.button(opaque_general(Feedback::AlwaysOn, Address::new(1, 2)));
    button.show().unwrap();
    button.click(1, 1, true);
    button.click(1, 1, false);
    assert_eq!(button.active_instance(), 1);
    assert!(h.transport.sent().iter().all(|c| c.is_push()));

    let h = Harness::new();
    let button = h.button(opaque_general(Feedback::InvertedChannel, Address::default()));
    button.show().unwrap();
    button.click(1, 1, true);
    assert_eq!(button.active_instance(), 0);
    button.click(1, 1, false);
    assert_eq!(button.active_instance(), 1);
    assert!(h.transport.sent().is_empty());
}

#[test]
fn test_string_command_replaces_push() {
    let h = Harness::new();
    let mut definition = opaque_general(Feedback::None, Address::new(1, 9));
    definition.geometry.command = "PWR ON".to_string();
    let button = h.button(definition);
    button.show().unwrap();

    button.click(5, 5, true);
    button.click(5, 5, false);
    let sent = h.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].value, CommandValue::Text("PWR ON".to_string()));
    assert_eq!(button.active_instance(), 0);
}

#[test]
fn test_hidden_or_transparent_press_not_handled() {
    let h = Harness::new();
    let mut definition = opaque_general(Feedback::Momentary, Address::new(1, 1));
    assert!(!h.button(definition.clone()).click(5, 5, true));

    definition.instances[0].fill = 0x00000000;
    let button = h.button(definition);
    button.show().unwrap();
    assert!(!button.click(5, 5, true));
    assert_eq!(button.active_instance(), 0);
    assert!(h.transport.sent().is_empty());
}

#[test]
fn test_missing_transport_still_updates_locally() {
    let services = Services::headless(EngineConfig::default());
    let button = Button::initialize(opaque_general(Feedback::Momentary, Address::new(1, 1)), services).unwrap();
    button.show().unwrap();
    assert!(button.click(5, 5, true));
    assert_eq!(button.active_instance(), 1);
}

#[test]
fn test_password_gate_replays_press() {
    let prompt = Arc::new(RecordingPrompt::default());
    let mut h = Harness::with_config(EngineConfig::default().with_password(2, "1988"));
    h.services = h.services.clone().with_prompt(prompt.clone());
    let mut definition = opaque_general(Feedback::Momentary, Address::new(1, 3));
    definition.geometry.password_level = 2;
    let button = h.button(definition);
    button.show().unwrap();

    assert!(button.click(5, 5, true));
    assert_eq!(button.active_instance(), 0);
    assert!(h.transport.sent().is_empty());
    assert_eq!(prompt.0.lock().unwrap().as_slice(), &[(ButtonHandle::new(1, 7), 2)]);

    assert!(!button.supply_credential("0000"));
    assert!(!button.is_unlocked());
    assert!(button.supply_credential("1988"));
    assert!(button.is_unlocked());
    assert_eq!(button.active_instance(), 1);
    assert!(h.transport.sent()[0].is_push());

    // Unlocked buttons take presses directly
    button.click(5, 5, false);
    assert_eq!(button.active_instance(), 0);
}

fn bargraph_definition(function: LevelFunction) -> ButtonDefinition {
    let geometry = ButtonGeometry {
        handle: ButtonHandle::new(2, 1),
        kind: ButtonType::Bargraph,
        rect: Rect::sized(100, 50),
        direction: Direction::Vertical,
        level_function: function,
        bindings: Bindings {
            level: Address::new(1, 4),
            ..Default::default()
        },
        range: LevelRange {
            low: 0,
            high: 100,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut definition = ButtonDefinition::with_instances(geometry, 2);
    definition.instances[0].fill = 0xFF0000FF;
    definition.instances[1].fill = 0xFFFF0000;
    definition
}

#[test]
fn test_bargraph_reveal() {
    let h = Harness::new();
    let button = h.button(bargraph_definition(LevelFunction::DisplayOnly));

    button.set_level(50);
    let image = button.render(None).unwrap();
    assert_eq!(image.raster.get(50, 24), 0xFF0000FF);
    assert_eq!(image.raster.get(50, 25), 0xFFFF0000);
    assert_eq!(image.raster.get(50, 49), 0xFFFF0000);

    button.set_level(0);
    let image = button.render(None).unwrap();
    assert_eq!(image.raster.get(50, 49), 0xFF0000FF);

    button.set_level(100);
    let image = button.render(None).unwrap();
    assert_eq!(image.raster.get(50, 0), 0xFFFF0000);
}

#[test]
fn test_level_clamped_and_shared() {
    let h = Harness::new();
    let a = h.button(bargraph_definition(LevelFunction::DisplayOnly));
    let b = h.button(bargraph_definition(LevelFunction::DisplayOnly));

    a.set_level(-20);
    assert_eq!(a.level(), 0);
    a.set_level(400);
    assert_eq!(a.level(), 100);
    assert_eq!(b.level(), 100);
    // Inbound levels are not echoed back
    assert!(h.transport.sent().is_empty());
}

#[test]
fn test_shared_level_redraws_other_bargraph() {
    let h = Harness::new();
    let a = h.button(bargraph_definition(LevelFunction::DisplayOnly));
    let b = h.button(bargraph_definition(LevelFunction::DisplayOnly));

    b.set_level(0);
    assert_eq!(b.render(None).unwrap().raster.get(50, 49), 0xFF0000FF);

    a.set_level(100);
    assert_eq!(b.level(), 100);
    let image = b.render(None).unwrap();
    assert_eq!(image.raster.get(50, 49), 0xFFFF0000);
    assert_eq!(image.level.level, 100);

    // Unchanged level: the cached frame is reused
    assert!(Arc::ptr_eq(&image, &b.render(None).unwrap()));
}

#[test]
fn test_shared_level_selects_multistate_instance() {
    let h = Harness::new();
    let geometry = ButtonGeometry {
        kind: ButtonType::MultistateBargraph,
        bindings: Bindings {
            level: Address::new(1, 6),
            ..Default::default()
        },
        ..Default::default()
    };
    let a = h.button(ButtonDefinition::with_instances(geometry.clone(), 4));
    let b = h.button(ButtonDefinition::with_instances(geometry, 4));
    b.render(None).unwrap();

    a.set_level(2);
    assert_eq!(b.render(None).unwrap().instance, 2);
    assert_eq!(b.active_instance(), 2);
}

#[test]
fn test_active_bargraph_sends_level() {
    let h = Harness::new();
    let button = h.button(bargraph_definition(LevelFunction::ActiveCentering));
    button.show().unwrap();

    button.click(50, 10, true);
    assert_eq!(button.level(), 80);
    button.click(50, 10, false);
    assert_eq!(button.level(), 50);

    let levels: Vec<CommandValue> = h.transport.sent().into_iter().map(|c| c.value).collect();
    assert_eq!(levels, vec![CommandValue::Level(80), CommandValue::Level(50)]);
}

#[test]
fn test_drag_bargraph_moves_by_travel() {
    let h = Harness::new();
    let button = h.button(bargraph_definition(LevelFunction::Drag));
    button.show().unwrap();
    button.set_level(20);

    button.click(50, 40, true);
    button.click(50, 15, false);
    assert_eq!(button.level(), 70);
    assert_eq!(h.transport.sent().last().unwrap().value, CommandValue::Level(70));
}

#[test]
fn test_ramped_level_walks_to_target() {
    let h = Harness::new();
    let mut definition = bargraph_definition(LevelFunction::DisplayOnly);
    definition.geometry.range.ramp_up = Duration::from_millis(100);
    let button = h.button(definition);

    button.set_level(10);
    assert!(wait_until(Duration::from_secs(2), || button.level() == 10));
    assert!(!button.is_job_running(JobKind::DragLevelMove) || button.level() == 10);
}

#[test]
fn test_multistate_selects_instance_from_level() {
    let h = Harness::new();
    let geometry = ButtonGeometry {
        kind: ButtonType::MultistateBargraph,
        ..Default::default()
    };
    let button = h.button(ButtonDefinition::with_instances(geometry, 4));
    button.set_level(2);
    assert_eq!(button.active_instance(), 2);
    button.set_level(9);
    assert_eq!(button.active_instance(), 3);
}

#[test]
fn test_joystick_sends_both_axes() {
    let h = Harness::new();
    let geometry = ButtonGeometry {
        kind: ButtonType::Joystick,
        rect: Rect::sized(100, 100),
        level_function: LevelFunction::Active,
        bindings: Bindings {
            level: Address::new(1, 10),
            ..Default::default()
        },
        range: LevelRange {
            low: 0,
            high: 100,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut definition = ButtonDefinition::with_instances(geometry, 1);
    definition.instances[0].fill = 0xFF101010;
    let button = h.button(definition);
    button.show().unwrap();

    button.click(25, 75, true);
    assert_eq!(button.joystick(), (25, 75));
    let sent = h.transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!((sent[0].channel, sent[0].value.clone()), (10, CommandValue::Level(25)));
    assert_eq!((sent[1].channel, sent[1].value.clone()), (11, CommandValue::Level(75)));

    button.set_joystick(-5, 500);
    assert_eq!(button.joystick(), (0, 100));
}

#[test]
fn test_listbox_and_text_input() {
    let h = Harness::new();
    let geometry = ButtonGeometry {
        kind: ButtonType::Listbox,
        rect: Rect::sized(100, 100),
        row_height: 20,
        bindings: Bindings {
            level: Address::new(1, 30),
            ..Default::default()
        },
        ..Default::default()
    };
    let list = h.button(ButtonDefinition::with_instances(geometry, 1));
    list.show().unwrap();
    list.click(10, 45, true);
    assert_eq!(h.transport.sent()[0].value, CommandValue::Level(3));

    let geometry = ButtonGeometry {
        kind: ButtonType::TextInput,
        command: "KEYB".to_string(),
        bindings: Bindings {
            address: Address::new(1, 31),
            ..Default::default()
        },
        ..Default::default()
    };
    let input = h.button(ButtonDefinition::with_instances(geometry, 2));
    input.show().unwrap();
    input.click(10, 10, true);
    assert_eq!(input.active_instance(), 1);
    assert_eq!(h.transport.sent()[1].value, CommandValue::Text("KEYB".to_string()));

    let anchor = h.button(ButtonDefinition::with_instances(
        ButtonGeometry {
            kind: ButtonType::SubviewAnchor,
            ..Default::default()
        },
        1,
    ));
    anchor.show().unwrap();
    assert!(!anchor.click(10, 10, true));
}

#[test]
fn test_channel_state_and_blink() {
    let h = Harness::new();
    let channel = h.button(opaque_general(Feedback::Channel, Address::new(1, 1)));
    channel.set_channel_state(true);
    assert_eq!(channel.active_instance(), 1);
    channel.set_channel_state(false);
    assert_eq!(channel.active_instance(), 0);

    let blink = h.button(opaque_general(Feedback::Blink, Address::new(1, 1)));
    blink.blink_tick();
    assert_eq!(blink.active_instance(), 1);
    blink.blink_tick();
    assert_eq!(blink.active_instance(), 0);

    let momentary = h.button(opaque_general(Feedback::Momentary, Address::new(1, 1)));
    momentary.set_channel_state(true);
    momentary.blink_tick();
    assert_eq!(momentary.active_instance(), 0);
}

#[test]
fn test_animation_start_is_idempotent() {
    let h = Harness::new();
    let geometry = ButtonGeometry {
        animation: AnimationTiming {
            up_steps: 1,
            up_time: Duration::from_millis(5),
            ..Default::default()
        },
        ..Default::default()
    };
    let button = h.button(ButtonDefinition::with_instances(geometry, 3));

    assert!(button.start_animation());
    assert!(!button.start_animation());
    assert!(!button
        .start_range_animation(RangeAnimation::once(0, 2, Duration::from_millis(10)))
        .unwrap());
    assert!(button.is_job_running(JobKind::Animation));

    assert!(button.stop_animation());
    assert!(!button.is_job_running(JobKind::Animation));
}

#[test]
fn test_range_animation_validation() {
    let h = Harness::new();
    let button = h.button(ButtonDefinition::with_instances(ButtonGeometry::default(), 3));
    assert!(button
        .start_range_animation(RangeAnimation::once(2, 1, Duration::from_millis(10)))
        .is_err());
    assert!(button
        .start_range_animation(RangeAnimation::once(0, 3, Duration::from_millis(10)))
        .is_err());

    assert!(button
        .start_range_animation(RangeAnimation::once(0, 2, Duration::from_millis(20)))
        .unwrap());
    assert!(wait_until(Duration::from_secs(2), || !button.is_job_running(JobKind::RangeAnimation)));
    assert_eq!(button.active_instance(), 2);
}

fn remote_definition(source: RemoteSource) -> ButtonDefinition {
    let geometry = ButtonGeometry {
        handle: ButtonHandle::new(3, 1),
        rect: Rect::sized(8, 8),
        ..Default::default()
    };
    let mut definition = ButtonDefinition::with_instances(geometry, 1);
    definition.instances[0].bitmaps = vec![BitmapLayer::remote(source)];
    definition
}

#[test]
fn test_remote_image_delivered_after_fetch() {
    let mut h = Harness::new();
    let fetcher = Arc::new(CountingFetcher::serving(red_png()));
    h.services = h.services.clone().with_fetcher(fetcher.clone());
    let button = h.button(remote_definition(RemoteSource::new("http://cam/still.png")));
    button.show().unwrap();

    let display = h.display.clone();
    assert!(wait_until(Duration::from_secs(2), || display
        .frames()
        .last()
        .map_or(false, |f| f.raster.get(4, 4) == 0xFFFF0000)));
    assert_eq!(fetcher.calls(), 1);
    assert!(h.services.pending.is_empty());
}

#[test]
fn test_destroy_stops_periodic_refresh() {
    let mut h = Harness::new();
    let fetcher = Arc::new(CountingFetcher::failing());
    h.services = h.services.clone().with_fetcher(fetcher.clone());
    let mut source = RemoteSource::new("http://cam/live.jpg");
    source.refresh = Some(Duration::from_millis(5));
    let button = h.button(remote_definition(source));
    button.show().unwrap();

    assert!(wait_until(Duration::from_secs(2), || fetcher.calls() >= 2));
    assert!(button.is_job_running(JobKind::image_refresh(0, "http://cam/live.jpg")));
    assert!(button.destroy());

    let after = fetcher.calls();
    thread::sleep(Duration::from_millis(40));
    assert_eq!(fetcher.calls(), after);
}

#[test]
fn test_refresh_follows_active_instance_source() {
    let mut h = Harness::new();
    let fetcher = Arc::new(UrlFetcher(vec![
        ("http://cam/a.png", solid_png([255, 0, 0, 255])),
        ("http://cam/b.png", solid_png([0, 0, 255, 255])),
    ]));
    h.services = h.services.clone().with_fetcher(fetcher);

    let periodic = |url: &str| {
        let mut source = RemoteSource::new(url);
        source.refresh = Some(Duration::from_millis(5));
        source
    };
    let mut definition = remote_definition(periodic("http://cam/a.png"));
    definition.instances.push(definition.instances[0].clone());
    definition.instances[1].bitmaps = vec![BitmapLayer::remote(periodic("http://cam/b.png"))];
    let button = h.button(definition);
    button.show().unwrap();

    let display = h.display.clone();
    let last_pixel = move || display.frames().last().map(|f| f.raster.get(4, 4));
    assert!(wait_until(Duration::from_secs(2), || last_pixel() == Some(0xFFFF0000)));

    button.render(Some(1)).unwrap();
    let old_job = JobKind::image_refresh(0, "http://cam/a.png");
    assert!(wait_until(Duration::from_secs(2), || !button.is_job_running(old_job)));
    assert!(wait_until(Duration::from_secs(2), || last_pixel() == Some(0xFF0000FF)));
    assert!(button.is_job_running(JobKind::image_refresh(0, "http://cam/b.png")));
    assert!(button.destroy());
}
