//! Renders a few sample buttons to PNG files.
//!
//! Usage: panel-buttons [output-dir]
//! Set PANEL_ASSETS to point at a directory of bitmaps and RUST_LOG=debug to
//! watch the commands a press would send.

use anyhow::{Context, Result};
use panel_buttons::button::{DisplayFrame, DisplaySink};
use panel_buttons::network::{ProtocolCommand, Transport};
use panel_buttons::ui::{FontTable, TextRenderer};
use panel_buttons::{
    Address, Bindings, Button, ButtonDefinition, ButtonGeometry, ButtonHandle, ButtonType,
    Direction, EngineConfig, Feedback, LevelFunction, Raster, Rect, Services, TextEffect,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Logs every command instead of putting it on a wire
struct LogTransport;

impl Transport for LogTransport {
    fn send_command(&self, command: ProtocolCommand) -> panel_buttons::Result<()> {
        log::info!("-> {}", command);
        Ok(())
    }
}

struct LogDisplay;

impl DisplaySink for LogDisplay {
    fn display(&self, frame: DisplayFrame) {
        log::info!(
            "display {} at {},{} ({}x{})",
            frame.handle,
            frame.left,
            frame.top,
            frame.width(),
            frame.height()
        );
    }
}

fn save_png(raster: &Raster, path: &Path) -> Result<()> {
    let image = image::RgbaImage::from_raw(raster.width() as u32, raster.height() as u32, raster.to_rgba8())
        .context("raster size does not match its pixel buffer")?;
    image
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn render_to(button: &Button, path: &Path) -> Result<()> {
    let image = button.render(None)?;
    save_png(&image.raster, path)
}

fn general(services: &Services) -> Result<Button> {
    let geometry = ButtonGeometry {
        handle: ButtonHandle::new(1, 1),
        name: "Power".to_string(),
        rect: Rect::new(20, 20, 200, 70),
        bindings: Bindings {
            channel: Address::new(1, 1),
            ..Default::default()
        },
        feedback: Feedback::Momentary,
        ..Default::default()
    };
    let mut definition = ButtonDefinition::with_instances(geometry, 2);
    for (instance, fill) in definition.instances.iter_mut().zip([0xFF303840, 0xFF2080E0]) {
        instance.text = "Power".to_string();
        instance.fill = fill;
        instance.effect = TextEffect::from_id(18);
    }
    Ok(Button::initialize(definition, services.clone())?)
}

fn bargraph(services: &Services) -> Result<Button> {
    let geometry = ButtonGeometry {
        handle: ButtonHandle::new(1, 2),
        name: "Volume".to_string(),
        kind: ButtonType::Bargraph,
        rect: Rect::new(240, 20, 60, 240),
        bindings: Bindings {
            level: Address::new(1, 1),
            ..Default::default()
        },
        level_function: LevelFunction::Active,
        direction: Direction::Vertical,
        ..Default::default()
    };
    let mut definition = ButtonDefinition::with_instances(geometry, 2);
    definition.instances[0].fill = 0xFF202428;
    definition.instances[1].fill = 0xFF30C060;
    Ok(Button::initialize(definition, services.clone())?)
}

fn joystick(services: &Services) -> Result<Button> {
    let geometry = ButtonGeometry {
        handle: ButtonHandle::new(1, 3),
        name: "Camera".to_string(),
        kind: ButtonType::Joystick,
        rect: Rect::new(320, 20, 160, 160),
        bindings: Bindings {
            level: Address::new(1, 10),
            ..Default::default()
        },
        level_function: LevelFunction::Active,
        ..Default::default()
    };
    let mut definition = ButtonDefinition::with_instances(geometry, 1);
    definition.instances[0].fill = 0xFF181818;
    Ok(Button::initialize(definition, services.clone())?)
}

fn main() -> Result<()> {
    panel_buttons::init_logging();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let config = EngineConfig::from_env();
    let headless = Services::headless(config.clone());
    let services = Services::new(
        config,
        headless.loader.clone(),
        headless.catalogue.clone(),
        Arc::new(FontTable::new()),
        Box::new(TextRenderer::new()),
    )
    .with_transport(Arc::new(LogTransport))
    .with_display(Arc::new(LogDisplay));

    let power = general(&services)?;
    power.show()?;
    render_to(&power, &out_dir.join("power_off.png"))?;
    power.click(100, 35, true);
    render_to(&power, &out_dir.join("power_on.png"))?;
    power.click(100, 35, false);

    let volume = bargraph(&services)?;
    volume.show()?;
    volume.click(30, 80, true);
    volume.click(30, 80, false);
    log::info!("Volume level {}", volume.level());
    render_to(&volume, &out_dir.join("volume.png"))?;

    let camera = joystick(&services)?;
    camera.show()?;
    camera.set_joystick(200, 60);
    render_to(&camera, &out_dir.join("camera.png"))?;

    for button in [power, volume, camera] {
        if !button.destroy() {
            log::warn!("A job did not stop in time");
        }
    }
    Ok(())
}
