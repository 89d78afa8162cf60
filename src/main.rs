// What you SEE:
// • The room (left) shows the pressure field; walls are white lines.
// • Left click inside the room: adds a source there (yellow +).
// • Space: a pulse in the middle of the room.   R: reset.   L: reload the room file.
// • 1/2/3: wood/concrete/glass damping.   G: back to the global damping value.
// • +/-: raise/lower the global damping value (and switch to it).
// • Up/Down: amplitude.   Left/Right: wave speed.   C: grayscale <-> colormap.
// • ESC quits. Current settings are shown in the window title.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use minifb::Key;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use room_wave::draw::{self, Drawer};
use room_wave::types::FrameBuffer;
use room_wave::{
    BoundaryPolicy, Command, DampingMode, Error, ImpulseMode, Material, RenderMode, SimConfig,
    SimulationState,
};

#[derive(Parser, Debug)]
#[command(name = "room-wave", about = "Sound propagation in a rectangular room")]
struct Args {
    /// JSON config file (any subset of the settings)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON room file with a `walls` array
    #[arg(long)]
    room: Option<PathBuf>,

    /// Grid points per side (overrides the config)
    #[arg(long)]
    grid: Option<usize>,

    /// Start with the perceptual colormap instead of grayscale
    #[arg(long)]
    colormap: bool,

    /// Sources fire once instead of every frame
    #[arg(long)]
    one_shot: bool,

    /// Zero-gradient edges instead of the absorbing band
    #[arg(long)]
    reflective: bool,

    /// Damp with a wall material instead of the global value
    #[arg(long)]
    material: Option<Material>,
}

impl Args {
    fn into_config(self) -> Result<(SimConfig, Option<PathBuf>), Error> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_path(path)?,
            None => SimConfig::default(),
        };
        if let Some(n) = self.grid {
            config.grid.nx = n;
            config.grid.ny = n;
        }
        if self.colormap {
            config.render = RenderMode::Colormap;
        }
        if self.one_shot {
            config.impulse_mode = ImpulseMode::OneShot;
        }
        if self.reflective {
            config.boundary = BoundaryPolicy::Reflective;
        }
        if let Some(m) = self.material {
            config.damping = DampingMode::Material(m);
        }
        Ok((config, self.room))
    }
}

const AMPLITUDE_STEP: f32 = 0.1;
const SPEED_STEP: f32 = 0.1;
const DAMPING_STEP: f32 = 0.005;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                "room_wave=info".parse().map_err(|e| Error::invalid_config(format!("{e}")))?,
            ),
        )
        .init();

    let (config, room_path) = Args::parse().into_config()?;
    let room = config.room;
    // the global value survives material selection; it starts at 0 when a material is given
    let mut global_damping = config.damping.global().unwrap_or(0.0);
    let mut sim = SimulationState::new(config)?;

    if let Some(path) = &room_path {
        sim.apply(Command::LoadRoom(path.clone()))?;
    }

    /* --- Window + reusable screen buffer --- */
    let (w, h) = (sim.config().window_width, sim.config().window_height);
    let mut drawer = Drawer::new("Sound Wave Visualization", w, h)?;
    let mut screen = FrameBuffer::new(w, h);

    /* --- FPS bookkeeping --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut fps = 0.0f32;

    info!("ready: click in the room or press Space");

    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Collect this frame's commands, in order */
        let mut commands = Vec::new();

        if drawer.left_clicked() {
            if let Some((mx, my)) = drawer.mouse_pos() {
                if let Some((px, py)) = room.to_local(mx, my) {
                    commands.push(Command::Impulse { px, py });
                }
            }
        }
        if drawer.pressed_once(Key::Space) {
            commands.push(Command::Pulse);
        }
        if drawer.pressed_once(Key::R) {
            commands.push(Command::Reset);
        }
        if drawer.pressed_once(Key::L) {
            match &room_path {
                Some(path) => commands.push(Command::LoadRoom(path.clone())),
                None => warn!("no room file given (--room)"),
            }
        }
        let materials = [
            (Key::Key1, Material::Wood),
            (Key::Key2, Material::Concrete),
            (Key::Key3, Material::Glass),
        ];
        for (key, material) in materials {
            if drawer.pressed_once(key) {
                commands.push(Command::SelectMaterial(material));
            }
        }
        if drawer.pressed_once(Key::Equal) {
            global_damping = (global_damping + DAMPING_STEP).min(1.0);
            commands.push(Command::SetDamping(global_damping));
        }
        if drawer.pressed_once(Key::Minus) {
            global_damping = (global_damping - DAMPING_STEP).max(0.0);
            commands.push(Command::SetDamping(global_damping));
        }
        if drawer.pressed_once(Key::G) {
            commands.push(Command::SetDamping(global_damping));
        }
        let amplitude = sim.config().amplitude;
        if drawer.pressed_once(Key::Up) {
            commands.push(Command::SetAmplitude((amplitude + AMPLITUDE_STEP).min(1.0)));
        }
        if drawer.pressed_once(Key::Down) {
            commands.push(Command::SetAmplitude((amplitude - AMPLITUDE_STEP).max(0.0)));
        }
        let speed = sim.config().grid.wave_speed;
        if drawer.pressed_once(Key::Right) {
            commands.push(Command::SetWaveSpeed(speed + SPEED_STEP));
        }
        if drawer.pressed_once(Key::Left) && speed - SPEED_STEP > 0.0 {
            commands.push(Command::SetWaveSpeed(speed - SPEED_STEP));
        }
        if drawer.pressed_once(Key::C) {
            commands.push(Command::SetRenderMode(sim.config().render.toggled()));
        }

        /* 2) Apply, advance and colorize; a bad command is logged, not fatal */
        let image = sim.frame(commands);

        /* 3) Compose the screen: background, field, border, walls, sources */
        screen.fill(draw::BACKGROUND);
        draw::blit_image(&mut screen, &image, room);
        draw::draw_room_border(&mut screen, room, 2, draw::ROOM_BORDER);
        draw::draw_walls(&mut screen, room, sim.mask().walls(), draw::WALL);

        let (nx, ny) = (sim.field().nx(), sim.field().ny());
        for source in sim.injector().pending() {
            let sx = room.x + (source.x as u32 * room.width / nx as u32) as i32;
            let sy = room.y + (source.y as u32 * room.height / ny as u32) as i32;
            draw::draw_crosshair(&mut screen, sx, sy, 5, draw::SOURCE);
        }

        /* 4) Present */
        drawer.present(&screen)?;

        /* 5) Once a second: FPS + settings in the title, stats in the log */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            fps = frames_this_second as f32 / secs;
            frames_this_second = 0;
            last_fps_time = now;
            debug!(
                fps,
                steps = sim.steps(),
                energy = sim.energy(),
                peak = sim.field().max_abs(),
                "frame stats"
            );
        }

        let c = sim.config();
        let status = if sim.is_active() { "RUNNING" } else { "IDLE" };
        let title = format!(
            "Sound Wave Visualization | {status} | amp {:.1} | {:.0} Hz | c {:.1} | damping {} | FPS {fps:.1}",
            c.amplitude, c.frequency, c.grid.wave_speed, c.damping
        );
        drawer.set_title(&title);
    }

    Ok(())
}
