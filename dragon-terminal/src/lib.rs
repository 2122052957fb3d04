/// Terminal host for the dragon generator: clock, controls and ASCII display
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use dragon_core::{DragonGenerator, MeshBuffers};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;
pub mod view;

pub use renderer::AsciiRenderer;
pub use view::{Camera, Orbit};

/// Body length change per key press
const LENGTH_STEP: f32 = 0.5;

/// Longest clock step fed to the generator, so a stalled terminal does not jump
const MAX_TICK: Duration = Duration::from_millis(250);

/// What the app displays
pub enum Scene {
    /// Animated dragon, regenerated every frame
    Dragon(DragonGenerator),
    /// Fixed mesh, e.g. loaded from STL
    Static(MeshBuffers),
}

impl Scene {
    pub fn mesh(&self) -> &MeshBuffers {
        match self {
            Scene::Dragon(generator) => &generator.mesh().buffers,
            Scene::Static(mesh) => mesh,
        }
    }
}

/// Main application struct for terminal rendering
pub struct TerminalApp {
    scene: Scene,
    orbit: Orbit,
    camera: Camera,
    renderer: AsciiRenderer,
    running: bool,
    paused: bool,
    last_tick: Instant,
    last_fps: Instant,
    frame_count: u32,
    fps: f32,
    status: Option<String>,
}

impl TerminalApp {
    pub fn new(mut scene: Scene) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        // Leave the top row for the status line
        let height = height.saturating_sub(1).max(1);

        let mut status = None;
        if let Scene::Dragon(generator) = &mut scene {
            if let Err(e) = generator.regenerate() {
                status = Some(e.to_string());
            }
        }

        let renderer = AsciiRenderer::new(width as usize, height as usize);
        let mut app = Self {
            scene,
            orbit: Orbit::new(0.3, 0.3, 0.0),
            camera: Camera::new(renderer.width() as u32, renderer.height() as u32),
            renderer,
            running: true,
            paused: false,
            last_tick: Instant::now(),
            last_fps: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            status,
        };
        app.reframe();
        Ok(app)
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            let dt = frame_start.duration_since(self.last_tick).min(MAX_TICK);
            self.last_tick = frame_start;
            self.update(dt.as_secs_f32());

            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_fps).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps).as_secs_f32();
                self.frame_count = 0;
                self.last_fps = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('w') | KeyCode::Up => self.orbit.rotate(0.1, 0.0, 0.0),
                KeyCode::Char('s') | KeyCode::Down => self.orbit.rotate(-0.1, 0.0, 0.0),
                KeyCode::Char('a') | KeyCode::Left => self.orbit.rotate(0.0, -0.1, 0.0),
                KeyCode::Char('d') | KeyCode::Right => self.orbit.rotate(0.0, 0.1, 0.0),
                KeyCode::Char('e') => self.orbit.rotate(0.0, 0.0, 0.1),
                KeyCode::Char('r') => self.orbit.rotate(0.0, 0.0, -0.1),
                KeyCode::Char(' ') => self.paused = !self.paused,
                KeyCode::Char('+') | KeyCode::Char('=') => self.change_length(LENGTH_STEP),
                KeyCode::Char('-') => self.change_length(-LENGTH_STEP),
                KeyCode::Char('0') => {
                    if let Scene::Dragon(generator) = &mut self.scene {
                        self.status = generator.reinitialize().err().map(|e| e.to_string());
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn change_length(&mut self, delta: f32) {
        if let Scene::Dragon(generator) = &mut self.scene {
            let mut params = generator.params().clone();
            params.dragon_meters = (params.dragon_meters + delta).max(0.0);
            tracing::info!(dragon_meters = params.dragon_meters, "Changed body length");
            generator.set_parameters(params);

            self.status = generator.regenerate().err().map(|e| e.to_string());
            self.reframe();
        }
    }

    fn update(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        if let Scene::Dragon(generator) = &mut self.scene {
            // A failed tick leaves the last good mesh on screen
            self.status = generator.tick(dt).err().map(|e| e.to_string());
        }
    }

    /// Aim the camera at the current mesh
    fn reframe(&mut self) {
        if let Some(bounds) = self.scene.mesh().bounds() {
            self.camera.frame_bounds(&bounds);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let model = self.orbit.model_matrix(&self.camera.target);

        self.renderer.clear();
        self.renderer
            .render_mesh(self.scene.mesh(), &model, &self.camera);

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 1))?;
        self.renderer.draw(&mut stdout)?;

        let summary = match &self.scene {
            Scene::Dragon(generator) => format!(
                "phase {:.2} | {} verts{}",
                generator.phase(),
                generator.mesh().buffers.vertex_count(),
                if self.paused { " | paused" } else { "" }
            ),
            Scene::Static(mesh) => format!("{} triangles", mesh.triangle_count()),
        };
        let line = match &self.status {
            Some(error) => format!("Dragon | {summary} | error: {error}"),
            None => format!(
                "Dragon | FPS: {:.1} | {summary} | WASD=Rotate E/R=Roll +/-=Length Space=Pause 0=Reset Q=Quit",
                self.fps
            ),
        };

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(if self.status.is_some() { Color::Red } else { Color::Yellow }),
            Print(line),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
