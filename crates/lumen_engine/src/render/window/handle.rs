//! GLFW window with an OpenGL context

use std::cell::RefCell;
use std::time::Duration;

use glfw::Context;
use glow::HasContext;

use crate::core::WindowConfig;
use crate::render::backends::opengl::GlowDevice;

use super::subsystem::{Subsystem, SubsystemBackend};
use super::{WindowError, WindowResult};

#[cfg(target_os = "macos")]
const GL_VERSION: (u32, u32) = (4, 1);
#[cfg(not(target_os = "macos"))]
const GL_VERSION: (u32, u32) = (4, 3);

/// The GLFW library as a [`SubsystemBackend`]
struct GlfwLibrary;

impl SubsystemBackend for GlfwLibrary {
    type Handle = glfw::Glfw;
    type Error = glfw::InitError;

    fn initialize(&mut self) -> Result<glfw::Glfw, glfw::InitError> {
        log::info!("Initializing GLFW");
        glfw::init(log_glfw_error)
    }

    fn terminate(&mut self, glfw: glfw::Glfw) {
        log::info!("Terminating GLFW");
        drop(glfw);
    }
}

thread_local! {
    static GLFW: RefCell<Subsystem<GlfwLibrary>> = const { RefCell::new(Subsystem::new(GlfwLibrary)) };
}

fn log_glfw_error(error: glfw::Error, description: String) {
    log::error!("GLFW error {error:?}: {description}");
}

/// Releases this window's hold on the GLFW library when dropped
struct LibraryGuard;

impl Drop for LibraryGuard {
    fn drop(&mut self) {
        GLFW.with(|subsystem| subsystem.borrow_mut().release());
    }
}

/// A window plus its OpenGL context
///
/// The first window initializes GLFW and the last one dropped terminates it. Windows
/// must be created and dropped on the main thread.
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    start_time: f64,
    debug_context: bool,
    // Declared last so the window is destroyed before the library can terminate.
    _library: LibraryGuard,
}

impl Window {
    /// Open a window as described by `config`
    ///
    /// A zero width or height falls back to the primary monitor's resolution. The
    /// context is made current and the swap interval set.
    pub fn create(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = GLFW
            .with(|subsystem| subsystem.borrow_mut().acquire())
            .map_err(|e| WindowError::InitializationFailed(format!("{e:?}")))?;
        let library = LibraryGuard;

        let (width, height) = resolve_size(&mut glfw, config.width, config.height)?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(GL_VERSION.0, GL_VERSION.1));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(cfg!(target_os = "macos")));
        glfw.window_hint(glfw::WindowHint::OpenGlDebugContext(config.wants_debug_context()));
        glfw.window_hint(glfw::WindowHint::Samples(Some(config.samples)));
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let created = if config.fullscreen {
            glfw.with_primary_monitor(|glfw, monitor| {
                let mode = monitor.map_or(glfw::WindowMode::Windowed, |monitor| glfw::WindowMode::FullScreen(monitor));
                glfw.create_window(width, height, &config.title, mode)
            })
        } else {
            glfw.create_window(width, height, &config.title, glfw::WindowMode::Windowed)
        };
        let (mut window, events) = created.ok_or(WindowError::CreationFailed)?;

        window.set_framebuffer_size_polling(true);
        window.set_close_polling(true);
        window.set_key_polling(true);
        window.make_current();
        glfw.set_swap_interval(if config.vsync {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        });

        log::info!("Opened {width}x{height} window '{}'", config.title);
        let start_time = glfw.get_time();

        Ok(Self {
            glfw,
            window,
            events,
            start_time,
            debug_context: config.wants_debug_context(),
            _library: library,
        })
    }

    /// Make this window's context current on the calling thread (no-op if it already is)
    pub fn make_current(&mut self) {
        if !self.window.is_current() {
            self.window.make_current();
        }
    }

    /// Detach any context from the calling thread
    pub fn release_current(&mut self) {
        glfw::make_context_current(None);
    }

    /// Process pending events and return them
    pub fn poll_events(&mut self) -> Vec<glfw::WindowEvent> {
        self.glfw.poll_events();
        glfw::flush_messages(&self.events).map(|(_, event)| event).collect()
    }

    /// Whether closing was requested
    pub fn closed(&self) -> bool {
        self.window.should_close()
    }

    /// Request the window to close
    pub fn close(&mut self) {
        self.window.set_should_close(true);
    }

    /// Drawable size in pixels
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (u32::try_from(width).unwrap_or(0), u32::try_from(height).unwrap_or(0))
    }

    /// Present the back buffer
    pub fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    /// Time since the window was opened
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64((self.glfw.get_time() - self.start_time).max(0.0))
    }

    /// Load OpenGL through this window's context
    ///
    /// Makes the context current, checks the version and routes driver debug output
    /// into the log when the context was created with the debug flag.
    #[allow(unsafe_code)]
    pub fn load_device(&mut self) -> WindowResult<GlowDevice> {
        self.make_current();

        let window = &mut self.window;
        // SAFETY: the context is current on this thread and outlives the device only
        // as long as the caller keeps this window alive.
        let gl = unsafe { glow::Context::from_loader_function(|symbol| window.get_proc_address(symbol) as *const _) };

        let version = gl.version();
        if version.is_embedded || (version.major, version.minor) < GL_VERSION {
            return Err(WindowError::ContextLoad(format!(
                "OpenGL {}.{} required, context provides {}.{}",
                GL_VERSION.0, GL_VERSION.1, version.major, version.minor
            )));
        }

        let mut device = GlowDevice::new(gl);
        if self.debug_context {
            device.enable_debug_output();
        }
        Ok(device)
    }
}

fn resolve_size(glfw: &mut glfw::Glfw, width: u32, height: u32) -> WindowResult<(u32, u32)> {
    if width != 0 && height != 0 {
        return Ok((width, height));
    }

    let (monitor_width, monitor_height) = glfw
        .with_primary_monitor(|_, monitor| monitor.and_then(|monitor| monitor.get_video_mode()))
        .map(|mode| (mode.width, mode.height))
        .ok_or(WindowError::CreationFailed)?;

    Ok((
        if width == 0 { monitor_width } else { width },
        if height == 0 { monitor_height } else { height },
    ))
}
