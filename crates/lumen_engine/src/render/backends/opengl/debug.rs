//! OpenGL debug-output routing into `log`

use glow::HasContext;

use super::GlowDevice;

/// Driver message ids that are pure noise (buffer placement hints and the like)
const IGNORED_MESSAGE_IDS: [u32; 4] = [131_169, 131_185, 131_218, 131_204];

fn log_message(source: u32, kind: u32, id: u32, severity: u32, message: &str) {
    match severity {
        glow::DEBUG_SEVERITY_HIGH => {
            log::error!("OpenGL [source {source:#x}, type {kind:#x}, id {id}]: {message}");
        }
        glow::DEBUG_SEVERITY_MEDIUM | glow::DEBUG_SEVERITY_LOW => {
            log::warn!("OpenGL [source {source:#x}, type {kind:#x}, id {id}]: {message}");
        }
        _ => log::debug!("OpenGL [source {source:#x}, type {kind:#x}, id {id}]: {message}"),
    }
}

impl GlowDevice {
    /// Route driver debug messages into the log
    ///
    /// Does nothing unless the context was created with the debug flag. Returns
    /// whether debug output was enabled.
    pub fn enable_debug_output(&mut self) -> bool {
        let gl = self.gl_mut();
        unsafe {
            let flags = gl.get_parameter_i32(glow::CONTEXT_FLAGS);
            if flags & glow::CONTEXT_FLAG_DEBUG_BIT as i32 == 0 {
                log::debug!("Context has no debug flag, OpenGL debug output stays off");
                return false;
            }

            gl.enable(glow::DEBUG_OUTPUT);
            gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
            gl.debug_message_callback(log_message);

            for kind in [glow::DEBUG_TYPE_OTHER, glow::DEBUG_TYPE_PERFORMANCE] {
                gl.debug_message_control(
                    glow::DEBUG_SOURCE_API,
                    kind,
                    glow::DONT_CARE,
                    &IGNORED_MESSAGE_IDS,
                    false,
                );
            }
        }

        log::info!("OpenGL debug output enabled");
        true
    }
}
