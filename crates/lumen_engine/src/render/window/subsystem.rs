//! Reference-counted library lifetime
//!
//! Windowing libraries want one global init before the first window and one
//! terminate after the last. [`Subsystem`] counts users: the first
//! [`acquire`](Subsystem::acquire) initializes the backend, the matching last
//! [`release`](Subsystem::release) terminates it.
//!
//! There is no locking. Windows are created and destroyed on the main thread only,
//! and the glfw instance lives in a thread-local to hold callers to that.

/// A library with global init/terminate
pub trait SubsystemBackend {
    /// Token handed to every user while the library is up
    type Handle: Clone;
    /// Initialization failure
    type Error;

    /// Bring the library up
    fn initialize(&mut self) -> Result<Self::Handle, Self::Error>;

    /// Tear the library down
    fn terminate(&mut self, handle: Self::Handle);
}

/// Use counter around a [`SubsystemBackend`]
pub struct Subsystem<B: SubsystemBackend> {
    backend: B,
    handle: Option<B::Handle>,
    users: usize,
}

impl<B: SubsystemBackend> Subsystem<B> {
    /// Wrap a backend; nothing is initialized yet
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            handle: None,
            users: 0,
        }
    }

    /// Register a user, initializing the backend if this is the first one
    ///
    /// A failed initialization registers nothing.
    pub fn acquire(&mut self) -> Result<B::Handle, B::Error> {
        let handle = match &self.handle {
            Some(handle) => handle.clone(),
            None => {
                let handle = self.backend.initialize()?;
                self.handle = Some(handle.clone());
                handle
            }
        };

        self.users += 1;
        Ok(handle)
    }

    /// Unregister a user, terminating the backend after the last one
    pub fn release(&mut self) {
        if self.users == 0 {
            log::warn!("Subsystem released more often than acquired");
            return;
        }

        self.users -= 1;
        if self.users == 0 {
            if let Some(handle) = self.handle.take() {
                self.backend.terminate(handle);
            }
        }
    }

    /// Current number of users
    pub fn users(&self) -> usize {
        self.users
    }

    /// Whether the backend is currently up
    pub fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct CountingBackend {
        initializations: usize,
        terminations: usize,
        fail_next: bool,
    }

    impl SubsystemBackend for CountingBackend {
        type Handle = usize;
        type Error = &'static str;

        fn initialize(&mut self) -> Result<usize, &'static str> {
            if std::mem::take(&mut self.fail_next) {
                return Err("init failed");
            }
            self.initializations += 1;
            Ok(self.initializations)
        }

        fn terminate(&mut self, _handle: usize) {
            self.terminations += 1;
        }
    }

    #[test]
    fn test_first_acquire_initializes_last_release_terminates() {
        let mut subsystem = Subsystem::new(CountingBackend::default());

        assert_eq!(subsystem.acquire(), Ok(1));
        assert_eq!(subsystem.acquire(), Ok(1));
        assert_eq!(subsystem.backend().initializations, 1);
        assert_eq!(subsystem.users(), 2);

        subsystem.release();
        assert!(subsystem.is_initialized());
        assert_eq!(subsystem.backend().terminations, 0);

        subsystem.release();
        assert!(!subsystem.is_initialized());
        assert_eq!(subsystem.backend().terminations, 1);
    }

    #[test]
    fn test_reinitializes_after_full_release() {
        let mut subsystem = Subsystem::new(CountingBackend::default());

        subsystem.acquire().unwrap();
        subsystem.release();
        assert_eq!(subsystem.acquire(), Ok(2));
        assert_eq!(subsystem.backend().initializations, 2);
    }

    #[test]
    fn test_failed_initialization_registers_nothing() {
        let mut subsystem = Subsystem::new(CountingBackend {
            fail_next: true,
            ..CountingBackend::default()
        });

        assert_eq!(subsystem.acquire(), Err("init failed"));
        assert_eq!(subsystem.users(), 0);
        assert!(!subsystem.is_initialized());
    }

    #[test]
    fn test_unbalanced_release_is_ignored() {
        let mut subsystem = Subsystem::new(CountingBackend::default());
        subsystem.release();

        assert_eq!(subsystem.users(), 0);
        assert_eq!(subsystem.backend().terminations, 0);
    }
}
