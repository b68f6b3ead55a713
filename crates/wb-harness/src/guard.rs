use wb_runtime::{PhaseLoop, RuntimeGlobals};

/// Saves the process-wide scheduling-phase configuration and installs a
/// neutral one, so no system runs implicitly outside the harness's
/// explicit update calls.
///
/// `restore` consumes the guard: each save is restored exactly once,
/// and forgetting the pairing shows up as an unused-value warning
/// rather than silent leakage.
#[derive(Debug)]
pub struct ExecutionContextGuard {
    saved: PhaseLoop,
}

impl ExecutionContextGuard {
    /// Capture the current frame loop and install the empty one.
    #[must_use = "the captured configuration must be restored"]
    pub fn save(globals: &RuntimeGlobals) -> Self {
        let saved = globals.phase_loop();
        globals.set_phase_loop(PhaseLoop::empty());
        Self { saved }
    }

    /// Reinstall exactly the captured configuration.
    pub fn restore(self, globals: &RuntimeGlobals) {
        globals.set_phase_loop(self.saved);
    }
}

/// Forces strict concurrent-access checking on for the duration of a
/// test, and puts the ambient value back afterward.
///
/// Subtle data races in parallel update paths only surface under strict
/// checking, so every test runs with it enabled regardless of the
/// ambient default. Restoration must not depend on the test having
/// passed; the lifecycle manager restores during teardown on every exit
/// path.
#[derive(Debug)]
pub struct AccessCheckToggle {
    was_enabled: bool,
}

impl AccessCheckToggle {
    /// Record the current flag value and force it on.
    #[must_use = "the recorded flag value must be restored"]
    pub fn enable(globals: &RuntimeGlobals) -> Self {
        let was_enabled = globals.set_access_checks(true);
        Self { was_enabled }
    }

    /// Write back the recorded original value.
    pub fn restore(self, globals: &RuntimeGlobals) {
        globals.set_access_checks(self.was_enabled);
    }
}
