use crate::system::UpdateGroup;

/// One stage of the process-wide frame loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePhase {
    /// Stable name of the phase.
    pub name: &'static str,
    /// The update group the phase drives.
    pub group: UpdateGroup,
}

/// Process-wide scheduling-phase configuration.
///
/// Describes which update groups a frame steps through when a world is
/// driven by the ambient loop rather than by explicit `update` calls.
/// The harness installs [`PhaseLoop::empty`] for the duration of a test
/// so nothing runs implicitly, and restores the prior configuration at
/// teardown; equality is structural so a restore can be verified
/// bit-for-bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseLoop {
    phases: Vec<FramePhase>,
}

impl PhaseLoop {
    /// The standard loop: one phase per update group, in group order.
    pub fn standard() -> Self {
        Self {
            phases: UpdateGroup::ORDER
                .iter()
                .map(|&group| FramePhase {
                    name: match group {
                        UpdateGroup::Init => "initialization",
                        UpdateGroup::Simulation => "simulation",
                        UpdateGroup::Present => "presentation",
                    },
                    group,
                })
                .collect(),
        }
    }

    /// A loop with no phases; nothing runs implicitly.
    pub fn empty() -> Self {
        Self { phases: Vec::new() }
    }

    /// The configured phases in execution order.
    pub fn phases(&self) -> &[FramePhase] {
        &self.phases
    }

    /// Number of configured phases.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// True when no phases are configured.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Append a phase to the end of the loop.
    pub fn push(&mut self, phase: FramePhase) {
        self.phases.push(phase);
    }
}

impl Default for PhaseLoop {
    fn default() -> Self {
        Self::standard()
    }
}
