/// Per-strategy capability state.
///
/// Transitions are monotonic within a session: `Unknown` may become
/// `Supported` or `Unsupported`, `Supported` may become `Unsupported`, and
/// `Unsupported` never reverts. A strategy that raised once is never
/// retried until the session resets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Capability {
    #[default]
    Unknown,
    Supported,
    Unsupported,
}

impl Capability {
    /// Whether the strategy may still be attempted.
    pub fn usable(self) -> bool {
        !matches!(self, Capability::Unsupported)
    }

    pub fn mark_supported(&mut self) {
        if matches!(self, Capability::Unknown) {
            *self = Capability::Supported;
        }
    }

    pub fn mark_unsupported(&mut self) {
        *self = Capability::Unsupported;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downgrade_is_permanent() {
        let mut cap = Capability::Unknown;
        assert!(cap.usable());
        cap.mark_supported();
        assert_eq!(cap, Capability::Supported);
        cap.mark_unsupported();
        assert_eq!(cap, Capability::Unsupported);
        cap.mark_supported();
        assert_eq!(cap, Capability::Unsupported);
        assert!(!cap.usable());
    }
}
