//=========================================================================
// Event Names
//=========================================================================
//
// Event name definitions used by the application event bus.
//
// Names are namespaced ("thundershock.<domain>:<action>") and must be
// matched exactly by producers and consumers.
//
//=========================================================================

/// Signals that the kernel has started.
pub const KERNEL_START: &str = "thundershock.kernel:start";

/// Emitted when a key is read from the publisher.
pub const PUBLISHER_GET: &str = "thundershock.publisher.get";

/// Emitted when a key is written to the publisher.
pub const PUBLISHER_SET: &str = "thundershock.publisher.set";

/// Signals that a service object has been constructed.
pub const SERVICE_PRELOAD: &str = "thundershock.service:preload";

pub const SCENE_CHANGE: &str = "thundershock.scene:change";

/// Every built-in event name.
pub const ALL: [&str; 5] = [
    KERNEL_START,
    PUBLISHER_GET,
    PUBLISHER_SET,
    SERVICE_PRELOAD,
    SCENE_CHANGE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let unique: HashSet<_> = ALL.iter().collect();
        assert_eq!(unique.len(), ALL.len());
    }

    #[test]
    fn names_are_namespaced() {
        for name in ALL {
            assert!(name.starts_with("thundershock."), "{name}");
        }
    }
}
