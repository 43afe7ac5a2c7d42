use serde::{Deserialize, Serialize};

/// Trace switches of one emulator instance.
///
/// Each `Memory` owns its own copy, so a run-ahead clone can be traced (or
/// silenced) independently of the main instance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostics {
    /// Bank map rebuilds, odd word accesses, firmware writes
    pub mem: bool,
    /// Custom register reads and writes
    pub ocsreg: bool,
    /// Accesses to read-only, write-only and unused registers
    pub invreg: bool,
    pub cia: bool,
    pub rtc: bool,
    pub autoconf: bool,
}

impl Diagnostics {
    pub fn all() -> Self {
        Diagnostics {
            mem: true,
            ocsreg: true,
            invreg: true,
            cia: true,
            rtc: true,
            autoconf: true,
        }
    }
}
