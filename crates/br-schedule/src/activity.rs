//! `Activity`: a named mode of a brain.
//!
//! Behaviors are registered per activity; only behaviors of the active
//! activities may start.  `Core` is special: a brain's core activities are
//! always active alongside exactly one other activity.

use std::fmt;
use std::str::FromStr;

use crate::ScheduleError;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Activity {
    Core,
    Idle,
    Work,
    Play,
    Rest,
    Meet,
    Panic,
    Fight,
    Ram,
}

impl Activity {
    pub const ALL: [Activity; 9] = [
        Activity::Core,
        Activity::Idle,
        Activity::Work,
        Activity::Play,
        Activity::Rest,
        Activity::Meet,
        Activity::Panic,
        Activity::Fight,
        Activity::Ram,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Core => "core",
            Activity::Idle => "idle",
            Activity::Work => "work",
            Activity::Play => "play",
            Activity::Rest => "rest",
            Activity::Meet => "meet",
            Activity::Panic => "panic",
            Activity::Fight => "fight",
            Activity::Ram => "ram",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activity {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Activity::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ScheduleError::UnknownActivity(s.to_owned()))
    }
}
