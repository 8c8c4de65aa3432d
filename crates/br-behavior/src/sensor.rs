//! Sensors: periodic memory writers fed by world queries.

use br_core::Tick;
use br_memory::ModuleKey;

use crate::BrainContext;

/// Ticks between two scans unless a sensor overrides it.
pub const DEFAULT_SCAN_RATE: u64 = 20;

pub trait Sensor: Send {
    fn name(&self) -> &str;

    /// Modules this sensor writes.  They are declared in every layout the
    /// sensor's brain is installed with.
    fn produces(&self) -> Vec<ModuleKey>;

    fn scan_rate(&self) -> u64 {
        DEFAULT_SCAN_RATE
    }

    fn sense(&mut self, ctx: &mut BrainContext<'_>);
}

/// A sensor plus its scan timer.
///
/// The first scan happens after a random phase in `[0, scan_rate)` drawn
/// from the agent's RNG, so agents spawned together do not all scan on the
/// same tick.
pub struct ScheduledSensor {
    sensor:    Box<dyn Sensor>,
    next_scan: Option<Tick>,
}

impl ScheduledSensor {
    pub fn new(sensor: Box<dyn Sensor>) -> Self {
        Self { sensor, next_scan: None }
    }

    pub fn sensor(&self) -> &dyn Sensor {
        self.sensor.as_ref()
    }

    /// Run the sensor if due.  Returns `true` if it scanned.
    pub fn tick(&mut self, ctx: &mut BrainContext<'_>) -> bool {
        let rate = self.sensor.scan_rate().max(1);
        let due = match self.next_scan {
            Some(at) => at,
            None => {
                let first = ctx.tick + ctx.rng.gen_range(0..rate);
                self.next_scan = Some(first);
                first
            }
        };
        if ctx.tick < due {
            return false;
        }
        self.sensor.sense(ctx);
        self.next_scan = Some(ctx.tick + rate);
        true
    }
}
