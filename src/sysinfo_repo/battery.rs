// Battery via the `battery` crate. Absent hardware and driver errors both read as Unavailable.

use battery::units::ratio::percent;
use battery::units::time::second;
use battery::{Manager, State};

use crate::models::{BatterySample, Capability};
use crate::units::round2;

pub(super) fn read_battery() -> Capability<BatterySample> {
    match first_battery() {
        Ok(sample) => sample.into(),
        Err(e) => {
            tracing::debug!(error = %e, operation = "read_battery", "battery read failed, treating as absent");
            Capability::Unavailable
        }
    }
}

fn first_battery() -> Result<Option<BatterySample>, battery::Error> {
    let manager = Manager::new()?;
    let Some(battery) = manager.batteries()?.next() else {
        return Ok(None);
    };
    let battery = battery?;

    let state = battery.state();
    let plugged_in = matches!(state, State::Charging | State::Full);
    let secs_left = if plugged_in {
        None
    } else {
        battery
            .time_to_empty()
            .map(|t| t.get::<second>())
            .filter(|s| s.is_finite() && *s >= 0.0)
            .map(|s| s as u64)
    };

    Ok(Some(BatterySample {
        percent: round2(f64::from(battery.state_of_charge().get::<percent>())),
        plugged_in,
        secs_left,
    }))
}
