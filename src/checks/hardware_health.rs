use log::{debug, info};
use serde_json::Value;

use crate::cli::HardwareHealthArgs;
use crate::ontap::{collection, models, OntapApi};
use crate::{CheckReport, Outcome, PerfData, Result, State, Unit};

/// Sensor types checked when `--type` is not given.
pub const SENSOR_TYPES: &[&str] = &[
    "fan",
    "thermal",
    "voltage",
    "current",
    "battery-life",
    "discrete",
    "fru",
    "nvmem",
    "counter",
    "minutes",
    "percent",
    "agent",
];

const STATE_WARNING: &[&str] = &["warn-low", "warn-high", "ok-with-suppressed"];
const STATE_CRITICAL: &[&str] = &[
    "crit-low",
    "crit-high",
    "bad",
    "failed",
    "fault",
    "degraded",
    "unreachable",
];
const STATE_UNKNOWN: &[&str] = &[
    "unknown",
    "not-present",
    "ignored",
    "uninitialized",
    "init-failed",
    "not-available",
    "invalid",
];

const NVRAM_WARNING: &[&str] = &["battery_near_end_of_life", "battery_over_charged"];
const NVRAM_CRITICAL: &[&str] = &[
    "battery_full_discharged",
    "battery_not_present",
    "battery_at_end_of_life",
];
const NVRAM_UNKNOWN: &[&str] = &["battery_unknown"];

/// State of a sensor or FRU. `None` for states that are not reported, like `normal`.
fn sensor_state(state: &str) -> Option<State> {
    if STATE_CRITICAL.contains(&state) {
        Some(State::Critical)
    } else if STATE_WARNING.contains(&state) {
        Some(State::Warning)
    } else if STATE_UNKNOWN.contains(&state) {
        Some(State::Unknown)
    } else {
        None
    }
}

fn battery_state(state: &str) -> State {
    if NVRAM_WARNING.contains(&state) {
        State::Warning
    } else if NVRAM_CRITICAL.contains(&state) {
        State::Critical
    } else if NVRAM_UNKNOWN.contains(&state) {
        State::Unknown
    } else {
        State::Ok
    }
}

fn failure_message(component: &models::FailedComponent) -> &str {
    component
        .message
        .as_ref()
        .and_then(|m| m.message.as_deref())
        .unwrap_or("unknown")
}

fn sensor_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn check_node(report: &mut CheckReport, types: &[String], node: &models::Node) {
    let wants = |t: &str| types.iter().any(|x| x == t);
    let name = node.name.as_deref().unwrap_or("unknown");
    let controller = node.controller.clone().unwrap_or_default();
    info!("checking node {}", name);
    debug!("{:?}", node);

    if wants("thermal") {
        let temperature = controller.over_temperature.as_deref().unwrap_or("unknown");
        let state = if temperature == "normal" {
            State::Ok
        } else {
            State::Warning
        };
        report.add_message(
            state,
            format!("Temperature on {} is {}", name, temperature),
        );
    }

    if wants("fan") {
        if let Some(fan) = controller.failed_fan.as_ref() {
            let state = if fan.count.unwrap_or(0) > 0 {
                State::Warning
            } else {
                State::Ok
            };
            report.add_message(
                state,
                format!("Fan on {}: {}", name, failure_message(fan)),
            );
        }
    }

    if wants("voltage") || wants("current") {
        if let Some(psu) = controller.failed_power_supply.as_ref() {
            let state = if psu.count.unwrap_or(0) > 0 {
                State::Warning
            } else {
                State::Ok
            };
            report.add_message(
                state,
                format!("PSU on {}: {}", name, failure_message(psu)),
            );
        }
    }

    if wants("battery-life") {
        if let Some(battery) = node.nvram.as_ref().and_then(|n| n.battery_state.as_deref()) {
            report.add_message(
                battery_state(battery),
                format!("NVRAM on {}: '{}'", name, battery),
            );
        }
    }

    if wants("fru") {
        for fru in controller.frus.iter().flatten() {
            let state = fru.state.as_deref().unwrap_or("unknown");
            report.add_message(
                sensor_state(state).unwrap_or(State::Ok),
                format!(
                    "FRU {} on {} is {}",
                    fru.id.as_deref().unwrap_or("unknown"),
                    name,
                    state
                ),
            );
        }
    }
}

/// Checks node level hardware status and the environment sensors of all nodes.
pub fn run<A>(api: &A, args: &HardwareHealthArgs) -> Result<Outcome>
where
    A: OntapApi + ?Sized,
{
    let filter = args.filter.item_filter()?;
    let types: Vec<String> = if args.types.is_empty() {
        SENSOR_TYPES.iter().map(|t| t.to_string()).collect()
    } else {
        args.types.clone()
    };
    info!("checking sensors: {:?}", types);

    let mut report = CheckReport::new();

    let nodes: Vec<models::Node> = collection(api, models::NODES, "name,controller,nvram", &[])?;
    for node in nodes.iter() {
        check_node(&mut report, &types, node);
    }

    let type_list = types.join(",");
    let sensors: Vec<models::Sensor> = collection(
        api,
        models::ENVIRONMENT_SENSORS,
        "fru,state,name,type,value,units,discrete-state",
        &[("type", type_list.as_str())],
    )?;
    if sensors.is_empty() {
        return Ok(CheckReport::new().exit(State::Unknown, "no sensors found"));
    }

    let mut checked = 0;
    for sensor in sensors.iter() {
        debug!("{:?}", sensor);
        let name = sensor.name.as_deref().unwrap_or("unknown");
        if filter.should_exclude(name) {
            continue;
        }
        checked += 1;
        let node = sensor.node.as_deref().unwrap_or("unknown");
        let state = sensor.state.as_deref().unwrap_or("unknown");

        if args.perfdata {
            let value = sensor.value.as_ref().and_then(sensor_value);
            if let (Some(value), Some(units)) = (value, sensor.units.as_deref()) {
                report.add_perfdata(
                    PerfData::new(&format!("{}_{}", node, name), value)
                        .with_unit(Unit::Other(units.replace("mA*hr", "mAh"))),
                );
            }
        }

        if let Some(status) = sensor_state(state) {
            report.add_message(
                status,
                format!(
                    "{} {} on node {} is {}",
                    sensor.kind.as_deref().unwrap_or("unknown"),
                    name,
                    node,
                    state
                ),
            );
        }
    }

    let (state, message) = report.check_messages("\n", None);
    if state != State::Ok {
        return Ok(report.exit(state, message));
    }

    let summary = format!("all {} checked sensors are fine", checked);
    if message.is_empty() {
        return Ok(report.exit(state, summary));
    }
    Ok(report.exit(state, format!("{}\n{}", summary, message)))
}
