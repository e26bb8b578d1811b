//! Gesture translation
//!
//! The closed set of gesture-style methods is translated into one low-level
//! pointer-action command. The remote protocol expects an ordered list of
//! pointer inputs, each carrying its own action sequence.

use serde_json::{json, Map, Value};

use crate::{Error, Result};

/// Gesture-style method names handled here instead of the generic path
pub const GESTURE_METHODS: &[&str] = &["tap", "swipe", "gesture"];

/// Duration of the pause between press and release in a tap, milliseconds
const TAP_HOLD_MS: u64 = 100;

/// Duration of the finger travel in a swipe, milliseconds
const SWIPE_TRAVEL_MS: u64 = 750;

/// Whether a method name is one of the gesture-style methods
pub fn is_gesture(method: &str) -> bool {
    GESTURE_METHODS.contains(&method)
}

/// Build the pointer-action payload for a gesture-style method
pub fn build(method: &str, args: &[Value]) -> Result<Value> {
    match method {
        "tap" => {
            let (x, y) = coordinate_pair(args, 0)
                .ok_or_else(|| Error::configuration("tap requires x and y coordinates"))?;
            Ok(tap_actions(x, y))
        }
        "swipe" => {
            let (x1, y1) = coordinate_pair(args, 0)
                .ok_or_else(|| Error::configuration("swipe requires start coordinates"))?;
            let (x2, y2) = coordinate_pair(args, 2)
                .ok_or_else(|| Error::configuration("swipe requires end coordinates"))?;
            Ok(swipe_actions(x1, y1, x2, y2))
        }
        "gesture" => {
            let map = args
                .first()
                .and_then(|v| v.as_object())
                .ok_or_else(|| Error::configuration("gesture requires a named pointer map"))?;
            Ok(pointer_map_actions(map))
        }
        other => Err(Error::unknown_command(other)),
    }
}

fn coordinate_pair(args: &[Value], offset: usize) -> Option<(f64, f64)> {
    let x = args.get(offset)?.as_f64()?;
    let y = args.get(offset + 1)?.as_f64()?;
    Some((x, y))
}

fn pointer_input(id: &str, actions: Value) -> Value {
    json!({
        "type": "pointer",
        "id": id,
        "parameters": { "pointerType": "touch" },
        "actions": actions,
    })
}

/// Single-finger tap at the given native coordinates
pub fn tap_actions(x: f64, y: f64) -> Value {
    json!([pointer_input(
        "finger1",
        json!([
            { "type": "pointerMove", "duration": 0, "x": x, "y": y },
            { "type": "pointerDown", "button": 0 },
            { "type": "pause", "duration": TAP_HOLD_MS },
            { "type": "pointerUp", "button": 0 },
        ]),
    )])
}

/// Single-finger swipe between two native coordinates
pub fn swipe_actions(x1: f64, y1: f64, x2: f64, y2: f64) -> Value {
    json!([pointer_input(
        "finger1",
        json!([
            { "type": "pointerMove", "duration": 0, "x": x1, "y": y1 },
            { "type": "pointerDown", "button": 0 },
            { "type": "pointerMove", "duration": SWIPE_TRAVEL_MS, "x": x2, "y": y2 },
            { "type": "pointerUp", "button": 0 },
        ]),
    )])
}

/// Convert a named pointer-input map into the ordered list shape
///
/// Names are sorted so the emitted order is deterministic.
pub fn pointer_map_actions(map: &Map<String, Value>) -> Value {
    let mut names: Vec<&String> = map.keys().collect();
    names.sort();

    let inputs: Vec<Value> = names
        .into_iter()
        .map(|name| pointer_input(name, map[name].clone()))
        .collect();
    Value::Array(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_action_order() {
        let payload = build("tap", &[json!(50), json!(80)]).expect("tap");

        let inputs = payload.as_array().unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0]["parameters"]["pointerType"], "touch");

        let actions = inputs[0]["actions"].as_array().unwrap();
        let kinds: Vec<&str> = actions.iter().map(|a| a["type"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["pointerMove", "pointerDown", "pause", "pointerUp"]);
        assert_eq!(actions[0]["x"], 50.0);
        assert_eq!(actions[0]["y"], 80.0);
    }

    #[test]
    fn test_swipe_travels_between_coordinates() {
        let payload =
            build("swipe", &[json!(10), json!(600), json!(10), json!(100)]).expect("swipe");

        let actions = payload[0]["actions"].as_array().unwrap();
        let kinds: Vec<&str> = actions.iter().map(|a| a["type"].as_str().unwrap()).collect();
        assert_eq!(
            kinds,
            vec!["pointerMove", "pointerDown", "pointerMove", "pointerUp"]
        );
        assert_eq!(actions[2]["y"], 100.0);
        assert!(actions[2]["duration"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_pointer_map_is_ordered_by_name() {
        let mut map = Map::new();
        map.insert("finger2".to_string(), json!([{ "type": "pointerDown", "button": 0 }]));
        map.insert("finger1".to_string(), json!([{ "type": "pointerDown", "button": 0 }]));

        let payload = build("gesture", &[Value::Object(map)]).expect("gesture");
        let inputs = payload.as_array().unwrap();
        assert_eq!(inputs[0]["id"], "finger1");
        assert_eq!(inputs[1]["id"], "finger2");
    }

    #[test]
    fn test_tap_without_coordinates_is_rejected() {
        let err = build("tap", &[json!(50)]).expect_err("missing y");
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_gesture_method_set() {
        assert!(is_gesture("tap"));
        assert!(is_gesture("swipe"));
        assert!(is_gesture("gesture"));
        assert!(!is_gesture("click"));
    }
}
