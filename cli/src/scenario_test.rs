use serde_json::json;

use super::*;

fn scenario(value: Value) -> Scenario {
    serde_json::from_value(value).unwrap()
}

fn replay(s: &Scenario) -> Replay {
    let config = DragConfig { move_interval: Duration::ZERO, screen_tolerance: 0.0 };
    Replay::new(s.grids.clone(), config, Duration::from_millis(16)).unwrap()
}

fn two_grids(steps: Value) -> Scenario {
    let small = json!({"max_cols": 3, "max_rows": 3, "cell_width": 10.0, "cell_height": 10.0,
        "margins": {"top": 0.0, "right": 0.0, "bottom": 0.0, "left": 0.0}});
    scenario(json!({
        "grids": [
            {"name": "left", "config": small, "items": [{"id": "a", "col": 1, "row": 1}]},
            {"name": "right", "config": small, "origin": {"x": 100.0, "y": 0.0}}
        ],
        "steps": steps
    }))
}

#[test]
fn parses_every_step_kind() {
    let s = two_grids(json!([
        {"down": {"grid": "left", "item": "a", "x": 5.0, "y": 5.0}},
        {"move": {"x": 6.0, "y": 6.0}},
        {"up": {"x": 6.0, "y": 6.0}},
        {"leave": {"grid": "left"}},
        "cancel",
        {"resize": {"grid": "left", "item": {"id": "a", "sizex": 2}}},
        {"drag_over": {"item": {"id": "n"}, "x": 1.0, "y": 1.0}},
        {"drop": {"item": {"id": "n"}, "x": 1.0, "y": 1.0}}
    ]));
    assert_eq!(s.steps.len(), 8);
    assert!(matches!(s.steps[4], Step::Cancel));
    assert!(matches!(&s.steps[5], Step::Resize { item, .. } if item.sizex == 2));
}

#[test]
fn cross_grid_move_is_applied() {
    let s = two_grids(json!([
        {"down": {"grid": "left", "item": "a", "x": 5.0, "y": 5.0}},
        {"move": {"x": 125.0, "y": 15.0}},
        {"up": {"x": 125.0, "y": 15.0}}
    ]));
    let mut r = replay(&s);
    let lines = r.run(&s.steps).unwrap();

    let moved: Vec<_> = lines.iter().filter(|l| l["event"] == "item_moved").collect();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0]["grid"], "right");
    assert_eq!(moved[0]["origin"], "left");
    assert_eq!(moved[0]["new"]["col"], 3);
    assert_eq!(moved[0]["new"]["row"], 2);
    assert_eq!(lines.last().unwrap(), &json!({"event": "drag_ended", "committed": true}));

    let snapshot = r.snapshot();
    assert_eq!(snapshot["grids"]["left"], json!([]));
    assert_eq!(snapshot["grids"]["right"][0]["id"], "a");
}

#[test]
fn external_drop_adds_item() {
    let s = two_grids(json!([
        {"move": {"x": 115.0, "y": 5.0}},
        {"drag_over": {"item": {"id": "n"}, "x": 115.0, "y": 5.0}},
        {"up": {"x": 115.0, "y": 5.0}},
        {"drop": {"item": {"id": "n"}, "x": 115.0, "y": 5.0}}
    ]));
    let mut r = replay(&s);
    let lines = r.run(&s.steps).unwrap();
    assert!(lines.iter().any(|l| l["event"] == "item_added" && l["grid"] == "right" && l["item"]["col"] == 2));
    assert_eq!(r.snapshot()["grids"]["right"][0]["id"], "n");
}

#[test]
fn unknown_grid_is_an_error() {
    let s = two_grids(json!([{"leave": {"grid": "middle"}}]));
    let err = replay(&s).run(&s.steps).unwrap_err();
    assert!(matches!(err, ReplayError::UnknownGrid(name) if name == "middle"));
}

#[test]
fn unknown_item_is_an_error() {
    let s = two_grids(json!([{"down": {"grid": "left", "item": "zz", "x": 5.0, "y": 5.0}}]));
    let err = replay(&s).run(&s.steps).unwrap_err();
    assert!(matches!(err, ReplayError::UnknownItem { .. }));
}

#[test]
fn duplicate_grid_names_are_rejected() {
    let s = scenario(json!({"grids": [{"name": "g"}, {"name": "g"}]}));
    let result = Replay::new(s.grids, DragConfig::default(), Duration::ZERO);
    assert!(matches!(result, Err(ReplayError::DuplicateGrid(name)) if name == "g"));
}

#[test]
fn invalid_grid_config_is_rejected() {
    let s = scenario(json!({"grids": [{"name": "g", "config": {"max_cols": 0}}]}));
    let result = Replay::new(s.grids, DragConfig::default(), Duration::ZERO);
    assert!(matches!(result, Err(ReplayError::Config(_))));
}
