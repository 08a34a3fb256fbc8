use super::*;

fn frame(state: GameState, red: u8, green: u8, countdown: Option<u8>) -> DisplayFrame {
    DisplayFrame {
        state,
        scores: Scores::new(red, green),
        countdown,
    }
}

#[test]
fn ready_view_shows_start_button_and_zeroed_sides() {
    let view = frame(GameState::Ready, 0, 0, None).view();

    assert_eq!(view.red.text, "0");
    assert_eq!(view.green.text, "0");
    assert_eq!(view.red.weight, 0.0);
    assert_eq!(view.action.label.as_deref(), Some("Start"));
    assert!(view.action.visible);
}

#[test]
fn starting_view_shows_countdown_number() {
    let view = frame(GameState::Starting, 0, 0, Some(3)).view();

    assert_eq!(view.action.label.as_deref(), Some("3"));
    assert!(view.action.visible);
    assert_eq!(view.green.weight, 0.0);
}

#[test]
fn playing_view_hides_action_and_scales_indicators() {
    let view = frame(GameState::Playing, 50, 25, None).view();

    assert_eq!(view.red.text, "50");
    assert_eq!(view.green.text, "25");
    assert_eq!(view.red.weight, 0.5);
    assert_eq!(view.green.weight, 0.25);
    assert!(!view.action.visible);
}

#[test]
fn ended_view_marks_strictly_greater_side_as_winner() {
    let view = frame(GameState::Ended, 100, 72, None).view();

    assert_eq!(view.red.text, "Winner!");
    assert_eq!(view.green.text, "Loser!");
    assert_eq!(view.action.label.as_deref(), Some("Play again?"));
    assert!(view.action.visible);
}

#[test]
fn ended_tie_renders_neither_side_as_winner() {
    let view = frame(GameState::Ended, 100, 100, None).view();

    assert_eq!(view.red.text, "Loser!");
    assert_eq!(view.green.text, "Loser!");
    assert_eq!(view.red.weight, 1.0);
}

#[test]
fn game_command_serializes_with_type_tag() {
    let json = serde_json::to_string(&GameCommand::Action).expect("serialize");
    assert_eq!(json, r#"{"type":"action"}"#);
}
