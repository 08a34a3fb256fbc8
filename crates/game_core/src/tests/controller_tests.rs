use super::*;
use hardware::{
    sim::{RecordingPulseDriver, SimulatedConverter},
    HardwareError, Servo, ServoSettings,
};
use shared::domain::{AdcChannel, PwmChannel, Side};

const STRIKE_PULSE_US: f32 = (0.5 + 2.0 * 160.0 / 180.0) * 1000.0;
const REST_PULSE_US: f32 = (0.5 + 2.0 * 30.0 / 180.0) * 1000.0;

struct Rig {
    controller: GameController<SimulatedConverter, Servo<RecordingPulseDriver>>,
    converter: SimulatedConverter,
    pulses: RecordingPulseDriver,
    now: Instant,
}

impl Rig {
    fn new() -> Self {
        let converter = SimulatedConverter::default();
        let pulses = RecordingPulseDriver::default();
        let servo = Servo::attach(pulses.clone(), ServoSettings::default()).expect("servo");
        let controller = GameController::start(converter.clone(), servo, GameSettings::default())
            .expect("controller");
        Self {
            controller,
            converter,
            pulses,
            now: Instant::now(),
        }
    }

    fn playing() -> Self {
        let mut rig = Self::new();
        rig.send(GameEvent::Action);
        while rig.controller.state() == GameState::Starting {
            rig.send(GameEvent::CountdownElapsed);
            rig.now += rig.controller.countdown.step();
        }
        assert_eq!(rig.controller.state(), GameState::Playing);
        rig
    }

    fn send(&mut self, event: GameEvent) -> Option<GameState> {
        self.controller.handle(event, self.now).expect("event handled")
    }

    fn press(&self, red: i16, green: i16) {
        self.converter.set_reading(AdcChannel(0), red).expect("red");
        self.converter.set_reading(AdcChannel(1), green).expect("green");
    }

    fn servo_pulses(&self) -> Vec<f32> {
        self.pulses.pulse_widths(PwmChannel(0))
    }

    fn strike_count(&self) -> usize {
        self.servo_pulses()
            .iter()
            .filter(|pulse| (**pulse - STRIKE_PULSE_US).abs() < 0.01)
            .count()
    }
}

#[test]
fn starts_ready_with_bell_at_rest() {
    let rig = Rig::new();

    assert_eq!(rig.controller.state(), GameState::Ready);
    assert_eq!(rig.controller.scores(), Scores::ZERO);
    let pulses = rig.servo_pulses();
    assert_eq!(pulses.len(), 1);
    assert!((pulses[0] - REST_PULSE_US).abs() < 0.01);
}

#[test]
fn rejects_invalid_settings() {
    let mut settings = GameSettings::default();
    settings.sensor.green_channel = settings.sensor.red_channel;
    let servo = Servo::attach(RecordingPulseDriver::default(), ServoSettings::default())
        .expect("servo");

    let result = GameController::start(SimulatedConverter::default(), servo, settings);

    assert!(matches!(result, Err(GameError::Config(_))));
}

#[test]
fn ready_ticks_do_not_sample() {
    let mut rig = Rig::new();
    rig.press(1354, 1354);

    for _ in 0..10 {
        assert_eq!(rig.send(GameEvent::Tick), None);
    }

    assert_eq!(rig.controller.scores(), Scores::ZERO);
    assert_eq!(rig.converter.read_count(), 0);
}

#[test]
fn action_in_ready_announces_five_immediately() {
    let mut rig = Rig::new();

    assert_eq!(rig.send(GameEvent::Action), Some(GameState::Starting));

    let step = rig.controller.countdown.step();
    assert_eq!(rig.controller.next_countdown_fire(), Some(rig.now + step));
    assert_eq!(rig.controller.frame().countdown, Some(5));
    assert_eq!(
        rig.controller.frame().view().action.label.as_deref(),
        Some("5")
    );
}

#[test]
fn countdown_announces_then_enters_playing() {
    let mut rig = Rig::new();
    rig.send(GameEvent::Action);
    let step = rig.controller.countdown.step();

    let mut announced = vec![rig.controller.frame().countdown.expect("five")];
    for _ in 0..4 {
        rig.now += step;
        assert_eq!(rig.send(GameEvent::CountdownElapsed), None);
        announced.push(rig.controller.frame().countdown.expect("announced"));
        assert_eq!(rig.controller.next_countdown_fire(), Some(rig.now + step));
    }
    assert_eq!(announced, vec![5, 4, 3, 2, 1]);

    rig.now += step;
    assert_eq!(rig.send(GameEvent::CountdownElapsed), Some(GameState::Playing));
    assert_eq!(rig.controller.next_countdown_fire(), None);
    assert_eq!(rig.controller.frame().countdown, None);
}

#[test]
fn starting_ignores_ticks_and_actions() {
    let mut rig = Rig::new();
    rig.send(GameEvent::Action);
    rig.press(1354, 0);
    let before = rig.controller.next_countdown_fire();

    assert_eq!(rig.send(GameEvent::Tick), None);
    assert_eq!(rig.send(GameEvent::Action), None);

    assert_eq!(rig.controller.state(), GameState::Starting);
    assert_eq!(rig.controller.scores(), Scores::ZERO);
    assert_eq!(rig.controller.next_countdown_fire(), before);
    assert_eq!(rig.controller.frame().countdown, Some(5));
    assert_eq!(rig.converter.read_count(), 0);
}

#[test]
fn half_press_scores_fifty_and_keeps_playing() {
    let mut rig = Rig::playing();
    rig.press(677, 0);

    assert_eq!(rig.send(GameEvent::Tick), None);

    assert_eq!(rig.controller.scores(), Scores::new(50, 0));
    assert_eq!(rig.controller.state(), GameState::Playing);
}

#[test]
fn action_while_playing_changes_nothing() {
    let mut rig = Rig::playing();
    rig.press(400, 800);
    rig.send(GameEvent::Tick);
    let scores = rig.controller.scores();

    assert_eq!(rig.send(GameEvent::Action), None);

    assert_eq!(rig.controller.state(), GameState::Playing);
    assert_eq!(rig.controller.scores(), scores);
}

#[test]
fn win_strikes_bell_exactly_once() {
    let mut rig = Rig::playing();
    rig.press(1354, 900);

    assert_eq!(rig.send(GameEvent::Tick), Some(GameState::Ended));
    for _ in 0..20 {
        assert_eq!(rig.send(GameEvent::Tick), None);
    }

    assert_eq!(rig.controller.state(), GameState::Ended);
    assert_eq!(rig.controller.scores(), Scores::new(100, 66));
    assert_eq!(rig.controller.strikes(), 1);
    assert_eq!(rig.strike_count(), 1);
    assert!(rig.controller.scores().is_winner(Side::Red));
    assert!(!rig.controller.scores().is_winner(Side::Green));
}

#[test]
fn overpress_is_clamped_to_winning_score() {
    let mut rig = Rig::playing();
    rig.press(0, 2047);

    rig.send(GameEvent::Tick);

    assert_eq!(rig.controller.scores(), Scores::new(0, 100));
    assert_eq!(rig.controller.state(), GameState::Ended);
}

#[test]
fn simultaneous_full_press_ends_with_no_winner() {
    let mut rig = Rig::playing();
    rig.press(1354, 1354);

    assert_eq!(rig.send(GameEvent::Tick), Some(GameState::Ended));

    let scores = rig.controller.scores();
    assert_eq!(scores, Scores::new(100, 100));
    assert!(!scores.is_winner(Side::Red));
    assert!(!scores.is_winner(Side::Green));
    assert_eq!(rig.strike_count(), 1);
    let last = *rig.servo_pulses().last().expect("strike pulse");
    assert!((last - STRIKE_PULSE_US).abs() < 0.01);
}

#[test]
fn action_after_end_resets_to_ready() {
    let mut rig = Rig::playing();
    rig.press(1354, 0);
    rig.send(GameEvent::Tick);

    assert_eq!(rig.send(GameEvent::Action), Some(GameState::Ready));

    assert_eq!(rig.controller.scores(), Scores::ZERO);
    let last = *rig.servo_pulses().last().expect("rest pulse");
    assert!((last - REST_PULSE_US).abs() < 0.01);
}

#[test]
fn each_match_strikes_once() {
    let mut rig = Rig::playing();
    rig.press(1354, 0);
    rig.send(GameEvent::Tick);
    rig.send(GameEvent::Action);

    rig.send(GameEvent::Action);
    while rig.controller.state() == GameState::Starting {
        rig.send(GameEvent::CountdownElapsed);
        rig.now += rig.controller.countdown.step();
    }
    rig.press(0, 1354);
    rig.send(GameEvent::Tick);
    rig.send(GameEvent::Tick);

    assert_eq!(rig.controller.strikes(), 2);
    assert_eq!(rig.strike_count(), 2);
}

#[test]
fn unlisted_pairs_do_not_mutate_state() {
    let unlisted = [
        (GameState::Ready, GameEvent::CountdownElapsed),
        (GameState::Starting, GameEvent::Tick),
        (GameState::Starting, GameEvent::Action),
        (GameState::Playing, GameEvent::Action),
        (GameState::Playing, GameEvent::CountdownElapsed),
        (GameState::Ended, GameEvent::Tick),
        (GameState::Ended, GameEvent::CountdownElapsed),
    ];

    for (state, event) in unlisted {
        let mut rig = match state {
            GameState::Ready => Rig::new(),
            GameState::Starting => {
                let mut rig = Rig::new();
                rig.send(GameEvent::Action);
                rig.send(GameEvent::CountdownElapsed);
                rig
            }
            GameState::Playing => {
                let mut rig = Rig::playing();
                rig.press(300, 200);
                rig.send(GameEvent::Tick);
                rig
            }
            GameState::Ended => {
                let mut rig = Rig::playing();
                rig.press(1354, 200);
                rig.send(GameEvent::Tick);
                rig
            }
        };
        rig.press(700, 700);
        let frame = rig.controller.frame();
        let fire = rig.controller.next_countdown_fire();
        let pulses = rig.servo_pulses().len();

        assert_eq!(rig.send(event), None, "{state:?} + {event:?}");

        assert_eq!(rig.controller.frame(), frame, "{state:?} + {event:?}");
        assert_eq!(rig.controller.next_countdown_fire(), fire, "{state:?} + {event:?}");
        assert_eq!(rig.servo_pulses().len(), pulses, "{state:?} + {event:?}");
    }
}

#[test]
fn failed_strike_write_is_not_counted() {
    let mut rig = Rig::playing();
    rig.press(1354, 0);
    rig.pulses.fail_writes("pwm nack");

    let err = rig
        .controller
        .handle(GameEvent::Tick, rig.now)
        .expect_err("strike should fail");

    assert!(matches!(err, GameError::Hardware(HardwareError::Write { .. })));
    assert_eq!(rig.controller.strikes(), 0);
    assert_eq!(rig.strike_count(), 0);
}

#[test]
fn sensor_failure_propagates_without_scoring() {
    let mut rig = Rig::playing();
    rig.press(677, 677);
    rig.send(GameEvent::Tick);
    rig.converter.fail_reads("i2c nack");

    let err = rig
        .controller
        .handle(GameEvent::Tick, rig.now)
        .expect_err("tick should fail");

    assert!(matches!(err, GameError::Hardware(HardwareError::Read { .. })));
    assert_eq!(rig.controller.scores(), Scores::new(50, 50));
    assert_eq!(rig.controller.state(), GameState::Playing);
}

#[test]
fn cancel_countdown_withdraws_pending_fire() {
    let mut rig = Rig::new();
    rig.send(GameEvent::Action);
    rig.send(GameEvent::CountdownElapsed);

    rig.controller.cancel_countdown();

    assert_eq!(rig.controller.next_countdown_fire(), None);
    assert_eq!(rig.send(GameEvent::CountdownElapsed), None);
    assert_eq!(rig.controller.state(), GameState::Starting);
}
