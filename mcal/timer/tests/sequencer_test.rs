//! Mode, clock and output-compare sequencing against the hosted register file

use mcal_core::RegisterFile;
use mcal_timer::layout::{register_file, TCCR0, TCCR1A, TCCR1B, TCCR2};
use mcal_timer::{
    Channel, ClockSelect, Interrupts, OutputMode, TimerConfig, TimerId, TimerMode, TimerState,
    Timers,
};

fn timers() -> Timers<RegisterFile> {
    Timers::new(register_file())
}

fn cs(code: u8) -> ClockSelect {
    ClockSelect::new(code).unwrap()
}

#[test]
fn test_init_applies_every_mode() {
    for id in TimerId::ALL {
        for mode in TimerMode::ALL {
            let mut t = timers();
            let cfg = TimerConfig::new(id).with_mode(mode).with_clock(cs(1));
            t.init(&cfg).unwrap();
            assert_eq!(t.mode(id), Ok(mode), "{} {:?}", id, mode);
            assert_eq!(t.state(id), TimerState::Running(cs(1)));
        }
    }
}

#[test]
fn test_scenario_16bit_fast_pwm() {
    let mut t = timers();
    let clk64 = ClockSelect::for_divisor(TimerId::Timer1, 64).unwrap();
    let cfg = TimerConfig::new(TimerId::Timer1)
        .with_mode(TimerMode::FastPwm)
        .with_clock(clk64)
        .with_output(Channel::A, OutputMode::Clear)
        .with_output(Channel::B, OutputMode::Disconnected)
        .with_counter(0)
        .with_compare(Channel::A, 128)
        .with_compare(Channel::B, 0)
        .with_interrupts(Interrupts::NONE);
    t.init(&cfg).unwrap();

    assert_eq!(t.counter(TimerId::Timer1), 0);
    assert_eq!(t.compare(TimerId::Timer1, Channel::A), Ok(128));
    assert_eq!(t.mode(TimerId::Timer1), Ok(TimerMode::FastPwm));
    assert_eq!(t.clock(TimerId::Timer1), clk64);
    assert_eq!(t.clock(TimerId::Timer1).code(), 3);
}

#[test]
fn test_scenario_stop_then_restart() {
    let mut t = timers();
    t.init(&TimerConfig::pwm(TimerId::Timer0).unwrap()).unwrap();
    let mode = t.mode(TimerId::Timer0);
    let output = t.output_mode(TimerId::Timer0, Channel::A);

    t.stop(TimerId::Timer0);
    assert_eq!(t.state(TimerId::Timer0), TimerState::Stopped);
    let clk8 = ClockSelect::for_divisor(TimerId::Timer0, 8).unwrap();
    t.start(TimerId::Timer0, clk8);

    assert_eq!(t.mode(TimerId::Timer0), mode);
    assert_eq!(t.output_mode(TimerId::Timer0, Channel::A), output);
    assert_eq!(t.clock(TimerId::Timer0), clk8);
}

#[test]
fn test_stop_zeroes_only_clock_field() {
    let mut t = timers();
    t.init(&TimerConfig::pwm(TimerId::Timer1).unwrap()).unwrap();
    let a = t.bus().peek(TCCR1A);
    let b = t.bus().peek(TCCR1B);

    t.stop(TimerId::Timer1);
    assert_eq!(t.bus().peek(TCCR1A), a);
    assert_eq!(t.bus().peek(TCCR1B), b & !0x07);
}

#[test]
fn test_start_keeps_counter() {
    let mut t = timers();
    t.set_counter(TimerId::Timer2, 77);
    t.start(TimerId::Timer2, cs(2));
    t.start(TimerId::Timer2, cs(5));
    assert_eq!(t.counter(TimerId::Timer2), 77);
}

#[test]
fn test_set_mode_preserves_clock() {
    for id in TimerId::ALL {
        for code in 0..=7 {
            for mode in TimerMode::ALL {
                let mut t = timers();
                t.start(id, cs(code));
                let before = t.clock(id);
                t.set_mode(id, mode).unwrap();
                assert_eq!(t.clock(id), before);
                assert_eq!(t.mode(id), Ok(mode));
            }
        }
    }
}

#[test]
fn test_set_mode_never_runs_half_switched() {
    let mut t = timers();
    t.init(
        &TimerConfig::new(TimerId::Timer1)
            .with_mode(TimerMode::Ctc)
            .with_clock(cs(4)),
    )
    .unwrap();
    t.bus_mut().clear_journal();

    t.set_mode(TimerId::Timer1, TimerMode::FastPwm).unwrap();

    // Replay the control-register writes; whenever the clock is running,
    // the mode must be either entirely old or entirely new.
    // CTC (WGM12) with clock code 4
    let mut a = 0u8;
    let mut b = 0b0000_1100u8;
    let mut stopped_seen = false;
    for w in t.bus().journal() {
        if w.reg == TCCR1A {
            a = w.value;
        } else if w.reg == TCCR1B {
            b = w.value;
        } else {
            continue;
        }
        let wgm = (a & 0b11) | ((b >> 1) & 0b1100);
        if b & 0x07 == 0 {
            stopped_seen = true;
        } else {
            assert!(wgm == 0b0100 || wgm == 0b0101, "running with wgm {:#06b}", wgm);
        }
    }
    assert!(stopped_seen);
    assert_eq!(t.clock(TimerId::Timer1).code(), 4);
}

#[test]
fn test_output_mode_leaves_other_channel() {
    for a in OutputMode::ALL {
        for b in OutputMode::ALL {
            let mut t = timers();
            t.set_output_mode(TimerId::Timer1, Channel::B, b).unwrap();
            let before = t.output_mode(TimerId::Timer1, Channel::B);
            t.set_output_mode(TimerId::Timer1, Channel::A, a).unwrap();
            assert_eq!(t.output_mode(TimerId::Timer1, Channel::A), Ok(a));
            assert_eq!(t.output_mode(TimerId::Timer1, Channel::B), before);
        }
    }
}

#[test]
fn test_field_writes_keep_force_compare_bit() {
    let mut t = timers();
    t.bus_mut().poke(TCCR0, 0x80);
    t.bus_mut().poke(TCCR2, 0x80);

    t.set_mode(TimerId::Timer0, TimerMode::FastPwm).unwrap();
    t.set_output_mode(TimerId::Timer0, Channel::A, OutputMode::Set).unwrap();
    t.start(TimerId::Timer2, cs(7));
    t.stop(TimerId::Timer2);

    assert_eq!(t.bus().peek(TCCR0) & 0x80, 0x80);
    assert_eq!(t.bus().peek(TCCR2), 0x80);
}

#[test]
fn test_configure_pins_sets_only_connected_channels() {
    use mcal_timer::layout::{DDRB, DDRD};

    let mut t = timers();
    t.bus_mut().poke(DDRD, 0b0000_0001);
    let cfg = TimerConfig::pwm(TimerId::Timer1)
        .unwrap()
        .with_output(Channel::B, OutputMode::Disconnected);
    t.init(&cfg).unwrap();
    assert_eq!(t.bus().peek(DDRD), 0b0010_0001);

    t.init(&TimerConfig::pwm(TimerId::Timer0).unwrap()).unwrap();
    assert_eq!(t.bus().peek(DDRB), 0b0000_1000);

    let mut t = timers();
    t.init(&TimerConfig::pwm(TimerId::Timer2).unwrap().with_pins(false))
        .unwrap();
    assert_eq!(t.bus().peek(DDRD), 0);
}

#[test]
fn test_channel_b_bundle_ignored_on_8bit_timer() {
    let mut t = timers();
    let cfg = TimerConfig::new(TimerId::Timer2)
        .with_output(Channel::B, OutputMode::Set)
        .with_compare(Channel::B, 9)
        .with_interrupts(Interrupts::new(false, false, true));
    t.init(&cfg).unwrap();
    assert_eq!(t.bus().peek(TCCR2), 0);
    assert_eq!(t.interrupts(TimerId::Timer2), Interrupts::NONE);
}
