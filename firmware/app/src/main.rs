#![no_main]
#![no_std]

use defmt_rtt as _;
use panic_probe as _;

use hal::{
    self,
    clocks::Clocks,
    pac,
    pac::TIM6,
    timer::{Timer, TimerInterrupt},
};

use wheelpulse_algo::{ControlLoop, ControllerConfig, PulseCapture, Telemetry};

use cortex_m;

/// Handoff between the RC edge interrupt and the control tick.
static PULSE: PulseCapture = PulseCapture::new();

/// H-bridge PWM frequency, above the audible range
const BRIDGE_FREQ: u32 = 20_000;
/// Control time base (1 ms)
const TICK_FREQ: f32 = 1000.0;

#[rtic::app(device = pac, peripherals = true, dispatchers = [TIM7])]
mod app {
    use super::*;

    use wheelpulse_drivers::*;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        command_in: command_input::CommandInput,
        tick_timer: Timer<TIM6>,
        millis: u32,
        sensor: position_sensor::PositionSensor,
        bridge: bridge::HBridge,
        control: ControlLoop,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local) {
        let dp = ctx.device;
        let clock_cfg = Clocks::default();
        clock_cfg.setup().unwrap();

        let sysclk_freq = clock_cfg.sysclk(); // System clock frequency in Hz
        defmt::debug!("SYSTEM: Clock frequency is {} MHz", sysclk_freq / 1000000);

        let config = ControllerConfig::default();
        let control = ControlLoop::new(config).unwrap();

        let mut bridge = bridge::HBridge::new(dp.TIM3, &clock_cfg, BRIDGE_FREQ, config.drive_max);
        let sensor = position_sensor::PositionSensor::new(
            dp.ADC1,
            &clock_cfg,
            config.sensor_range.max as u16,
        );
        let command_in = command_input::CommandInput::new(dp.TIM2, &clock_cfg);

        let mut tick_timer = Timer::new_tim6(dp.TIM6, TICK_FREQ, Default::default(), &clock_cfg);
        tick_timer.enable_interrupt(TimerInterrupt::Update);
        tick_timer.enable();

        bridge.begin();
        defmt::info!("SYSTEM: waiting for RC command");

        (
            Shared {},
            Local {
                command_in,
                tick_timer,
                millis: 0,
                sensor,
                bridge,
                control,
            },
        )
    }

    // Highest priority: edge timestamps must not wait for the control tick
    #[task(binds = EXTI15_10, priority = 3, local = [command_in])]
    fn command_edge(cx: command_edge::Context) {
        let (level_high, now_us) = cx.local.command_in.edge();
        PULSE.on_edge(level_high, now_us);
    }

    #[task(binds = TIM6_DACUNDER, priority = 2, local = [tick_timer, millis, sensor, bridge, control])]
    fn control_tick(cx: control_tick::Context) {
        cx.local.tick_timer.clear_interrupt(TimerInterrupt::Update);
        *cx.local.millis = cx.local.millis.wrapping_add(1);

        // The ADC conversion only runs on executed ticks
        let sensor = cx.local.sensor;
        if let Some(cmd) = cx.local.control.tick(*cx.local.millis, || sensor.read(), &PULSE) {
            cx.local.bridge.apply_drive(cmd);
            report::spawn(cx.local.control.telemetry()).ok();
        }
    }

    // Diagnostic line per executed tick, off the control path
    #[task(priority = 1)]
    async fn report(_cx: report::Context, t: Telemetry) {
        defmt::debug!(
            "pot: {} | pulse lpf: {} hpf: {} raw: {}us | pid: {} | drive: {}/{}",
            t.sensor_raw,
            t.pulse_filtered,
            t.pulse_high_pass,
            t.pulse_raw_us,
            t.pid_output,
            t.drive.forward_magnitude(),
            t.drive.reverse_magnitude()
        );
    }
}

#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}
