//! Scenario replay: feed recorded geometry events through the engine and
//! print what it says.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use echowalk_config::{Config, ScenarioEvent};
use echowalk_core::{
    Engine, EngineNotice, EngineRunner, GeometryEvent, SpeechRequest, Ticker, TrackerCfg, channel,
};
use echowalk_traits::{Clock, ManualClock};
use echowalk_traits::clock::MonotonicClock;

use crate::voice::{SimVoice, Started, ThreadVoice};

pub struct ReplayOpts<'a> {
    pub scenario: &'a Path,
    pub realtime: bool,
    pub speech_ms_per_char: u64,
    pub tail_ms: u64,
    pub say: &'a [(u64, String)],
    pub json: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub events: usize,
    pub ticks: u64,
    pub utterances: usize,
    pub warnings: usize,
    pub dropped: usize,
    pub anchors: usize,
    pub interrupted: bool,
}

/// Matches started utterances to the warnings that produced them.
#[derive(Default)]
struct Printer {
    json: bool,
    kinds: HashMap<String, &'static str>,
    summary: Summary,
}

impl Printer {
    fn notice(&mut self, n: &EngineNotice) {
        if let EngineNotice::Warning { warning, accepted } = n {
            self.summary.warnings += 1;
            if *accepted {
                self.kinds.insert(warning.text.clone(), warning.kind.name());
            } else {
                self.summary.dropped += 1;
            }
        }
    }

    fn utterance(&mut self, s: &Started) {
        self.summary.utterances += 1;
        let kind = self.kinds.remove(&s.text).unwrap_or("speech");
        let t_ms = s.at.as_millis().min(u128::from(u64::MAX)) as u64;
        if self.json {
            println!(
                "{}",
                serde_json::json!({ "t_ms": t_ms, "utterance": s.text, "kind": kind })
            );
        } else {
            println!("[{t_ms:>7} ms] {kind:<15} {}", s.text);
        }
    }

    fn finish(self) -> Summary {
        let s = self.summary;
        if self.json {
            println!(
                "{}",
                serde_json::json!({
                    "summary": {
                        "events": s.events,
                        "ticks": s.ticks,
                        "utterances": s.utterances,
                        "warnings": s.warnings,
                        "dropped": s.dropped,
                        "anchors": s.anchors,
                        "interrupted": s.interrupted,
                    }
                })
            );
        } else {
            println!(
                "replay complete: {} events, {} ticks, {} utterances ({} warnings, {} dropped), {} anchors live{}",
                s.events,
                s.ticks,
                s.utterances,
                s.warnings,
                s.dropped,
                s.anchors,
                if s.interrupted { ", interrupted" } else { "" }
            );
        }
        s
    }
}

pub fn run(cfg: &Config, opts: &ReplayOpts<'_>) -> eyre::Result<Summary> {
    let events = echowalk_config::load_scenario_csv(opts.scenario)?;
    tracing::info!(
        scenario = %opts.scenario.display(),
        events = events.len(),
        realtime = opts.realtime,
        "replay start"
    );
    let mut says = opts.say.to_vec();
    says.sort_by_key(|(t, _)| *t);
    let printer = Printer {
        json: opts.json,
        ..Printer::default()
    };
    if opts.realtime {
        run_realtime(cfg, opts, &events, &says, printer)
    } else {
        run_simulated(cfg, opts, &events, &says, printer)
    }
}

fn end_ms(events: &[ScenarioEvent], says: &[(u64, String)], tail_ms: u64) -> u64 {
    let last_event = events.last().map_or(0, |e| e.t_ms);
    let last_say = says.last().map_or(0, |(t, _)| *t);
    last_event.max(last_say).saturating_add(tail_ms)
}

/// Deterministic replay on a `ManualClock`, stepping `wake_ms` at a time.
fn run_simulated(
    cfg: &Config,
    opts: &ReplayOpts<'_>,
    events: &[ScenarioEvent],
    says: &[(u64, String)],
    mut printer: Printer,
) -> eyre::Result<Summary> {
    let clock = ManualClock::new();
    let tracker = TrackerCfg::from(&cfg.tracker);
    let mut engine = Engine::builder()
        .with_synthesizer(SimVoice::new(clock.clone(), opts.speech_ms_per_char))
        .with_config(cfg)
        .with_clock(Arc::new(clock.clone()))
        .build()?;

    let wake = tracker.wake_ms.max(1);
    let end = end_ms(events, says, opts.tail_ms);
    // Speech still in flight at the end is allowed to finish.
    let hard_end = end.saturating_add(60_000);
    let mut next_tick = tracker.tick_ms;
    let (mut ev_i, mut say_i) = (0, 0);
    let mut t = 0u64;

    loop {
        clock.set_offset(Duration::from_millis(t));
        let now = clock.now();

        while let Some(ev) = events.get(ev_i).filter(|e| e.t_ms <= t) {
            engine.apply_geometry(GeometryEvent::from(ev));
            printer.summary.events += 1;
            ev_i += 1;
        }
        while let Some((_, text)) = says.get(say_i).filter(|(at, _)| *at <= t) {
            engine.say(SpeechRequest::Enqueue(text.clone()));
            say_i += 1;
        }
        if t >= next_tick {
            engine.motion_tick();
            printer.summary.ticks += 1;
            next_tick = next_tick.saturating_add(tracker.tick_ms);
        }
        for cb in engine.synthesizer_mut().take_due(now) {
            engine.on_speech_event(cb);
        }
        engine.poll();

        for n in engine.take_notices() {
            printer.notice(&n);
        }
        for s in engine.synthesizer_mut().drain_started() {
            printer.utterance(&s);
        }

        let drained = engine.speech().is_idle()
            && engine.speech().pending_len() == 0
            && engine.next_deadline().is_none();
        if (t >= end && drained) || t >= hard_end {
            break;
        }
        t = t.saturating_add(wake);
    }

    printer.summary.anchors = engine.registry().len();
    tracing::info!(sim_ms = t, "replay finished");
    Ok(printer.finish())
}

/// Wall-clock replay through the threaded runtime; Ctrl-C stops it early.
fn run_realtime(
    cfg: &Config,
    opts: &ReplayOpts<'_>,
    events: &[ScenarioEvent],
    says: &[(u64, String)],
    mut printer: Printer,
) -> eyre::Result<Summary> {
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))?;
    }

    let tracker = TrackerCfg::from(&cfg.tracker);
    let (handle, inbox) = channel();
    let voice = ThreadVoice::spawn(handle.speech_callback(), opts.speech_ms_per_char)?;
    let started = voice.started();
    let engine = Engine::builder()
        .with_synthesizer(voice)
        .with_config(cfg)
        .build()?;
    let runner = EngineRunner::spawn(engine, handle.clone(), inbox)?;
    let ticker = Ticker::spawn(handle.clone(), &tracker, MonotonicClock::new())?;

    let wake = Duration::from_millis(tracker.wake_ms.max(1));
    let end = Duration::from_millis(end_ms(events, says, opts.tail_ms));
    let t0 = Instant::now();
    let (mut ev_i, mut say_i) = (0, 0);
    let mut idle_seen = false;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("interrupted, stopping replay");
            printer.summary.interrupted = true;
            let _ = handle.say(SpeechRequest::Stop);
            break;
        }
        let t = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);
        while let Some(ev) = events.get(ev_i).filter(|e| e.t_ms <= t) {
            handle.geometry(GeometryEvent::from(ev))?;
            printer.summary.events += 1;
            idle_seen = false;
            ev_i += 1;
        }
        while let Some((_, text)) = says.get(say_i).filter(|(at, _)| *at <= t) {
            handle.say(SpeechRequest::Enqueue(text.clone()))?;
            idle_seen = false;
            say_i += 1;
        }
        for n in runner.notices().try_iter() {
            if n == EngineNotice::QueueIdle {
                idle_seen = true;
            }
            printer.notice(&n);
        }
        for s in started.try_iter() {
            idle_seen = false;
            printer.utterance(&s);
        }
        if t0.elapsed() >= end && (idle_seen || printer.summary.utterances == 0) {
            break;
        }
        std::thread::sleep(wake);
    }

    printer.summary.ticks = ticker.ticks();
    drop(ticker);
    let engine = runner.shutdown()?;
    for s in started.try_iter() {
        printer.utterance(&s);
    }
    printer.summary.anchors = engine.registry().len();
    Ok(printer.finish())
}
