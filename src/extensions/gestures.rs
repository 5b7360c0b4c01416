//! Touchpad gesture recognition. A background thread samples the synaptics
//! driver's shared-memory finger-state export at 10 Hz, matches the
//! resulting swipe angle/distance against a configured gesture table, and
//! posts completed gestures back to the main loop to be dispatched through
//! the [CommandRegistry]. See spec §4.9 and §5 (gestures are one of the
//! background fibres that only ever talk to the core by posting events; this
//! engine uses a channel and a real OS thread in place of that cooperative
//! scheduler).
use crate::{core::commands::CommandRegistry, Error, Result};
use std::{
    collections::HashMap,
    f64::consts::PI,
    sync::mpsc::{Receiver, Sender},
    time::Duration,
};
use tracing::{debug, warn};

const SYNAPTICS_SHM_KEY: i32 = 23947;
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const FINGER_COUNT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// One compass direction a two-plus-finger swipe can resolve to, bucketed in
/// 20deg-wide wedges around the eight compass points (the two wide bands at
/// due "up" absorb the +-180deg wraparound).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl Direction {
    fn slug(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::UpRight => "upright",
            Direction::Right => "right",
            Direction::DownRight => "downright",
            Direction::Down => "down",
            Direction::DownLeft => "downleft",
            Direction::Left => "left",
            Direction::UpLeft => "upleft",
        }
    }

    /// Bucket a swipe's `atan2(dx, dy)` angle (radians) into the direction
    /// whose 20deg wedge contains it.
    fn from_angle(angle: f64) -> Direction {
        let deg = angle * 180.0 / PI;
        match deg {
            d if !(-160.0..=160.0).contains(&d) => Direction::Up,
            d if (110.0..=160.0).contains(&d) => Direction::UpRight,
            d if (70.0..110.0).contains(&d) => Direction::Right,
            d if (20.0..=70.0).contains(&d) => Direction::DownRight,
            d if (-20.0..20.0).contains(&d) => Direction::Down,
            d if (-70.0..=-20.0).contains(&d) => Direction::DownLeft,
            d if (-110.0..-70.0).contains(&d) => Direction::Left,
            _ => Direction::UpLeft,
        }
    }
}

/// A single `<n>f-<direction>` entry in the gesture table: how far a swipe
/// has to travel before it is recognised at all (`detect_distance`) and
/// before it counts as a full commit (`commit_distance`), plus the command
/// it dispatches on commit.
#[derive(Debug, Clone)]
pub struct GestureSpec {
    pub fingers: u8,
    pub direction: Direction,
    pub detect_distance: f64,
    pub commit_distance: f64,
    pub object: String,
    pub verb: String,
    pub args: Vec<String>,
}

impl GestureSpec {
    fn name(&self) -> String {
        format!("{}f-{}", self.fingers, self.direction.slug())
    }
}

/// The set of gestures this manager recognises, keyed by `<n>f-<direction>`.
#[derive(Debug, Clone, Default)]
pub struct GestureTable(HashMap<String, GestureSpec>);

impl GestureTable {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn add(&mut self, spec: GestureSpec) {
        self.0.insert(spec.name(), spec);
    }

    fn lookup(&self, fingers: u8, direction: Direction) -> Option<&GestureSpec> {
        self.0.get(&format!("{fingers}f-{}", direction.slug()))
    }
}

/// A raw sample read from the touchpad driver: absolute position and
/// current finger count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchpadSample {
    pub x: i32,
    pub y: i32,
    pub num_fingers: u8,
}

/// Abstracts the shared-memory read so the state machine below is testable
/// without a real synaptics driver attached.
pub trait TouchpadSource {
    fn sample(&mut self) -> Result<TouchpadSample>;
}

/// The outcome of feeding one sample into the [GestureRecognizer]: mirrors
/// the START/PARTIAL/FULL/UNDO/COMMIT/CANCEL markers the gesture widget
/// listens for to animate progress, plus the terminal `Commit` carrying the
/// matched spec.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    Start { name: String },
    Partial { name: String, percent: f64 },
    Full { name: String, percent: f64 },
    Undo { name: String, percent: f64 },
    Commit { name: String },
    Cancel { name: String },
}

#[derive(Debug, Clone, Copy)]
struct Active {
    fingers: u8,
    start_x: i32,
    start_y: i32,
    reached_full: bool,
}

/// Pure swipe-tracking state machine: feed it samples one at a time and it
/// reports gesture progress/completion. Kept free of any I/O so it can be
/// exercised directly in tests.
#[derive(Default)]
pub struct GestureRecognizer {
    active: Option<(Active, String)>,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Feed one sample. `sample = None` means fingers lifted entirely.
    pub fn feed(&mut self, sample: Option<TouchpadSample>, table: &GestureTable) -> Vec<GestureEvent> {
        match (sample, self.active.take()) {
            (None, Some((active, name))) => {
                self.active = None;
                if active.reached_full {
                    vec![GestureEvent::Commit { name }]
                } else {
                    vec![GestureEvent::Cancel { name }]
                }
            }
            (None, None) => Vec::new(),

            // A new touch with enough fingers down: start tracking from
            // this position, nothing to match against until it moves.
            (Some(sample), None) if sample.num_fingers >= 2 => {
                self.active = Some((
                    Active {
                        fingers: sample.num_fingers,
                        start_x: sample.x,
                        start_y: sample.y,
                        reached_full: false,
                    },
                    String::new(),
                ));
                Vec::new()
            }

            (Some(_), None) => Vec::new(),

            (Some(sample), Some((mut active, mut name))) if sample.num_fingers == active.fingers => {
                let dx = (sample.x - active.start_x) as f64;
                let dy = (sample.y - active.start_y) as f64;
                let angle = dx.atan2(dy);
                let dist = (dx * dx + dy * dy).sqrt();
                let direction = Direction::from_angle(angle);

                let Some(spec) = table.lookup(active.fingers, direction) else {
                    self.active = Some((active, name));
                    return Vec::new();
                };

                if name.is_empty() {
                    name = spec.name();
                }

                if dist < spec.detect_distance {
                    self.active = Some((active, name.clone()));
                    return if name == spec.name() { vec![GestureEvent::Start { name }] } else { Vec::new() };
                }

                let percent = (dist / spec.commit_distance).min(1.0);
                active.reached_full = dist >= spec.commit_distance;
                self.active = Some((active, name.clone()));

                let ev = if active.reached_full {
                    GestureEvent::Full { name, percent }
                } else {
                    GestureEvent::Partial { name, percent }
                };
                vec![ev]
            }

            (Some(sample), Some((active, name))) => {
                // Finger count changed mid-swipe: cancel whatever was being
                // tracked (unless it already ran to completion) and start
                // fresh from this sample.
                let mut events = if active.reached_full {
                    vec![GestureEvent::Commit { name }]
                } else {
                    vec![GestureEvent::Cancel { name }]
                };
                events.extend(self.feed(Some(sample), table));
                events
            }
        }
    }
}

/// A completed gesture, bridged across the polling thread to the main loop
/// as plain owned data (channels require `Send`, not borrowed core state).
#[derive(Debug, Clone)]
pub struct GestureCommit {
    pub name: String,
    pub object: String,
    pub verb: String,
    pub args: Vec<String>,
}

/// Spawn the 10 Hz touchpad poll on its own thread; completed gestures are
/// sent down `tx` for the main loop to dispatch via [drain_commits].
pub fn spawn<S>(mut source: S, table: GestureTable, tx: Sender<GestureCommit>) -> std::thread::JoinHandle<()>
where
    S: TouchpadSource + Send + 'static,
{
    std::thread::spawn(move || {
        let mut recognizer = GestureRecognizer::new();
        loop {
            let sample = match source.sample() {
                Ok(s) => Some(s),
                Err(e) => {
                    debug!(%e, "touchpad sample read failed, treating as lifted");
                    None
                }
            };

            let interval = if sample.map(|s| s.num_fingers >= 2).unwrap_or(false) {
                POLL_INTERVAL
            } else {
                FINGER_COUNT_POLL_INTERVAL
            };

            for event in recognizer.feed(sample, &table) {
                if let GestureEvent::Commit { name } = &event {
                    if let Some(spec) = table.0.get(name) {
                        let commit = GestureCommit {
                            name: name.clone(),
                            object: spec.object.clone(),
                            verb: spec.verb.clone(),
                            args: spec.args.clone(),
                        };
                        if tx.send(commit).is_err() {
                            return;
                        }
                    }
                }
            }

            std::thread::sleep(interval);
        }
    })
}

/// Drain any gestures that committed since the last call and dispatch them
/// through the [CommandRegistry]. Called once per main-loop tick, after X
/// event processing, the one place the core touches gesture state.
pub fn drain_commits(rx: &Receiver<GestureCommit>, registry: &mut CommandRegistry) -> Result<()> {
    while let Ok(commit) = rx.try_recv() {
        debug!(name = %commit.name, "dispatching committed gesture");
        registry.call(&commit.object, &commit.verb, &commit.args)?;
    }
    Ok(())
}

/// Attaches to the synaptics driver's System V shared-memory export (key
/// `23947`) and reads the live finger-position struct. Declared as raw FFI
/// rather than pulled in as a dependency: this is the one place the crate
/// needs `shmget`/`shmat`, and no workspace crate already wraps it.
pub struct SynapticsShm {
    addr: *const RawState,
}

#[repr(C)]
struct RawState {
    version: i32,
    x: i32,
    y: i32,
    z: i32,
    num_fingers: i32,
    finger_width: i32,
    left: i32,
    right: i32,
    up: i32,
    down: i32,
    multi: [u8; 8],
    middle: u8,
}

mod ffi {
    use std::os::raw::{c_int, c_void};

    extern "C" {
        pub fn shmget(key: c_int, size: usize, shmflg: c_int) -> c_int;
        pub fn shmat(shmid: c_int, shmaddr: *const c_void, shmflg: c_int) -> *mut c_void;
        pub fn shmdt(shmaddr: *const c_void) -> c_int;
    }
}

// SAFETY: the shared-memory segment is attached once and only ever read;
// the kernel does not migrate it between processes' address spaces.
unsafe impl Send for SynapticsShm {}

impl SynapticsShm {
    /// Attach to the driver's shared-memory segment. Returns
    /// [Error::DriverMissing] if the synaptics driver is not loaded (no
    /// such segment) rather than a raw `XProto`/IO error, per spec §7.
    pub fn attach() -> Result<Self> {
        let size = std::mem::size_of::<RawState>();
        // SAFETY: `shmget` only inspects `key`/`size`/`shmflg`, no pointers
        // involved on this side.
        let shmid = unsafe { ffi::shmget(SYNAPTICS_SHM_KEY, size, 0) };
        if shmid < 0 {
            return Err(Error::DriverMissing("synaptics touchpad shared memory"));
        }

        // SAFETY: `shmaddr = null` lets the kernel pick the mapping address;
        // the returned pointer is valid for reads of `size` bytes until
        // `shmdt` in `Drop`.
        let addr = unsafe { ffi::shmat(shmid, std::ptr::null(), 0) };
        if addr as isize == -1 {
            return Err(Error::DriverMissing("synaptics touchpad shared memory"));
        }

        Ok(Self { addr: addr as *const RawState })
    }
}

impl TouchpadSource for SynapticsShm {
    fn sample(&mut self) -> Result<TouchpadSample> {
        // SAFETY: `addr` was attached in `attach` and remains valid for the
        // lifetime of `self`; the driver only ever writes this struct, never
        // resizes or unmaps it from under us.
        let raw = unsafe { std::ptr::read_volatile(self.addr) };
        Ok(TouchpadSample {
            x: raw.x,
            y: raw.y,
            num_fingers: raw.num_fingers.max(0) as u8,
        })
    }
}

impl Drop for SynapticsShm {
    fn drop(&mut self) {
        // SAFETY: detaching the segment attached in `attach`.
        unsafe {
            ffi::shmdt(self.addr as *const _);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(fingers: u8, direction: Direction, object: &str, verb: &str) -> GestureSpec {
        GestureSpec {
            fingers,
            direction,
            detect_distance: 20.0,
            commit_distance: 200.0,
            object: object.to_string(),
            verb: verb.to_string(),
            args: Vec::new(),
        }
    }

    fn sample(x: i32, y: i32, fingers: u8) -> TouchpadSample {
        TouchpadSample { x, y, num_fingers: fingers }
    }

    #[test]
    fn direction_buckets_match_the_eight_compass_points() {
        assert_eq!(Direction::from_angle(0.0), Direction::Down);
        assert_eq!(Direction::from_angle(PI), Direction::Up);
        assert_eq!(Direction::from_angle(PI / 2.0), Direction::Right);
        assert_eq!(Direction::from_angle(-PI / 2.0), Direction::Left);
    }

    #[test]
    fn swipe_past_commit_distance_commits_on_lift() {
        let mut table = GestureTable::new();
        table.add(spec(3, Direction::Left, "groups", "focus_next"));

        let mut rec = GestureRecognizer::new();
        rec.feed(Some(sample(500, 500, 3)), &table);
        let events = rec.feed(Some(sample(200, 500, 3)), &table);
        assert!(events.iter().any(|e| matches!(e, GestureEvent::Full { .. })));

        let events = rec.feed(None, &table);
        assert_eq!(events, vec![GestureEvent::Commit { name: "3f-left".into() }]);
    }

    #[test]
    fn swipe_that_never_reaches_commit_distance_cancels_on_lift() {
        let mut table = GestureTable::new();
        table.add(spec(3, Direction::Right, "groups", "switch"));

        let mut rec = GestureRecognizer::new();
        rec.feed(Some(sample(100, 100, 3)), &table);
        rec.feed(Some(sample(130, 100, 3)), &table);
        let events = rec.feed(None, &table);
        assert_eq!(events, vec![GestureEvent::Cancel { name: "3f-right".into() }]);
    }

    #[test]
    fn drain_commits_dispatches_through_the_registry() {
        use crate::core::event_bus::EventBus;
        use std::sync::mpsc::channel;

        let (tx, rx) = channel();
        tx.send(GestureCommit {
            name: "3f-left".into(),
            object: "counter".into(),
            verb: "inc".into(),
            args: vec![],
        })
        .unwrap();
        drop(tx);

        struct Counter(i64);
        impl crate::core::commands::Commandable for Counter {
            fn invoke(&mut self, verb: &str, _args: &[String]) -> Result<()> {
                if verb == "inc" {
                    self.0 += 1;
                    Ok(())
                } else {
                    Err(Error::NotFound(verb.to_string()))
                }
            }
        }

        let mut bus = EventBus::new();
        let mut registry = CommandRegistry::new();
        registry.set("counter", Box::new(Counter(0)), &mut bus);

        drain_commits(&rx, &mut registry).unwrap();
    }
}
