//! Command dispatcher: a name→object registry exposing invokable
//! `cmd_<verb>` methods. See spec §4.3.
use crate::{core::event_bus::EventBus, Error, Result};
use std::collections::HashMap;

/// Anything that can be registered under a name in the [CommandRegistry] and
/// invoked by verb. Implementors expose their behavior as `cmd_<verb>`
/// methods; `invoke` is the single dynamic-dispatch entry point that maps a
/// verb string onto the right one.
pub trait Commandable {
    /// Invoke `verb` with `args`, returning an error if the verb is unknown
    /// to this object.
    fn invoke(&mut self, verb: &str, args: &[String]) -> Result<()>;
}

/// A mapping from string name to a [Commandable] object, plus a change event
/// fired whenever a name with registered listeners is reassigned (e.g. the
/// `window`/`group`/`layout`/`screen` focus tuple slots).
pub struct CommandRegistry {
    objects: HashMap<String, Box<dyn Commandable>>,
    watched: HashMap<String, bool>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            watched: HashMap::new(),
        }
    }

    /// Register `obj` under `name`. If `name` previously had listeners
    /// registered on the bus's `<name>_changed` event, assignment fires it.
    pub fn set(&mut self, name: impl Into<String>, obj: Box<dyn Commandable>, bus: &mut EventBus) {
        let name = name.into();
        self.objects.insert(name.clone(), obj);
        if *self.watched.get(&name).unwrap_or(&false) {
            bus.emit(&format!("{name}_changed"), &[]);
        }
    }

    pub fn watch_changes(&mut self, name: impl Into<String>) {
        self.watched.insert(name.into(), true);
    }

    /// `call(name, verb, args…)`: look up the object and invoke `cmd_<verb>`.
    pub fn call(&mut self, name: &str, verb: &str, args: &[String]) -> Result<()> {
        let obj = self
            .objects
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(format!("no command object registered as {name}")))?;
        obj.invoke(verb, args)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }
}

/// `callback(name, verb, args…)`: a zero-argument thunk performing the same
/// call as [CommandRegistry::call], used to bind keys and menu items without
/// giving the binding table direct access to the registry's lifetime.
pub fn callback(name: &str, verb: &str, args: Vec<String>) -> impl Fn(&mut CommandRegistry) -> Result<()> {
    let name = name.to_string();
    let verb = verb.to_string();
    move |registry: &mut CommandRegistry| registry.call(&name, &verb, &args)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        n: i64,
    }

    impl Commandable for Counter {
        fn invoke(&mut self, verb: &str, args: &[String]) -> Result<()> {
            match verb {
                "inc" => {
                    self.n += 1;
                    Ok(())
                }
                "add" => {
                    let delta: i64 = args[0].parse().unwrap();
                    self.n += delta;
                    Ok(())
                }
                _ => Err(Error::NotFound(format!("no such verb: {verb}"))),
            }
        }
    }

    #[test]
    fn call_dispatches_to_the_named_objects_verb() {
        let mut bus = EventBus::new();
        let mut reg = CommandRegistry::new();
        reg.set("counter", Box::new(Counter { n: 0 }), &mut bus);

        reg.call("counter", "inc", &[]).unwrap();
        reg.call("counter", "add", &["4".into()]).unwrap();

        assert!(reg.call("missing", "inc", &[]).is_err());
    }

    #[test]
    fn callback_produces_a_reusable_zero_arg_thunk() {
        let mut bus = EventBus::new();
        let mut reg = CommandRegistry::new();
        reg.set("counter", Box::new(Counter { n: 0 }), &mut bus);

        let f = callback("counter", "add", vec!["2".into()]);
        f(&mut reg).unwrap();
        f(&mut reg).unwrap();
    }

    #[test]
    fn reassignment_fires_change_event_only_when_watched() {
        let mut bus = EventBus::new();
        bus.declare("counter_changed", false);
        let mut reg = CommandRegistry::new();

        let fired = std::rc::Rc::new(std::cell::RefCell::new(0));
        let f = fired.clone();
        bus.on("counter_changed", Box::new(move |_| *f.borrow_mut() += 1));

        reg.set("counter", Box::new(Counter { n: 0 }), &mut bus);
        assert_eq!(*fired.borrow(), 0);

        reg.watch_changes("counter");
        reg.set("counter", Box::new(Counter { n: 0 }), &mut bus);
        assert_eq!(*fired.borrow(), 1);
    }
}
