//! Classifier: declarative per-window rules applied the moment a client is
//! first managed. Rules are `(conditions, actions, class)` triples; a rule
//! with no class runs for every window, a rule with a class only runs for
//! windows whose `WM_CLASS` matches it (including dash-prefixes, so a rule
//! for `"gimp"` also fires for a `WM_CLASS` of `"gimp-2.8"`). See spec §4.8.
use crate::{
    core::{hooks::ManageHook, State},
    pure::window::LayoutProps,
    x::{atom::Atom, property::Prop, XConn},
    Result, Xid,
};

/// A single condition checked against a window before its actions run.
/// Boxed so [Classifier::add_rule] can take a mix of the built-in
/// primitives below or a caller's own closure.
pub type Condition<X> = Box<dyn Fn(Xid, &State<X>, &X) -> Result<bool>>;

/// A single action applied to a window whose conditions all held.
pub type Action<X> = Box<dyn Fn(Xid, &mut State<X>, &X) -> Result<()>>;

/// A rule engine run as a [ManageHook]: global rules run first, then rules
/// scoped to each name the window's `WM_CLASS` expands to.
#[derive(Default)]
pub struct Classifier<X: XConn> {
    global_rules: Vec<(Vec<Condition<X>>, Vec<Action<X>>)>,
    class_rules: std::collections::HashMap<String, Vec<(Vec<Condition<X>>, Vec<Action<X>>)>>,
}

impl<X: XConn> Classifier<X> {
    pub fn new() -> Self {
        Self {
            global_rules: Vec::new(),
            class_rules: std::collections::HashMap::new(),
        }
    }

    /// Register a rule. `class = None` makes it global; otherwise it only
    /// runs for windows whose `WM_CLASS` expands to include `class`.
    pub fn add_rule(&mut self, conditions: Vec<Condition<X>>, actions: Vec<Action<X>>, class: Option<&str>) {
        match class {
            None => self.global_rules.push((conditions, actions)),
            Some(class) => self.class_rules.entry(class.to_owned()).or_default().push((conditions, actions)),
        }
    }

    pub fn apply(&self, id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
        for (conditions, actions) in &self.global_rules {
            run_rule(id, conditions, actions, state, x)?;
        }

        let wm_class = match x.get_prop(id, Atom::WmClass.as_ref())? {
            Some(Prop::Utf8String(strs)) => strs,
            _ => Vec::new(),
        };

        for name in wm_class.iter().flat_map(|s| split_class(s)) {
            if let Some(rules) = self.class_rules.get(&name) {
                for (conditions, actions) in rules {
                    run_rule(id, conditions, actions, state, x)?;
                }
            }
        }

        Ok(())
    }
}

fn run_rule<X: XConn>(
    id: Xid,
    conditions: &[Condition<X>],
    actions: &[Action<X>],
    state: &mut State<X>,
    x: &X,
) -> Result<()> {
    for cond in conditions {
        if !cond(id, state, x)? {
            return Ok(());
        }
    }
    for act in actions {
        act(id, state, x)?;
    }
    Ok(())
}

/// Expand a single `WM_CLASS` component into itself plus each of its
/// dash-delimited prefixes, so `"gimp-2.8"` yields `"gimp-2.8"` then
/// `"gimp"`.
fn split_class(name: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = name;
    loop {
        out.push(rest.to_owned());
        match rest.rsplit_once('-') {
            Some((prefix, _)) => rest = prefix,
            None => break,
        }
    }
    out
}

impl<X: XConn> ManageHook<X> for Classifier<X> {
    fn call(&mut self, id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
        self.apply(id, state, x)
    }
}

/// `match-type(TYPE, ...)`: true if the window's `_NET_WM_WINDOW_TYPE`
/// includes any of the given type names (`"DIALOG"`, `"NORMAL"`, ...,
/// matched against `_NET_WM_WINDOW_TYPE_<NAME>`).
pub fn match_type<X: XConn>(types: Vec<String>) -> Condition<X> {
    let wanted: Vec<String> = types.iter().map(|t| format!("_NET_WM_WINDOW_TYPE_{}", t.to_uppercase())).collect();
    Box::new(move |id, _state, x| {
        let got = match x.get_prop(id, Atom::NetWmWindowType.as_ref())? {
            Some(Prop::Atom(atoms)) => atoms,
            _ => return Ok(false),
        };
        Ok(got.iter().any(|a| wanted.contains(a)))
    })
}

/// `match-role(ROLE, ...)`: true if `_NET_WM_WINDOW_ROLE` is one of the
/// given strings.
pub fn match_role<X: XConn>(roles: Vec<String>) -> Condition<X> {
    Box::new(move |id, _state, x| match x.get_prop(id, Atom::NetWmWindowRole.as_ref())? {
        Some(Prop::Utf8String(strs)) => Ok(strs.iter().any(|s| roles.contains(s))),
        _ => Ok(false),
    })
}

/// `has-property(NAME, ...)`: true if any of the given property names is
/// currently set on the window.
pub fn has_property<X: XConn>(names: Vec<String>) -> Condition<X> {
    Box::new(move |id, _state, x| {
        let present = x.list_props(id)?;
        Ok(names.iter().any(|n| present.contains(n)))
    })
}

/// `layout-properties(k=v, ...)`: stamp fields directly onto the window's
/// [LayoutProps]. Implemented as a builder closure rather than a generic
/// key/value setter since `LayoutProps`'s fields are typed, not stringly.
pub fn layout_properties<X: XConn>(set: impl Fn(&mut LayoutProps) + 'static) -> Action<X> {
    Box::new(move |id, state, _x| {
        if let Some(w) = state.windows.get_mut(&id) {
            set(&mut w.lprops);
        }
        Ok(())
    })
}

/// `ignore-hints`: stop this window's size hints constraining its layout
/// geometry.
pub fn ignore_hints<X: XConn>() -> Action<X> {
    Box::new(|id, state, _x| {
        if let Some(w) = state.windows.get_mut(&id) {
            w.lprops.ignore_hints = true;
        }
        Ok(())
    })
}

/// `move-to-group(NAME)`: assign the window's group by configured name.
pub fn move_to_group<X: XConn>(name: impl Into<String>) -> Action<X> {
    let name = name.into();
    Box::new(move |id, state, _x| {
        if let Some(group) = state.group_named(&name) {
            if let Some(w) = state.windows.get_mut(&id) {
                w.lprops.group = Some(group);
            }
        }
        Ok(())
    })
}

/// `move-to-group-of(PROPERTY)`: read a window id out of `PROPERTY` and
/// adopt whatever group that window currently belongs to (used to pin
/// dialogs to their parent's group via e.g. `WM_TRANSIENT_FOR`).
pub fn move_to_group_of<X: XConn>(property: impl Into<String>) -> Action<X> {
    let property = property.into();
    Box::new(move |id, state, x| {
        let other = match x.get_prop(id, &property)? {
            Some(Prop::Window(ids)) => ids.into_iter().next(),
            _ => None,
        };
        let Some(other) = other else { return Ok(()) };
        let Some(group) = state.group_of(other) else { return Ok(()) };
        if let Some(w) = state.windows.get_mut(&id) {
            w.lprops.group = Some(group);
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{commands::CommandRegistry, event_bus::EventBus, groups::GroupManager, screens::ScreenManager, Config},
        pure::{
            group::Group,
            layout::{Split, StackSpec},
            window::Window,
        },
        x::mock::MockXConn,
    };
    use anymap::AnyMap;
    use std::collections::HashMap;

    #[test]
    fn split_class_yields_name_and_dash_prefixes() {
        assert_eq!(split_class("gimp-2.8"), vec!["gimp-2.8", "gimp"]);
        assert_eq!(split_class("Firefox"), vec!["Firefox"]);
        assert_eq!(split_class("a-b-c"), vec!["a-b-c", "a-b", "a"]);
    }

    /// A stub client that reports itself as a `_NET_WM_WINDOW_TYPE_UTILITY`
    /// window with `WM_CLASS` `"gimp-2.8"`.
    struct UtilityGimpWindow;

    impl MockXConn for UtilityGimpWindow {
        fn mock_get_prop(&self, _client: Xid, prop_name: &str) -> Result<Option<Prop>> {
            match prop_name {
                p if p == Atom::NetWmWindowType.as_ref() => {
                    Ok(Some(Prop::Atom(vec!["_NET_WM_WINDOW_TYPE_UTILITY".to_owned()])))
                }
                p if p == Atom::WmClass.as_ref() => Ok(Some(Prop::Utf8String(vec!["gimp-2.8".to_owned()]))),
                _ => Ok(None),
            }
        }
    }

    fn test_state() -> State<UtilityGimpWindow> {
        let groups = GroupManager::new(vec![Group::new(
            "1".to_owned(),
            Split::new(true, false, vec![StackSpec::new("main")]),
        )]);

        State {
            config: Config::default(),
            windows: HashMap::new(),
            groups,
            screens: ScreenManager::new(vec![]),
            bus: EventBus::new(),
            registry: CommandRegistry::new(),
            extensions: AnyMap::new(),
            root: Xid(0),
            mapped: Default::default(),
            pending_unmap: HashMap::new(),
            current_event: None,
            drag: None,
        }
    }

    /// A global "float every UTILITY window" rule runs first and sets
    /// `floating = true`; a `"gimp"` class rule registered afterwards then
    /// overrides it back to `false`, since class rules always run after
    /// global ones regardless of registration order.
    #[test]
    fn class_rule_overrides_an_earlier_global_type_based_rule() {
        let x = UtilityGimpWindow;
        let mut state = test_state();
        let id = Xid(42);
        state.windows.insert(id, Window::new(id));

        let mut classifier: Classifier<UtilityGimpWindow> = Classifier::new();
        classifier.add_rule(
            vec![match_type(vec!["UTILITY".to_owned()])],
            vec![layout_properties(|lp| lp.floating = true)],
            None,
        );
        classifier.add_rule(vec![], vec![layout_properties(|lp| lp.floating = false)], Some("gimp"));

        classifier.apply(id, &mut state, &x).unwrap();

        assert!(!state.windows[&id].lprops.floating);
    }
}
