//! User-composable hook points run at key moments of the manager's
//! lifecycle: startup, before/after state refresh, on new-client management,
//! and around raw event dispatch.
use crate::{core::State, x::{XConn, XEvent}, Result, pure::Xid};

/// A hook run with no extra context beyond the current [State] — used for
/// startup and refresh hooks.
pub trait StateHook<X: XConn> {
    fn call(&mut self, state: &mut State<X>, x: &X) -> Result<()>;

    fn boxed(self) -> Box<dyn StateHook<X>>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }

    fn then_boxed(self, next: Box<dyn StateHook<X>>) -> Box<dyn StateHook<X>>
    where
        Self: Sized + 'static,
    {
        Box::new(ComposedStateHook(self, next))
    }
}

struct ComposedStateHook<X: XConn>(Box<dyn StateHook<X>>, Box<dyn StateHook<X>>);

impl<X: XConn> StateHook<X> for ComposedStateHook<X> {
    fn call(&mut self, state: &mut State<X>, x: &X) -> Result<()> {
        self.0.call(state, x)?;
        self.1.call(state, x)
    }
}

impl<X: XConn, F> StateHook<X> for F
where
    F: FnMut(&mut State<X>, &X) -> Result<()>,
{
    fn call(&mut self, state: &mut State<X>, x: &X) -> Result<()> {
        (self)(state, x)
    }
}

/// A hook run around raw [XEvent] dispatch. Returning `Ok(false)` suppresses
/// the engine's default handling of that event for this tick.
pub trait EventHook<X: XConn> {
    fn call(&mut self, event: &XEvent, state: &mut State<X>, x: &X) -> Result<bool>;

    fn boxed(self) -> Box<dyn EventHook<X>>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }

    fn then_boxed(self, next: Box<dyn EventHook<X>>) -> Box<dyn EventHook<X>>
    where
        Self: Sized + 'static,
    {
        Box::new(ComposedEventHook(self, next))
    }
}

struct ComposedEventHook<X: XConn>(Box<dyn EventHook<X>>, Box<dyn EventHook<X>>);

impl<X: XConn> EventHook<X> for ComposedEventHook<X> {
    fn call(&mut self, event: &XEvent, state: &mut State<X>, x: &X) -> Result<bool> {
        Ok(self.0.call(event, state, x)? && self.1.call(event, state, x)?)
    }
}

impl<X: XConn, F> EventHook<X> for F
where
    F: FnMut(&XEvent, &mut State<X>, &X) -> Result<bool>,
{
    fn call(&mut self, event: &XEvent, state: &mut State<X>, x: &X) -> Result<bool> {
        (self)(event, state, x)
    }
}

/// A hook run when a new client window is first managed, before the first
/// refresh places it on screen — the natural place to float, assign a
/// group, or apply per-application layout properties.
pub trait ManageHook<X: XConn> {
    fn call(&mut self, id: Xid, state: &mut State<X>, x: &X) -> Result<()>;

    fn boxed(self) -> Box<dyn ManageHook<X>>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }

    fn then_boxed(self, next: Box<dyn ManageHook<X>>) -> Box<dyn ManageHook<X>>
    where
        Self: Sized + 'static,
    {
        Box::new(ComposedManageHook(self, next))
    }
}

struct ComposedManageHook<X: XConn>(Box<dyn ManageHook<X>>, Box<dyn ManageHook<X>>);

impl<X: XConn> ManageHook<X> for ComposedManageHook<X> {
    fn call(&mut self, id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
        self.0.call(id, state, x)?;
        self.1.call(id, state, x)
    }
}

impl<X: XConn, F> ManageHook<X> for F
where
    F: FnMut(Xid, &mut State<X>, &X) -> Result<()>,
{
    fn call(&mut self, id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
        (self)(id, state, x)
    }
}

/// Runs a manage hook only when `query` matches the window being managed.
pub struct OnQuery<Q, H> {
    pub query: Q,
    pub hook: H,
}

impl<X, Q, H> ManageHook<X> for OnQuery<Q, H>
where
    X: XConn,
    Q: crate::x::Query<X>,
    H: ManageHook<X>,
{
    fn call(&mut self, id: Xid, state: &mut State<X>, x: &X) -> Result<()> {
        if self.query.run(id, x)? {
            self.hook.call(id, state, x)?;
        }
        Ok(())
    }
}
