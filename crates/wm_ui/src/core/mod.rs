//! The core [`Draw`] and [`Context`] primitives used to render the status
//! bar and gadgets: a thin wrapper over Xlib pixmaps and Xft for glyph
//! rendering, the same approach a dwm-style bar takes.
//!
//! If you only need to add a widget to the [`crate::bar::StatusBar`], the
//! [`crate::bar::widgets::Widget`] trait is the only thing you need; `Draw`
//! and `Context` are the plumbing underneath it.
use crate::{Error, Result};
use std::{
    cmp::max,
    collections::HashMap,
    ffi::CString,
};
use tilewm::{
    pure::geometry::Rect,
    x::{WinType, XConn},
    Color, Xid,
};
use tracing::info;
use x11::{
    xft::{
        XftColor, XftColorAllocName, XftDrawCreate, XftDrawDestroy, XftDrawStringUtf8,
        XftFont, XftFontClose, XftFontOpenName, XftTextExtentsUtf8, XGlyphInfo,
    },
    xlib::{
        Display, Drawable, XCopyArea, XCreateGC, XCreatePixmap, XDefaultColormap, XDefaultDepth,
        XDefaultVisual, XDrawRectangle, XFillRectangle, XFreeGC, XFreePixmap, XOpenDisplay,
        XSetForeground, XSync, GC,
    },
};

pub(crate) const SCREEN: i32 = 0;

/// Styling for a single piece of rendered text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Foreground color used for the glyphs themselves.
    pub fg: Color,
    /// Background behind the text; defaults to the owning [Draw]'s
    /// background when unset.
    pub bg: Option<Color>,
    /// Padding in pixels to the left and right of the rendered text.
    pub padding: (u32, u32),
    /// Xft font name, e.g. `"monospace"`.
    pub font: String,
}

#[derive(Debug)]
struct Surface {
    drawable: Drawable,
    gc: GC,
    r: Rect,
}

/// A minimal per-window drawing surface backed by an Xlib pixmap, with Xft
/// handling glyph rasterisation.
///
/// Font names are whatever `fc-list -f '%{family}\n'` reports; `Draw`
/// appends no size suffix, so pass something like `"monospace:size=10"`
/// if you need a specific point size.
#[derive(Debug)]
pub struct Draw {
    dpy: *mut Display,
    font: *mut XftFont,
    surfaces: HashMap<Xid, Surface>,
    colors: HashMap<u32, *mut XftColor>,
}

impl Draw {
    /// Open a new connection to the X display and load `font_name` via Xft.
    pub fn new(font_name: &str) -> Result<Self> {
        // SAFETY: XOpenDisplay with a null argument connects to $DISPLAY;
        // a null return means the connection failed.
        let dpy = unsafe { XOpenDisplay(std::ptr::null()) };
        if dpy.is_null() {
            return Err(Error::NoDisplay);
        }

        let c_name = CString::new(font_name)?;
        // SAFETY: dpy is known non-null; c_name outlives the call.
        let font = unsafe { XftFontOpenName(dpy, SCREEN, c_name.as_ptr()) };
        if font.is_null() {
            return Err(Error::UnknownFont {
                font: font_name.to_string(),
            });
        }

        info!(%font_name, "loaded bar font");

        Ok(Self {
            dpy,
            font,
            surfaces: HashMap::new(),
            colors: HashMap::new(),
        })
    }

    /// Create a new top-level window via `conn` and register a drawing
    /// surface for it sized to match `r`.
    pub fn new_window<X: XConn>(&mut self, conn: &X, ty: WinType, r: Rect, managed: bool) -> Result<Xid> {
        let id = conn.create_window(ty, r, managed)?;

        // SAFETY: dpy is known non-null; id.0 is a window the X server just
        // created for us, so it is a valid drawable.
        let (drawable, gc) = unsafe {
            let depth = XDefaultDepth(self.dpy, SCREEN);
            let pixmap = XCreatePixmap(self.dpy, id.0 as u64, r.w, r.h, depth as u32);
            let gc = XCreateGC(self.dpy, pixmap, 0, std::ptr::null_mut());
            (pixmap, gc)
        };

        self.surfaces.insert(id, Surface { drawable, gc, r });

        Ok(id)
    }

    /// Tear down the drawing surface and destroy the underlying window.
    pub fn destroy_window_and_surface<X: XConn>(&mut self, conn: &X, id: Xid) -> Result<()> {
        if let Some(s) = self.surfaces.remove(&id) {
            // SAFETY: drawable/gc were created by this Draw and are still
            // live (the surface has just been removed from the map).
            unsafe {
                XFreeGC(self.dpy, s.gc);
                XFreePixmap(self.dpy, s.drawable);
            }
        }

        conn.destroy_window(id).map_err(Error::from)
    }

    /// Borrow a [Context] for drawing into the surface registered for `id`.
    pub fn context_for(&mut self, id: Xid) -> Result<Context<'_>> {
        let s = self
            .surfaces
            .get(&id)
            .ok_or(Error::UninitialisedSurface { id })?;

        Ok(Context {
            dx: 0,
            dy: 0,
            dpy: self.dpy,
            s,
            bg: Color::new_from_hex(0x000000),
            font: self.font,
            colors: &mut self.colors,
        })
    }

    /// Flush buffered drawing operations for `id` to the X server by
    /// copying the pixmap onto the window.
    pub fn flush(&self, id: Xid) -> Result<()> {
        let s = self
            .surfaces
            .get(&id)
            .ok_or(Error::UninitialisedSurface { id })?;

        // SAFETY: dpy, drawable, gc and id.0 are all known live.
        unsafe {
            XCopyArea(
                self.dpy,
                s.drawable,
                id.0 as u64,
                s.gc,
                0,
                0,
                s.r.w,
                s.r.h,
                0,
                0,
            );
            XSync(self.dpy, 0);
        }

        Ok(())
    }
}

impl Drop for Draw {
    fn drop(&mut self) {
        // SAFETY: every surface/gc in the map was created against `dpy`,
        // which is still open at this point.
        unsafe {
            for s in self.surfaces.values() {
                XFreeGC(self.dpy, s.gc);
                XFreePixmap(self.dpy, s.drawable);
            }
            XftFontClose(self.dpy, self.font);
        }
    }
}

/// A rendering context for a single [Draw] surface, offering offset-based
/// rectangle and text drawing primitives.
///
/// Drawing operations are positioned relative to a running `(dx, dy)`
/// offset: [translate][Self::translate] nudges it, [set_x_offset][Self::set_x_offset]
/// /[set_y_offset][Self::set_y_offset] set it absolutely, and
/// [reset_offset][Self::reset_offset] returns to the origin. See
/// [`crate::bar::StatusBar::redraw`] for how a row of widgets uses this to
/// lay itself out left to right.
#[derive(Debug)]
pub struct Context<'a> {
    dx: i32,
    dy: i32,
    dpy: *mut Display,
    s: &'a Surface,
    bg: Color,
    font: *mut XftFont,
    colors: &'a mut HashMap<u32, *mut XftColor>,
}

impl<'a> Context<'a> {
    /// Clear the surface back to its background color.
    pub fn clear(&mut self) -> Result<()> {
        self.fill_rect(Rect::new(0, 0, self.s.r.w, self.s.r.h), self.bg)
    }

    /// Set the background color used by [clear][Self::clear] and
    /// [fill_bg][Self::fill_bg].
    pub fn set_bg(&mut self, bg: Color) {
        self.bg = bg;
    }

    /// Offset future drawing operations by an additional `(dx, dy)`.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.dx += dx;
        self.dy += dy;
    }

    /// Reset the drawing offset back to the origin.
    pub fn reset_offset(&mut self) {
        self.dx = 0;
        self.dy = 0;
    }

    /// Set an absolute x offset for future drawing operations.
    pub fn set_x_offset(&mut self, x: i32) {
        self.dx = x;
    }

    /// Set an absolute y offset for future drawing operations.
    pub fn set_y_offset(&mut self, y: i32) {
        self.dy = y;
    }

    fn xcolor(&mut self, c: Color) -> Result<*mut XftColor> {
        if let Some(col) = self.colors.get(&c.rgba_u32()) {
            return Ok(*col);
        }

        let name = CString::new(c.as_rgb_hex_string())?;
        let mut xcol: XftColor = unsafe { std::mem::zeroed() };

        // SAFETY: dpy is known non-null; name is a valid nul-terminated
        // string and the output pointer is a live local.
        let ok = unsafe {
            XftColorAllocName(
                self.dpy,
                XDefaultVisual(self.dpy, SCREEN),
                XDefaultColormap(self.dpy, SCREEN),
                name.as_ptr(),
                &mut xcol,
            )
        };
        if ok == 0 {
            return Err(Error::InvalidHexColor {
                code: c.as_rgb_hex_string(),
            });
        }

        let boxed = Box::into_raw(Box::new(xcol));
        self.colors.insert(c.rgba_u32(), boxed);
        Ok(boxed)
    }

    /// Render a rectangular outline using `color`.
    pub fn draw_rect(&mut self, Rect { x, y, w, h }: Rect, color: Color) -> Result<()> {
        let xcol = self.xcolor(color)?;
        let (x, y) = (self.dx + x as i32, self.dy + y as i32);

        // SAFETY: dpy/s.drawable/s.gc are known live; xcol is non-null.
        unsafe {
            XSetForeground(self.dpy, self.s.gc, (*xcol).pixel);
            XDrawRectangle(self.dpy, self.s.drawable, self.s.gc, x, y, w, h);
        }

        Ok(())
    }

    /// Render a filled rectangle using `color`.
    pub fn fill_rect(&mut self, Rect { x, y, w, h }: Rect, color: Color) -> Result<()> {
        let xcol = self.xcolor(color)?;
        let (x, y) = (self.dx + x as i32, self.dy + y as i32);

        // SAFETY: dpy/s.drawable/s.gc are known live; xcol is non-null.
        unsafe {
            XSetForeground(self.dpy, self.s.gc, (*xcol).pixel);
            XFillRectangle(self.dpy, self.s.drawable, self.s.gc, x, y, w, h);
        }

        Ok(())
    }

    /// Fill `r` with this context's current background color.
    pub fn fill_bg(&mut self, r: Rect) -> Result<()> {
        self.fill_rect(r, self.bg)
    }

    /// Render `txt` at the current offset, returning the `(width, height)`
    /// it occupied including `padding`.
    pub fn draw_text(&mut self, txt: &str, padding: (u32, u32), color: Color) -> Result<(u32, u32)> {
        let xcol = self.xcolor(color)?;
        let c_txt = CString::new(txt)?;

        // SAFETY: dpy and s.drawable are known live.
        let d = unsafe {
            XftDrawCreate(
                self.dpy,
                self.s.drawable,
                XDefaultVisual(self.dpy, SCREEN),
                XDefaultColormap(self.dpy, SCREEN),
            )
        };

        let (w, h) = self.extent(txt)?;
        let x = self.dx + padding.0 as i32;
        // SAFETY: font is known non-null, loaded for the lifetime of the
        // owning Draw; ascent centres the baseline vertically.
        let ascent = unsafe { (*self.font).ascent };
        let y = self.dy + (self.s.r.h as i32 - h as i32) / 2 + ascent;

        // SAFETY: d and xcol are non-null; c_txt is a valid nul-terminated
        // buffer whose length we pass explicitly.
        unsafe {
            XftDrawStringUtf8(
                d,
                xcol,
                self.font,
                x,
                y,
                c_txt.as_ptr() as *mut _,
                c_txt.as_bytes().len() as i32,
            );
            XftDrawDestroy(d);
        }

        Ok((w + padding.0 + padding.1, h))
    }

    /// The `(width, height)` in pixels that `txt` would occupy if drawn.
    pub fn extent(&self, txt: &str) -> Result<(u32, u32)> {
        let c_txt = CString::new(txt)?;
        let mut info: XGlyphInfo = unsafe { std::mem::zeroed() };

        // SAFETY: dpy and font are known live; the output struct is a live
        // local.
        unsafe {
            XftTextExtentsUtf8(
                self.dpy,
                self.font,
                c_txt.as_ptr() as *mut _,
                c_txt.as_bytes().len() as i32,
                &mut info,
            );
        }

        Ok((max(info.xOff, 0) as u32, info.height as u32))
    }

    /// Flush operations issued on this context to the X server.
    ///
    /// Not required if the parent [Draw]'s own `flush` is called afterwards.
    pub fn flush(&self) {
        // SAFETY: dpy is known live.
        unsafe { XSync(self.dpy, 0) };
    }
}
