use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Pointer change since the last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerUpdate {
    Unchanged,
    /// New position in CSS pixels relative to the canvas.
    Moved(f32, f32),
    Left,
}

/// Everything the frame step consumes, taken in one go.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    pub drag_dx: f32,
    pub drag_dy: f32,
    pub scroll_delta: f32,
    pub pointer: PointerUpdate,
    pub resized: bool,
}

/// Accumulated input state, written by DOM listeners and drained each frame.
pub struct InputState {
    drag_dx: f32,
    drag_dy: f32,
    scroll_delta: f32,
    left_button_down: bool,
    pointer: PointerUpdate,
    resized: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            drag_dx: 0.0,
            drag_dy: 0.0,
            scroll_delta: 0.0,
            left_button_down: false,
            pointer: PointerUpdate::Unchanged,
            resized: false,
        }
    }

    /// Return the pending input and reset the per-frame parts.
    pub fn take_frame(&mut self) -> FrameInput {
        let frame = FrameInput {
            drag_dx: self.drag_dx,
            drag_dy: self.drag_dy,
            scroll_delta: self.scroll_delta,
            pointer: self.pointer,
            resized: self.resized,
        };
        self.drag_dx = 0.0;
        self.drag_dy = 0.0;
        self.scroll_delta = 0.0;
        self.pointer = PointerUpdate::Unchanged;
        self.resized = false;
        frame
    }
}

/// Register pointer and wheel listeners on the canvas and the resize listener
/// on the window, once at startup. Closures live for the page lifetime.
pub fn register_input_listeners(
    window: &web_sys::Window,
    canvas: &web_sys::HtmlCanvasElement,
    state: Rc<RefCell<InputState>>,
) {
    let target: &web_sys::EventTarget = canvas.as_ref();

    // mousemove: pointer position for picking, movement for orbit
    {
        let state = state.clone();
        let closure =
            Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |e: web_sys::MouseEvent| {
                let mut s = state.borrow_mut();
                s.pointer = PointerUpdate::Moved(e.offset_x() as f32, e.offset_y() as f32);
                if s.left_button_down {
                    s.drag_dx += e.movement_x() as f32;
                    s.drag_dy += e.movement_y() as f32;
                }
            });
        target
            .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())
            .expect("failed to add mousemove listener");
        closure.forget();
    }

    // mousedown / mouseup
    for (event, down) in [("mousedown", true), ("mouseup", false)] {
        let state = state.clone();
        let closure =
            Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |e: web_sys::MouseEvent| {
                if e.button() == 0 {
                    state.borrow_mut().left_button_down = down;
                }
            });
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .expect("failed to add mouse button listener");
        closure.forget();
    }

    // mouseleave: nothing under the pointer any more
    {
        let state = state.clone();
        let closure =
            Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_e: web_sys::MouseEvent| {
                let mut s = state.borrow_mut();
                s.pointer = PointerUpdate::Left;
                s.left_button_down = false;
            });
        target
            .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref())
            .expect("failed to add mouseleave listener");
        closure.forget();
    }

    // wheel (zoom)
    {
        let state = state.clone();
        let closure =
            Closure::<dyn FnMut(web_sys::WheelEvent)>::new(move |e: web_sys::WheelEvent| {
                e.prevent_default();
                let mut s = state.borrow_mut();
                // Positive when scrolling up, towards the map.
                let delta = -e.delta_y() as f32;
                s.scroll_delta += if e.delta_mode() == 1 {
                    delta * 20.0 // line mode
                } else {
                    delta / 3.0 // pixel mode
                };
            });
        let options = web_sys::AddEventListenerOptions::new();
        options.set_passive(false);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                "wheel",
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .expect("failed to add wheel listener");
        closure.forget();
    }

    // window resize
    {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_e: web_sys::Event| {
            state.borrow_mut().resized = true;
        });
        window
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
            .expect("failed to add resize listener");
        closure.forget();
    }
}
