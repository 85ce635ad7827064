//! Trailing-edge debounce on top of `setTimeout`.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::Window;

use super::error::{GraphError, Result};

/// Runs a callback once calls stop arriving for `delay_ms`.
///
/// Every [`trigger`](Debouncer::trigger) cancels the pending timer, so only the
/// last call inside the quiet period fires.
pub struct Debouncer {
	window: Window,
	delay_ms: i32,
	handle: Rc<Cell<Option<i32>>>,
	callback: Closure<dyn FnMut()>,
}

impl Debouncer {
	pub fn new(window: Window, delay_ms: i32, mut f: impl FnMut() + 'static) -> Self {
		let handle = Rc::new(Cell::new(None));
		let handle_fire = handle.clone();
		let callback: Closure<dyn FnMut()> = Closure::new(move || {
			handle_fire.set(None);
			f();
		});
		Self {
			window,
			delay_ms,
			handle,
			callback,
		}
	}

	/// (Re)starts the quiet period.
	pub fn trigger(&self) -> Result<()> {
		self.cancel();
		let id = self
			.window
			.set_timeout_with_callback_and_timeout_and_arguments_0(
				self.callback.as_ref().unchecked_ref(),
				self.delay_ms,
			)
			.map_err(GraphError::from_js)?;
		self.handle.set(Some(id));
		Ok(())
	}

	/// Drops the pending call, if any.
	pub fn cancel(&self) {
		if let Some(id) = self.handle.take() {
			self.window.clear_timeout_with_handle(id);
		}
	}
}

impl Drop for Debouncer {
	fn drop(&mut self) {
		self.cancel();
	}
}
