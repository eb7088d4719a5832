use shared::{Transport, TransportError};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, CloseEvent, Event, MessageEvent, WebSocket};

/// `ws://` or `wss://` endpoint on the host that served the page.
pub fn socket_url() -> String {
    let location = web_sys::window().map(|w| w.location());
    let host = location
        .as_ref()
        .and_then(|l| l.host().ok())
        .unwrap_or_else(|| "localhost:3000".to_string());
    let scheme = match location.and_then(|l| l.protocol().ok()).as_deref() {
        Some("https:") => "wss",
        _ => "ws",
    };
    format!("{}://{}/ws", scheme, host)
}

/// Browser WebSocket carrying the race protocol. Frames sent before the
/// socket opens are queued and flushed on open. The event handlers live as
/// long as this value and are unregistered by [`Transport::close`].
pub struct WsTransport {
    ws: WebSocket,
    pending: Rc<RefCell<Vec<String>>>,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl WsTransport {
    pub fn connect<M, D>(url: &str, mut on_text: M, mut on_disconnect: D) -> Result<Self, TransportError>
    where
        M: FnMut(String) + 'static,
        D: FnMut() + 'static,
    {
        let ws = WebSocket::new(url).map_err(|e| TransportError::Connect(format!("{:?}", e)))?;
        let pending = Rc::new(RefCell::new(Vec::<String>::new()));

        let on_open = {
            let ws = ws.clone();
            let pending = pending.clone();
            Closure::wrap(Box::new(move |_: Event| {
                console::log_1(&"WebSocket connected".into());
                for text in pending.borrow_mut().drain(..) {
                    if let Err(e) = ws.send_with_str(&text) {
                        console::error_1(&e);
                    }
                }
            }) as Box<dyn FnMut(_)>)
        };
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
            if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
                on_text(text.into());
            }
        }) as Box<dyn FnMut(_)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let on_error = Closure::wrap(Box::new(move |_: Event| {
            console::error_1(&"WebSocket error".into());
        }) as Box<dyn FnMut(_)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let on_close = Closure::wrap(Box::new(move |e: CloseEvent| {
            console::warn_1(&format!("WebSocket disconnected ({})", e.code()).into());
            on_disconnect();
        }) as Box<dyn FnMut(_)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        Ok(Self {
            ws,
            pending,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
            _on_close: on_close,
        })
    }
}

impl Transport for WsTransport {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        match self.ws.ready_state() {
            WebSocket::OPEN => self
                .ws
                .send_with_str(text)
                .map_err(|e| TransportError::Send(format!("{:?}", e))),
            WebSocket::CONNECTING => {
                self.pending.borrow_mut().push(text.to_string());
                Ok(())
            }
            _ => Err(TransportError::Send("socket is closed".to_string())),
        }
    }

    fn close(&mut self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        self.pending.borrow_mut().clear();
        if let Err(e) = self.ws.close() {
            console::error_1(&e);
        }
    }
}
