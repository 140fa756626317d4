use std::net::UdpSocket;

use gp_core::traits::OverlayPort;
use gp_core::types::{Point, Rect};
use tracing::info;

/// Overlay client: mirrors the virtual cursor to the external overlay
/// process over local UDP datagrams. Position updates are normalized to
/// the desktop so the overlay needs no knowledge of the display layout.
pub struct UdpOverlay {
    socket: UdpSocket,
    addr: String,
    desktop: Rect,
    active: bool,
}

impl UdpOverlay {
    pub fn new(addr: &str, desktop: Rect) -> anyhow::Result<Self> {
        // Bind to an ephemeral port; the overlay listens on `addr`.
        let socket = UdpSocket::bind("127.0.0.1:0")?;
        Ok(Self {
            socket,
            addr: addr.to_string(),
            desktop,
            active: false,
        })
    }

    fn send(&self, msg: &str) {
        // Errors ignored: the overlay process may not be up yet, and the
        // next tick resends anyway.
        let _ = self.socket.send_to(msg.as_bytes(), &self.addr);
    }
}

impl OverlayPort for UdpOverlay {
    fn show(&mut self) {
        if !self.active {
            info!("🎯 Starting pointer overlay");
            self.send("START");
            self.active = true;
        }
    }

    fn hide(&mut self) {
        if self.active {
            info!("🎯 Stopping pointer overlay");
            self.send("STOP");
            self.active = false;
        }
    }

    fn update(&mut self, p: Point, locked: bool) {
        if !self.active {
            return;
        }
        let nx = ((p.x - self.desktop.x) / self.desktop.w.max(1.0)).clamp(0.0, 1.0);
        let ny = ((p.y - self.desktop.y) / self.desktop.h.max(1.0)).clamp(0.0, 1.0);
        // Format: "x,y,locked"
        let msg = format!("{:.4},{:.4},{}", nx, ny, if locked { 1 } else { 0 });
        self.send(&msg);
    }
}
